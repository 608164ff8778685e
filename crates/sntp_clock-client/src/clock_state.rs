// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Synchronization state and the local-time projection read by display code.
//!
//! [`ClockState`] wraps an injected [`CalendarClock`] (the authoritative
//! UTC time store, an RTC on the original hardware) with a validity flag and
//! a timezone offset. Presentation code calls
//! [`get_local_time`](ClockState::get_local_time) once per tick; the
//! synchronization layer mutates the state through
//! [`mark_synced`](ClockState::mark_synced) /
//! [`mark_unsynced`](ClockState::mark_unsynced) only.

use log::debug;

use std::fmt;
use std::io;
use std::time::SystemTime;

use sntp_proto::wall_time::{self, CalendarTime};

/// The authoritative calendar time store, maintained in UTC.
pub trait CalendarClock {
    /// Read the current UTC calendar time.
    fn get(&self) -> io::Result<CalendarTime>;

    /// Overwrite the stored time with a new UTC calendar time.
    fn set(&mut self, utc: &CalendarTime) -> io::Result<()>;

    /// The calendar year this clock reports at timestamp zero, used to select
    /// the NTP era delta once at startup. Embedded RTC implementations with a
    /// year-2000 epoch override this.
    fn epoch_year(&self) -> u16 {
        1970
    }
}

/// Calendar clock backed by [`SystemTime`] plus an in-process correction.
///
/// `set` never touches the operating system clock: the difference between
/// the requested time and `SystemTime::now()` is stored and applied to every
/// subsequent read. The collaborator stays authoritative, as the device RTC
/// was, without requiring privileges.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemCalendarClock {
    correction_seconds: i64,
}

impl SystemCalendarClock {
    /// Clock with no correction applied.
    pub fn new() -> Self {
        SystemCalendarClock {
            correction_seconds: 0,
        }
    }

    /// The correction currently applied to `SystemTime` reads, in seconds.
    pub fn correction_seconds(&self) -> i64 {
        self.correction_seconds
    }

    fn unix_now() -> io::Result<i64> {
        match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
            Ok(elapsed) => Ok(elapsed.as_secs() as i64),
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }
}

impl CalendarClock for SystemCalendarClock {
    fn get(&self) -> io::Result<CalendarTime> {
        Ok(wall_time::calendar_from_unix_seconds(
            Self::unix_now()? + self.correction_seconds,
        ))
    }

    fn set(&mut self, utc: &CalendarTime) -> io::Result<()> {
        let target = wall_time::calendar_to_unix_seconds(utc);
        self.correction_seconds = target - Self::unix_now()?;
        Ok(())
    }
}

/// The projection handed to display code once per tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LocalTime {
    /// Calendar year.
    pub year: u16,
    /// Month, 1..=12.
    pub month: u8,
    /// Day of month, 1..=31.
    pub day: u8,
    /// UTC hour plus the timezone offset. Not renormalized: values outside
    /// 0..=23 are possible, and the date fields keep describing the UTC day.
    pub hour: i8,
    /// Minute, 0..=59.
    pub minute: u8,
    /// Second, 0..=59.
    pub second: u8,
    /// Day of week, 1 = Monday .. 7 = Sunday.
    pub weekday: u8,
    /// The timezone offset that was added to `hour`.
    pub tz_offset_hours: i8,
    /// Whether the clock is synchronized and passed the freshness check.
    pub is_valid: bool,
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Process-wide synchronization status over an injected calendar clock.
pub struct ClockState<C> {
    clock: C,
    time_zone_offset_hours: i8,
    min_plausible_year: u16,
    valid: bool,
}

impl<C: CalendarClock> ClockState<C> {
    /// Wrap a calendar clock. The state starts unsynchronized.
    ///
    /// `time_zone_offset_hours` is clamped to -12..=14.
    pub fn new(clock: C, time_zone_offset_hours: i8, min_plausible_year: u16) -> Self {
        ClockState {
            clock,
            time_zone_offset_hours: time_zone_offset_hours.clamp(-12, 14),
            min_plausible_year,
            valid: false,
        }
    }

    /// Whether the clock is currently considered synchronized.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The configured timezone offset in whole hours.
    pub fn time_zone_offset_hours(&self) -> i8 {
        self.time_zone_offset_hours
    }

    /// Change the timezone offset (clamped to -12..=14).
    pub fn set_time_zone_offset_hours(&mut self, hours: i8) {
        self.time_zone_offset_hours = hours.clamp(-12, 14);
    }

    /// Borrow the underlying calendar clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Push a new UTC time into the calendar clock and mark the state valid.
    pub fn mark_synced(&mut self, utc: &CalendarTime) -> io::Result<()> {
        self.clock.set(utc)?;
        self.valid = true;
        debug!("calendar clock set to {} UTC", utc);
        Ok(())
    }

    /// Mark the state unsynchronized.
    ///
    /// Driven by the freshness check in
    /// [`get_local_time`](Self::get_local_time), and available to callers
    /// reacting to external events such as link loss.
    pub fn mark_unsynced(&mut self) {
        self.valid = false;
    }

    /// Read the calendar clock and project it for display.
    ///
    /// The timezone offset is added to the hour field only; the result is not
    /// renormalized. A stored year below the configured minimum plausible
    /// year marks the state unsynchronized (an unset hardware clock reads as
    /// its epoch year).
    pub fn get_local_time(&mut self) -> io::Result<LocalTime> {
        let utc = self.clock.get()?;
        if utc.year < self.min_plausible_year {
            self.mark_unsynced();
        }
        Ok(LocalTime {
            year: utc.year,
            month: utc.month,
            day: utc.day,
            hour: utc.hour as i8 + self.time_zone_offset_hours,
            minute: utc.minute,
            second: utc.second,
            weekday: utc.weekday + 1,
            tz_offset_hours: self.time_zone_offset_hours,
            is_valid: self.valid,
        })
    }
}
