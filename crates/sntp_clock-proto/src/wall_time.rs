use crate::protocol;

/// The number of seconds from 1st January 1900 UTC to the start of the Unix epoch.
pub const UNIX_EPOCH_DELTA: i64 = 2_208_988_800;

/// The number of seconds from 1st January 1900 UTC to 1st January 2000 UTC, the native epoch of
/// many embedded calendar clocks.
pub const Y2K_EPOCH_DELTA: i64 = 3_155_673_600;

// The NTP fractional scale (2^32).
const NTP_SCALE: f64 = 4_294_967_296.0;

const SECS_PER_DAY: i64 = 86_400;

/// The epoch a host's calendar arithmetic counts from.
///
/// NTP timestamps count seconds from 1900; hosts count from their own epoch. The matching
/// delta must be subtracted before calendar conversion. The variant is selected once at
/// startup by probing the calendar year the host reports for second zero: a host whose zero
/// second falls in the year 2000 counts from the year-2000 epoch, any other answer is taken
/// as a Unix epoch.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum HostEpoch {
    /// Seconds count from 1970-01-01 00:00:00 UTC.
    #[default]
    Unix,
    /// Seconds count from 2000-01-01 00:00:00 UTC.
    Y2k,
}

impl HostEpoch {
    /// Selects the epoch from the calendar year a host reports for second zero.
    pub fn from_zero_year(year: u16) -> Self {
        if year == 2000 { HostEpoch::Y2k } else { HostEpoch::Unix }
    }

    /// Seconds from the NTP prime epoch (1900) to this host epoch.
    pub fn delta(&self) -> i64 {
        match self {
            HostEpoch::Unix => UNIX_EPOCH_DELTA,
            HostEpoch::Y2k => Y2K_EPOCH_DELTA,
        }
    }

    /// The first calendar year of this epoch.
    pub fn base_year(&self) -> u16 {
        match self {
            HostEpoch::Unix => 1970,
            HostEpoch::Y2k => 2000,
        }
    }
}

/// A broken-down civil date and time (UTC unless a caller has applied a zone offset).
///
/// Field conventions follow the C `gmtime` structure as exposed by embedded runtimes:
/// `weekday` is 0-based starting at Monday and `yearday` is 1-based.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CalendarTime {
    /// Full calendar year, e.g. 2024.
    pub year: u16,
    /// Month of the year, 1-12.
    pub month: u8,
    /// Day of the month, 1-31.
    pub day: u8,
    /// Hour of the day, 0-23.
    pub hour: u8,
    /// Minute of the hour, 0-59.
    pub minute: u8,
    /// Second of the minute, 0-59.
    pub second: u8,
    /// Day of the week, 0 = Monday through 6 = Sunday.
    pub weekday: u8,
    /// Day of the year, 1-366.
    pub yearday: u16,
}

impl core::fmt::Display for CalendarTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

// Proleptic Gregorian civil calendar arithmetic, anchored at 1970-01-01 = day 0.
// No leap-second table; every day is exactly 86400 seconds.

fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { y + 1 } else { y };
    (year, month as u8, day as u8)
}

fn calendar_from_days_and_tod(days: i64, time_of_day: i64) -> CalendarTime {
    let (year, month, day) = civil_from_days(days);
    // 1970-01-01 (day 0) was a Thursday, the fourth day of a Monday-based week.
    let weekday = (days + 3).rem_euclid(7) as u8;
    let yearday = (days - days_from_civil(year, 1, 1) + 1) as u16;
    CalendarTime {
        year: year as u16,
        month,
        day,
        hour: (time_of_day / 3600) as u8,
        minute: (time_of_day / 60 % 60) as u8,
        second: (time_of_day % 60) as u8,
        weekday,
        yearday,
    }
}

/// Converts seconds since the Unix epoch to civil calendar time.
pub fn calendar_from_unix_seconds(secs: i64) -> CalendarTime {
    let days = secs.div_euclid(SECS_PER_DAY);
    let time_of_day = secs.rem_euclid(SECS_PER_DAY);
    calendar_from_days_and_tod(days, time_of_day)
}

/// Converts civil calendar time back to seconds since the Unix epoch.
///
/// Only the year, month, day, hour, minute and second fields are read. The inverse of
/// [`calendar_from_unix_seconds`] for every in-range value.
pub fn calendar_to_unix_seconds(t: &CalendarTime) -> i64 {
    let days = days_from_civil(i64::from(t.year), i64::from(t.month), i64::from(t.day));
    days * SECS_PER_DAY
        + i64::from(t.hour) * 3600
        + i64::from(t.minute) * 60
        + i64::from(t.second)
}

/// Converts an NTP timestamp to civil calendar time for a host counting from `epoch`.
///
/// The integer seconds of the timestamp, less the epoch delta, are interpreted as seconds
/// since the host epoch; the fraction is discarded. A zero timestamp therefore maps to
/// 1900-01-01 00:00:00 under either epoch.
pub fn ntp_to_calendar(ts: protocol::TimestampFormat, epoch: HostEpoch) -> CalendarTime {
    let secs = i64::from(ts.seconds) - epoch.delta();
    let base_days = days_from_civil(i64::from(epoch.base_year()), 1, 1);
    let days = base_days + secs.div_euclid(SECS_PER_DAY);
    let time_of_day = secs.rem_euclid(SECS_PER_DAY);
    calendar_from_days_and_tod(days, time_of_day)
}

/// Converts a monotonic microsecond tick count to an NTP timestamp.
///
/// Seconds wrap at 2^32 (about 136 years of uptime). The fraction is rounded to the nearest
/// 2^-32 second.
pub fn ticks_to_timestamp(micros: u64) -> protocol::TimestampFormat {
    let seconds = (micros / 1_000_000) as u32;
    let frac_micros = micros % 1_000_000;
    let fraction = ((frac_micros << 32) + 500_000) / 1_000_000;
    protocol::TimestampFormat {
        seconds,
        fraction: fraction as u32,
    }
}

/// The timestamp as floating-point seconds: `seconds + fraction / 2^32`.
pub fn timestamp_to_seconds(ts: protocol::TimestampFormat) -> f64 {
    ts.seconds as f64 + ts.fraction as f64 / NTP_SCALE
}

/// The RFC 4330 round-trip calculation over the four exchange timestamps, all in seconds on a
/// common timescale: T1 client transmit, T2 server receive, T3 server transmit, T4 client
/// receive.
///
/// Returns `(offset, delay)` where `offset = ((T2 - T1) + (T3 - T4)) / 2` is the server clock
/// minus the client clock and `delay = (T4 - T1) - (T3 - T2)` is the network round-trip time.
/// Neither value is clamped; a negative delay indicates clock skew between the captures and is
/// reported as-is.
pub fn offset_and_delay(t1: f64, t2: f64, t3: f64, t4: f64) -> (f64, f64) {
    let offset = ((t2 - t1) + (t3 - t4)) / 2.0;
    let delay = (t4 - t1) - (t3 - t2);
    (offset, delay)
}
