// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Periodic synchronization driver.
//!
//! [`SntpClient`] owns a [`SyncSession`], a [`ClockState`] and a retry
//! schedule, and turns the one-shot exchange into a long-running clock
//! discipline: the caller invokes [`tick`](SntpClient::tick) once per second
//! and reads back a [`LocalTime`] for display, while the client decides when
//! a new exchange is due. Failed exchanges and RATE kiss-of-death replies
//! push the next attempt out on a doubling backoff; DENY and RSTR replies
//! demobilize the client for good.

use log::{debug, warn};

use std::io;
use std::time::Duration;

use sntp_proto::protocol::{self, MAXPOLL, MINPOLL};
use sntp_proto::wall_time::{self, HostEpoch};

use crate::clock_state::{CalendarClock, ClockState, LocalTime, SystemCalendarClock};
use crate::error::SyncError;
use crate::session::{SyncConfig, SyncResult, SyncSession, SystemTicks, TickClock};
use crate::transport::{Transport, UdpTransport};

/// Server pool queried when none is configured.
pub const DEFAULT_HOST: &str = "fr.pool.ntp.org";
/// Reply timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// Stored years below this mark the clock unsynchronized.
pub const DEFAULT_MIN_PLAUSIBLE_YEAR: u16 = 2022;
/// Seconds between routine resynchronizations.
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 3600;

/// Configures and builds an [`SntpClient`].
#[derive(Clone, Debug)]
pub struct SntpClientBuilder {
    host: String,
    port: u16,
    timeout: Duration,
    time_zone_offset_hours: i8,
    min_plausible_year: u16,
    resync_interval_secs: Option<u64>,
    min_backoff_exponent: u8,
    max_backoff_exponent: u8,
}

impl SntpClientBuilder {
    /// Builder preloaded with the defaults above.
    pub fn new() -> Self {
        SntpClientBuilder {
            host: DEFAULT_HOST.to_string(),
            port: u16::from(protocol::PORT),
            timeout: DEFAULT_TIMEOUT,
            time_zone_offset_hours: 0,
            min_plausible_year: DEFAULT_MIN_PLAUSIBLE_YEAR,
            resync_interval_secs: Some(DEFAULT_RESYNC_INTERVAL_SECS),
            min_backoff_exponent: MINPOLL,
            max_backoff_exponent: MAXPOLL,
        }
    }

    /// Sets the server host name or address literal.
    pub fn server(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the server UDP port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets how long a single exchange waits for a reply.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the display timezone as whole hours east of UTC, clamped
    /// to -12..=14.
    pub fn time_zone_offset(mut self, hours: i8) -> Self {
        self.time_zone_offset_hours = hours.clamp(-12, 14);
        self
    }

    /// Sets the year below which a stored time is treated as unset.
    pub fn min_plausible_year(mut self, year: u16) -> Self {
        self.min_plausible_year = year;
        self
    }

    /// Sets the routine resynchronization cadence. `None` resynchronizes only
    /// when the clock is invalid. Sub-second intervals are raised to one
    /// second, the tick granularity.
    pub fn resync_interval(mut self, interval: Option<Duration>) -> Self {
        self.resync_interval_secs = interval.map(|d| d.as_secs().max(1));
        self
    }

    /// Sets the retry backoff floor as a power-of-two exponent in seconds,
    /// clamped to 4..=17.
    pub fn min_backoff(mut self, exponent: u8) -> Self {
        self.min_backoff_exponent = exponent.clamp(MINPOLL, MAXPOLL);
        self
    }

    /// Sets the retry backoff ceiling as a power-of-two exponent in seconds,
    /// clamped to 4..=17.
    pub fn max_backoff(mut self, exponent: u8) -> Self {
        self.max_backoff_exponent = exponent.clamp(MINPOLL, MAXPOLL);
        self
    }

    /// Builds a client over explicit collaborators.
    ///
    /// The NTP era delta is chosen once here from
    /// [`CalendarClock::epoch_year`], so a year-2000 hardware clock and a
    /// Unix-epoch system clock both decode server timestamps correctly.
    pub fn build<T, C, K>(self, transport: T, clock: C, ticks: K) -> SntpClient<T, C, K>
    where
        T: Transport,
        C: CalendarClock,
        K: TickClock,
    {
        let epoch = HostEpoch::from_zero_year(clock.epoch_year());
        let mut config = SyncConfig::new(self.host);
        config.port = self.port;
        config.timeout = self.timeout;
        let min_backoff_exponent = self.min_backoff_exponent;
        let max_backoff_exponent = self.max_backoff_exponent.max(min_backoff_exponent);
        SntpClient {
            transport,
            ticks,
            session: SyncSession::new(),
            state: ClockState::new(clock, self.time_zone_offset_hours, self.min_plausible_year),
            config,
            epoch,
            resync_interval_secs: self.resync_interval_secs,
            min_backoff_exponent,
            max_backoff_exponent,
            backoff_exponent: min_backoff_exponent,
            seconds_until_retry: 0,
            seconds_since_sync: 0,
            demobilized: false,
            last_result: None,
        }
    }

    /// Builds a client over the system collaborators: a fresh UDP socket per
    /// exchange, a corrected [`SystemCalendarClock`] and monotonic
    /// [`SystemTicks`].
    pub fn build_system(self) -> SntpClient {
        self.build(
            UdpTransport::new(),
            SystemCalendarClock::new(),
            SystemTicks::new(),
        )
    }
}

impl Default for SntpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A clock kept in sync with an SNTP server.
///
/// Generic over the [`Transport`] carrying datagrams, the [`CalendarClock`]
/// storing UTC time and the [`TickClock`] timestamping exchanges, with the
/// system implementations as defaults.
pub struct SntpClient<T = UdpTransport, C = SystemCalendarClock, K = SystemTicks> {
    transport: T,
    ticks: K,
    session: SyncSession,
    state: ClockState<C>,
    config: SyncConfig,
    epoch: HostEpoch,
    resync_interval_secs: Option<u64>,
    min_backoff_exponent: u8,
    max_backoff_exponent: u8,
    backoff_exponent: u8,
    seconds_until_retry: u64,
    seconds_since_sync: u64,
    demobilized: bool,
    last_result: Option<Result<SyncResult, SyncError>>,
}

impl SntpClient {
    /// Starts configuring a client.
    pub fn builder() -> SntpClientBuilder {
        SntpClientBuilder::new()
    }
}

impl<T, C, K> SntpClient<T, C, K>
where
    T: Transport,
    C: CalendarClock,
    K: TickClock,
{
    /// Advances the schedule by one second and returns the current local
    /// time for display.
    ///
    /// Call this once per second. When a synchronization is due the exchange
    /// runs inline before the local time is read back; its outcome is
    /// recorded in [`last_result`](Self::last_result) rather than returned,
    /// so a failed exchange never hides the (possibly invalid) clock reading
    /// from the display.
    pub fn tick(&mut self) -> io::Result<LocalTime> {
        self.seconds_since_sync = self.seconds_since_sync.saturating_add(1);
        if self.seconds_until_retry > 0 {
            self.seconds_until_retry -= 1;
        }
        let local = self.state.get_local_time()?;
        if self.resync_due() {
            let _ = self.sync_now();
            return self.state.get_local_time();
        }
        Ok(local)
    }

    /// Runs one exchange immediately, regardless of the schedule or the
    /// demobilized flag, and applies the outcome.
    ///
    /// On success the calendar clock is set from the server transmit
    /// timestamp and the backoff resets. On failure, and on any
    /// kiss-of-death reply, the next automatic attempt is pushed out.
    pub fn sync_now(&mut self) -> Result<SyncResult, SyncError> {
        let outcome = self.session.start(&mut self.transport, &self.ticks, &self.config);
        let outcome = self.fold_outcome(outcome);
        self.last_result = Some(outcome.clone());
        outcome
    }

    /// Whether the stored time is currently trusted.
    pub fn is_synchronized(&self) -> bool {
        self.state.is_valid()
    }

    /// The outcome of the most recent exchange, if any has run.
    pub fn last_result(&self) -> Option<&Result<SyncResult, SyncError>> {
        self.last_result.as_ref()
    }

    /// Seconds until the schedule will attempt another exchange.
    pub fn seconds_until_retry(&self) -> u64 {
        self.seconds_until_retry
    }

    /// Whether a DENY or RSTR kiss-of-death has permanently stopped
    /// automatic exchanges.
    pub fn is_demobilized(&self) -> bool {
        self.demobilized
    }

    /// The active exchange configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The era delta selected from the calendar clock at build time.
    pub fn host_epoch(&self) -> HostEpoch {
        self.epoch
    }

    /// The synchronization state, for timezone changes and external
    /// invalidation such as link loss.
    pub fn clock_state(&mut self) -> &mut ClockState<C> {
        &mut self.state
    }

    fn resync_due(&self) -> bool {
        if self.demobilized || self.seconds_until_retry > 0 {
            return false;
        }
        if !self.state.is_valid() {
            return true;
        }
        match self.resync_interval_secs {
            Some(interval) => self.seconds_since_sync >= interval,
            None => false,
        }
    }

    fn fold_outcome(
        &mut self,
        outcome: Result<SyncResult, SyncError>,
    ) -> Result<SyncResult, SyncError> {
        match outcome {
            Ok(result) if result.is_kiss_of_death() => {
                warn!(
                    "kiss-of-death from {}: {}",
                    self.config.host, result.reference_id
                );
                let code = result.kiss_code();
                if code == Some(*b"DENY") || code == Some(*b"RSTR") {
                    self.demobilized = true;
                    warn!("server denied service, client demobilized");
                }
                self.back_off();
                Ok(result)
            }
            Ok(result) => {
                let utc = wall_time::ntp_to_calendar(result.transmit_timestamp, self.epoch);
                if let Err(e) = self.state.mark_synced(&utc) {
                    warn!("synchronized time could not be stored: {e}");
                    self.back_off();
                    return Ok(result);
                }
                debug!(
                    "synchronized with {}: offset {:+.6} s, delay {:.6} s",
                    self.config.host, result.offset_seconds, result.delay_seconds
                );
                self.seconds_since_sync = 0;
                self.seconds_until_retry = 0;
                self.backoff_exponent = self.min_backoff_exponent;
                Ok(result)
            }
            Err(e) => {
                debug!("exchange with {} failed: {}", self.config.host, e);
                self.back_off();
                Err(e)
            }
        }
    }

    fn back_off(&mut self) {
        self.seconds_until_retry = 1u64 << self.backoff_exponent;
        if self.backoff_exponent < self.max_backoff_exponent {
            self.backoff_exponent += 1;
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
