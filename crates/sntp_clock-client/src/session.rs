// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! One-shot synchronization exchange: build the query, await the reply,
//! validate it, and derive clock offset and round-trip delay.
//!
//! [`SyncSession::start`] performs exactly one attempt per call and enforces
//! single-flight: a second `start` while one is awaiting its reply fails fast
//! with [`SyncError::Busy`]. Retry cadence is the caller's policy (see
//! [`crate::client`] for the periodic layer).

use log::{debug, warn};

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::SyncError;
use crate::transport::Transport;
use sntp_proto::protocol::{self, ConstPackedSizeBytes, Frame, FromBytes, ToBytes};
use sntp_proto::wall_time;

/// Monotonic microsecond counter, the timescale for T1 and T4.
pub trait TickClock {
    /// Microseconds elapsed since an arbitrary fixed origin.
    fn now_micros(&self) -> u64;
}

/// Tick clock backed by [`std::time::Instant`], anchored at construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemTicks {
    origin: std::time::Instant,
}

impl SystemTicks {
    /// Create a tick clock whose origin is the moment of construction.
    pub fn new() -> Self {
        SystemTicks {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock for SystemTicks {
    fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Per-exchange configuration handed to [`SyncSession::start`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncConfig {
    /// Server host name or IP literal.
    pub host: String,
    /// Server UDP port.
    pub port: u16,
    /// How long to wait for the reply datagram.
    pub timeout: Duration,
}

impl SyncConfig {
    /// Configuration for `host` with the standard SNTP port and a 1 second
    /// reply timeout.
    pub fn new(host: impl Into<String>) -> Self {
        SyncConfig {
            host: host.into(),
            port: u16::from(protocol::PORT),
            timeout: Duration::from_secs(1),
        }
    }
}

/// The outcome of a successful exchange: the decoded reply plus the derived
/// timing quantities.
///
/// Implements `Deref<Target = Frame>`, so reply fields can be read directly
/// (e.g. `result.stratum`, `result.transmit_timestamp`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncResult {
    /// The decoded server reply.
    pub frame: Frame,
    /// Clock offset in seconds: the correction that maps the local tick
    /// timescale onto server time, `((T2 - T1) + (T3 - T4)) / 2`.
    ///
    /// T1 and T4 are tick-derived while T2 and T3 carry the server's NTP-era
    /// seconds, so against a live server this value is dominated by the gap
    /// between the two timescales. Its fractional part is the sub-second
    /// correction; the sign follows the server-minus-local convention.
    pub offset_seconds: f64,
    /// Round-trip delay in seconds, `(T4 - T1) - (T3 - T2)`.
    ///
    /// May be negative when the clocks skew within the exchange; reported
    /// as-is, never clamped.
    pub delay_seconds: f64,
}

impl Deref for SyncResult {
    type Target = Frame;
    fn deref(&self) -> &Self::Target {
        &self.frame
    }
}

/// Serialize the client query carrying `t1` in the transmit-timestamp field,
/// so the server's echo (origin timestamp) hands T1 back to the exchange.
pub(crate) fn build_query(
    t1: protocol::TimestampFormat,
) -> Result<[u8; Frame::PACKED_SIZE_BYTES], SyncError> {
    let query = Frame::client_query(t1);
    let mut buf = [0u8; Frame::PACKED_SIZE_BYTES];
    query.to_bytes(&mut buf).map_err(SyncError::Parse)?;
    Ok(buf)
}

/// Decode and validate a reply, then derive offset and delay.
///
/// `t1_seconds` and `t4_seconds` are the tick-derived local timestamps; T2
/// and T3 come from the reply. Kiss-of-death replies pass this gate (they are
/// well-formed server datagrams); the caller decides their policy.
pub(crate) fn process_reply(
    recv_buf: &[u8],
    recv_len: usize,
    t1_seconds: f64,
    t4_seconds: f64,
) -> Result<SyncResult, SyncError> {
    let (frame, _) = Frame::from_bytes(&recv_buf[..recv_len]).map_err(SyncError::Parse)?;
    if !frame.is_valid() {
        warn!(
            "reply failed validity gate: leap_indicator={:?} mode={:?}",
            frame.leap_indicator, frame.mode
        );
        return Err(SyncError::InvalidFrame {
            leap_indicator: frame.leap_indicator,
            mode: frame.mode,
        });
    }

    let t2_seconds = wall_time::timestamp_to_seconds(frame.receive_timestamp);
    let t3_seconds = wall_time::timestamp_to_seconds(frame.transmit_timestamp);
    let (offset_seconds, delay_seconds) =
        wall_time::offset_and_delay(t1_seconds, t2_seconds, t3_seconds, t4_seconds);

    Ok(SyncResult {
        frame,
        offset_seconds,
        delay_seconds,
    })
}

/// A single-flight synchronization exchange.
///
/// The session itself holds no result: `Synced` and `Failed` outcomes are the
/// return value of [`start`](Self::start), and the only state surviving a
/// call is the in-flight guard.
#[derive(Debug, Default)]
pub struct SyncSession {
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the exchange leaves scope, on every path.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl SyncSession {
    /// Create an idle session.
    pub fn new() -> Self {
        SyncSession {
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether an exchange is currently awaiting its reply.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one exchange: resolve the server, send the query, await the reply
    /// within `config.timeout`, validate, and compute offset and delay.
    ///
    /// One attempt per call, no internal retry. Fails fast with
    /// [`SyncError::Busy`] if another exchange on this session is still
    /// awaiting its reply.
    pub fn start<T, C>(
        &self,
        transport: &mut T,
        ticks: &C,
        config: &SyncConfig,
    ) -> Result<SyncResult, SyncError>
    where
        T: Transport,
        C: TickClock,
    {
        if self.in_flight.swap(true, Ordering::Acquire) {
            return Err(SyncError::Busy);
        }
        let _guard = InFlightGuard {
            flag: &self.in_flight,
        };
        self.exchange(transport, ticks, config)
    }

    fn exchange<T, C>(
        &self,
        transport: &mut T,
        ticks: &C,
        config: &SyncConfig,
    ) -> Result<SyncResult, SyncError>
    where
        T: Transport,
        C: TickClock,
    {
        let addr = transport
            .resolve(&config.host, config.port)
            .map_err(|e| {
                warn!("resolving {} failed: {}", config.host, e);
                SyncError::Resolution {
                    host: config.host.clone(),
                }
            })?;

        let t1_micros = ticks.now_micros();
        let t1 = wall_time::ticks_to_timestamp(t1_micros);
        let query = build_query(t1)?;

        transport.send(addr, &query).map_err(|e| {
            warn!("sending query to {} failed: {}", addr, e);
            SyncError::Transport {
                op: "send",
                kind: e.kind(),
            }
        })?;
        debug!("query sent to {} (t1 = {} us)", addr, t1_micros);

        let mut recv_buf = [0u8; 1024];
        let recv_len = match transport.recv(&mut recv_buf, config.timeout) {
            Ok(len) => len,
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                debug!("no reply from {} within {:?}", addr, config.timeout);
                return Err(SyncError::Timeout);
            }
            Err(e) => {
                warn!("receiving reply from {} failed: {}", addr, e);
                return Err(SyncError::Transport {
                    op: "recv",
                    kind: e.kind(),
                });
            }
        };
        // T4 is captured on arrival, before any decoding.
        let t4_micros = ticks.now_micros();

        let t1_seconds = wall_time::timestamp_to_seconds(t1);
        let t4_seconds = wall_time::timestamp_to_seconds(wall_time::ticks_to_timestamp(t4_micros));
        process_reply(&recv_buf, recv_len, t1_seconds, t4_seconds)
    }
}
