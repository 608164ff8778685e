// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/*!
SNTP client (RFC 4330) that keeps a calendar clock synchronized.

# Example
Shows how to fetch the current time from the requested SNTP server and
render it in the local timezone.

```rust,no_run
extern crate chrono;
extern crate sntp_client;

use chrono::TimeZone;

fn main() {
    let mut client = sntp_client::SntpClient::builder()
        .server("time.nist.gov")
        .build_system();
    let result = client.sync_now().unwrap();

    let utc = sntp_client::wall_time::ntp_to_calendar(
        result.transmit_timestamp,
        client.host_epoch(),
    );
    let local_time = chrono::Local
        .timestamp_opt(sntp_client::wall_time::calendar_to_unix_seconds(&utc), 0)
        .unwrap();
    println!("{}", local_time);
    println!("Offset: {:.6} seconds", result.offset_seconds);
}
```

For a long-running clock, call [`SntpClient::tick`] once per second instead:
it resynchronizes on a configurable cadence, backs off after failures and
kiss-of-death replies, and returns a [`LocalTime`] ready for display.

# Feature Flags

| Feature | Default | Description |
|---------|---------|-------------|
| `tokio` | no | One-shot async synchronization using the tokio runtime. |
| `smol-runtime` | no | One-shot async synchronization using the smol runtime. |
*/

#![warn(missing_docs)]

// Re-export protocol types from sntp_proto for convenience.
pub use sntp_proto::{protocol, wall_time};

/// Synchronization error type and its `io::Error` mapping.
pub mod error;

/// Datagram transport collaborator and the standard UDP implementation.
pub mod transport;

/// The single-flight query/reply exchange and its configuration.
pub mod session;

/// Synchronization state over an injected calendar clock.
pub mod clock_state;

/// Periodic synchronization driver with backoff and kiss-of-death policy.
pub mod client;

/// One-shot async synchronization using the tokio runtime.
///
/// See [`async_sntp::sync`] and [`async_sntp::sync_with_timeout`] for details.
#[cfg(feature = "tokio")]
pub mod async_sntp;

/// One-shot async synchronization using the smol runtime.
///
/// See [`smol_sntp::sync`] and [`smol_sntp::sync_with_timeout`] for details.
#[cfg(feature = "smol-runtime")]
pub mod smol_sntp;

pub use client::{SntpClient, SntpClientBuilder};
pub use clock_state::{CalendarClock, ClockState, LocalTime, SystemCalendarClock};
pub use error::SyncError;
pub use session::{SyncConfig, SyncResult, SyncSession, SystemTicks, TickClock};
pub use transport::{Transport, UdpTransport};
