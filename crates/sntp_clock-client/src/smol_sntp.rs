// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! One-shot synchronization on the smol runtime.
//!
//! Mirrors [`async_sntp`](crate::async_sntp) for applications built on smol:
//! the exchange runs inside [`futures_lite::future::or`] racing a
//! [`smol::Timer`], so a lost reply resolves to [`SyncError::Timeout`]
//! instead of hanging.

use log::debug;

use std::time::Duration;

use smol::net::UdpSocket;

use sntp_proto::wall_time;

use crate::error::SyncError;
use crate::session::{self, SyncResult, SystemTicks, TickClock};
use crate::transport::bind_addr_for;

/// Runs one exchange with a one second timeout.
pub async fn sync(host: &str, port: u16) -> Result<SyncResult, SyncError> {
    sync_with_timeout(host, port, Duration::from_secs(1)).await
}

/// Runs one exchange, abandoning it after `timeout`.
pub async fn sync_with_timeout(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<SyncResult, SyncError> {
    futures_lite::future::or(sync_inner(host, port), async {
        smol::Timer::after(timeout).await;
        Err(SyncError::Timeout)
    })
    .await
}

async fn sync_inner(host: &str, port: u16) -> Result<SyncResult, SyncError> {
    let target = smol::net::resolve((host, port))
        .await
        .ok()
        .and_then(|addrs| addrs.into_iter().next())
        .ok_or_else(|| SyncError::Resolution {
            host: host.to_string(),
        })?;

    let socket = UdpSocket::bind(bind_addr_for(&target))
        .await
        .map_err(|e| SyncError::Transport {
            op: "bind",
            kind: e.kind(),
        })?;
    socket
        .connect(target)
        .await
        .map_err(|e| SyncError::Transport {
            op: "connect",
            kind: e.kind(),
        })?;

    let ticks = SystemTicks::new();
    let t1 = wall_time::ticks_to_timestamp(ticks.now_micros());
    let query = session::build_query(t1)?;
    socket.send(&query).await.map_err(|e| SyncError::Transport {
        op: "send",
        kind: e.kind(),
    })?;
    debug!("query sent to {target}");

    let mut recv_buf = [0u8; 1024];
    let recv_len = socket
        .recv(&mut recv_buf)
        .await
        .map_err(|e| SyncError::Transport {
            op: "recv",
            kind: e.kind(),
        })?;
    // T4 is captured on arrival, before any decoding.
    let t4 = wall_time::ticks_to_timestamp(ticks.now_micros());
    debug!("{recv_len} byte reply from {target}");

    session::process_reply(
        &recv_buf,
        recv_len,
        wall_time::timestamp_to_seconds(t1),
        wall_time::timestamp_to_seconds(t4),
    )
}
