// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! One-shot synchronization on the tokio runtime.
//!
//! For callers embedding an exchange in an async application instead of
//! driving an [`SntpClient`](crate::client::SntpClient) tick loop. The
//! semantics match the blocking [`SyncSession`](crate::session::SyncSession)
//! exchange: same query, same validity gate, same offset and delay
//! arithmetic, with the reply timeout enforced by `tokio::time::timeout`
//! around the whole exchange.

use log::debug;

use std::time::Duration;

use tokio::net::{UdpSocket, lookup_host};

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
    match tokio::time::timeout(timeout, sync_inner(host, port)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SyncError::Timeout),
    }
}

async fn sync_inner(host: &str, port: u16) -> Result<SyncResult, SyncError> {
    let target = lookup_host((host, port))
        .await
        .ok()
        .and_then(|mut addrs| addrs.next())
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
