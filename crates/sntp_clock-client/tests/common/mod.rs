// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for integration tests.

// Integration test helpers are `pub` so each `tests/*.rs` file can import them
// via `mod common`, but clippy flags them as unreachable outside the crate.
#![allow(unreachable_pub)]

use std::net::UdpSocket;
use std::thread;

/// Initializes `env_logger` for a test run; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 2024-01-01 00:00:00 UTC in NTP-era seconds.
pub const NEW_YEAR_2024_NTP: u32 = 3_913_056_000;

/// Spawns a loopback SNTP responder answering up to `count` queries, and
/// returns the port it listens on.
///
/// `make_reply` receives each query datagram and produces the reply bytes.
/// The responder thread exits after `count` exchanges.
pub fn spawn_responder<F>(count: usize, make_reply: F) -> u16
where
    F: Fn(&[u8]) -> Vec<u8> + Send + 'static,
{
    let sock = UdpSocket::bind("127.0.0.1:0").expect("bind responder socket");
    let port = sock.local_addr().expect("responder local addr").port();
    thread::spawn(move || {
        let mut buf = [0u8; 1024];
        for _ in 0..count {
            let Ok((len, peer)) = sock.recv_from(&mut buf) else {
                return;
            };
            let reply = make_reply(&buf[..len]);
            let _ = sock.send_to(&reply, peer);
        }
    });
    port
}

/// Builds a well-formed server reply to `query`: the given stratum and
/// reference identifier bytes, receive and transmit timestamps at
/// `server_ntp_secs`, and the query's transmit timestamp echoed back as the
/// origin timestamp, the way a real server answers.
pub fn build_server_reply(
    query: &[u8],
    stratum: u8,
    ref_id: [u8; 4],
    server_ntp_secs: u32,
) -> Vec<u8> {
    let mut reply = vec![0u8; 48];
    reply[0] = 0x24; // LI 0, version 4, mode 4 (server)
    reply[1] = stratum;
    reply[2] = 6; // poll
    reply[3] = 0xEC; // precision -20
    reply[12..16].copy_from_slice(&ref_id);
    reply[16..20].copy_from_slice(&(server_ntp_secs - 64).to_be_bytes());
    reply[24..32].copy_from_slice(&query[40..48]);
    reply[32..36].copy_from_slice(&server_ntp_secs.to_be_bytes());
    reply[40..44].copy_from_slice(&server_ntp_secs.to_be_bytes());
    reply
}
