// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Exchange tests against a loopback responder.
//!
//! A thread-local UDP responder stands in for a real server, so these tests
//! exercise the full socket path deterministically: no public NTP
//! infrastructure, no network flakiness.

mod common;

use std::net::UdpSocket;
use std::time::Duration;

use sntp_client::error::ParseError;
use sntp_client::protocol::Mode;
use sntp_client::session::{SyncConfig, SyncResult, SyncSession, SystemTicks};
use sntp_client::{SntpClient, SyncError, UdpTransport};

use common::NEW_YEAR_2024_NTP;

fn exchange_with(port: u16, timeout: Duration) -> Result<SyncResult, SyncError> {
    let session = SyncSession::new();
    let mut transport = UdpTransport::new();
    let ticks = SystemTicks::new();
    let mut config = SyncConfig::new("127.0.0.1");
    config.port = port;
    config.timeout = timeout;
    session.start(&mut transport, &ticks, &config)
}

#[test]
fn test_loopback_exchange_produces_valid_result() {
    common::init_logging();
    let port = common::spawn_responder(1, |query| {
        common::build_server_reply(query, 2, [193, 0, 0, 1], NEW_YEAR_2024_NTP)
    });

    let result = exchange_with(port, Duration::from_secs(2)).expect("exchange failed");
    assert!(result.is_valid());
    assert_eq!(result.stratum.0, 2);
    assert!(!result.is_kiss_of_death());

    // T1/T4 count from the session's tick origin while the server timescale
    // is NTP-era seconds, so the offset is dominated by that gap.
    assert!(result.offset_seconds > 1.0e9);
    assert!(result.delay_seconds >= 0.0);
    assert!(result.delay_seconds < 1.0, "loopback delay {:.6}", result.delay_seconds);
}

#[test]
fn test_no_reply_yields_timeout() {
    common::init_logging();
    // Bound but silent. Keeping the socket alive prevents the kernel from
    // answering the query with port-unreachable.
    let silent = UdpSocket::bind("127.0.0.1:0").expect("bind silent socket");
    let port = silent.local_addr().expect("silent local addr").port();

    let err = exchange_with(port, Duration::from_millis(200)).expect_err("no reply expected");
    assert_eq!(err, SyncError::Timeout);
    drop(silent);
}

#[test]
fn test_kiss_of_death_reply_completes_the_exchange() {
    common::init_logging();
    let port = common::spawn_responder(1, |query| {
        common::build_server_reply(query, 0, *b"RATE", NEW_YEAR_2024_NTP)
    });

    let result = exchange_with(port, Duration::from_secs(2)).expect("kiss-of-death is well-formed");
    assert!(result.is_kiss_of_death());
    assert_eq!(result.kiss_code(), Some(*b"RATE"));
}

#[test]
fn test_client_mode_reply_fails_validity() {
    common::init_logging();
    let port = common::spawn_responder(1, |query| {
        let mut reply = common::build_server_reply(query, 2, [193, 0, 0, 1], NEW_YEAR_2024_NTP);
        reply[0] = 0x23; // mode 3 (client)
        reply
    });

    let err = exchange_with(port, Duration::from_secs(2)).expect_err("reply should fail the gate");
    match err {
        SyncError::InvalidFrame { mode, .. } => assert_eq!(mode, Mode::Client),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_truncated_reply_is_a_parse_error() {
    common::init_logging();
    let port = common::spawn_responder(1, |query| {
        common::build_server_reply(query, 2, [193, 0, 0, 1], NEW_YEAR_2024_NTP)[..40].to_vec()
    });

    let err = exchange_with(port, Duration::from_secs(2)).expect_err("short reply should fail");
    assert_eq!(
        err,
        SyncError::Parse(ParseError::Truncated {
            needed: 48,
            available: 40,
        })
    );
}

#[test]
fn test_client_tick_synchronizes_against_responder() {
    common::init_logging();
    let port = common::spawn_responder(1, |query| {
        common::build_server_reply(query, 2, [193, 0, 0, 1], NEW_YEAR_2024_NTP)
    });

    let mut client = SntpClient::builder()
        .server("127.0.0.1")
        .port(port)
        .timeout(Duration::from_secs(2))
        .build_system();
    assert!(!client.is_synchronized());

    // The first tick finds the clock invalid and synchronizes inline.
    let local = client.tick().expect("tick failed");
    assert!(client.is_synchronized());
    assert!(local.is_valid);
    assert_eq!((local.year, local.month, local.day), (2024, 1, 1));
    assert_eq!(local.weekday, 1); // Monday
    assert!(matches!(client.last_result(), Some(Ok(_))));
}
