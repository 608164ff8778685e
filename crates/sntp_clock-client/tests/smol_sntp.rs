// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Async exchange tests on the smol runtime, against a loopback responder.

#![cfg(feature = "smol-runtime")]

mod common;

use std::net::UdpSocket;
use std::time::Duration;

use sntp_client::SyncError;
use sntp_client::smol_sntp;

use common::NEW_YEAR_2024_NTP;

#[test]
fn test_smol_loopback_exchange() {
    common::init_logging();
    smol::block_on(async {
        let port = common::spawn_responder(1, |query| {
            common::build_server_reply(query, 2, [193, 0, 0, 1], NEW_YEAR_2024_NTP)
        });

        let result = smol_sntp::sync_with_timeout("127.0.0.1", port, Duration::from_secs(2))
            .await
            .expect("exchange failed");
        assert!(result.is_valid());
        assert_eq!(result.stratum.0, 2);
        assert!(!result.is_kiss_of_death());
    });
}

#[test]
fn test_smol_timeout_against_silent_peer() {
    common::init_logging();
    smol::block_on(async {
        let silent = UdpSocket::bind("127.0.0.1:0").expect("bind silent socket");
        let port = silent.local_addr().expect("silent local addr").port();

        let err = smol_sntp::sync_with_timeout("127.0.0.1", port, Duration::from_millis(200))
            .await
            .expect_err("no reply expected");
        assert_eq!(err, SyncError::Timeout);
        drop(silent);
    });
}

#[test]
fn test_smol_unresolvable_host() {
    common::init_logging();
    smol::block_on(async {
        let err = smol_sntp::sync("this.hostname.definitely.does.not.exist.invalid", 123)
            .await
            .expect_err("resolution should fail");
        assert!(matches!(
            err,
            SyncError::Resolution { .. } | SyncError::Timeout
        ));
    });
}
