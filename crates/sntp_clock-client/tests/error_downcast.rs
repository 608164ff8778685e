// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Tests for error type downcasting through the io::Error boundary.

use std::io;

use sntp_client::SyncError;
use sntp_client::error::ParseError;
use sntp_client::protocol::{LeapIndicator, Mode};

#[test]
fn test_parse_error_roundtrip() {
    let err = SyncError::Parse(ParseError::Truncated {
        needed: 48,
        available: 12,
    });
    let io_err: io::Error = err.into();

    assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);

    let inner = io_err
        .get_ref()
        .unwrap()
        .downcast_ref::<SyncError>()
        .unwrap();
    assert!(matches!(
        inner,
        SyncError::Parse(ParseError::Truncated {
            needed: 48,
            available: 12,
        })
    ));
}

#[test]
fn test_timeout_roundtrip() {
    let io_err: io::Error = SyncError::Timeout.into();

    assert_eq!(io_err.kind(), io::ErrorKind::TimedOut);

    let inner = io_err
        .get_ref()
        .unwrap()
        .downcast_ref::<SyncError>()
        .unwrap();
    assert!(matches!(inner, SyncError::Timeout));
}

#[test]
fn test_resolution_roundtrip() {
    let err = SyncError::Resolution {
        host: "pool.invalid".to_string(),
    };
    let io_err: io::Error = err.into();

    assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);

    let inner = io_err
        .get_ref()
        .unwrap()
        .downcast_ref::<SyncError>()
        .unwrap();
    assert!(matches!(inner, SyncError::Resolution { host } if host == "pool.invalid"));
}

#[test]
fn test_transport_keeps_the_os_error_kind() {
    let err = SyncError::Transport {
        op: "send",
        kind: io::ErrorKind::PermissionDenied,
    };
    let io_err: io::Error = err.into();

    assert_eq!(io_err.kind(), io::ErrorKind::PermissionDenied);
    assert!(
        io_err
            .get_ref()
            .unwrap()
            .downcast_ref::<SyncError>()
            .is_some()
    );
}

#[test]
fn test_invalid_frame_roundtrip() {
    let err = SyncError::InvalidFrame {
        leap_indicator: LeapIndicator::AlarmUnsynchronized,
        mode: Mode::Server,
    };
    let io_err: io::Error = err.into();

    assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);

    let inner = io_err
        .get_ref()
        .unwrap()
        .downcast_ref::<SyncError>()
        .unwrap();
    assert!(matches!(
        inner,
        SyncError::InvalidFrame {
            leap_indicator: LeapIndicator::AlarmUnsynchronized,
            mode: Mode::Server,
        }
    ));
}

#[test]
fn test_all_variants_downcast() {
    let variants: Vec<SyncError> = vec![
        SyncError::Parse(ParseError::Truncated {
            needed: 48,
            available: 0,
        }),
        SyncError::Resolution {
            host: "pool.invalid".to_string(),
        },
        SyncError::Transport {
            op: "recv",
            kind: io::ErrorKind::ConnectionRefused,
        },
        SyncError::InvalidFrame {
            leap_indicator: LeapIndicator::NoWarning,
            mode: Mode::Broadcast,
        },
        SyncError::Timeout,
        SyncError::Busy,
    ];

    for err in variants {
        let io_err: io::Error = err.into();
        assert!(
            io_err
                .get_ref()
                .unwrap()
                .downcast_ref::<SyncError>()
                .is_some(),
            "failed to downcast: {}",
            io_err
        );
    }
}

#[test]
fn test_display_messages_are_nonempty() {
    let errors: Vec<SyncError> = vec![
        SyncError::Parse(ParseError::Truncated {
            needed: 48,
            available: 47,
        }),
        SyncError::Resolution {
            host: "pool.invalid".to_string(),
        },
        SyncError::Transport {
            op: "bind",
            kind: io::ErrorKind::AddrInUse,
        },
        SyncError::InvalidFrame {
            leap_indicator: LeapIndicator::AlarmUnsynchronized,
            mode: Mode::Client,
        },
        SyncError::Timeout,
        SyncError::Busy,
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty(), "display should not be empty");
    }
}
