// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types for synchronization attempts.
//!
//! Every failure of an exchange is a [`SyncError`] variant. The type is
//! `Clone` so outcomes can be recorded and inspected after the fact, and it
//! converts to [`io::Error`] with a stable [`io::ErrorKind`] mapping for
//! callers that live in `io::Result` land. The original `SyncError` is
//! recoverable from such an `io::Error` via `get_ref()`:
//!
//! ```
//! use std::io;
//! use sntp_client::SyncError;
//!
//! let io_err: io::Error = SyncError::Timeout.into();
//! assert_eq!(io_err.kind(), io::ErrorKind::TimedOut);
//! let inner = io_err.get_ref().unwrap().downcast_ref::<SyncError>().unwrap();
//! assert_eq!(*inner, SyncError::Timeout);
//! ```

// Re-export the proto parse error so callers need only this module.
pub use sntp_proto::error::ParseError;

use std::fmt;
use std::io;

use sntp_proto::protocol::{LeapIndicator, Mode};

/// Errors produced by a synchronization exchange.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyncError {
    /// The reply datagram failed structural decoding.
    Parse(ParseError),
    /// The server host name did not resolve to a usable address.
    Resolution {
        /// The host that failed to resolve.
        host: String,
    },
    /// A socket-level operation failed.
    Transport {
        /// The operation that failed (`"bind"`, `"connect"`, `"send"`, `"recv"`).
        op: &'static str,
        /// The error kind reported by the operating system.
        kind: io::ErrorKind,
    },
    /// The reply decoded but failed the validity gate.
    InvalidFrame {
        /// Leap indicator carried by the reply.
        leap_indicator: LeapIndicator,
        /// Mode carried by the reply.
        mode: Mode,
    },
    /// No reply arrived within the configured timeout.
    Timeout,
    /// Another exchange on the same session is still awaiting its reply.
    Busy,
}

// ── Display implementations ─────────────────────────────────────────

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Parse(e) => write!(f, "{e}"),
            SyncError::Resolution { host } => {
                write!(f, "host resolved to no socket addresses: {host}")
            }
            SyncError::Transport { op, kind } => write!(f, "transport {op} failed: {kind}"),
            SyncError::InvalidFrame {
                leap_indicator,
                mode,
            } => write!(
                f,
                "invalid reply: leap indicator {leap_indicator:?}, mode {mode:?}"
            ),
            SyncError::Timeout => write!(f, "no reply within the configured timeout"),
            SyncError::Busy => write!(f, "an exchange is already awaiting its reply"),
        }
    }
}

// ── Error trait implementations ─────────────────────────────────────

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

// ── From conversions ────────────────────────────────────────────────

impl From<ParseError> for SyncError {
    fn from(err: ParseError) -> SyncError {
        SyncError::Parse(err)
    }
}

impl From<SyncError> for io::Error {
    fn from(err: SyncError) -> io::Error {
        let kind = match &err {
            SyncError::Parse(_) | SyncError::InvalidFrame { .. } => io::ErrorKind::InvalidData,
            SyncError::Resolution { .. } => io::ErrorKind::InvalidInput,
            SyncError::Transport { kind, .. } => *kind,
            SyncError::Timeout => io::ErrorKind::TimedOut,
            SyncError::Busy => io::ErrorKind::WouldBlock,
        };
        io::Error::new(kind, err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
