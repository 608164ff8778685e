// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Custom error type for buffer-based SNTP datagram parsing and serialization.
//!
//! [`ParseError`] is designed to be `no_std`-compatible, using no heap allocation.
//! When the `std` feature is enabled, it also implements [`std::error::Error`] and
//! can be converted to [`std::io::Error`].
//!
//! Decoding a reply datagram is total: every bit pattern of every field maps to
//! a named value, so the only structural failure is a buffer shorter than the
//! data it must hold.

use core::fmt;

/// Errors that can occur during buffer-based SNTP datagram parsing or serialization.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The buffer is too short for the fixed 48-byte datagram or a field within it.
    Truncated {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Truncated { needed, available } => {
                write!(
                    f,
                    "datagram truncated: needed {} bytes, got {}",
                    needed, available
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl From<ParseError> for std::io::Error {
    fn from(err: ParseError) -> std::io::Error {
        let kind = match &err {
            ParseError::Truncated { .. } => std::io::ErrorKind::UnexpectedEof,
        };
        std::io::Error::new(kind, err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_display_truncated() {
        let err = ParseError::Truncated {
            needed: 48,
            available: 10,
        };
        assert_eq!(err.to_string(), "datagram truncated: needed 48 bytes, got 10");
    }

    #[test]
    fn test_into_io_error() {
        let parse_err = ParseError::Truncated {
            needed: 48,
            available: 0,
        };
        let io_err: std::io::Error = parse_err.into();
        assert_eq!(io_err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_parse_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ParseError::Truncated {
            needed: 8,
            available: 3,
        });
        assert_eq!(err.to_string(), "datagram truncated: needed 8 bytes, got 3");
    }
}
