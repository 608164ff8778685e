//! Types and constants that precisely match the specification.
//!
//! Provides `ReadBytes` and `WriteBytes` implementations which extend the byteorder crate
//! `WriteBytesExt` and `ReadBytesExt` traits with the ability to read and write types from the
//! SNTP protocol respectively, plus `FromBytes`/`ToBytes` slice codecs for `no_std` use.
//!
//! Documentation is largely derived (and often copied directly) from IETF RFC 4330.

/// NTP port number.
pub const PORT: u8 = 123;

/// Minimum poll exponent (16 s).
pub const MINPOLL: u8 = 4;

/// Maximum poll exponent (36 h).
pub const MAXPOLL: u8 = 17;

/// 2^exp for a signed 8-bit exponent.
///
/// The poll and precision header fields are log2 seconds. Every power of two from 2^-128 to
/// 2^127 is a normal `f64`, so the value can be built directly from the exponent bits.
pub fn exp2_i8(exp: i8) -> f64 {
    f64::from_bits(((exp as i64 + 1023) as u64) << 52)
}

mod bytes;
#[cfg(feature = "std")]
mod io;
mod traits;
mod types;

pub use self::traits::*;
pub use self::types::*;
