// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! SNTP protocol types, datagram codecs, and clock arithmetic.
//!
//! This crate provides the foundational types and parsing logic for the
//! Simple Network Time Protocol (RFC 4330): the fixed 48-byte datagram, the
//! timestamp formats it carries, and the calendar and round-trip arithmetic a
//! synchronizing client needs.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Custom error type for buffer-based SNTP datagram parsing and serialization.
pub mod error;

/// SNTP protocol types and constants (RFC 4330).
pub mod protocol;

/// Calendar, tick-count, and round-trip arithmetic over NTP timestamps.
pub mod wall_time;
