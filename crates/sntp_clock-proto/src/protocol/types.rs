use core::fmt;

use super::ConstPackedSizeBytes;
use super::exp2_i8;

/// **NTP Short Format** - Used in the root delay and root dispersion header fields where the full
/// resolution and range of the other formats are not justified. It includes a 16-bit signed
/// seconds field and a 16-bit fraction field.
///
/// ### Layout
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Seconds              |           Fraction            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ShortFormat {
    /// Seconds component (16-bit signed).
    pub seconds: i16,
    /// Fractional seconds component (16-bit unsigned, units of 1/65536 s).
    pub fraction: u16,
}

/// **NTP Timestamp Format** - Used in packet headers and other places with limited word size. It
/// includes a 32-bit unsigned seconds field spanning 136 years and a 32-bit fraction field
/// resolving 232 picoseconds.
///
/// The prime epoch is 0 h 1 January 1900 UTC, when all bits are zero.
///
/// ### Layout
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Seconds                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Fraction                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimestampFormat {
    /// Seconds since 1900-01-01 00:00:00 UTC (32-bit unsigned).
    pub seconds: u32,
    /// Fractional seconds (32-bit unsigned, resolution of ~232 picoseconds).
    pub fraction: u32,
}

/// A 2-bit integer warning of an impending leap second to be inserted or deleted in the last
/// minute of the current day, with values defined below:
///
/// ```ignore
/// +-------+-----------------------------------------+
/// | Value | Meaning                                 |
/// +-------+-----------------------------------------+
/// | 0     | no warning                              |
/// | 1     | last minute has 61 seconds              |
/// | 2     | last minute has 59 seconds              |
/// | 3     | alarm condition (clock not synchronized)|
/// +-------+-----------------------------------------+
/// ```
///
/// Note that this field is packed in the actual header. Every 2-bit pattern maps to a variant,
/// so decoding the field cannot fail.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum LeapIndicator {
    /// No leap required.
    #[default]
    NoWarning = 0,
    /// Last minute of the day has 61 seconds.
    Minute61 = 1,
    /// Last minute of the day has 59 seconds.
    Minute59 = 2,
    /// Alarm condition: the server clock is not synchronized. Replies carrying this value must
    /// never be used to set the local clock.
    AlarmUnsynchronized = 3,
}

impl LeapIndicator {
    /// Decodes the low two bits of `value`. The wire field is 2 bits wide, so every input maps
    /// to a variant.
    pub fn from_bits(value: u8) -> Self {
        match value & 0b11 {
            0 => LeapIndicator::NoWarning,
            1 => LeapIndicator::Minute61,
            2 => LeapIndicator::Minute59,
            _ => LeapIndicator::AlarmUnsynchronized,
        }
    }
}

/// A 3-bit integer representing the NTP version number, currently 4.
///
/// Note that while this struct is 8-bits, this field is packed to 3 in the actual header.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version(pub(super) u8);

/// A 3-bit integer representing the association mode.
///
/// Every 3-bit pattern maps to a variant, so decoding the field cannot fail. An SNTP client
/// sends [`Mode::Client`] and accepts only [`Mode::Server`] replies; the remaining modes are
/// decoded for diagnostics.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Reserved mode (value 0).
    Reserved = 0,
    /// Symmetric active mode (value 1).
    SymmetricActive = 1,
    /// Symmetric passive mode (value 2).
    SymmetricPassive = 2,
    /// Client mode (value 3).
    #[default]
    Client = 3,
    /// Server mode (value 4).
    Server = 4,
    /// Broadcast mode (value 5).
    Broadcast = 5,
    /// NTP control message mode (value 6).
    NtpControlMessage = 6,
    /// Reserved for private use (value 7).
    ReservedForPrivateUse = 7,
}

impl Mode {
    /// Decodes the low three bits of `value`. The wire field is 3 bits wide, so every input
    /// maps to a variant.
    pub fn from_bits(value: u8) -> Self {
        match value & 0b111 {
            0 => Mode::Reserved,
            1 => Mode::SymmetricActive,
            2 => Mode::SymmetricPassive,
            3 => Mode::Client,
            4 => Mode::Server,
            5 => Mode::Broadcast,
            6 => Mode::NtpControlMessage,
            _ => Mode::ReservedForPrivateUse,
        }
    }
}

/// An 8-bit integer representing the stratum.
///
/// ```ignore
/// +--------+-----------------------------------------------------+
/// | Value  | Meaning                                             |
/// +--------+-----------------------------------------------------+
/// | 0      | kiss-o'-death message                               |
/// | 1      | primary server (e.g., equipped with a GPS receiver) |
/// | 2-15   | secondary server (via NTP)                          |
/// | 16-255 | reserved                                            |
/// +--------+-----------------------------------------------------+
/// ```
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Stratum(pub u8);

/// A 32-bit code identifying the particular server or reference clock.
///
/// The interpretation depends on the value in the stratum field:
///
/// - For packet stratum 0 (kiss-o'-death), this is a four-character ASCII \[RFC1345\] string,
///   called the "kiss code", used for debugging and monitoring purposes.
/// - For stratum 1 (primary reference), this is a four-octet, left-justified, zero-padded ASCII
///   string identifying the reference source (e.g. `GPS`, `DCF`, `WWVB`).
/// - For stratum 2 and above, this is the four-octet IPv4 address of the synchronization source
///   (or, for IPv6 sources, the first four octets of the MD5 hash of the address).
///
/// The raw four bytes are kept in all cases; the variant records only which interpretation the
/// stratum selected.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReferenceIdentifier {
    /// Kiss-o'-Death advisory code (stratum 0), e.g. `RATE`, `DENY`, `RSTR`.
    KissCode([u8; 4]),
    /// Primary reference source identifier (stratum 1).
    SourceCode([u8; 4]),
    /// Synchronization source address of a secondary server (stratum 2+), including the
    /// reserved stratum range.
    Ipv4([u8; 4]),
}

/// **Datagram Header** - An SNTP message is a fixed 48-byte UDP datagram of 12 32-bit words in
/// network byte order; a decoded reply is a `Frame`.
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |LI | VN  |Mode |    Stratum     |     Poll      |  Precision   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Root Delay                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Root Dispersion                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          Reference ID                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                     Reference Timestamp (64)                  +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                      Origin Timestamp (64)                    +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                      Receive Timestamp (64)                   +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                      Transmit Timestamp (64)                  +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// In the four-timestamp exchange the origin timestamp carries T1, the receive timestamp T2 and
/// the transmit timestamp T3; T4 is captured locally by the client when the reply arrives and
/// never appears on the wire.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Frame {
    /// Leap indicator warning of impending leap second.
    pub leap_indicator: LeapIndicator,
    /// NTP protocol version number (4 for SNTPv4).
    pub version: Version,
    /// Association mode (client, server, broadcast, etc.).
    pub mode: Mode,
    /// Stratum level of the time source.
    pub stratum: Stratum,
    /// 8-bit signed integer representing the maximum interval between successive messages, in
    /// log2 seconds.
    pub poll: i8,
    /// 8-bit signed integer representing the precision of the server clock, in log2 seconds.
    /// For instance, a value of -18 corresponds to a precision of about one microsecond.
    pub precision: i8,
    /// Total round-trip delay to the reference clock, in NTP short format.
    pub root_delay: ShortFormat,
    /// Total dispersion to the reference clock, in NTP short format.
    pub root_dispersion: ShortFormat,
    /// Reference identifier (kiss code, clock source or server address).
    pub reference_id: ReferenceIdentifier,
    /// Time when the server clock was last set or corrected.
    pub reference_timestamp: TimestampFormat,
    /// Time at the client when the request departed for the server (T1).
    pub origin_timestamp: TimestampFormat,
    /// Time at the server when the request arrived from the client (T2).
    pub receive_timestamp: TimestampFormat,
    /// Time at the server when the response left for the client (T3).
    pub transmit_timestamp: TimestampFormat,
}

/// The consecutive types packed within the first byte of the SNTP datagram.
pub type FrameByte0 = (LeapIndicator, Version, Mode);

// Inherent implementations.

impl ReferenceIdentifier {
    /// Returns the raw 4-byte representation of the reference identifier.
    pub fn as_bytes(&self) -> [u8; 4] {
        match *self {
            ReferenceIdentifier::KissCode(arr) => arr,
            ReferenceIdentifier::SourceCode(arr) => arr,
            ReferenceIdentifier::Ipv4(arr) => arr,
        }
    }

    /// Returns true if this is a Kiss-o'-Death reference identifier.
    pub fn is_kiss_of_death(&self) -> bool {
        matches!(self, ReferenceIdentifier::KissCode(_))
    }
}

impl Version {
    /// NTP version 1.
    pub const V1: Self = Version(1);
    /// NTP version 2.
    pub const V2: Self = Version(2);
    /// NTP version 3.
    pub const V3: Self = Version(3);
    /// NTP version 4 (current standard).
    pub const V4: Self = Version(4);

    /// Create a `Version` from a raw version number.
    ///
    /// Returns `None` if the value does not fit the 3-bit header field.
    pub fn new(v: u8) -> Option<Self> {
        if v <= 7 { Some(Version(v)) } else { None }
    }

    /// Returns the raw version number as a `u8`.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Whether or not the version is a known, valid version.
    pub fn is_known(&self) -> bool {
        self.0 >= 1 && self.0 <= 4
    }
}

impl Stratum {
    /// Unspecified or invalid; marks a kiss-o'-death message.
    pub const UNSPECIFIED: Self = Stratum(0);
    /// The primary server (e.g. equipped with a GPS receiver).
    pub const PRIMARY: Self = Stratum(1);
    /// The minimum value specifying a secondary server (via NTP).
    pub const SECONDARY_MIN: Self = Stratum(2);
    /// The maximum value specifying a secondary server (via NTP).
    pub const SECONDARY_MAX: Self = Stratum(15);

    /// Whether or not the stratum represents a secondary server.
    pub fn is_secondary(&self) -> bool {
        Self::SECONDARY_MIN <= *self && *self <= Self::SECONDARY_MAX
    }

    /// Whether or not the stratum is in the reserved range (16-255).
    pub fn is_reserved(&self) -> bool {
        *self > Self::SECONDARY_MAX
    }
}

impl ShortFormat {
    /// The value as floating-point seconds: `seconds + fraction / 2^16`.
    pub fn to_seconds(&self) -> f64 {
        f64::from(self.seconds) + f64::from(self.fraction) / 65536.0
    }
}

impl Frame {
    /// Builds the standard client query frame: SNTPv4, client mode, all timestamp and delay
    /// fields zeroed except the transmit timestamp.
    ///
    /// The transmit timestamp is conventionally filled from the local monotonic tick count so
    /// the server's echo of it (in the reply's origin timestamp) identifies T1.
    pub fn client_query(transmit_timestamp: TimestampFormat) -> Self {
        Frame {
            transmit_timestamp,
            ..Frame::default()
        }
    }

    /// Whether the frame may be used to synchronize the local clock.
    ///
    /// A reply is usable only when the server clock is synchronized (the leap indicator does
    /// not signal the alarm condition) and the association mode is server. Invalid frames are
    /// still decoded in full so their diagnostic fields can be displayed.
    pub fn is_valid(&self) -> bool {
        self.leap_indicator != LeapIndicator::AlarmUnsynchronized && self.mode == Mode::Server
    }

    /// The poll interval in seconds, `2^poll`.
    pub fn poll_interval_seconds(&self) -> f64 {
        exp2_i8(self.poll)
    }

    /// The server clock precision in seconds, `2^precision`.
    pub fn precision_seconds(&self) -> f64 {
        exp2_i8(self.precision)
    }

    /// Returns true if this frame is a Kiss-o'-Death message (stratum 0).
    pub fn is_kiss_of_death(&self) -> bool {
        self.reference_id.is_kiss_of_death()
    }

    /// The kiss code carried by a Kiss-o'-Death frame, if any.
    pub fn kiss_code(&self) -> Option<[u8; 4]> {
        match self.reference_id {
            ReferenceIdentifier::KissCode(code) => Some(code),
            _ => None,
        }
    }
}

// Size implementations.

impl ConstPackedSizeBytes for ShortFormat {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl ConstPackedSizeBytes for TimestampFormat {
    const PACKED_SIZE_BYTES: usize = 8;
}

impl ConstPackedSizeBytes for Stratum {
    const PACKED_SIZE_BYTES: usize = 1;
}

impl ConstPackedSizeBytes for ReferenceIdentifier {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl ConstPackedSizeBytes for FrameByte0 {
    const PACKED_SIZE_BYTES: usize = 1;
}

impl ConstPackedSizeBytes for Frame {
    const PACKED_SIZE_BYTES: usize = FrameByte0::PACKED_SIZE_BYTES
        + Stratum::PACKED_SIZE_BYTES
        + 2
        + ShortFormat::PACKED_SIZE_BYTES * 2
        + ReferenceIdentifier::PACKED_SIZE_BYTES
        + TimestampFormat::PACKED_SIZE_BYTES * 4;
}

// Default implementations.

impl Default for Version {
    /// Defaults to NTPv4, the current standard (RFC 4330).
    fn default() -> Self {
        Version::V4
    }
}

impl Default for ReferenceIdentifier {
    /// Defaults to an all-zero kiss code (unset reference identifier, the stratum-0
    /// interpretation matching a default stratum).
    fn default() -> Self {
        ReferenceIdentifier::KissCode([0; 4])
    }
}

impl Default for Frame {
    /// Defaults to a valid SNTPv4 client request template.
    ///
    /// All timestamp and delay fields are zeroed. Set `transmit_timestamp` before sending, or
    /// use [`Frame::client_query`].
    fn default() -> Self {
        Frame {
            leap_indicator: LeapIndicator::default(),
            version: Version::default(),
            mode: Mode::default(),
            stratum: Stratum::default(),
            poll: 0,
            precision: 0,
            root_delay: ShortFormat::default(),
            root_dispersion: ShortFormat::default(),
            reference_id: ReferenceIdentifier::default(),
            reference_timestamp: TimestampFormat::default(),
            origin_timestamp: TimestampFormat::default(),
            receive_timestamp: TimestampFormat::default(),
            transmit_timestamp: TimestampFormat::default(),
        }
    }
}

// Display implementations.

impl fmt::Display for ReferenceIdentifier {
    /// Kiss and source codes render as their ASCII characters with trailing zero padding
    /// trimmed; secondary references render as a dotted quad.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReferenceIdentifier::KissCode(bytes) | ReferenceIdentifier::SourceCode(bytes) => {
                for &b in &bytes {
                    if b == 0 {
                        break;
                    }
                    if b.is_ascii_graphic() {
                        write!(f, "{}", b as char)?;
                    } else {
                        write!(f, "?")?;
                    }
                }
                Ok(())
            }
            ReferenceIdentifier::Ipv4([a, b, c, d]) => {
                write!(f, "{}.{}.{}.{}", a, b, c, d)
            }
        }
    }
}
