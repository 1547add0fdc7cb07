//! Raw ADC sample type and its wire format.

use std::fmt;

/// One ADC reading.
///
/// The converter shifts out 11 data bits per readout, so meaningful values
/// are `0..=2047`, carried in a `u16`. On the wire (the named pipe and any
/// capture file written from it) a sample is exactly one little-endian `u16`
/// word with no framing around it. The stream is not validated anywhere;
/// out-of-range words are preserved as read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RawSample(u16);

impl RawSample {
    /// Data bits shifted out per readout.
    pub const BITS: u32 = 11;

    /// Largest in-range count (all data bits set).
    pub const FULL_SCALE: u16 = (1 << Self::BITS) - 1;

    /// ADC reference voltage.
    pub const VREF: f64 = 5.0;

    /// Bytes per sample on the wire.
    pub const WIRE_BYTES: usize = 2;

    pub const fn new(counts: u16) -> Self {
        Self(counts)
    }

    pub const fn counts(self) -> u16 {
        self.0
    }

    /// Convert counts to volts against the reference.
    pub fn volts(self) -> f64 {
        f64::from(self.0) * Self::VREF / f64::from(Self::FULL_SCALE)
    }

    /// True when the count exceeds what 11 bits can encode.
    pub const fn out_of_range(self) -> bool {
        self.0 > Self::FULL_SCALE
    }

    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }
}

impl fmt::Display for RawSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3} V)", self.0, self.volts())
    }
}

/// Decode a raw byte stream (pipe contents or a capture file) into samples.
///
/// A trailing odd byte is ignored; the writer only ever emits whole words, so
/// one can only appear if a capture was truncated mid-sample.
pub fn decode_stream(bytes: &[u8]) -> Vec<RawSample> {
    bytes
        .chunks_exact(RawSample::WIRE_BYTES)
        .map(|pair| RawSample::from_le_bytes([pair[0], pair[1]]))
        .collect()
}
