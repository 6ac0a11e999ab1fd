//! Decoder configuration.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::mem;
use crate::mode::Mode;


//------------ DecoderConfig -------------------------------------------------

/// The limits and rules a decoding container applies.
///
/// The defaults decode BER, allow at most four subsequent length octets
/// (i.e., values up to 4 GiB), don’t limit the size of a message, and
/// allow constructed values to be nested 32 levels deep.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecoderConfig {
    /// The encoding rules to decode.
    mode: Mode,

    /// The maximum number of subsequent octets in a long form length.
    max_length_octets: usize,

    /// The maximum size of a complete message in octets.
    max_pdu_size: Option<usize>,

    /// The maximum nesting depth of constructed values.
    max_depth: usize,
}

impl DecoderConfig {
    /// The default number of subsequent length octets.
    pub const DEFAULT_MAX_LENGTH_OCTETS: usize = 4;

    /// The default maximum nesting depth.
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    /// Returns a config with the given mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns a config with the given length octets limit.
    ///
    /// The value is clamped to the range from one to the number of octets
    /// in a `usize`.
    pub fn with_max_length_octets(mut self, max: usize) -> Self {
        self.max_length_octets = max.clamp(1, mem::size_of::<usize>());
        self
    }

    /// Returns a config with the given limit for the size of a message.
    ///
    /// The limit covers all octets of the outermost value including its
    /// identifier and length octets.
    pub fn with_max_pdu_size(mut self, max: Option<usize>) -> Self {
        self.max_pdu_size = max;
        self
    }

    /// Returns a config with the given nesting limit.
    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// Returns the encoding rules to decode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the maximum number of subsequent length octets.
    pub fn max_length_octets(&self) -> usize {
        self.max_length_octets
    }

    /// Returns the maximum size of a message.
    pub fn max_pdu_size(&self) -> Option<usize> {
        self.max_pdu_size
    }

    /// Returns the maximum nesting depth of constructed values.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            mode: Mode::Ber,
            max_length_octets: Self::DEFAULT_MAX_LENGTH_OCTETS,
            max_pdu_size: None,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
