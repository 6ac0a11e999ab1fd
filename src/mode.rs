//! The encoding rules.


//------------ Mode ----------------------------------------------------------

/// The BER mode used for decoding.
///
/// Encoding always happens according to the Distinguished Encoding Rules.
/// The mode only affects how strict the decoder is with the octets it
/// receives.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Basic Encoding Rules.
    ///
    /// These are the most flexible rules, allowing alternative encodings
    /// for some types as well as indefinite length values.
    #[default]
    Ber,

    /// Distinguished Encoding Rules.
    ///
    /// These rules always employ definite length values and require the
    /// shortest possible encoding. Additional rules apply to some types.
    Der,
}

impl Mode {
    /// Returns whether the mode demands the shortest possible encodings.
    pub fn is_restricted(self) -> bool {
        matches!(self, Mode::Der)
    }

    /// Returns whether the mode allows indefinite length constructed values.
    pub fn allows_indefinite(self) -> bool {
        matches!(self, Mode::Ber)
    }
}
