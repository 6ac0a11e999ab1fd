//! BER encoding for restricted character string types.
//!
//! Restricted character strings each contain a sequence of characters
//! according to a pre-defined character set. ASN.1 defines quite a few of
//! those of which the crate only implements the ones in use by the
//! supported protocols:
//!
//! * [`Ia5String`] contains ASCII characters only (IA5 is an alternative
//!   name for ASCII),
//! * [`NumericString`] contains only decimal digits,
//! * [`PrintableString`] contains a subset of ASCII characters including
//!   letters, digits, and a few symbols,
//! * [`Utf8String`] contains a sequence of Unicode code points encoded as
//!   octets through UTF-8.
//!
//! All of these are implemented atop a generic [`RestrictedString`] by
//! providing an implementation for the [`CharSet`] trait.
//!
//! The functions in this module check and decode the content octets of a
//! primitive value directly into a `String`.

//--- Re-exports

pub use self::restricted::{
    CharSet, CharSetError, RestrictedString,
    Ia5CharSet, Ia5String, NumericCharSet, NumericString,
    PrintableCharSet, PrintableString, Utf8CharSet, Utf8String,
};

use crate::error::ContentError;

//--- Private modules

mod restricted;


//------------ Functions -----------------------------------------------------

/// Decodes the content of a NumericString.
///
/// Fails if any octet is not one of the digits `0` to `9`.
pub fn decode_numeric_string(bytes: &[u8]) -> Result<String, ContentError> {
    NumericString::from_content(bytes).map(NumericString::into_string)
}

/// Decodes the content of a PrintableString.
pub fn decode_printable_string(
    bytes: &[u8]
) -> Result<String, ContentError> {
    PrintableString::from_content(bytes).map(PrintableString::into_string)
}

/// Decodes the content of an IA5String.
pub fn decode_ia5_string(bytes: &[u8]) -> Result<String, ContentError> {
    Ia5String::from_content(bytes).map(Ia5String::into_string)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use super::*;

    #[test]
    fn decode_functions() {
        assert_eq!(decode_numeric_string(b"2024"), Ok("2024".into()));
        assert_eq!(
            decode_numeric_string(b"20a4").unwrap_err().kind(),
            ErrorKind::InvalidValueEncoding
        );
        assert_eq!(decode_numeric_string(b""), Ok(String::new()));
        assert_eq!(
            decode_printable_string(b"ou=system"), Ok("ou=system".into())
        );
        assert!(decode_printable_string(b"a@b").is_err());
        assert_eq!(decode_ia5_string(b"a@b"), Ok("a@b".into()));
        assert!(decode_ia5_string(b"\x80").is_err());
    }
}
