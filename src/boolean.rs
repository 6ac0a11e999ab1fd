//! BOOLEAN and NULL values.
//!
//! The encoders for both types are the `PrimitiveContent` impls for `bool`
//! and `()` in the encode module.

use crate::error::ContentError;
use crate::mode::Mode;


/// Decodes the content octets of a BOOLEAN value.
///
/// The content must be exactly one octet. In BER, any non-zero octet is
/// true. In DER, only `0xFF` is true and only `0x00` is false.
pub fn decode_boolean(
    bytes: &[u8], mode: Mode
) -> Result<bool, ContentError> {
    let octet = match *bytes {
        [octet] => octet,
        _ => {
            return Err(ContentError::length_mismatch(
                "BOOLEAN must have one content octet", 1, bytes.len()
            ))
        }
    };
    match (octet, mode) {
        (0, _) => Ok(false),
        (0xFF, _) | (_, Mode::Ber) => Ok(true),
        _ => Err(ContentError::invalid_value("invalid boolean in DER")),
    }
}

/// Checks the content octets of a NULL value.
///
/// The content must be empty.
pub fn decode_null(bytes: &[u8]) -> Result<(), ContentError> {
    if bytes.is_empty() {
        Ok(())
    }
    else {
        Err(ContentError::length_mismatch(
            "NULL with content", 0, bytes.len()
        ))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::error::{ErrorKind, Mismatch};
    use super::*;

    #[test]
    fn boolean() {
        assert_eq!(decode_boolean(b"\x00", Mode::Ber), Ok(false));
        assert_eq!(decode_boolean(b"\x01", Mode::Ber), Ok(true));
        assert_eq!(decode_boolean(b"\xff", Mode::Der), Ok(true));
        assert_eq!(decode_boolean(b"\x00", Mode::Der), Ok(false));
        assert_eq!(
            decode_boolean(b"\x01", Mode::Der).unwrap_err().kind(),
            ErrorKind::InvalidValueEncoding
        );
        assert_eq!(
            decode_boolean(b"", Mode::Ber).unwrap_err().kind(),
            ErrorKind::InvalidLength
        );
        assert_eq!(
            decode_boolean(b"\xff\xff", Mode::Ber).unwrap_err().kind(),
            ErrorKind::InvalidLength
        );
    }

    #[test]
    fn null() {
        assert_eq!(decode_null(b""), Ok(()));
        let err = decode_null(b"\x04\x00").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLength);
        assert_eq!(
            err.mismatch(), Some(Mismatch::Length { expected: 0, found: 2 })
        );
    }
}
