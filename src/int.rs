//! BER encoded integers.
//!
//! Integers are encoded in two’s complement using the smallest number of
//! octets possible. When decoding, redundant leading sign octets as some
//! lax BER encoders produce them are accepted.
//!
//! The same content encoding is used for values of the ENUMERATED type,
//! only the tag differs. Use `encode_as(Tag::ENUMERATED)` for those.

use smallvec::SmallVec;
use crate::encode::{PrimitiveContent, Target};
use crate::error::ContentError;
use crate::ident::Tag;


//------------ Decoding ------------------------------------------------------

/// Decodes the content octets of an INTEGER value into an `i64`.
///
/// Both the minimal encoding and encodings with redundant leading `0x00`
/// or `0xFF` octets are accepted. Empty content and values that don’t fit
/// into 64 bits are rejected.
pub fn decode_integer(bytes: &[u8]) -> Result<i64, ContentError> {
    if bytes.is_empty() {
        return Err(ContentError::invalid_value("empty integer"))
    }
    let bytes = &bytes[redundant_prefix(bytes)..];
    if bytes.len() > 8 {
        return Err(ContentError::invalid_value("integer exceeds 64 bits"))
    }
    let mut res: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    for &octet in bytes {
        res = (res << 8) | i64::from(octet);
    }
    Ok(res)
}

/// Decodes the content octets of an INTEGER into a `u32`.
///
/// Negative values and values larger than `u32::MAX` are rejected.
pub fn decode_unsigned(bytes: &[u8]) -> Result<u32, ContentError> {
    u32::try_from(decode_integer(bytes)?).map_err(|_| {
        ContentError::invalid_value("integer out of range")
    })
}

/// Returns the number of leading octets that only repeat the sign.
///
/// An octet is redundant if it is all zeros or all ones and the most
/// significant bit of the following octet is the same as its own bits.
fn redundant_prefix(bytes: &[u8]) -> usize {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let (first, second) = (bytes[start], bytes[start + 1]);
        if (first == 0 && second & 0x80 == 0)
            || (first == 0xFF && second & 0x80 != 0)
        {
            start += 1;
        }
        else {
            break
        }
    }
    start
}


//------------ Encoding ------------------------------------------------------

/// Returns the minimal two’s complement content octets for `value`.
pub fn encode_integer(value: i64) -> SmallVec<[u8; 8]> {
    let bytes = value.to_be_bytes();
    SmallVec::from_slice(&bytes[redundant_prefix(&bytes)..])
}

/// Returns the number of content octets of the minimal encoding of `value`.
pub fn integer_len(value: i64) -> usize {
    8 - redundant_prefix(&value.to_be_bytes())
}


//--- PrimitiveContent

macro_rules! builtin_impl {
    ( $( $type:ident ),* ) => {
        $(
            impl PrimitiveContent for $type {
                const TAG: Tag = Tag::INTEGER;

                fn encoded_len(self) -> usize {
                    integer_len(i64::from(self))
                }

                fn write_encoded<T: Target>(
                    self,
                    target: &mut T
                ) -> Result<(), T::Error> {
                    target.write_all(&encode_integer(i64::from(self)))
                }
            }
        )*
    }
}

builtin_impl!(i8, i16, i32, i64, u8, u16, u32);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::encode::Values;
    use crate::error::ErrorKind;
    use super::*;

    #[test]
    fn decode_minimal_and_lax() {
        assert_eq!(decode_integer(b"\x00"), Ok(0));
        assert_eq!(decode_integer(b"\x7f"), Ok(127));
        assert_eq!(decode_integer(b"\x00\x80"), Ok(128));
        assert_eq!(decode_integer(b"\x80"), Ok(-128));
        assert_eq!(decode_integer(b"\xff\x7f"), Ok(-129));
        assert_eq!(decode_integer(b"\x00\x00\x00\x01"), Ok(1));
        assert_eq!(decode_integer(b"\xff\xff\xff\xff"), Ok(-1));
        assert_eq!(
            decode_integer(b"\x00\x00\x7f\xff\xff\xff\xff\xff\xff\xff"),
            Ok(i64::MAX)
        );
        assert_eq!(
            decode_integer(b"\x80\x00\x00\x00\x00\x00\x00\x00"),
            Ok(i64::MIN)
        );
    }

    #[test]
    fn decode_failures() {
        assert_eq!(
            decode_integer(b"").unwrap_err().kind(),
            ErrorKind::InvalidValueEncoding
        );
        assert_eq!(
            decode_integer(
                b"\x01\x00\x00\x00\x00\x00\x00\x00\x00"
            ).unwrap_err().kind(),
            ErrorKind::InvalidValueEncoding
        );
        assert!(decode_unsigned(b"\xff").is_err());
        assert!(decode_unsigned(b"\x01\x00\x00\x00\x00").is_err());
        assert_eq!(decode_unsigned(b"\x00\xff\xff\xff\xff"), Ok(u32::MAX));
    }

    #[test]
    fn encode_minimal() {
        fn check(value: i64, octets: &[u8]) {
            assert_eq!(encode_integer(value).as_slice(), octets);
            assert_eq!(integer_len(value), octets.len());
            assert_eq!(decode_integer(octets), Ok(value));
        }

        check(0, b"\x00");
        check(1, b"\x01");
        check(127, b"\x7f");
        check(128, b"\x00\x80");
        check(256, b"\x01\x00");
        check(-1, b"\xff");
        check(-128, b"\x80");
        check(-129, b"\xff\x7f");
        check(i64::MAX, b"\x7f\xff\xff\xff\xff\xff\xff\xff");
        check(i64::MIN, b"\x80\x00\x00\x00\x00\x00\x00\x00");
    }

    #[test]
    fn encode_values() {
        assert_eq!(1i64.encode().to_vec(), b"\x02\x01\x01");
        assert_eq!(
            0x8000u32.encode().to_vec(), b"\x02\x03\x00\x80\x00"
        );
        assert_eq!(
            32i32.encode_as(Tag::ENUMERATED).to_vec(), b"\x0a\x01\x20"
        );
    }
}
