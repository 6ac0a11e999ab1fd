//! A BER-encoded OCTET STRING.
//!
//! This is an internal module. Its public types are re-exported by the
//! parent.

use std::{fmt, ops};
use bytes::Bytes;
use crate::encode::{Primitive, PrimitiveContent, Target};
use crate::ident::Tag;


//------------ OctetString ---------------------------------------------------

/// An OCTET STRING value.
///
/// An octet string is a sequence of octets, i.e., a glorified `[u8]`. The
/// type wraps the content octets of a primitive value as a `Bytes` so that
/// taking it out of the decoder’s buffer doesn’t copy.
///
/// # BER Encoding
///
/// BER also allows a constructed form that breaks the string up into
/// chunks. The grammars of this crate only accept the primitive form, which
/// is the only form allowed in DER.
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OctetString(Bytes);

impl OctetString {
    /// Creates an octet string from its content.
    pub fn new(bytes: Bytes) -> Self {
        OctetString(bytes)
    }

    /// Returns the content as a slice.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns the content as a `Bytes` value.
    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }

    /// Converts the octet string into its content.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Returns the length of the content.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a value encoder using the natural tag.
    pub fn encode_ref(&self) -> Primitive<&Self> {
        self.encode()
    }

    /// Returns a value encoder using the given tag.
    pub fn encode_ref_as(&self, tag: Tag) -> Primitive<&Self> {
        self.encode_as(tag)
    }
}


//--- From

impl From<Bytes> for OctetString {
    fn from(bytes: Bytes) -> Self {
        OctetString(bytes)
    }
}

impl From<&'static str> for OctetString {
    fn from(s: &'static str) -> Self {
        OctetString(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for OctetString {
    fn from(s: String) -> Self {
        OctetString(Bytes::from(s))
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(v: Vec<u8>) -> Self {
        OctetString(Bytes::from(v))
    }
}


//--- Deref and AsRef

impl ops::Deref for OctetString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}


//--- PrimitiveContent

impl PrimitiveContent for &'_ OctetString {
    const TAG: Tag = Tag::OCTET_STRING;

    fn encoded_len(self) -> usize {
        self.len()
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.as_slice())
    }
}


//--- Debug

impl fmt::Debug for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match std::str::from_utf8(self.as_slice()) {
            Ok(s) => write!(f, "OctetString({:?})", s),
            Err(_) => write!(f, "OctetString({:02x?})", self.as_slice()),
        }
    }
}


//------------ Functions -----------------------------------------------------

/// Decodes the content octets of a primitive OCTET STRING.
///
/// Every sequence of octets is a valid octet string, so this can’t fail.
pub fn decode_octet_string(bytes: &Bytes) -> OctetString {
    OctetString(bytes.clone())
}

/// Returns a value encoder for an OCTET STRING with the given content.
pub fn encode_octet_string(bytes: &[u8]) -> Primitive<&[u8]> {
    bytes.encode()
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::encode::Values;
    use super::*;

    #[test]
    fn decode_shares_buffer() {
        let data = Bytes::from_static(b"ou=system");
        let ostr = decode_octet_string(&data);
        assert_eq!(ostr.as_slice(), b"ou=system");
        assert_eq!(ostr.as_slice().as_ptr(), data.as_ptr());
    }

    #[test]
    fn encode() {
        assert_eq!(encode_octet_string(b"").to_vec(), b"\x04\x00");
        let ostr = OctetString::from("abc");
        assert_eq!(ostr.encode_ref().to_vec(), b"\x04\x03abc");
        assert_eq!(
            ostr.encode_ref_as(Tag::ctx(7)).to_vec(), b"\x87\x03abc"
        );
    }

    #[test]
    fn debug() {
        assert_eq!(
            format!("{:?}", OctetString::from("cn")), "OctetString(\"cn\")"
        );
        assert_eq!(
            format!("{:?}", OctetString::from(vec![0xffu8])),
            "OctetString([ff])"
        );
    }
}
