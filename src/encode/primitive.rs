//! Content of primitive values.
//!
//! This is a private module. Its public items are re-exported by the parent.

use crate::ident::Tag;
use super::target::Target;
use super::values::{Values, total_len, write_header};


//------------ PrimitiveContent ----------------------------------------------

/// The content octets of a primitive value.
///
/// Types implement this trait to say how their content octets look in DER
/// and which universal tag they carry when not tagged otherwise. Wrapping
/// the content with identifier and length octets is left to [`Primitive`],
/// which is what [`encode`] and [`encode_as`] return.
///
/// Implementations take `self` by value. Types that are expensive to copy,
/// such as `OctetString`, implement the trait for a reference instead.
///
/// [`encode`]: #method.encode
/// [`encode_as`]: #method.encode_as
pub trait PrimitiveContent: Copy {
    /// The universal tag of the type.
    const TAG: Tag;

    /// Returns the number of content octets.
    fn encoded_len(self) -> usize;

    /// Writes the content octets.
    ///
    /// Exactly [`encoded_len`] octets must be written.
    ///
    /// [`encoded_len`]: #tymethod.encoded_len
    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error>;


    //--- Provided methods

    /// Returns an encoder for the value with its universal tag.
    fn encode(self) -> Primitive<Self> {
        self.encode_as(Self::TAG)
    }

    /// Returns an encoder for the value with an implicit tag.
    ///
    /// LDAP uses this for most of its operations, e.g., a DelRequest is an
    /// OCTET STRING tagged `[APPLICATION 10]`.
    fn encode_as(self, tag: Tag) -> Primitive<Self> {
        Primitive::new(tag, self)
    }
}

//--- Built-in types
//
// Integers, strings, and times live in their own modules.

impl PrimitiveContent for () {
    const TAG: Tag = Tag::NULL;

    fn encoded_len(self) -> usize {
        0
    }

    fn write_encoded<T: Target>(
        self,
        _: &mut T
    ) -> Result<(), T::Error> {
        Ok(())
    }
}

impl PrimitiveContent for bool {
    const TAG: Tag = Tag::BOOLEAN;

    fn encoded_len(self) -> usize {
        1
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        // DER only allows 0xFF for true.
        target.write_all(&[if self { 0xff } else { 0 }])
    }
}

impl PrimitiveContent for &'_ [u8] {
    const TAG: Tag = Tag::OCTET_STRING;

    fn encoded_len(self) -> usize {
        self.len()
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self)
    }
}


//------------ Primitive -----------------------------------------------------

/// An encoder for a single primitive value.
///
/// Values of this type are created through [`PrimitiveContent::encode`]
/// and [`PrimitiveContent::encode_as`].
#[derive(Clone, Copy, Debug)]
pub struct Primitive<P> {
    tag: Tag,
    content: P,
}

impl<P> Primitive<P> {
    fn new(tag: Tag, content: P) -> Self {
        Primitive { tag, content }
    }

    /// Returns the tag the value is encoded with.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the content.
    pub fn content(&self) -> &P {
        &self.content
    }
}

impl<P: PrimitiveContent> Values for Primitive<P> {
    fn encoded_len(&self) -> usize {
        total_len(self.tag, self.content.encoded_len())
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        write_header(target, self.tag, false, self.content.encoded_len())?;
        self.content.write_encoded(target)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::encode::{SliceTarget, compute_length};
    use super::*;

    #[test]
    fn builtin_primitives() {
        assert_eq!(().encode().to_vec(), b"\x05\x00");
        assert_eq!(true.encode().to_vec(), b"\x01\x01\xff");
        assert_eq!(false.encode().to_vec(), b"\x01\x01\x00");
        assert_eq!(
            b"ou=system".as_slice().encode_as(Tag::application(10)).to_vec(),
            b"\x4a\x09ou=system"
        );
    }

    #[test]
    fn implicit_tag() {
        let unbind = ().encode_as(Tag::application(2));
        assert_eq!(unbind.tag(), Tag::application(2));
        assert_eq!(compute_length(&unbind), 2);
        assert_eq!(unbind.to_vec(), b"\x42\x00");

        let long = [0u8; 200];
        let value = long.as_slice().encode();
        assert_eq!(value.content().len(), 200);
        assert_eq!(compute_length(&value), 203);
    }

    #[test]
    fn short_slice_target() {
        let mut buf = [0u8; 2];
        let mut target = SliceTarget::new(&mut buf);
        assert!(true.encode().write_encoded(&mut target).is_err());
    }
}
