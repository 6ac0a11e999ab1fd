//! Tag-length-value tuples.
//!
//! A [`Tuple`] is one decoded value: its identifier octets, its length, and
//! either its content octets if it is primitive or the tuples it contains
//! if it is constructed. Tuples remember where in the input they were
//! found.
//!
//! The functions in this module read and write the identifier and length
//! octets of a value.

use bytes::Bytes;
use crate::decode::DecoderConfig;
use crate::encode::{Target, Values};
use crate::error::ContentError;
use crate::ident::{Ident, Tag};
use crate::length::Length;


//------------ Tuple ---------------------------------------------------------

/// A single decoded value.
///
/// Offsets are relative to the first octet fed into the decoding
/// container. Tuples created for encoding start at offset zero.
///
/// When handed to grammar actions, constructed tuples only carry their
/// header. The generic tuple grammar collects the complete tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tuple {
    /// The identifier octets.
    ident: Ident,

    /// The length as given by the length octets.
    length: Length,

    /// The offset of the first identifier octet.
    start: usize,

    /// The number of identifier and length octets.
    header_len: usize,

    /// The offset right after the value, once it is known.
    end: Option<usize>,

    /// The content.
    content: TupleContent,
}

/// The content of a tuple.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TupleContent {
    /// The content octets of a primitive value.
    Primitive(Bytes),

    /// The values contained in a constructed value.
    Constructed(Vec<Tuple>),
}

impl Tuple {
    /// Creates a primitive tuple for encoding.
    pub fn primitive(tag: Tag, content: Bytes) -> Self {
        let ident = Ident::from_tag(tag, false);
        let length = Length::Definite(content.len());
        let header_len = ident.encoded_len() + length.encoded_len();
        Tuple {
            ident, length, header_len,
            start: 0,
            end: Some(header_len + content.len()),
            content: TupleContent::Primitive(content),
        }
    }

    /// Creates a constructed tuple for encoding.
    ///
    /// The offsets of the children are moved to where they end up in the
    /// encoded tuple, so that decoding it again results in an equal tuple.
    pub fn constructed(tag: Tag, mut children: Vec<Tuple>) -> Self {
        let ident = Ident::from_tag(tag, true);
        let len = children.iter().map(Values::encoded_len).sum();
        let length = Length::Definite(len);
        let header_len = ident.encoded_len() + length.encoded_len();
        let mut pos = header_len;
        for child in &mut children {
            child.relocate(child.start, pos);
            pos += child.encoded_len();
        }
        Tuple {
            ident, length, header_len,
            start: 0,
            end: Some(header_len + len),
            content: TupleContent::Constructed(children),
        }
    }

    /// Moves all offsets of the tuple and its children from `old` to `new`.
    fn relocate(&mut self, old: usize, new: usize) {
        self.start = self.start - old + new;
        self.end = self.end.map(|end| end - old + new);
        if let TupleContent::Constructed(ref mut children) = self.content {
            for child in children {
                child.relocate(old, new)
            }
        }
    }

    /// Creates a tuple from a decoded header.
    ///
    /// Constructed tuples start out without children, primitive ones with
    /// empty content.
    pub(crate) fn from_header(
        ident: Ident, length: Length, start: usize, header_len: usize
    ) -> Self {
        Tuple {
            ident, length, start, header_len,
            end: length.definite().map(|len| start + header_len + len),
            content: if ident.is_constructed() {
                TupleContent::Constructed(Vec::new())
            }
            else {
                TupleContent::Primitive(Bytes::new())
            }
        }
    }

    /// Sets the offset right after the value.
    pub(crate) fn set_end(&mut self, end: usize) {
        self.end = Some(end)
    }

    /// Replaces the content of the tuple.
    pub(crate) fn set_content(&mut self, content: TupleContent) {
        self.content = content
    }

    /// Appends a child to a constructed tuple.
    pub(crate) fn push_child(
        &mut self, child: Tuple
    ) -> Result<(), ContentError> {
        match self.content {
            TupleContent::Constructed(ref mut children) => {
                children.push(child);
                Ok(())
            }
            TupleContent::Primitive(_) => {
                Err(ContentError::invalid_value("child in primitive value"))
            }
        }
    }

    /// Returns the identifier octets.
    pub fn ident(&self) -> Ident {
        self.ident
    }

    /// Returns the tag.
    pub fn tag(&self) -> Tag {
        self.ident.tag()
    }

    /// Returns whether the tuple is constructed.
    pub fn is_constructed(&self) -> bool {
        self.ident.is_constructed()
    }

    /// Returns the length as given in the length octets.
    pub fn length(&self) -> Length {
        self.length
    }

    /// Returns the offset of the first identifier octet.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the number of identifier and length octets.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Returns the offset of the first content octet.
    pub fn content_start(&self) -> usize {
        self.start + self.header_len
    }

    /// Returns the offset right after the value.
    ///
    /// This is only unknown for a value of indefinite length whose
    /// end-of-contents octets haven’t been seen yet. Constructed tuples
    /// handed to grammar actions are such values.
    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Returns the content.
    pub fn content(&self) -> &TupleContent {
        &self.content
    }

    /// Returns the content octets of a primitive tuple.
    pub fn value(&self) -> Option<&Bytes> {
        match self.content {
            TupleContent::Primitive(ref bytes) => Some(bytes),
            TupleContent::Constructed(_) => None,
        }
    }

    /// Returns the children of a constructed tuple.
    ///
    /// Returns an empty slice for primitive tuples.
    pub fn children(&self) -> &[Tuple] {
        match self.content {
            TupleContent::Primitive(_) => &[],
            TupleContent::Constructed(ref children) => children.as_slice(),
        }
    }

    /// Returns the length of the content when encoded in DER.
    fn content_len(&self) -> usize {
        match self.content {
            TupleContent::Primitive(ref bytes) => bytes.len(),
            TupleContent::Constructed(ref children) => {
                children.iter().map(Values::encoded_len).sum()
            }
        }
    }
}


//--- Values
//
// Tuples are always re-encoded with definite lengths, even if they were
// decoded from indefinite length values.

impl Values for Tuple {
    fn encoded_len(&self) -> usize {
        let len = self.content_len();
        self.ident.encoded_len() + Length::Definite(len).encoded_len() + len
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        write_tag(target, self.ident)?;
        write_length(target, Length::Definite(self.content_len()))?;
        match self.content {
            TupleContent::Primitive(ref bytes) => target.write_all(bytes),
            TupleContent::Constructed(ref children) => {
                children.write_encoded(target)
            }
        }
    }
}


//------------ Functions -----------------------------------------------------

/// Reads the identifier octets starting at `offset` in `buf`.
///
/// Returns the identifier and the number of octets it occupies. Returns a
/// truncated input error if `buf` ends before the identifier is complete.
pub fn read_tag(
    buf: &[u8], offset: usize
) -> Result<(Ident, usize), ContentError> {
    Ident::read(buf.get(offset..).unwrap_or_default())
}

/// Reads the length octets starting at `offset` in `buf`.
///
/// Returns the length and the number of octets it occupies. Returns a
/// truncated input error if `buf` ends before the length is complete and
/// an invalid length error if the length octets are not acceptable under
/// `config`.
pub fn read_length(
    buf: &[u8], offset: usize, config: &DecoderConfig
) -> Result<(Length, usize), ContentError> {
    Length::read(buf.get(offset..).unwrap_or_default(), config)
}

/// Writes identifier octets to a target.
pub fn write_tag<T: Target>(
    target: &mut T, ident: Ident
) -> Result<(), T::Error> {
    ident.write_encoded(target)
}

/// Writes length octets to a target.
///
/// Definite lengths are always written in their shortest form.
pub fn write_length<T: Target>(
    target: &mut T, length: Length
) -> Result<(), T::Error> {
    length.write_encoded(target)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use crate::mode::Mode;
    use super::*;

    #[test]
    fn read_header() {
        let buf = b"\x00\x00\x7f\x1f\x82\x01\x00\x01";
        assert_eq!(
            read_tag(buf, 2),
            Ok((Ident::new(crate::ident::Class::Application, true, 31), 2))
        );
        let config = DecoderConfig::default();
        assert_eq!(
            read_length(buf, 4, &config), Ok((Length::Definite(0x100), 3))
        );
        assert_eq!(
            read_length(buf, 7, &config), Ok((Length::Definite(1), 1))
        );
        assert_eq!(
            read_tag(buf, 8).unwrap_err().kind(), ErrorKind::TruncatedInput
        );
        assert_eq!(
            read_tag(buf, 100).unwrap_err().kind(), ErrorKind::TruncatedInput
        );
        assert_eq!(
            read_length(b"\x82\x01", 0, &config).unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
        assert_eq!(
            read_length(
                b"\x81\x05", 0, &config.with_mode(Mode::Der)
            ).unwrap_err().kind(),
            ErrorKind::InvalidLength
        );
    }

    #[test]
    fn write_header() {
        let mut target = Vec::new();
        write_tag(&mut target, Tag::SEQUENCE.constructed()).unwrap();
        write_length(&mut target, Length::Definite(300)).unwrap();
        write_tag(&mut target, Tag::ctx(31).primitive()).unwrap();
        write_length(&mut target, Length::Definite(5)).unwrap();
        assert_eq!(target, b"\x30\x82\x01\x2c\x9f\x1f\x05");
    }

    #[test]
    fn encode_tuples() {
        let tuple = Tuple::constructed(Tag::SEQUENCE, vec![
            Tuple::primitive(Tag::INTEGER, Bytes::from_static(b"\x01")),
            Tuple::constructed(Tag::ctx(0), vec![
                Tuple::primitive(Tag::NULL, Bytes::new()),
            ]),
        ]);
        assert_eq!(tuple.length(), Length::Definite(7));
        assert_eq!(tuple.end(), Some(9));
        assert_eq!(tuple.children().len(), 2);
        assert_eq!(tuple.children()[1].header_len(), 2);
        assert_eq!(
            tuple.to_vec(), b"\x30\x07\x02\x01\x01\xa0\x02\x05\x00"
        );
    }

    #[test]
    fn constructed_offsets() {
        let tuple = Tuple::constructed(Tag::SEQUENCE, vec![
            Tuple::primitive(Tag::INTEGER, Bytes::from_static(b"\x01")),
            Tuple::constructed(Tag::ctx(0), vec![
                Tuple::primitive(Tag::NULL, Bytes::new()),
            ]),
        ]);
        let children = tuple.children();
        assert_eq!((children[0].start(), children[0].end()), (2, Some(5)));
        assert_eq!((children[1].start(), children[1].end()), (5, Some(9)));
        let inner = &children[1].children()[0];
        assert_eq!((inner.start(), inner.end()), (7, Some(9)));
    }
}
