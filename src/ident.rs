//! The identifier octets of a BER encoded value.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use std::fmt;
use crate::encode::Target;
use crate::error::ContentError;


//------------ Tag -----------------------------------------------------------

/// The tag of a value.
///
/// Tags consist of one of four classes, represented by the [`Class`] enum,
/// and a number within this class. In BER encoding, the tag becomes part of
/// the identifier octets by combining it with a bit indicating whether a
/// value is primitive or constructed. This combination is the [`Ident`].
///
/// # Limitations
///
/// Tag numbers must fit into a `u32`.
//
//  Internally, we store the tag as the identifier octets of a primitive value
//  with the same tag.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Tag(Ident);

impl Tag {
    /// Creates a tag from a class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Self(Ident::new(class, false, number))
    }

    /// Creates a new tag in the universal class.
    pub const fn universal(number: u32) -> Self {
        Self::new(Class::Universal, number)
    }

    /// Creates a new tag in the application class.
    pub const fn application(number: u32) -> Self {
        Self::new(Class::Application, number)
    }

    /// Creates a new tag in class “context specific” with the given number.
    pub const fn ctx(number: u32) -> Self {
        Self::new(Class::Context, number)
    }

    /// Creates a new tag in the private class.
    pub const fn private(number: u32) -> Self {
        Self::new(Class::Private, number)
    }

    /// Returns the class of the tag.
    pub const fn class(self) -> Class {
        self.0.class()
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        self.0.number()
    }

    /// Returns the identifier octets for a primitive value with this tag.
    pub const fn primitive(self) -> Ident {
        self.0
    }

    /// Returns the identifier octets for a constructed value with this tag.
    pub const fn constructed(self) -> Ident {
        Ident::from_tag(self, true)
    }
}

/// # Constants for universal tags.
///
/// See clause 8.4 of ITU Recommendation X.690.
///
impl Tag {
    /// The tag marking the end-of-contents, UNIVERSAL 0.
    pub const END_OF_CONTENTS: Self = Self::new(Class::Universal, 0);

    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Self::new(Class::Universal, 1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Self::new(Class::Universal, 2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Self::new(Class::Universal, 3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Self::new(Class::Universal, 4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Self::new(Class::Universal, 5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Self::new(Class::Universal, 6);

    /// The tag for the ENUMERATED type, UNIVERSAL 10.
    pub const ENUMERATED: Self = Self::new(Class::Universal, 10);

    /// The tag for the UTF8String type, UNIVERSAL 12
    pub const UTF8_STRING: Self = Self::new(Class::Universal, 12);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Self::new(Class::Universal, 16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Self::new(Class::Universal, 17);

    /// The tag for the NumericString type, UNIVERSAL 18.
    pub const NUMERIC_STRING: Self = Self::new(Class::Universal, 18);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Self::new(Class::Universal, 19);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Self::new(Class::Universal, 22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Self::new(Class::Universal, 23);

    /// The tag for the GeneralizedTime type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Self::new(Class::Universal, 24);

    /// The tag for the GeneralString type, UNIVERSAL 27.
    pub const GENERAL_STRING: Self = Self::new(Class::Universal, 27);
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::END_OF_CONTENTS => write!(f, "end-of-contents"),
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::ENUMERATED => write!(f, "ENUMERATED"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            Tag::NUMERIC_STRING => write!(f, "NumericString"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            Tag::GENERAL_STRING => write!(f, "GeneralString"),
            tag => {
                match tag.class() {
                    Class::Universal => write!(f, "[UNIVERSAL ")?,
                    Class::Application => write!(f, "[APPLICATION ")?,
                    Class::Context => write!(f, "[")?,
                    Class::Private => write!(f, "[PRIVATE ")?,
                }
                write!(f, "{}]", tag.number())
            }
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({} - {:?})", self, self.0.as_slice())
    }
}


//------------ Ident ---------------------------------------------------------

/// The identifier octets of an encoded value.
///
/// This is the tag plus the bit that tells whether the value is primitive
/// or constructed. Identifiers are always kept in their canonical form, so
/// two values are equal exactly if their encoded octets are equal. This
/// makes it possible to use identifier constants in `match` patterns.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ident(I);

#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
enum I {
    L1([u8; 1]),
    L2([u8; 2]),
    L3([u8; 3]),
    L4([u8; 4]),
    L5([u8; 5]),
    L6([u8; 6]),
}

impl Ident {
    /// The identifier octets of the end-of-contents marker.
    pub const END_OF_CONTENTS: Self = Self::new(Class::Universal, false, 0);

    /// The identifier octets of a constructed SEQUENCE.
    pub const SEQUENCE: Self = Self::new(Class::Universal, true, 16);

    /// The identifier octets of a constructed SET.
    pub const SET: Self = Self::new(Class::Universal, true, 17);

    /// The largest tag number that still fits into the single octet form.
    const MAX_LOW_NUMBER: u32 = 0x1e;

    /// Encodes a class, form, and number into the identifier octets.
    ///
    /// Numbers up to 30 use the single octet form, anything larger uses
    /// the high tag number form with as few octets as possible.
    pub const fn new(class: Class, constructed: bool, number: u32) -> Self {
        let first = if constructed {
            class.into_u8() | 0x20
        }
        else {
            class.into_u8()
        };

        if number <= Self::MAX_LOW_NUMBER {
            return Self(I::L1([first | number as u8]))
        }

        // Now the first octet is always the class plus bits 1 to 5 all 1.
        let first = first | 0x1f;

        // The lowest seven bits are the last octet. Every further group of
        // seven bits adds an octet with the continuation bit set.
        let n0 = (number & 0x7F) as u8;
        let number = number >> 7;
        if number == 0 {
            return Self(I::L2([first, n0]))
        }

        let n1 = ((number & 0x7F) | 0x80) as u8;
        let number = number >> 7;
        if number == 0 {
            return Self(I::L3([first, n1, n0]))
        }

        let n2 = ((number & 0x7F) | 0x80) as u8;
        let number = number >> 7;
        if number == 0 {
            return Self(I::L4([first, n2, n1, n0]))
        }

        let n3 = ((number & 0x7F) | 0x80) as u8;
        let number = number >> 7;
        if number == 0 {
            return Self(I::L5([first, n3, n2, n1, n0]))
        }

        let n4 = ((number & 0x7F) | 0x80) as u8;
        Self(I::L6([first, n4, n3, n2, n1, n0]))
    }

    /// Creates identifier octets from a tag.
    pub const fn from_tag(tag: Tag, constructed: bool) -> Self {
        if constructed {
            Self::with_first(tag.0, tag.0.first() | 0x20)
        }
        else {
            tag.0
        }
    }

    /// Returns the tag for the identifier octets.
    pub const fn tag(self) -> Tag {
        Tag(Self::with_first(self, self.first() & 0xDF))
    }

    /// Returns the class of the identifier octets.
    pub const fn class(self) -> Class {
        Class::from_u8(self.first())
    }

    /// Returns whether the value is a constructed value.
    pub const fn is_constructed(self) -> bool {
        self.first() & 0x20 != 0
    }

    /// Returns whether these are the end-of-contents identifier octets.
    pub fn is_end_of_contents(self) -> bool {
        self == Self::END_OF_CONTENTS
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        match self.0 {
            I::L1([x]) => (x & 0x1f) as u32,
            I::L2([_, x0]) => x0 as u32,
            I::L3([_, x1, x2]) => {
                  ((x1 & 0x7f) as u32) << 7
                | (x2 as u32)
            }
            I::L4([_, x1, x2, x3]) => {
                  ((x1 & 0x7f) as u32) << 14
                | ((x2 & 0x7f) as u32) << 7
                | (x3 as u32)
            }
            I::L5([_, x1, x2, x3, x4]) => {
                  ((x1 & 0x7f) as u32) << 21
                | ((x2 & 0x7f) as u32) << 14
                | ((x3 & 0x7f) as u32) << 7
                | (x4 as u32)
            }
            I::L6([_, x1, x2, x3, x4, x5]) => {
                  ((x1 & 0x7f) as u32) << 28
                | ((x2 & 0x7f) as u32) << 21
                | ((x3 & 0x7f) as u32) << 14
                | ((x4 & 0x7f) as u32) << 7
                | (x5 as u32)
            }
        }
    }

    /// Returns a slice of the encoded octets.
    pub const fn as_slice(&self) -> &[u8] {
        match &self.0 {
            I::L1(arr) => arr.as_slice(),
            I::L2(arr) => arr.as_slice(),
            I::L3(arr) => arr.as_slice(),
            I::L4(arr) => arr.as_slice(),
            I::L5(arr) => arr.as_slice(),
            I::L6(arr) => arr.as_slice(),
        }
    }

    /// Returns the first octet.
    const fn first(self) -> u8 {
        match self.0 {
            I::L1([x]) => x,
            I::L2([x, ..]) => x,
            I::L3([x, ..]) => x,
            I::L4([x, ..]) => x,
            I::L5([x, ..]) => x,
            I::L6([x, ..]) => x,
        }
    }

    /// Returns a copy of `ident` with the first octet replaced.
    const fn with_first(ident: Self, first: u8) -> Self {
        match ident.0 {
            I::L1([_]) => Self(I::L1([first])),
            I::L2([_, x0]) => Self(I::L2([first, x0])),
            I::L3([_, x0, x1]) => Self(I::L3([first, x0, x1])),
            I::L4([_, x0, x1, x2]) => Self(I::L4([first, x0, x1, x2])),
            I::L5([_, x0, x1, x2, x3]) => {
                Self(I::L5([first, x0, x1, x2, x3]))
            }
            I::L6([_, x0, x1, x2, x3, x4]) => {
                Self(I::L6([first, x0, x1, x2, x3, x4]))
            }
        }
    }

    /// Reads the identifier octets from the start of `data`.
    ///
    /// Returns the identifier and the number of octets it occupied. If
    /// `data` ends before the identifier octets are complete, returns a
    /// truncated input error. High tag number forms that aren’t minimal or
    /// whose number doesn’t fit into a `u32` are rejected.
    pub fn read(data: &[u8]) -> Result<(Self, usize), ContentError> {
        let first = match data.first() {
            Some(first) => *first,
            None => return Err(ContentError::truncated()),
        };

        // If we have a single octet tag, we can already return.
        if (first & 0x1f) < 0x1f {
            return Ok((Self(I::L1([first])), 1))
        }

        // The high tag number form is only allowed for numbers above 30
        // and must not start with a group of zero bits.
        let x0 = subsequent(data, 1)?;
        if x0 == 0x80 {
            return Err(ContentError::invalid_value(
                "non-minimal tag number"
            ))
        }
        if (x0 & 0x80) == 0 {
            if u32::from(x0) <= Self::MAX_LOW_NUMBER {
                return Err(ContentError::invalid_value(
                    "low tag number in high tag number form"
                ))
            }
            return Ok((Self(I::L2([first, x0])), 2))
        }

        let x1 = subsequent(data, 2)?;
        if (x1 & 0x80) == 0 {
            return Ok((Self(I::L3([first, x0, x1])), 3))
        }

        let x2 = subsequent(data, 3)?;
        if (x2 & 0x80) == 0 {
            return Ok((Self(I::L4([first, x0, x1, x2])), 4))
        }

        let x3 = subsequent(data, 4)?;
        if (x3 & 0x80) == 0 {
            return Ok((Self(I::L5([first, x0, x1, x2, x3])), 5))
        }

        let x4 = subsequent(data, 5)?;
        if (x4 & 0x80) == 0 {
            // In order to fit into a u32, only the lowest four bits of x0
            // may be used.
            if x0 & 0x70 != 0 {
                return Err(ContentError::invalid_value(
                    "tag number exceeds 32 bits"
                ))
            }
            return Ok((Self(I::L6([first, x0, x1, x2, x3, x4])), 6))
        }

        Err(ContentError::invalid_value("tag number exceeds 32 bits"))
    }

    /// Returns the number of octets of the encoded form.
    pub fn encoded_len(self) -> usize {
        match self.0 {
            I::L1(_) => 1,
            I::L2(_) => 2,
            I::L3(_) => 3,
            I::L4(_) => 4,
            I::L5(_) => 5,
            I::L6(_) => 6,
        }
    }

    /// Writes the identifier octets to a target.
    pub fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.as_slice())
    }
}

/// Returns the subsequent identifier octet at `idx`.
fn subsequent(data: &[u8], idx: usize) -> Result<u8, ContentError> {
    data.get(idx).copied().ok_or_else(ContentError::truncated)
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_constructed() {
            write!(f, "constructed {}", self.tag())
        }
        else {
            write!(f, "primitive {}", self.tag())
        }
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ident({} - {:02x?})", self, self.as_slice())
    }
}


//------------ Class ---------------------------------------------------------

/// The class of a tag.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    const fn from_u8(octet: u8) -> Self {
        match octet {
            0x00..=0x3F => Self::Universal,
            0x40..=0x7F => Self::Application,
            0x80..=0xBF => Self::Context,
            0xC0..=0xFF => Self::Private
        }
    }

    const fn into_u8(self) -> u8 {
        match self {
            Self::Universal => 0x00,
            Self::Application => 0x40,
            Self::Context => 0x80,
            Self::Private => 0xC0,
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    const CLASSES: &[Class] = &[
        Class::Universal, Class::Application, Class::Context, Class::Private
    ];

    fn check(class: Class, constructed: bool, number: u32, octets: usize) {
        let ident = Ident::new(class, constructed, number);
        assert_eq!(ident.encoded_len(), octets, "length of {}", number);
        assert_eq!(ident.number(), number);
        assert_eq!(ident.class(), class);
        assert_eq!(ident.is_constructed(), constructed);
        assert_eq!(ident.tag(), Tag::new(class, number));
        assert_eq!(Ident::read(ident.as_slice()), Ok((ident, octets)));
    }

    #[test]
    fn number_ranges() {
        for &class in CLASSES {
            for constructed in [false, true] {
                for number in 0..=30 {
                    check(class, constructed, number, 1);
                }
                check(class, constructed, 31, 2);
                check(class, constructed, 0x7f, 2);
                check(class, constructed, 0x80, 3);
                check(class, constructed, 0x3fff, 3);
                check(class, constructed, 0x4000, 4);
                check(class, constructed, 0x1f_ffff, 4);
                check(class, constructed, 0x20_0000, 5);
                check(class, constructed, 0x0fff_ffff, 5);
                check(class, constructed, 0x1000_0000, 6);
                check(class, constructed, u32::MAX, 6);
            }
        }
    }

    #[test]
    fn known_octets() {
        assert_eq!(Ident::SEQUENCE.as_slice(), b"\x30");
        assert_eq!(Tag::application(10).primitive().as_slice(), b"\x4a");
        assert_eq!(Tag::application(11).constructed().as_slice(), b"\x6b");
        assert_eq!(Tag::ctx(3).constructed().as_slice(), b"\xa3");
        assert_eq!(
            Tag::private(201).primitive().as_slice(), b"\xdf\x81\x49"
        );
    }

    #[test]
    fn read_failures() {
        assert_eq!(
            Ident::read(b"").unwrap_err().kind(), ErrorKind::TruncatedInput
        );
        assert_eq!(
            Ident::read(b"\x1f\x81").unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
        assert_eq!(
            Ident::read(b"\x1f\x80\x01").unwrap_err().kind(),
            ErrorKind::InvalidValueEncoding
        );
        assert_eq!(
            Ident::read(b"\x1f\x05").unwrap_err().kind(),
            ErrorKind::InvalidValueEncoding
        );
        assert_eq!(
            Ident::read(b"\x1f\x90\x80\x80\x80\x00").unwrap_err().kind(),
            ErrorKind::InvalidValueEncoding
        );
        assert_eq!(
            Ident::read(b"\x1f\x81\x81\x81\x81\x81\x00").unwrap_err().kind(),
            ErrorKind::InvalidValueEncoding
        );
    }

    #[test]
    fn display() {
        assert_eq!(Tag::INTEGER.to_string(), "INTEGER");
        assert_eq!(Tag::application(2).to_string(), "[APPLICATION 2]");
        assert_eq!(Tag::ctx(0).to_string(), "[0]");
        assert_eq!(
            Tag::ctx(0).constructed().to_string(), "constructed [0]"
        );
    }
}
