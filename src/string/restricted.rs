//! Restricted character strings.
//!
//! This is an internal module. Its public items are re-exported by the
//! parent.

use std::{error, fmt, hash, ops, str};
use std::cmp::Ordering;
use std::marker::PhantomData;
use crate::encode::{Primitive, PrimitiveContent, Target};
use crate::error::ContentError;
use crate::ident::Tag;


//------------ CharSet -------------------------------------------------------

/// The character set of a restricted character string type.
///
/// The trait is used to define the character set of the
/// [`RestrictedString`] type. All character sets implemented here encode
/// a subset of Unicode as UTF-8, so a valid octet sequence is always a
/// valid Rust string, too.
pub trait CharSet {
    /// The natural tag of the related restricted character string type.
    const TAG: Tag;

    /// Checks that `slice` only contains characters of the set.
    fn check(slice: &[u8]) -> Result<(), CharSetError>;
}

/// Checks that all octets of `slice` match the predicate.
fn check_octets(
    slice: &[u8], op: impl Fn(u8) -> bool
) -> Result<(), CharSetError> {
    match slice.iter().position(|&ch| !op(ch)) {
        Some(pos) => Err(CharSetError { pos }),
        None => Ok(())
    }
}


//------------ RestrictedString ----------------------------------------------

/// A generic restricted character string.
///
/// Restricted character strings are OCTET STRINGs with a different tag
/// whose content is limited to the characters of a certain character set.
/// The character set is given via the type argument `L`.
///
/// The content is checked whenever a value is created, both when decoding
/// and when creating a value for encoding. A value of this type is thus
/// always valid for its character set.
pub struct RestrictedString<L> {
    /// The checked content.
    inner: String,

    /// Marker for our character set.
    marker: PhantomData<L>,
}

impl<L: CharSet> RestrictedString<L> {
    /// Creates a new character string from a `String`.
    ///
    /// If the string contains characters that are not part of the
    /// character set, an error is returned.
    pub fn from_string(s: String) -> Result<Self, CharSetError> {
        L::check(s.as_bytes())?;
        Ok(RestrictedString { inner: s, marker: PhantomData })
    }

    /// Decodes the content octets of a primitive value.
    pub fn from_content(bytes: &[u8]) -> Result<Self, ContentError> {
        L::check(bytes)?;
        let inner = match str::from_utf8(bytes) {
            Ok(s) => s.into(),
            Err(_) => return Err(ContentError::invalid_value("invalid UTF-8"))
        };
        Ok(RestrictedString { inner, marker: PhantomData })
    }

    /// Returns a value encoder using the natural tag of the character set.
    pub fn encode_ref(&self) -> Primitive<&Self> {
        self.encode()
    }

    /// Returns a value encoder using the given tag.
    pub fn encode_ref_as(&self, tag: Tag) -> Primitive<&Self> {
        self.encode_as(tag)
    }
}

impl<L> RestrictedString<L> {
    /// Returns the string as a string slice.
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    /// Converts the value into a `String`.
    pub fn into_string(self) -> String {
        self.inner
    }
}


//--- FromStr

impl<L: CharSet> str::FromStr for RestrictedString<L> {
    type Err = CharSetError;

    fn from_str(s: &str) -> Result<Self, CharSetError> {
        Self::from_string(s.into())
    }
}


//--- Deref and AsRef

impl<L> ops::Deref for RestrictedString<L> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl<L> AsRef<str> for RestrictedString<L> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}


//--- Clone, PartialEq and Eq, PartialOrd and Ord, Hash
//
// Implemented manually to avoid bounds on the marker.

impl<L> Clone for RestrictedString<L> {
    fn clone(&self) -> Self {
        RestrictedString { inner: self.inner.clone(), marker: PhantomData }
    }
}

impl<L> PartialEq for RestrictedString<L> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<L> Eq for RestrictedString<L> { }

impl<L> PartialOrd for RestrictedString<L> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<L> Ord for RestrictedString<L> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}

impl<L> hash::Hash for RestrictedString<L> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}


//--- PrimitiveContent

impl<L: CharSet> PrimitiveContent for &'_ RestrictedString<L> {
    const TAG: Tag = L::TAG;

    fn encoded_len(self) -> usize {
        self.inner.len()
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self.inner.as_bytes())
    }
}


//--- Display and Debug

impl<L> fmt::Display for RestrictedString<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<L: CharSet> fmt::Debug for RestrictedString<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({:?})", L::TAG, self.as_str())
    }
}


//------------ Utf8String ----------------------------------------------------

/// A restricted character string containing any Unicode character.
pub type Utf8String = RestrictedString<Utf8CharSet>;

/// The character set for the UTF8String ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct Utf8CharSet;

impl CharSet for Utf8CharSet {
    const TAG: Tag = Tag::UTF8_STRING;

    fn check(slice: &[u8]) -> Result<(), CharSetError> {
        str::from_utf8(slice).map(|_| ()).map_err(|err| {
            CharSetError { pos: err.valid_up_to() }
        })
    }
}


//------------ NumericString -------------------------------------------------

/// A restricted character string containing decimal digits only.
///
/// X.680 also permits the space character. It isn’t accepted here since
/// the protocols using this type only ever carry digits.
pub type NumericString = RestrictedString<NumericCharSet>;

/// The character set for the NumericString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct NumericCharSet;

impl CharSet for NumericCharSet {
    const TAG: Tag = Tag::NUMERIC_STRING;

    fn check(slice: &[u8]) -> Result<(), CharSetError> {
        check_octets(slice, |ch| ch.is_ascii_digit())
    }
}


//------------ PrintableString -----------------------------------------------

/// A restricted character string allowing a subset of ASCII characters.
///
/// This character string allows the following characters from the ASCII
/// character set and encodes them with their ASCII value:
///
/// * the letters `A` to `Z` and `a` to `z`,
/// * the digits `0` to `9`,
/// * the space character ` `,
/// * the symbols `'`, `(`, `)`, `+`, `,`, `-`, `.`, `/`, `:`, `=`, and `?`.
pub type PrintableString = RestrictedString<PrintableCharSet>;

/// The character set for the PrintableString ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct PrintableCharSet;

impl CharSet for PrintableCharSet {
    const TAG: Tag = Tag::PRINTABLE_STRING;

    fn check(slice: &[u8]) -> Result<(), CharSetError> {
        check_octets(slice, |ch| {
            ch.is_ascii_alphanumeric() || // A-Z a-z 0-9
            ch == b' ' || ch == b'\'' || ch == b'(' || ch == b')' ||
            ch == b'+' || ch == b',' || ch == b'-' || ch == b'.' ||
            ch == b'/' || ch == b':' || ch == b'=' || ch == b'?'
        })
    }
}


//------------ Ia5String -----------------------------------------------------

/// A restricted character string containing only ASCII characters.
pub type Ia5String = RestrictedString<Ia5CharSet>;

/// The character set for the IA5String ASN.1 type.
#[derive(Clone, Copy, Debug)]
pub struct Ia5CharSet;

impl CharSet for Ia5CharSet {
    const TAG: Tag = Tag::IA5_STRING;

    fn check(slice: &[u8]) -> Result<(), CharSetError> {
        check_octets(slice, |ch| ch.is_ascii())
    }
}


//------------ CharSetError --------------------------------------------------

/// An illegal character was encountered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CharSetError {
    /// The index of the first offending octet.
    pos: usize,
}

impl CharSetError {
    /// Returns the index of the first octet not in the character set.
    pub fn position(self) -> usize {
        self.pos
    }
}

impl fmt::Display for CharSetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid character at index {}", self.pos)
    }
}

impl error::Error for CharSetError { }

impl From<CharSetError> for ContentError {
    fn from(err: CharSetError) -> Self {
        ContentError::from_string(
            crate::error::ErrorKind::InvalidValueEncoding, err.to_string()
        )
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::encode::Values;
    use crate::error::ErrorKind;
    use super::*;

    #[test]
    fn printable_string() {
        let ps = PrintableString::from_content(b"This is okay").unwrap();
        assert_eq!(ps.as_str(), "This is okay");
        assert_eq!(ps.encode_ref().to_vec(), b"\x13\x0cThis is okay");
        assert_eq!(
            PrintableString::from_content(b"This is not okay!").unwrap_err(),
            ContentError::from_string(
                ErrorKind::InvalidValueEncoding,
                "invalid character at index 16".into()
            )
        );
    }

    #[test]
    fn numeric_string() {
        let ns: NumericString = "0123456789".parse().unwrap();
        assert_eq!(ns.encode_ref().to_vec(), b"\x12\x0a0123456789");
        assert_eq!(
            "12 34".parse::<NumericString>().unwrap_err().position(), 2
        );
    }

    #[test]
    fn ia5_and_utf8() {
        assert!(Ia5String::from_content(b"user@example.com").is_ok());
        assert!(Ia5String::from_content("grüß".as_bytes()).is_err());
        let s = Utf8String::from_content("grüß".as_bytes()).unwrap();
        assert_eq!(s.as_str(), "grüß");
        assert_eq!(
            Utf8String::from_content(b"ab\xff").unwrap_err().kind(),
            ErrorKind::InvalidValueEncoding
        );
    }
}
