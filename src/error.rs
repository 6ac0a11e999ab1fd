//! Error handling.
//!
//! All operations of the crate report failures through the types defined
//! here. Code that doesn’t know where in the input it is – the primitive
//! value codecs, grammar actions, tree builders – produces a
//! [`ContentError`]. The decoding container and the encoder attach the
//! byte offset, turning it into a [`CodecError`].

use std::{error, fmt, ops};
use std::borrow::Cow;
use crate::ident::Ident;


//------------ ErrorKind -----------------------------------------------------

/// The kind of an error.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// More octets are needed.
    ///
    /// This is the only kind that can be recovered from: feeding more data
    /// to the same container resumes decoding where it stopped.
    TruncatedInput,

    /// A length is malformed, too large, or inconsistent with its
    /// surroundings.
    InvalidLength,

    /// The grammar has no transition for the tag just read.
    UnexpectedTag,

    /// The content octets of a value don’t encode a valid value.
    InvalidValueEncoding,

    /// The encoding target is too small for the encoded value.
    BufferTooSmall,

    /// The number of octets written differs from the computed length.
    ///
    /// This indicates a bug in a value encoder.
    LengthMismatch,

    /// The message ended while the grammar still expected more values.
    PrematureEnd,
}

impl ErrorKind {
    /// Returns whether decoding can continue once more data is available.
    pub fn is_recoverable(self) -> bool {
        matches!(self, ErrorKind::TruncatedInput)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ErrorKind::TruncatedInput => "truncated input",
            ErrorKind::InvalidLength => "invalid length",
            ErrorKind::UnexpectedTag => "unexpected tag",
            ErrorKind::InvalidValueEncoding => "invalid value encoding",
            ErrorKind::BufferTooSmall => "buffer too small",
            ErrorKind::LengthMismatch => "length mismatch",
            ErrorKind::PrematureEnd => "premature end of message",
        })
    }
}


//------------ Mismatch ------------------------------------------------------

/// Details about what was expected and what was found instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mismatch {
    /// A tag was found where the grammar didn’t allow it.
    Tag {
        /// The identifier octets that were found.
        found: Ident,
    },

    /// A length differs from the one required.
    Length {
        /// The length required.
        expected: usize,

        /// The length actually present.
        found: usize,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Mismatch::Tag { found } => write!(f, "found {}", found),
            Mismatch::Length { expected, found } => {
                write!(f, "expected {} octets, found {}", expected, found)
            }
        }
    }
}


//------------ ContentError --------------------------------------------------

/// An error without a position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentError {
    /// The kind of error.
    kind: ErrorKind,

    /// A human readable description.
    msg: Cow<'static, str>,

    /// What was expected and found, if known.
    mismatch: Option<Mismatch>,
}

impl ContentError {
    /// Creates an error from a kind and a static message.
    pub fn from_static(kind: ErrorKind, msg: &'static str) -> Self {
        ContentError { kind, msg: Cow::Borrowed(msg), mismatch: None }
    }

    /// Creates an error from a kind and an owned message.
    pub fn from_string(kind: ErrorKind, msg: String) -> Self {
        ContentError { kind, msg: Cow::Owned(msg), mismatch: None }
    }

    /// Creates an error for more data needed.
    pub fn truncated() -> Self {
        Self::from_static(ErrorKind::TruncatedInput, "unexpected end of data")
    }

    /// Creates an error for a malformed or inacceptable length.
    pub fn invalid_length(msg: &'static str) -> Self {
        Self::from_static(ErrorKind::InvalidLength, msg)
    }

    /// Creates an error for malformed content octets.
    pub fn invalid_value(msg: &'static str) -> Self {
        Self::from_static(ErrorKind::InvalidValueEncoding, msg)
    }

    /// Creates an error for a tag the grammar doesn’t allow.
    pub fn unexpected_tag(found: Ident) -> Self {
        ContentError {
            kind: ErrorKind::UnexpectedTag,
            msg: Cow::Borrowed("unexpected tag"),
            mismatch: Some(Mismatch::Tag { found }),
        }
    }

    /// Creates an error for content of the wrong length.
    pub fn length_mismatch(
        msg: &'static str, expected: usize, found: usize
    ) -> Self {
        ContentError {
            kind: ErrorKind::InvalidLength,
            msg: Cow::Borrowed(msg),
            mismatch: Some(Mismatch::Length { expected, found }),
        }
    }

    /// Adds mismatch details to the error.
    pub fn with_mismatch(mut self, mismatch: Mismatch) -> Self {
        self.mismatch = Some(mismatch);
        self
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        self.msg.as_ref()
    }

    /// Returns the mismatch detail if there is one.
    pub fn mismatch(&self) -> Option<Mismatch> {
        self.mismatch
    }

    /// Attaches a position to the error.
    pub fn at(self, pos: impl Into<Pos>) -> CodecError {
        CodecError { content: self, pos: pos.into() }
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)?;
        if let Some(mismatch) = self.mismatch {
            write!(f, " ({})", mismatch)?;
        }
        Ok(())
    }
}

impl error::Error for ContentError { }


//------------ CodecError ----------------------------------------------------

/// An error that happened while decoding or encoding a message.
///
/// The error contains the position in the octet stream where it happened.
/// For decoding, this is the offset from the first octet fed into the
/// container. For encoding, it is the offset into the target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodecError {
    content: ContentError,
    pos: Pos,
}

impl CodecError {
    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.content.kind
    }

    /// Returns the position where the error happened.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        self.content.message()
    }

    /// Returns the mismatch detail if there is one.
    pub fn mismatch(&self) -> Option<Mismatch> {
        self.content.mismatch
    }

    /// Returns whether more data is needed to continue.
    pub fn is_truncated(&self) -> bool {
        self.kind().is_recoverable()
    }

    /// Returns a reference to the position-less error.
    pub fn content(&self) -> &ContentError {
        &self.content
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at offset {}", self.content, self.pos)
    }
}

impl error::Error for CodecError { }


//------------ Pos -----------------------------------------------------------

/// The logical position within an octet stream.
///
/// Values of this type are used for diagnostics only.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Pos(usize);

impl Pos {
    /// Returns the position as an offset in octets.
    pub fn offset(self) -> usize {
        self.0
    }
}

impl From<usize> for Pos {
    fn from(pos: usize) -> Pos {
        Pos(pos)
    }
}

impl ops::Add<usize> for Pos {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        Pos(self.0 + rhs)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}


//============ Tests =========================================================
