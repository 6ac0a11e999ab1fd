//! Targets for encoding.
//!
//! This is a private module. The relevant items are re-exported by the
//! parent.

use std::error;
use std::convert::Infallible;
use crate::error::{CodecError, ContentError, ErrorKind, Mismatch};


//------------ Target --------------------------------------------------------

/// A target for encoding.
///
/// This type provides a simplified version of `io::Write` that allows an
/// implementing type to define its own error type. The main purpose is to
/// be able to set the error to `Infallible`. This allows users to erase
/// the error case and avoid unnecessary `unwrap`s.
pub trait Target {
    /// The error type of the target.
    type Error: error::Error;

    /// Writes the data to the target.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: Target> Target for &mut T {
    type Error = T::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (*self).write_all(data)
    }
}

impl Target for Vec<u8> {
    type Error = Infallible;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(data);
        Ok(())
    }
}


//------------ SliceTarget ---------------------------------------------------

/// A target writing into a caller provided buffer.
///
/// The target never writes past the end of the buffer. An attempt to do so
/// fails with a buffer too small error and leaves the buffer unchanged
/// beyond what was written before.
pub struct SliceTarget<'a> {
    /// The buffer to write to.
    buf: &'a mut [u8],

    /// The number of octets written so far.
    written: usize,
}

impl<'a> SliceTarget<'a> {
    /// Creates a new target atop a buffer.
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceTarget { buf, written: 0 }
    }

    /// Returns the number of octets written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Returns the number of octets still available.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.written
    }
}

impl Target for SliceTarget<'_> {
    type Error = CodecError;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let end = self.written + data.len();
        match self.buf.get_mut(self.written..end) {
            Some(dest) => {
                dest.copy_from_slice(data);
                self.written = end;
                Ok(())
            }
            None => {
                Err(buffer_too_small(end, self.buf.len()).at(self.written))
            }
        }
    }
}

/// Returns the error for a buffer of `available` octets needing `needed`.
pub(crate) fn buffer_too_small(
    needed: usize, available: usize
) -> ContentError {
    ContentError::from_string(
        ErrorKind::BufferTooSmall,
        format!("need {} octets, have {}", needed, available)
    ).with_mismatch(Mismatch::Length { expected: needed, found: available })
}


//------------ infallible ----------------------------------------------------

/// Erases an error if it can’t happen.
pub fn infallible<T, E: Into<Infallible>>(res: Result<T, E>) -> T {
    match res {
        Ok(some) => some,
        Err(_) => unreachable!(),
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slice_target_bounds() {
        let mut buf = [0u8; 4];
        let mut target = SliceTarget::new(&mut buf);
        target.write_all(b"abc").unwrap();
        assert_eq!(target.remaining(), 1);
        let err = target.write_all(b"de").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferTooSmall);
        assert_eq!(err.pos().offset(), 3);
        assert_eq!(target.written(), 3);
        assert_eq!(&buf, b"abc\0");
    }
}
