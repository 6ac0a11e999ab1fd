//! Encoding data in DER.
//!
//! This module provides means to encode data in DER, i.e., always with
//! definite lengths in their shortest form.
//!
//! Encoding is done using helper types called _encoders_ that represent the
//! structure of the encoding. These types implement the trait [`Values`].
//! A type that can be encoded typically provides a method named `encode`
//! that produces a value of its encoder type representing the value’s
//! encoding. If necessary, they can also provide a method `encode_as` that
//! does the same thing but allows the caller to provide a tag to use for
//! encoding as is necessary for implicit tagging.
//!
//! Encoding happens in two passes. First, [`compute_length`] determines the
//! exact number of octets of the encoding by summing up the lengths of all
//! values bottom-up. Then [`encode`] writes the values depth-first into a
//! buffer that has been checked to be large enough.
//!
//! The trait [`PrimitiveContent`] helps with producing encoders for types
//! that use the primitive encoding. Through this trait the types can declare
//! how their content is encoded and receive an automatic encoder type based
//! on that.

pub use self::primitive::{PrimitiveContent, Primitive};
pub use self::target::{SliceTarget, Target, infallible};
pub use self::values::{
    Values, Constructed, Iter,
    iter, sequence, sequence_as, total_len, write_header,
};

use crate::error::{CodecError, ContentError, ErrorKind, Mismatch};

mod primitive;
mod target;
mod values;


//------------ compute_length ------------------------------------------------

/// Returns the number of octets `values` encode into.
pub fn compute_length<V: Values + ?Sized>(values: &V) -> usize {
    values.encoded_len()
}


//------------ encode --------------------------------------------------------

/// Encodes `values` into the beginning of `buf`.
///
/// Returns the number of octets written which is always the value returned
/// by [`compute_length`]. If `buf` is shorter than that, returns a buffer
/// too small error without writing anything.
///
/// If the encoder writes a different number of octets than it announced,
/// a length mismatch error is returned. This is a bug in the encoder and
/// will panic in debug builds.
pub fn encode<V: Values + ?Sized>(
    values: &V, buf: &mut [u8]
) -> Result<usize, CodecError> {
    let len = values.encoded_len();
    if buf.len() < len {
        return Err(target::buffer_too_small(len, buf.len()).at(0))
    }
    let mut target = SliceTarget::new(buf);
    match values.write_encoded(&mut target) {
        Ok(()) => { }
        Err(err) if err.kind() == ErrorKind::BufferTooSmall => {
            // The buffer was large enough for the announced length, so the
            // encoder wrote more than it said it would.
            return Err(length_mismatch(len, target.written() + 1))
        }
        Err(err) => return Err(err)
    }
    if target.written() != len {
        return Err(length_mismatch(len, target.written()))
    }
    Ok(len)
}

/// Encodes `values` into a newly allocated vec.
pub fn encode_to_vec<V: Values + ?Sized>(values: &V) -> Vec<u8> {
    values.to_vec()
}

fn length_mismatch(computed: usize, written: usize) -> CodecError {
    debug_assert!(
        false, "encoder computed {} octets but wrote {}", computed, written
    );
    ContentError::from_static(
        ErrorKind::LengthMismatch, "encoded length differs from computed"
    ).with_mismatch(
        Mismatch::Length { expected: computed, found: written }
    ).at(written.min(computed))
}


//============ Tests =========================================================
