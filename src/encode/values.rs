//! Everything related to the `Values` trait.
//!
//! This is an internal module. The relevant items are re-exported by the
//! parent.

use crate::ident::{Ident, Tag};
use crate::length::Length;
use super::target::{Target, infallible};


//------------ Values --------------------------------------------------------

/// A type that is a value encoder.
///
/// Value encoders know how to encode themselves into a sequence of DER
/// encoded values. While you can impl this trait for your type manually,
/// in practice it is often easier to define a method called `encode` and
/// let it return some dedicated value encoder type constructed from the
/// types provided by this module.
///
/// The two methods form a contract: `write_encoded` must write exactly
/// `encoded_len` octets. Constructed values rely on this when writing
/// their length octets before their content.
pub trait Values {
    /// Returns the length of the encoded values.
    fn encoded_len(&self) -> usize;

    /// Encodes the values and writes them to `target`.
    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error>;


    //--- Provided methods

    /// Converts the encoder into one with an explicit tag.
    ///
    /// For an explicit tag, the value is wrapped in a constructed value with
    /// the given tag.
    fn explicit(self, tag: Tag) -> Constructed<Self>
    where Self: Sized {
        Constructed::new(tag, self)
    }

    /// Writes the encoded values into a new vec.
    fn to_vec(&self) -> Vec<u8> {
        let mut target = Vec::with_capacity(self.encoded_len());
        infallible(self.write_encoded(&mut target));
        target
    }
}


//--- Blanket impls

impl<V: Values + ?Sized> Values for &'_ V {
    fn encoded_len(&self) -> usize {
        (*self).encoded_len()
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        (*self).write_encoded(target)
    }
}


//--- Impls for Tuples

/// Macro for implementing `Values` for tuples.
///
/// All the `Tx`s are the type parameters of the elements of the tuple, the
/// numbers are the tuple element numbers. Both lists are given backwards
/// ending in element 0 so that the macro can peel off the head and recurse
/// into the shorter tuple.
macro_rules! tupl_impl {
    // Termination: empty lists, do nothing.
    ( tuple > ) => { };

    // Impl values for the complete lists, then recurse to the lists without
    // their heads.
    ( tuple $t:ident $( $ttail:ident )* > $i:tt $( $itail:tt )* ) => {
        impl<$t: Values, $( $ttail: Values ),*> Values
                for ($t, $( $ttail ),*) {
            fn encoded_len(&self) -> usize {
                self.$i.encoded_len()
                $(
                    + self.$itail.encoded_len()
                )*
            }

            fn write_encoded<T: Target>(
                &self,
                target: &mut T
            ) -> Result<(), T::Error> {
                tupl_impl!( write self, target, $i $( $itail )* );
                Ok(())
            }
        }

        tupl_impl!(
             tuple $($ttail)* > $($itail)*
        );
    };

    // Termination: empty lists, do nothing.
    ( write $self:expr, $target:expr, ) => { };

    // Write all elements of tuple $self to $target, lowest number first.
    ( write $self:expr, $target:expr, $i:tt $($itail:tt)*) => {
        tupl_impl!( write $self, $target, $($itail)* );
        $self.$i.write_encoded($target)?
    }
}

tupl_impl!(
    tuple T5 T4 T3 T2 T1 T0 > 5 4 3 2 1 0
);


//--- Impl for Option

/// Encoding of an optional value.
///
/// This implementation encodes `None` as nothing, i.e., as an OPTIONAL
/// in ASN.1 parlance.
impl<V: Values> Values for Option<V> {
    fn encoded_len(&self) -> usize {
        match self {
            Some(v) => v.encoded_len(),
            None => 0,
        }
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Some(v) => v.write_encoded(target),
            None => Ok(())
        }
    }
}


//--- Impl for slice and Vec

impl<V: Values> Values for [V] {
    fn encoded_len(&self) -> usize {
        self.iter().map(Values::encoded_len).sum()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        self.iter().try_for_each(|v| v.write_encoded(target))
    }
}

impl<V: Values> Values for Vec<V> {
    fn encoded_len(&self) -> usize {
        self.as_slice().encoded_len()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        self.as_slice().write_encoded(target)
    }
}


//------------ Constructed ---------------------------------------------------

/// A value encoder for a single constructed value.
///
/// The encoder always uses the definite length form.
pub struct Constructed<V> {
    /// The tag of the value.
    tag: Tag,

    /// A value encoder for the content of the value.
    inner: V,
}

impl<V> Constructed<V> {
    /// Creates a new constructed value encoder from a tag and content.
    ///
    /// The returned value will encode as a single constructed value with
    /// the given tag and whatever `inner` encodes to as its content.
    pub fn new(tag: Tag, inner: V) -> Self {
        Constructed { tag, inner }
    }
}

impl<V: Values> Values for Constructed<V> {
    fn encoded_len(&self) -> usize {
        total_len(self.tag, self.inner.encoded_len())
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        write_header(target, self.tag, true, self.inner.encoded_len())?;
        self.inner.write_encoded(target)
    }
}


//--------------- Iter -------------------------------------------------------

/// A wrapper for an iterator of values.
///
/// The type wraps something that impls `IntoIterator`. It needs to be
/// `Clone`, because we need to be able to restart iterating at the
/// beginning: once for the length and once for the content.
///
/// The wrapper is needed because a blanket impl on any iterator type is
/// currently not possible.
pub struct Iter<I>(pub I);

impl<I> Iter<I> {
    /// Creates a new iterator encoder atop `iter`.
    pub fn new(iter: I) -> Self {
        Iter(iter)
    }
}

/// Wraps an iterator over value encoders into a value encoder.
pub fn iter<I>(iter: I) -> Iter<I> {
    Iter::new(iter)
}

impl<I> Values for Iter<I>
where
    I: Clone + IntoIterator,
    <I as IntoIterator>::Item: Values
{
    fn encoded_len(&self) -> usize {
        self.0.clone().into_iter().map(|item| item.encoded_len()).sum()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        self.0.clone().into_iter().try_for_each(|item| {
            item.write_encoded(target)
        })
    }
}


//============ Standard Functions ============================================

/// Returns a value encoder for a SEQUENCE containing `inner`.
pub fn sequence<V: Values>(inner: V) -> Constructed<V> {
    Constructed::new(Tag::SEQUENCE, inner)
}

/// Returns a value encoder for a SEQUENCE with the given tag.
///
/// This is identical to `Constructed::new(tag, inner)`. It merely provides a
/// more memorable name.
pub fn sequence_as<V: Values>(tag: Tag, inner: V) -> Constructed<V> {
    Constructed::new(tag, inner)
}

/// Returns the length for a structure based on the tag and content length.
///
/// This is necessary because the length octets have a different length
/// depending on the content length.
pub fn total_len(tag: Tag, content_l: usize) -> usize {
    Ident::from_tag(tag, false).encoded_len()
        + Length::Definite(content_l).encoded_len()
        + content_l
}

/// Writes the header for a value.
///
/// The header in the sense of this function is the identifier octets and the
/// length octets.
pub fn write_header<T: Target>(
    target: &mut T,
    tag: Tag,
    constructed: bool,
    content_length: usize,
) -> Result<(), T::Error> {
    Ident::from_tag(tag, constructed).write_encoded(target)?;
    Length::Definite(content_length).write_encoded(target)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::encode::PrimitiveContent;
    use super::*;

    #[test]
    fn sequence_of_integers() {
        let seq = sequence(vec![1i64.encode(), 2i64.encode(), 3i64.encode()]);
        assert_eq!(seq.encoded_len(), 11);
        assert_eq!(
            seq.to_vec(),
            b"\x30\x09\x02\x01\x01\x02\x01\x02\x02\x01\x03"
        );
    }

    #[test]
    fn tuple_order_and_options() {
        let ab: &[u8] = b"ab";
        let values = (
            true.encode(),
            None::<crate::encode::Primitive<i64>>,
            Some(ab.encode_as(Tag::ctx(1))),
        );
        assert_eq!(values.encoded_len(), 7);
        assert_eq!(values.to_vec(), b"\x01\x01\xff\x81\x02ab");
    }

    #[test]
    fn explicit_and_long_lengths() {
        let data = vec![0u8; 200];
        let value = data.as_slice().encode().explicit(Tag::ctx(2));
        let encoded = value.to_vec();
        assert_eq!(value.encoded_len(), encoded.len());
        assert_eq!(&encoded[..6], b"\xa2\x81\xcb\x04\x81\xc8");
    }

    #[test]
    fn iter_of_strings() {
        let uris = vec!["a".to_string(), "bc".to_string()];
        let value = sequence(
            iter(uris.iter().map(|uri| uri.as_bytes().encode()))
        );
        assert_eq!(value.to_vec(), b"\x30\x07\x04\x01a\x04\x02bc");
    }
}
