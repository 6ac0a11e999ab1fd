//! The length octets.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use crate::decode::DecoderConfig;
use crate::encode::Target;
use crate::error::ContentError;


//------------ Length --------------------------------------------------------

/// The length octets of an encoded value.
///
/// A length value can either be definite, meaning it provides the actual
/// number of content octets in the value, or indefinite, in which case the
/// content is delimited by a special end-of-contents marker.
///
/// # BER Encoding
///
/// The length can be encoded in one of two basic ways. Which one is used is
/// determined by the most significant bit of the first octet. If it is not
/// set, the length octets is one octet long and the remaining bits of this
/// first octet provide the definite length. Thus, if the first octet is
/// less than 128, it provides the definite length already.
///
/// If the most significant bit is set, the remaining bits of the first
/// octet specify the number of octets that follow to encode the actual
/// length. If they specify that there are zero more octets, i.e., the
/// value of the first octet is 128, the length is indefinite. Otherwise,
/// those following octets give the big-endian encoding of the definite
/// length of the content octets. The value 0xFF for the first octet is
/// reserved.
///
/// Under DER rules, a definite length must be encoded in the minimum
/// number of octets and indefinite lengths are not allowed at all. The
/// encoder always produces that form.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Length {
    /// A definite length of the given number of content octets.
    Definite(usize),

    /// An indefinite length.
    Indefinite,
}

impl Length {
    /// Returns the length if it is definite.
    pub fn definite(self) -> Option<usize> {
        match self {
            Length::Definite(len) => Some(len),
            Length::Indefinite => None,
        }
    }

    /// Returns whether the length is indefinite.
    pub fn is_indefinite(self) -> bool {
        matches!(self, Length::Indefinite)
    }

    /// Returns whether the length is definite and zero.
    pub fn is_zero(self) -> bool {
        self.definite() == Some(0)
    }

    /// Reads the length octets from the start of `data`.
    ///
    /// Returns the length and the number of octets it occupied. If `data`
    /// ends before the length octets are complete, a truncated input error
    /// is returned. A long form length with more subsequent octets than
    /// allowed by `config`, a value that doesn’t fit into a `usize`, the
    /// reserved value 0xFF and, in DER mode, a non-minimal length are all
    /// rejected as invalid lengths.
    pub fn read(
        data: &[u8], config: &DecoderConfig,
    ) -> Result<(Self, usize), ContentError> {
        let len = match FirstOctet::peek(data)? {
            FirstOctet::Single(res) => return Ok((res, 1)),
            FirstOctet::Multi(len) => len,
        };
        if len > config.max_length_octets() {
            return Err(ContentError::invalid_length(
                "too many length octets"
            ))
        }
        let octets = match data.get(1..len + 1) {
            Some(octets) => octets,
            None => return Err(ContentError::truncated()),
        };

        // The difference between BER and DER is that in DER the first
        // subsequent octet can’t be zero and it can’t be less than 0x80 if
        // it is the only one. In both cases, there is a shorter encoding.
        if config.mode().is_restricted()
            && (octets[0] == 0 || (octets[0] < 0x80 && len == 1))
        {
            return Err(ContentError::invalid_length(
                "non-minimal length in DER"
            ))
        }

        let mut res = 0usize;
        for &octet in octets {
            res = match res.checked_mul(0x100) {
                Some(res) => res | usize::from(octet),
                None => {
                    return Err(ContentError::invalid_length(
                        "excessive length"
                    ))
                }
            };
        }
        Ok((Length::Definite(res), len + 1))
    }

    /// Returns the length of the encoded representation of the value.
    pub fn encoded_len(self) -> usize {
        match self {
            Length::Definite(len) => Definite(len).encoded_len(),
            Length::Indefinite => 1,
        }
    }

    /// Writes the encoded length to the given target.
    pub fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Length::Definite(len) => Definite(len).write_encoded(target),
            Length::Indefinite => target.write_all(&[0x80]),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Length::Definite(len) => fmt::Display::fmt(&len, f),
            Length::Indefinite => f.write_str("indefinite"),
        }
    }
}


//------------ FirstOctet ---------------------------------------------------

/// The first octet of the encoded length.
enum FirstOctet {
    /// The first octet is a length in and of itself.
    Single(Length),

    /// The first octet indicates the number of octets to follow.
    Multi(usize),
}

impl FirstOctet {
    /// Look at the first octet and check what it means.
    fn peek(data: &[u8]) -> Result<Self, ContentError> {
        match data.first().copied() {
            None => Err(ContentError::truncated()),

            // Bit 7 clear: single.
            Some(n) if (n & 0x80) == 0 => {
                Ok(FirstOctet::Single(Length::Definite(usize::from(n))))
            }

            // 0x80: indefinite.
            Some(0x80) => Ok(FirstOctet::Single(Length::Indefinite)),

            // 0xFF: reserved.
            Some(0xFF) => {
                Err(ContentError::invalid_length("reserved length octet"))
            }

            // anything else: clear left bit, number of octets.
            Some(n) => Ok(FirstOctet::Multi(usize::from(n & 0x7F)))
        }
    }
}


//------------ Definite ------------------------------------------------------

/// A definite length.
///
/// This is a newtype of `usize` which allows us to do all the encoding
/// things on it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
struct Definite(usize);

impl Definite {
    const LEN: usize = 0usize.to_ne_bytes().len();

    fn encoded_len(self) -> usize {
        if self.0 > 0x7F {
            Self::LEN - self.encoded_start_idx() + 1
        }
        else {
            1
        }
    }

    fn write_encoded<T: Target>(
        self, target: &mut T
    ) -> Result<(), T::Error> {
        if self.0 > 0x7F {
            let idx = self.encoded_start_idx();
            debug_assert!(idx < Self::LEN);

            // LEN will never be greater than 126 bytes. Also, `idx` won’t be
            // greater than LEN, so the subtraction here is fine.
            target.write_all(&[((Self::LEN - idx) | 0x80) as u8])?;
            target.write_all(&self.0.to_be_bytes()[idx..])
        }
        else {
            target.write_all(&[self.0 as u8])
        }
    }

    /// Returns the index of the first non-zero octet of the value.
    fn encoded_start_idx(self) -> usize {
        (self.0.leading_zeros() / 8) as usize
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;
    use crate::mode::Mode;
    use super::*;

    fn read_with(
        data: &[u8], config: DecoderConfig
    ) -> Result<Option<usize>, ErrorKind> {
        match Length::read(data, &config) {
            Ok((len, used)) => {
                assert_eq!(used, data.len(), "trailing data");
                Ok(len.definite())
            }
            Err(err) => Err(err.kind())
        }
    }

    #[test]
    fn ber_read() {
        let read = |data: &[u8]| read_with(data, DecoderConfig::default());

        assert_eq!(read(b"\x00"), Ok(Some(0x00)));
        assert_eq!(read(b"\x12"), Ok(Some(0x12)));
        assert_eq!(read(b"\x7f"), Ok(Some(0x7f)));
        assert_eq!(read(b"\x80"), Ok(None));
        assert_eq!(read(b"\x81\x00"), Ok(Some(0)));
        assert_eq!(read(b"\x81\xF0"), Ok(Some(0xF0)));
        assert_eq!(read(b"\x82\x00\x00"), Ok(Some(0)));
        assert_eq!(read(b"\x82\xF0\x0E"), Ok(Some(0xF00E)));
        assert_eq!(read(b"\x82\x00\x0E"), Ok(Some(0x0E)));
        assert_eq!(read(b"\xFF"), Err(ErrorKind::InvalidLength));
        assert_eq!(read(b""), Err(ErrorKind::TruncatedInput));
        assert_eq!(read(b"\x82\x01"), Err(ErrorKind::TruncatedInput));
        assert_eq!(
            read(b"\x85\x01\x00\x00\x00\x00"), Err(ErrorKind::InvalidLength)
        );
    }

    #[test]
    fn der_read() {
        let read = |data: &[u8]| read_with(
            data, DecoderConfig::default().with_mode(Mode::Der)
        );

        assert_eq!(read(b"\x00"), Ok(Some(0x00)));
        assert_eq!(read(b"\x7f"), Ok(Some(0x7f)));
        assert_eq!(read(b"\x80"), Ok(None));
        assert_eq!(read(b"\x81\x00"), Err(ErrorKind::InvalidLength));
        assert_eq!(read(b"\x81\x7f"), Err(ErrorKind::InvalidLength));
        assert_eq!(read(b"\x81\x80"), Ok(Some(0x80)));
        assert_eq!(read(b"\x82\x00\x00"), Err(ErrorKind::InvalidLength));
        assert_eq!(read(b"\x82\xF0\x0E"), Ok(Some(0xF00E)));
        assert_eq!(read(b"\x82\x00\x0E"), Err(ErrorKind::InvalidLength));
    }

    #[test]
    fn hostile_length_of_length() {
        let mut data = vec![0xFE];
        data.extend_from_slice(&[0x01; 126]);
        assert_eq!(
            read_with(&data, DecoderConfig::default()),
            Err(ErrorKind::InvalidLength)
        );
        assert_eq!(
            read_with(
                &data,
                DecoderConfig::default().with_max_length_octets(126)
            ),
            Err(ErrorKind::InvalidLength)
        );
    }

    #[test]
    fn encode() {
        fn step(l: Length, res: &[u8]) {
            let mut vec = Vec::new();
            crate::encode::infallible(l.write_encoded(&mut vec));
            assert_eq!(vec.as_slice(), res, "write failed for {:?}", l);
            assert_eq!(l.encoded_len(), res.len());
        }

        step(Length::Indefinite, b"\x80");
        step(Length::Definite(0), b"\x00");
        step(Length::Definite(0x12), b"\x12");
        step(Length::Definite(0x7f), b"\x7f");
        step(Length::Definite(0x80), b"\x81\x80");
        step(Length::Definite(0xdead), b"\x82\xde\xad");
        step(Length::Definite(0x01_0000), b"\x83\x01\x00\x00");
    }
}
