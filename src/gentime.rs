//! The GeneralizedTime type.
//!
//! Only the form used on the wire by the supported protocols is
//! implemented: UTC times with an optional fraction of a second, i.e.,
//! `YYYYMMDDHHMMSS[.f]Z`. Local times and time zone offsets are rejected.

use std::{fmt, str};
use smallvec::SmallVec;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};
use crate::encode::{Primitive, PrimitiveContent, Target};
use crate::error::ContentError;
use crate::ident::Tag;


//------------ GeneralizedTime -----------------------------------------------

/// A GeneralizedTime value in UTC.
///
/// The fraction of a second is kept with nanosecond precision. The year is
/// limited to the four digits of the encoded form.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GeneralizedTime(PrimitiveDateTime);

/// The encoded content octets.
type Octets = SmallVec<[u8; 25]>;

impl GeneralizedTime {
    /// Creates a new value from a date and time in UTC.
    ///
    /// Fails if the year can’t be expressed in four digits.
    pub fn new(datetime: PrimitiveDateTime) -> Result<Self, ContentError> {
        if !(0..=9999).contains(&datetime.year()) {
            return Err(ContentError::invalid_value(
                "year out of range for GeneralizedTime"
            ))
        }
        Ok(GeneralizedTime(datetime))
    }

    /// Returns the current time.
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        GeneralizedTime(PrimitiveDateTime::new(now.date(), now.time()))
    }

    /// Parses the content octets of a primitive value.
    pub fn from_content(bytes: &[u8]) -> Result<Self, ContentError> {
        let mut parser = Parser(bytes);
        let year = parser.digits(4)?;
        let month = parser.digits(2)?;
        let day = parser.digits(2)?;
        let hour = parser.digits(2)?;
        let minute = parser.digits(2)?;
        let second = parser.digits(2)?;
        let nano = parser.fraction()?;
        if parser.0 != b"Z" {
            return Err(ContentError::invalid_value(
                "GeneralizedTime must end in Z"
            ))
        }

        let month = u8::try_from(month).ok().and_then(|month| {
            Month::try_from(month).ok()
        });
        let date = month.and_then(|month| {
            Date::from_calendar_date(year as i32, month, day as u8).ok()
        });
        let time = Time::from_hms_nano(
            hour as u8, minute as u8, second as u8, nano
        ).ok();
        match (date, time) {
            (Some(date), Some(time)) => {
                Ok(GeneralizedTime(PrimitiveDateTime::new(date, time)))
            }
            _ => Err(ContentError::invalid_value("invalid date or time"))
        }
    }

    /// Returns whether the value has a non-zero fraction of a second.
    pub fn has_fraction(self) -> bool {
        self.0.nanosecond() != 0
    }

    /// Returns the value with the fraction of a second removed.
    pub fn truncate_fraction(self) -> Self {
        let time = Time::from_hms(
            self.0.hour(), self.0.minute(), self.0.second()
        );
        match time {
            Ok(time) => GeneralizedTime(self.0.replace_time(time)),
            Err(_) => self,
        }
    }

    /// Returns the date and time in UTC.
    pub fn to_datetime(self) -> PrimitiveDateTime {
        self.0
    }

    /// Returns the value as an offset date time in UTC.
    pub fn to_offset_datetime(self) -> OffsetDateTime {
        self.0.assume_utc()
    }

    /// Returns a value encoder for the value using the natural tag.
    pub fn encode_value(self) -> Primitive<Self> {
        self.encode()
    }

    /// Returns the DER encoded content octets.
    fn to_octets(self) -> Octets {
        let mut res = SmallVec::new();
        push_digits(&mut res, self.0.year() as u32, 4);
        push_digits(&mut res, u8::from(self.0.month()).into(), 2);
        push_digits(&mut res, self.0.day().into(), 2);
        push_digits(&mut res, self.0.hour().into(), 2);
        push_digits(&mut res, self.0.minute().into(), 2);
        push_digits(&mut res, self.0.second().into(), 2);
        let mut nano = self.0.nanosecond();
        if nano != 0 {
            let mut width = 9;
            while nano % 10 == 0 {
                nano /= 10;
                width -= 1;
            }
            res.push(b'.');
            push_digits(&mut res, nano, width);
        }
        res.push(b'Z');
        res
    }
}

/// Appends `value` as exactly `width` decimal digits.
fn push_digits(target: &mut Octets, value: u32, width: u32) {
    for exp in (0..width).rev() {
        target.push(b'0' + (value / 10u32.pow(exp) % 10) as u8);
    }
}


//--- TryFrom and From

impl TryFrom<OffsetDateTime> for GeneralizedTime {
    type Error = ContentError;

    fn try_from(datetime: OffsetDateTime) -> Result<Self, Self::Error> {
        let datetime = datetime.to_offset(UtcOffset::UTC);
        Self::new(PrimitiveDateTime::new(datetime.date(), datetime.time()))
    }
}

impl From<GeneralizedTime> for OffsetDateTime {
    fn from(time: GeneralizedTime) -> Self {
        time.to_offset_datetime()
    }
}


//--- FromStr

impl str::FromStr for GeneralizedTime {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_content(s.as_bytes())
    }
}


//--- PrimitiveContent

impl PrimitiveContent for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(self) -> usize {
        self.to_octets().len()
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(&self.to_octets())
    }
}


//--- Display and Debug

impl fmt::Display for GeneralizedTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // The octets are ASCII digits plus ‘.’ and ‘Z’.
        for &ch in self.to_octets().iter() {
            fmt::Write::write_char(f, char::from(ch))?;
        }
        Ok(())
    }
}

impl fmt::Debug for GeneralizedTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GeneralizedTime({})", self)
    }
}


//------------ Parser --------------------------------------------------------

/// Takes the components of a GeneralizedTime off the front of a slice.
struct Parser<'a>(&'a [u8]);

impl Parser<'_> {
    /// Takes exactly `count` decimal digits.
    fn digits(&mut self, count: usize) -> Result<u32, ContentError> {
        let digits = match self.0.get(..count) {
            Some(digits) => digits,
            None => {
                return Err(ContentError::invalid_value(
                    "GeneralizedTime too short"
                ))
            }
        };
        let mut res = 0;
        for &ch in digits {
            if !ch.is_ascii_digit() {
                return Err(ContentError::invalid_value(
                    "non-digit in GeneralizedTime"
                ))
            }
            res = res * 10 + u32::from(ch - b'0');
        }
        self.0 = &self.0[count..];
        Ok(res)
    }

    /// Takes an optional fraction of a second and returns nanoseconds.
    ///
    /// Both the full stop and the comma are accepted as the decimal mark.
    /// The fraction must have between one and nine digits.
    fn fraction(&mut self) -> Result<u32, ContentError> {
        match self.0.first() {
            Some(b'.') | Some(b',') => { }
            _ => return Ok(0)
        }
        let count = self.0[1..].iter().take_while(|ch| {
            ch.is_ascii_digit()
        }).count();
        if !(1..=9).contains(&count) {
            return Err(ContentError::invalid_value(
                "invalid fraction in GeneralizedTime"
            ))
        }
        self.0 = &self.0[1..];
        let value = self.digits(count)?;
        Ok(value * 10u32.pow(9 - count as u32))
    }
}


//------------ Functions -----------------------------------------------------

/// Decodes the content octets of a GeneralizedTime value.
///
/// Malformed content results in an invalid value encoding error.
pub fn decode_generalized_time(
    bytes: &[u8]
) -> Result<GeneralizedTime, ContentError> {
    GeneralizedTime::from_content(bytes)
}

/// Returns a value encoder for a GeneralizedTime in DER form.
pub fn encode_generalized_time(
    time: GeneralizedTime
) -> Primitive<GeneralizedTime> {
    time.encode()
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use time::macros::datetime;
    use crate::encode::Values;
    use crate::error::ErrorKind;
    use super::*;

    #[test]
    fn round_trip() {
        let time = decode_generalized_time(b"20240115120000Z").unwrap();
        assert_eq!(time.to_datetime(), datetime!(2024-01-15 12:00:00));
        assert!(!time.has_fraction());
        assert_eq!(
            encode_generalized_time(time).to_vec(),
            b"\x18\x0f20240115120000Z"
        );
        assert_eq!(time.to_string(), "20240115120000Z");
    }

    #[test]
    fn fractions() {
        let time = decode_generalized_time(b"20240115120000,50Z").unwrap();
        assert_eq!(
            time.to_datetime(), datetime!(2024-01-15 12:00:00.5)
        );
        assert!(time.has_fraction());
        assert_eq!(time.to_string(), "20240115120000.5Z");
        assert_eq!(time.encoded_len(), 17);
        assert_eq!(
            time.truncate_fraction().to_string(), "20240115120000Z"
        );

        let time: GeneralizedTime =
            "19991231235959.123456789Z".parse().unwrap();
        assert_eq!(time.to_string(), "19991231235959.123456789Z");
    }

    #[test]
    fn malformed() {
        let malformed: [&[u8]; 10] = [
            b"2024-01-15",
            b"",
            b"20240115120000",
            b"20240115120000+0100",
            b"20241315120000Z",
            b"20240230120000Z",
            b"20240115250000Z",
            b"20240115120000.Z",
            b"20240115120000.1234567890Z",
            b"20240115120000ZZ",
        ];
        for bad in malformed {
            assert_eq!(
                decode_generalized_time(bad).unwrap_err().kind(),
                ErrorKind::InvalidValueEncoding,
                "{:?}", bad
            );
        }
    }

    #[test]
    fn offset_datetime() {
        let odt = datetime!(2024-01-15 13:00:00 +1);
        let time = GeneralizedTime::try_from(odt).unwrap();
        assert_eq!(time.to_string(), "20240115120000Z");
        assert_eq!(OffsetDateTime::from(time), odt);
    }
}
