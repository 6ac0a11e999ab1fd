//! The encrypted timestamp pre-authentication data.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use crate::decode::{Assemble, Assembly, Grammar, Scalar, Transition};
use crate::encode::{Primitive, PrimitiveContent, Values, sequence};
use crate::error::ContentError;
use crate::gentime::GeneralizedTime;
use crate::ident::{Ident, Tag};
use crate::int::decode_integer;
use crate::tlv::Tuple;


//------------ KerberosTime --------------------------------------------------

/// A point in time as used by Kerberos.
///
/// ```text
/// KerberosTime ::= GeneralizedTime -- with no fractional seconds
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KerberosTime(GeneralizedTime);

/// The length of the content octets of a Kerberos time.
const KERBEROS_TIME_LEN: usize = 15;

impl KerberosTime {
    /// Creates a Kerberos time from a generalized time.
    ///
    /// Fails if the time has a fraction of a second.
    pub fn new(time: GeneralizedTime) -> Result<Self, ContentError> {
        if time.has_fraction() {
            return Err(ContentError::invalid_value(
                "fractional seconds in KerberosTime"
            ))
        }
        Ok(KerberosTime(time))
    }

    /// Returns the current time with the fraction of a second removed.
    pub fn now() -> Self {
        KerberosTime(GeneralizedTime::now().truncate_fraction())
    }

    /// Parses the content octets of a Kerberos time.
    ///
    /// Unlike a generalized time, the content may not contain a fraction
    /// of a second at all, not even one that is zero.
    pub fn from_content(bytes: &[u8]) -> Result<Self, ContentError> {
        let time = GeneralizedTime::from_content(bytes)?;
        if bytes.len() != KERBEROS_TIME_LEN {
            return Err(ContentError::invalid_value(
                "fractional seconds in KerberosTime"
            ))
        }
        Self::new(time)
    }

    /// Returns the time as a generalized time.
    pub fn to_generalized_time(self) -> GeneralizedTime {
        self.0
    }

    /// Returns a value encoder for the time.
    pub fn encode(self) -> Primitive<GeneralizedTime> {
        self.0.encode()
    }
}

impl fmt::Display for KerberosTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}


//------------ Microseconds --------------------------------------------------

/// The microsecond part of a Kerberos timestamp.
///
/// ```text
/// Microseconds ::= INTEGER (0..999999)
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Microseconds(u32);

impl Microseconds {
    /// The largest allowed value.
    pub const MAX: u32 = 999_999;

    /// Creates a value, checking the range.
    pub fn new(usec: i64) -> Result<Self, ContentError> {
        match u32::try_from(usec) {
            Ok(usec) if usec <= Self::MAX => Ok(Microseconds(usec)),
            _ => Err(ContentError::invalid_value("microseconds out of range"))
        }
    }

    /// Returns the value as an integer.
    pub fn into_u32(self) -> u32 {
        self.0
    }
}


//------------ PaEncTsEnc ----------------------------------------------------

/// The plaintext of encrypted timestamp pre-authentication data.
///
/// ```text
/// PA-ENC-TS-ENC ::= SEQUENCE {
///         patimestamp     [0] KerberosTime -- client's time --,
///         pausec          [1] Microseconds OPTIONAL }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PaEncTsEnc {
    /// The client’s time.
    pub patimestamp: KerberosTime,

    /// The microsecond part of the client’s time.
    pub pausec: Option<Microseconds>,
}

impl PaEncTsEnc {
    /// Creates a value for the current time.
    pub fn now() -> Self {
        PaEncTsEnc { patimestamp: KerberosTime::now(), pausec: None }
    }

    /// Returns a value encoder for the value.
    pub fn encode(&self) -> impl Values {
        sequence((
            self.patimestamp.encode().explicit(Tag::ctx(0)),
            self.pausec.map(|usec| {
                usec.into_u32().encode().explicit(Tag::ctx(1))
            }),
        ))
    }
}


//------------ PaEncTsEncGrammar ---------------------------------------------

const SEQUENCE: Ident = Ident::SEQUENCE;
const PATIMESTAMP: Ident = Tag::ctx(0).constructed();
const PAUSEC: Ident = Tag::ctx(1).constructed();
const GENERALIZED_TIME: Ident = Tag::GENERALIZED_TIME.primitive();
const INTEGER: Ident = Tag::INTEGER.primitive();

/// The states of the PA-ENC-TS-ENC grammar.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PaEncTsEncState {
    Start,
    Envelope,
    TimestampTag,
    Timestamp,
    UsecTag,
    Usec,
}

/// The grammar of PA-ENC-TS-ENC values.
#[derive(Clone, Copy, Debug, Default)]
pub struct PaEncTsEncGrammar;

impl Grammar for PaEncTsEncGrammar {
    type State = PaEncTsEncState;
    type Tree = PaEncTsEncTree;

    fn name(&self) -> &'static str {
        "pa-enc-ts-enc"
    }

    fn initial_state(&self) -> PaEncTsEncState {
        PaEncTsEncState::Start
    }

    fn new_tree(&self) -> PaEncTsEncTree {
        PaEncTsEncTree::default()
    }

    fn transition(
        &self, state: PaEncTsEncState, ident: Ident
    ) -> Option<Transition<PaEncTsEncState, PaEncTsEncTree>> {
        use self::PaEncTsEncState::*;

        let res = match (state, ident) {
            (Start, SEQUENCE) => {
                Transition::new(Envelope).with(open_value)
            }
            (Envelope, PATIMESTAMP) => {
                Transition::new(TimestampTag).with(open_timestamp)
            }
            (TimestampTag, GENERALIZED_TIME) => {
                Transition::new(Timestamp).with(timestamp)
            }
            (Timestamp, PAUSEC) => {
                Transition::new(UsecTag).with(open_usec)
            }
            (UsecTag, INTEGER) => {
                Transition::new(Usec).with(usec)
            }
            _ => return None
        };
        Some(res)
    }

    fn is_final(&self, state: PaEncTsEncState) -> bool {
        matches!(state, PaEncTsEncState::Timestamp | PaEncTsEncState::Usec)
    }
}

type PaAssembly<'a> = Assembly<'a, PaEncTsEncTree>;

fn open_value(
    assembly: &mut PaAssembly, _tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.push_child(PaEncTsEncNode::Value)?;
    Ok(())
}

fn open_timestamp(
    assembly: &mut PaAssembly, _tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.push_child(PaEncTsEncNode::Timestamp)?;
    Ok(())
}

fn timestamp(
    assembly: &mut PaAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    let content = tuple.value().cloned().unwrap_or_default();
    let time = KerberosTime::from_content(&content)?;
    assembly.set_scalar(
        PaEncTsEncField::Timestamp, Scalar::Time(time.to_generalized_time())
    )
}

fn open_usec(
    assembly: &mut PaAssembly, _tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.push_child(PaEncTsEncNode::Usec)?;
    Ok(())
}

fn usec(
    assembly: &mut PaAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    let content = tuple.value().cloned().unwrap_or_default();
    let usec = decode_integer(&content)?;
    assembly.set_scalar(PaEncTsEncField::Usec, Scalar::Integer(usec))
}


//------------ PaEncTsEncTree ------------------------------------------------

/// The nodes of a PA-ENC-TS-ENC tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PaEncTsEncNode {
    /// The SEQUENCE.
    Value,

    /// The explicit tag around the timestamp.
    Timestamp,

    /// The explicit tag around the microseconds.
    Usec,
}

/// The fields of a PA-ENC-TS-ENC tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PaEncTsEncField {
    Timestamp,
    Usec,
}

/// The tree builder for PA-ENC-TS-ENC values.
#[derive(Clone, Debug, Default)]
pub struct PaEncTsEncTree {
    /// The currently open nodes, innermost last.
    open: Vec<Open>,

    /// The complete value.
    value: Option<PaEncTsEnc>,
}

#[derive(Clone, Copy, Debug)]
enum Open {
    Value {
        patimestamp: Option<KerberosTime>,
        pausec: Option<Microseconds>,
    },
    Timestamp(Option<KerberosTime>),
    Usec(Option<Microseconds>),
}

impl Assemble for PaEncTsEncTree {
    type Node = PaEncTsEncNode;
    type Field = PaEncTsEncField;
    type Output = PaEncTsEnc;

    fn push_child(
        &mut self, node: PaEncTsEncNode
    ) -> Result<(), ContentError> {
        let open = match (self.open.last(), node) {
            (None, PaEncTsEncNode::Value) if self.value.is_none() => {
                Open::Value { patimestamp: None, pausec: None }
            }
            (
                Some(Open::Value { patimestamp: None, .. }),
                PaEncTsEncNode::Timestamp
            ) => Open::Timestamp(None),
            (
                Some(Open::Value { patimestamp: Some(_), pausec: None }),
                PaEncTsEncNode::Usec
            ) => Open::Usec(None),
            _ => return Err(ContentError::invalid_value("misplaced value"))
        };
        self.open.push(open);
        Ok(())
    }

    fn set_scalar(
        &mut self, field: PaEncTsEncField, value: Scalar
    ) -> Result<(), ContentError> {
        match (self.open.last_mut(), field, value) {
            (
                Some(Open::Timestamp(slot @ None)),
                PaEncTsEncField::Timestamp, Scalar::Time(time)
            ) => {
                *slot = Some(KerberosTime::new(time)?);
                Ok(())
            }
            (
                Some(Open::Usec(slot @ None)),
                PaEncTsEncField::Usec, Scalar::Integer(usec)
            ) => {
                *slot = Some(Microseconds::new(usec)?);
                Ok(())
            }
            _ => Err(ContentError::invalid_value("misplaced value"))
        }
    }

    fn finish_node(&mut self, _end: usize) -> Result<(), ContentError> {
        let node = match self.open.pop() {
            Some(node) => node,
            None => return Err(ContentError::invalid_value("no open node"))
        };
        match (node, self.open.last_mut()) {
            (
                Open::Value { patimestamp: Some(patimestamp), pausec },
                None
            ) => {
                self.value = Some(PaEncTsEnc { patimestamp, pausec });
                Ok(())
            }
            (
                Open::Timestamp(Some(time)),
                Some(Open::Value { patimestamp, .. })
            ) => {
                *patimestamp = Some(time);
                Ok(())
            }
            (Open::Usec(Some(usec)), Some(Open::Value { pausec, .. })) => {
                *pausec = Some(usec);
                Ok(())
            }
            _ => Err(ContentError::invalid_value("incomplete PA-ENC-TS-ENC"))
        }
    }

    fn finish(self) -> Result<PaEncTsEnc, ContentError> {
        match self.value {
            Some(value) if self.open.is_empty() => Ok(value),
            _ => Err(ContentError::invalid_value("incomplete PA-ENC-TS-ENC"))
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use time::macros::datetime;
    use crate::decode::decode_message;
    use crate::error::ErrorKind;
    use super::*;

    const ENCODED: &[u8] =
        b"\x30\x1a\
          \xa0\x11\x18\x0f20240102030405Z\
          \xa1\x05\x02\x03\x01\xe2\x40";

    fn value() -> PaEncTsEnc {
        PaEncTsEnc {
            patimestamp: KerberosTime::new(
                GeneralizedTime::new(datetime!(2024-01-02 03:04:05)).unwrap()
            ).unwrap(),
            pausec: Some(Microseconds::new(123_456).unwrap()),
        }
    }

    #[test]
    fn encode() {
        assert_eq!(value().encode().to_vec(), ENCODED);
        let mut short = value();
        short.pausec = None;
        assert_eq!(
            short.encode().to_vec(),
            b"\x30\x13\xa0\x11\x18\x0f20240102030405Z"
        );
    }

    #[test]
    fn decode() {
        let (res, len) = decode_message(PaEncTsEncGrammar, ENCODED).unwrap();
        assert_eq!(len, ENCODED.len());
        assert_eq!(res, value());

        let err = decode_message(
            PaEncTsEncGrammar, &ENCODED[..20]
        ).unwrap_err();
        assert!(err.is_truncated());
        assert_eq!(err.pos().offset(), 20);
    }

    #[test]
    fn reject_fraction() {
        let data = b"\x30\x15\xa0\x13\x18\x1120240102030405.5Z";
        let err = decode_message(PaEncTsEncGrammar, data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValueEncoding);
        assert_eq!(err.pos().offset(), 4);
    }

    #[test]
    fn reject_usec_range() {
        let data =
            b"\x30\x1a\xa0\x11\x18\x0f20240102030405Z\
              \xa1\x05\x02\x03\x0f\x42\x40";
        let err = decode_message(PaEncTsEncGrammar, data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValueEncoding);
        assert_eq!(err.pos().offset(), 23);
        assert!(Microseconds::new(-1).is_err());
        assert!(Microseconds::new(999_999).is_ok());
    }

    #[test]
    fn reject_nested_usec() {
        // The pausec is inside the explicit tag of the timestamp.
        let data =
            b"\x30\x1a\xa0\x18\x18\x0f20240102030405Z\
              \xa1\x05\x02\x03\x01\xe2\x40";
        let err = decode_message(PaEncTsEncGrammar, data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValueEncoding);
    }
}
