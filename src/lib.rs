//! Streaming, grammar-driven handling of data in BER and DER.
//!
//! This crate decodes and encodes data in the _Basic Encoding Rules_ (BER)
//! and their stricter sibling, the _Distinguished Encoding Rules_ (DER),
//! both defined in [ITU-T X.690]. It was written for protocols such as
//! LDAP and Kerberos where messages arrive over the network in chunks of
//! arbitrary size.
//!
//! # Decoding
//!
//! Decoding is done by the [`decode`] module. A message type is described
//! by a [grammar], a state machine whose transitions are selected by the
//! identifier octets of each value and whose actions build the message
//! through a narrow handle to a tree builder. A [container] holds all
//! state of decoding one message. It can be fed the message in any number
//! of chunks and produces the same result regardless of how the message
//! was split. BER values with indefinite length are accepted if the
//! container is configured for BER, which is the default.
//!
//! # Encoding
//!
//! Encoding always produces DER. It is done by the [`encode`] module
//! through encoder types implementing [`Values`]. The length of the
//! encoded message is computed first, so the octets can be written into a
//! buffer of exactly the right size.
//!
//! # Content types
//!
//! The primitive types needed by the supported messages have their own
//! modules: [`int`] for INTEGER and ENUMERATED, [`boolean`] for BOOLEAN and
//! NULL, [`ostring`] for OCTET STRING, [`string`] for the restricted
//! character string types, and [`gentime`] for GeneralizedTime. The
//! [`tlv`] module provides the identifier and length octets and the
//! [`Tuple`], a generic decoded value.
//!
//! # Messages
//!
//! The [`ldap`] module contains a set of LDAP messages and the [`kerberos`]
//! module the encrypted timestamp pre-authentication data of Kerberos.
//! Both serve as examples for implementing grammars for other message
//! types.
//!
//! [ITU-T X.690]: https://www.itu.int/rec/T-REC-X.690/
//! [grammar]: decode/trait.Grammar.html
//! [container]: decode/struct.Container.html
//! [`Values`]: encode/trait.Values.html
//! [`Tuple`]: tlv/struct.Tuple.html

pub use self::error::{CodecError, ContentError, ErrorKind, Mismatch, Pos};
pub use self::ident::{Class, Ident, Tag};
pub use self::length::Length;
pub use self::mode::Mode;
pub use self::ostring::OctetString;
pub use self::gentime::GeneralizedTime;
pub use self::tlv::Tuple;

pub mod decode;
pub mod encode;
pub mod error;

pub mod boolean;
pub mod gentime;
pub mod int;
pub mod mode;
pub mod ostring;
pub mod string;
pub mod tlv;

mod ident;
mod length;

pub mod kerberos;
pub mod ldap;
