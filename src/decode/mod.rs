//! Decoding data in BER.
//!
//! Decoding is driven by a [`Grammar`], a state machine over the values of
//! a message. A [`Container`] is created for each message. It is fed the
//! octets of the message in chunks as they arrive via [`decode`] or its
//! own `decode` method. The container splits the octets into values and
//! presents them to the grammar. For every value, the grammar picks a
//! [`Transition`] whose [`Action`]s build the message through the narrow
//! [`Assembly`] handle to the grammar’s [`Assemble`] tree builder.
//!
//! Decoding can stop whenever a chunk ends and resumes once the next chunk
//! is fed into the same container. Values with indefinite length are
//! accepted in BER mode. How strict the decoder is and what limits it
//! applies is determined by the [`DecoderConfig`].
//!
//! If the complete message is available already, [`decode_message`] does
//! everything in one go. [`decode_tuple`] decodes any value into a generic
//! tree of [`Tuple`]s.
//!
//! [`Tuple`]: ../tlv/struct.Tuple.html

pub use self::assemble::{Assemble, Assembly, NodeHandle, Scalar};
pub use self::config::DecoderConfig;
pub use self::container::Container;
pub use self::generic::{TupleField, TupleGrammar, TupleNode, TupleTree};
pub use self::grammar::{Action, Grammar, Transition};

use crate::error::CodecError;
use crate::tlv::Tuple;

mod assemble;
mod config;
mod container;
mod generic;
mod grammar;
mod test;


//------------ Functions -----------------------------------------------------

/// Feeds a chunk of octets into a container.
///
/// This is the same as `container.decode(bytes)`. Returns the number of
/// octets that belonged to the message once it is complete, or a
/// truncated input error if more data is needed.
pub fn decode<G: Grammar>(
    bytes: &[u8], container: &mut Container<G>
) -> Result<usize, CodecError> {
    container.decode(bytes)
}

/// Decodes a complete message using the default configuration.
///
/// Returns the message and the number of octets it occupied at the start
/// of `bytes`.
pub fn decode_message<G: Grammar>(
    grammar: G, bytes: &[u8]
) -> Result<(<G::Tree as Assemble>::Output, usize), CodecError> {
    decode_message_with_config(grammar, DecoderConfig::default(), bytes)
}

/// Decodes a complete message using the given configuration.
pub fn decode_message_with_config<G: Grammar>(
    grammar: G, config: DecoderConfig, bytes: &[u8]
) -> Result<(<G::Tree as Assemble>::Output, usize), CodecError> {
    let mut container = Container::with_config(grammar, config);
    let len = container.decode(bytes)?;
    Ok((container.into_message()?, len))
}

/// Decodes a single value of any kind into a tuple tree.
///
/// Fails if `bytes` doesn’t start with a complete value. Any octets after
/// the value are ignored.
pub fn decode_tuple(bytes: &[u8]) -> Result<Tuple, CodecError> {
    decode_message(TupleGrammar, bytes).map(|(tuple, _)| tuple)
}
