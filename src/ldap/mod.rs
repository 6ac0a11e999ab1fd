//! LDAP messages.
//!
//! This module provides a subset of the LDAP message types defined in
//! [RFC 4511] together with the [`LdapGrammar`] for decoding them with a
//! [`Container`]. Encoding happens via the `encode` method of
//! [`LdapMessage`].
//!
//! ```
//! use berstream::decode::decode_message;
//! use berstream::ldap::{LdapGrammar, ProtocolOp};
//!
//! let data = b"\x30\x05\x02\x01\x01\x42\x00";
//! let (msg, len) = decode_message(LdapGrammar, data).unwrap();
//! assert_eq!(len, data.len());
//! assert_eq!(msg.message_id.into_i32(), 1);
//! assert_eq!(msg.op, ProtocolOp::UnbindRequest);
//! ```
//!
//! [RFC 4511]: https://tools.ietf.org/html/rfc4511
//! [`Container`]: ../decode/struct.Container.html

pub use self::grammar::{
    LdapField, LdapGrammar, LdapNode, LdapState, LdapTree,
};
pub use self::message::{
    ABANDON_REQUEST, CONTROLS, Control, DEL_REQUEST, DEL_RESPONSE,
    DelRequest, LdapMessage, LdapResult, MessageId, ProtocolOp, REFERRAL,
    Referral, ResultCode, UNBIND_REQUEST,
};

mod grammar;
mod message;
