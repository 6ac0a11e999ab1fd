//! Kerberos pre-authentication data.
//!
//! Currently, this only contains the encrypted timestamp defined in
//! [RFC 4120] and the [`PaEncTsEncGrammar`] for decoding it.
//!
//! [RFC 4120]: https://tools.ietf.org/html/rfc4120

pub use self::padata::{
    KerberosTime, Microseconds, PaEncTsEnc, PaEncTsEncField,
    PaEncTsEncGrammar, PaEncTsEncNode, PaEncTsEncState, PaEncTsEncTree,
};

mod padata;
