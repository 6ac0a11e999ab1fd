//! LDAP message types and their encoding.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use crate::encode::{
    Constructed, PrimitiveContent, Target, Values, iter, sequence,
};
use crate::error::ContentError;
use crate::ident::Tag;
use crate::ostring::OctetString;


//------------ Tags ----------------------------------------------------------

/// The tag of an UnbindRequest.
pub const UNBIND_REQUEST: Tag = Tag::application(2);

/// The tag of a DelRequest.
pub const DEL_REQUEST: Tag = Tag::application(10);

/// The tag of a DelResponse.
pub const DEL_RESPONSE: Tag = Tag::application(11);

/// The tag of an AbandonRequest.
pub const ABANDON_REQUEST: Tag = Tag::application(16);

/// The tag of the referral in an LDAPResult.
pub const REFERRAL: Tag = Tag::ctx(3);

/// The tag of the controls of a message.
pub const CONTROLS: Tag = Tag::ctx(0);


//------------ MessageId -----------------------------------------------------

/// The identifier of an LDAP message.
///
/// Message IDs are between zero and `i32::MAX`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MessageId(i32);

impl MessageId {
    /// Creates a message ID, checking the range.
    pub fn new(id: i64) -> Result<Self, ContentError> {
        match i32::try_from(id) {
            Ok(id) if id >= 0 => Ok(MessageId(id)),
            _ => Err(ContentError::invalid_value("message ID out of range"))
        }
    }

    /// Returns the ID as an integer.
    pub fn into_i32(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for MessageId {
    type Error = ContentError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}


//------------ LdapMessage ---------------------------------------------------

/// An LDAP message.
///
/// ```text
/// LDAPMessage ::= SEQUENCE {
///      messageID       MessageID,
///      protocolOp      CHOICE { ... },
///      controls       [0] Controls OPTIONAL }
/// ```
///
/// Only the operations in [`ProtocolOp`] are supported. An empty list of
/// controls is encoded by leaving out the controls.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LdapMessage {
    /// The message ID.
    pub message_id: MessageId,

    /// The operation of the message.
    pub op: ProtocolOp,

    /// The controls attached to the message.
    pub controls: Vec<Control>,
}

impl LdapMessage {
    /// Creates a new message without controls.
    pub fn new(message_id: MessageId, op: ProtocolOp) -> Self {
        LdapMessage { message_id, op, controls: Vec::new() }
    }

    /// Adds a control to the message.
    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    /// Returns a value encoder for the message.
    pub fn encode(&self) -> impl Values + '_ {
        sequence((
            self.message_id.into_i32().encode(),
            &self.op,
            if self.controls.is_empty() {
                None
            }
            else {
                Some(Constructed::new(
                    CONTROLS, iter(self.controls.iter().map(Control::encode))
                ))
            }
        ))
    }
}


//------------ ProtocolOp ----------------------------------------------------

/// The operation of an LDAP message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProtocolOp {
    /// `UnbindRequest ::= [APPLICATION 2] NULL`
    UnbindRequest,

    /// `DelRequest ::= [APPLICATION 10] LDAPDN`
    DelRequest(DelRequest),

    /// `DelResponse ::= [APPLICATION 11] LDAPResult`
    DelResponse(LdapResult),

    /// `AbandonRequest ::= [APPLICATION 16] MessageID`
    AbandonRequest(MessageId),
}

impl Values for ProtocolOp {
    fn encoded_len(&self) -> usize {
        match *self {
            ProtocolOp::UnbindRequest => {
                ().encode_as(UNBIND_REQUEST).encoded_len()
            }
            ProtocolOp::DelRequest(ref req) => req.encode().encoded_len(),
            ProtocolOp::DelResponse(ref res) => {
                res.encode_as(DEL_RESPONSE).encoded_len()
            }
            ProtocolOp::AbandonRequest(id) => {
                id.into_i32().encode_as(ABANDON_REQUEST).encoded_len()
            }
        }
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        match *self {
            ProtocolOp::UnbindRequest => {
                ().encode_as(UNBIND_REQUEST).write_encoded(target)
            }
            ProtocolOp::DelRequest(ref req) => {
                req.encode().write_encoded(target)
            }
            ProtocolOp::DelResponse(ref res) => {
                res.encode_as(DEL_RESPONSE).write_encoded(target)
            }
            ProtocolOp::AbandonRequest(id) => {
                id.into_i32().encode_as(ABANDON_REQUEST).write_encoded(target)
            }
        }
    }
}


//------------ DelRequest ----------------------------------------------------

/// A request to delete an entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelRequest {
    /// The distinguished name of the entry to delete.
    pub entry: OctetString,
}

impl DelRequest {
    /// Creates a new delete request.
    pub fn new(entry: impl Into<OctetString>) -> Self {
        DelRequest { entry: entry.into() }
    }

    /// Returns a value encoder for the request.
    pub fn encode(&self) -> impl Values + '_ {
        self.entry.encode_ref_as(DEL_REQUEST)
    }
}


//------------ ResultCode ----------------------------------------------------

/// The result code of an LDAP operation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ResultCode(i32);

impl ResultCode {
    pub const SUCCESS: Self = ResultCode(0);
    pub const OPERATIONS_ERROR: Self = ResultCode(1);
    pub const PROTOCOL_ERROR: Self = ResultCode(2);
    pub const NO_SUCH_OBJECT: Self = ResultCode(32);
    pub const INSUFFICIENT_ACCESS_RIGHTS: Self = ResultCode(50);
    pub const UNWILLING_TO_PERFORM: Self = ResultCode(53);
    pub const NOT_ALLOWED_ON_NON_LEAF: Self = ResultCode(66);
    pub const OTHER: Self = ResultCode(80);

    /// Creates a result code, checking that it is not negative.
    pub fn new(code: i64) -> Result<Self, ContentError> {
        match i32::try_from(code) {
            Ok(code) if code >= 0 => Ok(ResultCode(code)),
            _ => Err(ContentError::invalid_value("result code out of range"))
        }
    }

    /// Returns the code as an integer.
    pub fn into_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResultCode::SUCCESS => f.write_str("success"),
            ResultCode::OPERATIONS_ERROR => f.write_str("operationsError"),
            ResultCode::PROTOCOL_ERROR => f.write_str("protocolError"),
            ResultCode::NO_SUCH_OBJECT => f.write_str("noSuchObject"),
            ResultCode::INSUFFICIENT_ACCESS_RIGHTS => {
                f.write_str("insufficientAccessRights")
            }
            ResultCode::UNWILLING_TO_PERFORM => {
                f.write_str("unwillingToPerform")
            }
            ResultCode::NOT_ALLOWED_ON_NON_LEAF => {
                f.write_str("notAllowedOnNonLeaf")
            }
            ResultCode::OTHER => f.write_str("other"),
            ResultCode(code) => write!(f, "resultCode {}", code),
        }
    }
}


//------------ LdapResult ----------------------------------------------------

/// The result of an LDAP operation.
///
/// ```text
/// LDAPResult ::= SEQUENCE {
///      resultCode         ENUMERATED,
///      matchedDN          LDAPDN,
///      diagnosticMessage  LDAPString,
///      referral           [3] Referral OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LdapResult {
    /// The result code.
    pub result_code: ResultCode,

    /// The matched distinguished name.
    pub matched_dn: OctetString,

    /// The diagnostic message.
    pub diagnostic_message: OctetString,

    /// The URIs to refer the client to.
    pub referral: Option<Referral>,
}

impl LdapResult {
    /// Creates a new result without matched DN, message, or referral.
    pub fn new(result_code: ResultCode) -> Self {
        LdapResult {
            result_code,
            matched_dn: OctetString::default(),
            diagnostic_message: OctetString::default(),
            referral: None,
        }
    }

    /// Returns a value encoder for the result with the given tag.
    ///
    /// The result is always used implicitly tagged by the response
    /// containing it.
    pub fn encode_as(&self, tag: Tag) -> impl Values + '_ {
        Constructed::new(tag, (
            self.result_code.into_i32().encode_as(Tag::ENUMERATED),
            self.matched_dn.encode_ref(),
            self.diagnostic_message.encode_ref(),
            self.referral.as_ref().map(Referral::encode),
        ))
    }
}


//------------ Referral ------------------------------------------------------

/// The URIs a client is referred to.
///
/// ```text
/// Referral ::= SEQUENCE SIZE (1..maxInt) OF uri URI
/// ```
///
/// A referral contains at least one URI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Referral(Vec<OctetString>);

impl Referral {
    /// Creates a referral from a non-empty list of URIs.
    pub fn new(uris: Vec<OctetString>) -> Result<Self, ContentError> {
        if uris.is_empty() {
            return Err(ContentError::invalid_value("empty referral"))
        }
        Ok(Referral(uris))
    }

    /// Returns the URIs.
    pub fn uris(&self) -> &[OctetString] {
        &self.0
    }

    /// Converts the referral into its URIs.
    pub fn into_uris(self) -> Vec<OctetString> {
        self.0
    }

    /// Returns a value encoder for the referral.
    pub fn encode(&self) -> impl Values + '_ {
        Constructed::new(
            REFERRAL, iter(self.0.iter().map(OctetString::encode_ref))
        )
    }
}

impl TryFrom<Vec<OctetString>> for Referral {
    type Error = ContentError;

    fn try_from(uris: Vec<OctetString>) -> Result<Self, Self::Error> {
        Referral::new(uris)
    }
}


//------------ Control -------------------------------------------------------

/// A control attached to an LDAP message.
///
/// ```text
/// Control ::= SEQUENCE {
///      controlType             LDAPOID,
///      criticality             BOOLEAN DEFAULT FALSE,
///      controlValue            OCTET STRING OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Control {
    /// The OID of the control in dotted notation.
    pub control_type: OctetString,

    /// Whether the control is critical.
    pub criticality: bool,

    /// The value of the control.
    pub control_value: Option<OctetString>,
}

impl Control {
    /// Creates a new non-critical control without a value.
    pub fn new(control_type: impl Into<OctetString>) -> Self {
        Control {
            control_type: control_type.into(),
            criticality: false,
            control_value: None,
        }
    }

    /// Returns a value encoder for the control.
    ///
    /// A criticality of false is the default and is left out.
    pub fn encode(&self) -> impl Values + '_ {
        sequence((
            self.control_type.encode_ref(),
            if self.criticality { Some(true.encode()) } else { None },
            self.control_value.as_ref().map(OctetString::encode_ref),
        ))
    }
}


//============ Tests =========================================================
