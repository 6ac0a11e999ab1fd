//! The grammar for decoding LDAP messages.
//!
//! This is a private module. Its public items are re-exported by the parent.

use bytes::Bytes;
use crate::boolean::{decode_boolean, decode_null};
use crate::decode::{Assemble, Assembly, Grammar, Scalar, Transition};
use crate::error::ContentError;
use crate::ident::{Ident, Tag};
use crate::int::decode_integer;
use crate::ostring::OctetString;
use crate::tlv::Tuple;
use super::message::{
    ABANDON_REQUEST, CONTROLS, Control, DEL_REQUEST, DEL_RESPONSE,
    DelRequest, LdapMessage, LdapResult, MessageId, ProtocolOp, REFERRAL,
    ResultCode, UNBIND_REQUEST,
};
use super::message;


//------------ Identifiers ---------------------------------------------------

const BOOLEAN: Ident = Tag::BOOLEAN.primitive();
const INTEGER: Ident = Tag::INTEGER.primitive();
const ENUMERATED: Ident = Tag::ENUMERATED.primitive();
const OCTET_STRING: Ident = Tag::OCTET_STRING.primitive();
const SEQUENCE: Ident = Ident::SEQUENCE;
const UNBIND: Ident = UNBIND_REQUEST.primitive();
const DELETE: Ident = DEL_REQUEST.primitive();
const DELETE_RESPONSE: Ident = DEL_RESPONSE.constructed();
const ABANDON: Ident = ABANDON_REQUEST.primitive();
const REFERRAL_URIS: Ident = REFERRAL.constructed();
const CONTROL_LIST: Ident = CONTROLS.constructed();


//------------ LdapState -----------------------------------------------------

/// The states of the LDAP message grammar.
///
/// Each state is named after the last value seen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LdapState {
    Start,
    Envelope,
    Id,
    Unbind,
    Delete,
    Abandon,
    DeleteResponse,
    Code,
    MatchedDn,
    DiagnosticMessage,
    Referral,
    ReferralUri,
    Controls,
    ControlSequence,
    ControlType,
    Criticality,
    ControlValue,
}


//------------ LdapGrammar ---------------------------------------------------

/// The grammar of LDAP messages.
///
/// The grammar accepts messages containing any of the operations in
/// [`ProtocolOp`], optionally followed by controls.
#[derive(Clone, Copy, Debug, Default)]
pub struct LdapGrammar;

impl Grammar for LdapGrammar {
    type State = LdapState;
    type Tree = LdapTree;

    fn name(&self) -> &'static str {
        "ldap"
    }

    fn initial_state(&self) -> LdapState {
        LdapState::Start
    }

    fn new_tree(&self) -> LdapTree {
        LdapTree::default()
    }

    fn transition(
        &self, state: LdapState, ident: Ident
    ) -> Option<Transition<LdapState, LdapTree>> {
        use self::LdapState::*;

        let res = match (state, ident) {
            (Start, SEQUENCE) => {
                Transition::new(Envelope).with(open_message)
            }
            (Envelope, INTEGER) => {
                Transition::new(Id).with(message_id)
            }
            (Id, UNBIND) => {
                Transition::new(Unbind).with(unbind_request)
            }
            (Id, DELETE) => {
                Transition::new(Delete).with(del_request)
            }
            (Id, ABANDON) => {
                Transition::new(Abandon).with(abandon_request)
            }
            (Id, DELETE_RESPONSE) => {
                Transition::new(DeleteResponse).with(open_del_response)
            }
            (DeleteResponse, ENUMERATED) => {
                Transition::new(Code).with(result_code)
            }
            (Code, OCTET_STRING) => {
                Transition::new(MatchedDn).with(matched_dn)
            }
            (MatchedDn, OCTET_STRING) => {
                Transition::new(DiagnosticMessage).with(diagnostic_message)
            }
            (DiagnosticMessage, REFERRAL_URIS) => {
                Transition::new(Referral).with(open_referral)
            }
            (Referral | ReferralUri, OCTET_STRING) => {
                Transition::new(ReferralUri).with(referral_uri)
            }
            (
                Unbind | Delete | Abandon
                    | DiagnosticMessage | ReferralUri,
                CONTROL_LIST
            ) => {
                Transition::new(Controls).with(open_controls)
            }
            (
                Controls | ControlType | Criticality | ControlValue,
                SEQUENCE
            ) => {
                Transition::new(ControlSequence).with(open_control)
            }
            (ControlSequence, OCTET_STRING) => {
                Transition::new(ControlType).with(control_type)
            }
            (ControlType, BOOLEAN) => {
                Transition::new(Criticality).with(criticality)
            }
            (ControlType | Criticality, OCTET_STRING) => {
                Transition::new(ControlValue).with(control_value)
            }
            _ => return None
        };
        Some(res)
    }

    fn is_final(&self, state: LdapState) -> bool {
        matches!(
            state,
            LdapState::Unbind | LdapState::Delete
            | LdapState::Abandon | LdapState::DiagnosticMessage
            | LdapState::ReferralUri | LdapState::Controls
            | LdapState::ControlType | LdapState::Criticality
            | LdapState::ControlValue
        )
    }
}


//------------ Actions -------------------------------------------------------

type LdapAssembly<'a> = Assembly<'a, LdapTree>;

/// Returns the content octets of a primitive tuple.
fn octets(tuple: &Tuple) -> Bytes {
    tuple.value().cloned().unwrap_or_default()
}

fn open_message(
    assembly: &mut LdapAssembly, _tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.push_child(LdapNode::Message)?;
    Ok(())
}

fn message_id(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    let id = decode_integer(&octets(tuple))?;
    assembly.set_scalar(LdapField::MessageId, Scalar::Integer(id))
}

fn unbind_request(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    decode_null(&octets(tuple))?;
    let node = assembly.push_child(LdapNode::UnbindRequest)?;
    assembly.set_node_scalar(node, LdapField::Unbind, Scalar::Null)
}

fn del_request(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    let node = assembly.push_child(LdapNode::DelRequest)?;
    assembly.set_node_scalar(
        node, LdapField::Entry, Scalar::Octets(octets(tuple))
    )
}

fn abandon_request(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    let id = decode_integer(&octets(tuple))?;
    let node = assembly.push_child(LdapNode::AbandonRequest)?;
    assembly.set_node_scalar(node, LdapField::AbandonId, Scalar::Integer(id))
}

fn open_del_response(
    assembly: &mut LdapAssembly, _tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.push_child(LdapNode::DelResponse)?;
    Ok(())
}

fn result_code(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    let code = decode_integer(&octets(tuple))?;
    assembly.set_scalar(LdapField::ResultCode, Scalar::Integer(code))
}

fn matched_dn(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.set_scalar(LdapField::MatchedDn, Scalar::Octets(octets(tuple)))
}

fn diagnostic_message(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.set_scalar(
        LdapField::DiagnosticMessage, Scalar::Octets(octets(tuple))
    )
}

fn open_referral(
    assembly: &mut LdapAssembly, _tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.push_child(LdapNode::Referral)?;
    Ok(())
}

fn referral_uri(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.set_scalar(LdapField::ReferralUri, Scalar::Octets(octets(tuple)))
}

fn open_controls(
    assembly: &mut LdapAssembly, _tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.push_child(LdapNode::Controls)?;
    Ok(())
}

fn open_control(
    assembly: &mut LdapAssembly, _tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.push_child(LdapNode::Control)?;
    Ok(())
}

fn control_type(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.set_scalar(LdapField::ControlType, Scalar::Octets(octets(tuple)))
}

fn criticality(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    let value = decode_boolean(&octets(tuple), assembly.mode())?;
    assembly.set_scalar(LdapField::Criticality, Scalar::Boolean(value))
}

fn control_value(
    assembly: &mut LdapAssembly, tuple: &Tuple
) -> Result<(), ContentError> {
    assembly.set_scalar(
        LdapField::ControlValue, Scalar::Octets(octets(tuple))
    )
}


//------------ LdapNode and LdapField ----------------------------------------

/// The nodes of an LDAP message tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LdapNode {
    Message,
    UnbindRequest,
    DelRequest,
    AbandonRequest,
    DelResponse,
    Referral,
    Controls,
    Control,
}

/// The fields of the nodes of an LDAP message tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LdapField {
    MessageId,
    Unbind,
    Entry,
    AbandonId,
    ResultCode,
    MatchedDn,
    DiagnosticMessage,
    ReferralUri,
    ControlType,
    Criticality,
    ControlValue,
}


//------------ LdapTree ------------------------------------------------------

/// The tree builder for LDAP messages.
#[derive(Clone, Debug, Default)]
pub struct LdapTree {
    /// The currently open nodes, innermost last.
    open: Vec<Open>,

    /// The complete message.
    message: Option<LdapMessage>,
}

/// An open node and what has been collected for it so far.
#[derive(Clone, Debug)]
enum Open {
    Message {
        id: Option<MessageId>,
        op: Option<ProtocolOp>,
        controls: Option<Vec<Control>>,
    },
    UnbindRequest,
    DelRequest(Option<OctetString>),
    AbandonRequest(Option<MessageId>),
    DelResponse {
        result_code: Option<ResultCode>,
        matched_dn: Option<OctetString>,
        diagnostic_message: Option<OctetString>,
        referral: Option<message::Referral>,
    },
    Referral(Vec<OctetString>),
    Controls(Vec<Control>),
    Control {
        control_type: Option<OctetString>,
        criticality: Option<bool>,
        control_value: Option<OctetString>,
    },
}

impl Open {
    fn new(node: LdapNode) -> Self {
        match node {
            LdapNode::Message => Open::Message {
                id: None, op: None, controls: None
            },
            LdapNode::UnbindRequest => Open::UnbindRequest,
            LdapNode::DelRequest => Open::DelRequest(None),
            LdapNode::AbandonRequest => Open::AbandonRequest(None),
            LdapNode::DelResponse => Open::DelResponse {
                result_code: None,
                matched_dn: None,
                diagnostic_message: None,
                referral: None,
            },
            LdapNode::Referral => Open::Referral(Vec::new()),
            LdapNode::Controls => Open::Controls(Vec::new()),
            LdapNode::Control => Open::Control {
                control_type: None,
                criticality: None,
                control_value: None,
            },
        }
    }
}

/// Stores a field value, failing if it has been set before.
fn store<T>(slot: &mut Option<T>, value: T) -> Result<(), ContentError> {
    if slot.is_some() {
        return Err(ContentError::invalid_value("duplicate field"))
    }
    *slot = Some(value);
    Ok(())
}

/// Takes a required field value.
fn required<T>(
    slot: Option<T>, msg: &'static str
) -> Result<T, ContentError> {
    slot.ok_or_else(|| ContentError::invalid_value(msg))
}

impl LdapTree {
    /// Attaches a finished operation to the enclosing message.
    fn attach_op(&mut self, value: ProtocolOp) -> Result<(), ContentError> {
        match self.open.last_mut() {
            Some(Open::Message { op, .. }) => store(op, value),
            _ => Err(ContentError::invalid_value("operation outside message"))
        }
    }
}

impl Assemble for LdapTree {
    type Node = LdapNode;
    type Field = LdapField;
    type Output = LdapMessage;

    fn push_child(&mut self, node: LdapNode) -> Result<(), ContentError> {
        let allowed = match (self.open.last(), node) {
            (None, LdapNode::Message) => self.message.is_none(),
            (
                Some(Open::Message { id: Some(_), op: None, .. }),
                LdapNode::UnbindRequest | LdapNode::DelRequest
                | LdapNode::AbandonRequest | LdapNode::DelResponse
            ) => true,
            (
                Some(Open::DelResponse { referral: None, .. }),
                LdapNode::Referral
            ) => true,
            (
                Some(Open::Message { op: Some(_), controls: None, .. }),
                LdapNode::Controls
            ) => true,
            (Some(Open::Controls(_)), LdapNode::Control) => true,
            _ => false
        };
        if !allowed {
            return Err(ContentError::invalid_value("misplaced value"))
        }
        self.open.push(Open::new(node));
        Ok(())
    }

    fn set_scalar(
        &mut self, field: LdapField, value: Scalar
    ) -> Result<(), ContentError> {
        match (self.open.last_mut(), field, value) {
            (
                Some(Open::Message { id, .. }),
                LdapField::MessageId, Scalar::Integer(value)
            ) => store(id, MessageId::new(value)?),
            (
                Some(Open::UnbindRequest), LdapField::Unbind, Scalar::Null
            ) => Ok(()),
            (
                Some(Open::DelRequest(entry)),
                LdapField::Entry, Scalar::Octets(value)
            ) => store(entry, value.into()),
            (
                Some(Open::AbandonRequest(id)),
                LdapField::AbandonId, Scalar::Integer(value)
            ) => store(id, MessageId::new(value)?),
            (
                Some(Open::DelResponse { result_code, .. }),
                LdapField::ResultCode, Scalar::Integer(value)
            ) => store(result_code, ResultCode::new(value)?),
            (
                Some(Open::DelResponse { matched_dn, .. }),
                LdapField::MatchedDn, Scalar::Octets(value)
            ) => store(matched_dn, value.into()),
            (
                Some(Open::DelResponse { diagnostic_message, .. }),
                LdapField::DiagnosticMessage, Scalar::Octets(value)
            ) => store(diagnostic_message, value.into()),
            (
                Some(Open::Referral(uris)),
                LdapField::ReferralUri, Scalar::Octets(value)
            ) => {
                uris.push(value.into());
                Ok(())
            }
            (
                Some(Open::Control { control_type, .. }),
                LdapField::ControlType, Scalar::Octets(value)
            ) => store(control_type, value.into()),
            (
                Some(Open::Control { criticality, .. }),
                LdapField::Criticality, Scalar::Boolean(value)
            ) => store(criticality, value),
            (
                Some(Open::Control { control_value, .. }),
                LdapField::ControlValue, Scalar::Octets(value)
            ) => store(control_value, value.into()),
            _ => Err(ContentError::invalid_value("misplaced value"))
        }
    }

    fn finish_node(&mut self, _end: usize) -> Result<(), ContentError> {
        let node = match self.open.pop() {
            Some(node) => node,
            None => return Err(ContentError::invalid_value("no open node"))
        };
        match node {
            Open::Message { id, op, controls } => {
                store(&mut self.message, LdapMessage {
                    message_id: required(id, "missing message ID")?,
                    op: required(op, "missing operation")?,
                    controls: controls.unwrap_or_default(),
                })
            }
            Open::UnbindRequest => self.attach_op(ProtocolOp::UnbindRequest),
            Open::DelRequest(entry) => {
                let entry = required(entry, "missing entry")?;
                self.attach_op(ProtocolOp::DelRequest(DelRequest { entry }))
            }
            Open::AbandonRequest(id) => {
                let id = required(id, "missing message ID")?;
                self.attach_op(ProtocolOp::AbandonRequest(id))
            }
            Open::DelResponse {
                result_code, matched_dn, diagnostic_message, referral
            } => {
                let result = LdapResult {
                    result_code: required(
                        result_code, "missing result code"
                    )?,
                    matched_dn: required(matched_dn, "missing matched DN")?,
                    diagnostic_message: required(
                        diagnostic_message, "missing diagnostic message"
                    )?,
                    referral,
                };
                self.attach_op(ProtocolOp::DelResponse(result))
            }
            Open::Referral(uris) => {
                let uris = message::Referral::new(uris)?;
                match self.open.last_mut() {
                    Some(Open::DelResponse { referral, .. }) => {
                        store(referral, uris)
                    }
                    _ => {
                        Err(ContentError::invalid_value("misplaced referral"))
                    }
                }
            }
            Open::Controls(list) => match self.open.last_mut() {
                Some(Open::Message { controls, .. }) => store(controls, list),
                _ => Err(ContentError::invalid_value("misplaced controls"))
            },
            Open::Control { control_type, criticality, control_value } => {
                let control = Control {
                    control_type: required(
                        control_type, "missing control type"
                    )?,
                    criticality: criticality.unwrap_or(false),
                    control_value,
                };
                match self.open.last_mut() {
                    Some(Open::Controls(list)) => {
                        list.push(control);
                        Ok(())
                    }
                    _ => Err(ContentError::invalid_value("misplaced control"))
                }
            }
        }
    }

    fn finish(self) -> Result<LdapMessage, ContentError> {
        match self.message {
            Some(message) if self.open.is_empty() => Ok(message),
            _ => Err(ContentError::invalid_value("incomplete message"))
        }
    }
}


//============ Tests =========================================================
