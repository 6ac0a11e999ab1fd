//! Tests for decoding complete messages.
#![cfg(test)]

use bytes::Bytes;
use crate::encode::{self, PrimitiveContent, Values};
use crate::error::{CodecError, ErrorKind, Mismatch};
use crate::gentime::{GeneralizedTime, decode_generalized_time};
use crate::ident::Tag;
use crate::kerberos::{PaEncTsEnc, PaEncTsEncGrammar};
use crate::ldap::{
    Control, DelRequest, LdapGrammar, LdapMessage, LdapResult, MessageId,
    ProtocolOp, Referral, ResultCode,
};
use crate::mode::Mode;
use crate::tlv::Tuple;
use super::*;


//------------ Helpers -------------------------------------------------------

fn message_id(id: i64) -> MessageId {
    MessageId::new(id).unwrap()
}

/// A message using every part of the LDAP grammar.
fn del_response() -> LdapMessage {
    LdapMessage::new(
        message_id(0x1234),
        ProtocolOp::DelResponse(LdapResult {
            result_code: ResultCode::NOT_ALLOWED_ON_NON_LEAF,
            matched_dn: "ou=people,dc=example,dc=com".into(),
            diagnostic_message: "entry has children".into(),
            referral: Some(Referral::new(vec![
                "ldap://a.example.com/".into(),
                "ldap://b.example.com/".into(),
            ]).unwrap()),
        })
    ).with_control(Control {
        control_type: "1.2.840.113556.1.4.805".into(),
        criticality: true,
        control_value: None,
    }).with_control(Control {
        control_type: "1.3.6.1.4.1.4203.1.10.1".into(),
        criticality: false,
        control_value: Some(b"\x04\x03abc".to_vec().into()),
    })
}

/// Decodes an LDAP message, feeding it to the container in two chunks.
fn decode_split(
    data: &[u8], split: usize
) -> Result<LdapMessage, CodecError> {
    let mut container = Container::new(LdapGrammar);
    if split > 0 {
        let err = container.decode(&data[..split]).unwrap_err();
        assert!(err.is_truncated(), "split {}: {}", split, err);
        assert_eq!(container.position().offset(), split);
    }
    let len = container.decode(&data[split..])?;
    assert_eq!(split + len, data.len());
    container.into_message()
}


//------------ Scenarios -----------------------------------------------------

#[test]
fn del_request_encoding() {
    let req = DelRequest::new("ou=system");
    let mut buf = [0u8; 32];
    let len = encode::encode(&req.encode(), &mut buf).unwrap();
    assert_eq!(len, 11);
    assert_eq!(&buf[..2], b"\x4a\x09");
    assert_eq!(&buf[2..len], b"ou=system");
}

#[test]
fn unbind_request() {
    let data = b"\x30\x05\x02\x01\x01\x42\x00";
    let (msg, len) = decode_message(LdapGrammar, data).unwrap();
    assert_eq!(len, 7);
    assert_eq!(msg.message_id, message_id(1));
    assert_eq!(msg.op, ProtocolOp::UnbindRequest);
    assert!(msg.controls.is_empty());
}

#[test]
fn unbind_request_with_content() {
    let data = b"\x30\x07\x02\x01\x01\x42\x02\x04\x00";
    let err = decode_message(LdapGrammar, data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 5);
    assert_eq!(
        err.mismatch(), Some(Mismatch::Length { expected: 0, found: 2 })
    );
}

#[test]
fn generalized_time_value() {
    let data = b"\x18\x0f20240115120000Z";
    let tuple = decode_tuple(data).unwrap();
    let time = decode_generalized_time(tuple.value().unwrap()).unwrap();
    assert_eq!(time.encode().to_vec(), data);
    assert_eq!(time.to_string(), "20240115120000Z");

    let err = decode_generalized_time(b"2024-01-15").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValueEncoding);
}

#[test]
fn sequence_of_integers_length() {
    let value = encode::sequence((1u8.encode(), 2u8.encode(), 3u8.encode()));
    assert_eq!(encode::compute_length(&value), 11);
    assert_eq!(
        value.to_vec(), b"\x30\x09\x02\x01\x01\x02\x01\x02\x02\x01\x03"
    );
}


//------------ Round trips ---------------------------------------------------

#[test]
fn ldap_round_trips() {
    let messages = [
        LdapMessage::new(message_id(1), ProtocolOp::UnbindRequest),
        LdapMessage::new(
            message_id(i64::from(i32::MAX)),
            ProtocolOp::DelRequest(DelRequest::new("cn=x,ou=system"))
        ),
        LdapMessage::new(
            message_id(7), ProtocolOp::AbandonRequest(message_id(6))
        ),
        LdapMessage::new(
            message_id(2),
            ProtocolOp::DelResponse(LdapResult::new(ResultCode::SUCCESS))
        ),
        del_response(),
    ];
    for msg in &messages {
        let encoded = msg.encode().to_vec();
        assert_eq!(encoded.len(), encode::compute_length(&msg.encode()));
        let (decoded, len) = decode_message(LdapGrammar, &encoded).unwrap();
        assert_eq!(len, encoded.len());
        assert_eq!(&decoded, msg);
    }
}

#[test]
fn kerberos_round_trip() {
    let value = PaEncTsEnc::now();
    let encoded = value.encode().to_vec();
    let (decoded, _) = decode_message(PaEncTsEncGrammar, &encoded).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn tuple_round_trip() {
    let encoded = del_response().encode().to_vec();
    let tuple = decode_tuple(&encoded).unwrap();
    assert_eq!(tuple.tag(), Tag::SEQUENCE);
    assert_eq!(tuple.children().len(), 3);
    assert_eq!(tuple.end(), Some(encoded.len()));
    assert_eq!(tuple.to_vec(), encoded);
}

#[test]
fn built_tuple_round_trip() {
    let tuple = Tuple::constructed(Tag::SEQUENCE, vec![
        Tuple::primitive(Tag::INTEGER, Bytes::from_static(b"\x07")),
        Tuple::constructed(Tag::application(11), vec![
            Tuple::primitive(Tag::ENUMERATED, Bytes::from_static(b"\x00")),
            Tuple::primitive(Tag::OCTET_STRING, Bytes::new()),
        ]),
        Tuple::constructed(Tag::ctx(0), Vec::new()),
    ]);
    let decoded = decode_tuple(&tuple.to_vec()).unwrap();
    assert_eq!(decoded, tuple);
    assert_eq!(decoded.children()[1].children()[1].start(), 10);
}


//------------ Chunking ------------------------------------------------------

#[test]
fn every_split_point() {
    let msg = del_response();
    let encoded = msg.encode().to_vec();
    for split in 0..encoded.len() {
        assert_eq!(decode_split(&encoded, split).unwrap(), msg);
    }
}

#[test]
fn byte_by_byte() {
    let msg = del_response();
    let encoded = msg.encode().to_vec();
    let (last, head) = encoded.split_last().unwrap();
    let mut container = Container::new(LdapGrammar);
    for (pos, octet) in head.iter().enumerate() {
        let err = decode(&[*octet], &mut container).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert_eq!(err.pos().offset(), pos + 1);
        assert!(!container.is_complete());
    }
    assert_eq!(decode(&[*last], &mut container), Ok(1));
    assert!(container.is_complete());
    assert_eq!(container.into_message().unwrap(), msg);
}

#[test]
fn trailing_octets() {
    let mut data = b"\x30\x05\x02\x01\x01\x42\x00".to_vec();
    data.extend_from_slice(b"\x30\x05");
    let mut container = Container::new(LdapGrammar);
    assert_eq!(container.decode(&data), Ok(7));
    assert_eq!(container.decode(b"\x02\x01"), Ok(0));
    assert_eq!(container.position().offset(), 7);
}

#[test]
fn incomplete_message() {
    let container = Container::new(LdapGrammar);
    assert!(container.into_message().unwrap_err().is_truncated());

    let mut container = Container::new(LdapGrammar);
    assert!(container.decode(b"\x30\x05\x02").unwrap_err().is_truncated());
    assert!(container.into_message().unwrap_err().is_truncated());
}


//------------ Indefinite length ---------------------------------------------

#[test]
fn indefinite_message() {
    let data = b"\x30\x80\x02\x01\x01\x42\x00\x00\x00";
    let (msg, len) = decode_message(LdapGrammar, data).unwrap();
    assert_eq!(len, 9);
    assert_eq!(msg.op, ProtocolOp::UnbindRequest);

    let der = DecoderConfig::default().with_mode(Mode::Der);
    let err = decode_message_with_config(LdapGrammar, der, data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 0);
}

#[test]
fn nested_indefinite_tuples() {
    let data = b"\x30\x80\x04\x01a\x30\x80\x02\x01\x05\x00\x00\x00\x00";
    let mut container = Container::new(TupleGrammar);
    for range in [0..3, 3..8, 8..11] {
        assert!(container.decode(&data[range]).unwrap_err().is_truncated());
    }
    let len = container.decode(&data[11..]).unwrap();
    assert_eq!(len, 3);
    let tuple = container.into_message().unwrap();
    assert!(tuple.length().is_indefinite());
    assert_eq!(tuple.end(), Some(14));
    assert_eq!(tuple.children()[1].end(), Some(12));
    let inner = &tuple.children()[1].children()[0];
    assert_eq!(&inner.value().unwrap()[..], b"\x05");
    assert_eq!(inner.end(), Some(10));
    assert_eq!(
        tuple.to_vec(), b"\x30\x08\x04\x01a\x30\x03\x02\x01\x05"
    );
}

#[test]
fn end_of_contents_errors() {
    // With content.
    let err = decode_tuple(b"\x30\x80\x02\x01\x01\x00\x01\x00").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 5);

    // Inside a definite length value.
    let err = decode_tuple(b"\x30\x02\x00\x00").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedTag);
    assert_eq!(err.pos().offset(), 2);

    // At the top level.
    let err = decode_tuple(b"\x00\x00").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedTag);
    assert_eq!(err.pos().offset(), 0);
}

#[test]
fn indefinite_primitive() {
    let err = decode_tuple(b"\x04\x80abc\x00\x00").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 0);
}


//------------ Limits and structure ------------------------------------------

#[test]
fn value_exceeds_enclosing_value() {
    let err = decode_tuple(b"\x30\x03\x04\x05abc").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 2);
}

#[test]
fn unfinished_value_at_end_of_enclosing_value() {
    // Only the identifier octet of the child fits.
    let err = decode_tuple(b"\x30\x01\x05").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 2);
    assert_eq!(
        err.mismatch(), Some(Mismatch::Length { expected: 1, found: 2 })
    );

    // An indefinite length child without room for its end-of-contents.
    let err = decode_tuple(b"\x30\x02\x30\x80").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 2);

    // The same, inside an indefinite length value and fed byte by byte.
    let data = b"\x30\x80\x30\x04\x02\x01\x01\x9f\x00\x00";
    let mut container = Container::new(TupleGrammar);
    for octet in &data[..7] {
        assert!(container.decode(&[*octet]).unwrap_err().is_truncated());
    }
    let err = container.decode(&data[7..8]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 7);
    assert_eq!(container.decode(&data[8..]), Err(err));
}

#[test]
fn max_depth() {
    let data = b"\x30\x06\x30\x04\x30\x02\x05\x00";
    assert!(decode_tuple(data).is_ok());

    let config = DecoderConfig::default().with_max_depth(2);
    let err = decode_message_with_config(
        TupleGrammar, config, data
    ).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 4);
}

#[test]
fn max_pdu_size() {
    let data = b"\x30\x05\x02\x01\x01\x42\x00";
    let config = DecoderConfig::default().with_max_pdu_size(Some(7));
    assert!(decode_message_with_config(LdapGrammar, config, data).is_ok());

    let config = DecoderConfig::default().with_max_pdu_size(Some(5));
    let err = decode_message_with_config(
        LdapGrammar, config, data
    ).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLength);
    assert_eq!(err.pos().offset(), 0);
    assert_eq!(
        err.mismatch(), Some(Mismatch::Length { expected: 5, found: 7 })
    );
}

#[test]
fn premature_end() {
    let data = b"\x30\x03\x02\x01\x01";
    let err = decode_message(LdapGrammar, data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PrematureEnd);
    assert_eq!(err.pos().offset(), 5);
}

#[test]
fn unexpected_tag() {
    let data = b"\x30\x05\x02\x01\x01\x43\x00";
    let err = decode_message(LdapGrammar, data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedTag);
    assert_eq!(err.pos().offset(), 5);
    assert_eq!(
        err.mismatch(),
        Some(Mismatch::Tag { found: Tag::application(3).primitive() })
    );
}

#[test]
fn misplaced_controls() {
    // The controls are inside the DelResponse.
    let data =
        b"\x30\x0e\x02\x01\x01\
          \x6b\x09\x0a\x01\x00\x04\x00\x04\x00\xa0\x00";
    let err = decode_message(LdapGrammar, &data[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValueEncoding);
    assert_eq!(err.pos().offset(), 14);
}

#[test]
fn empty_controls() {
    let data = b"\x30\x07\x02\x01\x01\x42\x00\xa0\x00";
    let (msg, _) = decode_message(LdapGrammar, &data[..]).unwrap();
    assert!(msg.controls.is_empty());
}

#[test]
fn empty_referral() {
    let data =
        b"\x30\x0e\x02\x01\x01\
          \x6b\x09\x0a\x01\x00\x04\x00\x04\x00\xa3\x00";
    let err = decode_message(LdapGrammar, &data[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValueEncoding);
    assert_eq!(err.pos().offset(), 16);

    // The same value can't be built for encoding.
    assert!(Referral::new(Vec::new()).is_err());
    let result = LdapResult {
        referral: Some(Referral::new(vec!["ldap://a/".into()]).unwrap()),
        .. LdapResult::new(ResultCode::SUCCESS)
    };
    let msg = LdapMessage::new(
        message_id(1), ProtocolOp::DelResponse(result)
    );
    let (decoded, _) = decode_message(
        LdapGrammar, &msg.encode().to_vec()
    ).unwrap();
    assert_eq!(decoded, msg);
}

#[test]
fn der_booleans() {
    let data =
        b"\x30\x11\x02\x01\x01\x42\x00\
          \xa0\x0a\x30\x08\x04\x03\x31\x2e\x32\x01\x01\x01";
    let (msg, _) = decode_message(LdapGrammar, &data[..]).unwrap();
    assert!(msg.controls[0].criticality);

    let der = DecoderConfig::default().with_mode(Mode::Der);
    let err = decode_message_with_config(
        LdapGrammar, der, &data[..]
    ).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValueEncoding);
    assert_eq!(err.pos().offset(), 16);
}

#[test]
fn poisoned_container() {
    let mut container = Container::new(LdapGrammar);
    let err = container.decode(b"\x30\x05\x02\x01\x01\x43\x00").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedTag);
    assert_eq!(
        container.decode(b"\x30\x05\x02\x01\x01\x42\x00"), Err(err.clone())
    );
    assert!(!container.is_complete());
    assert_eq!(container.into_message().unwrap_err(), err);
}

#[test]
fn generalized_time_in_message() {
    let value = PaEncTsEnc {
        patimestamp: crate::kerberos::KerberosTime::new(
            GeneralizedTime::from_content(b"20240115120000Z").unwrap()
        ).unwrap(),
        pausec: None,
    };
    let encoded = value.encode().to_vec();
    assert_eq!(&encoded[4..6], b"\x18\x0f");
    let (decoded, _) = decode_message(PaEncTsEncGrammar, &encoded).unwrap();
    assert_eq!(decoded, value);
}
