#![no_main]

use libfuzzer_sys::fuzz_target;
use berstream::{GeneralizedTime, Mode};
use berstream::boolean::{decode_boolean, decode_null};
use berstream::encode::{PrimitiveContent, Values};
use berstream::int::{decode_integer, decode_unsigned, encode_integer};
use berstream::string::{
    decode_ia5_string, decode_numeric_string, decode_printable_string,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = decode_integer(data) {
        assert_eq!(decode_integer(&encode_integer(value)), Ok(value));
    }
    let _ = decode_unsigned(data);
    let _ = decode_boolean(data, Mode::Ber);
    let _ = decode_boolean(data, Mode::Der);
    let _ = decode_null(data);
    let _ = decode_numeric_string(data);
    let _ = decode_printable_string(data);
    let _ = decode_ia5_string(data);
    if let Ok(time) = GeneralizedTime::from_content(data) {
        let encoded = time.encode().to_vec();
        let again = GeneralizedTime::from_content(&encoded[2..]).unwrap();
        assert_eq!(again, time);
    }
});
