#![no_main]

use libfuzzer_sys::fuzz_target;
use berstream::decode::{Container, TupleGrammar, decode_tuple};
use berstream::encode::Values;

fuzz_target!(|data: &[u8]| {
    let mut container = Container::new(TupleGrammar);
    for octet in data {
        if container.decode(std::slice::from_ref(octet)).is_ok() {
            break
        }
    }
    let single = container.into_message();
    let whole = decode_tuple(data);
    assert_eq!(single, whole);

    if let Ok(tuple) = whole {
        let encoded = tuple.to_vec();
        let decoded = decode_tuple(&encoded).unwrap();
        assert_eq!(decoded.to_vec(), encoded);
    }
});
