#![no_main]

use libfuzzer_sys::fuzz_target;
use berstream::decode::{
    Container, DecoderConfig, decode_message_with_config,
};
use berstream::encode::Values;
use berstream::ldap::LdapGrammar;
use berstream::Mode;

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Der] {
        let config = DecoderConfig::default().with_mode(mode);
        let whole = decode_message_with_config(LdapGrammar, config, data);

        // Feeding the data in two chunks must give the same result.
        let split = data.len() / 2;
        let mut container = Container::with_config(LdapGrammar, config);
        let chunked = match container.decode(&data[..split]) {
            Err(err) if err.is_truncated() => {
                container.decode(&data[split..]).and_then(|len| {
                    container.into_message().map(|msg| (msg, split + len))
                })
            }
            Ok(len) => container.into_message().map(|msg| (msg, len)),
            Err(err) => Err(err),
        };
        assert_eq!(whole, chunked);

        // Whatever decodes must survive a round trip.
        if let Ok((msg, _)) = whole {
            let encoded = msg.encode().to_vec();
            let (decoded, _) = decode_message_with_config(
                LdapGrammar, config, &encoded
            ).unwrap();
            assert_eq!(decoded, msg);
        }
    }
});
