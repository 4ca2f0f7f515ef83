#![no_main]
use libfuzzer_sys::fuzz_target;
use safeid_rs::{Config, SafeId, U64Codec, UuidCodec};

fuzz_target!(|data: &[u8]| {
    let token = String::from_utf8_lossy(data);
    let config = Config::new(b"random-key".to_vec());

    let uuids = SafeId::new(UuidCodec, &config).unwrap();
    assert!(uuids.decrypt_id(&token).is_err());

    let numbers = SafeId::new(U64Codec, &config).unwrap();
    assert!(numbers.decrypt_id(&token).is_err());
});
