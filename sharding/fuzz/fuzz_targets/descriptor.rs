#![no_main]

use commonware_codec::{DecodeExt, Encode, EncodeSize};
use commonware_sharding::{strategy::MAX_SHARD_KEYS, Descriptor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(descriptor) = Descriptor::decode(data) else {
        return;
    };
    assert!(descriptor.shard_keys.len() <= MAX_SHARD_KEYS);

    // Anything accepted must survive a round trip
    let encoded = descriptor.encode();
    assert_eq!(encoded.len(), descriptor.encode_size());
    let decoded = Descriptor::decode(encoded).expect("failed to decode an encoded descriptor");
    assert_eq!(decoded, descriptor);
});
