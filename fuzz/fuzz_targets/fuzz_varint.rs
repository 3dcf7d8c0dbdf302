#![no_main]

use libfuzzer_sys::fuzz_target;
use milli_h2q::varint::{decode_varint, encode_varint, varint_len};

fuzz_target!(|data: &[u8]| {
    let Ok((value, consumed)) = decode_varint(data) else {
        return;
    };
    let mut buf = [0u8; 8];
    let written = encode_varint(value, &mut buf).unwrap();
    assert_eq!(decode_varint(&buf[..written]).unwrap(), (value, written));
    // Non-minimal encodings decode fine but re-encode shorter.
    assert!(varint_len(value) <= consumed);
});
