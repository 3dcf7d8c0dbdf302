#![no_main]

use libfuzzer_sys::fuzz_target;
use milli_h2q::hpack::HpackDecoder;

fuzz_target!(|data: &[u8]| {
    let mut decoder = HpackDecoder::new();
    if decoder.start_decoding_block().is_err() {
        return;
    }
    let mut fields = 0usize;
    for fragment in data.chunks(7) {
        if decoder
            .decode_fragment(fragment, &mut |_, _| fields += 1)
            .is_err()
        {
            return;
        }
    }
    let _ = decoder.end_decoding_block();
});
