#![no_main]

use libfuzzer_sys::fuzz_target;
use milli_h2q::http2::{DecodeBuffer, DecodeStatus, Http2FrameDecoder, NoOpListener};

// First byte picks the segment size, the rest is the wire input.
fuzz_target!(|data: &[u8]| {
    let Some((&step, input)) = data.split_first() else {
        return;
    };
    let step = usize::from(step).max(1);
    let mut decoder = Http2FrameDecoder::new();
    let mut listener = NoOpListener;
    for chunk in input.chunks(step) {
        let mut db = DecodeBuffer::new(chunk);
        while db.has_data() {
            let before = db.remaining();
            let status = decoder.decode_frame(&mut db, &mut listener);
            if status == DecodeStatus::InProgress {
                assert!(db.is_empty());
            }
            if db.remaining() == before && status != DecodeStatus::Done {
                break;
            }
        }
    }
});
