#![no_main]

use libfuzzer_sys::fuzz_target;
use milli_h2q::adapter::{DecoderAdapter, FramerError, FramerVisitor};
use milli_h2q::headers::{HeadersHandler, QuicHeaderList};

#[derive(Default)]
struct Visitor {
    headers: QuicHeaderList,
    errors: usize,
}

impl FramerVisitor for Visitor {
    fn on_error(&mut self, _: FramerError) {
        self.errors += 1;
    }
    fn headers_handler(&mut self, _: u32) -> Option<&mut dyn HeadersHandler> {
        Some(&mut self.headers)
    }
}

fuzz_target!(|data: &[u8]| {
    let mut adapter = DecoderAdapter::new(Visitor::default());
    for chunk in data.chunks(13) {
        let consumed = adapter.process_input(chunk);
        assert!(consumed <= chunk.len());
        if adapter.has_error() {
            break;
        }
    }
    assert!(adapter.visitor().errors <= 1);
});
