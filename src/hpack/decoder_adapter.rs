//! Connects the HPACK decoder to header-frame processing.
//!
//! Decoded fields go to a [`HeadersHandler`] when the caller has one;
//! otherwise they are collected in a [`HeaderBlock`].

use super::decoder::HpackDecoder;
use super::header_block::HeaderBlock;
use crate::error::HpackDecodeError;
use crate::headers::HeadersHandler;
use crate::log::debug;

/// Largest fragment accepted by default, and the default string limit.
pub const DEFAULT_MAX_DECODE_BUFFER_SIZE: usize = 32 * 1024;

#[derive(Debug, Clone)]
pub struct HpackDecoderAdapter {
    decoder: HpackDecoder,
    decoded_block: HeaderBlock,
    max_decode_buffer_size: usize,
    total_hpack_bytes: usize,
    total_uncompressed_bytes: usize,
    header_block_started: bool,
}

impl Default for HpackDecoderAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackDecoderAdapter {
    pub fn new() -> Self {
        let mut decoder = HpackDecoder::new();
        decoder.set_max_string_size_bytes(DEFAULT_MAX_DECODE_BUFFER_SIZE);
        Self {
            decoder,
            decoded_block: HeaderBlock::new(),
            max_decode_buffer_size: DEFAULT_MAX_DECODE_BUFFER_SIZE,
            total_hpack_bytes: 0,
            total_uncompressed_bytes: 0,
            header_block_started: false,
        }
    }

    pub fn decoder(&self) -> &HpackDecoder {
        &self.decoder
    }

    pub fn apply_header_table_size_setting(&mut self, size_setting: usize) {
        self.decoder.apply_header_table_size_setting(size_setting);
    }

    /// Limits both the fragment size and the length of any string literal.
    pub fn set_max_decode_buffer_size_bytes(&mut self, max_decode_buffer_size: usize) {
        self.max_decode_buffer_size = max_decode_buffer_size;
        self.decoder.set_max_string_size_bytes(max_decode_buffer_size);
    }

    /// Fields of the last block decoded without a handler.
    pub fn decoded_block(&self) -> &HeaderBlock {
        &self.decoded_block
    }

    /// Prepares for a new header block. The block itself starts with the
    /// first call to [`handle_control_frame_headers_data`].
    ///
    /// [`handle_control_frame_headers_data`]: Self::handle_control_frame_headers_data
    pub fn handle_control_frame_headers_start(&mut self) {
        self.header_block_started = false;
        self.total_hpack_bytes = 0;
        self.total_uncompressed_bytes = 0;
    }

    /// Decodes one fragment. An empty fragment only opens the block.
    pub fn handle_control_frame_headers_data(
        &mut self,
        data: &[u8],
        mut handler: Option<&mut (dyn HeadersHandler + '_)>,
    ) -> Result<(), HpackDecodeError> {
        if !self.header_block_started {
            self.decoder.start_decoding_block()?;
            self.header_block_started = true;
            self.total_hpack_bytes = 0;
            self.total_uncompressed_bytes = 0;
            match handler.as_deref_mut() {
                Some(h) => h.on_header_block_start(),
                None => self.decoded_block.clear(),
            }
        }
        if data.len() > self.max_decode_buffer_size {
            debug!(
                "HPACK fragment of {} bytes above limit {}",
                data.len(),
                self.max_decode_buffer_size
            );
            return Err(HpackDecodeError::FragmentTooLarge {
                length: data.len(),
                limit: self.max_decode_buffer_size,
            });
        }
        self.total_hpack_bytes += data.len();

        let uncompressed = &mut self.total_uncompressed_bytes;
        let block = &mut self.decoded_block;
        self.decoder.decode_fragment(data, &mut |name, value| {
            *uncompressed += name.len() + value.len();
            match handler.as_deref_mut() {
                Some(h) => h.on_header(name, value),
                None => block.append_value_or_add_header(name, value),
            }
        })
    }

    /// Ends the block and returns its compressed length.
    pub fn handle_control_frame_headers_complete(
        &mut self,
        mut handler: Option<&mut (dyn HeadersHandler + '_)>,
    ) -> Result<usize, HpackDecodeError> {
        if !self.header_block_started {
            self.handle_control_frame_headers_data(&[], handler.as_deref_mut())?;
        }
        self.decoder.end_decoding_block()?;
        self.header_block_started = false;
        if let Some(h) = handler {
            h.on_header_block_end(self.total_uncompressed_bytes, self.total_hpack_bytes);
        }
        Ok(self.total_hpack_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use hex_literal::hex;

    #[derive(Default)]
    struct Collect {
        started: usize,
        headers: Vec<(Vec<u8>, Vec<u8>)>,
        ended: Option<(usize, usize)>,
    }

    impl HeadersHandler for Collect {
        fn on_header_block_start(&mut self) {
            self.started += 1;
        }
        fn on_header(&mut self, name: &[u8], value: &[u8]) {
            self.headers.push((name.to_vec(), value.to_vec()));
        }
        fn on_header_block_end(&mut self, uncompressed: usize, compressed: usize) {
            self.ended = Some((uncompressed, compressed));
        }
    }

    #[test]
    fn handler_receives_block() {
        let mut adapter = HpackDecoderAdapter::new();
        let mut handler = Collect::default();
        let block = hex!("8286 8441 8cf1 e3c2 e5f2 3a6b a0ab 90f4 ff");

        adapter.handle_control_frame_headers_start();
        adapter.handle_control_frame_headers_data(&block[..5], Some(&mut handler)).unwrap();
        adapter.handle_control_frame_headers_data(&block[5..], Some(&mut handler)).unwrap();
        let compressed = adapter.handle_control_frame_headers_complete(Some(&mut handler)).unwrap();

        assert_eq!(compressed, block.len());
        assert_eq!(handler.started, 1);
        assert_eq!(handler.headers.len(), 4);
        assert_eq!(handler.headers[3], (b":authority".to_vec(), b"www.example.com".to_vec()));
        // 7+3 + 7+4 + 5+1 + 10+15
        assert_eq!(handler.ended, Some((52, block.len())));
        assert!(adapter.decoded_block().is_empty());
    }

    #[test]
    fn block_without_handler() {
        let mut adapter = HpackDecoderAdapter::new();
        adapter.handle_control_frame_headers_start();
        adapter.handle_control_frame_headers_data(&[0x82, 0x84], None).unwrap();
        adapter.handle_control_frame_headers_complete(None).unwrap();
        assert_eq!(adapter.decoded_block().get(b":method"), Some(&b"GET"[..]));
        assert_eq!(adapter.decoded_block().get(b":path"), Some(&b"/"[..]));
    }

    #[test]
    fn empty_block_still_starts_and_ends() {
        let mut adapter = HpackDecoderAdapter::new();
        let mut handler = Collect::default();
        adapter.handle_control_frame_headers_start();
        assert_eq!(adapter.handle_control_frame_headers_complete(Some(&mut handler)), Ok(0));
        assert_eq!(handler.started, 1);
        assert_eq!(handler.ended, Some((0, 0)));
    }

    #[test]
    fn oversized_fragment() {
        let mut adapter = HpackDecoderAdapter::new();
        adapter.set_max_decode_buffer_size_bytes(4);
        adapter.handle_control_frame_headers_start();
        assert_eq!(
            adapter.handle_control_frame_headers_data(&[0x82; 5], None),
            Err(HpackDecodeError::FragmentTooLarge { length: 5, limit: 4 })
        );
    }

    #[test]
    fn decode_error_propagates() {
        let mut adapter = HpackDecoderAdapter::new();
        adapter.handle_control_frame_headers_start();
        assert_eq!(
            adapter.handle_control_frame_headers_data(&[0xff, 0x7f], None),
            Err(HpackDecodeError::InvalidIndex(254))
        );
    }
}
