//! Header block encoding (RFC 7541 §6).

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use super::constants::*;
use super::header_table::HpackHeaderTable;
use super::huffman::{obtain_hpack_huffman_table, HpackHuffmanTable};
use super::output_stream::HpackOutputStream;

/// Decides whether a header not already in the table gets inserted.
pub type IndexingPolicy = Box<dyn Fn(&[u8], &[u8]) -> bool + Send>;

/// Observes every header representation as it is encoded.
pub type HeaderListener = Box<dyn FnMut(&[u8], &[u8]) + Send>;

type Representation<'h> = (&'h [u8], &'h [u8]);

/// Indexes every regular header, and `:authority` among pseudo-headers.
pub fn default_indexing_policy(name: &[u8], _value: &[u8]) -> bool {
    name.first() != Some(&PSEUDO_HEADER_PREFIX) || name == b":authority"
}

/// Encodes header sets against a dynamic table that mirrors the peer's
/// decoder.
pub struct HpackEncoder {
    header_table: HpackHeaderTable,
    output_stream: HpackOutputStream,
    huffman_table: &'static HpackHuffmanTable,
    /// Smallest table size set since the last size update was emitted.
    min_table_size_setting_received: usize,
    should_emit_table_size: bool,
    enable_compression: bool,
    should_index: IndexingPolicy,
    listener: Option<HeaderListener>,
}

impl core::fmt::Debug for HpackEncoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HpackEncoder")
            .field("header_table", &self.header_table)
            .field("should_emit_table_size", &self.should_emit_table_size)
            .field("enable_compression", &self.enable_compression)
            .finish_non_exhaustive()
    }
}

impl Default for HpackEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackEncoder {
    pub fn new() -> Self {
        Self {
            header_table: HpackHeaderTable::new(),
            output_stream: HpackOutputStream::new(),
            huffman_table: obtain_hpack_huffman_table(),
            min_table_size_setting_received: usize::MAX,
            should_emit_table_size: false,
            enable_compression: true,
            should_index: Box::new(default_indexing_policy),
            listener: None,
        }
    }

    pub fn header_table(&self) -> &HpackHeaderTable {
        &self.header_table
    }

    /// Encodes a complete header set: pseudo-headers first, then the rest
    /// in order.
    pub fn encode_header_set(&mut self, header_set: &[(&[u8], &[u8])]) -> Vec<u8> {
        let mut representations = self.gather_representations(header_set);
        self.maybe_emit_table_size();
        while let Some(header) = representations.pop_front() {
            self.encode_representation(header);
        }
        self.output_stream.take_string()
    }

    /// Encodes `header_set` in chunks of bounded size; see
    /// [`ProgressiveEncoder`].
    pub fn encode_header_set_progressively<'e, 'h>(
        &'e mut self,
        header_set: &[(&'h [u8], &'h [u8])],
    ) -> ProgressiveEncoder<'e, 'h> {
        ProgressiveEncoder::new(self, header_set)
    }

    /// Records a new SETTINGS_HEADER_TABLE_SIZE from the peer. The table size
    /// updates it requires are emitted at the start of the next block.
    pub fn apply_header_table_size_setting(&mut self, size_setting: usize) {
        let bound = self.header_table.settings_size_bound();
        if size_setting == bound {
            return;
        }
        if size_setting < bound {
            self.min_table_size_setting_received =
                self.min_table_size_setting_received.min(size_setting);
        }
        self.header_table.set_settings_header_table_size(size_setting);
        self.should_emit_table_size = true;
    }

    pub fn set_indexing_policy(&mut self, policy: IndexingPolicy) {
        self.should_index = policy;
    }

    pub fn set_header_listener(&mut self, listener: HeaderListener) {
        self.listener = Some(listener);
    }

    /// Stops using the dynamic table and Huffman coding; every header is
    /// sent as a literal without indexing.
    pub fn disable_compression(&mut self) {
        self.enable_compression = false;
    }

    pub fn compression_enabled(&self) -> bool {
        self.enable_compression
    }

    fn gather_representations<'h>(
        &self,
        header_set: &[(&'h [u8], &'h [u8])],
    ) -> VecDeque<Representation<'h>> {
        let mut pseudo_headers = VecDeque::new();
        let mut regular_headers = Vec::new();
        for &(name, value) in header_set {
            if name == b"cookie" {
                cookie_to_crumbs(name, value, &mut regular_headers);
            } else if name.first() == Some(&PSEUDO_HEADER_PREFIX) {
                self.decompose(name, value, &mut pseudo_headers);
            } else {
                self.decompose(name, value, &mut regular_headers);
            }
        }
        pseudo_headers.extend(regular_headers);
        pseudo_headers
    }

    fn decompose<'h>(&self, name: &'h [u8], value: &'h [u8], out: &mut impl Extend<Representation<'h>>) {
        if self.enable_compression {
            out.extend(value.split(|&b| b == 0).map(|piece| (name, piece)));
        } else {
            out.extend([(name, value)]);
        }
    }

    fn encode_representation(&mut self, (name, value): Representation<'_>) {
        if let Some(listener) = self.listener.as_mut() {
            listener(name, value);
        }
        if !self.enable_compression {
            self.emit_non_indexed_literal(name, value);
            return;
        }
        let existing = self
            .header_table
            .get_by_name_and_value(name, value)
            .and_then(|entry| self.header_table.index_of(entry));
        if let Some(index) = existing {
            self.output_stream.append_prefix(INDEXED_OPCODE);
            self.output_stream.append_uint32(index as u32);
        } else if (self.should_index)(name, value) {
            self.emit_indexed_literal(name, value);
        } else {
            self.emit_non_indexed_literal(name, value);
        }
    }

    fn emit_indexed_literal(&mut self, name: &[u8], value: &[u8]) {
        self.output_stream.append_prefix(LITERAL_INCREMENTAL_INDEX_OPCODE);
        self.emit_literal(name, value);
        self.header_table.try_add_entry(name, value);
    }

    fn emit_non_indexed_literal(&mut self, name: &[u8], value: &[u8]) {
        self.output_stream.append_prefix(LITERAL_NO_INDEX_OPCODE);
        self.output_stream.append_uint32(0);
        self.emit_string(name);
        self.emit_string(value);
    }

    fn emit_literal(&mut self, name: &[u8], value: &[u8]) {
        let name_index = self
            .header_table
            .get_by_name(name)
            .and_then(|entry| self.header_table.index_of(entry));
        match name_index {
            Some(index) => self.output_stream.append_uint32(index as u32),
            None => {
                self.output_stream.append_uint32(0);
                self.emit_string(name);
            }
        }
        self.emit_string(value);
    }

    fn emit_string(&mut self, s: &[u8]) {
        let huffman_size = if self.enable_compression {
            self.huffman_table.encoded_size(s)
        } else {
            s.len()
        };
        if huffman_size < s.len() {
            self.output_stream.append_prefix(STRING_LITERAL_HUFFMAN_ENCODED);
            self.output_stream.append_uint32(huffman_size as u32);
            self.huffman_table.encode_string(s, &mut self.output_stream);
        } else {
            self.output_stream.append_prefix(STRING_LITERAL_IDENTITY_ENCODED);
            self.output_stream.append_uint32(s.len() as u32);
            self.output_stream.append_bytes(s);
        }
    }

    fn maybe_emit_table_size(&mut self) {
        if !self.should_emit_table_size {
            return;
        }
        let current = self.header_table.settings_size_bound();
        if self.min_table_size_setting_received < current {
            self.output_stream.append_prefix(HEADER_TABLE_SIZE_UPDATE_OPCODE);
            self.output_stream
                .append_uint32(self.min_table_size_setting_received as u32);
        }
        self.output_stream.append_prefix(HEADER_TABLE_SIZE_UPDATE_OPCODE);
        self.output_stream.append_uint32(current as u32);
        self.min_table_size_setting_received = usize::MAX;
        self.should_emit_table_size = false;
    }
}

/// Splits a cookie into crumbs (RFC 7540 §8.1.2.5) after trimming outer
/// whitespace, so that each crumb can be indexed on its own.
fn cookie_to_crumbs<'h>(name: &'h [u8], value: &'h [u8], out: &mut Vec<Representation<'h>>) {
    let is_space = |b: &u8| *b == b' ' || *b == b'\t';
    let value = match value.iter().position(|b| !is_space(b)) {
        Some(first) => {
            let last = value.iter().rposition(|b| !is_space(b)).unwrap_or(first);
            &value[first..=last]
        }
        None => &[][..],
    };
    let mut rest = value;
    loop {
        match rest.iter().position(|&b| b == b';') {
            Some(end) => {
                out.push((name, &rest[..end]));
                rest = &rest[end + 1..];
                if rest.first() == Some(&b' ') {
                    rest = &rest[1..];
                }
            }
            None => {
                out.push((name, rest));
                break;
            }
        }
    }
}

/// Emits an encoded header set a bounded number of bytes at a time.
///
/// Headers are encoded as needed, so later headers may already see
/// entries that earlier chunks inserted into the dynamic table.
pub struct ProgressiveEncoder<'e, 'h> {
    encoder: &'e mut HpackEncoder,
    pending: VecDeque<Representation<'h>>,
    has_next: bool,
}

impl<'e, 'h> ProgressiveEncoder<'e, 'h> {
    fn new(encoder: &'e mut HpackEncoder, header_set: &[(&'h [u8], &'h [u8])]) -> Self {
        let pending = encoder.gather_representations(header_set);
        encoder.maybe_emit_table_size();
        let has_next = encoder.output_stream.size() > 0 || !pending.is_empty();
        Self { encoder, pending, has_next }
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Next chunk of at most `max_encoded_bytes` bytes.
    pub fn next(&mut self, max_encoded_bytes: usize) -> Vec<u8> {
        while self.encoder.output_stream.size() <= max_encoded_bytes {
            match self.pending.pop_front() {
                Some(header) => self.encoder.encode_representation(header),
                None => break,
            }
        }
        let chunk = self.encoder.output_stream.bounded_take_string(max_encoded_bytes);
        self.has_next = self.encoder.output_stream.size() > 0 || !self.pending.is_empty();
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use alloc::vec;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use hex_literal::hex;

    fn crumbs(value: &[u8]) -> Vec<&[u8]> {
        let mut out = Vec::new();
        cookie_to_crumbs(b"cookie", value, &mut out);
        out.into_iter().map(|(_, v)| v).collect()
    }

    #[test]
    fn cookie_crumbling() {
        assert_eq!(crumbs(b"a=b; c=d"), [&b"a=b"[..], b"c=d"]);
        assert_eq!(crumbs(b"  a=b;c=d  "), [&b"a=b"[..], b"c=d"]);
        assert_eq!(crumbs(b"a=b;  c=d"), [&b"a=b"[..], b" c=d"]);
        assert_eq!(crumbs(b"a=b;"), [&b"a=b"[..], b""]);
        assert_eq!(crumbs(b" \t "), [&b""[..]]);
    }

    #[test]
    fn uncompressed_literal_layout() {
        // The strings of RFC 7541 C.2.1, sent without indexing.
        let mut encoder = HpackEncoder::new();
        encoder.disable_compression();
        let block = encoder.encode_header_set(&[(b"custom-key", b"custom-header")]);
        assert_eq!(block, hex!("000a 6375 7374 6f6d 2d6b 6579 0d63 7573 746f 6d2d 6865 6164 6572"));
        assert_eq!(encoder.header_table().size(), 0);
    }

    #[test]
    fn rfc7541_c4_requests_with_huffman() {
        let mut encoder = HpackEncoder::new();
        let first: [(&[u8], &[u8]); 4] = [
            (b":method", b"GET"),
            (b":scheme", b"http"),
            (b":path", b"/"),
            (b":authority", b"www.example.com"),
        ];
        assert_eq!(
            encoder.encode_header_set(&first),
            hex!("8286 8441 8cf1 e3c2 e5f2 3a6b a0ab 90f4 ff")
        );
        assert_eq!(encoder.header_table().size(), 57);

        let second: [(&[u8], &[u8]); 5] = [
            (b":method", b"GET"),
            (b":scheme", b"http"),
            (b":path", b"/"),
            (b":authority", b"www.example.com"),
            (b"cache-control", b"no-cache"),
        ];
        assert_eq!(
            encoder.encode_header_set(&second),
            hex!("8286 84be 5886 a8eb 1064 9cbf")
        );
        assert_eq!(encoder.header_table().size(), 110);
    }

    #[test]
    fn pseudo_headers_first() {
        let mut encoder = HpackEncoder::new();
        encoder.disable_compression();
        let seen = Arc::new(AtomicUsize::new(0));
        let order = Arc::clone(&seen);
        encoder.set_header_listener(Box::new(move |name, _| {
            let position = order.fetch_add(1, Ordering::Relaxed);
            assert_eq!(name.first() == Some(&b':'), position == 0);
        }));
        encoder.encode_header_set(&[(b"accept", b"*/*"), (b":path", b"/")]);
        assert_eq!(seen.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn nul_splitting_only_with_compression() {
        let mut encoder = HpackEncoder::new();
        encoder.set_indexing_policy(Box::new(|_, _| false));
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        encoder.set_header_listener(Box::new(move |_, _| {
            c.fetch_add(1, Ordering::Relaxed);
        }));
        encoder.encode_header_set(&[(b"x", b"a\0b")]);
        assert_eq!(count.load(Ordering::Relaxed), 2);

        encoder.disable_compression();
        encoder.encode_header_set(&[(b"x", b"a\0b")]);
        assert_eq!(count.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn size_updates_lowest_first() {
        let mut encoder = HpackEncoder::new();
        encoder.apply_header_table_size_setting(1024);
        encoder.apply_header_table_size_setting(2048);
        // 0x3f 0xe1 0x07 is 1024; 0x3f 0xe1 0x0f is 2048.
        let block = encoder.encode_header_set(&[(b":method", b"GET")]);
        assert_eq!(block, hex!("3fe107 3fe10f 82"));

        // Nothing pending for the next block.
        assert_eq!(encoder.encode_header_set(&[(b":method", b"GET")]), [0x82]);
    }

    #[test]
    fn size_update_when_growing() {
        let mut encoder = HpackEncoder::new();
        encoder.apply_header_table_size_setting(8192);
        let block = encoder.encode_header_set(&[]);
        assert_eq!(block, hex!("3fe13f"));
        assert_eq!(encoder.header_table().max_size(), 8192);
    }

    #[test]
    fn growth_after_shrink_emits_single_update() {
        let mut encoder = HpackEncoder::new();
        encoder.apply_header_table_size_setting(1024);
        assert_eq!(encoder.encode_header_set(&[]), hex!("3fe107"));
        encoder.apply_header_table_size_setting(2048);
        assert_eq!(encoder.encode_header_set(&[]), hex!("3fe10f"));
    }

    #[test]
    fn unchanged_setting_emits_nothing() {
        let mut encoder = HpackEncoder::new();
        encoder.apply_header_table_size_setting(4096);
        assert!(encoder.encode_header_set(&[]).is_empty());
    }

    #[test]
    fn progressive_matches_whole() {
        let headers: [(&[u8], &[u8]); 3] = [
            (b":status", b"302"),
            (b"cache-control", b"private"),
            (b"location", b"https://www.example.com"),
        ];
        let whole = HpackEncoder::new().encode_header_set(&headers);

        let mut encoder = HpackEncoder::new();
        let mut progressive = encoder.encode_header_set_progressively(&headers);
        let mut joined = vec![];
        while progressive.has_next() {
            let chunk = progressive.next(5);
            assert!(chunk.len() <= 5);
            joined.extend(chunk);
        }
        assert_eq!(joined, whole);
    }
}
