//! Incremental header block decoding (RFC 7541 §3, §6).
//!
//! A header block may arrive in any number of fragments split at arbitrary
//! bytes. Complete representations are applied as soon as they are seen;
//! an incomplete trailing representation is buffered along with the number
//! of bytes it needs before parsing can get further, and is not looked at
//! again until that many have arrived. Nothing is applied to the dynamic
//! table until the whole representation has been read, so a split never
//! changes the outcome.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use super::constants::*;
use super::entry::HpackEntry;
use super::header_table::HpackHeaderTable;
use super::huffman::{obtain_hpack_huffman_table, HpackHuffmanTable};
use super::integer::decode_integer;
use crate::error::{Error, HpackDecodeError};
use crate::log::debug;

/// Default limit on the encoded length of one string literal.
pub const DEFAULT_MAX_STRING_SIZE: usize = 32 * 1024;

#[derive(Debug, Clone)]
pub struct HpackDecoder {
    header_table: HpackHeaderTable,
    huffman_table: &'static HpackHuffmanTable,
    /// Unconsumed tail of the block so far.
    buffer: Vec<u8>,
    /// Length `buffer` must reach before re-parsing it can make progress.
    buffer_needed: usize,
    max_string_size: usize,
    /// Lowest SETTINGS_HEADER_TABLE_SIZE acknowledged since the last size
    /// update.
    lowest_header_table_size: usize,
    /// Latest SETTINGS_HEADER_TABLE_SIZE acknowledged.
    final_header_table_size: usize,
    require_size_update: bool,
    allow_size_update: bool,
    saw_size_update: bool,
    in_block: bool,
    error: Option<HpackDecodeError>,
    #[cfg(test)]
    parses: usize,
}

/// Result of parsing at the start of an input slice.
enum Parse<T> {
    Done(T),
    /// The input ends inside the item; nothing changes until the slice is
    /// at least this long.
    NeedBytes(usize),
}

/// Unwraps a [`Parse`], or returns `NeedBytes` shifted by `offset`.
macro_rules! parsed {
    ($parse:expr, $offset:expr) => {
        match $parse? {
            Parse::Done(value) => value,
            Parse::NeedBytes(n) => return Ok(Parse::NeedBytes($offset + n)),
        }
    };
}

/// Where a string literal's octets sit within the representation.
struct StringExtent {
    huffman: bool,
    start: usize,
    end: usize,
}

impl Default for HpackDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackDecoder {
    pub fn new() -> Self {
        let default_size = DEFAULT_HEADER_TABLE_SIZE_SETTING as usize;
        Self {
            header_table: HpackHeaderTable::new(),
            huffman_table: obtain_hpack_huffman_table(),
            buffer: Vec::new(),
            buffer_needed: 0,
            max_string_size: DEFAULT_MAX_STRING_SIZE,
            lowest_header_table_size: default_size,
            final_header_table_size: default_size,
            require_size_update: false,
            allow_size_update: false,
            saw_size_update: false,
            in_block: false,
            error: None,
            #[cfg(test)]
            parses: 0,
        }
    }

    pub fn header_table(&self) -> &HpackHeaderTable {
        &self.header_table
    }

    /// The error that stopped the decoder, if any.
    pub fn error(&self) -> Option<HpackDecodeError> {
        self.error
    }

    pub fn set_max_string_size_bytes(&mut self, max_string_size: usize) {
        self.max_string_size = max_string_size;
    }

    pub fn max_string_size_bytes(&self) -> usize {
        self.max_string_size
    }

    /// Records that our SETTINGS_HEADER_TABLE_SIZE has been acknowledged.
    /// The encoder must then open a later block with a size update no
    /// larger than the lowest acknowledged value.
    pub fn apply_header_table_size_setting(&mut self, size_setting: usize) {
        self.lowest_header_table_size = self.lowest_header_table_size.min(size_setting);
        self.final_header_table_size = size_setting;
    }

    pub fn start_decoding_block(&mut self) -> Result<(), HpackDecodeError> {
        self.check_usable()?;
        self.in_block = true;
        self.buffer.clear();
        self.buffer_needed = 0;
        self.require_size_update = self.lowest_header_table_size < self.header_table.size()
            || self.final_header_table_size < self.header_table.max_size();
        self.allow_size_update = true;
        self.saw_size_update = false;
        Ok(())
    }

    /// Decodes one fragment of the current block, calling `on_header` for
    /// each header field in order.
    pub fn decode_fragment(
        &mut self,
        data: &[u8],
        on_header: &mut dyn FnMut(&[u8], &[u8]),
    ) -> Result<(), HpackDecodeError> {
        self.check_usable()?;
        if !self.in_block {
            return Err(self.fail(HpackDecodeError::BlockNotStarted));
        }
        let result = if self.buffer.is_empty() {
            self.decode_available(data, on_header)
                .map(|consumed| self.buffer.extend_from_slice(&data[consumed..]))
        } else if self.buffer.len() + data.len() < self.buffer_needed {
            self.buffer.extend_from_slice(data);
            Ok(())
        } else {
            let mut pending = core::mem::take(&mut self.buffer);
            pending.extend_from_slice(data);
            self.decode_available(&pending, on_header).map(|consumed| {
                pending.drain(..consumed);
                self.buffer = pending;
            })
        };
        result.map_err(|e| self.fail(e))
    }

    /// Ends the block; fails if it stopped inside a representation or
    /// lacked a required size update.
    pub fn end_decoding_block(&mut self) -> Result<(), HpackDecodeError> {
        self.check_usable()?;
        if !self.in_block {
            return Err(self.fail(HpackDecodeError::BlockNotStarted));
        }
        if !self.buffer.is_empty() {
            return Err(self.fail(HpackDecodeError::TruncatedBlock));
        }
        if self.require_size_update {
            return Err(self.fail(HpackDecodeError::MissingSizeUpdate));
        }
        self.in_block = false;
        Ok(())
    }

    fn check_usable(&self) -> Result<(), HpackDecodeError> {
        match self.error {
            Some(_) => Err(HpackDecodeError::DecoderFailed),
            None => Ok(()),
        }
    }

    fn fail(&mut self, error: HpackDecodeError) -> HpackDecodeError {
        debug!("HPACK decoding failed: {error}");
        self.error = Some(error);
        error
    }

    fn decode_available(
        &mut self,
        input: &[u8],
        on_header: &mut dyn FnMut(&[u8], &[u8]),
    ) -> Result<usize, HpackDecodeError> {
        let mut pos = 0;
        while pos < input.len() {
            match self.decode_representation(&input[pos..], on_header)? {
                Parse::Done(len) => pos += len,
                Parse::NeedBytes(needed) => {
                    self.buffer_needed = needed;
                    break;
                }
            }
        }
        Ok(pos)
    }

    /// Decodes the representation at the start of `input`, returning its
    /// length, or how long `input` must be before it can be decoded.
    fn decode_representation(
        &mut self,
        input: &[u8],
        on_header: &mut dyn FnMut(&[u8], &[u8]),
    ) -> Result<Parse<usize>, HpackDecodeError> {
        #[cfg(test)]
        {
            self.parses += 1;
        }
        let first = input[0];

        if INDEXED_OPCODE.matches(first) {
            let (index, len) = parsed!(integer(input, INDEXED_OPCODE.integer_bits()), 0);
            self.on_header_representation()?;
            let entry = self.lookup(index)?;
            on_header(entry.name(), entry.value());
            return Ok(Parse::Done(len));
        }

        if HEADER_TABLE_SIZE_UPDATE_OPCODE.matches(first) {
            let (size, len) =
                parsed!(integer(input, HEADER_TABLE_SIZE_UPDATE_OPCODE.integer_bits()), 0);
            self.on_size_update(size)?;
            return Ok(Parse::Done(len));
        }

        // Without indexing and never indexed decode the same way.
        let indexing = LITERAL_INCREMENTAL_INDEX_OPCODE.matches(first);
        let prefix_bits = if indexing {
            LITERAL_INCREMENTAL_INDEX_OPCODE.integer_bits()
        } else {
            LITERAL_NO_INDEX_OPCODE.integer_bits()
        };
        let (name_index, mut pos) = parsed!(integer(input, prefix_bits), 0);
        let name_extent = if name_index == 0 {
            let extent = parsed!(self.string_extent(&input[pos..]), pos);
            let extent = extent.shifted(pos);
            pos = extent.end;
            Some(extent)
        } else {
            self.lookup(name_index)?;
            None
        };
        let value_extent = parsed!(self.string_extent(&input[pos..]), pos).shifted(pos);
        let len = value_extent.end;

        // Both strings are complete; only now pay for Huffman decoding.
        let value = self.string(input, &value_extent)?;
        let name = match &name_extent {
            Some(extent) => Some(self.string(input, extent)?),
            None => None,
        };

        self.on_header_representation()?;
        match name {
            Some(name) => {
                on_header(&name, &value);
                if indexing {
                    self.header_table.try_add_entry(&name, &value);
                }
            }
            None => {
                let entry = self.lookup(name_index)?;
                on_header(entry.name(), &value);
                if indexing {
                    let name = entry.name().to_vec();
                    self.header_table.try_add_entry(&name, &value);
                }
            }
        }
        Ok(Parse::Done(len))
    }

    /// Locates the string literal at the start of `input` without decoding
    /// it. The length limit is checked as soon as the length is known.
    fn string_extent(&self, input: &[u8]) -> Result<Parse<StringExtent>, HpackDecodeError> {
        let Some(&first) = input.first() else {
            return Ok(Parse::NeedBytes(1));
        };
        let (length, prefix_len) = parsed!(integer(input, 7), 0);
        if length > self.max_string_size as u64 {
            return Err(HpackDecodeError::StringTooLong { length, limit: self.max_string_size });
        }
        let end = prefix_len + length as usize;
        if input.len() < end {
            return Ok(Parse::NeedBytes(end));
        }
        Ok(Parse::Done(StringExtent {
            huffman: STRING_LITERAL_HUFFMAN_ENCODED.matches(first),
            start: prefix_len,
            end,
        }))
    }

    fn string<'b>(&self, input: &'b [u8], extent: &StringExtent) -> Result<Cow<'b, [u8]>, HpackDecodeError> {
        let raw = &input[extent.start..extent.end];
        if extent.huffman {
            let mut out = Vec::with_capacity(raw.len() * 8 / 5);
            self.huffman_table.decode_string(raw, &mut out)?;
            Ok(Cow::Owned(out))
        } else {
            Ok(Cow::Borrowed(raw))
        }
    }

    fn lookup(&self, index: u64) -> Result<&HpackEntry<'static>, HpackDecodeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.header_table.get_by_index(i))
            .ok_or(HpackDecodeError::InvalidIndex(index))
    }

    fn on_header_representation(&mut self) -> Result<(), HpackDecodeError> {
        if self.require_size_update {
            return Err(HpackDecodeError::MissingSizeUpdate);
        }
        self.allow_size_update = false;
        Ok(())
    }

    fn on_size_update(&mut self, size: u64) -> Result<(), HpackDecodeError> {
        if !self.allow_size_update {
            return Err(HpackDecodeError::SizeUpdateNotAllowed);
        }
        if self.require_size_update {
            if size > self.lowest_header_table_size as u64 {
                return Err(HpackDecodeError::SizeUpdateAboveLowWaterMark {
                    size,
                    limit: self.lowest_header_table_size,
                });
            }
            self.require_size_update = false;
        } else if size > self.final_header_table_size as u64 {
            return Err(HpackDecodeError::SizeUpdateAboveSetting {
                size,
                limit: self.final_header_table_size,
            });
        }
        self.header_table.set_max_size(size as usize);
        // At most two updates per block.
        if self.saw_size_update {
            self.allow_size_update = false;
        } else {
            self.saw_size_update = true;
        }
        self.lowest_header_table_size = self.final_header_table_size;
        Ok(())
    }
}

impl StringExtent {
    fn shifted(self, by: usize) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
            ..self
        }
    }
}

/// Prefix integer; one more byte is all an unfinished one can ask for.
fn integer(input: &[u8], prefix_bits: u8) -> Result<Parse<(u64, usize)>, HpackDecodeError> {
    match decode_integer(input, prefix_bits) {
        Ok(decoded) => Ok(Parse::Done(decoded)),
        Err(Error::BufferTooSmall { .. }) => Ok(Parse::NeedBytes(input.len() + 1)),
        Err(Error::Hpack(e)) => Err(e),
        Err(_) => Err(HpackDecodeError::IntegerOverflow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use hex_literal::hex;

    type Headers = Vec<(Vec<u8>, Vec<u8>)>;

    fn decode_block(decoder: &mut HpackDecoder, block: &[u8]) -> Result<Headers, HpackDecodeError> {
        let mut headers = vec![];
        decoder.start_decoding_block()?;
        decoder.decode_fragment(block, &mut |n, v| headers.push((n.to_vec(), v.to_vec())))?;
        decoder.end_decoding_block()?;
        Ok(headers)
    }

    #[test]
    fn literal_with_indexing() {
        // RFC 7541 C.2.1.
        let mut decoder = HpackDecoder::new();
        let block = hex!("400a 6375 7374 6f6d 2d6b 6579 0d63 7573 746f 6d2d 6865 6164 6572");
        let headers = decode_block(&mut decoder, &block).unwrap();
        assert_eq!(headers, [(b"custom-key".to_vec(), b"custom-header".to_vec())]);
        assert_eq!(decoder.header_table().size(), 55);
    }

    #[test]
    fn literal_without_indexing() {
        // RFC 7541 C.2.2.
        let mut decoder = HpackDecoder::new();
        let block = hex!("040c 2f73 616d 706c 652f 7061 7468");
        let headers = decode_block(&mut decoder, &block).unwrap();
        assert_eq!(headers, [(b":path".to_vec(), b"/sample/path".to_vec())]);
        assert_eq!(decoder.header_table().size(), 0);
    }

    #[test]
    fn never_indexed() {
        // RFC 7541 C.2.3.
        let mut decoder = HpackDecoder::new();
        let block = hex!("1008 7061 7373 776f 7264 0673 6563 7265 74");
        let headers = decode_block(&mut decoder, &block).unwrap();
        assert_eq!(headers, [(b"password".to_vec(), b"secret".to_vec())]);
        assert_eq!(decoder.header_table().size(), 0);
    }

    #[test]
    fn split_at_every_byte() {
        let block = hex!("8286 8441 8cf1 e3c2 e5f2 3a6b a0ab 90f4 ff");
        let whole = decode_block(&mut HpackDecoder::new(), &block).unwrap();

        let mut decoder = HpackDecoder::new();
        let mut headers = vec![];
        decoder.start_decoding_block().unwrap();
        for byte in block.chunks(1) {
            decoder
                .decode_fragment(byte, &mut |n, v| headers.push((n.to_vec(), v.to_vec())))
                .unwrap();
        }
        decoder.end_decoding_block().unwrap();
        assert_eq!(headers, whole);
        assert_eq!(decoder.header_table().size(), 57);
    }

    /// Literal without indexing: Huffman-coded new name, identity value.
    fn long_literal(name: &[u8], value: &[u8]) -> Vec<u8> {
        let huffman = obtain_hpack_huffman_table();
        let mut out = crate::hpack::HpackOutputStream::new();
        out.append_prefix(LITERAL_NO_INDEX_OPCODE);
        out.append_uint32(0);
        out.append_prefix(STRING_LITERAL_HUFFMAN_ENCODED);
        out.append_uint32(huffman.encoded_size(name) as u32);
        huffman.encode_string(name, &mut out);
        out.append_prefix(STRING_LITERAL_IDENTITY_ENCODED);
        out.append_uint32(value.len() as u32);
        out.append_bytes(value);
        out.take_string()
    }

    #[test]
    fn one_byte_fragments_parse_each_representation_a_few_times() {
        let name = vec![b'a'; 4096];
        let value = vec![b'v'; 4096];
        let mut block = long_literal(&name, &value);
        block.push(0x82);

        let mut decoder = HpackDecoder::new();
        let mut headers = vec![];
        decoder.start_decoding_block().unwrap();
        for byte in block.chunks(1) {
            decoder
                .decode_fragment(byte, &mut |n, v| headers.push((n.to_vec(), v.to_vec())))
                .unwrap();
        }
        decoder.end_decoding_block().unwrap();
        assert_eq!(headers, [(name, value), (b":method".to_vec(), b"GET".to_vec())]);
        // Re-parses happen per integer byte and per completed string, not
        // per fragment.
        assert!(decoder.parses < 16, "{} parses for {} fragments", decoder.parses, block.len());
    }

    #[test]
    fn limits_still_apply_mid_string() {
        let mut decoder = HpackDecoder::new();
        decoder.set_max_string_size_bytes(100);
        decoder.start_decoding_block().unwrap();
        let block = long_literal(b"x", &[b'v'; 200]);
        let mut result = Ok(());
        for byte in block.chunks(1) {
            result = decoder.decode_fragment(byte, &mut |_, _| {});
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result, Err(HpackDecodeError::StringTooLong { length: 200, limit: 100 }));
    }

    #[test]
    fn invalid_index() {
        let mut decoder = HpackDecoder::new();
        assert_eq!(decode_block(&mut decoder, &[0x80]), Err(HpackDecodeError::InvalidIndex(0)));
        assert_eq!(decoder.error(), Some(HpackDecodeError::InvalidIndex(0)));
        assert_eq!(decoder.start_decoding_block(), Err(HpackDecodeError::DecoderFailed));

        let mut decoder = HpackDecoder::new();
        assert_eq!(decode_block(&mut decoder, &[0xbe]), Err(HpackDecodeError::InvalidIndex(62)));
    }

    #[test]
    fn truncated_block() {
        let mut decoder = HpackDecoder::new();
        assert_eq!(decode_block(&mut decoder, &[0x40, 0x03, b'a']), Err(HpackDecodeError::TruncatedBlock));
    }

    #[test]
    fn string_limit() {
        let mut decoder = HpackDecoder::new();
        decoder.set_max_string_size_bytes(2);
        assert_eq!(
            decode_block(&mut decoder, &[0x40, 0x03]),
            Err(HpackDecodeError::StringTooLong { length: 3, limit: 2 })
        );
    }

    #[test]
    fn fragment_before_start() {
        let mut decoder = HpackDecoder::new();
        assert_eq!(
            decoder.decode_fragment(&[0x82], &mut |_, _| {}),
            Err(HpackDecodeError::BlockNotStarted)
        );
    }

    #[test]
    fn size_update_only_at_block_start() {
        let mut decoder = HpackDecoder::new();
        assert_eq!(decode_block(&mut decoder, &[0x20, 0x82]).unwrap().len(), 1);
        assert_eq!(decoder.header_table().max_size(), 0);

        let mut decoder = HpackDecoder::new();
        assert_eq!(decode_block(&mut decoder, &[0x82, 0x20]), Err(HpackDecodeError::SizeUpdateNotAllowed));
    }

    #[test]
    fn at_most_two_size_updates() {
        let mut decoder = HpackDecoder::new();
        assert!(decode_block(&mut decoder, &[0x20, 0x3f, 0xe1, 0x1f]).is_ok());
        assert_eq!(decoder.header_table().max_size(), 4096);

        let mut decoder = HpackDecoder::new();
        assert_eq!(decode_block(&mut decoder, &[0x20, 0x20, 0x20]), Err(HpackDecodeError::SizeUpdateNotAllowed));
    }

    #[test]
    fn size_update_above_setting() {
        let mut decoder = HpackDecoder::new();
        // 4097
        assert_eq!(
            decode_block(&mut decoder, &[0x3f, 0xe2, 0x1f]),
            Err(HpackDecodeError::SizeUpdateAboveSetting { size: 4097, limit: 4096 })
        );
    }

    #[test]
    fn lowered_setting_requires_update() {
        let mut decoder = HpackDecoder::new();
        decoder.apply_header_table_size_setting(1024);
        assert_eq!(decode_block(&mut decoder, &[0x82]), Err(HpackDecodeError::MissingSizeUpdate));

        let mut decoder = HpackDecoder::new();
        decoder.apply_header_table_size_setting(1024);
        assert_eq!(decode_block(&mut decoder, &[]), Err(HpackDecodeError::MissingSizeUpdate));

        let mut decoder = HpackDecoder::new();
        decoder.apply_header_table_size_setting(1024);
        decoder.apply_header_table_size_setting(2048);
        // 2048 is above the low water mark of 1024.
        assert_eq!(
            decode_block(&mut decoder, &[0x3f, 0xe1, 0x0f]),
            Err(HpackDecodeError::SizeUpdateAboveLowWaterMark { size: 2048, limit: 1024 })
        );

        let mut decoder = HpackDecoder::new();
        decoder.apply_header_table_size_setting(1024);
        decoder.apply_header_table_size_setting(2048);
        assert!(decode_block(&mut decoder, &hex!("3fe107 3fe10f 82")).is_ok());
        assert_eq!(decoder.header_table().max_size(), 2048);
    }
}
