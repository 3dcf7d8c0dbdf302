//! Bit-granular output buffer for HPACK encoding.

use alloc::vec::Vec;

use super::constants::HpackPrefix;

/// Accumulates encoded representations, tracking a partially filled last
/// byte so that prefixes and integers can share an octet.
#[derive(Debug, Clone, Default)]
pub struct HpackOutputStream {
    buffer: Vec<u8>,
    /// Bits already used in the last byte of `buffer`; 0 means aligned.
    bit_offset: u8,
}

impl HpackOutputStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the low `bit_size` bits of `bits`, most significant first.
    pub fn append_bits(&mut self, bits: u8, bit_size: u8) {
        debug_assert!(bit_size > 0 && bit_size <= 8);
        debug_assert!(bit_size == 8 || bits >> bit_size == 0);
        let new_offset = self.bit_offset + bit_size;
        if self.bit_offset == 0 {
            self.buffer.push(bits << (8 - bit_size));
        } else if new_offset <= 8 {
            if let Some(last) = self.buffer.last_mut() {
                *last |= bits << (8 - new_offset);
            }
        } else {
            // Spills into a fresh byte.
            let spill = new_offset - 8;
            if let Some(last) = self.buffer.last_mut() {
                *last |= bits >> spill;
            }
            self.buffer.push(bits << (8 - spill));
        }
        self.bit_offset = new_offset % 8;
    }

    pub fn append_prefix(&mut self, prefix: HpackPrefix) {
        self.append_bits(prefix.bits, prefix.bit_size);
    }

    /// Appends whole bytes; the stream must be byte-aligned.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        debug_assert_eq!(self.bit_offset, 0);
        self.buffer.extend_from_slice(bytes);
    }

    /// Appends `value` as an HPACK integer (RFC 7541 §5.1) whose prefix
    /// fills the rest of the current byte.
    pub fn append_uint32(&mut self, value: u32) {
        // An aligned stream still has room for an 8-bit prefix.
        let prefix_bits = 8 - self.bit_offset;
        let max_first = ((1u16 << prefix_bits) - 1) as u32;
        if value < max_first {
            self.append_bits(value as u8, prefix_bits);
            return;
        }
        self.append_bits(max_first as u8, prefix_bits);
        let mut rest = value - max_first;
        while rest >= 0x80 {
            self.append_bits(0x80 | (rest & 0x7f) as u8, 8);
            rest >>= 7;
        }
        self.append_bits(rest as u8, 8);
    }

    /// Moves the whole buffer out. The stream must be byte-aligned.
    pub fn take_string(&mut self) -> Vec<u8> {
        debug_assert_eq!(self.bit_offset, 0);
        core::mem::take(&mut self.buffer)
    }

    /// Moves at most `max_size` bytes out, keeping the rest for later.
    pub fn bounded_take_string(&mut self, max_size: usize) -> Vec<u8> {
        if self.buffer.len() > max_size {
            let rest = self.buffer.split_off(max_size);
            core::mem::replace(&mut self.buffer, rest)
        } else {
            self.take_string()
        }
    }

    /// Bytes buffered, counting a partial last byte.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }
}
