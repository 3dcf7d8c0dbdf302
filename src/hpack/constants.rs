//! Representation prefixes and fixed sizes (RFC 7541 §5, §6).

/// Leading bits that select a representation or string encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpackPrefix {
    /// Prefix value, right-aligned.
    pub bits: u8,
    /// Number of bits the prefix occupies.
    pub bit_size: u8,
}

impl HpackPrefix {
    const fn new(bits: u8, bit_size: u8) -> Self {
        Self { bits, bit_size }
    }

    /// Bits left in the first octet for the integer that follows.
    pub const fn integer_bits(self) -> u8 {
        8 - self.bit_size
    }

    /// True if `byte` starts with this prefix.
    pub const fn matches(self, byte: u8) -> bool {
        byte >> (8 - self.bit_size) == self.bits
    }
}

pub const STRING_LITERAL_IDENTITY_ENCODED: HpackPrefix = HpackPrefix::new(0x0, 1);
pub const STRING_LITERAL_HUFFMAN_ENCODED: HpackPrefix = HpackPrefix::new(0x1, 1);

pub const INDEXED_OPCODE: HpackPrefix = HpackPrefix::new(0b1, 1);
pub const LITERAL_INCREMENTAL_INDEX_OPCODE: HpackPrefix = HpackPrefix::new(0b01, 2);
pub const LITERAL_NO_INDEX_OPCODE: HpackPrefix = HpackPrefix::new(0b0000, 4);
pub const LITERAL_NEVER_INDEX_OPCODE: HpackPrefix = HpackPrefix::new(0b0001, 4);
pub const HEADER_TABLE_SIZE_UPDATE_OPCODE: HpackPrefix = HpackPrefix::new(0b001, 3);

/// SETTINGS_HEADER_TABLE_SIZE until the peer says otherwise.
pub const DEFAULT_HEADER_TABLE_SIZE_SETTING: u32 = 4096;

/// First byte of every pseudo-header name.
pub const PSEUDO_HEADER_PREFIX: u8 = b':';

/// Per-entry overhead added to name and value lengths (RFC 7541 §4.1).
pub const ENTRY_SIZE_OVERHEAD: usize = 32;

pub const STATIC_TABLE_SIZE: usize = 61;

/// Longest code in the HPACK Huffman code, in bits.
pub const MAX_HUFFMAN_CODE_LENGTH: usize = 30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_select_representations() {
        assert!(INDEXED_OPCODE.matches(0x82));
        assert!(LITERAL_INCREMENTAL_INDEX_OPCODE.matches(0x40));
        assert!(!LITERAL_INCREMENTAL_INDEX_OPCODE.matches(0x82));
        assert!(HEADER_TABLE_SIZE_UPDATE_OPCODE.matches(0x3f));
        assert!(LITERAL_NEVER_INDEX_OPCODE.matches(0x10));
        assert!(LITERAL_NO_INDEX_OPCODE.matches(0x0f));
        assert_eq!(INDEXED_OPCODE.integer_bits(), 7);
        assert_eq!(LITERAL_NO_INDEX_OPCODE.integer_bits(), 4);
    }
}
