//! The HPACK Huffman code (RFC 7541 Appendix B).
//!
//! The code is canonical: within one length, codes increase with the symbol
//! id, and each length starts right after the previous one ends. That lets
//! the decoder work from three small per-length arrays instead of a tree.

use super::constants::MAX_HUFFMAN_CODE_LENGTH;
use super::output_stream::HpackOutputStream;
use crate::error::HpackDecodeError;
use alloc::vec::Vec;

/// Number of symbols: every octet plus EOS.
pub const HUFFMAN_SYMBOL_COUNT: usize = 257;

/// Id of the end-of-string symbol, which must never appear in a string.
pub const EOS_SYMBOL: u16 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpackHuffmanSymbol {
    /// Code bits, right-aligned.
    pub code: u32,
    pub length: u8,
    pub id: u16,
}

const fn sym(code: u32, length: u8, id: u16) -> HpackHuffmanSymbol {
    HpackHuffmanSymbol { code, length, id }
}

/// The code from RFC 7541 Appendix B, indexed by symbol id.
pub static HPACK_HUFFMAN_CODE: [HpackHuffmanSymbol; HUFFMAN_SYMBOL_COUNT] = [
    sym(0x1ff8, 13, 0),
    sym(0x7fffd8, 23, 1),
    sym(0xfffffe2, 28, 2),
    sym(0xfffffe3, 28, 3),
    sym(0xfffffe4, 28, 4),
    sym(0xfffffe5, 28, 5),
    sym(0xfffffe6, 28, 6),
    sym(0xfffffe7, 28, 7),
    sym(0xfffffe8, 28, 8),
    sym(0xffffea, 24, 9),
    sym(0x3ffffffc, 30, 10),
    sym(0xfffffe9, 28, 11),
    sym(0xfffffea, 28, 12),
    sym(0x3ffffffd, 30, 13),
    sym(0xfffffeb, 28, 14),
    sym(0xfffffec, 28, 15),
    sym(0xfffffed, 28, 16),
    sym(0xfffffee, 28, 17),
    sym(0xfffffef, 28, 18),
    sym(0xffffff0, 28, 19),
    sym(0xffffff1, 28, 20),
    sym(0xffffff2, 28, 21),
    sym(0x3ffffffe, 30, 22),
    sym(0xffffff3, 28, 23),
    sym(0xffffff4, 28, 24),
    sym(0xffffff5, 28, 25),
    sym(0xffffff6, 28, 26),
    sym(0xffffff7, 28, 27),
    sym(0xffffff8, 28, 28),
    sym(0xffffff9, 28, 29),
    sym(0xffffffa, 28, 30),
    sym(0xffffffb, 28, 31),
    sym(0x14, 6, 32),
    sym(0x3f8, 10, 33),
    sym(0x3f9, 10, 34),
    sym(0xffa, 12, 35),
    sym(0x1ff9, 13, 36),
    sym(0x15, 6, 37),
    sym(0xf8, 8, 38),
    sym(0x7fa, 11, 39),
    sym(0x3fa, 10, 40),
    sym(0x3fb, 10, 41),
    sym(0xf9, 8, 42),
    sym(0x7fb, 11, 43),
    sym(0xfa, 8, 44),
    sym(0x16, 6, 45),
    sym(0x17, 6, 46),
    sym(0x18, 6, 47),
    sym(0x0, 5, 48),
    sym(0x1, 5, 49),
    sym(0x2, 5, 50),
    sym(0x19, 6, 51),
    sym(0x1a, 6, 52),
    sym(0x1b, 6, 53),
    sym(0x1c, 6, 54),
    sym(0x1d, 6, 55),
    sym(0x1e, 6, 56),
    sym(0x1f, 6, 57),
    sym(0x5c, 7, 58),
    sym(0xfb, 8, 59),
    sym(0x7ffc, 15, 60),
    sym(0x20, 6, 61),
    sym(0xffb, 12, 62),
    sym(0x3fc, 10, 63),
    sym(0x1ffa, 13, 64),
    sym(0x21, 6, 65),
    sym(0x5d, 7, 66),
    sym(0x5e, 7, 67),
    sym(0x5f, 7, 68),
    sym(0x60, 7, 69),
    sym(0x61, 7, 70),
    sym(0x62, 7, 71),
    sym(0x63, 7, 72),
    sym(0x64, 7, 73),
    sym(0x65, 7, 74),
    sym(0x66, 7, 75),
    sym(0x67, 7, 76),
    sym(0x68, 7, 77),
    sym(0x69, 7, 78),
    sym(0x6a, 7, 79),
    sym(0x6b, 7, 80),
    sym(0x6c, 7, 81),
    sym(0x6d, 7, 82),
    sym(0x6e, 7, 83),
    sym(0x6f, 7, 84),
    sym(0x70, 7, 85),
    sym(0x71, 7, 86),
    sym(0x72, 7, 87),
    sym(0xfc, 8, 88),
    sym(0x73, 7, 89),
    sym(0xfd, 8, 90),
    sym(0x1ffb, 13, 91),
    sym(0x7fff0, 19, 92),
    sym(0x1ffc, 13, 93),
    sym(0x3ffc, 14, 94),
    sym(0x22, 6, 95),
    sym(0x7ffd, 15, 96),
    sym(0x3, 5, 97),
    sym(0x23, 6, 98),
    sym(0x4, 5, 99),
    sym(0x24, 6, 100),
    sym(0x5, 5, 101),
    sym(0x25, 6, 102),
    sym(0x26, 6, 103),
    sym(0x27, 6, 104),
    sym(0x6, 5, 105),
    sym(0x74, 7, 106),
    sym(0x75, 7, 107),
    sym(0x28, 6, 108),
    sym(0x29, 6, 109),
    sym(0x2a, 6, 110),
    sym(0x7, 5, 111),
    sym(0x2b, 6, 112),
    sym(0x76, 7, 113),
    sym(0x2c, 6, 114),
    sym(0x8, 5, 115),
    sym(0x9, 5, 116),
    sym(0x2d, 6, 117),
    sym(0x77, 7, 118),
    sym(0x78, 7, 119),
    sym(0x79, 7, 120),
    sym(0x7a, 7, 121),
    sym(0x7b, 7, 122),
    sym(0x7ffe, 15, 123),
    sym(0x7fc, 11, 124),
    sym(0x3ffd, 14, 125),
    sym(0x1ffd, 13, 126),
    sym(0xffffffc, 28, 127),
    sym(0xfffe6, 20, 128),
    sym(0x3fffd2, 22, 129),
    sym(0xfffe7, 20, 130),
    sym(0xfffe8, 20, 131),
    sym(0x3fffd3, 22, 132),
    sym(0x3fffd4, 22, 133),
    sym(0x3fffd5, 22, 134),
    sym(0x7fffd9, 23, 135),
    sym(0x3fffd6, 22, 136),
    sym(0x7fffda, 23, 137),
    sym(0x7fffdb, 23, 138),
    sym(0x7fffdc, 23, 139),
    sym(0x7fffdd, 23, 140),
    sym(0x7fffde, 23, 141),
    sym(0xffffeb, 24, 142),
    sym(0x7fffdf, 23, 143),
    sym(0xffffec, 24, 144),
    sym(0xffffed, 24, 145),
    sym(0x3fffd7, 22, 146),
    sym(0x7fffe0, 23, 147),
    sym(0xffffee, 24, 148),
    sym(0x7fffe1, 23, 149),
    sym(0x7fffe2, 23, 150),
    sym(0x7fffe3, 23, 151),
    sym(0x7fffe4, 23, 152),
    sym(0x1fffdc, 21, 153),
    sym(0x3fffd8, 22, 154),
    sym(0x7fffe5, 23, 155),
    sym(0x3fffd9, 22, 156),
    sym(0x7fffe6, 23, 157),
    sym(0x7fffe7, 23, 158),
    sym(0xffffef, 24, 159),
    sym(0x3fffda, 22, 160),
    sym(0x1fffdd, 21, 161),
    sym(0xfffe9, 20, 162),
    sym(0x3fffdb, 22, 163),
    sym(0x3fffdc, 22, 164),
    sym(0x7fffe8, 23, 165),
    sym(0x7fffe9, 23, 166),
    sym(0x1fffde, 21, 167),
    sym(0x7fffea, 23, 168),
    sym(0x3fffdd, 22, 169),
    sym(0x3fffde, 22, 170),
    sym(0xfffff0, 24, 171),
    sym(0x1fffdf, 21, 172),
    sym(0x3fffdf, 22, 173),
    sym(0x7fffeb, 23, 174),
    sym(0x7fffec, 23, 175),
    sym(0x1fffe0, 21, 176),
    sym(0x1fffe1, 21, 177),
    sym(0x3fffe0, 22, 178),
    sym(0x1fffe2, 21, 179),
    sym(0x7fffed, 23, 180),
    sym(0x3fffe1, 22, 181),
    sym(0x7fffee, 23, 182),
    sym(0x7fffef, 23, 183),
    sym(0xfffea, 20, 184),
    sym(0x3fffe2, 22, 185),
    sym(0x3fffe3, 22, 186),
    sym(0x3fffe4, 22, 187),
    sym(0x7ffff0, 23, 188),
    sym(0x3fffe5, 22, 189),
    sym(0x3fffe6, 22, 190),
    sym(0x7ffff1, 23, 191),
    sym(0x3ffffe0, 26, 192),
    sym(0x3ffffe1, 26, 193),
    sym(0xfffeb, 20, 194),
    sym(0x7fff1, 19, 195),
    sym(0x3fffe7, 22, 196),
    sym(0x7ffff2, 23, 197),
    sym(0x3fffe8, 22, 198),
    sym(0x1ffffec, 25, 199),
    sym(0x3ffffe2, 26, 200),
    sym(0x3ffffe3, 26, 201),
    sym(0x3ffffe4, 26, 202),
    sym(0x7ffffde, 27, 203),
    sym(0x7ffffdf, 27, 204),
    sym(0x3ffffe5, 26, 205),
    sym(0xfffff1, 24, 206),
    sym(0x1ffffed, 25, 207),
    sym(0x7fff2, 19, 208),
    sym(0x1fffe3, 21, 209),
    sym(0x3ffffe6, 26, 210),
    sym(0x7ffffe0, 27, 211),
    sym(0x7ffffe1, 27, 212),
    sym(0x3ffffe7, 26, 213),
    sym(0x7ffffe2, 27, 214),
    sym(0xfffff2, 24, 215),
    sym(0x1fffe4, 21, 216),
    sym(0x1fffe5, 21, 217),
    sym(0x3ffffe8, 26, 218),
    sym(0x3ffffe9, 26, 219),
    sym(0xffffffd, 28, 220),
    sym(0x7ffffe3, 27, 221),
    sym(0x7ffffe4, 27, 222),
    sym(0x7ffffe5, 27, 223),
    sym(0xfffec, 20, 224),
    sym(0xfffff3, 24, 225),
    sym(0xfffed, 20, 226),
    sym(0x1fffe6, 21, 227),
    sym(0x3fffe9, 22, 228),
    sym(0x1fffe7, 21, 229),
    sym(0x1fffe8, 21, 230),
    sym(0x7ffff3, 23, 231),
    sym(0x3fffea, 22, 232),
    sym(0x3fffeb, 22, 233),
    sym(0x1ffffee, 25, 234),
    sym(0x1ffffef, 25, 235),
    sym(0xfffff4, 24, 236),
    sym(0xfffff5, 24, 237),
    sym(0x3ffffea, 26, 238),
    sym(0x7ffff4, 23, 239),
    sym(0x3ffffeb, 26, 240),
    sym(0x7ffffe6, 27, 241),
    sym(0x3ffffec, 26, 242),
    sym(0x3ffffed, 26, 243),
    sym(0x7ffffe7, 27, 244),
    sym(0x7ffffe8, 27, 245),
    sym(0x7ffffe9, 27, 246),
    sym(0x7ffffea, 27, 247),
    sym(0x7ffffeb, 27, 248),
    sym(0xffffffe, 28, 249),
    sym(0x7ffffec, 27, 250),
    sym(0x7ffffed, 27, 251),
    sym(0x7ffffee, 27, 252),
    sym(0x7ffffef, 27, 253),
    sym(0x7fffff0, 27, 254),
    sym(0x3ffffee, 26, 255),
    sym(0x3fffffff, 30, 256),
];

const LENGTH_SLOTS: usize = MAX_HUFFMAN_CODE_LENGTH + 1;

/// Encoding and decoding tables derived from a canonical code.
#[derive(Debug, Clone)]
pub struct HpackHuffmanTable {
    codes: [HpackHuffmanSymbol; HUFFMAN_SYMBOL_COUNT],
    /// Number of codes of each length.
    count: [u16; LENGTH_SLOTS],
    /// Smallest code of each length.
    first_code: [u32; LENGTH_SLOTS],
    /// Position in `by_code` of the first symbol of each length.
    offset: [u16; LENGTH_SLOTS],
    /// Symbol ids ordered by (length, code).
    by_code: [u16; HUFFMAN_SYMBOL_COUNT],
}

impl HpackHuffmanTable {
    /// Builds the tables assuming `codes` is canonical and indexed by id.
    const fn build(codes: &[HpackHuffmanSymbol; HUFFMAN_SYMBOL_COUNT]) -> Self {
        let mut count = [0u16; LENGTH_SLOTS];
        let mut i = 0;
        while i < HUFFMAN_SYMBOL_COUNT {
            count[codes[i].length as usize] += 1;
            i += 1;
        }

        let mut offset = [0u16; LENGTH_SLOTS];
        let mut first_code = [0u32; LENGTH_SLOTS];
        let mut next_offset = 0u16;
        let mut code = 0u32;
        let mut len = 1;
        while len < LENGTH_SLOTS {
            offset[len] = next_offset;
            first_code[len] = code;
            next_offset += count[len];
            code = (code + count[len] as u32) << 1;
            len += 1;
        }

        let mut by_code = [0u16; HUFFMAN_SYMBOL_COUNT];
        let mut fill = offset;
        i = 0;
        while i < HUFFMAN_SYMBOL_COUNT {
            let len = codes[i].length as usize;
            by_code[fill[len] as usize] = i as u16;
            fill[len] += 1;
            i += 1;
        }

        Self { codes: *codes, count, first_code, offset, by_code }
    }

    /// Builds a table from `symbols`, which must hold one entry per id in id
    /// order and form a canonical code. On failure returns the id of the
    /// first offending symbol.
    pub fn initialize(symbols: &[HpackHuffmanSymbol]) -> Result<Self, u16> {
        if symbols.len() != HUFFMAN_SYMBOL_COUNT {
            return Err(symbols.len().min(HUFFMAN_SYMBOL_COUNT) as u16);
        }
        let mut codes = [sym(0, 0, 0); HUFFMAN_SYMBOL_COUNT];
        for (i, s) in symbols.iter().enumerate() {
            let len = usize::from(s.length);
            if usize::from(s.id) != i || len == 0 || len > MAX_HUFFMAN_CODE_LENGTH {
                return Err(i as u16);
            }
            codes[i] = *s;
        }

        let table = Self::build(&codes);
        for len in 1..LENGTH_SLOTS {
            let start = usize::from(table.offset[len]);
            let end = start + usize::from(table.count[len]);
            for (n, &id) in table.by_code[start..end].iter().enumerate() {
                if codes[usize::from(id)].code != table.first_code[len] + n as u32 {
                    return Err(id);
                }
            }
        }
        Ok(table)
    }

    pub fn code(&self, id: u8) -> HpackHuffmanSymbol {
        self.codes[usize::from(id)]
    }

    /// Length of `input` once encoded, in whole bytes.
    pub fn encoded_size(&self, input: &[u8]) -> usize {
        let bits: usize = input
            .iter()
            .map(|&b| usize::from(self.codes[usize::from(b)].length))
            .sum();
        bits.div_ceil(8)
    }

    /// Appends the Huffman encoding of `input`, padded with the most
    /// significant bits of EOS up to the next byte boundary.
    pub fn encode_string(&self, input: &[u8], out: &mut HpackOutputStream) {
        let mut bits_written = 0usize;
        for &b in input {
            let HpackHuffmanSymbol { code, length, .. } = self.codes[usize::from(b)];
            let mut remaining = length;
            while remaining > 0 {
                let chunk = remaining.min(8);
                remaining -= chunk;
                out.append_bits(((code >> remaining) & ((1 << chunk) - 1)) as u8, chunk);
            }
            bits_written += usize::from(length);
        }
        let pad = (8 - bits_written % 8) % 8;
        if pad > 0 {
            out.append_bits((1u8 << pad) - 1, pad as u8);
        }
    }

    /// Decodes a complete Huffman-encoded string into `out`.
    pub fn decode_string(&self, input: &[u8], out: &mut Vec<u8>) -> Result<(), HpackDecodeError> {
        let mut code = 0u32;
        let mut len = 0usize;
        for &byte in input {
            for shift in (0..8).rev() {
                code = (code << 1) | u32::from((byte >> shift) & 1);
                len += 1;
                let index = code.wrapping_sub(self.first_code[len]);
                if index < u32::from(self.count[len]) {
                    let id = self.by_code[usize::from(self.offset[len]) + index as usize];
                    if id == EOS_SYMBOL {
                        return Err(HpackDecodeError::InvalidHuffman);
                    }
                    out.push(id as u8);
                    code = 0;
                    len = 0;
                } else if len == MAX_HUFFMAN_CODE_LENGTH {
                    return Err(HpackDecodeError::InvalidHuffman);
                }
            }
        }
        // Leftover bits are padding: fewer than eight, all ones.
        if len > 7 || code != (1u32 << len) - 1 {
            return Err(HpackDecodeError::InvalidHuffman);
        }
        Ok(())
    }
}

static HUFFMAN_TABLE: HpackHuffmanTable = HpackHuffmanTable::build(&HPACK_HUFFMAN_CODE);

/// The process-wide table for [`HPACK_HUFFMAN_CODE`].
pub fn obtain_hpack_huffman_table() -> &'static HpackHuffmanTable {
    &HUFFMAN_TABLE
}
