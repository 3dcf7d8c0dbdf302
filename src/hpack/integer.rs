//! Prefix-integer decoding (RFC 7541 §5.1).
//!
//! Encoding lives in [`HpackOutputStream::append_uint32`], which packs the
//! prefix into whatever is left of the current byte.
//!
//! [`HpackOutputStream::append_uint32`]: super::HpackOutputStream::append_uint32

use crate::error::{Error, HpackDecodeError};

/// Continuation bytes accepted after the prefix; enough for any `u64`.
const MAX_CONTINUATION_BYTES: usize = 10;

/// Decodes an integer whose prefix is the low `prefix_bits` of `buf[0]`.
///
/// Returns the value and the number of bytes it occupied.
/// [`Error::BufferTooSmall`] means the integer continues past `buf`;
/// values that do not fit in a `u64` are rejected.
pub fn decode_integer(buf: &[u8], prefix_bits: u8) -> Result<(u64, usize), Error> {
    debug_assert!((1..=8).contains(&prefix_bits));
    let first = *buf.first().ok_or(Error::BufferTooSmall { needed: 1 })?;
    let max_prefix = (1u64 << prefix_bits) - 1;
    let mut value = u64::from(first) & max_prefix;
    if value < max_prefix {
        return Ok((value, 1));
    }

    for (i, &byte) in buf[1..].iter().enumerate() {
        if i == MAX_CONTINUATION_BYTES {
            return Err(HpackDecodeError::IntegerOverflow.into());
        }
        let shift = 7 * i as u32;
        let chunk = u64::from(byte & 0x7f)
            .checked_shl(shift)
            .filter(|c| c >> shift == u64::from(byte & 0x7f))
            .ok_or(HpackDecodeError::IntegerOverflow)?;
        value = value
            .checked_add(chunk)
            .ok_or(HpackDecodeError::IntegerOverflow)?;
        if byte & 0x80 == 0 {
            return Ok((value, i + 2));
        }
    }
    Err(Error::BufferTooSmall { needed: buf.len() + 1 })
}
