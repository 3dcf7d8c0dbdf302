//! QUIC variable-length integers (RFC 9000 §16).
//!
//! The two most significant bits of the first byte give the encoded length:
//!
//! | prefix | bytes | value bits |
//! |--------|-------|------------|
//! | `00`   | 1     | 6          |
//! | `01`   | 2     | 14         |
//! | `10`   | 4     | 30         |
//! | `11`   | 8     | 62         |
//!
//! Decoding never rejects a prefix; it only fails when the input is shorter
//! than the length the prefix announces.

use crate::error::Error;

/// Largest value a var-int62 can carry (2^62 - 1).
pub const MAX_VARINT: u64 = (1 << 62) - 1;

/// Encoded length in bytes of `value`, which must not exceed [`MAX_VARINT`].
pub const fn varint_len(value: u64) -> usize {
    match value {
        0..=0x3f => 1,
        0x40..=0x3fff => 2,
        0x4000..=0x3fff_ffff => 4,
        _ => 8,
    }
}

/// Length announced by the prefix bits of a first byte.
pub const fn varint_len_from_first_byte(first: u8) -> usize {
    1 << (first >> 6)
}

/// Decode a var-int62 from the front of `buf`.
///
/// Returns `(value, bytes_consumed)`.
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize), Error> {
    let first = *buf.first().ok_or(Error::BufferTooSmall { needed: 1 })?;
    let len = varint_len_from_first_byte(first);
    let bytes = buf.get(..len).ok_or(Error::BufferTooSmall { needed: len })?;

    let value = bytes[1..]
        .iter()
        .fold(u64::from(first & 0x3f), |acc, &b| (acc << 8) | u64::from(b));
    Ok((value, len))
}

/// Encode `value` into the front of `buf` using the shortest form.
///
/// Returns the number of bytes written.
pub fn encode_varint(value: u64, buf: &mut [u8]) -> Result<usize, Error> {
    if value > MAX_VARINT {
        return Err(Error::VarIntOutOfRange(value));
    }
    let len = varint_len(value);
    let out = buf
        .get_mut(..len)
        .ok_or(Error::BufferTooSmall { needed: len })?;

    let be = value.to_be_bytes();
    out.copy_from_slice(&be[8 - len..]);
    // Length tag: 1 -> 00, 2 -> 01, 4 -> 10, 8 -> 11.
    out[0] |= (len.trailing_zeros() as u8) << 6;
    Ok(len)
}
