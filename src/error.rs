//! Crate error types.
//!
//! Frame decoding reports problems through [`DecodeStatus`] and listener
//! callbacks, never through these types. `Error` covers the fallible
//! primitives (cursors, integers) and the HPACK and header-accounting layers.
//!
//! [`DecodeStatus`]: crate::http2::DecodeStatus

use thiserror::Error;

/// Top-level crate error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A read needed more bytes than were available.
    #[error("buffer too small, need {needed} bytes")]
    BufferTooSmall { needed: usize },
    /// Value cannot be represented as a QUIC variable-length integer.
    #[error("value {0} exceeds the varint range")]
    VarIntOutOfRange(u64),
    /// HPACK decoding failed.
    #[error("HPACK error: {0}")]
    Hpack(#[from] HpackDecodeError),
    /// The peer acknowledged header bytes that were never buffered for send.
    #[error("unsent header data acked: {length} bytes at offset {offset}")]
    UnsentDataAcked { offset: u64, length: u64 },
    /// A SETTINGS value is outside its permitted range.
    #[error("invalid value {value} for setting {id:#x}")]
    InvalidSetting { id: u16, value: u32 },
}

/// Reasons an HPACK header block is rejected (RFC 7541).
///
/// Any of these leaves the decoder unusable; the connection's compression
/// context is shared by every header block, so it cannot be resynchronized.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpackDecodeError {
    #[error("index {0} is not in the static or dynamic table")]
    InvalidIndex(u64),
    #[error("integer representation overflows")]
    IntegerOverflow,
    #[error("invalid Huffman-encoded string")]
    InvalidHuffman,
    #[error("string literal of {length} bytes exceeds limit of {limit}")]
    StringTooLong { length: u64, limit: usize },
    #[error("fragment of {length} bytes exceeds decode buffer limit of {limit}")]
    FragmentTooLarge { length: usize, limit: usize },
    #[error("dynamic table size update not allowed here")]
    SizeUpdateNotAllowed,
    #[error("dynamic table size update to {size} is above acknowledged setting {limit}")]
    SizeUpdateAboveSetting { size: u64, limit: usize },
    #[error("initial dynamic table size update to {size} is above low water mark {limit}")]
    SizeUpdateAboveLowWaterMark { size: u64, limit: usize },
    #[error("missing dynamic table size update")]
    MissingSizeUpdate,
    #[error("header block ended inside a representation")]
    TruncatedBlock,
    #[error("no header block in progress")]
    BlockNotStarted,
    #[error("decoder already failed")]
    DecoderFailed,
}
