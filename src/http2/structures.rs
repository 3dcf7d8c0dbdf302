//! Fixed-size wire structures.
//!
//! ```text
//!  Frame header (9)      PRIORITY (5)              GOAWAY fixed part (8)
//!  +--------------+      +-+-------------------+   +-+-------------------+
//!  | Length (24)  |      |E| Dependency (31)   |   |R| Last-Stream-ID   |
//!  +------+-------+      +-+-------------------+   +-+-------------------+
//!  |Type 8|Flags 8|      | Weight (8)  |             | Error Code (32)    |
//!  +-+----+-------+      +-------------+             +--------------------+
//!  |R| Stream (31)|
//!  +-+------------+
//! ```
//!
//! `decode` has a precondition instead of an error path: the caller checks
//! that [`Http2Structure::ENCODED_SIZE`] bytes are available (directly, or by
//! way of [`StructureDecoder`](super::StructureDecoder)).

use alloc::vec::Vec;
use core::fmt;

use super::constants::*;
use super::decode_buffer::DecodeBuffer;

/// A structure with a fixed wire size.
pub trait Http2Structure: Sized + Default + fmt::Debug {
    const ENCODED_SIZE: usize;

    /// Decode from `db`, which must hold at least `ENCODED_SIZE` bytes.
    fn decode(db: &mut DecodeBuffer<'_>) -> Self;

    /// Append exactly `ENCODED_SIZE` bytes to `out`.
    fn encode(&self, out: &mut Vec<u8>);
}

fn put_u31(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&(value & STREAM_ID_MASK).to_be_bytes());
}

// ---------------------------------------------------------------------------
// Frame header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    /// 24-bit payload length.
    pub payload_length: u32,
    pub frame_type: FrameType,
    pub flags: u8,
    /// 31-bit stream identifier; the reserved bit is never surfaced.
    pub stream_id: u32,
}

impl FrameHeader {
    pub fn new(payload_length: u32, frame_type: FrameType, flags: u8, stream_id: u32) -> Self {
        Self {
            payload_length,
            frame_type,
            flags,
            stream_id: stream_id & STREAM_ID_MASK,
        }
    }

    pub fn is_end_stream(&self) -> bool {
        matches!(self.frame_type, FrameType::Data | FrameType::Headers)
            && self.flags & FLAG_END_STREAM != 0
    }

    pub fn is_ack(&self) -> bool {
        matches!(self.frame_type, FrameType::Settings | FrameType::Ping)
            && self.flags & FLAG_ACK != 0
    }

    pub fn is_end_headers(&self) -> bool {
        matches!(
            self.frame_type,
            FrameType::Headers | FrameType::PushPromise | FrameType::Continuation
        ) && self.flags & FLAG_END_HEADERS != 0
    }

    pub fn is_padded(&self) -> bool {
        matches!(
            self.frame_type,
            FrameType::Data | FrameType::Headers | FrameType::PushPromise
        ) && self.flags & FLAG_PADDED != 0
    }

    pub fn has_priority(&self) -> bool {
        self.frame_type == FrameType::Headers && self.flags & FLAG_PRIORITY != 0
    }

    pub fn has_any_flags(&self, mask: u8) -> bool {
        self.flags & mask != 0
    }

    pub fn retain_flags(&mut self, mask: u8) {
        self.flags &= mask;
    }

    /// True when the nine bytes read as `HTTP/1.x ...` rather than a frame,
    /// i.e. the peer answered with HTTP/1 instead of HTTP/2.
    pub fn is_probable_http_response(&self) -> bool {
        self.payload_length == 0x48_5454
            && self.frame_type == FrameType::from_u8(b'P')
            && self.flags == b'/'
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "length={}, type={}, flags={}, stream={}",
            self.payload_length,
            self.frame_type,
            flags_to_string(self.frame_type, self.flags),
            self.stream_id
        )
    }
}

impl Http2Structure for FrameHeader {
    const ENCODED_SIZE: usize = FRAME_HEADER_SIZE;

    fn decode(db: &mut DecodeBuffer<'_>) -> Self {
        let payload_length = db.decode_u24();
        let frame_type = FrameType::from_u8(db.decode_u8());
        let flags = db.decode_u8();
        let stream_id = db.decode_u31();
        Self {
            payload_length,
            frame_type,
            flags,
            stream_id,
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.payload_length.to_be_bytes()[1..]);
        out.push(self.frame_type.to_u8());
        out.push(self.flags);
        put_u31(out, self.stream_id);
    }
}

// ---------------------------------------------------------------------------
// Frame-specific fixed fields
// ---------------------------------------------------------------------------

/// PRIORITY fields, also optionally present at the front of HEADERS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityFields {
    pub stream_dependency: u32,
    /// Logical weight in 1..=256; the wire carries `weight - 1`.
    pub weight: u32,
    pub is_exclusive: bool,
}

impl Default for PriorityFields {
    fn default() -> Self {
        Self {
            stream_dependency: 0,
            weight: 1,
            is_exclusive: false,
        }
    }
}

impl Http2Structure for PriorityFields {
    const ENCODED_SIZE: usize = 5;

    fn decode(db: &mut DecodeBuffer<'_>) -> Self {
        let word = db.decode_u32();
        Self {
            stream_dependency: word & STREAM_ID_MASK,
            is_exclusive: word & !STREAM_ID_MASK != 0,
            weight: u32::from(db.decode_u8()) + 1,
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        debug_assert!((1..=256).contains(&self.weight));
        let mut word = self.stream_dependency & STREAM_ID_MASK;
        if self.is_exclusive {
            word |= !STREAM_ID_MASK;
        }
        out.extend_from_slice(&word.to_be_bytes());
        out.push(self.weight.wrapping_sub(1) as u8);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RstStreamFields {
    pub error_code: u32,
}

impl Http2Structure for RstStreamFields {
    const ENCODED_SIZE: usize = 4;

    fn decode(db: &mut DecodeBuffer<'_>) -> Self {
        Self {
            error_code: db.decode_u32(),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.error_code.to_be_bytes());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingFields {
    pub parameter: u16,
    pub value: u32,
}

impl Http2Structure for SettingFields {
    const ENCODED_SIZE: usize = 6;

    fn decode(db: &mut DecodeBuffer<'_>) -> Self {
        let parameter = db.decode_u16();
        let value = db.decode_u32();
        Self { parameter, value }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.parameter.to_be_bytes());
        out.extend_from_slice(&self.value.to_be_bytes());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushPromiseFields {
    pub promised_stream_id: u32,
}

impl Http2Structure for PushPromiseFields {
    const ENCODED_SIZE: usize = 4;

    fn decode(db: &mut DecodeBuffer<'_>) -> Self {
        Self {
            promised_stream_id: db.decode_u31(),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        put_u31(out, self.promised_stream_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingFields {
    pub opaque_bytes: [u8; 8],
}

impl PingFields {
    /// The opaque bytes read as a big-endian integer.
    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.opaque_bytes)
    }
}

impl Http2Structure for PingFields {
    const ENCODED_SIZE: usize = 8;

    fn decode(db: &mut DecodeBuffer<'_>) -> Self {
        let mut opaque_bytes = [0u8; 8];
        if let Ok(bytes) = db.read_bytes(8) {
            opaque_bytes.copy_from_slice(bytes);
        }
        Self { opaque_bytes }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.opaque_bytes);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoAwayFields {
    pub last_stream_id: u32,
    pub error_code: u32,
}

impl Http2Structure for GoAwayFields {
    const ENCODED_SIZE: usize = 8;

    fn decode(db: &mut DecodeBuffer<'_>) -> Self {
        let last_stream_id = db.decode_u31();
        let error_code = db.decode_u32();
        Self {
            last_stream_id,
            error_code,
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        put_u31(out, self.last_stream_id);
        out.extend_from_slice(&self.error_code.to_be_bytes());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowUpdateFields {
    /// Zero is decoded as-is; rejecting it is a stream-layer concern.
    pub window_size_increment: u32,
}

impl Http2Structure for WindowUpdateFields {
    const ENCODED_SIZE: usize = 4;

    fn decode(db: &mut DecodeBuffer<'_>) -> Self {
        Self {
            window_size_increment: db.decode_u31(),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        put_u31(out, self.window_size_increment);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AltSvcFields {
    pub origin_length: u16,
}

impl Http2Structure for AltSvcFields {
    const ENCODED_SIZE: usize = 2;

    fn decode(db: &mut DecodeBuffer<'_>) -> Self {
        Self {
            origin_length: db.decode_u16(),
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.origin_length.to_be_bytes());
    }
}
