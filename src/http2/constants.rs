//! HTTP/2 wire constants (RFC 9113 §6, §7, RFC 7838 for ALTSVC).

use core::fmt;

/// Size of the common frame header.
pub const FRAME_HEADER_SIZE: usize = 9;

/// Initial SETTINGS_MAX_FRAME_SIZE; larger payloads need a peer setting.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16_384;

/// Largest payload length the 24-bit length field can express.
pub const MAX_PAYLOAD_LENGTH: u32 = (1 << 24) - 1;

/// Mask clearing the reserved bit of a 31-bit stream identifier.
pub const STREAM_ID_MASK: u32 = 0x7fff_ffff;

// Flag bits. The same bit can mean different things for different types.
pub const FLAG_END_STREAM: u8 = 0x01;
pub const FLAG_ACK: u8 = 0x01;
pub const FLAG_END_HEADERS: u8 = 0x04;
pub const FLAG_PADDED: u8 = 0x08;
pub const FLAG_PRIORITY: u8 = 0x20;

/// HTTP/2 frame type.
///
/// Types this crate has a payload decoder for get their own variant; every
/// other value is carried through as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameType {
    #[default]
    Data,
    Headers,
    Priority,
    RstStream,
    Settings,
    PushPromise,
    Ping,
    GoAway,
    WindowUpdate,
    Continuation,
    AltSvc,
    Unknown(u8),
}

impl FrameType {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0x0 => Self::Data,
            0x1 => Self::Headers,
            0x2 => Self::Priority,
            0x3 => Self::RstStream,
            0x4 => Self::Settings,
            0x5 => Self::PushPromise,
            0x6 => Self::Ping,
            0x7 => Self::GoAway,
            0x8 => Self::WindowUpdate,
            0x9 => Self::Continuation,
            0xa => Self::AltSvc,
            other => Self::Unknown(other),
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Data => 0x0,
            Self::Headers => 0x1,
            Self::Priority => 0x2,
            Self::RstStream => 0x3,
            Self::Settings => 0x4,
            Self::PushPromise => 0x5,
            Self::Ping => 0x6,
            Self::GoAway => 0x7,
            Self::WindowUpdate => 0x8,
            Self::Continuation => 0x9,
            Self::AltSvc => 0xa,
            Self::Unknown(other) => other,
        }
    }

    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Flags that carry meaning for this type; the rest are cleared before
    /// the payload is decoded. Unknown types keep every flag.
    pub const fn valid_flags(self) -> u8 {
        match self {
            Self::Data => FLAG_END_STREAM | FLAG_PADDED,
            Self::Headers => FLAG_END_STREAM | FLAG_END_HEADERS | FLAG_PADDED | FLAG_PRIORITY,
            Self::Settings | Self::Ping => FLAG_ACK,
            Self::PushPromise => FLAG_END_HEADERS | FLAG_PADDED,
            Self::Continuation => FLAG_END_HEADERS,
            Self::Unknown(_) => 0xff,
            Self::Priority | Self::RstStream | Self::GoAway | Self::WindowUpdate | Self::AltSvc => 0,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => f.write_str("DATA"),
            Self::Headers => f.write_str("HEADERS"),
            Self::Priority => f.write_str("PRIORITY"),
            Self::RstStream => f.write_str("RST_STREAM"),
            Self::Settings => f.write_str("SETTINGS"),
            Self::PushPromise => f.write_str("PUSH_PROMISE"),
            Self::Ping => f.write_str("PING"),
            Self::GoAway => f.write_str("GOAWAY"),
            Self::WindowUpdate => f.write_str("WINDOW_UPDATE"),
            Self::Continuation => f.write_str("CONTINUATION"),
            Self::AltSvc => f.write_str("ALTSVC"),
            Self::Unknown(t) => write!(f, "UnknownFrameType({t})"),
        }
    }
}

/// Renders the names of the set flags that are meaningful for `frame_type`,
/// e.g. `END_STREAM|PADDED`. Bits with no name are shown in hex.
pub fn flags_to_string(frame_type: FrameType, flags: u8) -> alloc::string::String {
    use alloc::string::String;
    use core::fmt::Write;

    fn push(out: &mut String, name: &str) {
        if !out.is_empty() {
            out.push('|');
        }
        out.push_str(name);
    }

    let mut out = String::new();
    let mut rest = flags;
    let mut take = |bit: u8, name: &str, out: &mut String| {
        if rest & bit != 0 {
            rest &= !bit;
            push(out, name);
        }
    };
    match frame_type {
        FrameType::Data => {
            take(FLAG_END_STREAM, "END_STREAM", &mut out);
            take(FLAG_PADDED, "PADDED", &mut out);
        }
        FrameType::Headers => {
            take(FLAG_END_STREAM, "END_STREAM", &mut out);
            take(FLAG_END_HEADERS, "END_HEADERS", &mut out);
            take(FLAG_PADDED, "PADDED", &mut out);
            take(FLAG_PRIORITY, "PRIORITY", &mut out);
        }
        FrameType::Settings | FrameType::Ping => take(FLAG_ACK, "ACK", &mut out),
        FrameType::PushPromise => {
            take(FLAG_END_HEADERS, "END_HEADERS", &mut out);
            take(FLAG_PADDED, "PADDED", &mut out);
        }
        FrameType::Continuation => take(FLAG_END_HEADERS, "END_HEADERS", &mut out),
        _ => {}
    }
    if rest != 0 {
        push(&mut out, "");
        let _ = write!(out, "0x{rest:02x}");
    }
    out
}

/// HTTP/2 error codes (RFC 9113 §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Http2ErrorCode {
    NoError = 0x0,
    ProtocolError = 0x1,
    InternalError = 0x2,
    FlowControlError = 0x3,
    SettingsTimeout = 0x4,
    StreamClosed = 0x5,
    FrameSizeError = 0x6,
    RefusedStream = 0x7,
    Cancel = 0x8,
    CompressionError = 0x9,
    ConnectError = 0xa,
    EnhanceYourCalm = 0xb,
    InadequateSecurity = 0xc,
    Http11Required = 0xd,
}

impl Http2ErrorCode {
    pub const fn to_code(self) -> u32 {
        self as u32
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0x0 => Self::NoError,
            0x1 => Self::ProtocolError,
            0x2 => Self::InternalError,
            0x3 => Self::FlowControlError,
            0x4 => Self::SettingsTimeout,
            0x5 => Self::StreamClosed,
            0x6 => Self::FrameSizeError,
            0x7 => Self::RefusedStream,
            0x8 => Self::Cancel,
            0x9 => Self::CompressionError,
            0xa => Self::ConnectError,
            0xb => Self::EnhanceYourCalm,
            0xc => Self::InadequateSecurity,
            0xd => Self::Http11Required,
            _ => return None,
        })
    }
}

/// SETTINGS parameter identifiers (RFC 9113 §6.5.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum SettingsParameter {
    HeaderTableSize = 0x1,
    EnablePush = 0x2,
    MaxConcurrentStreams = 0x3,
    InitialWindowSize = 0x4,
    MaxFrameSize = 0x5,
    MaxHeaderListSize = 0x6,
}

impl SettingsParameter {
    pub const fn from_id(id: u16) -> Option<Self> {
        Some(match id {
            0x1 => Self::HeaderTableSize,
            0x2 => Self::EnablePush,
            0x3 => Self::MaxConcurrentStreams,
            0x4 => Self::InitialWindowSize,
            0x5 => Self::MaxFrameSize,
            0x6 => Self::MaxHeaderListSize,
            _ => return None,
        })
    }

    pub const fn id(self) -> u16 {
        self as u16
    }
}
