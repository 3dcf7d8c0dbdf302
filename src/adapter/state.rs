use core::fmt;

/// Coarse decoding state, as reported by the SPDY-style framer interface.
///
/// Only a subset is ever entered by [`DecoderAdapter`](super::DecoderAdapter);
/// the rest exist so callers matching on the full set keep compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpdyState {
    Error,
    #[default]
    ReadyForFrame,
    FrameComplete,
    ReadingCommonHeader,
    ControlFramePayload,
    ReadDataFramePaddingLength,
    ConsumePadding,
    IgnoreRemainingPayload,
    ForwardStreamFrame,
    ControlFrameBeforeHeaderBlock,
    ControlFrameHeaderBlock,
    GoAwayFramePayload,
    SettingsFrameHeader,
    SettingsFramePayload,
    AltSvcFramePayload,
    ExtensionFramePayload,
}

impl SpdyState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::FrameComplete => "FRAME_COMPLETE",
            Self::ReadyForFrame => "READY_FOR_FRAME",
            Self::ReadingCommonHeader => "READING_COMMON_HEADER",
            Self::ControlFramePayload => "CONTROL_FRAME_PAYLOAD",
            Self::IgnoreRemainingPayload => "IGNORE_REMAINING_PAYLOAD",
            Self::ForwardStreamFrame => "FORWARD_STREAM_FRAME",
            Self::ControlFrameBeforeHeaderBlock => "SPDY_CONTROL_FRAME_BEFORE_HEADER_BLOCK",
            Self::ControlFrameHeaderBlock => "SPDY_CONTROL_FRAME_HEADER_BLOCK",
            Self::GoAwayFramePayload => "SPDY_GOAWAY_FRAME_PAYLOAD",
            Self::SettingsFrameHeader => "SPDY_SETTINGS_FRAME_HEADER",
            Self::SettingsFramePayload => "SPDY_SETTINGS_FRAME_PAYLOAD",
            Self::AltSvcFramePayload => "SPDY_ALTSVC_FRAME_PAYLOAD",
            Self::ReadDataFramePaddingLength => "SPDY_READ_DATA_FRAME_PADDING_LENGTH",
            Self::ConsumePadding => "SPDY_CONSUME_PADDING",
            Self::ExtensionFramePayload => "SPDY_EXTENSION_FRAME_PAYLOAD",
        }
    }
}

impl fmt::Display for SpdyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason the adapter stopped decoding. Reported once through
/// [`FramerVisitor::on_error`](super::FramerVisitor::on_error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramerError {
    #[default]
    NoError,
    InvalidStreamId,
    InvalidControlFrame,
    ControlPayloadTooLarge,
    DecompressFailure,
    GoAwayFrameCorrupt,
    RstStreamFrameCorrupt,
    InvalidPadding,
    InvalidDataFrameFlags,
    InvalidControlFrameFlags,
    UnexpectedFrame,
    InternalFramerError,
    InvalidControlFrameSize,
    OversizedPayload,
}

impl FramerError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoError => "NO_ERROR",
            Self::InvalidStreamId => "INVALID_STREAM_ID",
            Self::InvalidControlFrame => "INVALID_CONTROL_FRAME",
            Self::ControlPayloadTooLarge => "CONTROL_PAYLOAD_TOO_LARGE",
            Self::DecompressFailure => "DECOMPRESS_FAILURE",
            Self::GoAwayFrameCorrupt => "GOAWAY_FRAME_CORRUPT",
            Self::RstStreamFrameCorrupt => "RST_STREAM_FRAME_CORRUPT",
            Self::InvalidPadding => "INVALID_PADDING",
            Self::InvalidDataFrameFlags => "INVALID_DATA_FRAME_FLAGS",
            Self::InvalidControlFrameFlags => "INVALID_CONTROL_FRAME_FLAGS",
            Self::UnexpectedFrame => "UNEXPECTED_FRAME",
            Self::InternalFramerError => "INTERNAL_FRAMER_ERROR",
            Self::InvalidControlFrameSize => "INVALID_CONTROL_FRAME_SIZE",
            Self::OversizedPayload => "OVERSIZED_PAYLOAD",
        }
    }
}

impl fmt::Display for FramerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn names() {
        assert_eq!(SpdyState::default().as_str(), "READY_FOR_FRAME");
        assert_eq!(SpdyState::ConsumePadding.to_string(), "SPDY_CONSUME_PADDING");
        assert_eq!(FramerError::default(), FramerError::NoError);
        assert_eq!(FramerError::UnexpectedFrame.to_string(), "UNEXPECTED_FRAME");
    }
}
