use super::FramerError;
use crate::headers::HeadersHandler;
use crate::http2::{Http2ErrorCode, SettingsParameter};

/// Frame-level events delivered by [`DecoderAdapter`](super::DecoderAdapter).
///
/// Slices borrow the input passed to `process_input` and are only valid
/// during the call.
#[allow(unused_variables)]
pub trait FramerVisitor {
    /// Decoding failed. Called once; nothing follows until `reset`.
    fn on_error(&mut self, error: FramerError) {}

    /// Raw common header of every frame, before any validation.
    fn on_common_header(&mut self, stream_id: u32, length: u32, frame_type: u8, flags: u8) {}

    fn on_data_frame_header(&mut self, stream_id: u32, length: u32, fin: bool) {}
    fn on_stream_frame_data(&mut self, stream_id: u32, data: &[u8]) {}
    /// END_STREAM seen on a DATA frame or on a completed HEADERS block.
    fn on_stream_end(&mut self, stream_id: u32) {}
    /// `len` bytes of DATA padding, including the Pad Length field.
    fn on_stream_padding(&mut self, stream_id: u32, len: usize) {}

    /// A header block is starting on `stream_id`. Returns the handler that
    /// receives its fields; `None` stops decoding with
    /// [`FramerError::InternalFramerError`].
    fn on_header_frame_start(&mut self, stream_id: u32) -> Option<&mut dyn HeadersHandler> {
        self.headers_handler(stream_id)
    }

    /// Handler for the block in progress on `stream_id`, asked for again
    /// for each fragment of the block.
    fn headers_handler(&mut self, stream_id: u32) -> Option<&mut dyn HeadersHandler> {
        None
    }

    fn on_header_frame_end(&mut self, stream_id: u32) {}

    #[allow(clippy::too_many_arguments)]
    fn on_headers(
        &mut self,
        stream_id: u32,
        has_priority: bool,
        weight: u32,
        parent_stream_id: u32,
        exclusive: bool,
        fin: bool,
        end: bool,
    ) {
    }

    fn on_rst_stream(&mut self, stream_id: u32, error_code: Http2ErrorCode) {}

    fn on_settings(&mut self) {}
    fn on_setting(&mut self, id: SettingsParameter, value: u32) {}
    fn on_settings_end(&mut self) {}
    fn on_settings_ack(&mut self) {}

    fn on_ping(&mut self, unique_id: u64, is_ack: bool) {}

    fn on_go_away(&mut self, last_accepted_stream_id: u32, error_code: Http2ErrorCode) {}
    /// Opaque debug data of a GOAWAY; an empty slice marks the end.
    fn on_go_away_frame_data(&mut self, data: &[u8]) {}

    fn on_window_update(&mut self, stream_id: u32, delta: u32) {}

    fn on_push_promise(&mut self, stream_id: u32, promised_stream_id: u32, end: bool) {}

    fn on_continuation(&mut self, stream_id: u32, end: bool) {}

    /// Origin and Alt-Svc-Field-Value, uninterpreted.
    fn on_alt_svc(&mut self, stream_id: u32, origin: &[u8], value: &[u8]) {}

    fn on_priority(&mut self, stream_id: u32, parent_stream_id: u32, weight: u32, exclusive: bool) {}

    /// A frame of a type this crate does not decode. Returning false
    /// rejects it with [`FramerError::InvalidControlFrame`].
    fn on_unknown_frame(&mut self, stream_id: u32, frame_type: u8) -> bool {
        true
    }
}

/// Takes over frames of unknown type. When installed,
/// [`FramerVisitor::on_unknown_frame`] is not consulted.
pub trait ExtensionVisitor {
    /// Returns whether the payload should be forwarded.
    fn on_frame_header(&mut self, stream_id: u32, length: u32, frame_type: u8, flags: u8) -> bool;
    fn on_frame_payload(&mut self, data: &[u8]);
}
