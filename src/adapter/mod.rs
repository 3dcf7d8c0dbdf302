//! SPDY-framer-style decoding on top of [`Http2FrameDecoder`].
//!
//! [`DecoderAdapter`] drives the frame decoder, validates frames the way the
//! older framer interface expects (stream ids, CONTINUATION sequencing, DATA
//! flags), decompresses header blocks through HPACK, and reports everything
//! to a [`FramerVisitor`]. The first failure is terminal: the visitor gets a
//! single [`FramerVisitor::on_error`] and input is refused until
//! [`DecoderAdapter::reset`].

mod state;
mod visitor;

pub use state::{FramerError, SpdyState};
pub use visitor::{ExtensionVisitor, FramerVisitor};

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::config::DecoderConfig;
use crate::error::Error;
use crate::hpack::HpackDecoderAdapter;
use crate::http2::{
    DecodeBuffer, DecodeStatus, FrameDecoderListener, FrameHeader, FrameType, GoAwayFields,
    Http2ErrorCode, Http2FrameDecoder, PingFields, PriorityFields, PushPromiseFields,
    SettingFields, SettingsParameter, FLAG_END_STREAM, FLAG_PADDED,
};
use crate::log::{debug, trace};

pub struct DecoderAdapter<V: FramerVisitor> {
    frame_decoder: Http2FrameDecoder,
    listener: AdapterListener<V>,
}

impl<V: FramerVisitor> DecoderAdapter<V> {
    pub fn new(visitor: V) -> Self {
        Self::with_config(visitor, DecoderConfig::default())
    }

    pub fn with_config(visitor: V, config: DecoderConfig) -> Self {
        Self {
            frame_decoder: Http2FrameDecoder::new(),
            listener: AdapterListener::new(visitor, config),
        }
    }

    pub fn visitor(&self) -> &V {
        &self.listener.visitor
    }

    pub fn visitor_mut(&mut self) -> &mut V {
        &mut self.listener.visitor
    }

    pub fn into_visitor(self) -> V {
        self.listener.visitor
    }

    /// Routes frames of unknown type to `extension`.
    pub fn set_extension_visitor(&mut self, extension: Box<dyn ExtensionVisitor>) {
        self.listener.extension = Some(extension);
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.listener.config
    }

    pub fn set_max_frame_payload_size(&mut self, size: u32) {
        self.listener.config.max_frame_payload_size = size;
    }

    pub fn set_process_single_input_frame(&mut self, single: bool) {
        self.listener.config.process_single_input_frame = single;
    }

    /// Applies a setting this endpoint advertised, once the peer has
    /// acknowledged it. Limits the decoder enforces take effect immediately.
    pub fn apply_local_setting(&mut self, id: u16, value: u32) -> Result<(), Error> {
        let config = &mut self.listener.config;
        config.apply(id, value)?;
        if SettingsParameter::from_id(id) == Some(SettingsParameter::HeaderTableSize) {
            self.listener
                .hpack
                .apply_header_table_size_setting(config.header_table_size as usize);
        }
        Ok(())
    }

    pub fn state(&self) -> SpdyState {
        self.listener.state
    }

    pub fn framer_error(&self) -> FramerError {
        self.listener.error
    }

    pub fn has_error(&self) -> bool {
        self.listener.has_error()
    }

    /// True once any frame header has read as the start of an HTTP/1
    /// response.
    pub fn probable_http_response(&self) -> bool {
        self.listener.latched_probable_http_response
    }

    pub fn hpack_decoder_mut(&mut self) -> &mut HpackDecoderAdapter {
        &mut self.listener.hpack
    }

    /// Forgets all decoding progress, including any error and the HPACK
    /// dynamic table. The visitor, extension and configuration are kept.
    pub fn reset(&mut self) {
        self.frame_decoder = Http2FrameDecoder::new();
        self.listener.reset();
    }

    /// Decodes as much of `data` as possible and returns the number of bytes
    /// consumed. Stops early after an error, or after one frame when
    /// `process_single_input_frame` is set.
    pub fn process_input(&mut self, data: &[u8]) -> usize {
        self.frame_decoder
            .set_maximum_payload_size(self.listener.config.max_frame_payload_size);

        let mut total = 0;
        let mut rest = data;
        while !rest.is_empty() && self.listener.state != SpdyState::Error {
            let processed = self.process_input_frame(rest);
            rest = &rest[processed..];
            total += processed;
            if self.listener.config.process_single_input_frame || processed == 0 {
                break;
            }
        }
        total
    }

    fn process_input_frame(&mut self, data: &[u8]) -> usize {
        let mut db = DecodeBuffer::new(data);
        let status = self.frame_decoder.decode_frame(&mut db, &mut self.listener);
        if self.listener.state != SpdyState::Error {
            self.determine_spdy_state(status);
        } else {
            debug!(
                "process_input_frame: {status} with error {}",
                self.listener.error
            );
        }
        db.offset()
    }

    fn determine_spdy_state(&mut self, status: DecodeStatus) {
        let listener = &mut self.listener;
        match status {
            DecodeStatus::Done => listener.reset_between_frames(),
            DecodeStatus::InProgress => {
                let state = if !listener.decoded_frame_header {
                    SpdyState::ReadingCommonHeader
                } else if self.frame_decoder.is_discarding_payload() {
                    SpdyState::IgnoreRemainingPayload
                } else {
                    match listener.frame_header {
                        Some(header) if header.frame_type == FrameType::Data => {
                            if header.is_padded() && listener.opt_pad_length.is_none() {
                                SpdyState::ReadDataFramePaddingLength
                            } else if header.is_padded()
                                && self.frame_decoder.remaining_payload() == 0
                                && self.frame_decoder.remaining_padding() > 0
                            {
                                SpdyState::ConsumePadding
                            } else {
                                SpdyState::ForwardStreamFrame
                            }
                        }
                        _ => SpdyState::ControlFramePayload,
                    }
                };
                listener.set_state(state);
            }
            DecodeStatus::Error => {
                if !self.frame_decoder.is_discarding_payload() {
                    listener.set_error_and_notify(FramerError::InvalidControlFrame);
                    return;
                }
                let remaining =
                    self.frame_decoder.remaining_payload() + self.frame_decoder.remaining_padding();
                if remaining > 0 {
                    listener.set_state(SpdyState::IgnoreRemainingPayload);
                    return;
                }
                // Leaving the discard state needs no input.
                let mut empty = DecodeBuffer::new(&[]);
                match self.frame_decoder.decode_frame(&mut empty, &mut *listener) {
                    DecodeStatus::Done => listener.reset_between_frames(),
                    other => {
                        debug!("expected the discarded frame to be done, not {other}");
                        listener.set_error_and_notify(FramerError::InternalFramerError);
                    }
                }
            }
        }
    }
}

struct AdapterListener<V> {
    visitor: V,
    extension: Option<Box<dyn ExtensionVisitor>>,
    hpack: HpackDecoderAdapter,
    config: DecoderConfig,

    state: SpdyState,
    error: FramerError,

    /// Header of the frame being decoded, once it has passed validation.
    frame_header: Option<FrameHeader>,
    /// First frame of a header block that continues in CONTINUATION frames.
    hpack_first_frame_header: Option<FrameHeader>,
    decoded_frame_header: bool,
    expected_frame_type: Option<FrameType>,
    opt_pad_length: Option<usize>,

    alt_svc_origin: Vec<u8>,
    alt_svc_value: Vec<u8>,

    on_headers_called: bool,
    on_hpack_fragment_called: bool,
    latched_probable_http_response: bool,
    handling_extension_payload: bool,
}

fn hpack_for(config: &DecoderConfig) -> HpackDecoderAdapter {
    let mut hpack = HpackDecoderAdapter::new();
    hpack.apply_header_table_size_setting(config.header_table_size as usize);
    hpack.set_max_decode_buffer_size_bytes(config.max_decode_buffer_size);
    hpack
}

fn parse_error_code(code: u32) -> Http2ErrorCode {
    Http2ErrorCode::from_code(code).unwrap_or(Http2ErrorCode::InternalError)
}

/// Whether `stream_id` is acceptable for a frame of `frame_type`.
fn is_valid_stream_id(frame_type: FrameType, stream_id: u32) -> bool {
    match frame_type {
        FrameType::Data
        | FrameType::Headers
        | FrameType::Priority
        | FrameType::RstStream
        | FrameType::PushPromise
        | FrameType::Continuation => stream_id != 0,
        FrameType::Settings | FrameType::Ping | FrameType::GoAway => stream_id == 0,
        FrameType::WindowUpdate | FrameType::AltSvc | FrameType::Unknown(_) => true,
    }
}

impl<V: FramerVisitor> AdapterListener<V> {
    fn new(visitor: V, config: DecoderConfig) -> Self {
        Self {
            visitor,
            extension: None,
            hpack: hpack_for(&config),
            config,
            state: SpdyState::ReadyForFrame,
            error: FramerError::NoError,
            frame_header: None,
            hpack_first_frame_header: None,
            decoded_frame_header: false,
            expected_frame_type: None,
            opt_pad_length: None,
            alt_svc_origin: Vec::new(),
            alt_svc_value: Vec::new(),
            on_headers_called: false,
            on_hpack_fragment_called: false,
            latched_probable_http_response: false,
            handling_extension_payload: false,
        }
    }

    fn reset(&mut self) {
        self.hpack = hpack_for(&self.config);
        self.state = SpdyState::ReadyForFrame;
        self.error = FramerError::NoError;
        self.frame_header = None;
        self.hpack_first_frame_header = None;
        self.decoded_frame_header = false;
        self.expected_frame_type = None;
        self.opt_pad_length = None;
        self.alt_svc_origin.clear();
        self.alt_svc_value.clear();
        self.on_headers_called = false;
        self.on_hpack_fragment_called = false;
        self.latched_probable_http_response = false;
        self.handling_extension_payload = false;
    }

    fn has_error(&self) -> bool {
        self.error != FramerError::NoError
    }

    fn set_state(&mut self, state: SpdyState) {
        trace!("spdy state: {} -> {}", self.state, state);
        self.state = state;
    }

    fn set_error_and_notify(&mut self, error: FramerError) {
        if self.has_error() {
            debug_assert_eq!(self.state, SpdyState::Error);
            return;
        }
        debug!("framer error: {error}");
        self.error = error;
        self.set_state(SpdyState::Error);
        self.visitor.on_error(error);
    }

    fn reset_between_frames(&mut self) {
        self.frame_header = None;
        self.decoded_frame_header = false;
        self.set_state(SpdyState::ReadyForFrame);
    }

    fn stream_id(&self) -> u32 {
        self.frame_header.map_or(0, |h| h.stream_id)
    }

    fn start_frame(&mut self, header: &FrameHeader) {
        self.frame_header = Some(*header);
    }

    fn common_start_hpack_block(&mut self) {
        let Some(header) = self.frame_header else {
            return;
        };
        self.hpack_first_frame_header = (!header.is_end_headers()).then_some(header);
        self.on_hpack_fragment_called = false;
        if self.visitor.on_header_frame_start(header.stream_id).is_none() {
            debug!("no headers handler for stream {}", header.stream_id);
            self.set_error_and_notify(FramerError::InternalFramerError);
            return;
        }
        self.hpack.handle_control_frame_headers_start();
    }

    /// A block whose first frame carries no fragment bytes still has to be
    /// started in the HPACK decoder.
    fn maybe_announce_empty_first_hpack_fragment(&mut self) {
        if !self.on_hpack_fragment_called {
            self.hpack_fragment(&[]);
        }
    }

    fn hpack_fragment(&mut self, data: &[u8]) {
        self.on_hpack_fragment_called = true;
        let stream_id = self.stream_id();
        let result = match self.visitor.headers_handler(stream_id) {
            Some(handler) => self
                .hpack
                .handle_control_frame_headers_data(data, Some(handler))
                .map_err(|e| {
                    debug!("HPACK fragment on stream {stream_id}: {e}");
                    FramerError::DecompressFailure
                }),
            None => Err(FramerError::InternalFramerError),
        };
        if let Err(error) = result {
            self.set_error_and_notify(error);
        }
    }

    fn common_hpack_fragment_end(&mut self) {
        if self.has_error() {
            return;
        }
        let Some(header) = self.frame_header else {
            return;
        };
        self.maybe_announce_empty_first_hpack_fragment();
        if self.has_error() {
            return;
        }
        if !header.is_end_headers() {
            self.expected_frame_type = Some(FrameType::Continuation);
            return;
        }

        self.expected_frame_type = None;
        let stream_id = header.stream_id;
        let result = match self.visitor.headers_handler(stream_id) {
            Some(handler) => self
                .hpack
                .handle_control_frame_headers_complete(Some(handler))
                .map(|_| ())
                .map_err(|e| {
                    debug!("HPACK block on stream {stream_id}: {e}");
                    FramerError::DecompressFailure
                }),
            None => Err(FramerError::InternalFramerError),
        };
        if let Err(error) = result {
            self.set_error_and_notify(error);
            return;
        }
        self.visitor.on_header_frame_end(stream_id);

        let first = if header.frame_type == FrameType::Continuation {
            self.hpack_first_frame_header
        } else {
            Some(header)
        };
        if let Some(first) = first {
            if first.frame_type == FrameType::Headers && first.is_end_stream() {
                self.visitor.on_stream_end(first.stream_id);
            }
        }
        self.hpack_first_frame_header = None;
    }
}

impl<V: FramerVisitor> FrameDecoderListener for AdapterListener<V> {
    fn on_frame_header(&mut self, header: &FrameHeader) -> bool {
        if self.has_error() {
            return false;
        }
        self.decoded_frame_header = true;
        if !self.latched_probable_http_response {
            self.latched_probable_http_response = header.is_probable_http_response();
        }
        let raw_type = header.frame_type.to_u8();
        self.visitor
            .on_common_header(header.stream_id, header.payload_length, raw_type, header.flags);

        if let Some(expected) = self.expected_frame_type {
            if header.frame_type != expected {
                debug!("expected a {expected} frame, got {}", header.frame_type);
                self.set_error_and_notify(FramerError::UnexpectedFrame);
                return false;
            }
        }

        if !header.frame_type.is_supported() {
            if self.extension.is_some() {
                return true;
            }
            if !self.visitor.on_unknown_frame(header.stream_id, raw_type) {
                debug!("unknown frame type {raw_type} on invalid stream {}", header.stream_id);
                self.set_error_and_notify(FramerError::InvalidControlFrame);
                return false;
            }
            trace!("ignoring unknown frame type {raw_type}");
            return true;
        }

        if !is_valid_stream_id(header.frame_type, header.stream_id) {
            debug!("invalid stream id {} for {}", header.stream_id, header.frame_type);
            self.set_error_and_notify(FramerError::InvalidStreamId);
            return false;
        }

        if self.expected_frame_type.is_none() && header.frame_type == FrameType::Continuation {
            debug!("CONTINUATION without a header block in progress");
            self.set_error_and_notify(FramerError::UnexpectedFrame);
            return false;
        }

        if header.frame_type == FrameType::Data
            && header.has_any_flags(!(FLAG_PADDED | FLAG_END_STREAM))
        {
            self.set_error_and_notify(FramerError::InvalidDataFrameFlags);
            return false;
        }

        true
    }

    fn on_data_start(&mut self, header: &FrameHeader) {
        if self.has_error() {
            return;
        }
        self.start_frame(header);
        self.visitor.on_data_frame_header(
            header.stream_id,
            header.payload_length,
            header.is_end_stream(),
        );
    }

    fn on_data_payload(&mut self, data: &[u8]) {
        if self.has_error() {
            return;
        }
        self.visitor.on_stream_frame_data(self.stream_id(), data);
    }

    fn on_data_end(&mut self) {
        if self.has_error() {
            return;
        }
        if let Some(header) = self.frame_header {
            if header.is_end_stream() {
                self.visitor.on_stream_end(header.stream_id);
            }
        }
        self.opt_pad_length = None;
    }

    fn on_headers_start(&mut self, header: &FrameHeader) {
        if self.has_error() {
            return;
        }
        self.start_frame(header);
        if header.has_priority() {
            // Reported once the priority fields arrive.
            self.on_headers_called = false;
            return;
        }
        self.on_headers_called = true;
        self.visitor.on_headers(
            header.stream_id,
            false,
            0,
            0,
            false,
            header.is_end_stream(),
            header.is_end_headers(),
        );
        self.common_start_hpack_block();
    }

    fn on_headers_priority(&mut self, priority: &PriorityFields) {
        if self.has_error() {
            return;
        }
        let Some(header) = self.frame_header else {
            return;
        };
        debug_assert!(!self.on_headers_called);
        self.on_headers_called = true;
        self.visitor.on_headers(
            header.stream_id,
            true,
            priority.weight,
            priority.stream_dependency,
            priority.is_exclusive,
            header.is_end_stream(),
            header.is_end_headers(),
        );
        self.common_start_hpack_block();
    }

    fn on_hpack_fragment(&mut self, data: &[u8]) {
        if self.has_error() {
            return;
        }
        self.hpack_fragment(data);
    }

    fn on_headers_end(&mut self) {
        self.common_hpack_fragment_end();
        self.opt_pad_length = None;
    }

    fn on_priority_frame(&mut self, header: &FrameHeader, priority: &PriorityFields) {
        if self.has_error() {
            return;
        }
        self.visitor.on_priority(
            header.stream_id,
            priority.stream_dependency,
            priority.weight,
            priority.is_exclusive,
        );
    }

    fn on_continuation_start(&mut self, header: &FrameHeader) {
        if self.has_error() {
            return;
        }
        let first_stream = self.hpack_first_frame_header.map(|h| h.stream_id);
        if first_stream != Some(header.stream_id) {
            debug!(
                "CONTINUATION on stream {}, header block on {first_stream:?}",
                header.stream_id
            );
            self.set_error_and_notify(FramerError::UnexpectedFrame);
            return;
        }
        self.start_frame(header);
        self.visitor
            .on_continuation(header.stream_id, header.is_end_headers());
    }

    fn on_continuation_end(&mut self) {
        self.common_hpack_fragment_end();
    }

    fn on_pad_length(&mut self, pad_length: usize) {
        if self.has_error() {
            return;
        }
        self.opt_pad_length = Some(pad_length);
        if let Some(header) = self.frame_header {
            if header.frame_type == FrameType::Data {
                // The Pad Length field itself.
                self.visitor.on_stream_padding(header.stream_id, 1);
            }
        }
    }

    fn on_padding(&mut self, padding: &[u8]) {
        if self.has_error() {
            return;
        }
        match self.frame_header {
            Some(header) if header.frame_type == FrameType::Data => {
                self.visitor.on_stream_padding(header.stream_id, padding.len());
            }
            _ => self.maybe_announce_empty_first_hpack_fragment(),
        }
    }

    fn on_rst_stream(&mut self, header: &FrameHeader, error_code: u32) {
        if self.has_error() {
            return;
        }
        self.visitor
            .on_rst_stream(header.stream_id, parse_error_code(error_code));
    }

    fn on_settings_start(&mut self, header: &FrameHeader) {
        if self.has_error() {
            return;
        }
        self.start_frame(header);
        self.visitor.on_settings();
    }

    fn on_setting(&mut self, setting: &SettingFields) {
        if self.has_error() {
            return;
        }
        match SettingsParameter::from_id(setting.parameter) {
            Some(id) => self.visitor.on_setting(id, setting.value),
            None => {
                debug!(
                    "ignoring unknown setting id {:#x} = {}",
                    setting.parameter, setting.value
                );
            }
        }
    }

    fn on_settings_end(&mut self) {
        if self.has_error() {
            return;
        }
        self.visitor.on_settings_end();
    }

    fn on_settings_ack(&mut self, _header: &FrameHeader) {
        if self.has_error() {
            return;
        }
        self.visitor.on_settings_ack();
    }

    fn on_push_promise_start(
        &mut self,
        header: &FrameHeader,
        promise: &PushPromiseFields,
        _total_padding_length: usize,
    ) {
        if self.has_error() {
            return;
        }
        if promise.promised_stream_id == 0 {
            self.set_error_and_notify(FramerError::InvalidControlFrame);
            return;
        }
        self.start_frame(header);
        self.visitor.on_push_promise(
            header.stream_id,
            promise.promised_stream_id,
            header.is_end_headers(),
        );
        self.common_start_hpack_block();
    }

    fn on_push_promise_end(&mut self) {
        self.common_hpack_fragment_end();
        self.opt_pad_length = None;
    }

    fn on_ping(&mut self, _header: &FrameHeader, ping: &PingFields) {
        if self.has_error() {
            return;
        }
        self.visitor.on_ping(ping.as_u64(), false);
    }

    fn on_ping_ack(&mut self, _header: &FrameHeader, ping: &PingFields) {
        if self.has_error() {
            return;
        }
        self.visitor.on_ping(ping.as_u64(), true);
    }

    fn on_go_away_start(&mut self, header: &FrameHeader, goaway: &GoAwayFields) {
        if self.has_error() {
            return;
        }
        self.start_frame(header);
        self.visitor
            .on_go_away(goaway.last_stream_id, parse_error_code(goaway.error_code));
    }

    fn on_go_away_opaque_data(&mut self, data: &[u8]) {
        if self.has_error() {
            return;
        }
        self.visitor.on_go_away_frame_data(data);
    }

    fn on_go_away_end(&mut self) {
        if self.has_error() {
            return;
        }
        self.visitor.on_go_away_frame_data(&[]);
    }

    fn on_window_update(&mut self, header: &FrameHeader, increment: u32) {
        if self.has_error() {
            return;
        }
        self.visitor.on_window_update(header.stream_id, increment);
    }

    // RFC 7838 says some ALTSVC frames must be ignored depending on stream
    // and origin; that is left to the visitor.
    fn on_alt_svc_start(&mut self, header: &FrameHeader, _origin_length: usize, _value_length: usize) {
        if self.has_error() {
            return;
        }
        self.start_frame(header);
        self.alt_svc_origin.clear();
        self.alt_svc_value.clear();
    }

    fn on_alt_svc_origin_data(&mut self, data: &[u8]) {
        if self.has_error() {
            return;
        }
        self.alt_svc_origin.extend_from_slice(data);
    }

    fn on_alt_svc_value_data(&mut self, data: &[u8]) {
        if self.has_error() {
            return;
        }
        self.alt_svc_value.extend_from_slice(data);
    }

    fn on_alt_svc_end(&mut self) {
        if self.has_error() {
            return;
        }
        let stream_id = self.stream_id();
        self.visitor
            .on_alt_svc(stream_id, &self.alt_svc_origin, &self.alt_svc_value);
        // ALTSVC frames are rare; release the storage.
        self.alt_svc_origin = Vec::new();
        self.alt_svc_value = Vec::new();
    }

    fn on_unknown_start(&mut self, header: &FrameHeader) {
        if self.has_error() {
            return;
        }
        if let Some(extension) = self.extension.as_mut() {
            self.handling_extension_payload = extension.on_frame_header(
                header.stream_id,
                header.payload_length,
                header.frame_type.to_u8(),
                header.flags,
            );
        }
    }

    fn on_unknown_payload(&mut self, data: &[u8]) {
        if self.has_error() {
            return;
        }
        match self.extension.as_mut() {
            Some(extension) if self.handling_extension_payload => extension.on_frame_payload(data),
            _ => {
                trace!("dropping {} bytes of unknown frame payload", data.len());
            }
        }
    }

    fn on_unknown_end(&mut self) {
        self.handling_extension_payload = false;
    }

    fn on_padding_too_long(&mut self, header: &FrameHeader, missing_length: usize) {
        if self.has_error() {
            return;
        }
        debug!("padding too long: {header}; missing {missing_length}");
        if header.frame_type == FrameType::Data {
            if header.payload_length == 0 {
                // PADDED with no room for the Pad Length field.
                self.set_error_and_notify(FramerError::InvalidDataFrameFlags);
                return;
            }
            self.visitor.on_stream_padding(header.stream_id, 1);
        }
        self.set_error_and_notify(FramerError::InvalidPadding);
    }

    fn on_frame_size_error(&mut self, header: &FrameHeader) {
        if self.has_error() {
            return;
        }
        if header.payload_length > self.config.max_frame_payload_size {
            self.set_error_and_notify(FramerError::OversizedPayload);
            return;
        }
        let error = match header.frame_type {
            FrameType::GoAway | FrameType::AltSvc => FramerError::InvalidControlFrame,
            _ => FramerError::InvalidControlFrameSize,
        };
        self.set_error_and_notify(error);
    }
}
