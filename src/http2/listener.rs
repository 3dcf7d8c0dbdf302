//! Frame decoding events.
//!
//! The decoder calls these synchronously, in wire order. Slices borrow the
//! caller's input and are only valid for the duration of the callback; a
//! listener that keeps bytes must copy them. A listener must not feed more
//! input to the decoder that is calling it.

use super::structures::*;
use crate::log::trace;

/// Receives decoding events for each frame.
///
/// Every method has a no-op default so implementors only handle what they
/// care about.
#[allow(unused_variables)]
pub trait FrameDecoderListener {
    /// Called once the common header is decoded, before the payload.
    /// Returning false abandons the frame: its payload is skipped and the
    /// decode step reports an error.
    fn on_frame_header(&mut self, header: &FrameHeader) -> bool {
        true
    }

    fn on_data_start(&mut self, header: &FrameHeader) {}
    /// A chunk of DATA payload, excluding padding. Never empty.
    fn on_data_payload(&mut self, data: &[u8]) {}
    fn on_data_end(&mut self) {}

    /// Start of a HEADERS frame. Priority fields (if any) and HPACK
    /// fragments follow.
    fn on_headers_start(&mut self, header: &FrameHeader) {}
    fn on_headers_priority(&mut self, priority: &PriorityFields) {}
    /// A chunk of an HPACK header block, from HEADERS, PUSH_PROMISE or
    /// CONTINUATION. Never empty.
    fn on_hpack_fragment(&mut self, data: &[u8]) {}
    fn on_headers_end(&mut self) {}

    fn on_priority_frame(&mut self, header: &FrameHeader, priority: &PriorityFields) {}

    fn on_continuation_start(&mut self, header: &FrameHeader) {}
    fn on_continuation_end(&mut self) {}

    /// The Pad Length field of a padded frame (the field itself excluded).
    fn on_pad_length(&mut self, pad_length: usize) {}
    /// Trailing padding bytes as they arrive.
    fn on_padding(&mut self, padding: &[u8]) {}

    fn on_rst_stream(&mut self, header: &FrameHeader, error_code: u32) {}

    fn on_settings_start(&mut self, header: &FrameHeader) {}
    fn on_setting(&mut self, setting: &SettingFields) {}
    fn on_settings_end(&mut self) {}
    fn on_settings_ack(&mut self, header: &FrameHeader) {}

    /// `total_padding_length` counts the Pad Length field itself, so it is
    /// zero for an unpadded frame and `1 + pad_length` otherwise.
    fn on_push_promise_start(
        &mut self,
        header: &FrameHeader,
        promise: &PushPromiseFields,
        total_padding_length: usize,
    ) {
    }
    fn on_push_promise_end(&mut self) {}

    fn on_ping(&mut self, header: &FrameHeader, ping: &PingFields) {}
    fn on_ping_ack(&mut self, header: &FrameHeader, ping: &PingFields) {}

    fn on_go_away_start(&mut self, header: &FrameHeader, goaway: &GoAwayFields) {}
    fn on_go_away_opaque_data(&mut self, data: &[u8]) {}
    fn on_go_away_end(&mut self) {}

    fn on_window_update(&mut self, header: &FrameHeader, increment: u32) {}

    fn on_alt_svc_start(&mut self, header: &FrameHeader, origin_length: usize, value_length: usize) {}
    fn on_alt_svc_origin_data(&mut self, data: &[u8]) {}
    fn on_alt_svc_value_data(&mut self, data: &[u8]) {}
    fn on_alt_svc_end(&mut self) {}

    /// Frames of a type without a payload decoder.
    fn on_unknown_start(&mut self, header: &FrameHeader) {}
    fn on_unknown_payload(&mut self, data: &[u8]) {}
    fn on_unknown_end(&mut self) {}

    /// The Pad Length field asks for `missing_length` more bytes than the
    /// payload has.
    fn on_padding_too_long(&mut self, header: &FrameHeader, missing_length: usize) {}

    /// The payload length is wrong for the frame type, or above the
    /// decoder's maximum.
    fn on_frame_size_error(&mut self, header: &FrameHeader) {}
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpListener;

impl FrameDecoderListener for NoOpListener {}

/// Traces each event, then forwards it to the wrapped listener.
#[derive(Debug, Default)]
pub struct LoggingListener<L> {
    inner: L,
}

impl<L: FrameDecoderListener> LoggingListener<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &L {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut L {
        &mut self.inner
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: FrameDecoderListener> FrameDecoderListener for LoggingListener<L> {
    fn on_frame_header(&mut self, header: &FrameHeader) -> bool {
        trace!("on_frame_header: {header}");
        self.inner.on_frame_header(header)
    }

    fn on_data_start(&mut self, header: &FrameHeader) {
        trace!("on_data_start: {header}");
        self.inner.on_data_start(header)
    }

    fn on_data_payload(&mut self, data: &[u8]) {
        trace!("on_data_payload: len={}", data.len());
        self.inner.on_data_payload(data)
    }

    fn on_data_end(&mut self) {
        trace!("on_data_end");
        self.inner.on_data_end()
    }

    fn on_headers_start(&mut self, header: &FrameHeader) {
        trace!("on_headers_start: {header}");
        self.inner.on_headers_start(header)
    }

    fn on_headers_priority(&mut self, priority: &PriorityFields) {
        trace!("on_headers_priority: {priority:?}");
        self.inner.on_headers_priority(priority)
    }

    fn on_hpack_fragment(&mut self, data: &[u8]) {
        trace!("on_hpack_fragment: len={}", data.len());
        self.inner.on_hpack_fragment(data)
    }

    fn on_headers_end(&mut self) {
        trace!("on_headers_end");
        self.inner.on_headers_end()
    }

    fn on_priority_frame(&mut self, header: &FrameHeader, priority: &PriorityFields) {
        trace!("on_priority_frame: {header}; {priority:?}");
        self.inner.on_priority_frame(header, priority)
    }

    fn on_continuation_start(&mut self, header: &FrameHeader) {
        trace!("on_continuation_start: {header}");
        self.inner.on_continuation_start(header)
    }

    fn on_continuation_end(&mut self) {
        trace!("on_continuation_end");
        self.inner.on_continuation_end()
    }

    fn on_pad_length(&mut self, pad_length: usize) {
        trace!("on_pad_length: {pad_length}");
        self.inner.on_pad_length(pad_length)
    }

    fn on_padding(&mut self, padding: &[u8]) {
        trace!("on_padding: len={}", padding.len());
        self.inner.on_padding(padding)
    }

    fn on_rst_stream(&mut self, header: &FrameHeader, error_code: u32) {
        trace!("on_rst_stream: {header}; code={error_code}");
        self.inner.on_rst_stream(header, error_code)
    }

    fn on_settings_start(&mut self, header: &FrameHeader) {
        trace!("on_settings_start: {header}");
        self.inner.on_settings_start(header)
    }

    fn on_setting(&mut self, setting: &SettingFields) {
        trace!("on_setting: {setting:?}");
        self.inner.on_setting(setting)
    }

    fn on_settings_end(&mut self) {
        trace!("on_settings_end");
        self.inner.on_settings_end()
    }

    fn on_settings_ack(&mut self, header: &FrameHeader) {
        trace!("on_settings_ack: {header}");
        self.inner.on_settings_ack(header)
    }

    fn on_push_promise_start(
        &mut self,
        header: &FrameHeader,
        promise: &PushPromiseFields,
        total_padding_length: usize,
    ) {
        trace!("on_push_promise_start: {header}; {promise:?}; total_padding_length={total_padding_length}");
        self.inner.on_push_promise_start(header, promise, total_padding_length)
    }

    fn on_push_promise_end(&mut self) {
        trace!("on_push_promise_end");
        self.inner.on_push_promise_end()
    }

    fn on_ping(&mut self, header: &FrameHeader, ping: &PingFields) {
        trace!("on_ping: {header}; {ping:?}");
        self.inner.on_ping(header, ping)
    }

    fn on_ping_ack(&mut self, header: &FrameHeader, ping: &PingFields) {
        trace!("on_ping_ack: {header}; {ping:?}");
        self.inner.on_ping_ack(header, ping)
    }

    fn on_go_away_start(&mut self, header: &FrameHeader, goaway: &GoAwayFields) {
        trace!("on_go_away_start: {header}; {goaway:?}");
        self.inner.on_go_away_start(header, goaway)
    }

    fn on_go_away_opaque_data(&mut self, data: &[u8]) {
        trace!("on_go_away_opaque_data: len={}", data.len());
        self.inner.on_go_away_opaque_data(data)
    }

    fn on_go_away_end(&mut self) {
        trace!("on_go_away_end");
        self.inner.on_go_away_end()
    }

    fn on_window_update(&mut self, header: &FrameHeader, increment: u32) {
        trace!("on_window_update: {header}; increment={increment}");
        self.inner.on_window_update(header, increment)
    }

    fn on_alt_svc_start(&mut self, header: &FrameHeader, origin_length: usize, value_length: usize) {
        trace!("on_alt_svc_start: {header}; origin_length={origin_length}; value_length={value_length}");
        self.inner.on_alt_svc_start(header, origin_length, value_length)
    }

    fn on_alt_svc_origin_data(&mut self, data: &[u8]) {
        trace!("on_alt_svc_origin_data: len={}", data.len());
        self.inner.on_alt_svc_origin_data(data)
    }

    fn on_alt_svc_value_data(&mut self, data: &[u8]) {
        trace!("on_alt_svc_value_data: len={}", data.len());
        self.inner.on_alt_svc_value_data(data)
    }

    fn on_alt_svc_end(&mut self) {
        trace!("on_alt_svc_end");
        self.inner.on_alt_svc_end()
    }

    fn on_unknown_start(&mut self, header: &FrameHeader) {
        trace!("on_unknown_start: {header}");
        self.inner.on_unknown_start(header)
    }

    fn on_unknown_payload(&mut self, data: &[u8]) {
        trace!("on_unknown_payload: len={}", data.len());
        self.inner.on_unknown_payload(data)
    }

    fn on_unknown_end(&mut self) {
        trace!("on_unknown_end");
        self.inner.on_unknown_end()
    }

    fn on_padding_too_long(&mut self, header: &FrameHeader, missing_length: usize) {
        trace!("on_padding_too_long: {header}; missing_length={missing_length}");
        self.inner.on_padding_too_long(header, missing_length)
    }

    fn on_frame_size_error(&mut self, header: &FrameHeader) {
        trace!("on_frame_size_error: {header}");
        self.inner.on_frame_size_error(header)
    }
}
