//! PUSH_PROMISE payload (RFC 9113 §6.6).
//!
//! The Pad Length is not reported on its own; it is folded into the
//! `total_padding_length` of `on_push_promise_start`.

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;
use crate::http2::structures::PushPromiseFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PayloadState {
    #[default]
    ReadPadLength,
    StartDecodingPushPromiseFields,
    ResumeDecodingPushPromiseFields,
    ReadPayload,
    SkipPadding,
}

#[derive(Debug, Default, Clone)]
pub struct PushPromisePayloadDecoder {
    payload_state: PayloadState,
    push_promise_fields: PushPromiseFields,
}

impl PushPromisePayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        state.initialize_remainders();
        self.payload_state = if state.frame_header().is_padded() {
            PayloadState::ReadPadLength
        } else {
            PayloadState::StartDecodingPushPromiseFields
        };
        self.resume_decoding_payload(state, db, listener)
    }

    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        loop {
            match self.payload_state {
                PayloadState::ReadPadLength => {
                    let status = state.read_pad_length(db, false, listener);
                    if status != DecodeStatus::Done {
                        return status;
                    }
                    self.payload_state = PayloadState::StartDecodingPushPromiseFields;
                }
                PayloadState::StartDecodingPushPromiseFields => {
                    let status =
                        state.start_decoding_structure_in_payload(&mut self.push_promise_fields, db, listener);
                    if status != DecodeStatus::Done {
                        self.payload_state = PayloadState::ResumeDecodingPushPromiseFields;
                        return status;
                    }
                    self.report_push_promise(state, listener);
                    self.payload_state = PayloadState::ReadPayload;
                }
                PayloadState::ResumeDecodingPushPromiseFields => {
                    let status =
                        state.resume_decoding_structure_in_payload(&mut self.push_promise_fields, db, listener);
                    if status != DecodeStatus::Done {
                        return status;
                    }
                    self.report_push_promise(state, listener);
                    self.payload_state = PayloadState::ReadPayload;
                }
                PayloadState::ReadPayload => {
                    let avail = state.available_payload(db);
                    if avail > 0 {
                        listener.on_hpack_fragment(&db.cursor()[..avail]);
                        db.advance_cursor(avail);
                        state.consume_payload(avail);
                    }
                    if state.remaining_payload() > 0 {
                        return DecodeStatus::InProgress;
                    }
                    self.payload_state = PayloadState::SkipPadding;
                }
                PayloadState::SkipPadding => {
                    if state.skip_padding(db, listener) {
                        listener.on_push_promise_end();
                        return DecodeStatus::Done;
                    }
                    return DecodeStatus::InProgress;
                }
            }
        }
    }

    fn report_push_promise(&self, state: &FrameDecoderState, listener: &mut dyn FrameDecoderListener) {
        let header = state.frame_header();
        let total_padding_length = if header.is_padded() {
            1 + state.remaining_padding() as usize
        } else {
            0
        };
        listener.on_push_promise_start(header, &self.push_promise_fields, total_padding_length);
    }
}
