//! Payload of a frame type with no decoder of its own, passed through raw.

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;

#[derive(Debug, Default, Clone)]
pub struct UnknownPayloadDecoder;

impl UnknownPayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        debug_assert!(!state.frame_header().frame_type.is_supported());
        state.initialize_remainders();
        listener.on_unknown_start(state.frame_header());
        self.resume_decoding_payload(state, db, listener)
    }

    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let avail = state.available_payload(db);
        if avail > 0 {
            listener.on_unknown_payload(&db.cursor()[..avail]);
            db.advance_cursor(avail);
            state.consume_payload(avail);
        }
        if state.remaining_payload() == 0 {
            listener.on_unknown_end();
            return DecodeStatus::Done;
        }
        DecodeStatus::InProgress
    }
}
