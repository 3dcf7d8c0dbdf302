//! WINDOW_UPDATE payload (RFC 9113 §6.9).
//!
//! An increment of zero is passed through; flow control decides what it
//! means.

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;
use crate::http2::structures::{Http2Structure, WindowUpdateFields};

#[derive(Debug, Default, Clone)]
pub struct WindowUpdatePayloadDecoder {
    fields: WindowUpdateFields,
}

impl WindowUpdatePayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let header = *state.frame_header();
        state.initialize_remainders();
        let size = WindowUpdateFields::ENCODED_SIZE;
        if db.remaining() == size && header.payload_length as usize == size {
            self.fields = WindowUpdateFields::decode(db);
            state.consume_payload(size);
            listener.on_window_update(&header, self.fields.window_size_increment);
            return DecodeStatus::Done;
        }
        let status = state.start_decoding_structure_in_payload(&mut self.fields, db, listener);
        self.handle_status(state, status, listener)
    }

    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let status = state.resume_decoding_structure_in_payload(&mut self.fields, db, listener);
        self.handle_status(state, status, listener)
    }

    fn handle_status(
        &self,
        state: &FrameDecoderState,
        status: DecodeStatus,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        match status {
            DecodeStatus::Done if state.remaining_payload() == 0 => {
                listener.on_window_update(state.frame_header(), self.fields.window_size_increment);
                DecodeStatus::Done
            }
            DecodeStatus::Done => state.report_frame_size_error(listener),
            other => other,
        }
    }
}
