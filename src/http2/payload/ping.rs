//! PING payload (RFC 9113 §6.7): eight opaque bytes, with or without ACK.

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;
use crate::http2::structures::{Http2Structure, PingFields};

#[derive(Debug, Default, Clone)]
pub struct PingPayloadDecoder {
    ping_fields: PingFields,
}

impl PingPayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let header = *state.frame_header();
        state.initialize_remainders();
        let size = PingFields::ENCODED_SIZE;
        if db.remaining() == size && header.payload_length as usize == size {
            self.ping_fields = PingFields::decode(db);
            state.consume_payload(size);
            self.report(state, listener);
            return DecodeStatus::Done;
        }
        let status = state.start_decoding_structure_in_payload(&mut self.ping_fields, db, listener);
        self.handle_status(state, status, listener)
    }

    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let status = state.resume_decoding_structure_in_payload(&mut self.ping_fields, db, listener);
        self.handle_status(state, status, listener)
    }

    fn report(&self, state: &FrameDecoderState, listener: &mut dyn FrameDecoderListener) {
        let header = state.frame_header();
        if header.is_ack() {
            listener.on_ping_ack(header, &self.ping_fields);
        } else {
            listener.on_ping(header, &self.ping_fields);
        }
    }

    fn handle_status(
        &self,
        state: &FrameDecoderState,
        status: DecodeStatus,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        match status {
            DecodeStatus::Done if state.remaining_payload() == 0 => {
                self.report(state, listener);
                DecodeStatus::Done
            }
            DecodeStatus::Done => state.report_frame_size_error(listener),
            other => other,
        }
    }
}
