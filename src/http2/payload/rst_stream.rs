//! RST_STREAM payload (RFC 9113 §6.4).

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;
use crate::http2::structures::RstStreamFields;

#[derive(Debug, Default, Clone)]
pub struct RstStreamPayloadDecoder {
    fields: RstStreamFields,
}

impl RstStreamPayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        state.initialize_remainders();
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
                listener.on_rst_stream(state.frame_header(), self.fields.error_code);
                DecodeStatus::Done
            }
            DecodeStatus::Done => state.report_frame_size_error(listener),
            other => other,
        }
    }
}
