//! PRIORITY payload (RFC 9113 §6.3): exactly one set of priority fields.

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;
use crate::http2::structures::PriorityFields;

#[derive(Debug, Default, Clone)]
pub struct PriorityPayloadDecoder {
    priority_fields: PriorityFields,
}

impl PriorityPayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        state.initialize_remainders();
        let status = state.start_decoding_structure_in_payload(&mut self.priority_fields, db, listener);
        self.handle_status(state, status, listener)
    }

    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let status = state.resume_decoding_structure_in_payload(&mut self.priority_fields, db, listener);
        self.handle_status(state, status, listener)
    }

    fn handle_status(
        &self,
        state: &FrameDecoderState,
        status: DecodeStatus,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        if status != DecodeStatus::Done {
            return status;
        }
        if state.remaining_payload() > 0 {
            // Payload longer than the fields.
            return state.report_frame_size_error(listener);
        }
        listener.on_priority_frame(state.frame_header(), &self.priority_fields);
        DecodeStatus::Done
    }
}
