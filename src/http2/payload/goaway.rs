//! GOAWAY payload (RFC 9113 §6.8): fixed fields, then opaque debug data.

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;
use crate::http2::structures::GoAwayFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PayloadState {
    #[default]
    StartDecodingFixedFields,
    ResumeDecodingFixedFields,
    ReadOpaqueData,
}

#[derive(Debug, Default, Clone)]
pub struct GoAwayPayloadDecoder {
    payload_state: PayloadState,
    goaway_fields: GoAwayFields,
}

impl GoAwayPayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        state.initialize_remainders();
        self.payload_state = PayloadState::StartDecodingFixedFields;
        self.resume_decoding_payload(state, db, listener)
    }

    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        loop {
            let status = match self.payload_state {
                PayloadState::StartDecodingFixedFields => {
                    state.start_decoding_structure_in_payload(&mut self.goaway_fields, db, listener)
                }
                PayloadState::ResumeDecodingFixedFields => {
                    state.resume_decoding_structure_in_payload(&mut self.goaway_fields, db, listener)
                }
                PayloadState::ReadOpaqueData => {
                    let avail = state.available_payload(db);
                    if avail > 0 {
                        listener.on_go_away_opaque_data(&db.cursor()[..avail]);
                        db.advance_cursor(avail);
                        state.consume_payload(avail);
                    }
                    if state.remaining_payload() > 0 {
                        return DecodeStatus::InProgress;
                    }
                    listener.on_go_away_end();
                    return DecodeStatus::Done;
                }
            };
            if status != DecodeStatus::Done {
                self.payload_state = PayloadState::ResumeDecodingFixedFields;
                return status;
            }
            listener.on_go_away_start(state.frame_header(), &self.goaway_fields);
            self.payload_state = PayloadState::ReadOpaqueData;
        }
    }
}
