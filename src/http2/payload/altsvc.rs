//! ALTSVC payload (RFC 7838 §4).
//!
//! ```text
//!  +-------------------------------+-------------------------------+
//!  |         Origin-Len (16)       | Origin? (*)                 ...
//!  +-------------------------------+-------------------------------+
//!  |                   Alt-Svc-Field-Value (*)                   ...
//!  +---------------------------------------------------------------+
//! ```
//!
//! The value is whatever follows the origin; it is not parsed here.

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;
use crate::http2::structures::{AltSvcFields, Http2Structure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PayloadState {
    #[default]
    StartDecodingStruct,
    ResumeDecodingStruct,
    DecodingStrings,
}

#[derive(Debug, Default, Clone)]
pub struct AltSvcPayloadDecoder {
    payload_state: PayloadState,
    altsvc_fields: AltSvcFields,
}

impl AltSvcPayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        state.initialize_remainders();
        self.payload_state = PayloadState::StartDecodingStruct;
        self.resume_decoding_payload(state, db, listener)
    }

    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let status = match self.payload_state {
            PayloadState::StartDecodingStruct => {
                state.start_decoding_structure_in_payload(&mut self.altsvc_fields, db, listener)
            }
            PayloadState::ResumeDecodingStruct => {
                state.resume_decoding_structure_in_payload(&mut self.altsvc_fields, db, listener)
            }
            PayloadState::DecodingStrings => return self.decode_strings(state, db, listener),
        };
        if status != DecodeStatus::Done {
            self.payload_state = PayloadState::ResumeDecodingStruct;
            return status;
        }
        let origin_length = usize::from(self.altsvc_fields.origin_length);
        if origin_length > state.remaining_payload() as usize {
            return state.report_frame_size_error(listener);
        }
        listener.on_alt_svc_start(state.frame_header(), origin_length, self.value_length(state));
        self.payload_state = PayloadState::DecodingStrings;
        self.decode_strings(state, db, listener)
    }

    fn value_length(&self, state: &FrameDecoderState) -> usize {
        state.frame_header().payload_length as usize
            - usize::from(self.altsvc_fields.origin_length)
            - AltSvcFields::ENCODED_SIZE
    }

    fn decode_strings(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let value_length = self.value_length(state);
        let remaining_payload = state.remaining_payload() as usize;
        if remaining_payload > value_length {
            let remaining_origin = remaining_payload - value_length;
            let avail = db.min_length_remaining(remaining_origin);
            if avail > 0 {
                listener.on_alt_svc_origin_data(&db.cursor()[..avail]);
                db.advance_cursor(avail);
                state.consume_payload(avail);
            }
            if remaining_origin > avail {
                return DecodeStatus::InProgress;
            }
        }
        debug_assert!(state.remaining_payload() as usize <= value_length);
        let avail = state.available_payload(db);
        if avail > 0 {
            listener.on_alt_svc_value_data(&db.cursor()[..avail]);
            db.advance_cursor(avail);
            state.consume_payload(avail);
        }
        if state.remaining_payload() == 0 {
            listener.on_alt_svc_end();
            return DecodeStatus::Done;
        }
        DecodeStatus::InProgress
    }
}
