//! HEADERS payload (RFC 9113 §6.2).
//!
//! Two optional fixed fields precede the header block fragment: Pad Length
//! when PADDED is set, then the priority fields when PRIORITY is set.

use crate::http2::constants::{FLAG_PADDED, FLAG_PRIORITY};
use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;
use crate::http2::structures::PriorityFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PayloadState {
    #[default]
    ReadPadLength,
    StartDecodingPriorityFields,
    ResumeDecodingPriorityFields,
    ReadPayload,
    SkipPadding,
}

#[derive(Debug, Default, Clone)]
pub struct HeadersPayloadDecoder {
    payload_state: PayloadState,
    priority_fields: PriorityFields,
}

impl HeadersPayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let header = *state.frame_header();
        let total_length = header.payload_length as usize;
        debug_assert!(db.remaining() <= total_length);
        state.initialize_remainders();

        if !header.has_any_flags(FLAG_PADDED | FLAG_PRIORITY) {
            if db.remaining() == total_length {
                listener.on_headers_start(&header);
                if total_length > 0 {
                    listener.on_hpack_fragment(&db.cursor()[..total_length]);
                    db.advance_cursor(total_length);
                    state.consume_payload(total_length);
                }
                listener.on_headers_end();
                return DecodeStatus::Done;
            }
            self.payload_state = PayloadState::ReadPayload;
        } else if header.is_padded() {
            self.payload_state = PayloadState::ReadPadLength;
        } else {
            debug_assert!(header.has_priority());
            self.payload_state = PayloadState::StartDecodingPriorityFields;
        }
        listener.on_headers_start(&header);
        self.resume_decoding_payload(state, db, listener)
    }

    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        debug_assert!(db.remaining() <= state.remaining_payload_and_padding() as usize);
        loop {
            match self.payload_state {
                PayloadState::ReadPadLength => {
                    let status = state.read_pad_length(db, true, listener);
                    if status != DecodeStatus::Done {
                        return status;
                    }
                    self.payload_state = if state.frame_header().has_priority() {
                        PayloadState::StartDecodingPriorityFields
                    } else {
                        PayloadState::ReadPayload
                    };
                }
                PayloadState::StartDecodingPriorityFields => {
                    let status =
                        state.start_decoding_structure_in_payload(&mut self.priority_fields, db, listener);
                    if status != DecodeStatus::Done {
                        self.payload_state = PayloadState::ResumeDecodingPriorityFields;
                        return status;
                    }
                    listener.on_headers_priority(&self.priority_fields);
                    self.payload_state = PayloadState::ReadPayload;
                }
                PayloadState::ResumeDecodingPriorityFields => {
                    let status =
                        state.resume_decoding_structure_in_payload(&mut self.priority_fields, db, listener);
                    if status != DecodeStatus::Done {
                        return status;
                    }
                    listener.on_headers_priority(&self.priority_fields);
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
                        listener.on_headers_end();
                        return DecodeStatus::Done;
                    }
                    return DecodeStatus::InProgress;
                }
            }
        }
    }
}
