//! DATA payload (RFC 9113 §6.1).

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PayloadState {
    #[default]
    ReadPadLength,
    ReadPayload,
    SkipPadding,
}

#[derive(Debug, Default, Clone)]
pub struct DataPayloadDecoder {
    payload_state: PayloadState,
}

impl DataPayloadDecoder {
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

        if !header.is_padded() {
            if db.remaining() == total_length {
                listener.on_data_start(&header);
                if total_length > 0 {
                    listener.on_data_payload(&db.cursor()[..total_length]);
                    db.advance_cursor(total_length);
                    state.consume_payload(total_length);
                }
                listener.on_data_end();
                return DecodeStatus::Done;
            }
            self.payload_state = PayloadState::ReadPayload;
        } else {
            self.payload_state = PayloadState::ReadPadLength;
        }
        listener.on_data_start(&header);
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
                    self.payload_state = PayloadState::ReadPayload;
                }
                PayloadState::ReadPayload => {
                    let avail = state.available_payload(db);
                    if avail > 0 {
                        listener.on_data_payload(&db.cursor()[..avail]);
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
                        listener.on_data_end();
                        return DecodeStatus::Done;
                    }
                    return DecodeStatus::InProgress;
                }
            }
        }
    }
}
