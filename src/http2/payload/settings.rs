//! SETTINGS payload (RFC 9113 §6.5).
//!
//! An ACK must be empty. Otherwise the payload is a run of six-byte
//! entries, so a length that is not a multiple of six ends in a frame-size
//! error when the last partial entry cannot be completed.

use crate::http2::decode_buffer::DecodeBuffer;
use crate::http2::decode_status::DecodeStatus;
use crate::http2::listener::FrameDecoderListener;
use crate::http2::state::FrameDecoderState;
use crate::http2::structures::SettingFields;

#[derive(Debug, Default, Clone)]
pub struct SettingsPayloadDecoder {
    setting_fields: SettingFields,
}

impl SettingsPayloadDecoder {
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let header = *state.frame_header();
        state.initialize_remainders();
        if header.is_ack() {
            if header.payload_length == 0 {
                listener.on_settings_ack(&header);
                return DecodeStatus::Done;
            }
            return state.report_frame_size_error(listener);
        }
        listener.on_settings_start(&header);
        self.start_decoding_settings(state, db, listener)
    }

    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let status = state.resume_decoding_structure_in_payload(&mut self.setting_fields, db, listener);
        if status != DecodeStatus::Done {
            return Self::handle_not_done(state, status);
        }
        listener.on_setting(&self.setting_fields);
        self.start_decoding_settings(state, db, listener)
    }

    fn start_decoding_settings(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        while state.remaining_payload() > 0 {
            let status = state.start_decoding_structure_in_payload(&mut self.setting_fields, db, listener);
            if status != DecodeStatus::Done {
                return Self::handle_not_done(state, status);
            }
            listener.on_setting(&self.setting_fields);
        }
        listener.on_settings_end();
        DecodeStatus::Done
    }

    fn handle_not_done(state: &FrameDecoderState, status: DecodeStatus) -> DecodeStatus {
        debug_assert!(
            (status == DecodeStatus::InProgress && state.remaining_payload() > 0)
                || (status == DecodeStatus::Error && state.remaining_payload() == 0)
        );
        status
    }
}
