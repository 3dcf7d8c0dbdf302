//! Per-frame bookkeeping shared by the payload decoders.

use super::decode_buffer::DecodeBuffer;
use super::decode_status::DecodeStatus;
use super::listener::FrameDecoderListener;
use super::structure_decoder::StructureDecoder;
use super::structures::{FrameHeader, Http2Structure};
use crate::log::trace;

/// Header of the frame being decoded plus how much of its payload and
/// padding is still to come.
///
/// `remaining_payload + remaining_padding` never grows while a frame is
/// being decoded and never exceeds the header's payload length.
#[derive(Debug, Default, Clone)]
pub struct FrameDecoderState {
    pub(crate) header: FrameHeader,
    pub(crate) remaining_payload: u32,
    pub(crate) remaining_padding: u32,
    structure_decoder: StructureDecoder,
}

impl FrameDecoderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn remaining_payload(&self) -> u32 {
        self.remaining_payload
    }

    pub fn remaining_padding(&self) -> u32 {
        self.remaining_padding
    }

    pub fn remaining_payload_and_padding(&self) -> u32 {
        self.remaining_payload + self.remaining_padding
    }

    /// Reset the remainders for a frame that is about to be decoded.
    pub fn initialize_remainders(&mut self) {
        self.remaining_payload = self.header.payload_length;
        self.remaining_padding = 0;
    }

    /// Reads the Pad Length field of a PADDED frame, then splits what is
    /// left of the payload into non-padding payload and padding.
    pub fn read_pad_length(
        &mut self,
        db: &mut DecodeBuffer<'_>,
        report_pad_length: bool,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        debug_assert!(self.header.is_padded());
        let total_payload = self.header.payload_length;
        debug_assert_eq!(total_payload, self.remaining_payload);
        debug_assert_eq!(self.remaining_padding, 0);

        if db.has_data() {
            let pad_length = u32::from(db.decode_u8());
            let total_padding = pad_length + 1;
            if total_padding <= total_payload {
                self.remaining_padding = pad_length;
                self.remaining_payload = total_payload - total_padding;
                if report_pad_length {
                    listener.on_pad_length(pad_length as usize);
                }
                return DecodeStatus::Done;
            }
            let missing_length = total_padding - total_payload;
            // The Pad Length byte itself has been consumed.
            self.remaining_payload = total_payload - 1;
            self.remaining_padding = 0;
            listener.on_padding_too_long(&self.header, missing_length as usize);
            return DecodeStatus::Error;
        }

        if total_payload == 0 {
            self.remaining_payload = 0;
            self.remaining_padding = 0;
            listener.on_padding_too_long(&self.header, 1);
            return DecodeStatus::Error;
        }
        DecodeStatus::InProgress
    }

    /// Consumes whatever padding is available; true once all of it is gone.
    pub fn skip_padding(
        &mut self,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> bool {
        debug_assert_eq!(self.remaining_payload, 0);
        let avail = self.available_padding(db);
        if avail > 0 {
            listener.on_padding(&db.cursor()[..avail]);
            db.advance_cursor(avail);
            self.remaining_padding -= avail as u32;
        }
        self.remaining_padding == 0
    }

    pub fn available_payload(&self, db: &DecodeBuffer<'_>) -> usize {
        db.min_length_remaining(self.remaining_payload as usize)
    }

    pub fn available_padding(&self, db: &DecodeBuffer<'_>) -> usize {
        db.min_length_remaining(self.remaining_padding as usize)
    }

    pub fn available_payload_and_padding(&self, db: &DecodeBuffer<'_>) -> usize {
        db.min_length_remaining(self.remaining_payload_and_padding() as usize)
    }

    pub fn consume_payload(&mut self, amount: usize) {
        debug_assert!(amount <= self.remaining_payload as usize);
        self.remaining_payload -= amount as u32;
    }

    /// The single path by which a frame-size error is reported.
    pub fn report_frame_size_error(&self, listener: &mut dyn FrameDecoderListener) -> DecodeStatus {
        trace!(
            "frame size error: remaining_payload={}, remaining_padding={}, header: {}",
            self.remaining_payload,
            self.remaining_padding,
            self.header
        );
        listener.on_frame_size_error(&self.header);
        DecodeStatus::Error
    }

    pub fn start_decoding_structure_in_payload<S: Http2Structure>(
        &mut self,
        out: &mut S,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        match self
            .structure_decoder
            .start_in_payload(out, db, &mut self.remaining_payload)
        {
            DecodeStatus::Error => self.report_frame_size_error(listener),
            status => status,
        }
    }

    pub fn resume_decoding_structure_in_payload<S: Http2Structure>(
        &mut self,
        out: &mut S,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        if self
            .structure_decoder
            .resume_in_payload(out, db, &mut self.remaining_payload)
        {
            DecodeStatus::Done
        } else if self.remaining_payload > 0 {
            DecodeStatus::InProgress
        } else {
            self.report_frame_size_error(listener)
        }
    }

    pub fn start_decoding_frame_header(&mut self, db: &mut DecodeBuffer<'_>) -> bool {
        self.structure_decoder.start(&mut self.header, db)
    }

    pub fn resume_decoding_frame_header(&mut self, db: &mut DecodeBuffer<'_>) -> bool {
        self.structure_decoder.resume(&mut self.header, db)
    }
}
