//! Frame-at-a-time driver: common header first, then the payload decoder
//! for the header's type.
//!
//! ```text
//!   StartDecodingHeader --partial--> ResumeDecodingHeader
//!          |                                |
//!          +-------- header complete -------+
//!          v
//!   payload decoder --InProgress--> ResumeDecodingPayload
//!          |  \
//!        Done  Error / rejected / oversized --> DiscardPayload
//!          v                                        |
//!   StartDecodingHeader <----- payload skipped -----+
//! ```

use super::constants::DEFAULT_MAX_FRAME_SIZE;
use super::decode_buffer::DecodeBuffer;
use super::decode_status::DecodeStatus;
use super::listener::FrameDecoderListener;
use super::payload::PayloadDecoder;
use super::state::FrameDecoderState;
use super::structures::FrameHeader;
use crate::log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartDecodingHeader,
    ResumeDecodingHeader,
    ResumeDecodingPayload,
    DiscardPayload,
}

/// Decodes one frame per [`decode_frame`](Self::decode_frame) call that
/// returns [`DecodeStatus::Done`], reporting it to the listener passed in.
///
/// The decoder never reads beyond the current frame: a call returns once
/// the frame completes even if more input is available.
#[derive(Debug, Clone)]
pub struct Http2FrameDecoder {
    frame_state: FrameDecoderState,
    state: State,
    payload_decoder: PayloadDecoder,
    maximum_payload_size: u32,
}

impl Default for Http2FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Http2FrameDecoder {
    pub fn new() -> Self {
        Self {
            frame_state: FrameDecoderState::new(),
            state: State::StartDecodingHeader,
            payload_decoder: PayloadDecoder::default(),
            maximum_payload_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Frames with a longer payload are reported through
    /// `on_frame_size_error` and skipped.
    pub fn set_maximum_payload_size(&mut self, size: u32) {
        self.maximum_payload_size = size;
    }

    pub fn maximum_payload_size(&self) -> u32 {
        self.maximum_payload_size
    }

    /// Header of the current (or most recent) frame.
    pub fn frame_header(&self) -> &FrameHeader {
        self.frame_state.frame_header()
    }

    pub fn remaining_payload(&self) -> u32 {
        self.frame_state.remaining_payload()
    }

    pub fn remaining_padding(&self) -> u32 {
        self.frame_state.remaining_padding()
    }

    pub fn is_discarding_payload(&self) -> bool {
        self.state == State::DiscardPayload
    }

    /// Decodes from `db` until the current frame is complete, an error is
    /// found, or the input runs out.
    ///
    /// After `Error`, further calls skip the rest of the bad frame and then
    /// continue with the next one.
    pub fn decode_frame(
        &mut self,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        match self.state {
            State::StartDecodingHeader => {
                if self.frame_state.start_decoding_frame_header(db) {
                    return self.start_decoding_payload(db, listener);
                }
                self.state = State::ResumeDecodingHeader;
                DecodeStatus::InProgress
            }
            State::ResumeDecodingHeader => {
                if self.frame_state.resume_decoding_frame_header(db) {
                    return self.start_decoding_payload(db, listener);
                }
                DecodeStatus::InProgress
            }
            State::ResumeDecodingPayload => self.resume_decoding_payload(db, listener),
            State::DiscardPayload => self.discard_payload(db),
        }
    }

    fn start_decoding_payload(
        &mut self,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let header = *self.frame_state.frame_header();

        if !listener.on_frame_header(&header) {
            debug!("listener rejected frame header: {header}");
            self.state = State::DiscardPayload;
            self.frame_state.initialize_remainders();
            return DecodeStatus::Error;
        }

        if header.payload_length > self.maximum_payload_size {
            debug!(
                "payload length {} above maximum {}: {header}",
                header.payload_length, self.maximum_payload_size
            );
            self.state = State::DiscardPayload;
            self.frame_state.initialize_remainders();
            listener.on_frame_size_error(&header);
            return DecodeStatus::Error;
        }

        // Payload decoders only see the flags defined for their type.
        self.frame_state
            .header
            .retain_flags(header.frame_type.valid_flags());
        self.payload_decoder = PayloadDecoder::for_frame_type(header.frame_type);

        let mut subset = db.subset(header.payload_length as usize);
        let status =
            self.payload_decoder
                .start_decoding_payload(&mut self.frame_state, &mut subset, listener);
        db.advance_cursor(subset.offset());
        self.finish_step(status)
    }

    fn resume_decoding_payload(
        &mut self,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        let remaining = self.frame_state.remaining_payload_and_padding() as usize;
        let mut subset = db.subset(remaining);
        let status =
            self.payload_decoder
                .resume_decoding_payload(&mut self.frame_state, &mut subset, listener);
        db.advance_cursor(subset.offset());
        self.finish_step(status)
    }

    fn finish_step(&mut self, status: DecodeStatus) -> DecodeStatus {
        self.state = match status {
            DecodeStatus::Done => State::StartDecodingHeader,
            DecodeStatus::InProgress => State::ResumeDecodingPayload,
            DecodeStatus::Error => State::DiscardPayload,
        };
        status
    }

    fn discard_payload(&mut self, db: &mut DecodeBuffer<'_>) -> DecodeStatus {
        let fs = &mut self.frame_state;
        fs.remaining_payload += fs.remaining_padding;
        fs.remaining_padding = 0;
        let avail = fs.available_payload(db);
        if avail > 0 {
            fs.consume_payload(avail);
            db.advance_cursor(avail);
        }
        if fs.remaining_payload == 0 {
            self.state = State::StartDecodingHeader;
            return DecodeStatus::Done;
        }
        DecodeStatus::InProgress
    }
}
