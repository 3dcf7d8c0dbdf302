//! One incremental decoder per frame type.
//!
//! Each decoder records where it stopped in its own small state enum so
//! that a later call with more input picks up at the same byte. A fresh
//! decoder is selected for every frame by [`PayloadDecoder::for_frame_type`].

mod altsvc;
mod continuation;
mod data;
mod goaway;
mod headers;
mod ping;
mod priority;
mod push_promise;
mod rst_stream;
mod settings;
mod unknown;
mod window_update;

pub use altsvc::AltSvcPayloadDecoder;
pub use continuation::ContinuationPayloadDecoder;
pub use data::DataPayloadDecoder;
pub use goaway::GoAwayPayloadDecoder;
pub use headers::HeadersPayloadDecoder;
pub use ping::PingPayloadDecoder;
pub use priority::PriorityPayloadDecoder;
pub use push_promise::PushPromisePayloadDecoder;
pub use rst_stream::RstStreamPayloadDecoder;
pub use settings::SettingsPayloadDecoder;
pub use unknown::UnknownPayloadDecoder;
pub use window_update::WindowUpdatePayloadDecoder;

use super::constants::FrameType;
use super::decode_buffer::DecodeBuffer;
use super::decode_status::DecodeStatus;
use super::listener::FrameDecoderListener;
use super::state::FrameDecoderState;

/// The payload decoder for the frame in progress.
#[derive(Debug, Clone)]
pub enum PayloadDecoder {
    Data(DataPayloadDecoder),
    Headers(HeadersPayloadDecoder),
    Priority(PriorityPayloadDecoder),
    RstStream(RstStreamPayloadDecoder),
    Settings(SettingsPayloadDecoder),
    PushPromise(PushPromisePayloadDecoder),
    Ping(PingPayloadDecoder),
    GoAway(GoAwayPayloadDecoder),
    WindowUpdate(WindowUpdatePayloadDecoder),
    Continuation(ContinuationPayloadDecoder),
    AltSvc(AltSvcPayloadDecoder),
    Unknown(UnknownPayloadDecoder),
}

impl Default for PayloadDecoder {
    fn default() -> Self {
        Self::Unknown(UnknownPayloadDecoder)
    }
}

macro_rules! dispatch {
    ($self:expr, $d:ident => $call:expr) => {
        match $self {
            PayloadDecoder::Data($d) => $call,
            PayloadDecoder::Headers($d) => $call,
            PayloadDecoder::Priority($d) => $call,
            PayloadDecoder::RstStream($d) => $call,
            PayloadDecoder::Settings($d) => $call,
            PayloadDecoder::PushPromise($d) => $call,
            PayloadDecoder::Ping($d) => $call,
            PayloadDecoder::GoAway($d) => $call,
            PayloadDecoder::WindowUpdate($d) => $call,
            PayloadDecoder::Continuation($d) => $call,
            PayloadDecoder::AltSvc($d) => $call,
            PayloadDecoder::Unknown($d) => $call,
        }
    };
}

impl PayloadDecoder {
    pub fn for_frame_type(frame_type: FrameType) -> Self {
        match frame_type {
            FrameType::Data => Self::Data(Default::default()),
            FrameType::Headers => Self::Headers(Default::default()),
            FrameType::Priority => Self::Priority(Default::default()),
            FrameType::RstStream => Self::RstStream(Default::default()),
            FrameType::Settings => Self::Settings(Default::default()),
            FrameType::PushPromise => Self::PushPromise(Default::default()),
            FrameType::Ping => Self::Ping(Default::default()),
            FrameType::GoAway => Self::GoAway(Default::default()),
            FrameType::WindowUpdate => Self::WindowUpdate(Default::default()),
            FrameType::Continuation => Self::Continuation(ContinuationPayloadDecoder),
            FrameType::AltSvc => Self::AltSvc(Default::default()),
            FrameType::Unknown(_) => Self::Unknown(UnknownPayloadDecoder),
        }
    }

    /// `db` must not extend past the frame's payload.
    pub fn start_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        dispatch!(self, d => d.start_decoding_payload(state, db, listener))
    }

    /// `db` must not extend past the frame's remaining payload and padding.
    pub fn resume_decoding_payload(
        &mut self,
        state: &mut FrameDecoderState,
        db: &mut DecodeBuffer<'_>,
        listener: &mut dyn FrameDecoderListener,
    ) -> DecodeStatus {
        dispatch!(self, d => d.resume_decoding_payload(state, db, listener))
    }
}
