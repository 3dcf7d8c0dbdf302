//! Resumable HTTP/2 frame decoding (RFC 9113 §4, §6).
//!
//! Input may be split at any byte, including inside the 9-byte frame
//! header or a fixed-size field. Decoding proceeds in layers:
//!
//! - [`DecodeBuffer`] is a cursor over one input slice;
//! - [`StructureDecoder`] stages fixed-size fields that straddle inputs;
//! - [`FrameDecoderState`] tracks the current header and how much payload
//!   and padding remain;
//! - the [`payload`] decoders, one per frame type, turn payload bytes into
//!   [`FrameDecoderListener`] events;
//! - [`Http2FrameDecoder`] reads headers and dispatches to them.
//!
//! Protocol checks beyond framing (stream-id rules, CONTINUATION sequencing,
//! HPACK) are left to [`crate::adapter`].

pub mod constants;
mod decode_buffer;
mod decode_status;
mod frame_builder;
mod frame_decoder;
pub mod listener;
pub mod payload;
mod state;
mod structure_decoder;
pub mod structures;

pub use constants::*;
pub use decode_buffer::DecodeBuffer;
pub use decode_status::DecodeStatus;
pub use frame_builder::FrameBuilder;
pub use frame_decoder::Http2FrameDecoder;
pub use listener::{FrameDecoderListener, LoggingListener, NoOpListener};
pub use state::FrameDecoderState;
pub use structure_decoder::StructureDecoder;
pub use structures::*;
