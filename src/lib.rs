#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! Resumable decoding of the HTTP/2 framing layer as carried on a QUIC
//! headers stream.
//!
//! - [`http2`]: frame decoder that accepts input in arbitrary pieces and
//!   reports each frame to a [`http2::FrameDecoderListener`].
//! - [`hpack`]: RFC 7541 header compression, decoder and encoder.
//! - [`headers`]: header list accumulation with size limits, and
//!   acknowledgement tracking for sent header blocks.
//! - [`adapter`]: SPDY-framer-style visitor interface over the frame decoder.

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

mod log;

pub mod error;
pub use error::{Error, HpackDecodeError};

pub mod varint;

pub mod data_reader;
pub use data_reader::{DataReader, Endianness};

pub mod config;
pub use config::DecoderConfig;

pub mod http2;
pub use http2::{DecodeBuffer, DecodeStatus, FrameDecoderListener, FrameHeader, Http2FrameDecoder};

pub mod hpack;

pub mod headers;
pub use headers::{HeadersHandler, QuicHeaderList};

pub mod adapter;
pub use adapter::{DecoderAdapter, FramerError, FramerVisitor, SpdyState};
