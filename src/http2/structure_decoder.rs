//! Decodes fixed-size structures that may arrive split across inputs.
//!
//! When the whole structure is already in the input it is decoded in place.
//! Otherwise the available prefix is copied into a small inline buffer and
//! later calls top it up until the structure can be decoded from there.

use heapless::Vec;

use super::constants::FRAME_HEADER_SIZE;
use super::decode_buffer::DecodeBuffer;
use super::decode_status::DecodeStatus;
use super::structures::Http2Structure;
use crate::log::trace;

/// Largest structure this decoder can stage (the frame header).
const STAGING_CAPACITY: usize = FRAME_HEADER_SIZE;

#[derive(Debug, Default, Clone)]
pub struct StructureDecoder {
    staged: Vec<u8, STAGING_CAPACITY>,
}

impl StructureDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of a partial structure held so far.
    pub fn offset(&self) -> usize {
        self.staged.len()
    }

    fn stage(&mut self, db: &mut DecodeBuffer<'_>, count: usize) -> usize {
        let bytes = &db.cursor()[..count];
        if self.staged.extend_from_slice(bytes).is_err() {
            return 0;
        }
        db.advance_cursor(count);
        count
    }

    fn decode_staged<S: Http2Structure>(&self, out: &mut S) {
        *out = S::decode(&mut DecodeBuffer::new(&self.staged));
    }

    // -----------------------------------------------------------------------
    // Unbounded by a payload (frame headers)
    // -----------------------------------------------------------------------

    /// Returns true if `out` was decoded; false if more input is needed.
    pub fn start<S: Http2Structure>(&mut self, out: &mut S, db: &mut DecodeBuffer<'_>) -> bool {
        debug_assert!(S::ENCODED_SIZE <= STAGING_CAPACITY);
        if db.remaining() >= S::ENCODED_SIZE {
            *out = S::decode(db);
            return true;
        }
        self.staged.clear();
        let count = db.min_length_remaining(S::ENCODED_SIZE);
        self.stage(db, count);
        false
    }

    pub fn resume<S: Http2Structure>(&mut self, out: &mut S, db: &mut DecodeBuffer<'_>) -> bool {
        let Some(needed) = S::ENCODED_SIZE.checked_sub(self.offset()) else {
            return false;
        };
        let count = db.min_length_remaining(needed);
        self.stage(db, count);
        if count == needed {
            self.decode_staged(out);
            return true;
        }
        false
    }

    // -----------------------------------------------------------------------
    // Bounded by the remaining payload of the current frame
    // -----------------------------------------------------------------------

    /// `Done` when decoded, `InProgress` when the payload has more bytes to
    /// come, `Error` when the payload cannot hold the structure.
    pub fn start_in_payload<S: Http2Structure>(
        &mut self,
        out: &mut S,
        db: &mut DecodeBuffer<'_>,
        remaining_payload: &mut u32,
    ) -> DecodeStatus {
        let size = S::ENCODED_SIZE;
        if db.remaining() >= size && *remaining_payload as usize >= size {
            *out = S::decode(db);
            *remaining_payload -= size as u32;
            return DecodeStatus::Done;
        }
        self.staged.clear();
        let count = db.min_length_remaining(size.min(*remaining_payload as usize));
        *remaining_payload -= self.stage(db, count) as u32;
        trace!(
            "staged {count} of {size} structure bytes, {} payload left",
            *remaining_payload
        );
        if *remaining_payload > 0 && db.is_empty() {
            DecodeStatus::InProgress
        } else {
            DecodeStatus::Error
        }
    }

    /// Returns true if `out` was decoded.
    pub fn resume_in_payload<S: Http2Structure>(
        &mut self,
        out: &mut S,
        db: &mut DecodeBuffer<'_>,
        remaining_payload: &mut u32,
    ) -> bool {
        let Some(needed) = S::ENCODED_SIZE.checked_sub(self.offset()) else {
            return false;
        };
        let count = db.min_length_remaining(needed.min(*remaining_payload as usize));
        *remaining_payload -= self.stage(db, count) as u32;
        if count == needed {
            self.decode_staged(out);
            return true;
        }
        false
    }
}
