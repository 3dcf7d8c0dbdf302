//! Tracks compressed header bytes sent on the headers stream until the
//! peer acknowledges them, notifying the listener of each header block.

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::time::Duration;

use crate::error::Error;
use crate::log::error;

/// Told about acknowledgements and retransmissions of one header block.
pub trait AckListener {
    fn on_packet_acked(&self, acked_bytes: u64, ack_delay: Duration);
    fn on_packet_retransmitted(&self, retransmitted_bytes: u64);
}

/// One header block's bytes on the headers stream.
#[derive(Clone)]
pub struct CompressedHeaderInfo {
    pub headers_stream_offset: u64,
    pub full_length: u64,
    pub unacked_length: u64,
    pub ack_listener: Option<Arc<dyn AckListener>>,
}

impl core::fmt::Debug for CompressedHeaderInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompressedHeaderInfo")
            .field("headers_stream_offset", &self.headers_stream_offset)
            .field("full_length", &self.full_length)
            .field("unacked_length", &self.unacked_length)
            .field("has_ack_listener", &self.ack_listener.is_some())
            .finish()
    }
}

impl CompressedHeaderInfo {
    fn end(&self) -> u64 {
        self.headers_stream_offset.saturating_add(self.full_length)
    }

    fn same_listener(&self, other: Option<&Arc<dyn AckListener>>) -> bool {
        match (&self.ack_listener, other) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Header blocks in stream order, dropped from the front once fully acked.
#[derive(Debug, Default, Clone)]
pub struct UnackedHeaders {
    headers: VecDeque<CompressedHeaderInfo>,
    /// Disjoint, sorted `[start, end)` ranges acknowledged so far.
    acked: Vec<(u64, u64)>,
}

impl UnackedHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompressedHeaderInfo> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Records bytes written to the headers stream. Bytes contiguous with
    /// the last block and sharing its listener extend that block.
    pub fn on_data_buffered(
        &mut self,
        offset: u64,
        length: u64,
        ack_listener: Option<Arc<dyn AckListener>>,
    ) {
        if let Some(last) = self.headers.back_mut() {
            if offset == last.end() && last.same_listener(ack_listener.as_ref()) {
                last.full_length += length;
                last.unacked_length += length;
                return;
            }
        }
        self.headers.push_back(CompressedHeaderInfo {
            headers_stream_offset: offset,
            full_length: length,
            unacked_length: length,
            ack_listener,
        });
    }

    /// Applies an acknowledgement of `[offset, offset + length)` and returns
    /// how many of those bytes had not been acked before.
    pub fn on_stream_frame_acked(
        &mut self,
        offset: u64,
        length: u64,
        ack_delay: Duration,
    ) -> Result<u64, Error> {
        let ack_end = offset
            .checked_add(length)
            .ok_or(Error::UnsentDataAcked { offset, length })?;
        let newly_acked = self.newly_acked(offset, ack_end);

        // (block index, bytes acked in it); checked in full before any
        // block or listener is touched.
        let mut hits: Vec<(usize, u64)> = Vec::new();
        for &(start, end) in &newly_acked {
            let mut acked_offset = start;
            let mut acked_length = end - start;
            for (index, header) in self.headers.iter().enumerate() {
                if acked_offset < header.headers_stream_offset {
                    break;
                }
                if acked_offset >= header.end() {
                    continue;
                }
                let header_offset = acked_offset - header.headers_stream_offset;
                let header_length = acked_length.min(header.full_length - header_offset);
                let already = hits
                    .iter()
                    .filter(|&&(i, _)| i == index)
                    .map(|&(_, n)| n)
                    .sum::<u64>();
                if header.unacked_length - already < header_length {
                    error!(
                        "unsent header data acked: unacked_length={} acked_length={}",
                        header.unacked_length - already,
                        header_length
                    );
                    return Err(Error::UnsentDataAcked { offset: acked_offset, length: header_length });
                }
                if header_length > 0 {
                    hits.push((index, header_length));
                }
                acked_offset += header_length;
                acked_length -= header_length;
            }
        }

        for (index, header_length) in hits {
            let header = &mut self.headers[index];
            if let Some(listener) = &header.ack_listener {
                listener.on_packet_acked(header_length, ack_delay);
            }
            header.unacked_length -= header_length;
        }
        let total = newly_acked.iter().map(|&(start, end)| end - start).sum();
        for range in newly_acked {
            self.add_acked(range);
        }
        // Blocks may be acked out of order but leave only from the front.
        while self.headers.front().is_some_and(|h| h.unacked_length == 0) {
            self.headers.pop_front();
        }
        Ok(total)
    }

    /// Tells the listeners of the blocks covering `[offset, offset + length)`
    /// how many of their bytes are being sent again.
    pub fn on_stream_frame_retransmitted(&mut self, mut offset: u64, mut length: u64) {
        for header in self.headers.iter() {
            if offset < header.headers_stream_offset {
                break;
            }
            if offset >= header.end() {
                continue;
            }
            let header_offset = offset - header.headers_stream_offset;
            let retransmitted = length.min(header.full_length - header_offset);
            if retransmitted > 0 {
                if let Some(listener) = &header.ack_listener {
                    listener.on_packet_retransmitted(retransmitted);
                }
            }
            offset += retransmitted;
            length -= retransmitted;
        }
    }

    /// Parts of `[start, end)` not already acked.
    fn newly_acked(&self, start: u64, end: u64) -> Vec<(u64, u64)> {
        let mut out = Vec::new();
        let mut cursor = start;
        for &(a, b) in &self.acked {
            if b <= cursor {
                continue;
            }
            if a >= end {
                break;
            }
            if a > cursor {
                out.push((cursor, a));
            }
            cursor = cursor.max(b);
            if cursor >= end {
                break;
            }
        }
        if cursor < end {
            out.push((cursor, end));
        }
        out
    }

    fn add_acked(&mut self, (start, end): (u64, u64)) {
        let pos = self.acked.partition_point(|&(a, _)| a < start);
        self.acked.insert(pos, (start, end));
        // Merge neighbours that touch or overlap.
        let mut merged: Vec<(u64, u64)> = Vec::with_capacity(self.acked.len());
        for &(a, b) in &self.acked {
            match merged.last_mut() {
                Some(last) if a <= last.1 => last.1 = last.1.max(b),
                _ => merged.push((a, b)),
            }
        }
        self.acked = merged;
    }
}
