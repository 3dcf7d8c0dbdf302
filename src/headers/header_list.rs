//! Bounded accumulation of a decoded header block.

use alloc::vec::Vec;
use core::fmt;

use super::handler::HeadersHandler;
use crate::log::error;

/// Overhead charged per field against the header list size (RFC 9113 §6.5.2).
pub const PER_HEADER_OVERHEAD: usize = 32;

/// Default SETTINGS_MAX_HEADER_LIST_SIZE we advertise.
pub const DEFAULT_MAX_HEADER_LIST_SIZE: usize = 16 * 1024;

/// Collects a header block, bounded by a maximum list size.
///
/// Fields that would push the list over the limit are not stored, but
/// their size still counts. If the block as a whole ended up over the limit
/// the list is emptied at block end, even the fields that fit: a block is
/// either kept whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuicHeaderList {
    header_list: Vec<(Vec<u8>, Vec<u8>)>,
    max_header_list_size: usize,
    current_header_list_size: usize,
    uncompressed_header_bytes: usize,
    compressed_header_bytes: usize,
    block_in_progress: bool,
    repeated_block_start: bool,
}

impl Default for QuicHeaderList {
    fn default() -> Self {
        Self::new()
    }
}

impl QuicHeaderList {
    pub fn new() -> Self {
        Self {
            header_list: Vec::new(),
            max_header_list_size: DEFAULT_MAX_HEADER_LIST_SIZE,
            current_header_list_size: 0,
            uncompressed_header_bytes: 0,
            compressed_header_bytes: 0,
            block_in_progress: false,
            repeated_block_start: false,
        }
    }

    /// Takes effect for fields added afterwards.
    pub fn set_max_header_list_size(&mut self, max_header_list_size: usize) {
        self.max_header_list_size = max_header_list_size;
    }

    pub fn max_header_list_size(&self) -> usize {
        self.max_header_list_size
    }

    /// Size charged so far, stored or not.
    pub fn current_header_list_size(&self) -> usize {
        self.current_header_list_size
    }

    pub fn uncompressed_header_bytes(&self) -> usize {
        self.uncompressed_header_bytes
    }

    pub fn compressed_header_bytes(&self) -> usize {
        self.compressed_header_bytes
    }

    /// True if a block was started while another was still open.
    pub fn saw_repeated_block_start(&self) -> bool {
        self.repeated_block_start
    }

    pub fn clear(&mut self) {
        self.header_list.clear();
        self.current_header_list_size = 0;
        self.uncompressed_header_bytes = 0;
        self.compressed_header_bytes = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.header_list
            .iter()
            .map(|(n, v)| (n.as_slice(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.header_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header_list.is_empty()
    }
}

impl HeadersHandler for QuicHeaderList {
    fn on_header_block_start(&mut self) {
        if self.block_in_progress {
            error!("on_header_block_start called more than once");
            self.repeated_block_start = true;
        }
        self.block_in_progress = true;
        self.current_header_list_size = 0;
    }

    fn on_header(&mut self, name: &[u8], value: &[u8]) {
        let field_size = name.len() + value.len() + PER_HEADER_OVERHEAD;
        let new_size = self.current_header_list_size.saturating_add(field_size);
        if new_size <= self.max_header_list_size {
            self.header_list.push((name.to_vec(), value.to_vec()));
        }
        self.current_header_list_size = new_size;
    }

    fn on_header_block_end(&mut self, uncompressed_header_bytes: usize, compressed_header_bytes: usize) {
        self.block_in_progress = false;
        self.uncompressed_header_bytes = uncompressed_header_bytes;
        self.compressed_header_bytes = compressed_header_bytes;
        if self.current_header_list_size > self.max_header_list_size {
            self.clear();
        }
    }
}

impl<'a> IntoIterator for &'a QuicHeaderList {
    type Item = &'a (Vec<u8>, Vec<u8>);
    type IntoIter = core::slice::Iter<'a, (Vec<u8>, Vec<u8>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.header_list.iter()
    }
}

impl fmt::Display for QuicHeaderList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for (name, value) in self.iter() {
            write!(f, "{}={}, ", name.escape_ascii(), value.escape_ascii())?;
        }
        f.write_str("}")
    }
}
