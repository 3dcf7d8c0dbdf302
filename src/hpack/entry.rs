//! Header table entries.

use alloc::borrow::Cow;
use core::fmt;

use super::constants::ENTRY_SIZE_OVERHEAD;

/// Where an entry lives, which decides how its index is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Static,
    Dynamic,
    /// A probe built for a table search; never stored and has no index.
    Lookup,
}

/// A name/value pair plus the bookkeeping needed to find its HPACK index.
///
/// Static and lookup entries borrow their bytes; dynamic entries own them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpackEntry<'a> {
    name: Cow<'a, [u8]>,
    value: Cow<'a, [u8]>,
    entry_type: EntryType,
    insertion_index: usize,
}

impl HpackEntry<'static> {
    pub(crate) const fn new_static(
        name: &'static [u8],
        value: &'static [u8],
        insertion_index: usize,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            value: Cow::Borrowed(value),
            entry_type: EntryType::Static,
            insertion_index,
        }
    }

    pub(crate) fn new_dynamic(name: &[u8], value: &[u8], insertion_index: usize) -> Self {
        Self {
            name: Cow::Owned(name.to_vec()),
            value: Cow::Owned(value.to_vec()),
            entry_type: EntryType::Dynamic,
            insertion_index,
        }
    }
}

impl<'a> HpackEntry<'a> {
    pub fn lookup(name: &'a [u8], value: &'a [u8]) -> Self {
        Self {
            name: Cow::Borrowed(name),
            value: Cow::Borrowed(value),
            entry_type: EntryType::Lookup,
            insertion_index: 0,
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn is_static(&self) -> bool {
        self.entry_type == EntryType::Static
    }

    pub fn is_lookup(&self) -> bool {
        self.entry_type == EntryType::Lookup
    }

    /// Position in the sequence of insertions into the owning table.
    pub fn insertion_index(&self) -> usize {
        self.insertion_index
    }

    pub fn size(&self) -> usize {
        entry_size(self.name.len(), self.value.len())
    }
}

/// Size an entry with these lengths occupies in a header table.
pub const fn entry_size(name_len: usize, value_len: usize) -> usize {
    name_len + value_len + ENTRY_SIZE_OVERHEAD
}

impl Default for HpackEntry<'_> {
    fn default() -> Self {
        Self::lookup(b"", b"")
    }
}

impl fmt::Display for HpackEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.entry_type {
            EntryType::Static => "static",
            EntryType::Dynamic => "dynamic",
            EntryType::Lookup => "lookup",
        };
        write!(
            f,
            "{{ name: \"{}\", value: \"{}\", index: {} {} }}",
            self.name.escape_ascii(),
            self.value.escape_ascii(),
            self.insertion_index,
            kind
        )
    }
}
