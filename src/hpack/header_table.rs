//! The header table: static entries followed by a FIFO dynamic table
//! (RFC 7541 §2.3).

use alloc::collections::VecDeque;

use super::constants::{DEFAULT_HEADER_TABLE_SIZE_SETTING, STATIC_TABLE_SIZE};
use super::entry::{entry_size, EntryType, HpackEntry};
use super::static_table::{obtain_hpack_static_table, HpackStaticTable};

/// Static plus dynamic entries under one index space.
///
/// Index 1..=61 is the static table; 62 is the newest dynamic entry. Dynamic
/// indices shift on every insertion and eviction, so they are computed from
/// insertion counters on demand and never stored.
#[derive(Debug, Clone)]
pub struct HpackHeaderTable {
    static_table: &'static HpackStaticTable,
    /// Newest entry first.
    dynamic: VecDeque<HpackEntry<'static>>,
    settings_size_bound: usize,
    max_size: usize,
    size: usize,
    /// Insertions ever made, counting the static entries.
    total_insertions: usize,
}

impl Default for HpackHeaderTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackHeaderTable {
    pub fn new() -> Self {
        let default_size = DEFAULT_HEADER_TABLE_SIZE_SETTING as usize;
        Self {
            static_table: obtain_hpack_static_table(),
            dynamic: VecDeque::new(),
            settings_size_bound: default_size,
            max_size: default_size,
            size: 0,
            total_insertions: STATIC_TABLE_SIZE,
        }
    }

    /// Upper bound on `max_size`, from SETTINGS_HEADER_TABLE_SIZE.
    pub fn settings_size_bound(&self) -> usize {
        self.settings_size_bound
    }

    /// Current limit on `size`, from the last table size update.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Sum of the sizes of the dynamic entries.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dynamic_entries(&self) -> impl Iterator<Item = &HpackEntry<'static>> {
        self.dynamic.iter()
    }

    pub fn get_by_index(&self, index: usize) -> Option<&HpackEntry<'static>> {
        match index {
            0 => None,
            1..=STATIC_TABLE_SIZE => self.static_table.entries().get(index - 1),
            _ => self.dynamic.get(index - STATIC_TABLE_SIZE - 1),
        }
    }

    /// The lowest-indexed entry with this name.
    pub fn get_by_name(&self, name: &[u8]) -> Option<&HpackEntry<'static>> {
        self.static_table
            .get_by_name(name)
            .or_else(|| self.dynamic.iter().find(|e| e.name() == name))
    }

    pub fn get_by_name_and_value(&self, name: &[u8], value: &[u8]) -> Option<&HpackEntry<'static>> {
        self.static_table
            .get_by_name_and_value(name, value)
            .or_else(|| {
                self.dynamic
                    .iter()
                    .find(|e| e.name() == name && e.value() == value)
            })
    }

    /// Wire index of `entry`; `None` for lookup entries.
    pub fn index_of(&self, entry: &HpackEntry<'_>) -> Option<usize> {
        match entry.entry_type() {
            EntryType::Static => Some(entry.insertion_index() + 1),
            EntryType::Dynamic => {
                Some(self.total_insertions - entry.insertion_index() + STATIC_TABLE_SIZE)
            }
            EntryType::Lookup => None,
        }
    }

    /// Applies a dynamic table size update, evicting to fit.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.evict_to_fit(0);
    }

    /// Applies a new SETTINGS_HEADER_TABLE_SIZE; the table shrinks to it
    /// immediately and may grow back only to it.
    pub fn set_settings_header_table_size(&mut self, settings_size: usize) {
        self.settings_size_bound = settings_size;
        self.set_max_size(settings_size);
    }

    /// Inserts a copy of the pair, evicting older entries first. An entry
    /// larger than `max_size` empties the table and is not inserted.
    pub fn try_add_entry(&mut self, name: &[u8], value: &[u8]) -> Option<&HpackEntry<'static>> {
        let new_size = entry_size(name.len(), value.len());
        self.evict_to_fit(new_size);
        if new_size > self.max_size {
            debug_assert!(self.dynamic.is_empty());
            return None;
        }
        self.dynamic
            .push_front(HpackEntry::new_dynamic(name, value, self.total_insertions));
        self.total_insertions += 1;
        self.size += new_size;
        self.dynamic.front()
    }

    fn evict_to_fit(&mut self, incoming: usize) {
        while self.size + incoming > self.max_size {
            match self.dynamic.pop_back() {
                Some(oldest) => self.size -= oldest.size(),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_indices() {
        let table = HpackHeaderTable::new();
        assert!(table.get_by_index(0).is_none());
        let e = table.get_by_index(2).unwrap();
        assert_eq!((e.name(), e.value()), (&b":method"[..], &b"GET"[..]));
        assert_eq!(table.index_of(e), Some(2));
        assert!(table.get_by_index(62).is_none());
    }

    #[test]
    fn dynamic_indices_shift_on_insert() {
        let mut table = HpackHeaderTable::new();
        table.try_add_entry(b"a", b"1").unwrap();
        table.try_add_entry(b"b", b"2").unwrap();

        let newest = table.get_by_index(62).unwrap();
        assert_eq!(newest.name(), b"b");
        assert_eq!(table.index_of(newest), Some(62));
        let older = table.get_by_index(63).unwrap();
        assert_eq!(older.name(), b"a");
        assert_eq!(table.index_of(older), Some(63));
        assert_eq!(table.size(), 2 * 34);
    }

    #[test]
    fn index_of_lookup_is_none() {
        let table = HpackHeaderTable::new();
        assert_eq!(table.index_of(&HpackEntry::lookup(b"x", b"y")), None);
    }

    #[test]
    fn eviction_is_fifo() {
        let mut table = HpackHeaderTable::new();
        table.set_max_size(34 * 2);
        table.try_add_entry(b"a", b"1");
        table.try_add_entry(b"b", b"2");
        table.try_add_entry(b"c", b"3");
        let names: alloc::vec::Vec<_> = table.dynamic_entries().map(|e| e.name().to_vec()).collect();
        assert_eq!(names, [b"c".to_vec(), b"b".to_vec()]);
        assert_eq!(table.get_by_index(63).map(|e| e.name()), Some(&b"b"[..]));
    }

    #[test]
    fn oversized_entry_empties_table() {
        let mut table = HpackHeaderTable::new();
        table.set_max_size(40);
        table.try_add_entry(b"a", b"1").unwrap();
        assert!(table.try_add_entry(b"name", b"value-too-long").is_none());
        assert_eq!(table.size(), 0);
        assert!(table.dynamic_entries().next().is_none());
    }

    #[test]
    fn settings_bound_shrinks_table() {
        let mut table = HpackHeaderTable::new();
        table.try_add_entry(b"a", b"1");
        table.set_settings_header_table_size(10);
        assert_eq!(table.settings_size_bound(), 10);
        assert_eq!(table.max_size(), 10);
        assert_eq!(table.size(), 0);
    }

    #[test]
    fn lookups_prefer_static_then_newest() {
        let mut table = HpackHeaderTable::new();
        table.try_add_entry(b"x-a", b"old");
        table.try_add_entry(b"x-a", b"new");
        assert_eq!(table.get_by_name(b"x-a").unwrap().value(), b"new");
        let e = table.get_by_name_and_value(b"x-a", b"old").unwrap();
        assert_eq!(table.index_of(e), Some(63));
        assert!(table.get_by_name(b":path").unwrap().is_static());
    }
}
