//! Ordered header storage for callers that do not supply a handler.

use alloc::vec::Vec;
use core::fmt;

/// Header fields in first-seen order, one entry per distinct name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    fields: Vec<(Vec<u8>, Vec<u8>)>,
}

impl HeaderBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, or appends `value` to an existing field of the same
    /// name: separated by `"; "` for cookie and by NUL otherwise.
    pub fn append_value_or_add_header(&mut self, name: &[u8], value: &[u8]) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => {
                let separator: &[u8] = if name == b"cookie" { b"; " } else { b"\0" };
                existing.extend_from_slice(separator);
                existing.extend_from_slice(value);
            }
            None => self.fields.push((name.to_vec(), value.to_vec())),
        }
    }

    pub fn get(&self, name: &[u8]) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.fields.iter().map(|(n, v)| (n.as_slice(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl fmt::Display for HeaderBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{\n")?;
        for (name, value) in self.iter() {
            writeln!(f, "  {}: {}", name.escape_ascii(), value.escape_ascii())?;
        }
        f.write_str("}\n")
    }
}
