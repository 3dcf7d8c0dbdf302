//! Forward-only cursor over borrowed input.
//!
//! Every slice handed out borrows from the original input, so listeners see
//! zero-copy views that live as long as the caller's buffer. All multi-byte
//! integers are big-endian.
//!
//! The fallible `read_*` methods poison the cursor on failure: the position
//! jumps to the end of the buffer, so a chain of reads whose intermediate
//! results are not checked still fails as a whole. The `decode_*` methods
//! are for callers that have already checked [`DecodeBuffer::remaining`].

use crate::error::Error;
use crate::varint;

#[derive(Debug, Clone)]
pub struct DecodeBuffer<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> DecodeBuffer<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    pub fn full_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == self.buffer.len()
    }

    pub fn has_data(&self) -> bool {
        !self.is_empty()
    }

    pub fn min_length_remaining(&self, length: usize) -> usize {
        length.min(self.remaining())
    }

    /// The unconsumed bytes, without advancing.
    pub fn cursor(&self) -> &'a [u8] {
        &self.buffer[self.cursor..]
    }

    pub fn advance_cursor(&mut self, amount: usize) {
        debug_assert!(amount <= self.remaining());
        self.cursor = (self.cursor + amount).min(self.buffer.len());
    }

    /// A new cursor over at most the next `length` unconsumed bytes.
    ///
    /// The parent is not advanced; callers fold the subset's
    /// [`offset`](Self::offset) back with [`advance_cursor`](Self::advance_cursor).
    pub fn subset(&self, length: usize) -> DecodeBuffer<'a> {
        let end = self.cursor + self.min_length_remaining(length);
        DecodeBuffer::new(&self.buffer[self.cursor..end])
    }

    fn poison(&mut self) {
        self.cursor = self.buffer.len();
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        match self.cursor().get(..N) {
            Some(bytes) => {
                let mut out = [0u8; N];
                out.copy_from_slice(bytes);
                self.cursor += N;
                Ok(out)
            }
            None => {
                self.poison();
                Err(Error::BufferTooSmall { needed: N })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Fallible reads
    // -----------------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.take::<1>().map(|b| b[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.take().map(u16::from_be_bytes)
    }

    pub fn read_u24(&mut self) -> Result<u32, Error> {
        self.take::<3>()
            .map(|b| u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    /// A 32-bit field whose high bit is reserved; the bit is masked off.
    pub fn read_u31(&mut self) -> Result<u32, Error> {
        self.read_u32().map(|v| v & 0x7fff_ffff)
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.take().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        self.take().map(u64::from_be_bytes)
    }

    pub fn read_var_int62(&mut self) -> Result<u64, Error> {
        match varint::decode_varint(self.cursor()) {
            Ok((value, len)) => {
                self.cursor += len;
                Ok(value)
            }
            Err(e) => {
                self.poison();
                Err(e)
            }
        }
    }

    /// Borrow the next `length` bytes and advance past them.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8], Error> {
        let bytes = self.cursor().get(..length);
        match bytes {
            Some(bytes) => {
                self.cursor += length;
                Ok(bytes)
            }
            None => {
                self.poison();
                Err(Error::BufferTooSmall { needed: length })
            }
        }
    }

    /// Borrow everything left and advance to the end.
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let rest = self.cursor();
        self.poison();
        rest
    }

    pub fn peek_remaining(&self) -> &'a [u8] {
        self.cursor()
    }

    pub fn peek_byte(&self) -> Option<u8> {
        self.buffer.get(self.cursor).copied()
    }

    // -----------------------------------------------------------------------
    // Unchecked decodes
    //
    // Callers guarantee the bytes are present. A shortfall still cannot read
    // out of bounds: it poisons the cursor and yields zero.
    // -----------------------------------------------------------------------

    pub fn decode_u8(&mut self) -> u8 {
        debug_assert!(self.remaining() >= 1);
        self.read_u8().unwrap_or(0)
    }

    pub fn decode_u16(&mut self) -> u16 {
        debug_assert!(self.remaining() >= 2);
        self.read_u16().unwrap_or(0)
    }

    pub fn decode_u24(&mut self) -> u32 {
        debug_assert!(self.remaining() >= 3);
        self.read_u24().unwrap_or(0)
    }

    pub fn decode_u31(&mut self) -> u32 {
        debug_assert!(self.remaining() >= 4);
        self.read_u31().unwrap_or(0)
    }

    pub fn decode_u32(&mut self) -> u32 {
        debug_assert!(self.remaining() >= 4);
        self.read_u32().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_widths() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a];
        let mut db = DecodeBuffer::new(&bytes);
        assert_eq!(db.read_u8().unwrap(), 0x01);
        assert_eq!(db.read_u16().unwrap(), 0x0203);
        assert_eq!(db.read_u24().unwrap(), 0x04_0506);
        assert_eq!(db.read_u32().unwrap(), 0x0708_090a);
        assert!(db.is_empty());
        assert_eq!(db.offset(), 10);
    }

    #[test]
    fn u31_masks_reserved_bit() {
        let mut db = DecodeBuffer::new(&[0xff; 4]);
        assert_eq!(db.read_u31().unwrap(), 0x7fff_ffff);
    }

    #[test]
    fn failed_read_poisons() {
        let bytes = [0xaa, 0xbb, 0xcc];
        let mut db = DecodeBuffer::new(&bytes);
        assert_eq!(db.read_u32(), Err(Error::BufferTooSmall { needed: 4 }));
        assert!(db.is_empty());
        // Would have succeeded from the original position.
        assert!(db.read_u8().is_err());
        assert!(db.read_bytes(1).is_err());
    }

    #[test]
    fn var_int62_reads_and_poisons() {
        let bytes = [0x7b, 0xbd, 0x25, 0x80];
        let mut db = DecodeBuffer::new(&bytes);
        assert_eq!(db.read_var_int62().unwrap(), 15_293);
        assert_eq!(db.read_var_int62().unwrap(), 37);
        assert!(db.read_var_int62().is_err());
        assert_eq!(db.remaining(), 0);
    }

    #[test]
    fn slices_borrow_input() {
        let bytes = *b"headerbody";
        let mut db = DecodeBuffer::new(&bytes);
        let head = db.read_bytes(6).unwrap();
        assert_eq!(db.peek_remaining(), b"body");
        assert_eq!(db.peek_byte(), Some(b'b'));
        let rest = db.read_remaining();
        assert_eq!(head, b"header");
        assert_eq!(rest, b"body");
        assert_eq!(db.peek_byte(), None);
    }

    #[test]
    fn subset_is_clipped_and_independent() {
        let bytes = [1, 2, 3, 4, 5];
        let mut db = DecodeBuffer::new(&bytes);
        db.advance_cursor(1);
        let mut sub = db.subset(10);
        assert_eq!(sub.remaining(), 4);
        let mut sub2 = db.subset(2);
        assert_eq!(sub2.read_u16().unwrap(), 0x0203);
        assert!(sub2.is_empty());
        sub.advance_cursor(3);
        db.advance_cursor(sub.offset());
        assert_eq!(db.read_u8().unwrap(), 5);
    }
}
