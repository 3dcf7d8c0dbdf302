//! Endianness-configurable reader for QUIC packet fields.
//!
//! Works like [`DecodeBuffer`](crate::http2::DecodeBuffer): any failed read
//! moves the cursor to the end, so a chain of reads can be checked once at
//! the end.

use crate::error::Error;
use crate::varint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Big-endian.
    #[default]
    NetworkByteOrder,
    /// Little-endian.
    HostByteOrder,
}

/// Mantissa bits of a UFloat16, excluding the implicit leading bit.
const UFLOAT16_MANTISSA_BITS: u32 = 11;
/// Values below this are stored without an exponent.
const UFLOAT16_DENORMAL_LIMIT: u64 = 1 << (UFLOAT16_MANTISSA_BITS + 1);

#[derive(Debug, Clone)]
pub struct DataReader<'a> {
    data: &'a [u8],
    pos: usize,
    endianness: Endianness,
}

impl<'a> DataReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_endianness(data, Endianness::NetworkByteOrder)
    }

    pub fn with_endianness(data: &'a [u8], endianness: Endianness) -> Self {
        Self { data, pos: 0, endianness }
    }

    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn bytes_remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_done(&self) -> bool {
        self.pos == self.data.len()
    }

    fn poison(&mut self) {
        self.pos = self.data.len();
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        match self.data.get(self.pos..).and_then(|rest| rest.get(..len)) {
            Some(bytes) => {
                self.pos += len;
                Ok(bytes)
            }
            None => {
                self.poison();
                Err(Error::BufferTooSmall { needed: len })
            }
        }
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.take_array::<1>().map(|b| b[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let b = self.take_array()?;
        Ok(match self.endianness {
            Endianness::NetworkByteOrder => u16::from_be_bytes(b),
            Endianness::HostByteOrder => u16::from_le_bytes(b),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let b = self.take_array()?;
        Ok(match self.endianness {
            Endianness::NetworkByteOrder => u32::from_be_bytes(b),
            Endianness::HostByteOrder => u32::from_le_bytes(b),
        })
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let b = self.take_array()?;
        Ok(match self.endianness {
            Endianness::NetworkByteOrder => u64::from_be_bytes(b),
            Endianness::HostByteOrder => u64::from_le_bytes(b),
        })
    }

    /// Reads a `num_bytes`-wide unsigned integer (at most 8 bytes).
    pub fn read_bytes_to_u64(&mut self, num_bytes: usize) -> Result<u64, Error> {
        if num_bytes > 8 {
            self.poison();
            return Err(Error::BufferTooSmall { needed: num_bytes });
        }
        let bytes = self.take(num_bytes)?;
        let mut wide = [0u8; 8];
        Ok(match self.endianness {
            Endianness::NetworkByteOrder => {
                wide[8 - num_bytes..].copy_from_slice(bytes);
                u64::from_be_bytes(wide)
            }
            Endianness::HostByteOrder => {
                wide[..num_bytes].copy_from_slice(bytes);
                u64::from_le_bytes(wide)
            }
        })
    }

    /// Reads a 16-bit unsigned float: 5 exponent bits over 11 mantissa bits
    /// with an implicit leading one once the exponent is non-zero.
    pub fn read_ufloat16(&mut self) -> Result<u64, Error> {
        let mut value = u64::from(self.read_u16()?);
        if value < UFLOAT16_DENORMAL_LIMIT {
            return Ok(value);
        }
        let exponent = (value >> UFLOAT16_MANTISSA_BITS) - 1;
        value -= exponent << UFLOAT16_MANTISSA_BITS;
        Ok(value << exponent)
    }

    /// A 16-bit length followed by that many bytes.
    pub fn read_string_piece16(&mut self) -> Result<&'a [u8], Error> {
        let len = self.read_u16()?;
        self.take(usize::from(len))
    }

    pub fn read_string_piece(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.take(len)
    }

    pub fn read_connection_id(&mut self) -> Result<u64, Error> {
        self.read_u64()
    }

    /// A four-byte tag, first byte lowest.
    pub fn read_tag(&mut self) -> Result<u32, Error> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_var_int62(&mut self) -> Result<u64, Error> {
        match varint::decode_varint(&self.data[self.pos..]) {
            Ok((value, len)) => {
                self.pos += len;
                Ok(value)
            }
            Err(e) => {
                self.poison();
                Err(e)
            }
        }
    }

    /// Fills `out` entirely or fails.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<(), Error> {
        out.copy_from_slice(self.take(out.len())?);
        Ok(())
    }

    pub fn read_remaining_payload(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.poison();
        rest
    }

    pub fn peek_remaining_payload(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn endianness() {
        let data = hex!("0102 01020304");
        let mut r = DataReader::new(&data);
        assert_eq!(r.read_u16().unwrap(), 0x0102);
        r.set_endianness(Endianness::HostByteOrder);
        assert_eq!(r.read_u32().unwrap(), 0x0403_0201);
        assert!(r.is_done());
    }

    #[test]
    fn partial_width_integers() {
        let data = hex!("010203");
        assert_eq!(DataReader::new(&data).read_bytes_to_u64(3).unwrap(), 0x010203);
        let mut r = DataReader::with_endianness(&data, Endianness::HostByteOrder);
        assert_eq!(r.read_bytes_to_u64(3).unwrap(), 0x030201);
        assert!(DataReader::new(&[0; 9]).read_bytes_to_u64(9).is_err());
    }

    #[test]
    fn ufloat16_values() {
        let cases: [(u16, u64); 7] = [
            (0, 0),
            (1, 1),
            (4095, 4095),
            (4096, 4096),
            (4097, 4098),
            (6143, 8190),
            (0x1000 + 0x800, 8192),
        ];
        for (wire, expected) in cases {
            let bytes = wire.to_be_bytes();
            assert_eq!(DataReader::new(&bytes).read_ufloat16().unwrap(), expected, "{wire}");
        }
        let max = u16::MAX.to_be_bytes();
        assert_eq!(DataReader::new(&max).read_ufloat16().unwrap(), 0x3FF_C000_0000);
    }

    #[test]
    fn string_pieces_and_tags() {
        let data = hex!("0003 616263 43484c4f 7a");
        let mut r = DataReader::new(&data);
        assert_eq!(r.read_string_piece16().unwrap(), b"abc");
        assert_eq!(r.read_tag().unwrap(), u32::from_le_bytes(*b"CHLO"));
        assert_eq!(r.peek_byte(), Some(b'z'));
        assert_eq!(r.peek_remaining_payload(), b"z");
        assert_eq!(r.read_remaining_payload(), b"z");
        assert_eq!(r.peek_byte(), None);
    }

    #[test]
    fn failure_poisons() {
        let data = hex!("0005 6162");
        let mut r = DataReader::new(&data);
        assert!(r.read_string_piece16().is_err());
        assert!(r.is_done());
        assert!(r.read_u8().is_err());
    }

    #[test]
    fn var_int_and_bytes() {
        let data = hex!("4025 aabb");
        let mut r = DataReader::new(&data);
        assert_eq!(r.read_var_int62().unwrap(), 37);
        let mut out = [0u8; 2];
        r.read_bytes(&mut out).unwrap();
        assert_eq!(out, [0xaa, 0xbb]);
        assert_eq!(r.bytes_remaining(), 0);
        assert!(r.read_connection_id().is_err());
    }
}
