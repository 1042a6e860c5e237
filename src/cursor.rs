//! Bounds-checked byte cursors used by every encoder and decoder.
//!
//! All field codecs go through [`Reader`] and [`Writer`], so the length check
//! for each field lives here and nowhere else.
use crate::error::{Error, Result};

/// Sequential reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8> {
        self.data.get(self.pos).copied().ok_or(Error::BufferTruncated)
    }

    /// Consumes `n` bytes, or fails without moving if fewer are left.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::BufferTruncated);
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..start + n])
    }

    /// Splits the next `n` bytes off into their own reader.
    pub fn sub_reader(&mut self, n: usize) -> Result<Reader<'a>> {
        self.take(n).map(Reader::new)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Consumes everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let start = self.pos;
        self.pos = self.data.len();
        &self.data[start..]
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// Reads a 24-bit little-endian value, as used for frequencies.
    pub fn read_u24_le(&mut self) -> Result<u32> {
        let b: [u8; 3] = self.read_array()?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], 0]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }
}

/// Sequential writer into a caller-provided buffer.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Reserves the next `n` bytes and advances past them. Fails without
    /// moving if the buffer cannot hold them.
    pub fn reserve(&mut self, n: usize) -> Result<&mut [u8]> {
        if self.remaining() < n {
            return Err(Error::BufferTruncated);
        }
        let start = self.pos;
        self.pos += n;
        Ok(&mut self.buf[start..start + n])
    }

    pub fn write_slice(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(data.len())?.copy_from_slice(data);
        Ok(())
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_slice(&[v])
    }

    pub fn write_u16_le(&mut self, v: u16) -> Result<()> {
        self.write_slice(&v.to_le_bytes())
    }

    pub fn write_u16_be(&mut self, v: u16) -> Result<()> {
        self.write_slice(&v.to_be_bytes())
    }

    /// Writes the low 24 bits of `v`, little-endian.
    pub fn write_u24_le(&mut self, v: u32) -> Result<()> {
        self.write_slice(&v.to_le_bytes()[..3])
    }

    pub fn write_u32_le(&mut self, v: u32) -> Result<()> {
        self.write_slice(&v.to_le_bytes())
    }

    /// The bytes written so far.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reader_fails_without_moving() {
        let data = [1, 2, 3];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_u16_le(), Ok(0x0201));
        assert_eq!(r.read_u16_le(), Err(Error::BufferTruncated));
        assert_eq!(r.position(), 2);
        assert_eq!(r.read_u8(), Ok(3));
        assert!(r.is_empty());
        assert_eq!(r.peek_u8(), Err(Error::BufferTruncated));
    }

    #[test]
    fn reader_sub_reader_is_bounded() {
        let data = [1, 2, 3, 4, 5];
        let mut r = Reader::new(&data);
        let mut sub = r.sub_reader(2).unwrap();
        assert_eq!(sub.rest(), &[1, 2]);
        assert_eq!(r.rest(), &[3, 4, 5]);
        assert_eq!(Reader::new(&data).sub_reader(6).unwrap_err(), Error::BufferTruncated);
    }

    #[test]
    fn reader_u24_and_big_endian() {
        let data = [0x18, 0x4f, 0x84, 0xbe, 0xef];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_u24_le(), Ok(0x844f18));
        assert_eq!(r.read_u16_be(), Ok(0xbeef));
    }

    #[test]
    fn writer_reserve_is_checked() {
        let mut buf = [0u8; 4];
        let mut w = Writer::new(&mut buf);
        w.write_u24_le(0x00844f18).unwrap();
        assert_eq!(w.write_u16_le(1), Err(Error::BufferTruncated));
        assert_eq!(w.position(), 3);
        w.write_u8(0xaa).unwrap();
        assert_eq!(w.written(), &[0x18, 0x4f, 0x84, 0xaa]);
        assert_eq!(w.reserve(1).unwrap_err(), Error::BufferTruncated);
    }
}
