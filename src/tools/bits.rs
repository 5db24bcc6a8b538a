//! Bit-level input and output for the codec.
//!
//! The writer accumulates bits MSB-first and can drop to byte alignment
//! for 16-bit lengths and raw byte runs.  The reader walks the same
//! layout with a bit cursor.  Padding on the writer side and alignment
//! on the reader side are complementary, so the two never disagree on
//! where a raw section starts.

use bit_vec::BitVec;
use crate::Error;

/// Accumulates individual bits and produces a byte buffer.
pub struct BitWriter {
    bits: BitVec
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bits: BitVec::new()
        }
    }
    /// append one bit
    pub fn add_bit(&mut self,bit: bool) {
        self.bits.push(bit);
    }
    /// append a run of bits in order
    pub fn add_bits(&mut self,bits: &BitVec) {
        for bit in bits.iter() {
            self.bits.push(bit);
        }
    }
    pub fn is_aligned(&self) -> bool {
        self.bits.len() % 8 == 0
    }
    /// Zero-fill up to the next byte boundary.  The partial value ends
    /// up in the high bits of the emitted byte.
    pub fn flush_to_byte(&mut self) {
        while self.bits.len() % 8 != 0 {
            self.bits.push(false);
        }
    }
    /// flush, then append `val` as two big-endian bytes
    pub fn add_uint16(&mut self,val: u16) {
        self.flush_to_byte();
        for i in (0..16).rev() {
            self.bits.push(val >> i & 1 == 1);
        }
    }
    /// flush, then append the bytes verbatim
    pub fn add_bytes(&mut self,dat: &[u8]) {
        self.flush_to_byte();
        let mut tail = BitVec::from_bytes(dat);
        self.bits.append(&mut tail);
    }
    /// flush and return the accumulated buffer
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_to_byte();
        self.bits.to_bytes()
    }
}

/// Reads bits and byte-aligned data from a byte buffer.
pub struct BitReader {
    bits: BitVec,
    ptr: usize
}

impl BitReader {
    pub fn new(dat: &[u8]) -> Self {
        Self {
            bits: BitVec::from_bytes(dat),
            ptr: 0
        }
    }
    /// get the next bit based on the internal bit pointer
    pub fn read_bit(&mut self) -> Result<bool,Error> {
        match self.bits.get(self.ptr) {
            Some(bit) => {
                self.ptr += 1;
                Ok(bit)
            },
            None => Err(Error::Truncated)
        }
    }
    /// Skip to the next byte boundary.  Bits remaining in the current
    /// byte are discarded.
    pub fn align_to_byte(&mut self) {
        let rem = self.ptr % 8;
        if rem != 0 {
            self.ptr += 8 - rem;
        }
    }
    /// align, then consume two big-endian bytes
    pub fn read_uint16(&mut self) -> Result<u16,Error> {
        self.align_to_byte();
        let mut ans: u16 = 0;
        for _i in 0..16 {
            ans <<= 1;
            ans |= self.read_bit()? as u16;
        }
        Ok(ans)
    }
    /// align, then consume `count` bytes verbatim
    pub fn read_bytes(&mut self,count: usize) -> Result<Vec<u8>,Error> {
        self.align_to_byte();
        if self.ptr + 8*count > self.bits.len() {
            return Err(Error::Truncated);
        }
        let mut ans = Vec::with_capacity(count);
        for _i in 0..count {
            let mut val: u8 = 0;
            for _b in 0..8 {
                val <<= 1;
                val |= self.read_bit()? as u8;
            }
            ans.push(val);
        }
        Ok(ans)
    }
    /// true if at least one bit remains
    pub fn has_bits(&self) -> bool {
        self.ptr < self.bits.len()
    }
}

#[test]
fn writer_pads_low_side() {
    let mut writer = BitWriter::new();
    writer.add_bit(true);
    writer.add_bit(false);
    writer.add_bit(true);
    assert_eq!(writer.finish(),vec![0b1010_0000]);
}

#[test]
fn aligned_sections() {
    let mut writer = BitWriter::new();
    writer.add_bit(true);
    assert!(!writer.is_aligned());
    writer.add_uint16(0x0102);
    writer.add_bytes(b"hi");
    assert!(writer.is_aligned());
    assert_eq!(writer.finish(),vec![0x80,0x01,0x02,0x68,0x69]);
}

#[test]
fn reader_walks_bits_and_bytes() {
    let mut reader = BitReader::new(&[0x80,0x01,0x02,0x68,0x69]);
    assert_eq!(reader.read_bit().expect("read failed"),true);
    assert_eq!(reader.read_uint16().expect("read failed"),0x0102);
    assert_eq!(reader.read_bytes(2).expect("read failed"),b"hi".to_vec());
    assert!(!reader.has_bits());
}

#[test]
fn alignment_discards_partial_byte() {
    let mut reader = BitReader::new(&[0xff,0x42]);
    reader.read_bit().expect("read failed");
    reader.align_to_byte();
    assert_eq!(reader.read_bytes(1).expect("read failed"),vec![0x42]);
}

#[test]
fn truncation_fails() {
    let mut reader = BitReader::new(&[0xff]);
    for _i in 0..8 {
        reader.read_bit().expect("read failed");
    }
    assert!(reader.read_bit().is_err());

    let mut reader = BitReader::new(&[0x00]);
    assert!(reader.read_uint16().is_err());

    let mut reader = BitReader::new(&[]);
    assert!(reader.read_bytes(1).is_err());
    assert!(!reader.has_bits());
}
