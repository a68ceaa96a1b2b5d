//! Byte order handling for TIFF files
//!
//! This module implements the Strategy pattern for handling different
//! byte orders (little-endian vs big-endian) when reading TIFF data.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the TIFF header
    pub fn detect(reader: &mut dyn SeekableReader) -> TiffResult<Self> {
        let byte_order = reader.read_u16::<LittleEndian>()?;
        match byte_order {
            0x4949 => Ok(ByteOrder::LittleEndian), // "II" (Intel)
            0x4D4D => Ok(ByteOrder::BigEndian),    // "MM" (Motorola)
            _ => Err(TiffError::InvalidByteOrder(byte_order)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }

    /// Decodes an unsigned integer of `width` bytes (1, 2, 4 or 8) from the start of `buf`
    pub fn uint_from_bytes(&self, buf: &[u8], width: usize) -> u64 {
        match (self, width) {
            (_, 1) => buf[0] as u64,
            (ByteOrder::LittleEndian, 2) => LittleEndian::read_u16(buf) as u64,
            (ByteOrder::LittleEndian, 4) => LittleEndian::read_u32(buf) as u64,
            (ByteOrder::LittleEndian, _) => LittleEndian::read_u64(buf),
            (ByteOrder::BigEndian, 2) => BigEndian::read_u16(buf) as u64,
            (ByteOrder::BigEndian, 4) => BigEndian::read_u32(buf) as u64,
            (ByteOrder::BigEndian, _) => BigEndian::read_u64(buf),
        }
    }

    /// Decodes an IEEE single from the start of `buf`
    pub fn f32_from_bytes(&self, buf: &[u8]) -> f32 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_f32(buf),
            ByteOrder::BigEndian => BigEndian::read_f32(buf),
        }
    }

    /// Encodes `value` as an unsigned integer of `width` bytes (1, 2, 4 or 8)
    pub fn uint_to_bytes(&self, value: u64, width: usize) -> Vec<u8> {
        let mut buf = vec![0u8; width];
        match (self, width) {
            (_, 1) => buf[0] = value as u8,
            (ByteOrder::LittleEndian, 2) => LittleEndian::write_u16(&mut buf, value as u16),
            (ByteOrder::LittleEndian, 4) => LittleEndian::write_u32(&mut buf, value as u32),
            (ByteOrder::LittleEndian, _) => LittleEndian::write_u64(&mut buf, value),
            (ByteOrder::BigEndian, 2) => BigEndian::write_u16(&mut buf, value as u16),
            (ByteOrder::BigEndian, 4) => BigEndian::write_u32(&mut buf, value as u32),
            (ByteOrder::BigEndian, _) => BigEndian::write_u64(&mut buf, value),
        }
        buf
    }

    /// Encodes an IEEE single
    pub fn f32_to_bytes(&self, value: f32) -> [u8; 4] {
        match self {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        }
    }

    /// Encodes an IEEE double
    pub fn f64_to_bytes(&self, value: f64) -> [u8; 8] {
        match self {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        }
    }

    /// The two-byte marker that opens a file in this byte order
    pub fn marker(&self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => *b"II",
            ByteOrder::BigEndian => *b"MM",
        }
    }

    /// Decodes an IEEE double from the start of `buf`
    pub fn f64_from_bytes(&self, buf: &[u8]) -> f64 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_f64(buf),
            ByteOrder::BigEndian => BigEndian::read_f64(buf),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// The byte order this handler decodes
    fn byte_order(&self) -> ByteOrder;

    /// Read a u16 value
    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16>;

    /// Read a u32 value
    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32>;

    /// Read a u64 value
    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64>;

    /// Read an f64 value
    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64>;
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::LittleEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<LittleEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<LittleEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<LittleEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<LittleEndian>()
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn byte_order(&self) -> ByteOrder {
        ByteOrder::BigEndian
    }

    fn read_u16(&self, reader: &mut dyn SeekableReader) -> Result<u16> {
        reader.read_u16::<BigEndian>()
    }

    fn read_u32(&self, reader: &mut dyn SeekableReader) -> Result<u32> {
        reader.read_u32::<BigEndian>()
    }

    fn read_u64(&self, reader: &mut dyn SeekableReader) -> Result<u64> {
        reader.read_u64::<BigEndian>()
    }

    fn read_f64(&self, reader: &mut dyn SeekableReader) -> Result<f64> {
        reader.read_f64::<BigEndian>()
    }
}
