//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF directory reader that uses the
//! Strategy pattern to handle different byte orders. Pixel data is not
//! touched here; the band decoders in `extractor` pull strips and tiles
//! through the tag values this reader exposes.

use log::{debug, info, warn};
use std::io::SeekFrom;

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, header};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::tag_utils;

/// Upper bound on the IFD chain length, guards against offset cycles
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
#[derive(Default)]
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the byte order handler, with proper error handling for None case
    fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Byte order of the file last read
    pub fn byte_order(&self) -> TiffResult<ByteOrder> {
        self.handler().map(|h| h.byte_order())
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Reads the structure of a TIFF file from the given reader
    ///
    /// This method handles the core process of reading a TIFF file:
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Read all IFDs (Image File Directories)
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let byte_order = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", byte_order.name());
        self.byte_order_handler = Some(byte_order.create_handler());

        self.is_big_tiff = self.read_version(reader)?;

        let first_ifd_offset = self.read_offset(reader)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(self.is_big_tiff);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        info!("Read {} IFDs from {} file", tiff.ifds.len(),
              if self.is_big_tiff { "BigTIFF" } else { "TIFF" });
        Ok(tiff)
    }

    /// Reads the version word and, for BigTIFF, the extra header fields
    fn read_version(&self, reader: &mut dyn SeekableReader) -> TiffResult<bool> {
        let handler = self.handler()?;
        let version = handler.read_u16(reader)?;
        debug!("TIFF version: {}", version);

        match version {
            header::BIG_TIFF_VERSION => {
                validation::validate_bigtiff_header(reader, handler)?;
                Ok(true)
            },
            header::TIFF_VERSION => Ok(false),
            _ => Err(TiffError::UnsupportedVersion(version)),
        }
    }

    /// Reads a file offset, 4 bytes for TIFF and 8 bytes for BigTIFF
    fn read_offset(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u32(reader)? as u64)
        }
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken link after the first directory ends the chain with a warning
    /// instead of failing: the image itself lives in the first IFD.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64, file_size: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            debug!("Reading IFD at offset: {}", ifd_offset);

            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if !ifds.is_empty() => {
                    warn!("Error reading IFD {}: {}, stopping IFD chain", ifds.len(), e);
                    break;
                },
                Err(e) => return Err(e),
            };

            // The reader sits right after the last entry, where the next offset lives
            let next_ifd_offset = match self.read_offset(reader) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };

            ifds.push(ifd);

            if next_ifd_offset != 0 && validation::validate_ifd_offset(next_ifd_offset, file_size).is_err() {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }

            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads an IFD from the reader
    ///
    /// An IFD consists of an entry count followed by a series of entries,
    /// each describing an aspect of the image (dimensions, compression, ...).
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let handler = self.handler()?;
        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry
    ///
    /// The value field is kept raw so multi-value inline data can be decoded
    /// later; `value_offset` holds the first value when it fits inline and the
    /// data offset otherwise.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;
        let byte_order = handler.byte_order();

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_width = if self.is_big_tiff { 8 } else { 4 };
        let mut raw_value = [0u8; 8];
        reader.read_exact(&mut raw_value[..field_width])?;

        let type_size = tag_utils::get_field_type_size(field_type);
        let inline = (type_size as u64).saturating_mul(count) <= field_width as u64;

        let value_offset = match field_type {
            field_types::BYTE | field_types::SHORT | field_types::LONG | field_types::LONG8
            | field_types::SSHORT | field_types::SLONG | field_types::SLONG8
            | field_types::UNDEFINED | field_types::IFD8 if inline && count > 0 => {
                byte_order.uint_from_bytes(&raw_value, type_size)
            },
            _ => byte_order.uint_from_bytes(&raw_value, field_width),
        };

        Ok(IFDEntry::with_raw_value(tag, field_type, count, value_offset, raw_value))
    }

    /// Reads the raw value bytes of an entry, whether inline or external
    ///
    /// The bytes are returned in file byte order.
    pub fn read_tag_bytes(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<Vec<u8>> {
        let size = entry.data_size();

        if entry.is_value_inline(self.is_big_tiff) {
            return Ok(entry.raw_value[..size as usize].to_vec());
        }

        let file_size = validation::get_file_size(reader)?;
        if entry.value_offset.saturating_add(size) > file_size {
            return Err(TiffError::GenericError(format!(
                "Tag {} ({}) data at {}+{} exceeds file size {}",
                entry.tag, tag_utils::get_tag_name(entry.tag), entry.value_offset, size, file_size)));
        }

        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let mut data = vec![0u8; size as usize];
        reader.read_exact(&mut data)?;
        Ok(data)
    }

    /// Reads a tag's value as a vector of u64
    ///
    /// Handles all integer field types, including multi-value inline data.
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        let data = self.read_tag_bytes(reader, entry)?;
        tag_utils::decode_integer_values(&data, entry.field_type, self.byte_order()?)
    }

    /// Reads a tag's value as a vector of f64
    pub fn read_tag_doubles(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        let data = self.read_tag_bytes(reader, entry)?;
        tag_utils::decode_float_values(&data, entry.field_type, self.byte_order()?)
    }

    /// Reads an ASCII tag, keeping its NUL terminators
    ///
    /// GeoAsciiParams uses '|' separated, NUL-terminated fields, so the
    /// bytes are returned untouched.
    pub fn read_ascii_tag(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u8>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        if entry.field_type != field_types::ASCII {
            return Err(TiffError::UnsupportedFieldType(entry.field_type));
        }

        self.read_tag_bytes(reader, entry)
    }
}
