//! TIFF writing utilities
//!
//! Helper functions for writing TIFF files to disk, handling alignment,
//! value encoding and entry placement.

use std::collections::HashMap;
use std::io::Write;

use crate::io::byte_order::ByteOrder;
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::utils::tag_utils;

/// Align an offset to a 4-byte boundary
///
/// TIFF specification recommends aligning data on word boundaries.
pub fn align_to_4_bytes(offset: u64) -> u64 {
    offset + calculate_padding(offset as usize) as u64
}

/// Calculate padding required to align to 4-byte boundary
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}

/// Pads a block ending at file position `end` up to the next 4-byte boundary
pub fn write_padding(writer: &mut impl Write, end: u64) -> TiffResult<()> {
    let padding = calculate_padding(end as usize);
    if padding > 0 {
        writer.write_all(&[0u8; 4][..padding])?;
    }
    Ok(())
}

/// Get a list of IFD entries sorted by tag number with duplicates removed
///
/// If multiple entries have the same tag ID, only the last occurrence is kept.
pub fn get_unique_sorted_entries(entries: &[IFDEntry]) -> Vec<IFDEntry> {
    let mut unique: Vec<IFDEntry> = Vec::with_capacity(entries.len());
    for entry in entries.iter().rev() {
        if !unique.iter().any(|e| e.tag == entry.tag) {
            unique.push(entry.clone());
        }
    }

    unique.sort_by_key(|entry| entry.tag);
    unique
}

/// Encodes integer values with the byte width of `field_type`
pub fn encode_integer_values(values: &[u64], field_type: u16, byte_order: ByteOrder) -> Vec<u8> {
    let width = tag_utils::get_field_type_size(field_type);
    values.iter()
        .flat_map(|&v| byte_order.uint_to_bytes(v, width))
        .collect()
}

/// Encodes values as DOUBLE
pub fn encode_double_values(values: &[f64], byte_order: ByteOrder) -> Vec<u8> {
    values.iter()
        .flat_map(|&v| byte_order.f64_to_bytes(v))
        .collect()
}

/// Places a tag's encoded value bytes either inline or as external data
///
/// Values that fit the entry's value field (4 bytes, 8 for BigTIFF) are
/// stored in the entry itself; larger ones go to `external_data` and get
/// their offset assigned at write time.
#[allow(clippy::too_many_arguments)]
pub fn put_tag(
    ifd: &mut IFD,
    external_data: &mut HashMap<(usize, u16), Vec<u8>>,
    ifd_index: usize,
    tag: u16,
    field_type: u16,
    count: u64,
    data: Vec<u8>,
    byte_order: ByteOrder,
    is_big_tiff: bool,
) {
    let inline_size = if is_big_tiff { 8 } else { 4 };

    if data.len() <= inline_size {
        let mut raw_value = [0u8; 8];
        raw_value[..data.len()].copy_from_slice(&data);

        let type_size = tag_utils::get_field_type_size(field_type);
        let first_value = if count > 0 && type_size <= 8 && data.len() >= type_size {
            byte_order.uint_from_bytes(&data, type_size)
        } else {
            0
        };

        external_data.remove(&(ifd_index, tag));
        ifd.add_entry(IFDEntry::with_raw_value(tag, field_type, count, first_value, raw_value));
    } else {
        ifd.add_entry(IFDEntry::new(tag, field_type, count, 0));
        external_data.insert((ifd_index, tag), data);
    }
}
