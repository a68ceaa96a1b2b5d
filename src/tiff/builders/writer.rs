//! TIFF writing strategies
//!
//! This module handles the task of writing TIFF files to disk.
//! Writing a valid TIFF requires careful management of offsets, ordering,
//! and alignment to ensure the file can be read by other software.
//!
//! File layout: header, IFDs, external tag data, chunk offset arrays,
//! then the strip or tile data itself.

use crate::io::byte_order::ByteOrder;
use crate::tiff::ifd::IFD;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::constants::{header, tags};
use crate::utils::{tag_utils, write_utils};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

/// Everything the writer needs besides the IFDs themselves
pub struct WritePlan<'a> {
    pub byte_order: ByteOrder,
    pub is_big_tiff: bool,
    /// Compressed strips or tiles per IFD, in chunk order
    pub image_data: &'a HashMap<usize, Vec<Vec<u8>>>,
    /// Tag values too large for the entry's value field
    pub external_data: &'a HashMap<(usize, u16), Vec<u8>>,
}

/// Where each piece of the file lands
struct Layout {
    ifd_offsets: Vec<u64>,
    tag_data_offsets: HashMap<(usize, u16), u64>,
    chunk_offsets: HashMap<usize, Vec<u64>>,
    end: u64,
}

/// Handles writing TIFF files to disk
pub struct WriterBuilder;

impl WriterBuilder {
    /// Write a complete TIFF file to disk
    pub fn write(ifds: &[IFD], plan: &WritePlan, output_path: &Path) -> TiffResult<()> {
        info!("Writing TIFF to {}", output_path.display());

        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        Self::write_to(&mut writer, ifds, plan)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a complete TIFF into any seekable sink
    pub fn write_to(writer: &mut (impl Write + Seek), ifds: &[IFD], plan: &WritePlan) -> TiffResult<()> {
        // Sort IFDs by tag number as required by TIFF spec
        let sorted_ifds = Self::prepare_sorted_ifds(ifds);

        let layout = Self::calculate_layout(&sorted_ifds, plan);
        if !plan.is_big_tiff && layout.end > u32::MAX as u64 {
            return Err(TiffError::GenericError(format!(
                "{} bytes do not fit 32-bit offsets, BigTIFF required", layout.end)));
        }
        debug!("TIFF layout: {} IFDs, {} bytes", sorted_ifds.len(), layout.end);

        Self::write_header(writer, plan.byte_order, plan.is_big_tiff)?;

        let first_ifd_offset = layout.ifd_offsets.first().copied().unwrap_or(0);
        Self::write_offset(writer, first_ifd_offset, plan)?;

        Self::write_ifds(writer, &sorted_ifds, &layout, plan)?;
        Self::write_external_data(writer, &layout, plan)?;
        Self::write_chunk_offsets(writer, &sorted_ifds, &layout, plan)?;
        Self::write_image_data(writer, &layout, plan)?;

        Ok(())
    }

    /// Prepare sorted IFDs with unique tags
    fn prepare_sorted_ifds(ifds: &[IFD]) -> Vec<IFD> {
        ifds.iter().map(|ifd| {
            let mut sorted_ifd = ifd.clone();
            sorted_ifd.entries = write_utils::get_unique_sorted_entries(&ifd.entries);
            sorted_ifd
        }).collect()
    }

    /// Tag holding the chunk offsets of an IFD, if it has any
    fn chunk_offsets_tag(ifd: &IFD) -> Option<u16> {
        [tags::STRIP_OFFSETS, tags::TILE_OFFSETS].into_iter()
            .find(|&tag| ifd.has_tag(tag))
    }

    /// Byte size of the encoded chunk offset array
    fn chunk_offsets_size(ifd: &IFD, tag: u16, chunk_count: usize) -> u64 {
        let width = ifd.get_entry(tag)
            .map(|e| tag_utils::get_field_type_size(e.field_type))
            .unwrap_or(4);
        (width * chunk_count) as u64
    }

    /// Calculate offsets for IFDs, external data and image chunks
    fn calculate_layout(sorted_ifds: &[IFD], plan: &WritePlan) -> Layout {
        let inline_size = if plan.is_big_tiff { 8 } else { 4 };
        let mut current_offset = if plan.is_big_tiff { 16 } else { 8 };
        let mut ifd_offsets = Vec::with_capacity(sorted_ifds.len());
        let mut tag_data_offsets = HashMap::new();
        let mut chunk_offsets = HashMap::new();

        // First pass: IFDs
        for ifd in sorted_ifds {
            ifd_offsets.push(current_offset);
            current_offset += Self::calculate_ifd_size(ifd, plan.is_big_tiff);
        }

        // Second pass: external tag data, in a stable order
        let mut keys: Vec<_> = plan.external_data.keys().copied().collect();
        keys.sort_unstable();
        for key in keys {
            tag_data_offsets.insert(key, current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + plan.external_data[&key].len() as u64);
        }

        // Third pass: chunk offset arrays that do not fit inline
        for (ifd_index, ifd) in sorted_ifds.iter().enumerate() {
            let chunk_count = plan.image_data.get(&ifd_index).map_or(0, Vec::len);
            if let Some(tag) = Self::chunk_offsets_tag(ifd) {
                let size = Self::chunk_offsets_size(ifd, tag, chunk_count);
                if size > inline_size {
                    tag_data_offsets.insert((ifd_index, tag), current_offset);
                    current_offset = write_utils::align_to_4_bytes(current_offset + size);
                }
            }
        }

        // Fourth pass: the chunks themselves
        let mut ifd_indices: Vec<_> = plan.image_data.keys().copied().collect();
        ifd_indices.sort_unstable();
        for ifd_index in ifd_indices {
            let offsets = plan.image_data[&ifd_index].iter()
                .map(|chunk| {
                    let offset = current_offset;
                    current_offset = write_utils::align_to_4_bytes(current_offset + chunk.len() as u64);
                    offset
                })
                .collect();
            chunk_offsets.insert(ifd_index, offsets);
        }

        Layout { ifd_offsets, tag_data_offsets, chunk_offsets, end: current_offset }
    }

    /// Write TIFF header
    ///
    /// The header is the first part of any TIFF file and includes:
    /// - Byte order indicator (II for little-endian or MM for big-endian)
    /// - Version number (42 for standard TIFF, 43 for BigTIFF)
    /// - Offset to the first IFD, written afterwards
    fn write_header(writer: &mut impl Write, byte_order: ByteOrder, is_big_tiff: bool) -> TiffResult<()> {
        writer.write_all(&byte_order.marker())?;

        if is_big_tiff {
            writer.write_all(&byte_order.uint_to_bytes(header::BIG_TIFF_VERSION as u64, 2))?;
            writer.write_all(&byte_order.uint_to_bytes(header::BIGTIFF_OFFSET_SIZE as u64, 2))?;
            writer.write_all(&[0u8, 0])?;  // Reserved (always 0)
        } else {
            writer.write_all(&byte_order.uint_to_bytes(header::TIFF_VERSION as u64, 2))?;
        }

        Ok(())
    }

    /// Writes a 4 or 8 byte offset
    fn write_offset(writer: &mut impl Write, offset: u64, plan: &WritePlan) -> TiffResult<()> {
        let width = if plan.is_big_tiff { 8 } else { 4 };
        writer.write_all(&plan.byte_order.uint_to_bytes(offset, width))?;
        Ok(())
    }

    /// Calculate size of an IFD
    ///
    /// - BigTIFF: 8 byte count, 20 bytes per entry, 8 byte next offset
    /// - TIFF: 2 byte count, 12 bytes per entry, 4 byte next offset
    fn calculate_ifd_size(ifd: &IFD, is_big_tiff: bool) -> u64 {
        let entries_count = ifd.entries.len() as u64;

        match is_big_tiff {
            true => 8 + (20 * entries_count) + 8,
            false => 2 + (12 * entries_count) + 4,
        }
    }

    /// Write all IFDs to the file
    fn write_ifds(writer: &mut (impl Write + Seek), sorted_ifds: &[IFD], layout: &Layout, plan: &WritePlan) -> TiffResult<()> {
        for (i, ifd) in sorted_ifds.iter().enumerate() {
            let next_ifd_offset = layout.ifd_offsets.get(i + 1).copied().unwrap_or(0);
            writer.seek(SeekFrom::Start(layout.ifd_offsets[i]))?;
            Self::write_ifd(writer, ifd, i, next_ifd_offset, layout, plan)?;
        }

        Ok(())
    }

    /// Write an IFD (Image File Directory)
    fn write_ifd(
        writer: &mut impl Write,
        ifd: &IFD,
        ifd_index: usize,
        next_offset: u64,
        layout: &Layout,
        plan: &WritePlan
    ) -> TiffResult<()> {
        let byte_order = plan.byte_order;
        let field_width = if plan.is_big_tiff { 8 } else { 4 };
        let chunk_tag = Self::chunk_offsets_tag(ifd);

        let count_width = if plan.is_big_tiff { 8 } else { 2 };
        writer.write_all(&byte_order.uint_to_bytes(ifd.entries.len() as u64, count_width))?;

        for entry in &ifd.entries {
            writer.write_all(&byte_order.uint_to_bytes(entry.tag as u64, 2))?;
            writer.write_all(&byte_order.uint_to_bytes(entry.field_type as u64, 2))?;

            let mut count = entry.count;
            let value: Vec<u8> = if let Some(offset) = layout.tag_data_offsets.get(&(ifd_index, entry.tag)) {
                if chunk_tag == Some(entry.tag) {
                    count = layout.chunk_offsets.get(&ifd_index).map_or(0, |o| o.len() as u64);
                }
                byte_order.uint_to_bytes(*offset, field_width)
            } else if chunk_tag == Some(entry.tag) {
                // Chunk offsets small enough to live in the entry
                let offsets = layout.chunk_offsets.get(&ifd_index).cloned().unwrap_or_default();
                count = offsets.len() as u64;
                let mut data = write_utils::encode_integer_values(&offsets, entry.field_type, byte_order);
                data.resize(field_width, 0);
                data
            } else {
                entry.raw_value[..field_width].to_vec()
            };

            writer.write_all(&byte_order.uint_to_bytes(count, field_width))?;
            writer.write_all(&value)?;
        }

        writer.write_all(&byte_order.uint_to_bytes(next_offset, field_width))?;
        Ok(())
    }

    /// Write all external tag data
    fn write_external_data(writer: &mut (impl Write + Seek), layout: &Layout, plan: &WritePlan) -> TiffResult<()> {
        let mut keys: Vec<_> = plan.external_data.keys().copied().collect();
        keys.sort_unstable();
        for key in keys {
            let data = &plan.external_data[&key];
            if let Some(&offset) = layout.tag_data_offsets.get(&key) {
                writer.seek(SeekFrom::Start(offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, offset + data.len() as u64)?;
            }
        }

        Ok(())
    }

    /// Write the StripOffsets/TileOffsets arrays that did not fit inline
    fn write_chunk_offsets(writer: &mut (impl Write + Seek), sorted_ifds: &[IFD], layout: &Layout, plan: &WritePlan) -> TiffResult<()> {
        for (ifd_index, ifd) in sorted_ifds.iter().enumerate() {
            let Some(tag) = Self::chunk_offsets_tag(ifd) else { continue };
            let Some(slot) = layout.tag_data_offsets.get(&(ifd_index, tag)) else { continue };
            let Some(entry) = ifd.get_entry(tag) else { continue };

            let offsets = layout.chunk_offsets.get(&ifd_index).cloned().unwrap_or_default();
            let data = write_utils::encode_integer_values(&offsets, entry.field_type, plan.byte_order);

            writer.seek(SeekFrom::Start(*slot))?;
            writer.write_all(&data)?;
            write_utils::write_padding(writer, *slot + data.len() as u64)?;
        }

        Ok(())
    }

    /// Write all image data
    fn write_image_data(writer: &mut (impl Write + Seek), layout: &Layout, plan: &WritePlan) -> TiffResult<()> {
        let mut ifd_indices: Vec<_> = plan.image_data.keys().copied().collect();
        ifd_indices.sort_unstable();
        for ifd_index in ifd_indices {
            let Some(offsets) = layout.chunk_offsets.get(&ifd_index) else { continue };

            for (chunk, &offset) in plan.image_data[&ifd_index].iter().zip(offsets) {
                writer.seek(SeekFrom::Start(offset))?;
                writer.write_all(chunk)?;
                write_utils::write_padding(writer, offset + chunk.len() as u64)?;
            }
        }

        Ok(())
    }
}
