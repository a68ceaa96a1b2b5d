//! TIFF file construction utilities
//!
//! This module provides functionality for constructing TIFF files:
//! IFDs are assembled tag by tag, chunk data is attached, and the
//! writer lays everything out on disk.

use std::collections::HashMap;
use std::io::{Seek, Write};
use std::path::Path;
use log::{debug, error};

use crate::io::byte_order::ByteOrder;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geotags::GeoReference;
use crate::tiff::ifd::IFD;
use crate::utils::write_utils;

use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::geo_tags::GeoTagsBuilder;
use crate::tiff::builders::writer::{WritePlan, WriterBuilder};

pub use crate::tiff::builders::basic_tags::SampleLayout;

/// Builder for creating TIFF files
pub struct TiffBuilder {
    byte_order: ByteOrder,
    is_big_tiff: bool,
    pub ifds: Vec<IFD>,
    image_data: HashMap<usize, Vec<Vec<u8>>>,
    external_data: HashMap<(usize, u16), Vec<u8>>,
}

impl TiffBuilder {
    /// Create a new little-endian TIFF builder
    pub fn new(is_big_tiff: bool) -> Self {
        Self::with_byte_order(ByteOrder::LittleEndian, is_big_tiff)
    }

    /// Create a TIFF builder writing in the given byte order
    pub fn with_byte_order(byte_order: ByteOrder, is_big_tiff: bool) -> Self {
        debug!("Creating new TiffBuilder ({}, is_big_tiff: {})", byte_order.name(), is_big_tiff);
        TiffBuilder {
            byte_order,
            is_big_tiff,
            ifds: Vec::new(),
            image_data: HashMap::new(),
            external_data: HashMap::new(),
        }
    }

    /// Whether the file will be written as BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Add an empty IFD and return its index
    pub fn add_ifd(&mut self) -> usize {
        let ifd_index = self.ifds.len();
        debug!("Adding IFD #{} to TiffBuilder", ifd_index);
        self.ifds.push(IFD::new(ifd_index, 0));
        ifd_index
    }

    /// Splits the builder into the IFD at `ifd_index` and the data maps
    #[allow(clippy::type_complexity)]
    fn parts(&mut self, ifd_index: usize) -> TiffResult<(&mut IFD, &mut HashMap<(usize, u16), Vec<u8>>, &mut HashMap<usize, Vec<Vec<u8>>>)> {
        let count = self.ifds.len();
        match self.ifds.get_mut(ifd_index) {
            Some(ifd) => Ok((ifd, &mut self.external_data, &mut self.image_data)),
            None => {
                error!("Invalid IFD index {}, only have {} IFDs", ifd_index, count);
                Err(TiffError::GenericError(format!("Invalid IFD index {}, only have {} IFDs", ifd_index, count)))
            }
        }
    }

    /// Add the structural tags describing the image's samples
    pub fn add_layout_tags(&mut self, ifd_index: usize, layout: &SampleLayout) -> TiffResult<()> {
        let (byte_order, is_big_tiff) = (self.byte_order, self.is_big_tiff);
        let (ifd, external_data, _) = self.parts(ifd_index)?;
        BasicTagsBuilder::add_layout_tags(ifd, external_data, ifd_index, layout, byte_order, is_big_tiff);
        Ok(())
    }

    /// Add the Software tag
    pub fn add_software(&mut self, ifd_index: usize, software: &str) -> TiffResult<()> {
        let (byte_order, is_big_tiff) = (self.byte_order, self.is_big_tiff);
        let (ifd, external_data, _) = self.parts(ifd_index)?;
        BasicTagsBuilder::add_software(ifd, external_data, ifd_index, software, byte_order, is_big_tiff);
        Ok(())
    }

    /// Add an integer tag with arbitrary values
    pub fn add_tag_values(&mut self, ifd_index: usize, tag: u16, field_type: u16, values: &[u64]) -> TiffResult<()> {
        let (byte_order, is_big_tiff) = (self.byte_order, self.is_big_tiff);
        let (ifd, external_data, _) = self.parts(ifd_index)?;
        let data = write_utils::encode_integer_values(values, field_type, byte_order);
        write_utils::put_tag(ifd, external_data, ifd_index, tag, field_type, values.len() as u64,
                             data, byte_order, is_big_tiff);
        Ok(())
    }

    /// Attach strips to an IFD
    pub fn setup_strips(&mut self, ifd_index: usize, strips: Vec<Vec<u8>>, rows_per_strip: u32) -> TiffResult<()> {
        let (byte_order, is_big_tiff) = (self.byte_order, self.is_big_tiff);
        let (ifd, external_data, image_data) = self.parts(ifd_index)?;
        BasicTagsBuilder::setup_strips(ifd, external_data, image_data, ifd_index, strips, rows_per_strip,
                                       byte_order, is_big_tiff);
        Ok(())
    }

    /// Attach tiles to an IFD
    pub fn setup_tiles(&mut self, ifd_index: usize, tiles: Vec<Vec<u8>>, tile_width: u32, tile_length: u32) -> TiffResult<()> {
        let (byte_order, is_big_tiff) = (self.byte_order, self.is_big_tiff);
        let (ifd, external_data, image_data) = self.parts(ifd_index)?;
        BasicTagsBuilder::setup_tiles(ifd, external_data, image_data, ifd_index, tiles,
                                      (tile_width, tile_length), byte_order, is_big_tiff);
        Ok(())
    }

    /// Copy georeferencing into an IFD
    pub fn add_georeference(&mut self, ifd_index: usize, georef: &GeoReference) -> TiffResult<()> {
        let (byte_order, is_big_tiff) = (self.byte_order, self.is_big_tiff);
        let (ifd, external_data, _) = self.parts(ifd_index)?;
        GeoTagsBuilder::add_georeference(ifd, external_data, ifd_index, georef, byte_order, is_big_tiff);
        Ok(())
    }

    fn plan(&self) -> WritePlan<'_> {
        WritePlan {
            byte_order: self.byte_order,
            is_big_tiff: self.is_big_tiff,
            image_data: &self.image_data,
            external_data: &self.external_data,
        }
    }

    /// Write the TIFF file to disk
    pub fn write(&self, output_path: &Path) -> TiffResult<()> {
        WriterBuilder::write(&self.ifds, &self.plan(), output_path)
    }

    /// Write the TIFF into an in-memory or other seekable sink
    pub fn write_to(&self, writer: &mut (impl Write + Seek)) -> TiffResult<()> {
        WriterBuilder::write_to(writer, &self.ifds, &self.plan())
    }
}
