//! End-to-end tests: synthesize multi-band GeoTIFFs, render combinations,
//! read the composites back

extern crate std;

use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bandkit::combination::{Band, BandCombination};
use bandkit::compression::{CompressionFactory, CompressionHandler, OutputCompression};
use bandkit::errors::BandKitError;
use bandkit::extractor::BandExtractor;
use bandkit::io::byte_order::ByteOrder;
use bandkit::raster::{ArithmeticPolicy, SourceRaster};
use bandkit::tiff::builder::{SampleLayout, TiffBuilder};
use bandkit::tiff::constants::{compression, photometric, planar_config, predictor, sample_format, tags};
use bandkit::tiff::geotags::GeoReference;
use bandkit::tiff::TiffReader;
use bandkit::BandKit;

/// Description of a synthetic source image
#[derive(Clone, Copy)]
struct Scene {
    width: usize,
    height: usize,
    bands: usize,
    format: u16,
    bits: u16,
    planar: bool,
    compression: u16,
    predictor: u16,
    tiles: Option<(usize, usize)>,
    rows_per_strip: usize,
    byte_order: ByteOrder,
    big_tiff: bool,
}

impl Scene {
    /// 20x18 pixels, 16 bands of u16, interleaved, uncompressed strips
    fn worldview() -> Self {
        Scene {
            width: 20,
            height: 18,
            bands: 16,
            format: sample_format::UNSIGNED,
            bits: 16,
            planar: false,
            compression: compression::NONE,
            predictor: predictor::NONE,
            tiles: None,
            rows_per_strip: 4,
            byte_order: ByteOrder::LittleEndian,
            big_tiff: false,
        }
    }

    /// Value of `band` (0-based) at a pixel, exactly representable in the
    /// sample type and in f32
    fn value(&self, band: usize, row: usize, col: usize) -> f64 {
        let base = (band * 100 + row * 7 + col * 3) as f64;
        match (self.format, self.bits) {
            (sample_format::UNSIGNED, 8) => (band * 13 + row + col) as f64,
            (sample_format::SIGNED, 8) => (band * 7 + row + col) as f64 - 64.0,
            (sample_format::SIGNED, _) => base - 800.0,
            (sample_format::IEEEFP, _) => base * 0.25 - 3.5,
            _ => base,
        }
    }

    fn bytes_per_sample(&self) -> usize {
        self.bits as usize / 8
    }

    fn encode(&self, value: f64) -> Vec<u8> {
        let order = self.byte_order;
        match (self.format, self.bits) {
            (sample_format::IEEEFP, 32) => order.f32_to_bytes(value as f32).to_vec(),
            (sample_format::IEEEFP, 64) => order.f64_to_bytes(value).to_vec(),
            (sample_format::SIGNED, bits) => {
                let width = bits as usize / 8;
                let mask = if width == 8 { u64::MAX } else { (1u64 << (bits as u64)) - 1 };
                order.uint_to_bytes((value as i64 as u64) & mask, width)
            }
            (_, bits) => order.uint_to_bytes(value as u64, bits as usize / 8),
        }
    }

    /// Raw bytes of one chunk covering `rows` x `cols` pixels from
    /// (`y0`, `x0`), padded with zeros outside the image; `band` selects a
    /// single plane, `None` interleaves every band
    fn chunk(&self, y0: usize, x0: usize, rows: usize, cols: usize, band: Option<usize>) -> Vec<u8> {
        let bps = self.bytes_per_sample();
        let mut data = Vec::new();
        for row in y0..y0 + rows {
            for col in x0..x0 + cols {
                let bands: Vec<usize> = match band {
                    Some(b) => vec![b],
                    None => (0..self.bands).collect(),
                };
                for b in bands {
                    if row < self.height && col < self.width {
                        data.extend(self.encode(self.value(b, row, col)));
                    } else {
                        data.extend(std::iter::repeat(0u8).take(bps));
                    }
                }
            }
        }

        let stride = if band.is_some() { 1 } else { self.bands };
        let row_len = cols * stride * bps;
        for row in data.chunks_exact_mut(row_len) {
            match self.predictor {
                predictor::HORIZONTAL_DIFFERENCING => self.difference_integers(row, stride),
                predictor::FLOATING_POINT => self.difference_floats(row, stride),
                _ => {}
            }
        }

        let handler = CompressionFactory::create_handler(self.compression as u64).unwrap();
        handler.compress(&data).unwrap()
    }

    fn difference_integers(&self, row: &mut [u8], stride: usize) {
        let bps = self.bytes_per_sample();
        let order = self.byte_order;
        let mask = if bps == 8 { u64::MAX } else { (1u64 << (bps * 8)) - 1 };
        let original = row.to_vec();
        let step = stride * bps;
        for i in (step..row.len()).step_by(bps) {
            let previous = order.uint_from_bytes(&original[i - step..], bps);
            let current = order.uint_from_bytes(&original[i..], bps);
            let delta = current.wrapping_sub(previous) & mask;
            row[i..i + bps].copy_from_slice(&order.uint_to_bytes(delta, bps));
        }
    }

    fn difference_floats(&self, row: &mut [u8], stride: usize) {
        let bps = self.bytes_per_sample();
        let count = row.len() / bps;

        // Most significant byte first, regardless of file byte order
        let values: Vec<Vec<u8>> = row.chunks_exact(bps)
            .map(|v| {
                let mut be = v.to_vec();
                if self.byte_order == ByteOrder::LittleEndian {
                    be.reverse();
                }
                be
            })
            .collect();

        let mut planes = vec![0u8; row.len()];
        for (index, value) in values.iter().enumerate() {
            for byte in 0..bps {
                planes[byte * count + index] = value[byte];
            }
        }

        for i in 0..row.len() {
            row[i] = if i < stride { planes[i] } else { planes[i].wrapping_sub(planes[i - stride]) };
        }
    }

    fn chunks(&self) -> Vec<Vec<u8>> {
        let planes: Vec<Option<usize>> = if self.planar {
            (0..self.bands).map(Some).collect()
        } else {
            vec![None]
        };

        let mut chunks = Vec::new();
        for band in planes {
            match self.tiles {
                Some((tile_width, tile_length)) => {
                    for y0 in (0..self.height).step_by(tile_length) {
                        for x0 in (0..self.width).step_by(tile_width) {
                            chunks.push(self.chunk(y0, x0, tile_length, tile_width, band));
                        }
                    }
                }
                None => {
                    for y0 in (0..self.height).step_by(self.rows_per_strip) {
                        let rows = self.rows_per_strip.min(self.height - y0);
                        chunks.push(self.chunk(y0, 0, rows, self.width, band));
                    }
                }
            }
        }
        chunks
    }

    fn layout(&self) -> SampleLayout {
        SampleLayout {
            width: self.width as u32,
            height: self.height as u32,
            samples_per_pixel: self.bands as u16,
            bits_per_sample: self.bits,
            sample_format: self.format,
            planar_config: if self.planar { planar_config::PLANAR } else { planar_config::CHUNKY },
            photometric: photometric::BLACK_IS_ZERO,
            compression: self.compression as u64,
            predictor: self.predictor,
        }
    }

    fn add_image(&self, builder: &mut TiffBuilder) -> usize {
        let ifd = builder.add_ifd();
        builder.add_layout_tags(ifd, &self.layout()).unwrap();
        builder.add_georeference(ifd, &georef()).unwrap();
        match self.tiles {
            Some((tile_width, tile_length)) => {
                builder.setup_tiles(ifd, self.chunks(), tile_width as u32, tile_length as u32).unwrap()
            }
            None => builder.setup_strips(ifd, self.chunks(), self.rows_per_strip as u32).unwrap(),
        }
        ifd
    }

    fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut builder = TiffBuilder::with_byte_order(self.byte_order, self.big_tiff);
        self.add_image(&mut builder);
        builder.write(&path).unwrap();
        path
    }
}

fn georef() -> GeoReference {
    GeoReference {
        pixel_scale: Some(vec![1.24, 1.24, 0.0]),
        tiepoints: Some(vec![0.0, 0.0, 0.0, 358485.0, 4265130.0, 0.0]),
        transformation: None,
        key_directory: Some(vec![1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 32611]),
        double_params: None,
        ascii_params: Some(b"WGS 84 / UTM zone 11N|\0".to_vec()),
        nodata: None,
    }
}

/// Checks that `output` holds the bands of `combination` taken from `scene`
fn assert_composite(scene: &Scene, combination: BandCombination, output: &Path) {
    let mut raster = SourceRaster::open(output).unwrap();
    std::assert_eq!(raster.band_count(), 3);
    std::assert_eq!(raster.dim(), (scene.height, scene.width));
    std::assert_eq!(raster.layout().sample_format, sample_format::IEEEFP);
    std::assert_eq!(raster.layout().bits_per_sample, 32);
    std::assert!(raster.layout().is_planar());
    std::assert_eq!(raster.georef(), &georef());

    let bands = combination.bands().unwrap();
    for (position, source_band) in bands.iter().enumerate() {
        let plane = raster.read_band(Band::from_index(position as u8 + 1).unwrap()).unwrap();
        let band = source_band.index() as usize - 1;
        for row in 0..scene.height {
            for col in 0..scene.width {
                std::assert_eq!(plane[[row, col]], scene.value(band, row, col) as f32,
                                "{} output band {} at ({}, {})", combination, position + 1, row, col);
            }
        }
    }
}

fn render(scene: &Scene, combination: BandCombination) {
    let dir = tempfile::tempdir().unwrap();
    let source = scene.write(dir.path(), "scene.tif");
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();

    let written = BandExtractor::default().process(&source, combination, &out).unwrap().unwrap();
    std::assert_eq!(written, out.join(format!("scene_{}_processed.tif", combination.slug())));
    assert_composite(scene, combination, &written);
}

#[test]
fn test_every_registered_combination() {
    let scene = Scene::worldview();
    for combination in BandCombination::ALL.into_iter().filter(|c| c.is_registered()) {
        render(&scene, combination);
    }
}

#[test]
fn test_big_endian_planar_deflate_with_predictor() {
    let scene = Scene {
        byte_order: ByteOrder::BigEndian,
        planar: true,
        compression: compression::DEFLATE,
        predictor: predictor::HORIZONTAL_DIFFERENCING,
        ..Scene::worldview()
    };
    render(&scene, BandCombination::Water);
}

#[test]
fn test_chunky_tiles_lzw_signed() {
    let scene = Scene {
        format: sample_format::SIGNED,
        compression: compression::LZW,
        predictor: predictor::HORIZONTAL_DIFFERENCING,
        tiles: Some((16, 16)),
        ..Scene::worldview()
    };
    render(&scene, BandCombination::GeneralLandCover);
}

#[test]
fn test_planar_float_tiles_bigtiff() {
    let scene = Scene {
        format: sample_format::IEEEFP,
        bits: 32,
        planar: true,
        compression: compression::PACKBITS,
        predictor: predictor::FLOATING_POINT,
        tiles: Some((16, 16)),
        big_tiff: true,
        ..Scene::worldview()
    };
    render(&scene, BandCombination::ExposedSoil);

    let big_endian = Scene { byte_order: ByteOrder::BigEndian, ..scene };
    render(&big_endian, BandCombination::RoofingAndRoads);
}

#[test]
fn test_sample_types() {
    let types = [
        (sample_format::UNSIGNED, 8),
        (sample_format::SIGNED, 8),
        (sample_format::UNSIGNED, 32),
        (sample_format::SIGNED, 32),
        (sample_format::IEEEFP, 64),
    ];
    for (format, bits) in types {
        let scene = Scene { format, bits, compression: compression::ZSTD, ..Scene::worldview() };
        render(&scene, BandCombination::ArtificialFeaturesInDesert);
    }
}

#[test]
fn test_output_compressions() {
    let scene = Scene::worldview();
    for output in OutputCompression::ALL {
        let dir = tempfile::tempdir().unwrap();
        let source = scene.write(dir.path(), "scene.tif");

        let written = BandExtractor::new(ArithmeticPolicy::Propagate, output)
            .process(&source, BandCombination::Water, dir.path())
            .unwrap()
            .unwrap();
        assert_composite(&scene, BandCombination::Water, &written);

        let mut file = BufReader::new(File::open(&written).unwrap());
        let mut reader = TiffReader::new();
        let tiff = reader.read(&mut file).unwrap();
        let ifd = tiff.main_ifd().unwrap();
        std::assert_eq!(ifd.get_tag_value(tags::COMPRESSION), Some(output.handler().unwrap().code()));
        std::assert_eq!(ifd.get_tag_value(tags::PHOTOMETRIC_INTERPRETATION), Some(photometric::BLACK_IS_ZERO as u64));
        std::assert_eq!(reader.read_tag_values(&mut file, ifd, tags::EXTRA_SAMPLES).unwrap(), vec![0, 0]);
        let software = reader.read_ascii_tag(&mut file, ifd, tags::SOFTWARE).unwrap();
        std::assert!(software.starts_with(b"bandkit "));
        std::assert!(!tiff.is_big_tiff);
    }
}

#[test]
fn test_overview_before_image_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("with_overview.tif");

    let overview = Scene { width: 10, height: 9, ..Scene::worldview() };
    let scene = Scene::worldview();

    let mut builder = TiffBuilder::new(false);
    let first = overview.add_image(&mut builder);
    builder.add_tag_values(first, tags::NEW_SUBFILE_TYPE, bandkit::tiff::constants::field_types::LONG, &[1]).unwrap();
    scene.add_image(&mut builder);
    builder.write(&path).unwrap();

    let written = BandExtractor::default().process(&path, BandCombination::Water, dir.path()).unwrap().unwrap();
    assert_composite(&scene, BandCombination::Water, &written);
}

#[test]
fn test_zero_height_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let scene = Scene { height: 0, ..Scene::worldview() };
    let source = scene.write(dir.path(), "empty.tif");
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();

    let written = BandExtractor::default().process(&source, BandCombination::Water, &out).unwrap();
    std::assert!(written.is_none());
    std::assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn test_zero_width_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("narrow.tif");

    // 0x2 pixels, 16 bands of u16, two empty strips
    let mut builder = TiffBuilder::new(false);
    let ifd = builder.add_ifd();
    builder.add_layout_tags(ifd, &SampleLayout {
        width: 0,
        height: 2,
        ..Scene::worldview().layout()
    }).unwrap();
    builder.setup_strips(ifd, vec![Vec::new(), Vec::new()], 1).unwrap();
    builder.write(&path).unwrap();

    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();

    let written = BandExtractor::default().process(&path, BandCombination::Water, &out).unwrap();
    std::assert!(written.is_none());
    std::assert_eq!(fs::read_dir(&out).unwrap().count(), 0);

    let mut raster = SourceRaster::open(&path).unwrap();
    std::assert_eq!(raster.read_band(Band::Red).unwrap().dim(), (2, 0));
}

#[test]
fn test_repeated_composites_decode() {
    let dir = tempfile::tempdir().unwrap();
    let scene = Scene::worldview();
    let source = scene.write(dir.path(), "scene.tif");

    let extractor = BandExtractor::new(ArithmeticPolicy::Propagate, OutputCompression::None);
    let mut first: Option<Vec<u8>> = None;
    for run in 0..16 {
        let out = dir.path().join(format!("run{}", run));
        fs::create_dir_all(&out).unwrap();

        let written = extractor.process(&source, BandCombination::Water, &out).unwrap().unwrap();
        assert_composite(&scene, BandCombination::Water, &written);

        let bytes = fs::read(&written).unwrap();
        match &first {
            Some(previous) => std::assert_eq!(previous, &bytes),
            None => first = Some(bytes),
        }
    }
}

#[test]
fn test_unregistered_combination_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = Scene::worldview().write(dir.path(), "scene.tif");
    let out = dir.path().join("out");

    let result = BandKit::new().process(&source, BandCombination::Minerals, &out);
    std::assert!(std::matches!(result, Err(BandKitError::UnsupportedCombination(ref name)) if name == "MINERALS"));
    std::assert!(!out.exists());
}

#[test]
fn test_band_beyond_stack_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let scene = Scene { bands: 6, ..Scene::worldview() };
    let source = scene.write(dir.path(), "six.tif");

    let result = BandExtractor::default().process(&source, BandCombination::Water, dir.path());
    std::assert!(std::matches!(result, Err(BandKitError::BandOutOfRange { band: 8, available: 6 })));
    std::assert!(!dir.path().join("six_water_processed.tif").exists());
}

#[test]
fn test_missing_source_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = BandExtractor::default()
        .process(&dir.path().join("nope.tif"), BandCombination::Water, dir.path());
    std::assert!(std::matches!(result, Err(BandKitError::Io(_))));
}

#[test]
fn test_non_finite_values_follow_policy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nan.tif");

    // 2x2, 8 float bands, band 8 holds NaN and infinity
    let mut data = Vec::new();
    for pixel in 0..4 {
        for band in 0..8 {
            let value = match (band, pixel) {
                (7, 0) => f32::NAN,
                (7, 3) => f32::INFINITY,
                _ => (band * 10 + pixel) as f32,
            };
            data.extend(value.to_le_bytes());
        }
    }

    let mut builder = TiffBuilder::new(false);
    let ifd = builder.add_ifd();
    builder.add_layout_tags(ifd, &SampleLayout {
        width: 2,
        height: 2,
        samples_per_pixel: 8,
        bits_per_sample: 32,
        sample_format: sample_format::IEEEFP,
        planar_config: planar_config::CHUNKY,
        photometric: photometric::BLACK_IS_ZERO,
        compression: compression::NONE as u64,
        predictor: predictor::NONE,
    }).unwrap();
    builder.setup_strips(ifd, vec![data], 2).unwrap();
    builder.write(&path).unwrap();

    let rejecting = BandExtractor::new(ArithmeticPolicy::Reject, OutputCompression::None);
    let result = rejecting.process(&path, BandCombination::Water, dir.path());
    std::assert!(std::matches!(result, Err(BandKitError::NonFiniteValues { count: 2, .. })));

    let written = BandExtractor::default().process(&path, BandCombination::Water, dir.path()).unwrap().unwrap();
    let mut raster = SourceRaster::open(&written).unwrap();
    let red = raster.read_band(Band::Coastal).unwrap();
    std::assert!(red[[0, 0]].is_nan());
    std::assert_eq!(red[[1, 1]], f32::INFINITY);
    std::assert_eq!(red[[0, 1]], 71.0);
    std::assert!(raster.georef().is_empty());
}

#[test]
fn test_api_creates_output_directory_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let scene = Scene::worldview();
    let source = scene.write(dir.path(), "scene.tif");
    let out = dir.path().join("nested").join("out");

    let kit = BandKit::new().with_compression(OutputCompression::Deflate);
    let first = kit.process(&source, BandCombination::ExposedSoil, &out).unwrap().unwrap();
    let second = kit.process(&source, BandCombination::ExposedSoil, &out).unwrap().unwrap();

    std::assert_eq!(first, second);
    std::assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    assert_composite(&scene, BandCombination::ExposedSoil, &second);

    let rgb = kit.extract(&source, BandCombination::ExposedSoil).unwrap();
    std::assert_eq!(rgb.dim(), (scene.height, scene.width));
    std::assert_eq!(rgb.red[[0, 0]], scene.value(Band::Red.index() as usize - 1, 0, 0) as f32);
}
