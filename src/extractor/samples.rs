//! Chunk decoding
//!
//! Turns the raw bytes of one strip or tile into f32 values for a single
//! band: fetch, decompress, undo the predictor, then convert samples.

use std::io::SeekFrom;

use crate::compression::CompressionHandler;
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{predictor, sample_format};
use crate::tiff::errors::{TiffError, TiffResult};

use super::layout::RasterLayout;

/// Reads one chunk from the file and decompresses it
///
/// The decompressed chunk must hold at least `expected_len` bytes; longer
/// chunks (padded last strips) are truncated.
pub fn load_chunk(
    source: &mut dyn SeekableReader,
    offset: u64,
    byte_count: u64,
    handler: &dyn CompressionHandler,
    expected_len: usize
) -> TiffResult<Vec<u8>> {
    source.seek(SeekFrom::Start(offset))?;
    let mut compressed = vec![0u8; byte_count as usize];
    source.read_exact(&mut compressed)?;

    let mut data = handler.decompress(&compressed)?;
    if data.len() < expected_len {
        return Err(TiffError::DecompressionError(format!(
            "{} chunk at offset {} decoded to {} bytes, expected {}",
            handler.name(), offset, data.len(), expected_len)));
    }

    data.truncate(expected_len);
    Ok(data)
}

/// Decodes the values of one band from a decompressed chunk
///
/// `chunk_width` is the number of pixels per chunk row, `sample` the band's
/// position within a pixel (always 0 for planar images). The result holds
/// `rows * chunk_width` values in row-major order.
pub fn decode_band(
    mut data: Vec<u8>,
    layout: &RasterLayout,
    chunk_width: usize,
    rows: usize,
    sample: usize
) -> TiffResult<Vec<f32>> {
    let stride = layout.pixel_stride();
    let bps = layout.bytes_per_sample();
    let row_len = chunk_width * stride * bps;
    if row_len == 0 || rows == 0 {
        return Ok(Vec::new());
    }

    if data.len() < row_len * rows {
        return Err(TiffError::DecompressionError(format!(
            "Chunk holds {} bytes, {} rows of {} bytes expected", data.len(), rows, row_len)));
    }

    let mut byte_order = layout.byte_order;
    match layout.predictor {
        predictor::HORIZONTAL_DIFFERENCING => {
            for row in data.chunks_exact_mut(row_len).take(rows) {
                undo_horizontal_differencing(row, stride, bps, byte_order);
            }
        },
        predictor::FLOATING_POINT => {
            for row in data.chunks_exact_mut(row_len).take(rows) {
                undo_floating_point_prediction(row, stride, bps);
            }
            // The predictor leaves the bytes of every value most significant first
            byte_order = ByteOrder::BigEndian;
        },
        _ => {},
    }

    let convert = sample_converter(layout.sample_format, layout.bits_per_sample, byte_order)?;

    let mut values = Vec::with_capacity(rows * chunk_width);
    for row in data.chunks_exact(row_len).take(rows) {
        values.extend(row.chunks_exact(stride * bps)
            .map(|pixel| convert(&pixel[sample * bps..(sample + 1) * bps])));
    }

    Ok(values)
}

/// Reverses horizontal differencing on one row
///
/// Each sample was stored as the difference to the same sample of the
/// previous pixel, modulo its bit width.
fn undo_horizontal_differencing(row: &mut [u8], stride: usize, bps: usize, byte_order: ByteOrder) {
    if bps == 1 {
        for i in stride..row.len() {
            row[i] = row[i].wrapping_add(row[i - stride]);
        }
        return;
    }

    let mask = if bps == 8 { u64::MAX } else { (1u64 << (bps * 8)) - 1 };
    let step = stride * bps;
    for i in (step..row.len()).step_by(bps) {
        let previous = byte_order.uint_from_bytes(&row[i - step..], bps);
        let delta = byte_order.uint_from_bytes(&row[i..], bps);
        let value = previous.wrapping_add(delta) & mask;
        row[i..i + bps].copy_from_slice(&byte_order.uint_to_bytes(value, bps));
    }
}

/// Reverses the floating point predictor on one row
///
/// The encoder split each value into byte planes (most significant plane
/// first) and then differenced the bytes horizontally.
fn undo_floating_point_prediction(row: &mut [u8], stride: usize, bps: usize) {
    for i in stride..row.len() {
        row[i] = row[i].wrapping_add(row[i - stride]);
    }

    let shuffled = row.to_vec();
    let value_count = row.len() / bps;
    for count in 0..value_count {
        for byte in 0..bps {
            row[bps * count + byte] = shuffled[byte * value_count + count];
        }
    }
}

type SampleConverter = Box<dyn Fn(&[u8]) -> f32>;

/// Picks the conversion from raw sample bytes to f32
fn sample_converter(format: u16, bits: u16, byte_order: ByteOrder) -> TiffResult<SampleConverter> {
    let converter: SampleConverter = match (format, bits) {
        (sample_format::UNSIGNED, 8) => Box::new(|b: &[u8]| b[0] as f32),
        (sample_format::SIGNED, 8) => Box::new(|b: &[u8]| b[0] as i8 as f32),
        (sample_format::UNSIGNED, 16) => Box::new(move |b: &[u8]| byte_order.uint_from_bytes(b, 2) as u16 as f32),
        (sample_format::SIGNED, 16) => Box::new(move |b: &[u8]| byte_order.uint_from_bytes(b, 2) as u16 as i16 as f32),
        (sample_format::UNSIGNED, 32) => Box::new(move |b: &[u8]| byte_order.uint_from_bytes(b, 4) as u32 as f32),
        (sample_format::SIGNED, 32) => Box::new(move |b: &[u8]| byte_order.uint_from_bytes(b, 4) as u32 as i32 as f32),
        (sample_format::IEEEFP, 32) => Box::new(move |b: &[u8]| byte_order.f32_from_bytes(b)),
        (sample_format::IEEEFP, 64) => Box::new(move |b: &[u8]| byte_order.f64_from_bytes(b) as f32),
        _ => return Err(TiffError::UnsupportedSampleType(format, bits)),
    };

    Ok(converter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::layout::Chunking;
    use crate::tiff::constants::planar_config;

    fn layout(format: u16, bits: u16, samples: u16, pred: u16, byte_order: ByteOrder) -> RasterLayout {
        RasterLayout {
            width: 3,
            height: 1,
            samples_per_pixel: samples,
            bits_per_sample: bits,
            sample_format: format,
            planar_config: planar_config::CHUNKY,
            compression: 1,
            predictor: pred,
            chunking: Chunking::Strips { rows_per_strip: 1 },
            byte_order,
        }
    }

    #[test]
    fn picks_one_band_from_interleaved_pixels() {
        // 3 pixels x 2 bands of u16 LE: (1,100) (2,200) (3,300)
        let data: Vec<u8> = [1u16, 100, 2, 200, 3, 300].iter().flat_map(|v| v.to_le_bytes()).collect();
        let l = layout(sample_format::UNSIGNED, 16, 2, predictor::NONE, ByteOrder::LittleEndian);

        assert_eq!(decode_band(data.clone(), &l, 3, 1, 0).unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(decode_band(data, &l, 3, 1, 1).unwrap(), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn undoes_horizontal_differencing_big_endian() {
        // Values 1000, 990, 1010 stored as 1000, -10, +20 (mod 2^16)
        let deltas = [1000u16, 0u16.wrapping_sub(10), 20];
        let data: Vec<u8> = deltas.iter().flat_map(|v| v.to_be_bytes()).collect();
        let l = layout(sample_format::UNSIGNED, 16, 1, predictor::HORIZONTAL_DIFFERENCING, ByteOrder::BigEndian);

        assert_eq!(decode_band(data, &l, 3, 1, 0).unwrap(), vec![1000.0, 990.0, 1010.0]);
    }

    #[test]
    fn zero_width_chunks_decode_to_nothing() {
        let l = layout(sample_format::UNSIGNED, 16, 16, predictor::HORIZONTAL_DIFFERENCING, ByteOrder::LittleEndian);
        assert!(decode_band(Vec::new(), &l, 0, 2, 7).unwrap().is_empty());
    }

    #[test]
    fn signed_samples_keep_their_sign() {
        let data: Vec<u8> = [-5i16, 0, 7].iter().flat_map(|v| v.to_le_bytes()).collect();
        let l = layout(sample_format::SIGNED, 16, 1, predictor::NONE, ByteOrder::LittleEndian);

        assert_eq!(decode_band(data, &l, 3, 1, 0).unwrap(), vec![-5.0, 0.0, 7.0]);
    }

    #[test]
    fn undoes_floating_point_predictor() {
        let values = [1.5f32, -0.25, 1024.0];

        // Encode: byte planes most significant first, then byte differencing
        let be: Vec<[u8; 4]> = values.iter().map(|v| v.to_be_bytes()).collect();
        let mut planes = Vec::new();
        for byte in 0..4 {
            for value in &be {
                planes.push(value[byte]);
            }
        }
        let mut encoded = planes.clone();
        for i in (1..encoded.len()).rev() {
            encoded[i] = planes[i].wrapping_sub(planes[i - 1]);
        }

        let l = layout(sample_format::IEEEFP, 32, 1, predictor::FLOATING_POINT, ByteOrder::LittleEndian);
        assert_eq!(decode_band(encoded, &l, 3, 1, 0).unwrap(), values.to_vec());
    }

    #[test]
    fn short_chunk_is_an_error() {
        let l = layout(sample_format::UNSIGNED, 8, 1, predictor::NONE, ByteOrder::LittleEndian);
        assert!(decode_band(vec![1, 2], &l, 3, 1, 0).is_err());
    }
}
