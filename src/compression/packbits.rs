//! Handler for PackBits compressed data
//!
//! PackBits is a byte-oriented run-length scheme. Each run starts with a
//! signed header byte n:
//! - 0..=127: copy the next n+1 bytes literally
//! - -127..=-1: repeat the next byte 1-n times
//! - -128: no-op

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// Longest run a single header can describe
const MAX_RUN: usize = 128;

/// PackBits compression handler (compression code 32773)
pub struct PackBitsHandler;

impl CompressionHandler for PackBitsHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 2);
        let mut pos = 0;

        while pos < data.len() {
            let header = data[pos] as i8;
            pos += 1;

            match header {
                -128 => {},
                0..=127 => {
                    let count = header as usize + 1;
                    let literal = data.get(pos..pos + count).ok_or_else(|| {
                        TiffError::DecompressionError(format!(
                            "PackBits literal run of {} bytes overruns input at {}", count, pos))
                    })?;
                    out.extend_from_slice(literal);
                    pos += count;
                },
                _ => {
                    let count = 1 - header as isize;
                    let value = *data.get(pos).ok_or_else(|| {
                        TiffError::DecompressionError("PackBits repeat run missing its byte".to_string())
                    })?;
                    out.extend(std::iter::repeat(value).take(count as usize));
                    pos += 1;
                },
            }
        }

        Ok(out)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() + data.len() / MAX_RUN + 1);
        let mut pos = 0;

        while pos < data.len() {
            let run = repeat_length(&data[pos..]);

            if run >= 2 {
                out.push((1 - run as isize) as i8 as u8);
                out.push(data[pos]);
                pos += run;
                continue;
            }

            // Literal run: stop where a repeat of at least 2 begins
            let start = pos;
            pos += 1;
            while pos < data.len() && pos - start < MAX_RUN && repeat_length(&data[pos..]) < 2 {
                pos += 1;
            }

            out.push((pos - start - 1) as u8);
            out.extend_from_slice(&data[start..pos]);
        }

        Ok(out)
    }

    fn name(&self) -> &'static str {
        "PackBits"
    }

    fn code(&self) -> u64 {
        compression::PACKBITS as u64
    }
}

/// Number of leading bytes equal to the first, capped at one run
fn repeat_length(data: &[u8]) -> usize {
    match data.first() {
        Some(&first) => data.iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == first)
            .count(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_sequence() {
        // Sample from the TIFF 6.0 specification
        let packed = [0xFE, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00, 0x2A, 0x22,
                      0xF7, 0xAA];
        let expected = [0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80, 0x00,
                        0x2A, 0x22, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA];

        assert_eq!(PackBitsHandler.decompress(&packed).unwrap(), expected);
    }

    #[test]
    fn long_runs_are_split() {
        let data = vec![7u8; 300];
        let packed = PackBitsHandler.compress(&data).unwrap();
        assert_eq!(packed.len(), 6);
        assert_eq!(PackBitsHandler.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn float_rows_survive() {
        let data: Vec<u8> = [0.0f32, 0.0, 1.5, f32::NAN, -2.25, 0.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let packed = PackBitsHandler.compress(&data).unwrap();
        assert_eq!(PackBitsHandler.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn truncated_literal_is_an_error() {
        assert!(PackBitsHandler.decompress(&[0x05, 0x01, 0x02]).is_err());
    }
}
