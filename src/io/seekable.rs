//! Seekable reader trait
//!
//! A single trait object type for the buffered file handles and in-memory
//! cursors the TIFF reader works on.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
