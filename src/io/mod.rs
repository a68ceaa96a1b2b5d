//! Low-level I/O helpers shared by the TIFF reader and the band decoders.

pub mod seekable;
pub mod byte_order;
