//! WorldView-3 bands and the named combinations built from them

mod band;
mod registry;

pub use band::Band;
pub use registry::BandCombination;
