//! Primitive wire codec for the beatmap database format.
//!
//! Every multi-byte value in the file is little-endian. This module provides:
//! - [`ByteReader`] - a forward-only, position-tracking cursor over a byte slice
//! - [`ByteWriter`] - the mirror-image encoder, used by round-trip tests and fixtures
//! - [`Primitive`] / [`Value`] - dynamically-kinded reads for homogeneous batches
//! - [`TimingPoint`] - the fixed 17-byte tempo-marker composite

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;
