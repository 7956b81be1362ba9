//! Database decoder and in-memory data model.
//!
//! This module contains the two-phase decoder for the client's beatmap
//! database and the types it produces:
//! - [`DbHeader`] - the six-field file header
//! - [`ChartRecord`], [`StarRating`] - one decoded chart difficulty
//! - [`ChartSet`], [`Catalog`] - records grouped by set, with an id index
//! - [`GameMode`], [`RankedStatus`] - interpretations of raw status bytes

mod catalog;
mod enums;
mod header;
mod record;

pub use catalog::*;
pub use enums::*;
pub use header::*;
pub use record::*;
