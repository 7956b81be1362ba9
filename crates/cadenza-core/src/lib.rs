//! Decoder for the rhythm-game client's local beatmap database.
//!
//! The database is a single binary file listing every chart the client has
//! cached locally: a short player header followed by one variable-length
//! record per chart difficulty. `codec` handles the primitive wire types,
//! `db` walks the file and assembles the read-only [`Catalog`].

pub mod codec;
pub mod db;
pub mod error;

pub use codec::{ByteReader, ByteWriter, Primitive, TimingPoint, Value};
pub use db::{Catalog, ChartRecord, ChartSet, DbHeader, GameMode, RankedStatus, StarRating};
pub use error::{Error, Result};
