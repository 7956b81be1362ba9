use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::ByteReader;
use crate::error::{Error, Result};

/// First format version that stores difficulty stats as 32-bit floats and
/// drops the legacy trailing Short from each record. Versions below use
/// single-byte stats and carry the extra Short.
pub const WIDE_STATS_VERSION: u32 = 20140609;

/// Oldest format version this decoder has layout documentation for.
/// Anything older is decoded best-effort with the legacy narrow layout.
pub const OLDEST_DOCUMENTED_VERSION: u32 = 20121008;

/// The six-field file header preceding the chart records.
///
/// All fields are mandatory and unconditional regardless of version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbHeader {
    /// Format version, a date-shaped number such as `20150203`.
    pub version: u32,
    pub folder_count: u32,
    pub account_unlocked: bool,
    /// Tick count until the account unlocks. Opaque; not calendar-decoded.
    pub account_unlock_time: u64,
    pub player_name: String,
    /// Number of chart records that follow the header.
    pub chart_count: u32,
}

impl DbHeader {
    /// Decodes the header from the cursor, leaving it positioned at the
    /// first chart record.
    pub fn decode(reader: &mut ByteReader) -> Result<Self> {
        let version = field("version", reader.read_u32())?;
        let folder_count = field("folder_count", reader.read_u32())?;
        let account_unlocked = field("account_unlocked", reader.read_bool())?;
        let account_unlock_time = field("account_unlock_time", reader.read_datetime())?;
        let player_name = field("player_name", reader.read_string())?;
        let chart_count = field("chart_count", reader.read_u32())?;

        if version < OLDEST_DOCUMENTED_VERSION {
            warn!(
                version,
                "format version older than any documented layout, decoding best-effort with the legacy field widths"
            );
        }
        debug!(version, chart_count, player = %player_name, "decoded database header");

        Ok(Self {
            version,
            folder_count,
            account_unlocked,
            account_unlock_time,
            player_name,
            chart_count,
        })
    }

    /// True when difficulty stats are stored as Singles rather than Bytes.
    pub fn has_wide_stats(&self) -> bool {
        self.version >= WIDE_STATS_VERSION
    }

    /// True when each record carries the legacy trailing Short.
    pub fn has_legacy_tail(&self) -> bool {
        self.version < WIDE_STATS_VERSION
    }
}

fn field<T>(field: &'static str, result: Result<T>) -> Result<T> {
    result.map_err(|source| Error::Header {
        field,
        source: Box::new(source),
    })
}
