use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr};

/// The gameplay mode a chart was made for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromRepr,
)]
#[repr(u8)]
pub enum GameMode {
    #[strum(serialize = "standard")]
    Standard = 0,
    #[strum(serialize = "taiko")]
    Taiko = 1,
    #[strum(serialize = "catch")]
    Catch = 2,
    #[strum(serialize = "mania")]
    Mania = 3,
}

/// Ranked status of a chart, as stored in the record's status byte.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromRepr,
)]
#[repr(u8)]
pub enum RankedStatus {
    #[strum(serialize = "unknown")]
    Unknown = 0,
    #[strum(serialize = "unsubmitted")]
    Unsubmitted = 1,
    #[strum(serialize = "pending")]
    Pending = 2,
    #[strum(serialize = "unused")]
    Unused = 3,
    #[strum(serialize = "ranked")]
    Ranked = 4,
    #[strum(serialize = "approved")]
    Approved = 5,
    #[strum(serialize = "qualified")]
    Qualified = 6,
    #[strum(serialize = "loved")]
    Loved = 7,
}
