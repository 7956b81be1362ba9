use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::codec::ByteReader;
use crate::db::{ChartRecord, DbHeader};
use crate::error::Result;

/// All difficulties of one song: a non-empty run of records sharing a
/// `chart_set_id`, in file order.
///
/// A set can only be built from its first record, so the decoder cannot
/// produce an empty one.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSet {
    set_id: u32,
    charts: Vec<ChartRecord>,
}

impl ChartSet {
    fn new(first: ChartRecord) -> Self {
        Self {
            set_id: first.chart_set_id,
            charts: vec![first],
        }
    }

    fn push(&mut self, record: ChartRecord) {
        debug_assert_eq!(record.chart_set_id, self.set_id);
        self.charts.push(record);
    }

    pub fn set_id(&self) -> u32 {
        self.set_id
    }

    /// The set's records, in file order.
    pub fn charts(&self) -> &[ChartRecord] {
        &self.charts
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

/// The fully decoded, read-only representation of the database file.
///
/// Built once by a single decode call and never mutated afterwards, so it is
/// safe to share behind a reference once construction completes. Holds the
/// header, the sets in first-seen order, and a `chart_id` index for O(1)
/// lookups.
#[derive(Debug, Serialize)]
pub struct Catalog {
    header: DbHeader,
    sets: Vec<ChartSet>,
    /// chart_id -> (set slot, position within the set). Positions instead of
    /// copies keep each record singly owned by its set.
    index: HashMap<u32, (usize, usize)>,
}

impl Catalog {
    /// Decodes a complete database from a byte slice.
    ///
    /// One forward pass: header, then exactly `chart_count` records. Any
    /// failure aborts the decode; no partial catalog is ever returned.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let header = DbHeader::decode(&mut reader)?;

        let mut records = Vec::with_capacity((header.chart_count as usize).min(65_536));
        for index in 0..header.chart_count {
            records.push(ChartRecord::decode(&mut reader, &header, index)?);
        }

        Ok(Self::assemble(header, records))
    }

    /// Reads the source to its end, then decodes.
    pub fn from_reader(mut source: impl Read) -> Result<Self> {
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        Self::decode(&data)
    }

    /// Opens and decodes the database file at `path`.
    ///
    /// The file handle is scoped to this call and released on every exit
    /// path, success or error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Self::decode(&data)
    }

    /// Groups records by `chart_set_id` (first-seen set order, file order
    /// within each set) and builds the `chart_id` index over the flat file
    /// order. A duplicate `chart_id` overwrites the earlier index entry:
    /// last write wins, and both records stay present in their sets.
    fn assemble(header: DbHeader, records: Vec<ChartRecord>) -> Self {
        let mut sets: Vec<ChartSet> = Vec::new();
        let mut set_slots: HashMap<u32, usize> = HashMap::new();
        let mut index: HashMap<u32, (usize, usize)> = HashMap::with_capacity(records.len());

        for record in records {
            let chart_id = record.chart_id;
            let slot = match set_slots.get(&record.chart_set_id) {
                Some(&slot) => {
                    sets[slot].push(record);
                    slot
                }
                None => {
                    let slot = sets.len();
                    set_slots.insert(record.chart_set_id, slot);
                    sets.push(ChartSet::new(record));
                    slot
                }
            };
            index.insert(chart_id, (slot, sets[slot].len() - 1));
        }

        debug!(
            sets = sets.len(),
            charts = index.len(),
            "assembled catalog"
        );

        Self {
            header,
            sets,
            index,
        }
    }

    pub fn header(&self) -> &DbHeader {
        &self.header
    }

    /// The chart sets, in first-seen file order.
    pub fn sets(&self) -> &[ChartSet] {
        &self.sets
    }

    /// O(1) lookup by chart id. `None` when absent.
    pub fn get(&self, chart_id: u32) -> Option<&ChartRecord> {
        self.index
            .get(&chart_id)
            .map(|&(slot, pos)| &self.sets[slot].charts[pos])
    }

    /// Iterates every record, grouped by set.
    pub fn charts(&self) -> impl Iterator<Item = &ChartRecord> {
        self.sets.iter().flat_map(|set| set.charts.iter())
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Total number of decoded records across all sets.
    pub fn chart_count(&self) -> usize {
        self.sets.iter().map(ChartSet::len).sum()
    }
}
