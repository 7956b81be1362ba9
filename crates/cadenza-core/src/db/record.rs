use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codec::{ByteReader, Primitive, TimingPoint};
use crate::db::{DbHeader, GameMode, RankedStatus};
use crate::error::{Error, Result};

/// Star rating for one mod combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarRating {
    /// Bitset of the mod combination the rating was computed for.
    pub mods: u32,
    pub stars: f64,
}

/// One decoded chart difficulty.
///
/// Field order mirrors the on-disk record. Immutable once decoded; records
/// are created only by the database decoder and owned by the [`ChartSet`]
/// that holds them.
///
/// [`ChartSet`]: crate::db::ChartSet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRecord {
    pub artist: String,
    pub artist_unicode: String,
    pub title: String,
    pub title_unicode: String,
    /// Chart author (mapper).
    pub author: String,
    pub difficulty_name: String,
    pub audio_file: String,
    /// Hex digest of the chart file contents.
    pub hash: String,
    /// File name of the chart within its storage folder.
    pub chart_file: String,
    /// Raw status byte; interpret with [`ChartRecord::ranked_status`].
    pub status: u8,
    pub circle_count: u16,
    pub slider_count: u16,
    pub spinner_count: u16,
    /// Last modification time in ticks. Opaque.
    pub last_modified: u64,
    pub approach_rate: f32,
    pub circle_size: f32,
    pub hp_drain: f32,
    pub overall_difficulty: f32,
    pub slider_velocity: f64,
    pub star_ratings_standard: Vec<StarRating>,
    pub star_ratings_taiko: Vec<StarRating>,
    pub star_ratings_catch: Vec<StarRating>,
    pub star_ratings_mania: Vec<StarRating>,
    /// Drain time in seconds.
    pub drain_time: u32,
    /// Total time in milliseconds.
    pub total_time: u32,
    /// Audio preview start in milliseconds.
    pub preview_time: u32,
    /// Tempo markers in file order, which is chronological order.
    pub timing_points: Vec<TimingPoint>,
    pub chart_id: u32,
    pub chart_set_id: u32,
    /// Discussion-thread id.
    pub thread_id: u32,
    /// Grade achieved per mode: standard, taiko, catch, mania.
    pub grades: [u8; 4],
    pub local_offset: u16,
    pub stack_leniency: f32,
    /// Raw mode byte; interpret with [`ChartRecord::game_mode`].
    pub mode: u8,
    pub source: String,
    pub tags: String,
    pub online_offset: u16,
    pub title_font: String,
    pub unplayed: bool,
    pub last_played: u64,
    pub legacy_archive: bool,
    /// Storage folder name, relative to the client's songs directory.
    pub folder_name: String,
    pub last_checked: u64,
    pub ignore_sounds: bool,
    pub ignore_skin: bool,
    pub disable_storyboard: bool,
    pub disable_video: bool,
    pub visual_override: bool,
    pub scroll_speed: u8,
}

impl ChartRecord {
    /// Decodes one record from the cursor.
    ///
    /// Every field is consumed in the exact on-disk order; skipping or
    /// reordering any of them desynchronizes the rest of the file. The
    /// header's format version selects between the modern (Single stats)
    /// and legacy (Byte stats + trailing Short) layouts.
    pub fn decode(reader: &mut ByteReader, header: &DbHeader, index: u32) -> Result<Self> {
        let artist = field(index, "artist", reader.read_string())?;
        let artist_unicode = field(index, "artist_unicode", reader.read_string())?;
        let title = field(index, "title", reader.read_string())?;
        let title_unicode = field(index, "title_unicode", reader.read_string())?;
        let author = field(index, "author", reader.read_string())?;
        let difficulty_name = field(index, "difficulty_name", reader.read_string())?;
        let audio_file = field(index, "audio_file", reader.read_string())?;
        let hash = field(index, "hash", reader.read_string())?;
        let chart_file = field(index, "chart_file", reader.read_string())?;
        let status = field(index, "status", reader.read_u8())?;
        let circle_count = field(index, "circle_count", reader.read_u16())?;
        let slider_count = field(index, "slider_count", reader.read_u16())?;
        let spinner_count = field(index, "spinner_count", reader.read_u16())?;
        let last_modified = field(index, "last_modified", reader.read_u64())?;

        // Difficulty stats widened from Byte on legacy versions.
        let approach_rate = field(index, "approach_rate", read_stat(reader, header))?;
        let circle_size = field(index, "circle_size", read_stat(reader, header))?;
        let hp_drain = field(index, "hp_drain", read_stat(reader, header))?;
        let overall_difficulty = field(index, "overall_difficulty", read_stat(reader, header))?;
        let slider_velocity = field(index, "slider_velocity", reader.read_f64())?;

        let star_ratings_standard =
            field(index, "star_ratings_standard", read_star_ratings(reader))?;
        let star_ratings_taiko = field(index, "star_ratings_taiko", read_star_ratings(reader))?;
        let star_ratings_catch = field(index, "star_ratings_catch", read_star_ratings(reader))?;
        let star_ratings_mania = field(index, "star_ratings_mania", read_star_ratings(reader))?;

        let drain_time = field(index, "drain_time", reader.read_u32())?;
        let total_time = field(index, "total_time", reader.read_u32())?;
        let preview_time = field(index, "preview_time", reader.read_u32())?;

        let timing_points = field(index, "timing_points", read_timing_points(reader))?;

        let ids = field(index, "ids", reader.read_batch(3, Primitive::Int))?;
        let [chart_id, chart_set_id, thread_id] = take_u32s(ids)?;

        let grade_values = field(index, "grades", reader.read_batch(4, Primitive::Byte))?;
        let grades = take_u8s(grade_values)?;

        let local_offset = field(index, "local_offset", reader.read_u16())?;
        let stack_leniency = field(index, "stack_leniency", reader.read_f32())?;
        let mode = field(index, "mode", reader.read_u8())?;
        let source = field(index, "source", reader.read_string())?;
        let tags = field(index, "tags", reader.read_string())?;
        let online_offset = field(index, "online_offset", reader.read_u16())?;
        let title_font = field(index, "title_font", reader.read_string())?;
        let unplayed = field(index, "unplayed", reader.read_bool())?;
        let last_played = field(index, "last_played", reader.read_u64())?;
        let legacy_archive = field(index, "legacy_archive", reader.read_bool())?;
        let folder_name = field(index, "folder_name", reader.read_string())?;
        let last_checked = field(index, "last_checked", reader.read_u64())?;

        let flag_values = field(index, "flags", reader.read_batch(5, Primitive::Boolean))?;
        let [ignore_sounds, ignore_skin, disable_storyboard, disable_video, visual_override] =
            take_bools(flag_values)?;

        if header.has_legacy_tail() {
            let _ = field(index, "legacy_tail", reader.read_u16())?;
        }
        // Trailing Int is undocumented, possibly another modification time.
        let _ = field(index, "trailing_int", reader.read_u32())?;
        let scroll_speed = field(index, "scroll_speed", reader.read_u8())?;

        trace!(
            index,
            chart_id,
            chart_set_id,
            %artist,
            %title,
            %difficulty_name,
            "decoded chart record"
        );

        Ok(Self {
            artist,
            artist_unicode,
            title,
            title_unicode,
            author,
            difficulty_name,
            audio_file,
            hash,
            chart_file,
            status,
            circle_count,
            slider_count,
            spinner_count,
            last_modified,
            approach_rate,
            circle_size,
            hp_drain,
            overall_difficulty,
            slider_velocity,
            star_ratings_standard,
            star_ratings_taiko,
            star_ratings_catch,
            star_ratings_mania,
            drain_time,
            total_time,
            preview_time,
            timing_points,
            chart_id,
            chart_set_id,
            thread_id,
            grades,
            local_offset,
            stack_leniency,
            mode,
            source,
            tags,
            online_offset,
            title_font,
            unplayed,
            last_played,
            legacy_archive,
            folder_name,
            last_checked,
            ignore_sounds,
            ignore_skin,
            disable_storyboard,
            disable_video,
            visual_override,
            scroll_speed,
        })
    }

    /// Interprets the raw mode byte, `None` for unrecognized values.
    pub fn game_mode(&self) -> Option<GameMode> {
        GameMode::from_repr(self.mode)
    }

    /// Interprets the raw status byte, falling back to `Unknown` for
    /// unrecognized values.
    pub fn ranked_status(&self) -> RankedStatus {
        RankedStatus::from_repr(self.status).unwrap_or(RankedStatus::Unknown)
    }

    /// "Artist - Title [Difficulty]" display form.
    pub fn display_name(&self) -> String {
        format!("{} - {} [{}]", self.artist, self.title, self.difficulty_name)
    }
}

/// Difficulty stat: Single on modern versions, Byte widened to f32 before.
fn read_stat(reader: &mut ByteReader, header: &DbHeader) -> Result<f32> {
    if header.has_wide_stats() {
        reader.read_f32()
    } else {
        Ok(f32::from(reader.read_u8()?))
    }
}

fn read_star_ratings(reader: &mut ByteReader) -> Result<Vec<StarRating>> {
    let count = reader.read_u32()?;
    // The count comes straight from the file, so cap the up-front allocation.
    let mut ratings = Vec::with_capacity((count as usize).min(1024));
    for _ in 0..count {
        let (mods, stars) = reader.read_int_double_pair()?;
        ratings.push(StarRating { mods, stars });
    }
    Ok(ratings)
}

fn read_timing_points(reader: &mut ByteReader) -> Result<Vec<TimingPoint>> {
    let count = reader.read_u32()?;
    let mut points = Vec::with_capacity((count as usize).min(1024));
    for _ in 0..count {
        points.push(reader.read_timing_point()?);
    }
    Ok(points)
}

fn take_u32s<const N: usize>(values: Vec<crate::codec::Value>) -> Result<[u32; N]> {
    let mut out = [0u32; N];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value.into_u32()?;
    }
    Ok(out)
}

fn take_u8s<const N: usize>(values: Vec<crate::codec::Value>) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value.into_u8()?;
    }
    Ok(out)
}

fn take_bools<const N: usize>(values: Vec<crate::codec::Value>) -> Result<[bool; N]> {
    let mut out = [false; N];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value.into_bool()?;
    }
    Ok(out)
}

fn field<T>(index: u32, field: &'static str, result: Result<T>) -> Result<T> {
    result.map_err(|source| Error::Record {
        index,
        field,
        source: Box::new(source),
    })
}
