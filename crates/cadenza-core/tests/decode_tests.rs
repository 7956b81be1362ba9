//! End-to-end decode tests for cadenza-core.
//!
//! Fixtures are built byte-exact with `ByteWriter`, the same encoder the
//! codec round-trip tests use, so every test exercises the real wire layout.

use std::io::Write;

use cadenza_core::codec::{ByteReader, ByteWriter, TimingPoint};
use cadenza_core::db::{Catalog, ChartRecord, DbHeader, GameMode, RankedStatus};
use cadenza_core::error::Error;

/// One synthetic chart record with enough knobs for the tests.
struct RecordFixture {
    artist: String,
    title: String,
    difficulty_name: String,
    chart_id: u32,
    chart_set_id: u32,
    approach_rate: f32,
    mode: u8,
    status: u8,
    timing_points: Vec<TimingPoint>,
}

impl Default for RecordFixture {
    fn default() -> Self {
        Self {
            artist: "Artist".to_string(),
            title: "Title".to_string(),
            difficulty_name: "Insane".to_string(),
            chart_id: 1,
            chart_set_id: 1,
            approach_rate: 9.0,
            mode: 0,
            status: 4,
            timing_points: vec![TimingPoint {
                beat_length: 500.0,
                offset: 0.0,
                uninherited: true,
            }],
        }
    }
}

impl RecordFixture {
    /// Encodes the record in the exact on-disk field order.
    fn encode(&self, writer: &mut ByteWriter, wide_stats: bool, legacy_tail: bool) {
        writer.write_string(&self.artist);
        writer.write_string(&format!("{}-unicode", self.artist));
        writer.write_string(&self.title);
        writer.write_string(&format!("{}-unicode", self.title));
        writer.write_string("mapper");
        writer.write_string(&self.difficulty_name);
        writer.write_string("audio.mp3");
        writer.write_string("d41d8cd98f00b204e9800998ecf8427e");
        writer.write_string("chart.osu");
        writer.write_u8(self.status);
        writer.write_u16(100); // circles
        writer.write_u16(20); // sliders
        writer.write_u16(2); // spinners
        writer.write_u64(636_000_000_000_000_000); // last modified ticks

        // ar, cs, hp, od
        for stat in [self.approach_rate, 4.0, 6.0, 8.0] {
            if wide_stats {
                writer.write_f32(stat);
            } else {
                writer.write_u8(stat as u8);
            }
        }
        writer.write_f64(1.4); // slider velocity

        // Four star-rating tables: one entry for standard, empty for the rest
        writer.write_u32(1);
        writer.write_int_double_pair(0, 5.3);
        for _ in 0..3 {
            writer.write_u32(0);
        }

        writer.write_u32(95); // drain time (s)
        writer.write_u32(98_000); // total time (ms)
        writer.write_u32(31_000); // preview time (ms)

        writer.write_u32(self.timing_points.len() as u32);
        for point in &self.timing_points {
            writer.write_timing_point(point);
        }

        writer.write_u32(self.chart_id);
        writer.write_u32(self.chart_set_id);
        writer.write_u32(777); // thread id
        for grade in [9u8, 9, 9, 9] {
            writer.write_u8(grade);
        }
        writer.write_u16(0); // local offset
        writer.write_f32(0.7); // stack leniency
        writer.write_u8(self.mode);
        writer.write_string("source");
        writer.write_string("tag1 tag2");
        writer.write_u16(0); // online offset
        writer.write_string(""); // title font
        writer.write_bool(false); // unplayed
        writer.write_u64(0); // last played
        writer.write_bool(false); // legacy archive
        writer.write_string("Artist - Title");
        writer.write_u64(0); // last checked
        for flag in [false, false, false, false, false] {
            writer.write_bool(flag);
        }
        if legacy_tail {
            writer.write_u16(0);
        }
        writer.write_u32(0); // trailing opaque int
        writer.write_u8(0); // mania scroll speed
    }
}

fn encode_db(version: u32, player: &str, records: &[RecordFixture]) -> Vec<u8> {
    let wide_stats = version >= 20140609;
    let legacy_tail = version < 20140609;

    let mut writer = ByteWriter::new();
    writer.write_u32(version);
    writer.write_u32(0); // folder count
    writer.write_bool(true);
    writer.write_datetime(0);
    writer.write_string(player);
    writer.write_u32(records.len() as u32);
    for record in records {
        record.encode(&mut writer, wide_stats, legacy_tail);
    }
    writer.into_bytes()
}

mod end_to_end {
    use super::*;

    #[test]
    fn test_minimal_single_chart_database() {
        let data = encode_db(
            20150203,
            "p",
            &[RecordFixture {
                chart_id: 42,
                chart_set_id: 7,
                ..Default::default()
            }],
        );

        let catalog = Catalog::decode(&data).unwrap();
        assert_eq!(catalog.header().version, 20150203);
        assert_eq!(catalog.header().player_name, "p");
        assert_eq!(catalog.set_count(), 1);
        assert_eq!(catalog.chart_count(), 1);

        let set = &catalog.sets()[0];
        assert_eq!(set.set_id(), 7);
        assert_eq!(set.len(), 1);

        let record = catalog.get(42).expect("index lookup by chart id");
        assert_eq!(record.chart_id, 42);
        assert_eq!(record.chart_set_id, 7);
        assert_eq!(record.timing_points.len(), 1);
        let point = record.timing_points[0];
        assert_eq!(point.beat_length, 500.0);
        assert_eq!(point.offset, 0.0);
        assert!(point.uninherited);
        assert_eq!(point.bpm(), 120.0);
    }

    #[test]
    fn test_empty_database() {
        let data = encode_db(20150203, "p", &[]);

        let catalog = Catalog::decode(&data).unwrap();
        assert_eq!(catalog.set_count(), 0);
        assert_eq!(catalog.chart_count(), 0);
        assert!(catalog.get(1).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let data = encode_db(
            20150203,
            "p",
            &[RecordFixture {
                chart_id: 42,
                ..Default::default()
            }],
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert!(catalog.get(42).is_some());
    }

    #[test]
    fn test_from_reader() {
        let data = encode_db(20150203, "p", &[RecordFixture::default()]);

        let catalog = Catalog::from_reader(data.as_slice()).unwrap();
        assert_eq!(catalog.chart_count(), 1);
    }

    #[test]
    fn test_record_field_values_survive_decode() {
        let data = encode_db(20150203, "p", &[RecordFixture::default()]);
        let catalog = Catalog::decode(&data).unwrap();
        let record = catalog.get(1).unwrap();

        assert_eq!(record.artist, "Artist");
        assert_eq!(record.artist_unicode, "Artist-unicode");
        assert_eq!(record.title, "Title");
        assert_eq!(record.author, "mapper");
        assert_eq!(record.difficulty_name, "Insane");
        assert_eq!(record.hash, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(record.chart_file, "chart.osu");
        assert_eq!(record.circle_count, 100);
        assert_eq!(record.slider_count, 20);
        assert_eq!(record.spinner_count, 2);
        assert_eq!(record.approach_rate, 9.0);
        assert_eq!(record.slider_velocity, 1.4);
        assert_eq!(record.star_ratings_standard.len(), 1);
        assert_eq!(record.star_ratings_standard[0].stars, 5.3);
        assert!(record.star_ratings_taiko.is_empty());
        assert_eq!(record.drain_time, 95);
        assert_eq!(record.thread_id, 777);
        assert_eq!(record.grades, [9, 9, 9, 9]);
        assert_eq!(record.folder_name, "Artist - Title");
        assert_eq!(record.display_name(), "Artist - Title [Insane]");
    }
}

mod grouping {
    use super::*;

    #[test]
    fn test_consecutive_records_with_equal_set_id_share_a_set() {
        let data = encode_db(
            20150203,
            "p",
            &[
                RecordFixture {
                    chart_id: 10,
                    chart_set_id: 5,
                    difficulty_name: "Easy".to_string(),
                    ..Default::default()
                },
                RecordFixture {
                    chart_id: 11,
                    chart_set_id: 5,
                    difficulty_name: "Hard".to_string(),
                    ..Default::default()
                },
            ],
        );

        let catalog = Catalog::decode(&data).unwrap();
        assert_eq!(catalog.set_count(), 1);

        let set = &catalog.sets()[0];
        assert_eq!(set.len(), 2);
        assert_eq!(set.charts()[0].difficulty_name, "Easy");
        assert_eq!(set.charts()[1].difficulty_name, "Hard");
    }

    #[test]
    fn test_interleaved_sets_keep_first_seen_order() {
        let data = encode_db(
            20150203,
            "p",
            &[
                RecordFixture {
                    chart_id: 1,
                    chart_set_id: 100,
                    ..Default::default()
                },
                RecordFixture {
                    chart_id: 2,
                    chart_set_id: 200,
                    ..Default::default()
                },
                RecordFixture {
                    chart_id: 3,
                    chart_set_id: 100,
                    ..Default::default()
                },
            ],
        );

        let catalog = Catalog::decode(&data).unwrap();
        assert_eq!(catalog.set_count(), 2);
        assert_eq!(catalog.sets()[0].set_id(), 100);
        assert_eq!(catalog.sets()[1].set_id(), 200);
        assert_eq!(catalog.sets()[0].len(), 2);
        assert_eq!(catalog.sets()[0].charts()[1].chart_id, 3);
    }

    #[test]
    fn test_duplicate_chart_id_last_write_wins_in_index() {
        let data = encode_db(
            20150203,
            "p",
            &[
                RecordFixture {
                    chart_id: 42,
                    chart_set_id: 1,
                    difficulty_name: "first".to_string(),
                    ..Default::default()
                },
                RecordFixture {
                    chart_id: 42,
                    chart_set_id: 2,
                    difficulty_name: "second".to_string(),
                    ..Default::default()
                },
            ],
        );

        let catalog = Catalog::decode(&data).unwrap();
        // Both records survive in their sets
        assert_eq!(catalog.chart_count(), 2);
        // The index resolves to the later record in file order
        assert_eq!(catalog.get(42).unwrap().difficulty_name, "second");
    }
}

mod layout {
    use super::*;

    fn header_for(version: u32) -> DbHeader {
        DbHeader {
            version,
            folder_count: 0,
            account_unlocked: true,
            account_unlock_time: 0,
            player_name: "p".to_string(),
            chart_count: 1,
        }
    }

    #[test]
    fn test_record_consumes_exactly_its_encoded_bytes() {
        let fixture = RecordFixture {
            timing_points: vec![
                TimingPoint {
                    beat_length: 500.0,
                    offset: 0.0,
                    uninherited: true,
                },
                TimingPoint {
                    beat_length: -100.0,
                    offset: 4000.0,
                    uninherited: false,
                },
                TimingPoint {
                    beat_length: 250.0,
                    offset: 9000.0,
                    uninherited: true,
                },
            ],
            ..Default::default()
        };
        let mut writer = ByteWriter::new();
        fixture.encode(&mut writer, true, false);
        let bytes = writer.into_bytes();

        let mut reader = ByteReader::new(&bytes);
        let record = ChartRecord::decode(&mut reader, &header_for(20150203), 0).unwrap();
        assert_eq!(record.timing_points.len(), 3);
        assert_eq!(reader.remaining(), 0);
        // File order preserved exactly
        assert_eq!(record.timing_points[1].offset, 4000.0);
        assert!(!record.timing_points[1].uninherited);
    }

    #[test]
    fn test_legacy_version_reads_narrow_stats_and_extra_short() {
        let fixture = RecordFixture {
            approach_rate: 7.0,
            ..Default::default()
        };
        let mut writer = ByteWriter::new();
        fixture.encode(&mut writer, false, true);
        let bytes = writer.into_bytes();

        let mut reader = ByteReader::new(&bytes);
        let record = ChartRecord::decode(&mut reader, &header_for(20140101), 0).unwrap();
        assert_eq!(record.approach_rate, 7.0);
        assert_eq!(record.circle_size, 4.0);
        assert_eq!(record.hp_drain, 6.0);
        assert_eq!(record.overall_difficulty, 8.0);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_modern_record_rejected_under_legacy_header() {
        // A wide-stats record decoded with the narrow layout desynchronizes
        // and must fail, not yield garbage silently.
        let mut writer = ByteWriter::new();
        RecordFixture::default().encode(&mut writer, true, false);
        let bytes = writer.into_bytes();

        let mut reader = ByteReader::new(&bytes);
        assert!(ChartRecord::decode(&mut reader, &header_for(20140101), 0).is_err());
    }
}

mod failure_modes {
    use super::*;

    #[test]
    fn test_truncated_file_reports_record_and_field() {
        let data = encode_db(
            20150203,
            "p",
            &[RecordFixture::default(), RecordFixture::default()],
        );
        // Chop the file in the middle of the second record
        let err = Catalog::decode(&data[..data.len() - 40]).unwrap_err();

        match err {
            Error::Record { index, source, .. } => {
                assert_eq!(index, 1);
                fn innermost(err: &Error) -> &Error {
                    match err {
                        Error::Record { source, .. } | Error::Header { source, .. } => {
                            innermost(source.as_ref())
                        }
                        other => other,
                    }
                }
                assert!(matches!(innermost(source.as_ref()), Error::TruncatedInput { .. }));
            }
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_string_indicator_aborts_decode() {
        let mut data = encode_db(20150203, "p", &[RecordFixture::default()]);
        // Header is 4 + 4 + 1 + 8 + 3 + 4 = 24 bytes with player "p";
        // the next byte is the artist string indicator.
        data[24] = 0x05;

        let err = Catalog::decode(&data).unwrap_err();
        match err {
            Error::Record {
                index: 0,
                field: "artist",
                source,
            } => {
                assert!(matches!(
                    *source,
                    Error::MalformedString {
                        indicator: 0x05,
                        ..
                    }
                ));
            }
            other => panic!("expected artist string error, got {other:?}"),
        }
    }

    #[test]
    fn test_no_partial_catalog_on_failure() {
        let data = encode_db(20150203, "p", &[RecordFixture::default()]);
        assert!(Catalog::decode(&data[..30]).is_err());
    }
}

mod interpretation {
    use super::*;

    #[test]
    fn test_mode_and_status_bytes() {
        let data = encode_db(
            20150203,
            "p",
            &[
                RecordFixture {
                    chart_id: 1,
                    mode: 1,
                    status: 5,
                    ..Default::default()
                },
                RecordFixture {
                    chart_id: 2,
                    chart_set_id: 2,
                    mode: 99,
                    status: 200,
                    ..Default::default()
                },
            ],
        );
        let catalog = Catalog::decode(&data).unwrap();

        let known = catalog.get(1).unwrap();
        assert_eq!(known.game_mode(), Some(GameMode::Taiko));
        assert_eq!(known.ranked_status(), RankedStatus::Approved);

        // Unrecognized bytes stay raw and interpret conservatively
        let unknown = catalog.get(2).unwrap();
        assert_eq!(unknown.mode, 99);
        assert_eq!(unknown.game_mode(), None);
        assert_eq!(unknown.ranked_status(), RankedStatus::Unknown);
    }
}
