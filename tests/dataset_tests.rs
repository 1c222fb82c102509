use chrono::{Duration, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use dashtable::telemetry::RecordingEventListener;
use dashtable::*;

const SEED: u64 = 0x_4441_5348_5441_424C;

fn jan(day: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2022, 1, day, 0, 0, 0).unwrap()
}

// Helper to build a dataset from triples, in the order given
fn build(triples: &[(Timestamp, String, Value)]) -> Dataset {
    let mut d = Dataset::new();
    for (ts, column, value) in triples {
        d.add(*ts, column, *value);
    }
    d
}

fn random_triples(rng: &mut ChaCha8Rng, count: usize) -> Vec<(Timestamp, String, Value)> {
    (0..count)
        .map(|_| {
            let ts = jan(1) + Duration::hours(rng.random_range(0..48));
            let column = format!("c{}", rng.random_range(0..6));
            // small integers keep sums exact regardless of order
            let value = rng.random_range(0..100) as f64;
            (ts, column, value)
        })
        .collect()
}

#[test]
fn test_basic_dataset() {
    let mut d = Dataset::new();
    for day in 1..5 {
        d.add(jan(5 - day), "A", (5 - day) as f64);
    }

    d.add_column("B", |values| values["A"] * 2.0);

    assert_eq!(d.size(), 4);
    assert_eq!(d.get_columns(), vec!["A", "B"]);
    assert_eq!(d.get_timestamps(), vec![jan(1), jan(2), jan(3), jan(4)]);
    assert_eq!(d.get_values("B"), Some(vec![2.0, 4.0, 6.0, 8.0]));
}

#[test]
fn test_add_column_aligns_with_source_column() {
    // rows inserted so that A reads [3, 2, 1, 0] chronologically
    let mut d = Dataset::new();
    for (day, value) in [(3, 1.0), (1, 3.0), (4, 0.0), (2, 2.0)] {
        d.add(jan(day), "A", value);
    }
    d.add_column("C", |values| values["A"] * 2.0);

    assert_eq!(d.get_values("A"), Some(vec![3.0, 2.0, 1.0, 0.0]));
    assert_eq!(d.get_values("C"), Some(vec![6.0, 4.0, 2.0, 0.0]));
}

#[test]
fn test_order_independence() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);

    for _ in 0..20 {
        let triples = random_triples(&mut rng, 200);
        let reference = build(&triples);

        let mut shuffled = triples.clone();
        shuffled.shuffle(&mut rng);
        let other = build(&shuffled);

        assert_eq!(reference.size(), other.size());
        assert_eq!(reference.get_timestamps(), other.get_timestamps());
        assert_eq!(reference.get_columns(), other.get_columns());
        for column in reference.get_columns() {
            assert_eq!(
                reference.get_values(&column),
                other.get_values(&column),
                "column {}",
                column
            );
        }
    }
}

#[test]
fn test_backfill_is_zero_until_set() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED ^ 1);
    let triples = random_triples(&mut rng, 100);
    let d = build(&triples);

    let timestamps = d.get_timestamps();
    for column in d.get_columns() {
        let values = d.get_values(&column).unwrap();
        assert_eq!(values.len(), timestamps.len());

        for (ts, value) in timestamps.iter().zip(&values) {
            let expected: f64 = triples
                .iter()
                .filter(|(t, c, _)| t == ts && *c == column)
                .map(|(_, _, v)| v)
                .sum();
            assert_eq!(*value, expected);
        }
    }
}

#[test]
fn test_sorted_reads() {
    let mut d = Dataset::new();
    for (day, column) in [(4, "d"), (2, "b"), (3, "a"), (1, "c")] {
        d.add(jan(day), column, 1.0);
    }
    assert_eq!(d.get_timestamps(), vec![jan(1), jan(2), jan(3), jan(4)]);
    assert_eq!(d.get_columns(), vec!["a", "b", "c", "d"]);
    assert_eq!(d.get_values("a"), Some(vec![0.0, 0.0, 1.0, 0.0]));
}

#[test]
fn test_same_instant_is_one_row() {
    let mut d = Dataset::new();
    let ts = jan(1);
    let offset = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
    d.add(ts, "A", 1.0);
    d.add(ts.with_timezone(&offset).with_timezone(&Utc), "A", 1.0);
    d.add(ts + Duration::milliseconds(1), "A", 1.0);

    assert_eq!(d.size(), 2);
    assert_eq!(d.get_values("A"), Some(vec![2.0, 1.0]));
}

#[test]
fn test_filter_by_range() {
    let mut d = Dataset::new();
    for day in 1..32 {
        d.add(jan(day), "A", day as f64);
    }
    assert_eq!(d.size(), 31);

    d.filter_by_range(None, Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()));
    assert_eq!(d.size(), 31);

    d.filter_by_range(None, Some(jan(30)));
    assert_eq!(d.size(), 30);

    d.filter_by_range(Some(jan(2)), None);
    assert_eq!(d.size(), 29);

    d.filter_by_range(Some(jan(8)), Some(jan(14)));
    assert_eq!(d.size(), 7);
    assert_eq!(
        d.get_values("A"),
        Some(vec![8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0])
    );

    d.filter_by_range(None, None);
    assert_eq!(d.size(), 7);
}

#[test]
fn test_filter_with_request_range() {
    let args: Args = serde_json::from_str(
        r#"{"range": {"from": "2022-01-03T00:00:00Z", "to": "2022-01-05T00:00:00Z"}}"#,
    )
    .unwrap();

    let mut d = Dataset::new();
    for day in (1..=10).rev() {
        d.add(jan(day), "A", day as f64);
    }
    d.filter(&args.range);
    assert_eq!(d.get_timestamps(), vec![jan(3), jan(4), jan(5)]);
}

#[test]
fn test_filter_then_add_keeps_growing() {
    let mut d = Dataset::new();
    for day in 1..=5 {
        d.add(jan(day), "A", 1.0);
    }
    d.filter_by_range(Some(jan(3)), None);
    d.add(jan(1), "A", 5.0);
    d.add(jan(4), "B", 2.0);

    assert_eq!(d.get_timestamps(), vec![jan(1), jan(3), jan(4), jan(5)]);
    assert_eq!(d.get_values("A"), Some(vec![5.0, 1.0, 1.0, 1.0]));
    assert_eq!(d.get_values("B"), Some(vec![0.0, 0.0, 2.0, 0.0]));
}

#[test]
fn test_accumulate() {
    let mut d = Dataset::new();
    for day in 1..32 {
        d.add(jan(day), "A", 1.0);
    }
    d.accumulate();

    let values = d.get_values("A").unwrap();
    for (index, value) in values.iter().enumerate() {
        assert_eq!(*value, (index + 1) as f64, "row {}", index);
    }
}

#[test]
fn test_accumulate_out_of_order_rows() {
    let mut d = Dataset::new();
    for day in [3, 1, 4, 2] {
        d.add(jan(day), "A", 1.0);
        d.add(jan(day), "B", day as f64);
    }
    d.accumulate();
    assert_eq!(d.get_values("A"), Some(vec![1.0, 2.0, 3.0, 4.0]));
    assert_eq!(d.get_values("B"), Some(vec![1.0, 3.0, 6.0, 10.0]));
}

#[test]
fn test_copy_independence() {
    let mut d = Dataset::new();
    for day in 1..5 {
        d.add(jan(day), "A", 1.0);
    }

    let clone = d.copy();
    d.accumulate();

    assert_eq!(d.get_values("A"), Some(vec![1.0, 2.0, 3.0, 4.0]));
    assert_eq!(clone.get_values("A"), Some(vec![1.0, 1.0, 1.0, 1.0]));
}

#[test]
fn test_copy_of_unsorted_dataset() {
    let mut d = Dataset::new();
    for day in [4, 2, 3, 1] {
        d.add(jan(day), "A", day as f64);
    }
    let mut clone = d.clone();
    clone.filter_by_range(Some(jan(2)), Some(jan(3)));

    assert_eq!(clone.get_values("A"), Some(vec![2.0, 3.0]));
    assert_eq!(d.get_values("A"), Some(vec![1.0, 2.0, 3.0, 4.0]));
}

#[test]
fn test_generate_table_response() {
    let mut d = Dataset::new();
    for day in 1..5 {
        d.add(jan(5 - day), "", (5 - day) as f64);
    }

    let response = d.generate_table_response();
    assert_eq!(
        response,
        TableResponse::new(vec![
            Column::new(
                "timestamp",
                ColumnData::Time(vec![jan(1), jan(2), jan(3), jan(4)])
            ),
            Column::new("(unknown)", ColumnData::Number(vec![1.0, 2.0, 3.0, 4.0])),
        ])
    );
}

#[test]
fn test_table_response_shape() {
    let mut d = Dataset::new();
    for day in [2, 4, 1, 3] {
        d.add(jan(day), "A", 1.0);
    }
    let response = d.generate_table_response();
    assert_eq!(response.columns.len(), 2);
    assert_eq!(response.columns[0].text, "timestamp");
    assert_eq!(response.columns[1].text, "A");
    assert!(response.columns.iter().all(|c| c.data.len() == 4));
    assert_eq!(response.validate(), Ok(4));
}

#[test]
fn test_table_response_json() {
    let mut d = Dataset::new();
    d.add(jan(2), "B", 2.5);
    d.add(jan(1), "A", 1.0);

    assert_eq!(
        d.generate_table_response().to_json().unwrap(),
        concat!(
            r#"{"type":"table","columns":[{"text":"timestamp","type":"time"},"#,
            r#"{"text":"A","type":"number"},{"text":"B","type":"number"}],"#,
            r#""rows":[["2022-01-01T00:00:00Z",1,0],["2022-01-02T00:00:00Z",0,2.5]]}"#
        )
    );
}

#[test]
fn test_empty_dataset() {
    let d = Dataset::new();
    assert!(d.is_empty());
    assert_eq!(d.size(), 0);
    assert!(d.get_timestamps().is_empty());
    assert!(d.get_columns().is_empty());
    assert_eq!(d.get_values("A"), None);

    let response = d.generate_table_response();
    assert_eq!(response.columns.len(), 1);
    assert_eq!(response.validate(), Ok(0));
}

#[test]
fn test_event_listener_sees_transforms() {
    let listener = Arc::new(RecordingEventListener::new());
    let config = DatasetConfig {
        event_listener: listener.clone(),
        ..DatasetConfig::default()
    };
    let mut d = Dataset::with_config(config);
    for day in 1..=3 {
        d.add(jan(day), "A", 1.0);
    }
    d.filter_by_range(Some(jan(2)), None);

    let events = listener.events();
    assert!(events.contains(&TableEvent::RowsFiltered { removed: 1, kept: 2 }));
}
