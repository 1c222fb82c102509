use chrono::{Duration, TimeZone, Utc};
use dashtable::telemetry::{TableEvent, TableEventListener};
use dashtable::{Dataset, DatasetConfig, TableError};
use std::sync::Arc;

// Forwards dataset events to stderr
#[derive(Debug)]
struct StderrListener;

impl TableEventListener for StderrListener {
    fn on_event(&self, event: TableEvent) {
        eprintln!("event: {:?}", event);
    }
}

fn main() -> Result<(), TableError> {
    let config = DatasetConfig {
        event_listener: Arc::new(StderrListener),
        ..DatasetConfig::default()
    };
    let mut dataset = Dataset::with_config(config);

    // Simulate per-host request counts arriving newest first
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    for day in (0..7).rev() {
        let ts = start + Duration::days(day);
        dataset.add(ts, "web-1", (day * 10) as f64);
        if day % 2 == 0 {
            dataset.add(ts, "web-2", 5.0);
        }
    }

    dataset.add_column("total", |values| values["web-1"] + values["web-2"]);

    println!("Columns: {:?}", dataset.get_columns());
    println!("Rows: {}", dataset.size());

    let mut running = dataset.copy();
    running.filter_by_range(Some(start + Duration::days(2)), None);
    running.accumulate();

    println!("Daily:\n{}", dataset.generate_table_response().to_json()?);
    println!("Running totals from day 2:\n{}", running.generate_table_response().to_json()?);

    Ok(())
}
