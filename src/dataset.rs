//! Sparse, time-indexed dataset: a row x column matrix addressed by (timestamp, column name).
//!
//! Values can be added for any timestamp and any column, in any order. Missing cells are
//! zero. Reads present rows in chronological order and columns in name order:
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use dashtable::Dataset;
//!
//! let mut d = Dataset::new();
//! let t1 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
//! let t2 = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
//! d.add(t2, "B", 2.0); // one row: [B=2]
//! d.add(t1, "A", 1.0); // two rows, A back-filled into the first
//!
//! d.add_column("C", |values| values["A"] + values["B"]);
//!
//! assert_eq!(d.get_timestamps(), vec![t1, t2]);
//! assert_eq!(d.get_columns(), vec!["A", "B", "C"]);
//! assert_eq!(d.get_values("C"), Some(vec![1.0, 2.0]));
//! ```

use crate::indexer::Indexer;
use crate::request::Range;
use crate::response::{Column, ColumnData, TableResponse};
use crate::telemetry::{noop_event_listener, TableEvent, TableEventListener};
use crate::types::{Timestamp, Value};

use std::collections::HashMap;
use std::sync::Arc;

/// Default label of the time column in a generated table response.
pub const DEFAULT_TIME_COLUMN_LABEL: &str = "timestamp";
/// Label used in table responses for a column whose name is empty.
pub const DEFAULT_UNKNOWN_COLUMN_LABEL: &str = "(unknown)";

/// Configuration options for a Dataset
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Header of the first (time) column in a generated table response
    pub time_column_label: String,
    /// Header substituted for the empty column name in a generated table response
    pub unknown_column_label: String,
    /// Structured event hook for observability (no-op by default).
    pub event_listener: Arc<dyn TableEventListener>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            time_column_label: DEFAULT_TIME_COLUMN_LABEL.to_string(),
            unknown_column_label: DEFAULT_UNKNOWN_COLUMN_LABEL.to_string(),
            event_listener: noop_event_listener(),
        }
    }
}

/// Accumulates values keyed by (timestamp, column) into a matrix that is rectangular at all
/// times.
///
/// `rows[i]` belongs to the timestamp the row indexer assigned position `i`, and every row
/// holds exactly one cell per registered column. A dataset is owned by one caller for a
/// build-then-read cycle; it does no locking of its own.
#[derive(Debug)]
pub struct Dataset {
    rows: Vec<Vec<Value>>,
    timestamps: Indexer<Timestamp>,
    columns: Indexer<String>,
    config: DatasetConfig,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::with_config(DatasetConfig::default())
    }
}

impl Dataset {
    /// Creates an empty dataset with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dataset with the provided configuration.
    pub fn with_config(config: DatasetConfig) -> Self {
        Dataset {
            rows: Vec::new(),
            timestamps: Indexer::new(),
            columns: Indexer::new(),
            config,
        }
    }

    /// Returns the active configuration.
    pub fn get_config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Adds `value` to the cell at (`timestamp`, `column`).
    ///
    /// Cells accumulate: adding to a cell that already holds a value sums the two.
    /// A new column is back-filled with zero in every existing row; a new timestamp gets a
    /// zero-filled row sized to the current column count.
    pub fn add(&mut self, timestamp: Timestamp, column: &str, value: Value) {
        // The column must exist before the row is created so a new row is sized to include it.
        let col = self.ensure_column_exists(column);

        let (row, added) = self.timestamps.add(timestamp);
        if added {
            self.rows.push(vec![0.0; self.columns.count()]);
        }
        self.rows[row][col] += value;
    }

    /// Registers `column` if needed and returns its position.
    fn ensure_column_exists(&mut self, column: &str) -> usize {
        if let Some(index) = self.columns.get_index(column) {
            return index;
        }

        let (index, _) = self.columns.add(column.to_string());
        for row in self.rows.iter_mut() {
            row.push(0.0);
        }
        self.config.event_listener.on_event(TableEvent::ColumnAdded {
            column: column.to_string(),
            rows_backfilled: self.rows.len(),
        });
        index
    }

    /// Number of rows (distinct timestamps).
    pub fn size(&self) -> usize {
        self.timestamps.count()
    }

    /// Returns true if no value was ever added.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds a column computed from each row's existing values.
    ///
    /// `processor` is called once per row with a map of column name -> that row's value and
    /// its result becomes the new column's cell. If `column` already exists, its cells are
    /// replaced with the computed values instead.
    ///
    /// # Example
    /// ```
    /// # use chrono::{TimeZone, Utc};
    /// # use dashtable::Dataset;
    /// let mut d = Dataset::new();
    /// d.add(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(), "A", 3.0);
    /// d.add_column("double", |values| values["A"] * 2.0);
    /// assert_eq!(d.get_values("double"), Some(vec![6.0]));
    /// ```
    pub fn add_column<F>(&mut self, column: &str, mut processor: F)
    where
        F: FnMut(&HashMap<String, Value>) -> Value,
    {
        let names = self.columns.sorted().to_vec();
        let positions: Vec<usize> = names
            .iter()
            .filter_map(|name| self.columns.get_index(name))
            .collect();

        let computed: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let values: HashMap<String, Value> = names
                    .iter()
                    .zip(&positions)
                    .map(|(name, &pos)| (name.clone(), row[pos]))
                    .collect();
                processor(&values)
            })
            .collect();

        match self.columns.get_index(column) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(computed) {
                    row[index] = value;
                }
            }
            None => {
                for (row, value) in self.rows.iter_mut().zip(computed) {
                    row.push(value);
                }
                self.columns.add(column.to_string());
                self.config.event_listener.on_event(TableEvent::ColumnAdded {
                    column: column.to_string(),
                    rows_backfilled: self.rows.len(),
                });
            }
        }
    }

    /// Returns the timestamps in chronological order.
    pub fn get_timestamps(&self) -> Vec<Timestamp> {
        self.timestamps.sorted().to_vec()
    }

    /// Returns the column names in lexicographic order.
    pub fn get_columns(&self) -> Vec<String> {
        self.columns.sorted().to_vec()
    }

    /// Returns the values of `column`, one per timestamp, in chronological order.
    /// `None` if the column does not exist.
    pub fn get_values(&self, column: &str) -> Option<Vec<Value>> {
        let col = self.columns.get_index(column)?;
        Some(self.column_values(&self.row_order(self.timestamps.sorted()), col))
    }

    /// Storage positions of `timestamps`, in the given order.
    fn row_order(&self, timestamps: &[Timestamp]) -> Vec<usize> {
        timestamps
            .iter()
            .filter_map(|ts| self.timestamps.get_index(ts))
            .collect()
    }

    fn column_values(&self, order: &[usize], col: usize) -> Vec<Value> {
        order.iter().map(|&row| self.rows[row][col]).collect()
    }

    /// Removes every row whose timestamp lies before `from` or after `to`.
    ///
    /// A `None` bound is unbounded on that side, and boundary timestamps are kept. When no
    /// row falls outside the range the dataset is left untouched.
    pub fn filter_by_range(&mut self, from: Option<Timestamp>, to: Option<Timestamp>) {
        let range = Range::new(from, to);
        if range.is_unbounded() {
            return;
        }

        let keep: Vec<Timestamp> = self
            .timestamps
            .list()
            .iter()
            .filter(|ts| range.contains(ts))
            .copied()
            .collect();

        let removed = self.timestamps.count() - keep.len();
        if removed == 0 {
            return;
        }

        // Rebuild in chronological order; the new indexer starts out sorted.
        let mut old_rows: Vec<Option<Vec<Value>>> =
            std::mem::take(&mut self.rows).into_iter().map(Some).collect();
        let mut rows = Vec::with_capacity(keep.len());
        let mut timestamps = Indexer::new();
        for ts in keep {
            if let Some(row) = self
                .timestamps
                .get_index(&ts)
                .and_then(|i| old_rows[i].take())
            {
                rows.push(row);
                timestamps.add(ts);
            }
        }
        self.rows = rows;
        self.timestamps = timestamps;

        self.config.event_listener.on_event(TableEvent::RowsFiltered {
            removed,
            kept: self.rows.len(),
        });
    }

    /// Same as [`Dataset::filter_by_range`], taking the bounds from a request range.
    pub fn filter(&mut self, range: &Range) {
        self.filter_by_range(range.from, range.to);
    }

    /// Replaces every cell with the running total of its column up to and including that
    /// row, walking rows chronologically. E.g. 1, 1, 1, 1 becomes 1, 2, 3, 4.
    pub fn accumulate(&mut self) {
        let mut totals = vec![0.0; self.columns.count()];

        let order: Vec<usize> = {
            let sorted = self.timestamps.list().to_vec();
            sorted
                .iter()
                .filter_map(|ts| self.timestamps.get_index(ts))
                .collect()
        };
        for row in order {
            let cells = &mut self.rows[row];
            for (total, cell) in totals.iter_mut().zip(cells.iter_mut()) {
                *total += *cell;
                *cell = *total;
            }
        }

        self.config.event_listener.on_event(TableEvent::Accumulated {
            rows: self.rows.len(),
            columns: totals.len(),
        });
    }

    /// Returns an independent deep copy. Mutating either dataset never affects the other.
    pub fn copy(&self) -> Dataset {
        Dataset {
            rows: self.rows.iter().map(|row| row.to_vec()).collect(),
            timestamps: self.timestamps.copy(),
            columns: self.columns.copy(),
            config: self.config.clone(),
        }
    }

    /// Builds a table response: the time column first, then one number column per dataset
    /// column in name order. An empty column name is rendered under the configured
    /// placeholder label.
    pub fn generate_table_response(&self) -> TableResponse {
        let timestamps = self.timestamps.sorted();
        let order = self.row_order(timestamps);

        let mut columns = Vec::with_capacity(self.columns.count() + 1);
        columns.push(Column::new(
            self.config.time_column_label.clone(),
            ColumnData::Time(timestamps.to_vec()),
        ));

        for name in self.columns.sorted().iter() {
            let Some(col) = self.columns.get_index(name) else {
                continue;
            };
            let text = if name.is_empty() {
                self.config.unknown_column_label.clone()
            } else {
                name.clone()
            };
            columns.push(Column::new(
                text,
                ColumnData::Number(self.column_values(&order, col)),
            ));
        }

        self.config.event_listener.on_event(TableEvent::TableRendered {
            columns: columns.len(),
            rows: order.len(),
        });
        TableResponse::new(columns)
    }
}

impl Clone for Dataset {
    fn clone(&self) -> Self {
        self.copy()
    }
}
