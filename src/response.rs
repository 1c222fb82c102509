//! Responses handed to the serialization boundary: table responses and time-series responses.
//!
//! A [`TableResponse`] renders as
//! `{"type":"table","columns":[{"text":..,"type":..},..],"rows":[[..],..]}`. Every column must
//! hold the same number of rows; serializing a ragged table fails instead of padding or
//! truncating.

use crate::error::TableError;
use crate::telemetry::{TableEvent, TableEventListener};
use crate::types::{from_unix_millis, to_unix_millis, Timestamp, Value};
use serde::de::{Deserializer, Error as _};
use serde::ser::{Error as _, SerializeSeq, SerializeStruct, SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};

/// The values of one column. All values in a column share one type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Time(Vec<Timestamp>),
    String(Vec<String>),
    Number(Vec<Value>),
}

impl ColumnData {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Time(v) => v.len(),
            ColumnData::String(v) => v.len(),
            ColumnData::Number(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The type tag used in the JSON `columns` header.
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Time(_) => "time",
            ColumnData::String(_) => "string",
            ColumnData::Number(_) => "number",
        }
    }

    /// Returns the value at `row`, if present.
    pub fn cell(&self, row: usize) -> Option<Cell> {
        match self {
            ColumnData::Time(v) => v.get(row).copied().map(Cell::Time),
            ColumnData::String(v) => v.get(row).cloned().map(Cell::String),
            ColumnData::Number(v) => v.get(row).copied().map(Cell::Number),
        }
    }

    /// Keeps only the rows whose `keep` flag is set.
    pub(crate) fn select(&self, keep: &[bool]) -> ColumnData {
        fn pick<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| v.clone())
                .collect()
        }
        match self {
            ColumnData::Time(v) => ColumnData::Time(pick(v, keep)),
            ColumnData::String(v) => ColumnData::String(pick(v, keep)),
            ColumnData::Number(v) => ColumnData::Number(pick(v, keep)),
        }
    }
}

/// A single table value, typed by its column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Time(Timestamp),
    String(String),
    Number(#[serde(serialize_with = "serialize_number")] Value),
}

/// Largest magnitude below which every whole `f64` is an exact integer (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes whole numbers without a fractional part (`42`, not `42.0`).
fn serialize_number<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

struct Number(Value);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_number(&self.0, serializer)
    }
}

/// A column of a table: a header and its values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub text: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(text: impl Into<String>, data: ColumnData) -> Self {
        Self {
            text: text.into(),
            data,
        }
    }
}

/// Response to a table query: an ordered list of columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableResponse {
    pub columns: Vec<Column>,
}

impl TableResponse {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Checks that all columns have the same length and returns that row count.
    /// A response without columns has zero rows.
    pub fn validate(&self) -> Result<usize, TableError> {
        let Some(first) = self.columns.first() else {
            return Ok(0);
        };
        let expected = first.data.len();
        for column in &self.columns[1..] {
            let actual = column.data.len();
            if actual != expected {
                return Err(TableError::ShapeMismatch {
                    column: column.text.clone(),
                    expected,
                    actual,
                });
            }
        }
        Ok(expected)
    }

    /// Same as [`TableResponse::validate`], reporting a mismatch to `listener`.
    pub fn validate_with(&self, listener: &dyn TableEventListener) -> Result<usize, TableError> {
        self.validate().map_err(|err| {
            if let TableError::ShapeMismatch {
                column,
                expected,
                actual,
            } = &err
            {
                listener.on_event(TableEvent::ShapeMismatch {
                    column: column.clone(),
                    expected: *expected,
                    actual: *actual,
                });
            }
            err
        })
    }

    /// Renders the response as JSON.
    pub fn to_json(&self) -> Result<String, TableError> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Serialize)]
struct ColumnHeader<'a> {
    text: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

struct Rows<'a> {
    columns: &'a [Column],
    count: usize,
}

struct RowRef<'a> {
    columns: &'a [Column],
    row: usize,
}

impl Serialize for TableResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let count = self.validate().map_err(S::Error::custom)?;

        let headers: Vec<ColumnHeader<'_>> = self
            .columns
            .iter()
            .map(|c| ColumnHeader {
                text: &c.text,
                kind: c.data.type_name(),
            })
            .collect();

        let mut state = serializer.serialize_struct("TableResponse", 3)?;
        state.serialize_field("type", "table")?;
        state.serialize_field("columns", &headers)?;
        state.serialize_field(
            "rows",
            &Rows {
                columns: &self.columns,
                count,
            },
        )?;
        state.end()
    }
}

impl Serialize for Rows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.count))?;
        for row in 0..self.count {
            seq.serialize_element(&RowRef {
                columns: self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.columns.len()))?;
        for column in self.columns {
            match &column.data {
                ColumnData::Time(v) => seq.serialize_element(&v[self.row])?,
                ColumnData::String(v) => seq.serialize_element(&v[self.row])?,
                ColumnData::Number(v) => seq.serialize_element(&Number(v[self.row]))?,
            }
        }
        seq.end()
    }
}

/// One point of a time series. Serializes as `[value, unix_millis]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPoint {
    pub timestamp: Timestamp,
    pub value: i64,
}

impl Serialize for DataPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.value)?;
        tuple.serialize_element(&to_unix_millis(&self.timestamp))?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for DataPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (value, millis) = <(i64, i64)>::deserialize(deserializer)?;
        let timestamp = from_unix_millis(millis)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {millis} ms")))?;
        Ok(DataPoint { timestamp, value })
    }
}

/// Response to a time-series query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesResponse {
    pub target: String,
    #[serde(rename = "datapoints", default)]
    pub data_points: Vec<DataPoint>,
}

/// Any response a query target can produce. A query answer is a list of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    TimeSeries(TimeSeriesResponse),
    Table(TableResponse),
}

impl From<TimeSeriesResponse> for Response {
    fn from(r: TimeSeriesResponse) -> Self {
        Response::TimeSeries(r)
    }
}

impl From<TableResponse> for Response {
    fn from(r: TableResponse) -> Self {
        Response::Table(r)
    }
}
