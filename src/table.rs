//! Rectangular table of typed columns, for handlers that already have their data in columns.
//!
//! Where [`crate::Dataset`] builds a table from scattered (timestamp, column, value) triples,
//! a [`Table`] starts out complete: every column is given up front and all columns have the
//! same length. It supports time-range filtering, running sums, column removal and
//! conversion to a [`TableResponse`].

use crate::dataset::DEFAULT_UNKNOWN_COLUMN_LABEL;
use crate::error::TableError;
use crate::request::Args;
use crate::response::{Cell, Column, ColumnData, TableResponse};
use crate::types::{Timestamp, Value};
use rayon::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table from the given columns, in order.
    ///
    /// # Errors
    /// Returns [`TableError::ShapeMismatch`] if the columns differ in length.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        TableResponse::new(columns).validate_into_table()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the values of the first time column that has any rows. Empty if there is none.
    pub fn get_timestamps(&self) -> Vec<Timestamp> {
        match self.first_time_column() {
            Some(ColumnData::Time(values)) => values.clone(),
            _ => Vec::new(),
        }
    }

    fn first_time_column(&self) -> Option<&ColumnData> {
        self.columns
            .iter()
            .map(|c| &c.data)
            .find(|data| matches!(data, ColumnData::Time(v) if !v.is_empty()))
    }

    /// Returns the column names, in table order.
    pub fn get_columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.text.clone()).collect()
    }

    fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.text == name)
    }

    /// Returns the values of the named column, whatever their type. `None` if there is no
    /// such column.
    pub fn get_values(&self, column: &str) -> Option<Vec<Cell>> {
        let column = self.column(column)?;
        Some((0..column.data.len()).filter_map(|row| column.data.cell(row)).collect())
    }

    /// Returns the values of a time column.
    ///
    /// `Ok(None)` if the column does not exist; an error if it is not a time column.
    pub fn get_time_values(&self, column: &str) -> Result<Option<Vec<Timestamp>>, TableError> {
        match self.column(column) {
            None => Ok(None),
            Some(Column {
                data: ColumnData::Time(values),
                ..
            }) => Ok(Some(values.clone())),
            Some(other) => Err(type_mismatch(other, "time")),
        }
    }

    /// Returns the values of a number column.
    ///
    /// `Ok(None)` if the column does not exist; an error if it is not a number column.
    pub fn get_float_values(&self, column: &str) -> Result<Option<Vec<Value>>, TableError> {
        match self.column(column) {
            None => Ok(None),
            Some(Column {
                data: ColumnData::Number(values),
                ..
            }) => Ok(Some(values.clone())),
            Some(other) => Err(type_mismatch(other, "number")),
        }
    }

    /// Returns the values of a string column.
    ///
    /// `Ok(None)` if the column does not exist; an error if it is not a string column.
    pub fn get_string_values(&self, column: &str) -> Result<Option<Vec<String>>, TableError> {
        match self.column(column) {
            None => Ok(None),
            Some(Column {
                data: ColumnData::String(values),
                ..
            }) => Ok(Some(values.clone())),
            Some(other) => Err(type_mismatch(other, "string")),
        }
    }

    /// Returns a table without the listed columns. Unknown names are ignored.
    pub fn delete_column(&self, names: &[&str]) -> Table {
        let drop: HashSet<&str> = names.iter().copied().collect();
        Table {
            columns: self
                .columns
                .iter()
                .filter(|c| !drop.contains(c.text.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Returns the rows whose timestamp lies within `args.range` (bounds inclusive).
    ///
    /// Only the first time column is considered.
    ///
    /// # Errors
    /// Returns [`TableError::MissingTimeColumn`] if the table has rows but no time column.
    pub fn filter(&self, args: &Args) -> Result<Table, TableError> {
        if self.is_empty() {
            return Ok(self.clone());
        }
        let Some(ColumnData::Time(timestamps)) = self.first_time_column() else {
            return Err(TableError::MissingTimeColumn);
        };

        let keep: Vec<bool> = timestamps
            .iter()
            .map(|ts| args.range.contains(ts))
            .collect();

        // Columns are independent; select rows from each in parallel.
        let columns = self
            .columns
            .par_iter()
            .map(|c| Column::new(c.text.clone(), c.data.select(&keep)))
            .collect();
        Ok(Table { columns })
    }

    /// Returns a table where every number column holds its running total over the rows.
    /// Other columns are copied as-is.
    pub fn accumulate(&self) -> Table {
        let columns = self
            .columns
            .par_iter()
            .map(|c| {
                let data = match &c.data {
                    ColumnData::Number(values) => ColumnData::Number(
                        values
                            .iter()
                            .scan(0.0, |total, v| {
                                *total += v;
                                Some(*total)
                            })
                            .collect(),
                    ),
                    other => other.clone(),
                };
                Column::new(c.text.clone(), data)
            })
            .collect();
        Table { columns }
    }

    /// Converts the table into a table response. An empty column name is rendered as
    /// `"(unknown)"`.
    pub fn create_table_response(&self) -> TableResponse {
        TableResponse::new(
            self.columns
                .iter()
                .map(|c| {
                    let text = if c.text.is_empty() {
                        DEFAULT_UNKNOWN_COLUMN_LABEL.to_string()
                    } else {
                        c.text.clone()
                    };
                    Column::new(text, c.data.clone())
                })
                .collect(),
        )
    }
}

impl TableResponse {
    fn validate_into_table(self) -> Result<Table, TableError> {
        self.validate()?;
        Ok(Table {
            columns: self.columns,
        })
    }
}

impl TryFrom<TableResponse> for Table {
    type Error = TableError;

    fn try_from(response: TableResponse) -> Result<Self, Self::Error> {
        response.validate_into_table()
    }
}

fn type_mismatch(column: &Column, expected: &'static str) -> TableError {
    TableError::ColumnTypeMismatch {
        column: column.text.clone(),
        expected,
        actual: column.data.type_name(),
    }
}
