//! Request-side arguments the dataset and table filters consume.
//!
//! These mirror the `range` / `adhocFilters` / `maxDataPoints` fields a dashboard sends with
//! a query. Parsing the rest of the request envelope is the HTTP layer's job.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Inclusive time range. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Timestamp>,
}

impl Range {
    pub fn new(from: Option<Timestamp>, to: Option<Timestamp>) -> Self {
        Self { from, to }
    }

    /// Returns true if `ts` is not before `from` and not after `to`. Boundaries are kept.
    #[inline]
    pub fn contains(&self, ts: &Timestamp) -> bool {
        if let Some(from) = &self.from {
            if ts < from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if ts > to {
                return false;
            }
        }
        true
    }

    /// True when neither side is bounded, i.e. every timestamp is contained.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Ad hoc filter as returned by the tag-keys / tag-values endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdHocFilter {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub condition: String,
}

/// Arguments accompanying a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Args {
    #[serde(default)]
    pub range: Range,
    #[serde(default, rename = "adhocFilters", alias = "AdHocFilters")]
    pub adhoc_filters: Vec<AdHocFilter>,
    #[serde(default, rename = "maxDataPoints")]
    pub max_data_points: u64,
}

impl Args {
    /// Arguments that only carry a time range.
    pub fn with_range(from: Option<Timestamp>, to: Option<Timestamp>) -> Self {
        Self {
            range: Range::new(from, to),
            ..Self::default()
        }
    }
}
