//! Read-only tabular dataset abstraction.
//!
//! Both engines are generic over [`TabularData`]: column enumeration, a closed
//! numeric/categorical tag per column, value iteration and missing-value
//! detection. The polars [`DataFrame`](polars::prelude::DataFrame)
//! implementation lives in [`frame`]; other sources only need to provide the
//! same capability set.
//!
//! Implementations take `&self` everywhere. Analyses running concurrently
//! against the same dataset only ever read from it.

mod frame;

pub use frame::load_csv;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed semantic type tag used to select per-column tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Integer or floating point values.
    Numeric,
    /// Text, boolean, categorical and everything else compared by frequency.
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Type label reported by the quality type check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeLabel {
    Integer,
    Float,
    Boolean,
    Text,
    Datetime,
    Other,
}

impl TypeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeLabel::Integer => "integer",
            TypeLabel::Float => "float",
            TypeLabel::Boolean => "boolean",
            TypeLabel::Text => "text",
            TypeLabel::Datetime => "datetime",
            TypeLabel::Other => "other",
        }
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities the analysis engines need from a dataset.
///
/// Every column has the same length (`row_count`). Values returned by
/// [`numeric_values`](TabularData::numeric_values) and
/// [`categorical_values`](TabularData::categorical_values) exclude missing
/// entries and keep row order.
pub trait TabularData {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Column names in column order.
    fn column_names(&self) -> Result<Vec<String>>;

    /// Numeric or categorical tag of a column.
    fn column_kind(&self, column: &str) -> Result<ColumnKind>;

    /// Declared type label of a column.
    fn type_label(&self, column: &str) -> Result<TypeLabel>;

    /// Number of missing entries in a column.
    fn missing_count(&self, column: &str) -> Result<usize>;

    /// Non-missing values of a numeric column.
    ///
    /// Fails with [`AnalysisError::TypeMismatch`](crate::AnalysisError::TypeMismatch)
    /// for categorical columns.
    fn numeric_values(&self, column: &str) -> Result<Vec<f64>>;

    /// Non-missing values of any column, rendered as text.
    fn categorical_values(&self, column: &str) -> Result<Vec<String>>;

    /// Number of distinct full rows.
    fn distinct_row_count(&self) -> Result<usize>;

    /// Whether the dataset has a column with this name.
    fn has_column(&self, column: &str) -> bool {
        self.column_names()
            .map(|names| names.iter().any(|name| name == column))
            .unwrap_or(false)
    }

    /// Names of all columns with the given kind, in column order.
    fn columns_of_kind(&self, kind: ColumnKind) -> Result<Vec<String>> {
        let mut columns = Vec::new();
        for name in self.column_names()? {
            if self.column_kind(&name)? == kind {
                columns.push(name);
            }
        }
        Ok(columns)
    }
}
