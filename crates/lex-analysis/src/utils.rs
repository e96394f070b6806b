//! Shared utilities for the analysis engines.
//!
//! This module contains the dtype classification helpers used by the dataset
//! abstraction and the small numeric helpers shared by both engines.

use crate::dataset::{ColumnKind, TypeLabel};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || is_float_dtype(dtype)
}

/// Check if a DataType is a date/time type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time | DataType::Duration(_)
    )
}

/// Classify a DataType into the closed numeric/categorical tag.
///
/// Booleans are categorical: they are compared by frequency, not by shape.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Map a DataType to the label reported by the type check.
pub fn type_label(dtype: &DataType) -> TypeLabel {
    if is_integer_dtype(dtype) {
        TypeLabel::Integer
    } else if is_float_dtype(dtype) {
        TypeLabel::Float
    } else if matches!(dtype, DataType::Boolean) {
        TypeLabel::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        TypeLabel::Text
    } else if is_datetime_dtype(dtype) {
        TypeLabel::Datetime
    } else {
        TypeLabel::Other
    }
}

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Round a value to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `count / total * 100`, rounded to 2 decimals; 0 when `total` is 0.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(count as f64 / total as f64 * 100.0, 2)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::UInt8));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_column_kind() {
        assert_eq!(column_kind(&DataType::Int32), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::Float32), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::String), ColumnKind::Categorical);
        assert_eq!(column_kind(&DataType::Boolean), ColumnKind::Categorical);
        assert_eq!(column_kind(&DataType::Date), ColumnKind::Categorical);
    }

    #[test]
    fn test_type_label() {
        assert_eq!(type_label(&DataType::Int64), TypeLabel::Integer);
        assert_eq!(type_label(&DataType::Float64), TypeLabel::Float);
        assert_eq!(type_label(&DataType::Boolean), TypeLabel::Boolean);
        assert_eq!(type_label(&DataType::String), TypeLabel::Text);
        assert_eq!(type_label(&DataType::Date), TypeLabel::Datetime);
        assert_eq!(
            type_label(&DataType::Datetime(TimeUnit::Milliseconds, None)),
            TypeLabel::Datetime
        );
        assert_eq!(type_label(&DataType::Null), TypeLabel::Other);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.33333, 2), 33.33);
        assert_eq!(round_to(66.666, 2), 66.67);
        assert_eq!(round_to(1.0, 2), 1.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(3, 3), 100.0);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
    }
}
