//! Single-dataset data quality checks.
//!
//! Missing values, duplicate rows, IQR outliers, type labels and a
//! describe-style statistical summary.

mod checker;

pub use checker::DataQualityChecker;
