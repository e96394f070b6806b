//! Data Quality and Drift Analysis Library
//!
//! Statistical analysis of tabular datasets built on Polars.
//!
//! # Overview
//!
//! - **Quality checks**: missing values, duplicate rows, IQR outliers, column
//!   types and a describe-style statistics summary for one dataset
//! - **Drift detection**: per-column two-sample tests between a reference and a
//!   target dataset (Kolmogorov-Smirnov plus PSI for numeric columns,
//!   chi-square for categorical ones) aggregated into one verdict
//! - **Reports**: timestamped report records written as JSON
//!
//! Both engines work against the [`TabularData`] trait, implemented for polars
//! `DataFrame`. They never return errors: failures are logged and carried in
//! the result as an `error` note.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_analysis::{DataQualityChecker, DriftDetector, load_csv};
//!
//! let reference = load_csv("data/train.csv")?;
//! let target = load_csv("data/live.csv")?;
//!
//! let quality = DataQualityChecker::default().check_all(&reference);
//! println!("Duplicates: {}", quality.duplicates.duplicate_count);
//!
//! let report = DriftDetector::with_threshold(0.05).detect_drift(&reference, &target);
//! println!("Drift detected: {}", report.drift_detected);
//! for column in report.columns_with_drift() {
//!     println!("  drifted: {}", column);
//! }
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use lex_analysis::{AnalysisConfig, DriftDetector};
//!
//! let config = AnalysisConfig::builder()
//!     .drift_threshold(0.01)
//!     .psi_bins(20)
//!     .build()?;
//! let detector = DriftDetector::new(config);
//! ```

pub mod config;
pub mod dataset;
pub mod drift;
pub mod error;
pub mod quality;
pub mod reporting;
pub mod stats;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use dataset::{ColumnKind, TabularData, TypeLabel, load_csv};
pub use drift::DriftDetector;
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use quality::DataQualityChecker;
pub use reporting::{DatasetSummary, DriftReportRecord, QualityReportRecord, ReportGenerator};
pub use types::{
    ColumnDriftResult, DriftOutcome, DriftReport, DriftTest, DriftTestResults, DriftTestSummary,
    DuplicateReport, MissingValueReport, OutlierInfo, QualityAnalysis, StatisticsSummary,
};
