//! Report records and JSON report files.
//!
//! The engines never attach identifiers or timestamps; the records here wrap
//! their results with an id, the dataset identifiers and a UTC report date.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_analysis::reporting::{QualityReportRecord, ReportGenerator};
//!
//! let analysis = DataQualityChecker::default().check_all(&df);
//! let record = QualityReportRecord::new("train", analysis);
//!
//! let generator = ReportGenerator::new(PathBuf::from("outputs"));
//! generator.write_quality_report(&record, "train")?;
//! ```

mod generator;

pub use generator::{
    DatasetSummary, DriftReportRecord, QualityReportRecord, ReportGenerator, report_base_name,
};
