//! Distribution drift detection between two datasets.
//!
//! See [`DriftDetector`] for the per-column test selection and how column
//! results are aggregated into a [`DriftReport`](crate::types::DriftReport).

mod detector;

pub use detector::DriftDetector;
