//! Configuration types for the analysis engines.
//!
//! The only value that changes verdicts in practice is the drift significance
//! threshold; the remaining knobs fix the numeric conventions (PSI binning,
//! IQR rule, summary sizes) so they are visible and testable in one place.

use serde::{Deserialize, Serialize};

/// Default significance threshold for drift tests.
pub const DEFAULT_DRIFT_THRESHOLD: f64 = 0.05;

/// Default smoothing constant added to PSI bin fractions and to empty
/// reference categories in the chi-square test.
pub const DEFAULT_SMOOTHING_EPSILON: f64 = 0.0001;

/// Largest accepted `exact_ks_limit`. The exact KS p-value walks an
/// `(n + 1) x (m + 1)` lattice, so the limit bounds that work.
pub const MAX_EXACT_KS_LIMIT: usize = 1_000_000;

/// Configuration shared by [`DataQualityChecker`](crate::DataQualityChecker)
/// and [`DriftDetector`](crate::DriftDetector).
///
/// # Example
///
/// ```rust,ignore
/// use lex_analysis::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .drift_threshold(0.01)
///     .psi_bins(20)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Significance level for per-column tests and threshold for the
    /// overall drift score.
    /// Default: 0.05
    pub drift_threshold: f64,

    /// Number of bins used for the Population Stability Index.
    /// Default: 10
    pub psi_bins: usize,

    /// Smoothing constant for PSI fractions and zero chi-square expectations.
    /// Default: 0.0001
    pub smoothing_epsilon: f64,

    /// Multiplier applied to the IQR when deriving outlier bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// How many categorical columns (in column order) get a value-count summary.
    /// Default: 5
    pub categorical_summary_columns: usize,

    /// How many of the most frequent values are listed per categorical column.
    /// Default: 10
    pub top_value_count: usize,

    /// Largest `n * m` for which the KS p-value is computed exactly; bigger
    /// samples use the asymptotic distribution.
    /// Default: 10_000
    pub exact_ks_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            drift_threshold: DEFAULT_DRIFT_THRESHOLD,
            psi_bins: 10,
            smoothing_epsilon: DEFAULT_SMOOTHING_EPSILON,
            iqr_multiplier: 1.5,
            categorical_summary_columns: 5,
            top_value_count: 10,
            exact_ks_limit: 10_000,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.drift_threshold > 0.0 && self.drift_threshold <= 1.0) {
            return Err(ConfigValidationError::InvalidThreshold(self.drift_threshold));
        }

        if self.psi_bins == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "psi_bins".to_string(),
                value: self.psi_bins,
            });
        }

        if self.top_value_count == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "top_value_count".to_string(),
                value: self.top_value_count,
            });
        }

        if self.exact_ks_limit > MAX_EXACT_KS_LIMIT {
            return Err(ConfigValidationError::LimitTooLarge {
                field: "exact_ks_limit".to_string(),
                value: self.exact_ks_limit,
                max: MAX_EXACT_KS_LIMIT,
            });
        }

        if !(self.smoothing_epsilon > 0.0 && self.smoothing_epsilon.is_finite()) {
            return Err(ConfigValidationError::InvalidValue {
                field: "smoothing_epsilon".to_string(),
                value: self.smoothing_epsilon,
            });
        }

        if !(self.iqr_multiplier >= 0.0 && self.iqr_multiplier.is_finite()) {
            return Err(ConfigValidationError::InvalidValue {
                field: "iqr_multiplier".to_string(),
                value: self.iqr_multiplier,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid drift threshold: {0} (must be in (0.0, 1.0])")]
    InvalidThreshold(f64),

    #[error("Invalid value for '{field}': {value} (must be at least 1)")]
    InvalidCount { field: String, value: usize },

    #[error("Invalid value for '{field}': {value} (must be at most {max})")]
    LimitTooLarge {
        field: String,
        value: usize,
        max: usize,
    },

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: f64 },
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    drift_threshold: Option<f64>,
    psi_bins: Option<usize>,
    smoothing_epsilon: Option<f64>,
    iqr_multiplier: Option<f64>,
    categorical_summary_columns: Option<usize>,
    top_value_count: Option<usize>,
    exact_ks_limit: Option<usize>,
}

impl AnalysisConfigBuilder {
    /// Set the drift significance threshold.
    ///
    /// # Arguments
    /// * `threshold` - Value in (0.0, 1.0], e.g. 0.05
    pub fn drift_threshold(mut self, threshold: f64) -> Self {
        self.drift_threshold = Some(threshold);
        self
    }

    /// Set the number of PSI bins.
    pub fn psi_bins(mut self, bins: usize) -> Self {
        self.psi_bins = Some(bins);
        self
    }

    /// Set the smoothing constant.
    pub fn smoothing_epsilon(mut self, epsilon: f64) -> Self {
        self.smoothing_epsilon = Some(epsilon);
        self
    }

    /// Set the IQR multiplier used for outlier bounds.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set how many categorical columns are summarised.
    pub fn categorical_summary_columns(mut self, columns: usize) -> Self {
        self.categorical_summary_columns = Some(columns);
        self
    }

    /// Set how many top values are listed per categorical column.
    pub fn top_value_count(mut self, count: usize) -> Self {
        self.top_value_count = Some(count);
        self
    }

    /// Set the sample-size limit for the exact KS p-value.
    pub fn exact_ks_limit(mut self, limit: usize) -> Self {
        self.exact_ks_limit = Some(limit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            drift_threshold: self.drift_threshold.unwrap_or(defaults.drift_threshold),
            psi_bins: self.psi_bins.unwrap_or(defaults.psi_bins),
            smoothing_epsilon: self.smoothing_epsilon.unwrap_or(defaults.smoothing_epsilon),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            categorical_summary_columns: self
                .categorical_summary_columns
                .unwrap_or(defaults.categorical_summary_columns),
            top_value_count: self.top_value_count.unwrap_or(defaults.top_value_count),
            exact_ks_limit: self.exact_ks_limit.unwrap_or(defaults.exact_ks_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
