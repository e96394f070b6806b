//! [`TabularData`] implementation for polars `DataFrame`.

use super::{ColumnKind, TabularData, TypeLabel};
use crate::error::{AnalysisError, Result, ResultExt};
use crate::utils::{column_kind, is_float_dtype, type_label};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Load a CSV file with a header row.
///
/// The schema is inferred from the whole file so that a late float value
/// does not turn an integer column into a parse error.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse {}", path.display()))?;

    debug!("Loaded {}: {:?}", path.display(), df.shape());
    Ok(df)
}

fn series<'a>(df: &'a DataFrame, column: &str) -> Result<&'a Series> {
    df.column(column)
        .map(|col| col.as_materialized_series())
        .map_err(|_| AnalysisError::ColumnNotFound(column.to_string()))
}

impl TabularData for DataFrame {
    fn row_count(&self) -> usize {
        self.height()
    }

    fn column_names(&self) -> Result<Vec<String>> {
        Ok(self
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect())
    }

    fn column_kind(&self, column: &str) -> Result<ColumnKind> {
        Ok(column_kind(series(self, column)?.dtype()))
    }

    fn type_label(&self, column: &str) -> Result<TypeLabel> {
        Ok(type_label(series(self, column)?.dtype()))
    }

    fn missing_count(&self, column: &str) -> Result<usize> {
        let series = series(self, column)?;
        if !is_float_dtype(series.dtype()) {
            return Ok(series.null_count());
        }

        // NaN counts as missing alongside null
        let floats = series.cast(&DataType::Float64)?;
        Ok(floats
            .f64()?
            .into_iter()
            .filter(|v| v.is_none_or(f64::is_nan))
            .count())
    }

    fn numeric_values(&self, column: &str) -> Result<Vec<f64>> {
        let series = series(self, column)?;
        let kind = column_kind(series.dtype());
        if kind != ColumnKind::Numeric {
            return Err(AnalysisError::TypeMismatch {
                column: column.to_string(),
                expected: ColumnKind::Numeric.to_string(),
                actual: kind.to_string(),
            });
        }

        let floats = series
            .cast(&DataType::Float64)
            .context(format!("Failed to read '{}' as numbers", column))?;
        Ok(floats
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect())
    }

    fn categorical_values(&self, column: &str) -> Result<Vec<String>> {
        let series = series(self, column)?;
        let strings = series
            .cast(&DataType::String)
            .context(format!("Failed to read '{}' as text", column))?;

        let is_float = is_float_dtype(series.dtype());
        Ok(strings
            .str()?
            .into_iter()
            .flatten()
            .filter(|v| !(is_float && v.eq_ignore_ascii_case("nan")))
            .map(str::to_string)
            .collect())
    }

    fn distinct_row_count(&self) -> Result<usize> {
        if self.width() == 0 {
            return Ok(0);
        }
        let unique = self.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?;
        Ok(unique.height())
    }
}
