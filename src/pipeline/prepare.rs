//! Deal preparation: outcome normalization, won/lost filtering and null resolution
//!
//! Raw deal tables come in with free-text outcomes and holes in both numeric
//! and categorical columns. This module turns them into a fixed six-column
//! feature frame plus a binary target, leaving the input frame untouched.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;

use super::error::DriverError;

/// Free-text outcome column
pub const OUTCOME_COLUMN: &str = "outcome";
/// Deal value column (mandatory)
pub const DEAL_AMOUNT: &str = "deal_amount";
/// Sales cycle length in days (optional, derivable from dates)
pub const SALES_CYCLE_DAYS: &str = "sales_cycle_days";
/// Deal creation date, used only when `sales_cycle_days` is absent
pub const CREATED_DATE: &str = "created_date";
/// Deal close date, used only when `sales_cycle_days` is absent
pub const CLOSED_DATE: &str = "closed_date";

/// Numeric features in the order they lead the encoded vector
pub const NUMERIC_FEATURES: [&str; 2] = [DEAL_AMOUNT, SALES_CYCLE_DAYS];

/// Categorical features in the order they are one-hot encoded
pub const CATEGORICAL_FEATURES: [&str; 4] = ["industry", "region", "product_type", "lead_source"];

/// Column order of the prepared feature frame
pub const FEATURE_COLUMNS: [&str; 6] = [
    DEAL_AMOUNT,
    "industry",
    "region",
    "product_type",
    "lead_source",
    SALES_CYCLE_DAYS,
];

/// Replacement for missing categorical values
pub const UNKNOWN_CATEGORY: &str = "Unknown";

const WON: &str = "won";
const LOST: &str = "lost";

const SECONDS_PER_DAY: i64 = 86_400;

/// Counts and fill values recorded while preparing a table
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreparationStats {
    /// Rows in the raw input
    pub rows_read: usize,
    /// Rows whose outcome normalized to won or lost
    pub rows_kept: usize,
    /// Rows dropped for any other outcome (including null)
    pub rows_dropped: usize,
    /// Retained rows with outcome "won"
    pub won: usize,
    /// Retained rows with outcome "lost"
    pub lost: usize,
    /// Median used for `deal_amount` fills (None when nothing was filled)
    pub deal_amount_median: Option<f64>,
    /// Number of `deal_amount` nulls replaced
    pub deal_amount_filled: usize,
    /// Median used for `sales_cycle_days` fills (None when nothing was filled)
    pub sales_cycle_days_median: Option<f64>,
    /// Number of `sales_cycle_days` nulls replaced
    pub sales_cycle_days_filled: usize,
    /// Whether `sales_cycle_days` was derived from the date columns
    pub cycle_days_derived: bool,
    /// Per categorical column, how many nulls became "Unknown"
    pub unknown_filled: Vec<(String, usize)>,
}

impl PreparationStats {
    /// Fraction of retained deals that were won (0 when nothing was kept)
    pub fn win_rate(&self) -> f64 {
        if self.rows_kept == 0 {
            return 0.0;
        }
        self.won as f64 / self.rows_kept as f64
    }
}

/// Won/lost deals with all features resolved, ready for training
#[derive(Debug, Clone)]
pub struct PreparedDeals {
    /// Exactly the columns of [`FEATURE_COLUMNS`], in that order
    pub features: DataFrame,
    /// 1 for won, 0 for lost; one entry per feature row
    pub target: Vec<u8>,
    /// Row counts and fill values recorded along the way
    pub stats: PreparationStats,
}

impl PreparedDeals {
    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Fraction of retained deals that were won
    pub fn win_rate(&self) -> f64 {
        self.stats.win_rate()
    }

    /// Rebuild a raw-shaped frame (features plus an `outcome` column).
    ///
    /// Preparing the returned frame again yields the same features and target.
    pub fn to_raw_frame(&self) -> Result<DataFrame, DriverError> {
        let outcomes: Vec<&str> = self
            .target
            .iter()
            .map(|&t| if t == 1 { WON } else { LOST })
            .collect();

        let mut df = self.features.clone();
        df.with_column(Column::new(OUTCOME_COLUMN.into(), outcomes))?;
        Ok(df)
    }
}

/// Normalize a raw outcome to a binary target.
///
/// Returns `Some(1)` for won, `Some(0)` for lost and `None` for anything else.
pub fn normalize_outcome(raw: Option<&str>) -> Option<u8> {
    let normalized = raw?.trim().to_lowercase();
    match normalized.as_str() {
        WON => Some(1),
        LOST => Some(0),
        _ => None,
    }
}

/// Clean and filter a raw deal table into features and target.
///
/// # Arguments
/// * `raw` - Raw deal table; must contain `outcome`, `deal_amount` and the
///   four categorical columns, plus either `sales_cycle_days` or both
///   `created_date` and `closed_date`
///
/// # Returns
/// Prepared deals holding only won/lost rows with no remaining nulls
pub fn prepare(raw: &DataFrame) -> Result<PreparedDeals, DriverError> {
    require_column(raw, OUTCOME_COLUMN)?;
    require_column(raw, DEAL_AMOUNT)?;
    for col in CATEGORICAL_FEATURES {
        require_column(raw, col)?;
    }

    let cycle_days_derived = !has_column(raw, SALES_CYCLE_DAYS);
    if cycle_days_derived {
        require_column(raw, CREATED_DATE)?;
        require_column(raw, CLOSED_DATE)?;
    }

    // Row indices that survive the won/lost filter, with their targets
    let outcomes = column_as_strings(raw, OUTCOME_COLUMN)?;
    let (kept, target): (Vec<usize>, Vec<u8>) = outcomes
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| normalize_outcome(value.as_deref()).map(|t| (idx, t)))
        .unzip();

    let mut stats = PreparationStats {
        rows_read: raw.height(),
        rows_kept: kept.len(),
        rows_dropped: raw.height() - kept.len(),
        won: target.iter().filter(|&&t| t == 1).count(),
        lost: target.iter().filter(|&&t| t == 0).count(),
        cycle_days_derived,
        ..Default::default()
    };

    let amounts = column_rows_as_f64(raw, DEAL_AMOUNT, &kept)?;
    let (amounts, amount_fill) = fill_with_median(amounts, DEAL_AMOUNT)?;
    stats.deal_amount_median = amount_fill.map(|(median, _)| median);
    stats.deal_amount_filled = amount_fill.map(|(_, n)| n).unwrap_or(0);

    let cycle_days = if cycle_days_derived {
        let created = select_rows(&column_as_strings(raw, CREATED_DATE)?, &kept);
        let closed = select_rows(&column_as_strings(raw, CLOSED_DATE)?, &kept);
        derive_cycle_days(&created, &closed)?
    } else {
        column_rows_as_f64(raw, SALES_CYCLE_DAYS, &kept)?
    };
    let (cycle_days, cycle_fill) = fill_with_median(cycle_days, SALES_CYCLE_DAYS)?;
    stats.sales_cycle_days_median = cycle_fill.map(|(median, _)| median);
    stats.sales_cycle_days_filled = cycle_fill.map(|(_, n)| n).unwrap_or(0);

    let mut columns: Vec<Column> = Vec::with_capacity(FEATURE_COLUMNS.len());
    columns.push(Column::new(DEAL_AMOUNT.into(), amounts));

    for col in CATEGORICAL_FEATURES {
        let values = select_rows(&column_as_strings(raw, col)?, &kept);
        let filled = values.iter().filter(|v| v.is_none()).count();
        let resolved: Vec<String> = values
            .into_iter()
            .map(|v| v.unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()))
            .collect();
        stats.unknown_filled.push((col.to_string(), filled));
        columns.push(Column::new(col.into(), resolved));
    }

    columns.push(Column::new(SALES_CYCLE_DAYS.into(), cycle_days));

    let features = DataFrame::new(columns)?;

    Ok(PreparedDeals {
        features,
        target,
        stats,
    })
}

/// Median of a slice, averaging the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Replace nulls with the median of the observed values.
///
/// Returns the resolved values and, when any fill happened, the median used
/// together with the number of replaced entries.
fn fill_with_median(
    values: Vec<Option<f64>>,
    column: &str,
) -> Result<(Vec<f64>, Option<(f64, usize)>), DriverError> {
    let missing = values.iter().filter(|v| v.is_none()).count();
    if missing == 0 {
        return Ok((values.into_iter().flatten().collect(), None));
    }

    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    let fill = median(&observed).ok_or_else(|| DriverError::NoObservedValues {
        column: column.to_string(),
    })?;

    let resolved = values.into_iter().map(|v| v.unwrap_or(fill)).collect();
    Ok((resolved, Some((fill, missing))))
}

/// Whole days between creation and close, floored like a timedelta's day count
fn derive_cycle_days(
    created: &[Option<String>],
    closed: &[Option<String>],
) -> Result<Vec<Option<f64>>, DriverError> {
    created
        .iter()
        .zip(closed.iter())
        .map(|(start, end)| {
            let start = start.as_deref().map(|s| parse_date(CREATED_DATE, s)).transpose()?;
            let end = end.as_deref().map(|s| parse_date(CLOSED_DATE, s)).transpose()?;
            Ok(match (start.flatten(), end.flatten()) {
                (Some(start), Some(end)) => {
                    let seconds = (end - start).num_seconds();
                    Some(seconds.div_euclid(SECONDS_PER_DAY) as f64)
                }
                _ => None,
            })
        })
        .collect()
}

/// Parse a date or datetime string. Blank strings count as missing.
fn parse_date(column: &str, value: &str) -> Result<Option<NaiveDateTime>, DriverError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date.and_hms_opt(0, 0, 0));
        }
    }

    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(Some(datetime));
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(datetime.naive_utc()));
    }

    Err(DriverError::DateParse {
        column: column.to_string(),
        value: value.to_string(),
    })
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

fn require_column(df: &DataFrame, name: &str) -> Result<(), DriverError> {
    if has_column(df, name) {
        Ok(())
    } else {
        Err(DriverError::missing_column(name))
    }
}

fn select_rows<T: Clone>(values: &[T], rows: &[usize]) -> Vec<T> {
    rows.iter().map(|&idx| values[idx].clone()).collect()
}

/// Read a column as nullable floats; non-blank values that are not numbers fail
pub(crate) fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DriverError> {
    let rows: Vec<usize> = (0..df.height()).collect();
    column_rows_as_f64(df, name, &rows)
}

/// Read the selected rows of a column as nullable floats.
///
/// Only the selected rows are checked for values the cast could not convert.
fn column_rows_as_f64(
    df: &DataFrame,
    name: &str,
    rows: &[usize],
) -> Result<Vec<Option<f64>>, DriverError> {
    let col = df
        .column(name)
        .map_err(|_| DriverError::missing_column(name))?;
    let cast = col.cast(&DataType::Float64)?;
    let all: Vec<Option<f64>> = cast.f64()?.into_iter().collect();
    let values = select_rows(&all, rows);

    if cast.null_count() > col.null_count() {
        let raw = select_rows(&column_as_strings(df, name)?, rows);
        let invalid = raw
            .into_iter()
            .zip(values.iter())
            .find_map(|(raw, value)| match (raw, value) {
                (Some(raw), None) if !raw.trim().is_empty() => Some(raw),
                _ => None,
            });
        if let Some(value) = invalid {
            return Err(DriverError::InvalidNumeric {
                column: name.to_string(),
                value,
            });
        }
    }

    Ok(values)
}

/// Read a column as nullable strings, casting non-string types
pub(crate) fn column_as_strings(
    df: &DataFrame,
    name: &str,
) -> Result<Vec<Option<String>>, DriverError> {
    let col = df
        .column(name)
        .map_err(|_| DriverError::missing_column(name))?;
    let cast = col.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_outcome_variants() {
        for raw in ["won", "Won", " WON "] {
            assert_eq!(normalize_outcome(Some(raw)), Some(1), "{:?}", raw);
        }
        for raw in ["lost", "LOST", "  Lost"] {
            assert_eq!(normalize_outcome(Some(raw)), Some(0), "{:?}", raw);
        }
        for raw in ["Open", "Pending", "wonn", ""] {
            assert_eq!(normalize_outcome(Some(raw)), None, "{:?}", raw);
        }
        assert_eq!(normalize_outcome(None), None);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[100.0, 200.0, 150.0]), Some(150.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_fill_with_median_reports_fill() {
        let (values, fill) =
            fill_with_median(vec![Some(1.0), None, Some(3.0)], DEAL_AMOUNT).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(fill, Some((2.0, 1)));
    }

    #[test]
    fn test_fill_with_median_no_nulls() {
        let (values, fill) = fill_with_median(vec![Some(5.0), Some(7.0)], DEAL_AMOUNT).unwrap();
        assert_eq!(values, vec![5.0, 7.0]);
        assert!(fill.is_none());
    }

    #[test]
    fn test_fill_with_median_all_null() {
        let result = fill_with_median(vec![None, None], SALES_CYCLE_DAYS);
        assert!(matches!(
            result,
            Err(DriverError::NoObservedValues { ref column }) if column == SALES_CYCLE_DAYS
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date(CREATED_DATE, "2024-03-05").unwrap(), Some(expected));
        assert_eq!(parse_date(CREATED_DATE, "03/05/2024").unwrap(), Some(expected));
        assert_eq!(
            parse_date(CREATED_DATE, "2024-03-05 00:00:00").unwrap(),
            Some(expected)
        );
        assert_eq!(parse_date(CREATED_DATE, "  ").unwrap(), None);
    }

    #[test]
    fn test_parse_date_malformed() {
        let err = parse_date(CLOSED_DATE, "not-a-date").unwrap_err();
        assert!(matches!(err, DriverError::DateParse { ref value, .. } if value == "not-a-date"));
    }

    #[test]
    fn test_derive_cycle_days_floors_partial_days() {
        let created = vec![
            Some("2024-01-01".to_string()),
            Some("2024-01-01 12:00:00".to_string()),
            None,
        ];
        let closed = vec![
            Some("2024-01-11".to_string()),
            Some("2024-01-03".to_string()),
            Some("2024-01-05".to_string()),
        ];
        let days = derive_cycle_days(&created, &closed).unwrap();
        assert_eq!(days, vec![Some(10.0), Some(1.0), None]);
    }

    #[test]
    fn test_select_rows() {
        let values = vec!["a", "b", "c", "d"];
        assert_eq!(select_rows(&values, &[0, 2]), vec!["a", "c"]);
    }
}
