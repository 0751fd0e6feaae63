//! Age derivation and numeric binning.

use std::collections::BTreeSet;

use polars::prelude::*;
use pulse_common::{column_f64, column_i64, format_numeric, has_column};
use pulse_model::constants::is_sentinel_f64;
use pulse_model::{AgeOptions, NumericBins, Wave, is_sentinel};
use tracing::{debug, info};

use crate::error::{Result, TransformError};

/// Replaces the birth-year column with the respondent's age at the end of
/// the collection window, clamped up to `options.floor`.
///
/// Sentinel birth years pass through unchanged so that the bucketizer can
/// still recognise them.
pub fn compute_ages(mut df: DataFrame, wave: &Wave, options: &AgeOptions) -> Result<DataFrame> {
    if !has_column(&df, &options.column) {
        debug!(column = %options.column, "no birth year column, ages not computed");
        return Ok(df);
    }
    info!(week = wave.week, end_date = %wave.end_date, "calculating ages");
    let year = i64::from(wave.year());
    let ages: Vec<Option<i64>> = column_i64(&df, &options.column)?
        .into_iter()
        .map(|birth| {
            birth.map(|birth| {
                if is_sentinel(birth) {
                    birth
                } else {
                    (year - birth).max(options.floor)
                }
            })
        })
        .collect();
    df.with_column(Column::new(options.column.as_str().into(), ages))?;
    Ok(df)
}

/// Replaces every binned numeric column with its bin codes.
///
/// Bins are half-open `[lower, upper)`. Sentinels keep their code; any other
/// value outside every bin fails the wave.
pub fn bucketize_numeric(mut df: DataFrame, bins: &NumericBins) -> Result<DataFrame> {
    let variables: Vec<String> = bins.variables().map(str::to_string).collect();
    for variable in variables {
        if !has_column(&df, &variable) {
            continue;
        }
        info!(column = %variable, "bucketizing numeric column");

        let mut unmapped = BTreeSet::new();
        let mut codes = Vec::with_capacity(df.height());
        for value in column_f64(&df, &variable)? {
            let code = match value {
                None => None,
                Some(v) if is_sentinel_f64(v) => Some(v as i64),
                Some(v) => match bins.locate(&variable, v) {
                    Some(bin) => Some(bin.code),
                    None => {
                        unmapped.insert(format_numeric(v));
                        None
                    }
                },
            };
            codes.push(code);
        }

        if !unmapped.is_empty() {
            return Err(TransformError::Binning {
                variable,
                values: unmapped.into_iter().collect(),
            });
        }
        df.with_column(Column::new(variable.as_str().into(), codes))?;
    }
    Ok(df)
}
