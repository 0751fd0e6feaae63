//! Column coalescing and derived dimensions.

use std::collections::BTreeSet;

use polars::prelude::*;
use pulse_common::{column_i64, has_column};
use pulse_model::constants::TOPLINE;
use pulse_model::{RaceOptions, SurveyMetadata, is_sentinel};
use tracing::{debug, warn};

use crate::error::Result;

/// Renames raw columns to their canonical names.
///
/// A rename whose target already exists in the wave is skipped; the skipped
/// raw names are returned so they can be reported as drift.
pub fn coalesce_variables(
    mut df: DataFrame,
    metadata: &SurveyMetadata,
) -> Result<(DataFrame, BTreeSet<String>)> {
    let mut skipped = BTreeSet::new();
    let mut renamed = 0usize;
    for (raw, canonical) in metadata.rename_map() {
        if !has_column(&df, raw) {
            continue;
        }
        if has_column(&df, canonical) {
            warn!(raw, canonical, "canonical column already present, rename skipped");
            skipped.insert(raw.to_string());
            continue;
        }
        df.rename(raw, canonical.into())?;
        renamed += 1;
    }
    debug!(renamed, skipped = skipped.len(), "coalesced variables");
    Ok((df, skipped))
}

/// Adds the constant `TOPLINE` dimension (every respondent in group 1).
pub fn add_topline(mut df: DataFrame) -> Result<DataFrame> {
    let height = df.height();
    df.with_column(Column::new(TOPLINE.into(), vec![1i64; height]))?;
    Ok(df)
}

/// Folds the hispanic-origin flag into the race dimension.
///
/// Respondents whose hispanic flag is a non-sentinel code other than
/// `not_hispanic_code` get `hispanic_race_code`. Sentinel or missing flags
/// leave the race value untouched.
pub fn coalesce_races(mut df: DataFrame, options: &RaceOptions) -> Result<DataFrame> {
    if !options.enabled {
        return Ok(df);
    }
    if !has_column(&df, &options.race_column) || !has_column(&df, &options.hispanic_column) {
        warn!(
            race = %options.race_column,
            hispanic = %options.hispanic_column,
            "race columns not present, skipping race coalescing"
        );
        return Ok(df);
    }

    let race = column_i64(&df, &options.race_column)?;
    let hispanic = column_i64(&df, &options.hispanic_column)?;
    let folded: Vec<Option<i64>> = race
        .into_iter()
        .zip(hispanic)
        .map(|(race, flag)| match flag {
            Some(code) if !is_sentinel(code) && code != options.not_hispanic_code => {
                Some(options.hispanic_race_code)
            }
            _ => race,
        })
        .collect();

    df.with_column(Column::new(options.race_column.as_str().into(), folded))?;
    Ok(df)
}
