//! Per-cell weighted sums, standard errors, bounds and shares.

use polars::prelude::*;
use pulse_model::WeightType;
use pulse_model::constants::{Q_VAL, Q_VAR, RESPONDENT_ID, SENTINEL_CODES, XTAB_VAL, XTAB_VAR};
use tracing::{debug, info};

use crate::error::{AggregateError, Result};
use crate::replicate::{confidence_bounds, jackknife_standard_error, share};
use crate::weights::weight_table;

const CELL_KEYS: [&str; 4] = [XTAB_VAR, XTAB_VAL, Q_VAR, Q_VAL];

/// Shares are taken within (dimension value, question).
const SHARE_GROUP: [&str; 3] = [XTAB_VAR, XTAB_VAL, Q_VAR];

/// Rows with a reportable value for `dimension`: present and not a sentinel.
fn reportable(dimension: &str) -> Expr {
    let value = col(dimension).cast(DataType::Int64);
    SENTINEL_CODES
        .iter()
        .fold(value.clone().is_not_null(), |keep, &code| {
            keep.and(value.clone().neq(lit(code)))
        })
}

/// Aggregates one weight type across every dimension.
///
/// `long` is the recoded long table, `weights` the output of
/// [`weight_table`] for `weight`. Each dimension is grouped independently
/// and the per-dimension results are stacked under `xtab_var`/`xtab_val`.
/// Respondents with a sentinel in one dimension still count toward the
/// others.
pub fn aggregate_weight(
    long: &DataFrame,
    weights: &DataFrame,
    weight: WeightType,
    dimensions: &[String],
    critical_value: f64,
) -> Result<DataFrame> {
    if dimensions.is_empty() {
        return Err(AggregateError::NoDimensions);
    }
    let weight_columns = weight.all_columns();
    let joined = long.clone().lazy().join(
        weights.clone().lazy(),
        [col(RESPONDENT_ID)],
        [col(RESPONDENT_ID)],
        JoinArgs::new(JoinType::Inner),
    );

    let sums: Vec<Expr> = weight_columns
        .iter()
        .map(|c| col(c.as_str()).cast(DataType::Float64).sum())
        .collect();
    let per_dimension: Vec<LazyFrame> = dimensions
        .iter()
        .map(|dimension| {
            info!(weight = weight.primary_column(), xtab_var = %dimension, "aggregating weights");
            joined
                .clone()
                .filter(reportable(dimension))
                .group_by([
                    col(dimension.as_str()).cast(DataType::Int64).alias(XTAB_VAL),
                    col(Q_VAR),
                    col(Q_VAL),
                ])
                .agg(sums.clone())
                .with_column(lit(dimension.as_str()).alias(XTAB_VAR))
        })
        .collect();
    let summed = concat(per_dimension, UnionArgs::default())?;

    let cells = estimate_cells(summed, weight, critical_value).collect()?;
    debug!(cells = cells.height(), weight = weight.primary_column(), "estimated cells");
    Ok(cells.sort(CELL_KEYS, SortMultipleOptions::default())?)
}

/// Turns summed weights into the seven published estimate columns.
fn estimate_cells(summed: LazyFrame, weight: WeightType, critical_value: f64) -> LazyFrame {
    let [value, se, lower, upper, share_name, lower_share, upper_share] = weight.output_columns();
    let primary = weight.primary_column();
    let (lower_bound, upper_bound) =
        confidence_bounds(col(primary), col(se.as_str()), critical_value);

    summed
        .with_column(jackknife_standard_error(primary, &weight.replicate_columns()).alias(se.as_str()))
        .with_columns([
            col(primary).alias(value.as_str()),
            lower_bound.alias(lower.as_str()),
            upper_bound.alias(upper.as_str()),
        ])
        .select([
            col(XTAB_VAR),
            col(XTAB_VAL),
            col(Q_VAR),
            col(Q_VAL),
            col(value.as_str()),
            col(se.as_str()),
            col(lower.as_str()),
            col(upper.as_str()),
            share(&value, &SHARE_GROUP).alias(share_name.as_str()),
            share(&lower, &SHARE_GROUP).alias(lower_share.as_str()),
            share(&upper, &SHARE_GROUP).alias(upper_share.as_str()),
        ])
}

/// Joins person and household estimates on the full cell key.
///
/// Both passes run over the same long table, so their cell sets must be
/// identical; anything else is reported as a misalignment.
pub fn merge_weight_types(person: DataFrame, household: DataFrame) -> Result<DataFrame> {
    let (person_rows, household_rows) = (person.height(), household.height());
    let keys: Vec<Expr> = CELL_KEYS.iter().map(|k| col(*k)).collect();
    let merged = person
        .lazy()
        .join(
            household.lazy(),
            keys.clone(),
            keys,
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;
    if merged.height() != person_rows || merged.height() != household_rows {
        return Err(AggregateError::KeyMisalignment {
            person: person_rows,
            household: household_rows,
            matched: merged.height(),
        });
    }
    Ok(merged.sort(CELL_KEYS, SortMultipleOptions::default())?)
}

/// Runs both weight types over a wave and merges the results.
///
/// `wide` supplies the respondent weights, `long` the recoded responses.
pub fn aggregate_wave(
    wide: &DataFrame,
    long: &DataFrame,
    dimensions: &[String],
    critical_value: f64,
) -> Result<DataFrame> {
    let person_weights = weight_table(wide, WeightType::Person)?;
    let household_weights = weight_table(wide, WeightType::Household)?;
    let person = aggregate_weight(
        long,
        &person_weights,
        WeightType::Person,
        dimensions,
        critical_value,
    )?;
    let household = aggregate_weight(
        long,
        &household_weights,
        WeightType::Household,
        dimensions,
        critical_value,
    )?;
    merge_weight_types(person, household)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_common::{column_f64, column_i64, column_strings};

    fn summed(primary: &[f64], replicate: &[f64]) -> DataFrame {
        let n = primary.len();
        let mut columns = vec![
            Column::new(XTAB_VAR.into(), vec!["TOPLINE"; n]),
            Column::new(XTAB_VAL.into(), vec![1i64; n]),
            Column::new(Q_VAR.into(), vec!["ANXIOUS"; n]),
            Column::new(Q_VAL.into(), (1..=n as i64).collect::<Vec<_>>()),
            Column::new("PWEIGHT".into(), primary.to_vec()),
        ];
        for i in 1..=80 {
            columns.push(Column::new(format!("PWEIGHT{i}").into(), replicate.to_vec()));
        }
        DataFrame::new(columns).unwrap()
    }

    fn estimate(summed: &DataFrame, critical_value: f64) -> DataFrame {
        estimate_cells(summed.clone().lazy(), WeightType::Person, critical_value)
            .collect()
            .unwrap()
            .sort(CELL_KEYS, SortMultipleOptions::default())
            .unwrap()
    }

    #[test]
    fn test_shares_divide_by_group_total() {
        let cells = estimate(&summed(&[30.0, 10.0], &[30.0, 10.0]), 1.645);
        let shares = column_f64(&cells, "pweight_share").unwrap();
        assert_eq!(shares, vec![Some(0.75), Some(0.25)]);
        let se = column_f64(&cells, "pweight_se").unwrap();
        assert_eq!(se, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_zero_group_total_gives_null_shares() {
        let cells = estimate(&summed(&[0.0, 0.0], &[0.0, 0.0]), 1.645);
        assert_eq!(column_f64(&cells, "pweight_share").unwrap(), vec![None, None]);
        assert_eq!(column_f64(&cells, "pweight_upper_share").unwrap(), vec![None, None]);
    }

    #[test]
    fn test_standard_error_uses_all_replicates() {
        let cells = estimate(&summed(&[10.0], &[12.0]), 2.0);
        let expected = (80.0f64 * 4.0 * 4.0 / 80.0).sqrt();
        let se = column_f64(&cells, "pweight_se").unwrap()[0].unwrap();
        assert!((se - expected).abs() < 1e-12);
        let lower = column_f64(&cells, "pweight_lower").unwrap()[0].unwrap();
        assert!((lower - (10.0 - 2.0 * expected)).abs() < 1e-12);
    }

    #[test]
    fn test_misaligned_cells_are_rejected() {
        let person = df!(
            "xtab_var" => ["TOPLINE", "TOPLINE"],
            "xtab_val" => [1i64, 1],
            "q_var" => ["ANXIOUS", "ANXIOUS"],
            "q_val" => [1i64, 2],
            "pweight" => [1.0f64, 2.0]
        )
        .unwrap();
        let household = df!(
            "xtab_var" => ["TOPLINE"],
            "xtab_val" => [1i64],
            "q_var" => ["ANXIOUS"],
            "q_val" => [1i64],
            "hweight" => [1.0f64]
        )
        .unwrap();
        let err = merge_weight_types(person, household).unwrap_err();
        assert!(matches!(err, AggregateError::KeyMisalignment { matched: 1, .. }));
    }

    #[test]
    fn test_dimension_sentinels_are_not_crosstab_values() {
        let long = df!(
            "SCRAM" => ["A", "B"],
            "TOPLINE" => [1i64, 1],
            "EEDUC" => [3i64, -99],
            "q_var" => ["ANXIOUS", "ANXIOUS"],
            "q_val" => [1i64, 2]
        )
        .unwrap();
        let mut columns = vec![
            Column::new("SCRAM".into(), ["A", "B"]),
            Column::new("PWEIGHT".into(), [10.0f64, 30.0]),
        ];
        for i in 1..=80 {
            columns.push(Column::new(format!("PWEIGHT{i}").into(), [10.0f64, 30.0]));
        }
        let weights = DataFrame::new(columns).unwrap();
        let dimensions = ["TOPLINE".to_string(), "EEDUC".to_string()];

        let cells =
            aggregate_weight(&long, &weights, WeightType::Person, &dimensions, 1.645).unwrap();
        assert_eq!(
            column_strings(&cells, XTAB_VAR).unwrap(),
            ["EEDUC", "TOPLINE", "TOPLINE"].map(|v| Some(v.to_string()))
        );
        assert_eq!(
            column_i64(&cells, XTAB_VAL).unwrap(),
            vec![Some(3), Some(1), Some(1)]
        );
        assert_eq!(
            column_f64(&cells, "pweight_share").unwrap(),
            vec![Some(1.0), Some(0.25), Some(0.75)]
        );
    }
}
