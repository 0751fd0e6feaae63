//! Publication layout of a wave's cell table.

use polars::prelude::*;
use pulse_common::{column_i64, column_strings, has_column};
use pulse_model::constants::{CBSA_TITLE, Q_VAL, Q_VAR, WEEK, XTAB_VAL, XTAB_VAR};
use pulse_model::{GeographyCrosswalk, WeightType};
use tracing::info;

use crate::error::{AggregateError, Result};

/// Adds `cbsa_title`, filled only on rows of the geography dimension.
pub fn attach_geography(
    mut cells: DataFrame,
    dimension: &str,
    crosswalk: &GeographyCrosswalk,
) -> Result<DataFrame> {
    info!(dimension, "merging metro area titles");
    let xtab_vars = column_strings(&cells, XTAB_VAR)?;
    let xtab_vals = column_i64(&cells, XTAB_VAL)?;
    let titles: Vec<Option<String>> = xtab_vars
        .iter()
        .zip(&xtab_vals)
        .map(|(var, val)| match (var.as_deref(), val) {
            (Some(var), Some(code)) if var == dimension => {
                crosswalk.title(*code).map(str::to_string)
            }
            _ => None,
        })
        .collect();
    cells.with_column(Column::new(CBSA_TITLE.into(), titles))?;
    Ok(cells)
}

/// Column order of a published wave: keys first, then the seven estimate
/// columns of each weight type.
pub fn output_order() -> Vec<String> {
    let mut order: Vec<String> = [WEEK, XTAB_VAR, XTAB_VAL, CBSA_TITLE, Q_VAR, Q_VAL]
        .iter()
        .map(|c| c.to_string())
        .collect();
    for weight in WeightType::ALL {
        order.extend(weight.output_columns());
    }
    order
}

/// Stamps the week, fixes the column order and sorts by cell key.
pub fn finalize_columns(mut cells: DataFrame, week: u32) -> Result<DataFrame> {
    info!(week, "reordering columns for final output");
    let height = cells.height();
    cells.with_column(Column::new(WEEK.into(), vec![i64::from(week); height]))?;
    if !has_column(&cells, CBSA_TITLE) {
        cells.with_column(Column::full_null(CBSA_TITLE.into(), height, &DataType::String))?;
    }
    let order = output_order();
    if let Some(missing) = order.iter().find(|c| !has_column(&cells, c)) {
        return Err(AggregateError::MissingColumn(missing.clone()));
    }
    let ordered = cells.select(order)?;
    Ok(ordered.sort([XTAB_VAR, XTAB_VAL, Q_VAR, Q_VAL], SortMultipleOptions::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles_only_on_geography_rows() {
        let cells = df!(
            "xtab_var" => ["EST_MSA", "EST_MSA", "EEDUC"],
            "xtab_val" => [35620i64, 99999, 35620]
        )
        .unwrap();
        let crosswalk = GeographyCrosswalk::new([(35620, "New York-Newark-Jersey City".to_string())]);
        let cells = attach_geography(cells, "EST_MSA", &crosswalk).unwrap();
        assert_eq!(
            column_strings(&cells, CBSA_TITLE).unwrap(),
            vec![Some("New York-Newark-Jersey City".to_string()), None, None]
        );
    }

    #[test]
    fn test_output_order_lists_both_weight_types() {
        let order = output_order();
        assert_eq!(order.len(), 6 + 14);
        assert_eq!(order[0], "week");
        assert_eq!(order[6], "pweight");
        assert_eq!(order[13], "hweight");
        assert_eq!(order[19], "hweight_upper_share");
    }
}
