//! Removal of skipped and non-response rows.

use polars::prelude::*;
use pulse_common::{column_i64, has_column};
use pulse_model::constants::{Q_VAL, Q_VAR};
use pulse_model::{QuestionClassification, is_sentinel};
use tracing::info;

use crate::error::Result;

/// Drops rows whose response is a missing code for its question type, and
/// rows whose required dimensions carry a sentinel.
///
/// Select-all questions only lose `-88`; every other type loses both `-88`
/// and `-99`. Questions missing from the classification keep all values.
pub fn drop_missing_responses(
    long: DataFrame,
    classification: &QuestionClassification,
    required_dimensions: &[String],
) -> Result<DataFrame> {
    let q_vars = long.column(Q_VAR)?.str()?;
    let q_vals = column_i64(&long, Q_VAL)?;

    let mut keep: Vec<bool> = q_vars
        .into_iter()
        .zip(&q_vals)
        .map(|(q_var, q_val)| match (q_var.and_then(|v| classification.question_type(v)), q_val) {
            (Some(question_type), Some(value)) => !question_type.drops(*value),
            _ => true,
        })
        .collect();

    for dimension in required_dimensions {
        if !has_column(&long, dimension) {
            continue;
        }
        for (flag, value) in keep.iter_mut().zip(column_i64(&long, dimension)?) {
            if value.is_some_and(is_sentinel) {
                *flag = false;
            }
        }
    }

    let before = long.height();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let filtered = long.filter(&mask)?;
    info!(
        dropped = before - filtered.height(),
        remaining = filtered.height(),
        "dropped missing or empty responses"
    );
    Ok(filtered)
}
