//! Wide to long reshaping.

use polars::prelude::*;
use pulse_common::has_column;
use pulse_model::constants::{Q_VAL, Q_VAR, RESPONDENT_ID, WEEK_COLUMN};
use pulse_model::QuestionClassification;
use tracing::{debug, info};

use crate::error::{Result, TransformError};

/// Melts question columns into `(q_var, q_val)` rows.
///
/// The output carries `SCRAM`, `WEEK`, one integer column per dimension and
/// one row per answered question per respondent. Dimensions stay as columns
/// and null responses are dropped.
pub fn reshape_long(
    df: &DataFrame,
    classification: &QuestionClassification,
    dimensions: &[String],
) -> Result<DataFrame> {
    for required in [RESPONDENT_ID, WEEK_COLUMN] {
        if !has_column(df, required) {
            return Err(TransformError::MissingColumn(required.to_string()));
        }
    }
    info!(
        questions = classification.len(),
        dimensions = dimensions.len(),
        "reshaping responses from wide to long"
    );

    let mut keys = vec![
        col(RESPONDENT_ID),
        col(WEEK_COLUMN).cast(DataType::Int64),
    ];
    keys.extend(
        dimensions
            .iter()
            .map(|dimension| col(dimension.as_str()).cast(DataType::Int64)),
    );

    let frames: Vec<LazyFrame> = classification
        .questions()
        .map(|question| {
            let mut exprs = keys.clone();
            exprs.push(lit(question).alias(Q_VAR));
            exprs.push(col(question).cast(DataType::Int64).alias(Q_VAL));
            df.clone()
                .lazy()
                .select(exprs)
                .filter(col(Q_VAL).is_not_null())
        })
        .collect();
    if frames.is_empty() {
        return Err(TransformError::NoQuestions);
    }

    let long = concat(frames, UnionArgs::default())?.collect()?;
    debug!(rows = long.height(), "long table built");
    Ok(long)
}
