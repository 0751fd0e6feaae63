//! Respondent weight tables.

use polars::prelude::*;
use pulse_common::has_column;
use pulse_model::WeightType;
use pulse_model::constants::{REPLICATE_COUNT, RESPONDENT_ID};

use crate::error::{AggregateError, Result};

/// Selects `SCRAM` plus the primary and replicate columns of one weight type.
///
/// All 80 replicates must be present; weights are cast to `Float64`.
pub fn weight_table(wide: &DataFrame, weight: WeightType) -> Result<DataFrame> {
    for required in [RESPONDENT_ID, weight.primary_column()] {
        if !has_column(wide, required) {
            return Err(AggregateError::MissingColumn(required.to_string()));
        }
    }
    let replicates = weight.replicate_columns();
    let found = replicates.iter().filter(|c| has_column(wide, c)).count();
    if found != REPLICATE_COUNT {
        return Err(AggregateError::ReplicateWeights {
            weight: weight.primary_column().to_string(),
            found,
            expected: REPLICATE_COUNT,
        });
    }

    let mut exprs = vec![col(RESPONDENT_ID)];
    exprs.extend(
        weight
            .all_columns()
            .iter()
            .map(|c| col(c.as_str()).cast(DataType::Float64)),
    );
    Ok(wide.clone().lazy().select(exprs).collect()?)
}
