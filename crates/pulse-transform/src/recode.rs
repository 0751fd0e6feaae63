//! Canonical response and dimension codes.

use std::collections::HashMap;

use polars::prelude::*;
use pulse_common::{column_i64, has_column};
use pulse_model::constants::{Q_VAL, Q_VAR};
use pulse_model::RecodeTable;
use tracing::info;

use crate::error::Result;

/// Maps `(q_var, q_val)` and every dimension column onto canonical codes.
///
/// Values without a recoding row keep their original code, so applying the
/// recoder to already canonical data changes nothing.
pub fn recode_values(
    mut long: DataFrame,
    table: &RecodeTable,
    dimensions: &[String],
) -> Result<DataFrame> {
    info!("recoding values from the response mapping");

    let mut maps: HashMap<String, HashMap<i64, i64>> = HashMap::new();
    let q_vars = long.column(Q_VAR)?.str()?;
    let recoded: Vec<Option<i64>> = q_vars
        .into_iter()
        .zip(column_i64(&long, Q_VAL)?)
        .map(|(q_var, q_val)| {
            let (Some(q_var), Some(value)) = (q_var, q_val) else {
                return q_val;
            };
            let map = maps
                .entry(q_var.to_string())
                .or_insert_with(|| table.value_map(q_var));
            Some(map.get(&value).copied().unwrap_or(value))
        })
        .collect();
    long.with_column(Column::new(Q_VAL.into(), recoded))?;

    for dimension in dimensions {
        if !has_column(&long, dimension) {
            continue;
        }
        let map = table.value_map(dimension);
        if map.is_empty() {
            continue;
        }
        let values: Vec<Option<i64>> = column_i64(&long, dimension)?
            .into_iter()
            .map(|v| v.map(|v| map.get(&v).copied().unwrap_or(v)))
            .collect();
        long.with_column(Column::new(dimension.as_str().into(), values))?;
    }
    Ok(long)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_model::ResponseRecoding;

    fn table() -> RecodeTable {
        RecodeTable::new(vec![
            ResponseRecoding::new("ANXIOUS", 3).recoded_to(2),
            ResponseRecoding::new("ANXIOUS", 4).recoded_to(2),
            ResponseRecoding::new("EEDUC", 7).recoded_to(6),
        ])
    }

    #[test]
    fn test_recodes_responses_and_dimensions() {
        let long = df!(
            "q_var" => ["ANXIOUS", "ANXIOUS", "WORRY"],
            "q_val" => [3i64, 1, 3],
            "EEDUC" => [7i64, 2, 7]
        )
        .unwrap();
        let out = recode_values(long, &table(), &["EEDUC".to_string()]).unwrap();
        assert_eq!(column_i64(&out, "q_val").unwrap(), vec![Some(2), Some(1), Some(3)]);
        assert_eq!(column_i64(&out, "EEDUC").unwrap(), vec![Some(6), Some(2), Some(6)]);
    }

    #[test]
    fn test_recoding_is_idempotent_on_canonical_values() {
        let long = df!("q_var" => ["ANXIOUS", "ANXIOUS"], "q_val" => [3i64, 4]).unwrap();
        let once = recode_values(long, &table(), &[]).unwrap();
        let twice = recode_values(once.clone(), &table(), &[]).unwrap();
        assert_eq!(
            column_i64(&once, "q_val").unwrap(),
            column_i64(&twice, "q_val").unwrap()
        );
    }
}
