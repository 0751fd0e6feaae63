//! Replicate-weight variance estimation as column expressions.

use polars::prelude::*;
use pulse_model::constants::REPLICATE_FACTOR;

/// Successive-difference jackknife standard error of a weighted total.
///
/// `sqrt(sum_r (replicate_r - primary)^2 * 4/80)`; the factor is fixed by the
/// survey design and does not depend on how many replicates are passed.
///
/// ```
/// use polars::prelude::*;
/// use pulse_aggregate::jackknife_standard_error;
///
/// let totals = df!("W" => [10.0], "W1" => [8.0], "W2" => [12.0], "W3" => [10.0]).unwrap();
/// let replicates = ["W1", "W2", "W3"].map(String::from);
/// let se = totals
///     .lazy()
///     .select([jackknife_standard_error("W", &replicates).alias("se")])
///     .collect()
///     .unwrap();
/// let se = se.column("se").unwrap().f64().unwrap().get(0).unwrap();
/// assert!((se - (8.0f64 * 4.0 / 80.0).sqrt()).abs() < 1e-12);
/// ```
pub fn jackknife_standard_error(primary: &str, replicates: &[String]) -> Expr {
    let squared = replicates
        .iter()
        .map(|replicate| {
            let deviation = col(replicate.as_str()) - col(primary);
            deviation.clone() * deviation
        })
        .reduce(|total, term| total + term)
        .unwrap_or_else(|| lit(0.0));
    (squared * lit(REPLICATE_FACTOR)).sqrt()
}

/// `(value - z*se, value + z*se)`.
pub fn confidence_bounds(value: Expr, standard_error: Expr, critical_value: f64) -> (Expr, Expr) {
    let margin = lit(critical_value) * standard_error;
    (value.clone() - margin.clone(), value + margin)
}

/// `column` divided by its sum over the `group` partition.
///
/// A zero group total is "no data" and yields null rather than NaN.
pub fn share(column: &str, group: &[&str]) -> Expr {
    let partition: Vec<Expr> = group.iter().map(|g| col(*g)).collect();
    let total = col(column).sum().over(partition);
    when(total.clone().eq(lit(0.0)))
        .then(lit(NULL).cast(DataType::Float64))
        .otherwise(col(column) / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_common::column_f64;

    fn evaluate(df: DataFrame, expr: Expr) -> Vec<Option<f64>> {
        let out = df.lazy().select([expr.alias("out")]).collect().unwrap();
        column_f64(&out, "out").unwrap()
    }

    #[test]
    fn test_identical_replicates_have_zero_error() {
        let mut columns = vec![Column::new("W".into(), [5.0f64])];
        let replicates: Vec<String> = (1..=80).map(|i| format!("W{i}")).collect();
        for name in &replicates {
            columns.push(Column::new(name.as_str().into(), [5.0f64]));
        }
        let df = DataFrame::new(columns).unwrap();
        assert_eq!(
            evaluate(df, jackknife_standard_error("W", &replicates)),
            vec![Some(0.0)]
        );
    }

    #[test]
    fn test_bounds_are_symmetric() {
        let df = df!("v" => [100.0f64], "se" => [10.0f64]).unwrap();
        let (lower, upper) = confidence_bounds(col("v"), col("se"), 1.645);
        let lower = evaluate(df.clone(), lower)[0].unwrap();
        let upper = evaluate(df, upper)[0].unwrap();
        assert!((lower - 83.55).abs() < 1e-9);
        assert!((upper - 116.45).abs() < 1e-9);
    }

    #[test]
    fn test_shares_partition_by_group() {
        let df = df!(
            "g" => ["a", "a", "b", "b"],
            "v" => [1.0f64, 3.0, 0.0, 0.0]
        )
        .unwrap();
        assert_eq!(
            evaluate(df, share("v", &["g"])),
            vec![Some(0.25), Some(0.75), None, None]
        );
    }
}
