//! Smoothing driver and simplex renormalization.

use polars::prelude::*;
use pulse_model::constants::{Q_VAL, Q_VAR, WEEK, XTAB_VAL, XTAB_VAR};
use pulse_model::{CellKey, SHARE_COLUMNS, SmoothingOptions, WaveCalendar, smoothed_column};
use tracing::info;

use crate::error::Result;
use crate::lowess::Lowess;
use crate::pool::WorkerPool;
use crate::series::{CellSeries, partition_cells};

/// Smooths every cell's share series and renormalizes the result.
///
/// The output has one row per input row: `week`, the four cell keys and the
/// six `*_smoothed` share columns, ordered by cell key then date.
/// `progress` receives (completed, total) cell counts.
pub fn smooth_cells<P>(
    cells: &DataFrame,
    calendar: &WaveCalendar,
    options: &SmoothingOptions,
    progress: P,
) -> Result<DataFrame>
where
    P: FnMut(usize, usize),
{
    let lowess = Lowess::new(options.frac, options.iterations)?;
    let series = partition_cells(cells, calendar)?;
    let pool = WorkerPool::new(options.worker_count());
    info!(
        cells = series.len(),
        workers = pool.workers(),
        frac = lowess.frac,
        "smoothing cell time series"
    );

    let tasks: Vec<(CellKey, CellSeries)> = series
        .into_iter()
        .map(|cell| (cell.key.clone(), cell))
        .collect();
    let smoothed = pool.map_keyed(
        tasks,
        |cell: CellSeries| cell.smooth(&lowess).map(|fitted| (cell.weeks, fitted)),
        progress,
    )?;

    let rows = cells.height();
    let mut weeks = Vec::with_capacity(rows);
    let mut xtab_vars = Vec::with_capacity(rows);
    let mut xtab_vals = Vec::with_capacity(rows);
    let mut q_vars = Vec::with_capacity(rows);
    let mut q_vals = Vec::with_capacity(rows);
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(rows); SHARE_COLUMNS.len()];
    for (key, fitted) in smoothed {
        let (cell_weeks, fitted) = fitted?;
        for (position, week) in cell_weeks.into_iter().enumerate() {
            weeks.push(i64::from(week));
            xtab_vars.push(key.xtab_var.clone());
            xtab_vals.push(key.xtab_val);
            q_vars.push(key.q_var.clone());
            q_vals.push(key.q_val);
            for (target, column) in values.iter_mut().zip(&fitted) {
                target.push(column[position]);
            }
        }
    }

    let mut columns = vec![
        Column::new(WEEK.into(), weeks),
        Column::new(XTAB_VAR.into(), xtab_vars),
        Column::new(XTAB_VAL.into(), xtab_vals),
        Column::new(Q_VAR.into(), q_vars),
        Column::new(Q_VAL.into(), q_vals),
    ];
    for (name, column) in SHARE_COLUMNS.iter().zip(values) {
        columns.push(Column::new(smoothed_column(name).into(), column));
    }
    renormalize(DataFrame::new(columns)?)
}

/// Divides each smoothed share by its (week, xtab_var, xtab_val, q_var)
/// group sum. Groups summing to zero, or with no values, become null.
pub fn renormalize(smoothed: DataFrame) -> Result<DataFrame> {
    info!("normalizing smoothed time series");
    let group = [col(WEEK), col(XTAB_VAR), col(XTAB_VAL), col(Q_VAR)];
    let normalized: Vec<Expr> = SHARE_COLUMNS
        .map(smoothed_column)
        .iter()
        .map(|name| {
            let total = col(name.as_str()).sum().over(group.clone());
            when(total.clone().eq(lit(0.0)))
                .then(lit(NULL).cast(DataType::Float64))
                .otherwise(col(name.as_str()) / total)
                .alias(name.as_str())
        })
        .collect();
    Ok(smoothed.lazy().with_columns(normalized).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_common::column_f64;

    #[test]
    fn test_renormalized_groups_sum_to_one() {
        let mut columns = vec![
            Column::new(WEEK.into(), [1i64, 1, 1]),
            Column::new(XTAB_VAR.into(), ["TOPLINE"; 3]),
            Column::new(XTAB_VAL.into(), [1i64; 3]),
            Column::new(Q_VAR.into(), ["ANXIOUS"; 3]),
            Column::new(Q_VAL.into(), [1i64, 2, 3]),
        ];
        for name in SHARE_COLUMNS {
            columns.push(Column::new(
                smoothed_column(name).into(),
                [Some(0.2f64), Some(0.6), None],
            ));
        }
        let out = renormalize(DataFrame::new(columns).unwrap()).unwrap();
        let shares = column_f64(&out, "pweight_share_smoothed").unwrap();
        assert!((shares[0].unwrap() - 0.25).abs() < 1e-12);
        assert!((shares[1].unwrap() - 0.75).abs() < 1e-12);
        assert_eq!(shares[2], None);
    }

    #[test]
    fn test_zero_totals_become_null() {
        let mut columns = vec![
            Column::new(WEEK.into(), [1i64, 1]),
            Column::new(XTAB_VAR.into(), ["TOPLINE"; 2]),
            Column::new(XTAB_VAL.into(), [1i64; 2]),
            Column::new(Q_VAR.into(), ["ANXIOUS"; 2]),
            Column::new(Q_VAL.into(), [1i64, 2]),
        ];
        for name in SHARE_COLUMNS {
            columns.push(Column::new(smoothed_column(name).into(), [0.0f64, 0.0]));
        }
        let out = renormalize(DataFrame::new(columns).unwrap()).unwrap();
        assert_eq!(
            column_f64(&out, "hweight_upper_share_smoothed").unwrap(),
            vec![None, None]
        );
    }
}
