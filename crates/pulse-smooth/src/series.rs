//! Per-cell time series extracted from the multi-week cell table.

use std::collections::BTreeMap;

use polars::prelude::*;
use pulse_common::{column_f64, column_i64, column_strings, has_column};
use pulse_model::constants::{Q_VAL, Q_VAR, WEEK, XTAB_VAL, XTAB_VAR};
use pulse_model::{CellKey, SHARE_COLUMNS, WaveCalendar};
use tracing::debug;

use crate::error::{Result, SmoothError};
use crate::lowess::Lowess;

/// One cell's observations, sorted by wave end date.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSeries {
    pub key: CellKey,
    pub weeks: Vec<u32>,
    /// Wave end dates as day ordinals.
    pub x: Vec<f64>,
    /// One vector per entry of [`SHARE_COLUMNS`].
    pub shares: Vec<Vec<Option<f64>>>,
}

impl CellSeries {
    fn new(key: CellKey) -> Self {
        Self {
            key,
            weeks: Vec::new(),
            x: Vec::new(),
            shares: vec![Vec::new(); SHARE_COLUMNS.len()],
        }
    }

    fn sort_by_date(&mut self) {
        let mut order: Vec<usize> = (0..self.x.len()).collect();
        order.sort_by(|&a, &b| self.x[a].total_cmp(&self.x[b]));
        self.weeks = order.iter().map(|&i| self.weeks[i]).collect();
        self.x = order.iter().map(|&i| self.x[i]).collect();
        for column in &mut self.shares {
            *column = order.iter().map(|&i| column[i]).collect();
        }
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Smooths every share column; nulls are left out of the fit and stay
    /// null. Dates are measured from the first observation.
    pub fn smooth(&self, lowess: &Lowess) -> Result<Vec<Vec<Option<f64>>>> {
        let origin = self.x.first().copied().unwrap_or_default();
        self.shares
            .iter()
            .map(|column| {
                let (x, y): (Vec<f64>, Vec<f64>) = self
                    .x
                    .iter()
                    .zip(column)
                    .filter_map(|(&x, y)| y.map(|y| (x - origin, y)))
                    .unzip();
                let mut fitted = lowess.fit(&x, &y)?.into_iter();
                Ok(column
                    .iter()
                    .map(|value| value.and_then(|_| fitted.next()))
                    .collect())
            })
            .collect()
    }
}

fn required_keys(cells: &DataFrame, column: &str) -> Result<()> {
    if has_column(cells, column) {
        Ok(())
    } else {
        Err(SmoothError::MissingColumn(column.to_string()))
    }
}

/// Splits the cell table into owned series keyed by cell.
///
/// Every week must be in `calendar`; it provides the x-axis.
pub fn partition_cells(cells: &DataFrame, calendar: &WaveCalendar) -> Result<Vec<CellSeries>> {
    for column in [WEEK, XTAB_VAR, XTAB_VAL, Q_VAR, Q_VAL].into_iter().chain(SHARE_COLUMNS) {
        required_keys(cells, column)?;
    }
    let weeks = column_i64(cells, WEEK)?;
    let xtab_vars = column_strings(cells, XTAB_VAR)?;
    let xtab_vals = column_i64(cells, XTAB_VAL)?;
    let q_vars = column_strings(cells, Q_VAR)?;
    let q_vals = column_i64(cells, Q_VAL)?;
    let shares = SHARE_COLUMNS
        .iter()
        .map(|c| Ok(column_f64(cells, c)?))
        .collect::<Result<Vec<_>>>()?;

    let mut series: BTreeMap<CellKey, CellSeries> = BTreeMap::new();
    for row in 0..cells.height() {
        let week = weeks[row]
            .and_then(|w| u32::try_from(w).ok())
            .ok_or_else(|| SmoothError::NullKey(WEEK.to_string()))?;
        let wave = calendar.get(week).ok_or(SmoothError::UnknownWeek(week))?;
        let key = CellKey::new(
            xtab_vars[row]
                .clone()
                .ok_or_else(|| SmoothError::NullKey(XTAB_VAR.to_string()))?,
            xtab_vals[row].ok_or_else(|| SmoothError::NullKey(XTAB_VAL.to_string()))?,
            q_vars[row]
                .clone()
                .ok_or_else(|| SmoothError::NullKey(Q_VAR.to_string()))?,
            q_vals[row].ok_or_else(|| SmoothError::NullKey(Q_VAL.to_string()))?,
        );

        let entry = series
            .entry(key)
            .or_insert_with_key(|key| CellSeries::new(key.clone()));
        entry.weeks.push(week);
        entry.x.push(wave.end_ordinal());
        for (target, source) in entry.shares.iter_mut().zip(&shares) {
            target.push(source[row]);
        }
    }

    let mut series: Vec<CellSeries> = series.into_values().collect();
    for cell in &mut series {
        cell.sort_by_date();
    }
    debug!(cells = series.len(), rows = cells.height(), "partitioned cell series");
    Ok(series)
}
