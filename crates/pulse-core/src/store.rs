//! Source and store contracts for batch runs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use polars::prelude::*;

use crate::error::BoxError;

/// Supplier of raw respondent-level waves.
pub trait WaveSource {
    /// Weeks this source can load, ascending.
    fn available_weeks(&self) -> Result<Vec<u32>, BoxError>;

    fn load_wave(&self, week: u32) -> Result<DataFrame, BoxError>;
}

/// Destination for processed cell tables.
///
/// `replace_wave` must be atomic: after it returns the store holds either the
/// previous table for that week or the new one, never a mix.
pub trait AggregateStore {
    fn replace_wave(&self, week: u32, cells: &DataFrame) -> Result<(), BoxError>;

    fn stored_weeks(&self) -> Result<Vec<u32>, BoxError>;

    /// Every stored wave stacked into one table.
    fn load_cells(&self) -> Result<DataFrame, BoxError>;

    fn replace_smoothed(&self, smoothed: &DataFrame) -> Result<(), BoxError>;

    fn load_smoothed(&self) -> Result<Option<DataFrame>, BoxError>;
}

/// Store holding everything in memory, keyed by week.
#[derive(Debug, Default)]
pub struct MemoryStore {
    waves: Mutex<BTreeMap<u32, DataFrame>>,
    smoothed: Mutex<Option<DataFrame>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wave(&self, week: u32) -> Option<DataFrame> {
        self.waves.lock().ok()?.get(&week).cloned()
    }
}

fn poisoned<T>(_: T) -> BoxError {
    "memory store lock poisoned".into()
}

impl AggregateStore for MemoryStore {
    fn replace_wave(&self, week: u32, cells: &DataFrame) -> Result<(), BoxError> {
        self.waves
            .lock()
            .map_err(poisoned)?
            .insert(week, cells.clone());
        Ok(())
    }

    fn stored_weeks(&self) -> Result<Vec<u32>, BoxError> {
        Ok(self.waves.lock().map_err(poisoned)?.keys().copied().collect())
    }

    fn load_cells(&self) -> Result<DataFrame, BoxError> {
        let waves = self.waves.lock().map_err(poisoned)?;
        let mut frames = waves.values();
        let Some(first) = frames.next() else {
            return Ok(DataFrame::empty());
        };
        let mut stacked = first.clone();
        for frame in frames {
            stacked.vstack_mut(frame)?;
        }
        Ok(stacked)
    }

    fn replace_smoothed(&self, smoothed: &DataFrame) -> Result<(), BoxError> {
        *self.smoothed.lock().map_err(poisoned)? = Some(smoothed.clone());
        Ok(())
    }

    fn load_smoothed(&self) -> Result<Option<DataFrame>, BoxError> {
        Ok(self.smoothed.lock().map_err(poisoned)?.clone())
    }
}
