//! Bin definitions for numeric-input variables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A half-open `[lower, upper)` interval mapped to a bin code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericBin {
    pub variable: String,
    pub lower: f64,
    pub upper: f64,
    pub code: i64,
    pub label: String,
}

impl NumericBin {
    pub fn new(
        variable: impl Into<String>,
        lower: f64,
        upper: f64,
        code: i64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            variable: variable.into(),
            lower,
            upper,
            code,
            label: label.into(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value < self.upper
    }
}

/// Bins grouped per variable, sorted by lower edge.
#[derive(Debug, Clone, Default)]
pub struct NumericBins {
    by_variable: BTreeMap<String, Vec<NumericBin>>,
}

impl NumericBins {
    /// Builds the bin index, rejecting empty or overlapping intervals.
    pub fn new(bins: Vec<NumericBin>) -> Result<Self> {
        let mut by_variable: BTreeMap<String, Vec<NumericBin>> = BTreeMap::new();
        for bin in bins {
            if !(bin.lower < bin.upper) {
                return Err(ModelError::InvalidBin {
                    variable: bin.variable,
                    lower: bin.lower,
                    upper: bin.upper,
                });
            }
            by_variable.entry(bin.variable.clone()).or_default().push(bin);
        }
        for (variable, bins) in &mut by_variable {
            bins.sort_by(|a, b| a.lower.total_cmp(&b.lower));
            for pair in bins.windows(2) {
                if pair[1].lower < pair[0].upper {
                    return Err(ModelError::OverlappingBins {
                        variable: variable.clone(),
                        value: pair[1].lower,
                    });
                }
            }
        }
        Ok(Self { by_variable })
    }

    /// The bin containing `value`, if any.
    pub fn locate(&self, variable: &str, value: f64) -> Option<&NumericBin> {
        self.by_variable
            .get(variable)?
            .iter()
            .find(|bin| bin.contains(value))
    }

    pub fn bins_for(&self, variable: &str) -> &[NumericBin] {
        self.by_variable
            .get(variable)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.by_variable.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_variable.is_empty()
    }
}
