//! Aggregate cell keys and share column names.

use serde::{Deserialize, Serialize};

/// Identity of one published time series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub xtab_var: String,
    pub xtab_val: i64,
    pub q_var: String,
    pub q_val: i64,
}

impl CellKey {
    pub fn new(xtab_var: impl Into<String>, xtab_val: i64, q_var: impl Into<String>, q_val: i64) -> Self {
        Self {
            xtab_var: xtab_var.into(),
            xtab_val,
            q_var: q_var.into(),
            q_val,
        }
    }
}

/// The six share columns carried into smoothing.
pub const SHARE_COLUMNS: [&str; 6] = [
    "pweight_share",
    "pweight_lower_share",
    "pweight_upper_share",
    "hweight_share",
    "hweight_lower_share",
    "hweight_upper_share",
];

/// Name of the smoothed counterpart of a share column.
pub fn smoothed_column(share_column: &str) -> String {
    format!("{share_column}_smoothed")
}
