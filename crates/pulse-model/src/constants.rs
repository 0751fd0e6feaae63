//! Fixed survey design parameters and column names.

/// Code for "not applicable / question skipped".
pub const SKIPPED: i64 = -88;

/// Code for item non-response.
pub const NON_RESPONSE: i64 = -99;

/// Both missing-value sentinels.
pub const SENTINEL_CODES: [i64; 2] = [SKIPPED, NON_RESPONSE];

/// Number of replicate weights per primary weight (jackknife design).
pub const REPLICATE_COUNT: usize = 80;

/// Multiplier applied to the squared replicate deviations.
pub const REPLICATE_FACTOR: f64 = 4.0 / REPLICATE_COUNT as f64;

/// One-sided 5% critical value used by the published tables.
pub const DEFAULT_CRITICAL_VALUE: f64 = 1.645;

// Respondent-level columns
pub const RESPONDENT_ID: &str = "SCRAM";
pub const WEEK_COLUMN: &str = "WEEK";
pub const TOPLINE: &str = "TOPLINE";

// Long-format and output columns
pub const Q_VAR: &str = "q_var";
pub const Q_VAL: &str = "q_val";
pub const XTAB_VAR: &str = "xtab_var";
pub const XTAB_VAL: &str = "xtab_val";
pub const WEEK: &str = "week";
pub const CBSA_TITLE: &str = "cbsa_title";

/// Returns true for -88 and -99.
pub fn is_sentinel(value: i64) -> bool {
    SENTINEL_CODES.contains(&value)
}

/// Returns true when a float value is exactly one of the sentinel codes.
pub fn is_sentinel_f64(value: f64) -> bool {
    value.fract() == 0.0 && is_sentinel(value as i64)
}
