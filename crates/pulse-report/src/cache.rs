//! Query cache artifacts keyed by question group and crosstab.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use pulse_common::{column_f64, column_i64, column_strings, has_column};
use pulse_model::constants::{Q_VAL, Q_VAR, WEEK, XTAB_VAL, XTAB_VAR};
use pulse_model::{PipelineConfig, SurveyMetadata, Wave, WaveCalendar, smoothed_column};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ReportError, Result};
use crate::labels::{CrosstabLabel, crosstab_labels, response_labels};

/// Share column published in the artifacts.
const PUBLISHED_SHARE: &str = "pweight_share";

/// Artifacts keyed by file name.
pub type QueryCache = BTreeMap<String, CacheArtifact>;

/// One cached query: a question group crossed with one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheArtifact {
    pub qid: String,
    pub ct: String,
    pub labels: BTreeMap<String, String>,
    #[serde(rename = "ctLabels")]
    pub ct_labels: Vec<CrosstabLabel>,
    pub response: Vec<CrosstabResponse>,
    pub available_weeks: Vec<u32>,
}

/// The weekly series of one crosstab value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosstabResponse {
    /// Crosstab label, or the numeric code when no label is known.
    pub ct: String,
    pub values: Vec<WeekValues>,
}

/// Shares for one week, keyed by response code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekValues {
    pub week: u32,
    #[serde(flatten)]
    pub shares: BTreeMap<String, Option<f64>>,
    #[serde(rename = "dateRange")]
    pub date_range: Option<String>,
}

#[derive(Debug, Clone)]
struct ShareRow {
    week: u32,
    xtab_val: i64,
    q_var: String,
    q_val: i64,
    share: Option<f64>,
}

/// Share rows of a cell table, grouped by crosstab variable.
#[derive(Debug, Clone, Default)]
pub struct ShareRows {
    by_xtab: BTreeMap<String, Vec<ShareRow>>,
}

impl ShareRows {
    /// Extracts `share_column` with its keys; rows with a null key are skipped.
    pub fn from_cells(cells: &DataFrame, share_column: &str) -> Result<Self> {
        for column in [WEEK, XTAB_VAR, XTAB_VAL, Q_VAR, Q_VAL, share_column] {
            if !has_column(cells, column) {
                return Err(ReportError::MissingColumn(column.to_string()));
            }
        }
        let weeks = column_i64(cells, WEEK)?;
        let xtab_vars = column_strings(cells, XTAB_VAR)?;
        let xtab_vals = column_i64(cells, XTAB_VAL)?;
        let q_vars = column_strings(cells, Q_VAR)?;
        let q_vals = column_i64(cells, Q_VAL)?;
        let shares = column_f64(cells, share_column)?;

        let mut by_xtab: BTreeMap<String, Vec<ShareRow>> = BTreeMap::new();
        let mut skipped = 0usize;
        for row in 0..cells.height() {
            let key = (
                weeks[row].and_then(|w| u32::try_from(w).ok()),
                xtab_vars[row].as_ref(),
                xtab_vals[row],
                q_vars[row].as_ref(),
                q_vals[row],
            );
            let (Some(week), Some(xtab_var), Some(xtab_val), Some(q_var), Some(q_val)) = key else {
                skipped += 1;
                continue;
            };
            by_xtab.entry(xtab_var.clone()).or_default().push(ShareRow {
                week,
                xtab_val,
                q_var: q_var.clone(),
                q_val,
                share: shares[row],
            });
        }
        if skipped > 0 {
            warn!(skipped, "cell rows with null keys left out of the cache");
        }
        Ok(Self { by_xtab })
    }

    fn for_xtab(&self, xtab: &str) -> &[ShareRow] {
        self.by_xtab.get(xtab).map(Vec::as_slice).unwrap_or_default()
    }
}

/// File name of a cached query.
///
/// ```
/// use pulse_report::cache_key;
///
/// assert_eq!(cache_key("ANXIOUS", "EEDUC", false), "ANXIOUS-EEDUC.json");
/// assert_eq!(cache_key("ANXIOUS", "EEDUC", true), "ANXIOUS-EEDUC-SMOOTHED.json");
/// ```
pub fn cache_key(group: &str, xtab: &str, smoothed: bool) -> String {
    if smoothed {
        format!("{group}-{xtab}-SMOOTHED.json")
    } else {
        format!("{group}-{xtab}.json")
    }
}

/// Builds the artifact for one question group and one crosstab variable.
///
/// Every crosstab value observed for the group gets one entry per week of
/// the calendar range. Weeks without observations carry a null for every
/// labelled response.
pub fn run_query(
    rows: &ShareRows,
    group: &str,
    variables: &BTreeSet<&str>,
    labels: &BTreeMap<String, String>,
    xtab: &str,
    ct_labels: &[CrosstabLabel],
    calendar: &WaveCalendar,
) -> CacheArtifact {
    let selected: Vec<&ShareRow> = rows
        .for_xtab(xtab)
        .iter()
        .filter(|row| variables.contains(row.q_var.as_str()))
        .collect();

    let available_weeks: BTreeSet<u32> = selected.iter().map(|row| row.week).collect();

    let mut by_value: BTreeMap<i64, BTreeMap<u32, Vec<&ShareRow>>> = BTreeMap::new();
    for row in selected.iter().copied() {
        by_value
            .entry(row.xtab_val)
            .or_default()
            .entry(row.week)
            .or_default()
            .push(row);
    }

    let label_of: BTreeMap<i64, &str> = ct_labels
        .iter()
        .map(|l| (l.xtab_val, l.xtab_label.as_str()))
        .collect();

    let response = by_value
        .into_iter()
        .map(|(xtab_val, weeks)| {
            let values = calendar_weeks(calendar)
                .map(|week| {
                    let mut shares: BTreeMap<String, Option<f64>> =
                        labels.keys().map(|code| (code.clone(), None)).collect();
                    for row in weeks.get(&week).into_iter().flatten() {
                        shares.insert(row.q_val.to_string(), row.share);
                    }
                    WeekValues {
                        week,
                        shares,
                        date_range: calendar.get(week).map(Wave::date_range_label),
                    }
                })
                .collect();
            let ct = label_of.get(&xtab_val).map_or_else(
                || {
                    warn!(group, xtab, xtab_val, "no crosstab label, using the code");
                    xtab_val.to_string()
                },
                |label| (*label).to_string(),
            );
            CrosstabResponse { ct, values }
        })
        .collect();

    CacheArtifact {
        qid: group.to_string(),
        ct: xtab.to_string(),
        labels: labels.clone(),
        ct_labels: ct_labels.to_vec(),
        response,
        available_weeks: available_weeks.into_iter().collect(),
    }
}

fn calendar_weeks(calendar: &WaveCalendar) -> impl Iterator<Item = u32> {
    let (first, last) = calendar.week_range().unwrap_or((1, 0));
    first..=last
}

/// Builds every artifact for the aggregated cells and, when given, the
/// smoothed table.
pub fn build_query_cache(
    cells: &DataFrame,
    smoothed: Option<&DataFrame>,
    metadata: &SurveyMetadata,
    config: &PipelineConfig,
    calendar: &WaveCalendar,
) -> Result<QueryCache> {
    let groups = metadata.question_groups();
    let group_labels = response_labels(metadata);
    let xtab_labels = crosstab_labels(metadata, config);
    let empty = BTreeMap::new();

    let mut flavours = vec![(false, ShareRows::from_cells(cells, PUBLISHED_SHARE)?)];
    if let Some(smoothed) = smoothed {
        let column = smoothed_column(PUBLISHED_SHARE);
        flavours.push((true, ShareRows::from_cells(smoothed, &column)?));
    }

    let mut cache = QueryCache::new();
    for (is_smoothed, rows) in &flavours {
        for (xtab, ct_labels) in &xtab_labels {
            for (group, variables) in &groups {
                let labels = group_labels.get(*group).unwrap_or(&empty);
                let artifact = run_query(rows, group, variables, labels, xtab, ct_labels, calendar);
                cache.insert(cache_key(group, xtab, *is_smoothed), artifact);
            }
        }
        debug!(smoothed = is_smoothed, artifacts = cache.len(), "built cache flavour");
    }

    info!(
        artifacts = cache.len(),
        groups = groups.len(),
        crosstabs = xtab_labels.len(),
        "built query cache"
    );
    Ok(cache)
}
