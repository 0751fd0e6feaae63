//! Response and crosstab label dictionaries.

use std::collections::BTreeMap;

use pulse_model::constants::TOPLINE;
use pulse_model::{PipelineConfig, SurveyMetadata, is_sentinel};
use serde::{Deserialize, Serialize};

/// Display label of one crosstab value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosstabLabel {
    pub xtab_val: i64,
    pub xtab_label: String,
}

impl CrosstabLabel {
    fn new(xtab_val: i64, xtab_label: impl Into<String>) -> Self {
        Self {
            xtab_val,
            xtab_label: xtab_label.into(),
        }
    }
}

/// Response labels per question group, keyed by canonical code.
///
/// Labels come from the response mapping and from numeric bins. Sentinel
/// codes never get a label. Variables that no question row maps to a group
/// are left out. Within a group a later row for the same code replaces an
/// earlier one.
pub fn response_labels(metadata: &SurveyMetadata) -> BTreeMap<String, BTreeMap<String, String>> {
    let mut group_of: BTreeMap<&str, &str> = BTreeMap::new();
    for question in &metadata.questions {
        group_of
            .entry(question.final_name())
            .or_insert(question.group_name());
    }

    let mut labels: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut insert = |variable: &str, value: i64, label: &str| {
        if is_sentinel(value) {
            return;
        }
        if let Some(group) = group_of.get(variable) {
            labels
                .entry((*group).to_string())
                .or_default()
                .insert(value.to_string(), label.to_string());
        }
    };

    for entry in metadata.responses.entries() {
        insert(
            &entry.variable,
            entry.canonical_value(),
            entry.canonical_label().unwrap_or_default(),
        );
    }
    for variable in metadata.bins.variables() {
        for bin in metadata.bins.bins_for(variable) {
            insert(variable, bin.code, &bin.label);
        }
    }
    labels
}

/// Crosstab labels for every configured dimension, ordered by value.
///
/// `TOPLINE` has the single value 1 ("Summary"); the geography dimension
/// uses metro titles; binned dimensions use their bin labels; any other
/// dimension uses the response mapping, first label per canonical code.
pub fn crosstab_labels(
    metadata: &SurveyMetadata,
    config: &PipelineConfig,
) -> BTreeMap<String, Vec<CrosstabLabel>> {
    config
        .dimensions
        .iter()
        .map(|dimension| {
            let labels = dimension_labels(metadata, config, dimension);
            (dimension.clone(), labels)
        })
        .collect()
}

fn dimension_labels(
    metadata: &SurveyMetadata,
    config: &PipelineConfig,
    dimension: &str,
) -> Vec<CrosstabLabel> {
    if dimension == TOPLINE {
        return vec![CrosstabLabel::new(1, "Summary")];
    }

    let mut by_value: BTreeMap<i64, String> = BTreeMap::new();
    if dimension == config.geography_dimension {
        by_value.extend(metadata.geography.iter().map(|(code, title)| (code, title.to_string())));
    } else if !metadata.bins.bins_for(dimension).is_empty() {
        for bin in metadata.bins.bins_for(dimension) {
            by_value.entry(bin.code).or_insert_with(|| bin.label.clone());
        }
    } else {
        for entry in metadata
            .responses
            .entries()
            .iter()
            .filter(|e| e.variable == dimension)
        {
            by_value
                .entry(entry.canonical_value())
                .or_insert_with(|| entry.canonical_label().unwrap_or_default().to_string());
        }
    }

    by_value
        .into_iter()
        .map(|(value, label)| CrosstabLabel::new(value, label))
        .collect()
}
