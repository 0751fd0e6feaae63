//! Question classification and schema drift reporting.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use pulse_model::constants::TOPLINE;
use pulse_model::{PipelineConfig, QuestionClassification, SchemaReport, SurveyMetadata, WeightType};
use tracing::{debug, warn};

use crate::error::{Result, TransformError};

/// What a wave actually carries, as opposed to what the metadata declares.
#[derive(Debug, Clone, Default)]
pub struct WaveSchema {
    pub classification: QuestionClassification,
    /// Configured crosstab dimensions present in the wave, in config order.
    pub dimensions: Vec<String>,
    pub report: SchemaReport,
}

/// Whether `column` is a primary or replicate weight of either type.
pub fn is_weight_column(column: &str) -> bool {
    WeightType::ALL.iter().any(|weight| {
        column
            .strip_prefix(weight.primary_column())
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
    })
}

/// Classifies the question columns present in `df`.
///
/// Declared questions absent from the wave, present columns the metadata
/// does not declare and configured dimensions the wave lacks are collected
/// into the schema report; none of them stops the run. A wave with no
/// declared question column at all is rejected.
pub fn classify_questions(
    df: &DataFrame,
    metadata: &SurveyMetadata,
    config: &PipelineConfig,
    skipped_renames: BTreeSet<String>,
) -> Result<WaveSchema> {
    let present: BTreeSet<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
    let mut report = SchemaReport {
        skipped_renames,
        ..SchemaReport::default()
    };

    let mut dimensions = Vec::with_capacity(config.dimensions.len());
    for dimension in &config.dimensions {
        if present.contains(dimension.as_str()) {
            dimensions.push(dimension.clone());
        } else {
            report.missing_dimensions.insert(dimension.clone());
        }
    }

    let reserved = |column: &str| {
        column == TOPLINE || config.is_id_column(column) || is_weight_column(column)
    };

    let mut types = BTreeMap::new();
    for question in &metadata.questions {
        let name = question.final_name();
        if reserved(name) {
            continue;
        }
        if present.contains(name) {
            types.entry(name.to_string()).or_insert(question.question_type);
        } else {
            report.missing_questions.insert(name.to_string());
        }
    }

    let declared_raw: BTreeSet<&str> = metadata
        .questions
        .iter()
        .map(|q| q.variable.as_str())
        .collect();
    report.unclassified_columns = present
        .iter()
        .copied()
        .filter(|&column| {
            !reserved(column)
                && !types.contains_key(column)
                && !config.is_dimension(column)
                && !declared_raw.contains(column)
        })
        .map(str::to_string)
        .collect();

    if types.is_empty() {
        return Err(TransformError::NoQuestions);
    }

    if report.has_drift() {
        warn!(
            missing_questions = report.missing_questions.len(),
            unclassified = report.unclassified_columns.len(),
            missing_dimensions = ?report.missing_dimensions,
            skipped_renames = report.skipped_renames.len(),
            "schema drift detected"
        );
    }
    let classification = QuestionClassification::new(types);
    debug!(
        questions = classification.len(),
        select_one = classification.select_one().len(),
        select_all = classification.select_all().len(),
        numeric = classification.numeric_input().len(),
        "classified questions"
    );

    Ok(WaveSchema {
        classification,
        dimensions,
        report,
    })
}
