//! Per-wave schema reconciliation results.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::question::QuestionType;

/// Difference between the declared metadata and the columns of one wave.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    /// Declared questions not present this wave.
    pub missing_questions: BTreeSet<String>,
    /// Columns present this wave that no metadata row describes.
    pub unclassified_columns: BTreeSet<String>,
    /// Configured crosstab dimensions not present this wave.
    pub missing_dimensions: BTreeSet<String>,
    /// Renames skipped because the canonical name already existed.
    pub skipped_renames: BTreeSet<String>,
}

impl SchemaReport {
    pub fn has_drift(&self) -> bool {
        !(self.missing_questions.is_empty()
            && self.unclassified_columns.is_empty()
            && self.missing_dimensions.is_empty()
            && self.skipped_renames.is_empty())
    }
}

/// Questions of one wave grouped by response type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionClassification {
    types: BTreeMap<String, QuestionType>,
}

impl QuestionClassification {
    pub fn new(types: BTreeMap<String, QuestionType>) -> Self {
        Self { types }
    }

    pub fn question_type(&self, variable: &str) -> Option<QuestionType> {
        self.types.get(variable).copied()
    }

    /// Every classified question, in name order.
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn of_type(&self, question_type: QuestionType) -> Vec<&str> {
        self.types
            .iter()
            .filter(|(_, t)| **t == question_type)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Select-one and yes/no questions.
    pub fn select_one(&self) -> Vec<&str> {
        self.types
            .iter()
            .filter(|(_, t)| matches!(t, QuestionType::SelectOne | QuestionType::YesNo))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn select_all(&self) -> Vec<&str> {
        self.of_type(QuestionType::SelectAll)
    }

    pub fn numeric_input(&self) -> Vec<&str> {
        self.of_type(QuestionType::NumericInput)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
