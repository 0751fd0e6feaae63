//! Question metadata and response-type classification.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{NON_RESPONSE, SKIPPED};
use crate::error::ModelError;

/// Response semantics of a survey question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    SelectOne,
    SelectAll,
    YesNo,
    NumericInput,
}

impl QuestionType {
    /// Label used by the question-mapping sheet.
    pub fn label(self) -> &'static str {
        match self {
            Self::SelectOne => "Select one",
            Self::SelectAll => "Select all",
            Self::YesNo => "Yes / No",
            Self::NumericInput => "Input value",
        }
    }

    /// Response codes that mean "no answer" for this question type.
    ///
    /// Select-all items only drop -88 ("not shown"); -99 on a select-all item
    /// carries its own meaning and is tabulated.
    pub fn dropped_codes(self) -> &'static [i64] {
        match self {
            Self::SelectAll => &[SKIPPED],
            Self::SelectOne | Self::YesNo | Self::NumericInput => &[SKIPPED, NON_RESPONSE],
        }
    }

    /// Whether a response value should be removed before aggregation.
    pub fn drops(self, value: i64) -> bool {
        self.dropped_codes().contains(&value)
    }
}

impl FromStr for QuestionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "selectone" => Ok(Self::SelectOne),
            "selectall" => Ok(Self::SelectAll),
            "yesno" => Ok(Self::YesNo),
            "inputvalue" | "numeric" | "numericinput" => Ok(Self::NumericInput),
            _ => Err(ModelError::UnknownQuestionType(s.to_string())),
        }
    }
}

/// One row of the question-mapping table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionVariable {
    /// Raw variable name as published by the Census for some wave.
    pub variable: String,
    /// Canonical name when the variable was renamed across waves.
    pub variable_recode: Option<String>,
    pub question_type: QuestionType,
    pub variable_group: Option<String>,
    pub variable_group_recode: Option<String>,
    pub question: Option<String>,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
    pub exclude: bool,
    pub drop_question: bool,
}

impl QuestionVariable {
    pub fn new(variable: impl Into<String>, question_type: QuestionType) -> Self {
        Self {
            variable: variable.into(),
            variable_recode: None,
            question_type,
            variable_group: None,
            variable_group_recode: None,
            question: None,
            topic: None,
            subtopic: None,
            exclude: false,
            drop_question: false,
        }
    }

    pub fn with_recode(mut self, recode: impl Into<String>) -> Self {
        self.variable_recode = Some(recode.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.variable_group = Some(group.into());
        self
    }

    /// The name this variable carries after coalescing.
    pub fn final_name(&self) -> &str {
        self.variable_recode.as_deref().unwrap_or(&self.variable)
    }

    /// Group used to bundle related variables in published artifacts.
    pub fn group_name(&self) -> &str {
        self.variable_group_recode
            .as_deref()
            .or(self.variable_group.as_deref())
            .unwrap_or_else(|| self.final_name())
    }

    /// Whether the question is meant to be published.
    pub fn is_published(&self) -> bool {
        !self.exclude && !self.drop_question
    }
}
