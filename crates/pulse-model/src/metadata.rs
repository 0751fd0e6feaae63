//! The metadata tables consumed by a pipeline run.

use std::collections::{BTreeMap, BTreeSet};

use crate::geography::GeographyCrosswalk;
use crate::numeric::NumericBins;
use crate::question::QuestionVariable;
use crate::recode::RecodeTable;

/// Question, response, numeric-bin and geography metadata for a run.
#[derive(Debug, Clone, Default)]
pub struct SurveyMetadata {
    pub questions: Vec<QuestionVariable>,
    pub responses: RecodeTable,
    pub bins: NumericBins,
    pub geography: GeographyCrosswalk,
}

impl SurveyMetadata {
    pub fn new(
        questions: Vec<QuestionVariable>,
        responses: RecodeTable,
        bins: NumericBins,
        geography: GeographyCrosswalk,
    ) -> Self {
        Self {
            questions,
            responses,
            bins,
            geography,
        }
    }

    /// Raw name to canonical name for every renamed variable.
    pub fn rename_map(&self) -> BTreeMap<&str, &str> {
        self.questions
            .iter()
            .filter_map(|q| {
                q.variable_recode
                    .as_deref()
                    .filter(|r| *r != q.variable)
                    .map(|r| (q.variable.as_str(), r))
            })
            .collect()
    }

    /// Canonical names of every declared question.
    pub fn declared_questions(&self) -> BTreeSet<&str> {
        self.questions.iter().map(QuestionVariable::final_name).collect()
    }

    /// First question row whose canonical name matches.
    pub fn question(&self, final_name: &str) -> Option<&QuestionVariable> {
        self.questions.iter().find(|q| q.final_name() == final_name)
    }

    /// Published question groups with their canonical member variables.
    pub fn question_groups(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for question in self.questions.iter().filter(|q| q.is_published()) {
            groups
                .entry(question.group_name())
                .or_default()
                .insert(question.final_name());
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::QuestionType;

    #[test]
    fn test_rename_map_skips_identity() {
        let meta = SurveyMetadata {
            questions: vec![
                QuestionVariable::new("EGENDER", QuestionType::SelectOne)
                    .with_recode("EGENDER_EGENID_BIRTH"),
                QuestionVariable::new("ANXIOUS", QuestionType::SelectOne).with_recode("ANXIOUS"),
            ],
            ..SurveyMetadata::default()
        };
        let map = meta.rename_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("EGENDER"), Some(&"EGENDER_EGENID_BIRTH"));
    }

    #[test]
    fn test_groups_exclude_unpublished() {
        let mut dropped = QuestionVariable::new("OLD", QuestionType::SelectOne).with_group("G");
        dropped.drop_question = true;
        let meta = SurveyMetadata {
            questions: vec![
                QuestionVariable::new("A", QuestionType::SelectAll).with_group("G"),
                QuestionVariable::new("B", QuestionType::SelectAll).with_group("G"),
                dropped,
            ],
            ..SurveyMetadata::default()
        };
        let groups = meta.question_groups();
        assert_eq!(groups["G"].iter().copied().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
