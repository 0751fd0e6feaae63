//! Weight types and their column naming.

use serde::{Deserialize, Serialize};

use crate::constants::REPLICATE_COUNT;

/// The two survey weight families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightType {
    Person,
    Household,
}

impl WeightType {
    pub const ALL: [WeightType; 2] = [WeightType::Person, WeightType::Household];

    /// Primary weight column in the raw microdata.
    pub fn primary_column(self) -> &'static str {
        match self {
            Self::Person => "PWEIGHT",
            Self::Household => "HWEIGHT",
        }
    }

    /// `PWEIGHT1..=PWEIGHT80` (or the household equivalent).
    pub fn replicate_columns(self) -> Vec<String> {
        (1..=REPLICATE_COUNT)
            .map(|r| format!("{}{r}", self.primary_column()))
            .collect()
    }

    /// Primary followed by all replicates.
    pub fn all_columns(self) -> Vec<String> {
        let mut columns = Vec::with_capacity(REPLICATE_COUNT + 1);
        columns.push(self.primary_column().to_string());
        columns.extend(self.replicate_columns());
        columns
    }

    /// Lowercase prefix used by output columns.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Person => "pweight",
            Self::Household => "hweight",
        }
    }

    pub fn value_column(self) -> String {
        self.prefix().to_string()
    }

    pub fn se_column(self) -> String {
        format!("{}_se", self.prefix())
    }

    pub fn lower_column(self) -> String {
        format!("{}_lower", self.prefix())
    }

    pub fn upper_column(self) -> String {
        format!("{}_upper", self.prefix())
    }

    pub fn share_column(self) -> String {
        format!("{}_share", self.prefix())
    }

    pub fn lower_share_column(self) -> String {
        format!("{}_lower_share", self.prefix())
    }

    pub fn upper_share_column(self) -> String {
        format!("{}_upper_share", self.prefix())
    }

    /// All seven output columns in publication order.
    pub fn output_columns(self) -> [String; 7] {
        [
            self.value_column(),
            self.se_column(),
            self.lower_column(),
            self.upper_column(),
            self.share_column(),
            self.lower_share_column(),
            self.upper_share_column(),
        ]
    }
}
