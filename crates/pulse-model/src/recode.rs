//! Canonical response recoding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One row of the response-mapping table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecoding {
    /// Variable name (already coalesced) the code belongs to.
    pub variable: String,
    pub value: i64,
    pub value_recode: Option<i64>,
    pub label: Option<String>,
    pub label_recode: Option<String>,
}

impl ResponseRecoding {
    pub fn new(variable: impl Into<String>, value: i64) -> Self {
        Self {
            variable: variable.into(),
            value,
            value_recode: None,
            label: None,
            label_recode: None,
        }
    }

    pub fn recoded_to(mut self, value: i64) -> Self {
        self.value_recode = Some(value);
        self
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn canonical_value(&self) -> i64 {
        self.value_recode.unwrap_or(self.value)
    }

    pub fn canonical_label(&self) -> Option<&str> {
        self.label_recode
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.label.as_deref())
    }
}

/// Lookup table from (variable, raw value) to its recoding row.
///
/// Duplicate (variable, value) rows keep the first occurrence.
#[derive(Debug, Clone, Default)]
pub struct RecodeTable {
    entries: Vec<ResponseRecoding>,
    index: HashMap<(String, i64), usize>,
}

impl RecodeTable {
    pub fn new(entries: Vec<ResponseRecoding>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            index
                .entry((entry.variable.clone(), entry.value))
                .or_insert(pos);
        }
        Self { entries, index }
    }

    pub fn get(&self, variable: &str, value: i64) -> Option<&ResponseRecoding> {
        self.index
            .get(&(variable.to_string(), value))
            .map(|&pos| &self.entries[pos])
    }

    /// Canonical code for a response; unmatched pairs keep their value.
    pub fn canonical(&self, variable: &str, value: i64) -> i64 {
        self.get(variable, value)
            .map_or(value, ResponseRecoding::canonical_value)
    }

    /// Raw-to-canonical map for a single variable.
    pub fn value_map(&self, variable: &str) -> HashMap<i64, i64> {
        self.entries
            .iter()
            .filter(|e| e.variable == variable)
            .map(|e| (e.value, e.canonical_value()))
            .fold(HashMap::new(), |mut map, (from, to)| {
                map.entry(from).or_insert(to);
                map
            })
    }

    pub fn entries(&self) -> &[ResponseRecoding] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_values_are_kept() {
        let table = RecodeTable::new(vec![ResponseRecoding::new("ANXIOUS", 3).recoded_to(2)]);
        assert_eq!(table.canonical("ANXIOUS", 3), 2);
        assert_eq!(table.canonical("ANXIOUS", 1), 1);
        assert_eq!(table.canonical("WORRY", 3), 3);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let table = RecodeTable::new(vec![
            ResponseRecoding::new("X", 1).recoded_to(10),
            ResponseRecoding::new("X", 1).recoded_to(20),
        ]);
        assert_eq!(table.canonical("X", 1), 10);
        assert_eq!(table.value_map("X").get(&1), Some(&10));
    }
}
