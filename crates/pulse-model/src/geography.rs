use std::collections::HashMap;

/// Metro-area (CBSA FIPS) code to display title.
#[derive(Debug, Clone, Default)]
pub struct GeographyCrosswalk {
    titles: HashMap<i64, String>,
}

impl GeographyCrosswalk {
    /// Builds the crosswalk; the first title seen for a code wins.
    pub fn new(rows: impl IntoIterator<Item = (i64, String)>) -> Self {
        let mut titles = HashMap::new();
        for (code, title) in rows {
            titles.entry(code).or_insert(title);
        }
        Self { titles }
    }

    pub fn title(&self, code: i64) -> Option<&str> {
        self.titles.get(&code).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.titles.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
