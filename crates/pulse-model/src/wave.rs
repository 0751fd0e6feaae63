//! Survey waves and the collection calendar.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One weekly release of the survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub publication_date: Option<NaiveDate>,
}

impl Wave {
    pub fn new(week: u32, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            week,
            start_date,
            end_date,
            publication_date: None,
        }
    }

    /// Calendar year the collection window closed in.
    pub fn year(&self) -> i32 {
        self.end_date.year()
    }

    /// Zero-padded week label used in file names.
    pub fn week_str(&self) -> String {
        format!("{:02}", self.week)
    }

    /// "start to end" label shown next to published values.
    pub fn date_range_label(&self) -> String {
        format!("{} to {}", self.start_date, self.end_date)
    }

    /// End date as a day count, the x-axis for smoothing.
    pub fn end_ordinal(&self) -> f64 {
        f64::from(self.end_date.num_days_from_ce())
    }
}

/// All known waves keyed by week.
#[derive(Debug, Clone, Default)]
pub struct WaveCalendar {
    waves: BTreeMap<u32, Wave>,
}

impl WaveCalendar {
    pub fn new(waves: impl IntoIterator<Item = Wave>) -> Self {
        Self {
            waves: waves.into_iter().map(|w| (w.week, w)).collect(),
        }
    }

    pub fn get(&self, week: u32) -> Option<&Wave> {
        self.waves.get(&week)
    }

    pub fn weeks(&self) -> impl Iterator<Item = u32> + '_ {
        self.waves.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wave> {
        self.waves.values()
    }

    /// First and last week, if the calendar is not empty.
    pub fn week_range(&self) -> Option<(u32, u32)> {
        let first = *self.waves.keys().next()?;
        let last = *self.waves.keys().next_back()?;
        Some((first, last))
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_wave_labels() {
        let wave = Wave::new(7, date(2020, 6, 11), date(2020, 6, 16));
        assert_eq!(wave.year(), 2020);
        assert_eq!(wave.week_str(), "07");
        assert_eq!(wave.date_range_label(), "2020-06-11 to 2020-06-16");
    }

    #[test]
    fn test_calendar_range() {
        let calendar = WaveCalendar::new(vec![
            Wave::new(3, date(2020, 5, 7), date(2020, 5, 12)),
            Wave::new(1, date(2020, 4, 23), date(2020, 5, 5)),
        ]);
        assert_eq!(calendar.week_range(), Some((1, 3)));
        assert_eq!(calendar.weeks().collect::<Vec<_>>(), vec![1, 3]);
        assert!(WaveCalendar::default().week_range().is_none());
    }
}
