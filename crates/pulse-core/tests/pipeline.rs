//! Batch runs over small synthetic waves.

use std::collections::HashMap;

use chrono::NaiveDate;
use polars::prelude::*;
use pulse_common::{column_f64, column_i64, column_strings};
use pulse_core::{
    AggregateStore, BoxError, BatchRunner, MemoryStore, WaveError, WaveOutcome, WaveSource,
    build_default_pipeline, smooth_store,
};
use pulse_model::{
    GeographyCrosswalk, NumericBin, NumericBins, PipelineConfig, QuestionType, QuestionVariable,
    RecodeTable, ResponseRecoding, SurveyMetadata, Wave, WaveCalendar,
};

struct FixedSource {
    waves: HashMap<u32, DataFrame>,
}

impl WaveSource for FixedSource {
    fn available_weeks(&self) -> Result<Vec<u32>, BoxError> {
        let mut weeks: Vec<u32> = self.waves.keys().copied().collect();
        weeks.sort_unstable();
        Ok(weeks)
    }

    fn load_wave(&self, week: u32) -> Result<DataFrame, BoxError> {
        self.waves
            .get(&week)
            .cloned()
            .ok_or_else(|| format!("no file for week {week}").into())
    }
}

fn metadata() -> SurveyMetadata {
    SurveyMetadata::new(
        vec![
            QuestionVariable::new("ANXIOUS", QuestionType::SelectOne),
            QuestionVariable::new("DELAY1", QuestionType::SelectAll),
        ],
        RecodeTable::new(vec![ResponseRecoding::new("ANXIOUS", 4).recoded_to(3)]),
        NumericBins::new(vec![
            NumericBin::new("TBIRTH_YEAR", 18.0, 45.0, 1, "18 - 44"),
            NumericBin::new("TBIRTH_YEAR", 45.0, 130.0, 2, "45+"),
        ])
        .unwrap(),
        GeographyCrosswalk::new([(35620, "New York-Newark-Jersey City".to_string())]),
    )
}

fn calendar() -> WaveCalendar {
    let date = |m, d| NaiveDate::from_ymd_opt(2022, m, d).unwrap();
    WaveCalendar::new([
        Wave::new(41, date(1, 26), date(2, 7)),
        Wave::new(42, date(3, 2), date(3, 14)),
        Wave::new(43, date(3, 30), date(4, 11)),
    ])
}

/// Four respondents; `replicates` controls how many replicate columns exist.
fn wave(week: i64, replicates: usize) -> DataFrame {
    let mut columns = vec![
        Column::new("SCRAM".into(), ["A", "B", "C", "D"]),
        Column::new("WEEK".into(), [week; 4]),
        Column::new("TBIRTH_YEAR".into(), [1990i64, 1960, 1985, 1950]),
        Column::new("RRACE".into(), [1i64, 2, 1, 3]),
        Column::new("RHISPANIC".into(), [1i64, 1, 2, 1]),
        Column::new("EEDUC".into(), [3i64, -99, 3, 6]),
        Column::new("EST_MSA".into(), [Some(35620i64), None, Some(35620), Some(31080)]),
        Column::new("INCOME".into(), [1i64, 2, 3, -99]),
        Column::new("EGENDER_EGENID_BIRTH".into(), [1i64, 2, 2, 1]),
        Column::new("ANXIOUS".into(), [Some(1i64), Some(4), Some(-99), Some(2)]),
        Column::new("DELAY1".into(), [1i64, -99, -88, 1]),
    ];
    for (prefix, base) in [("PWEIGHT", [100.0, 300.0, 200.0, 50.0]), ("HWEIGHT", [40.0; 4])] {
        columns.push(Column::new(prefix.into(), base));
        for r in 1..=replicates {
            let scale = if r % 2 == 0 { 1.1 } else { 0.9 };
            let values: Vec<f64> = base.iter().map(|b| b * scale).collect();
            columns.push(Column::new(format!("{prefix}{r}").into(), values));
        }
    }
    DataFrame::new(columns).unwrap()
}

#[test]
fn batch_isolates_failing_waves() {
    let source = FixedSource {
        waves: HashMap::from([(41, wave(41, 80)), (42, wave(42, 79)), (43, wave(43, 80))]),
    };
    let store = MemoryStore::new();
    let (metadata, calendar, config) = (metadata(), calendar(), PipelineConfig::default());
    let pipeline = build_default_pipeline();
    let runner = BatchRunner::new(&pipeline, &metadata, &calendar, &config);

    let mut seen = Vec::new();
    let weeks = source.available_weeks().unwrap();
    let report = runner.run(&weeks, &source, &store, |o| seen.push(o.week()));

    assert_eq!(seen, vec![41, 42, 43]);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    let (week, error) = report.failures().next().unwrap();
    assert_eq!(week, 42);
    assert!(matches!(error, WaveError::Aggregate(_)));
    assert_eq!(store.stored_weeks().unwrap(), vec![41, 43]);
}

#[test]
fn wave_output_has_published_layout() {
    let source = FixedSource {
        waves: HashMap::from([(41, wave(41, 80))]),
    };
    let store = MemoryStore::new();
    let (metadata, calendar, config) = (metadata(), calendar(), PipelineConfig::default());
    let pipeline = build_default_pipeline();
    let runner = BatchRunner::new(&pipeline, &metadata, &calendar, &config);

    let outcome = runner.run_wave(41, &source, &store).unwrap();
    match &outcome {
        WaveOutcome::Succeeded { report, .. } => {
            assert!(report.missing_dimensions.is_empty());
        }
        WaveOutcome::Failed { error, .. } => panic!("wave failed: {error}"),
    }

    let cells = store.wave(41).unwrap();
    let names: Vec<&str> = cells.get_column_names().iter().map(|c| c.as_str()).collect();
    assert_eq!(&names[..6], &["week", "xtab_var", "xtab_val", "cbsa_title", "q_var", "q_val"]);
    assert_eq!(names.len(), 20);

    // D has a sentinel income and never reaches aggregation; C's ANXIOUS is -99
    let topline = cells
        .clone()
        .lazy()
        .filter(
            col("xtab_var")
                .eq(lit("TOPLINE"))
                .and(col("q_var").eq(lit("ANXIOUS"))),
        )
        .collect()
        .unwrap();
    assert_eq!(column_i64(&topline, "q_val").unwrap(), vec![Some(1), Some(3)]);
    assert_eq!(
        column_f64(&topline, "pweight_share").unwrap(),
        vec![Some(0.25), Some(0.75)]
    );

    // B's education is -99: no EEDUC cell for it, while B still counts above
    let education = cells
        .clone()
        .lazy()
        .filter(col("xtab_var").eq(lit("EEDUC")))
        .collect()
        .unwrap();
    let education_values = column_i64(&education, "xtab_val").unwrap();
    assert!(!education_values.is_empty());
    assert!(education_values.iter().all(|v| *v == Some(3)));

    // select-all keeps -99 but drops -88
    let delay = cells
        .clone()
        .lazy()
        .filter(
            col("xtab_var")
                .eq(lit("TOPLINE"))
                .and(col("q_var").eq(lit("DELAY1"))),
        )
        .collect()
        .unwrap();
    assert_eq!(column_i64(&delay, "q_val").unwrap(), vec![Some(-99), Some(1)]);

    let metro = cells
        .clone()
        .lazy()
        .filter(col("xtab_var").eq(lit("EST_MSA")))
        .collect()
        .unwrap();
    assert!(
        column_strings(&metro, "cbsa_title")
            .unwrap()
            .iter()
            .all(|t| t.as_deref() == Some("New York-Newark-Jersey City"))
    );

    let races: Vec<Option<i64>> = column_i64(
        &cells
            .clone()
            .lazy()
            .filter(col("xtab_var").eq(lit("RRACE")))
            .collect()
            .unwrap(),
        "xtab_val",
    )
    .unwrap();
    assert!(races.contains(&Some(5)));
}

#[test]
fn smoothing_covers_every_stored_row() {
    let source = FixedSource {
        waves: HashMap::from([(41, wave(41, 80)), (42, wave(42, 80)), (43, wave(43, 80))]),
    };
    let store = MemoryStore::new();
    let (metadata, calendar, config) = (metadata(), calendar(), PipelineConfig::default());
    let pipeline = build_default_pipeline();
    let runner = BatchRunner::new(&pipeline, &metadata, &calendar, &config);
    let report = runner.run(&[41, 42, 43], &source, &store, |_| {});
    assert_eq!(report.succeeded(), 3);

    let smoothed = smooth_store(&store, &calendar, &config, |_, _| {}).unwrap();
    assert_eq!(smoothed.height(), store.load_cells().unwrap().height());
    assert!(store.load_smoothed().unwrap().is_some());
}

#[test]
fn unknown_week_fails_only_that_wave() {
    let source = FixedSource {
        waves: HashMap::from([(41, wave(41, 80)), (50, wave(50, 80))]),
    };
    let store = MemoryStore::new();
    let (metadata, calendar, config) = (metadata(), calendar(), PipelineConfig::default());
    let pipeline = build_default_pipeline();
    let runner = BatchRunner::new(&pipeline, &metadata, &calendar, &config);
    let report = runner.run(&[41, 50], &source, &store, |_| {});
    assert_eq!(report.succeeded(), 1);
    assert!(matches!(
        report.failures().next(),
        Some((50, WaveError::UnknownWeek(50)))
    ));
}
