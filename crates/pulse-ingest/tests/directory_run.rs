//! A full run over metadata and wave files on disk.

use std::path::Path;

use polars::prelude::*;
use pulse_core::{AggregateStore, BatchRunner, WaveSource, build_default_pipeline, smooth_store};
use pulse_ingest::{
    CALENDAR_FILE, DirectorySource, DirectoryStore, load_calendar, load_metadata,
    wave_file_name, write_csv_atomic,
};
use pulse_model::PipelineConfig;
use tempfile::tempdir;

fn write_metadata(dir: &Path) {
    let files = [
        (
            "question_mapping.csv",
            "variable,variable_recode,question_type\n\
             ANXIOUS,,Select one\n\
             WORRYRV,WORRY,Select one\n",
        ),
        (
            "response_mapping.csv",
            "variable,variable_recode,value,value_recode,label,label_recode\n\
             ANXIOUS,,1,,Not at all,\n\
             ANXIOUS,,2,,Several days,\n\
             WORRYRV,WORRY,1,,Not at all,\n\
             WORRYRV,WORRY,2,,Several days,\n",
        ),
        (
            "numeric_mapping.csv",
            "variable,min_value,max_value,bin,label\n\
             TBIRTH_YEAR,18,44,1,18 - 44\n\
             TBIRTH_YEAR,45,120,2,45+\n",
        ),
        (
            "county_metro_state.csv",
            "county_fips,cbsa_fips,cbsa_title\n36061,35620,New York-Newark-Jersey City\n",
        ),
        (
            CALENDAR_FILE,
            "week,start_date,end_date\n\
             41,2022-01-26,2022-02-07\n\
             42,2022-03-02,2022-03-14\n",
        ),
    ];
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
}

fn wave(week: i64) -> DataFrame {
    let mut columns = vec![
        Column::new("SCRAM".into(), ["A", "B", "C"]),
        Column::new("WEEK".into(), [week; 3]),
        Column::new("TBIRTH_YEAR".into(), [1990i64, 1960, 1980]),
        Column::new("RRACE".into(), [1i64, 2, 1]),
        Column::new("RHISPANIC".into(), [1i64, 1, 1]),
        Column::new("EEDUC".into(), [3i64, 4, 5]),
        Column::new("EST_MSA".into(), [35620i64, 35620, 35620]),
        Column::new("INCOME".into(), [1i64, 2, 3]),
        Column::new("EGENDER_EGENID_BIRTH".into(), [1i64, 2, 1]),
        Column::new("ANXIOUS".into(), [1i64, 2, 2]),
        Column::new("WORRYRV".into(), [1i64, 1, 2]),
    ];
    for prefix in ["PWEIGHT", "HWEIGHT"] {
        columns.push(Column::new(prefix.into(), [10.0, 20.0, 30.0]));
        for r in 1..=80 {
            columns.push(Column::new(format!("{prefix}{r}").into(), [11.0, 19.0, 30.5]));
        }
    }
    DataFrame::new(columns).unwrap()
}

#[test]
fn aggregates_and_smooths_from_disk() {
    let root = tempdir().unwrap();
    let meta_dir = root.path().join("metadata");
    let raw_dir = root.path().join("raw");
    std::fs::create_dir_all(&meta_dir).unwrap();
    write_metadata(&meta_dir);
    for week in [41, 42] {
        write_csv_atomic(&raw_dir.join(wave_file_name(week)), &wave(i64::from(week))).unwrap();
    }

    let metadata = load_metadata(&meta_dir).unwrap();
    let calendar = load_calendar(&meta_dir.join(CALENDAR_FILE)).unwrap();
    let config = PipelineConfig::default();
    let source = DirectorySource::new(&raw_dir);
    let store = DirectoryStore::new(root.path().join("processed")).unwrap();
    let pipeline = build_default_pipeline();
    let runner = BatchRunner::new(&pipeline, &metadata, &calendar, &config);

    let weeks = source.available_weeks().unwrap();
    assert_eq!(weeks, vec![41, 42]);
    let report = runner.run(&weeks, &source, &store, |_| {});
    assert_eq!(report.failed(), 0);
    assert_eq!(store.stored_weeks().unwrap(), vec![41, 42]);

    // renamed question shows up under its canonical name
    let cells = store.load_cells().unwrap();
    let q_vars = cells.column("q_var").unwrap().str().unwrap().clone();
    assert!(q_vars.into_iter().any(|q| q == Some("WORRY")));
    assert!(!cells.column("q_var").unwrap().str().unwrap().into_iter().any(|q| q == Some("WORRYRV")));

    let smoothed = smooth_store(&store, &calendar, &config, |_, _| {}).unwrap();
    assert_eq!(smoothed.height(), cells.height());
    let reloaded = store.load_smoothed().unwrap().unwrap();
    assert_eq!(reloaded.height(), smoothed.height());
}
