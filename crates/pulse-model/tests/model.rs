//! Model values as other crates and reports see them.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use pulse_model::{
    NumericBin, NumericBins, QuestionType, SchemaReport, Wave, WaveCalendar, WeightType,
};

#[test]
fn schema_report_serializes_as_sets() {
    let report = SchemaReport {
        missing_questions: BTreeSet::from(["WRKLOSS".to_string()]),
        unclassified_columns: BTreeSet::from(["ABIRTH_YEAR".to_string(), "AGENDER".to_string()]),
        ..SchemaReport::default()
    };
    assert!(report.has_drift());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "missing_questions": ["WRKLOSS"],
            "unclassified_columns": ["ABIRTH_YEAR", "AGENDER"],
            "missing_dimensions": [],
            "skipped_renames": []
        })
    );
    assert!(!SchemaReport::default().has_drift());
}

#[test]
fn question_type_labels_parse_back() {
    for question_type in [
        QuestionType::SelectOne,
        QuestionType::SelectAll,
        QuestionType::YesNo,
        QuestionType::NumericInput,
    ] {
        assert_eq!(question_type.label().parse::<QuestionType>().unwrap(), question_type);
    }
    assert!("Free text".parse::<QuestionType>().is_err());
}

#[test]
fn calendar_orders_waves() {
    let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
    let calendar = WaveCalendar::new([
        Wave::new(22, d(2021, 1, 6), d(2021, 1, 18)),
        Wave::new(1, d(2020, 4, 23), d(2020, 5, 5)),
    ]);
    assert_eq!(calendar.week_range(), Some((1, 22)));
    assert_eq!(calendar.weeks().collect::<Vec<_>>(), vec![1, 22]);

    let wave = calendar.get(22).unwrap();
    assert_eq!(wave.year(), 2021);
    assert_eq!(wave.week_str(), "22");
    assert!(wave.end_ordinal() > calendar.get(1).unwrap().end_ordinal());
}

#[test]
fn bins_are_half_open() {
    let bins = NumericBins::new(vec![
        NumericBin::new("TBIRTH_YEAR", 18.0, 25.0, 1, "18 - 24"),
        NumericBin::new("TBIRTH_YEAR", 25.0, 40.0, 2, "25 - 39"),
    ])
    .unwrap();
    assert_eq!(bins.locate("TBIRTH_YEAR", 24.99).map(|b| b.code), Some(1));
    assert_eq!(bins.locate("TBIRTH_YEAR", 25.0).map(|b| b.code), Some(2));
    assert!(bins.locate("TBIRTH_YEAR", 40.0).is_none());
    assert!(bins.locate("TNUM_PS", 1.0).is_none());
}

#[test]
fn weight_columns_follow_census_naming() {
    let person = WeightType::ALL[0];
    assert_eq!(person.primary_column(), "PWEIGHT");
    let replicates = person.replicate_columns();
    assert_eq!(replicates.len(), 80);
    assert_eq!(replicates[0], "PWEIGHT1");
    assert_eq!(replicates[79], "PWEIGHT80");
}
