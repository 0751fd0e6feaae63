//! Metadata table loading.
//!
//! Every table is a plain CSV with one header row. Required columns must be
//! present; optional columns may be absent entirely or left blank per row.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame};
use pulse_common::{any_to_string, parse_f64, parse_i64};
use pulse_model::{
    GeographyCrosswalk, NumericBin, NumericBins, QuestionType, QuestionVariable, RecodeTable,
    ResponseRecoding, SurveyMetadata, Wave, WaveCalendar,
};
use tracing::{info, warn};

use crate::csv::read_csv_table;
use crate::error::{IngestError, Result};

pub const QUESTION_MAPPING_FILE: &str = "question_mapping.csv";
pub const RESPONSE_MAPPING_FILE: &str = "response_mapping.csv";
pub const NUMERIC_MAPPING_FILE: &str = "numeric_mapping.csv";
pub const GEOGRAPHY_FILE: &str = "county_metro_state.csv";
pub const CALENDAR_FILE: &str = "collection_dates.csv";

/// A loaded metadata table with per-cell string access.
struct MetadataTable {
    df: DataFrame,
    path: PathBuf,
}

impl MetadataTable {
    fn read(path: &Path) -> Result<Self> {
        Ok(Self {
            df: read_csv_table(path)?,
            path: path.to_path_buf(),
        })
    }

    fn height(&self) -> usize {
        self.df.height()
    }

    fn required(&self, name: &str) -> Result<&Column> {
        self.df
            .column(name)
            .map_err(|_| IngestError::MissingColumn {
                column: name.to_string(),
                path: self.path.clone(),
            })
    }

    fn optional(&self, name: &str) -> Option<&Column> {
        self.df.column(name).ok()
    }

    fn invalid(&self, field: &str, value: String) -> IngestError {
        IngestError::InvalidValue {
            field: field.to_string(),
            value,
            path: self.path.clone(),
        }
    }
}

/// Trimmed cell text; blank cells give `None`.
fn cell(column: Option<&Column>, row: usize) -> Result<Option<String>> {
    let Some(column) = column else {
        return Ok(None);
    };
    let text = any_to_string(column.get(row)?);
    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let lower = v.to_ascii_lowercase();
        lower == "true" || lower == "yes" || lower == "y" || lower == "1"
    })
}

/// Loads all survey metadata from a metadata directory.
pub fn load_metadata(dir: &Path) -> Result<SurveyMetadata> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let metadata = SurveyMetadata::new(
        load_question_mapping(&dir.join(QUESTION_MAPPING_FILE))?,
        load_response_mapping(&dir.join(RESPONSE_MAPPING_FILE))?,
        load_numeric_mapping(&dir.join(NUMERIC_MAPPING_FILE))?,
        load_geography(&dir.join(GEOGRAPHY_FILE))?,
    );
    info!(
        questions = metadata.questions.len(),
        responses = metadata.responses.entries().len(),
        metros = metadata.geography.len(),
        "loaded survey metadata"
    );
    Ok(metadata)
}

/// Loads `question_mapping.csv`.
///
/// Rows with an unrecognised question type are skipped with a warning.
pub fn load_question_mapping(path: &Path) -> Result<Vec<QuestionVariable>> {
    let table = MetadataTable::read(path)?;
    let variable_col = table.required("variable")?;
    let type_col = table.required("question_type")?;
    let recode_col = table.optional("variable_recode");
    let group_col = table.optional("variable_group");
    let group_recode_col = table.optional("variable_group_recode");
    let question_col = table.optional("question");
    let topic_col = table.optional("topic");
    let subtopic_col = table.optional("subtopic");
    let exclude_col = table.optional("exclude");
    let drop_col = table.optional("drop_question");

    let mut questions = Vec::with_capacity(table.height());
    for row in 0..table.height() {
        let Some(variable) = cell(Some(variable_col), row)? else {
            continue;
        };
        let raw_type = cell(Some(type_col), row)?.unwrap_or_default();
        let Ok(question_type) = raw_type.parse::<QuestionType>() else {
            warn!(%variable, question_type = %raw_type, "skipping question with unknown type");
            continue;
        };

        let mut question = QuestionVariable::new(variable, question_type);
        question.variable_recode = cell(recode_col, row)?;
        question.variable_group = cell(group_col, row)?;
        question.variable_group_recode = cell(group_recode_col, row)?;
        question.question = cell(question_col, row)?;
        question.topic = cell(topic_col, row)?;
        question.subtopic = cell(subtopic_col, row)?;
        question.exclude = flag(cell(exclude_col, row)?.as_deref());
        question.drop_question = flag(cell(drop_col, row)?.as_deref());
        questions.push(question);
    }

    info!(count = questions.len(), path = %path.display(), "loaded question mapping");
    Ok(questions)
}

/// Loads `response_mapping.csv`.
///
/// The variable a code belongs to is `variable_recode` when filled and
/// `variable` otherwise, so codes are keyed by coalesced name.
pub fn load_response_mapping(path: &Path) -> Result<RecodeTable> {
    let table = MetadataTable::read(path)?;
    let variable_col = table.required("variable")?;
    let value_col = table.required("value")?;
    let variable_recode_col = table.optional("variable_recode");
    let value_recode_col = table.optional("value_recode");
    let label_col = table.optional("label");
    let label_recode_col = table.optional("label_recode");

    let mut entries = Vec::with_capacity(table.height());
    for row in 0..table.height() {
        let variable = match cell(variable_recode_col, row)? {
            Some(recode) => recode,
            None => match cell(Some(variable_col), row)? {
                Some(variable) => variable,
                None => continue,
            },
        };
        let raw_value = cell(Some(value_col), row)?.unwrap_or_default();
        let value = parse_i64(&raw_value).ok_or_else(|| table.invalid("value", raw_value))?;

        let mut entry = ResponseRecoding::new(variable, value);
        if let Some(raw) = cell(value_recode_col, row)? {
            let recode = parse_i64(&raw).ok_or_else(|| table.invalid("value_recode", raw))?;
            entry = entry.recoded_to(recode);
        }
        entry.label = cell(label_col, row)?;
        entry.label_recode = cell(label_recode_col, row)?;
        entries.push(entry);
    }

    info!(count = entries.len(), path = %path.display(), "loaded response mapping");
    Ok(RecodeTable::new(entries))
}

/// Loads `numeric_mapping.csv`.
///
/// `max_value` is inclusive in the sheet; bins are half-open, so the upper
/// edge is `max_value + 1`.
pub fn load_numeric_mapping(path: &Path) -> Result<NumericBins> {
    let table = MetadataTable::read(path)?;
    let variable_col = table.required("variable")?;
    let min_col = table.required("min_value")?;
    let max_col = table.required("max_value")?;
    let bin_col = table.required("bin")?;
    let label_col = table.optional("label");

    let mut bins = Vec::with_capacity(table.height());
    for row in 0..table.height() {
        let Some(variable) = cell(Some(variable_col), row)? else {
            continue;
        };
        let raw_min = cell(Some(min_col), row)?.unwrap_or_default();
        let lower = parse_f64(&raw_min).ok_or_else(|| table.invalid("min_value", raw_min))?;
        let raw_max = cell(Some(max_col), row)?.unwrap_or_default();
        let max = parse_f64(&raw_max).ok_or_else(|| table.invalid("max_value", raw_max))?;
        let raw_bin = cell(Some(bin_col), row)?.unwrap_or_default();
        let code = parse_i64(&raw_bin).ok_or_else(|| table.invalid("bin", raw_bin))?;
        let label = cell(label_col, row)?.unwrap_or_default();
        bins.push(NumericBin::new(variable, lower, max + 1.0, code, label));
    }

    let count = bins.len();
    let bins = NumericBins::new(bins).map_err(|source| IngestError::Model {
        path: path.to_path_buf(),
        source,
    })?;
    info!(count, path = %path.display(), "loaded numeric bins");
    Ok(bins)
}

/// Loads the metro-area crosswalk from `county_metro_state.csv`.
///
/// The sheet has one row per county; rows without a CBSA code are skipped.
pub fn load_geography(path: &Path) -> Result<GeographyCrosswalk> {
    let table = MetadataTable::read(path)?;
    let fips_col = table.required("cbsa_fips")?;
    let title_col = table.required("cbsa_title")?;

    let mut rows = Vec::new();
    for row in 0..table.height() {
        let Some(raw_fips) = cell(Some(fips_col), row)? else {
            continue;
        };
        let code = parse_i64(&raw_fips).ok_or_else(|| table.invalid("cbsa_fips", raw_fips))?;
        let title = cell(Some(title_col), row)?.unwrap_or_default();
        rows.push((code, title));
    }

    let crosswalk = GeographyCrosswalk::new(rows);
    info!(metros = crosswalk.len(), path = %path.display(), "loaded geography crosswalk");
    Ok(crosswalk)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%m/%d/%Y"))
        .ok()
}

/// Loads the wave calendar from `collection_dates.csv`.
pub fn load_calendar(path: &Path) -> Result<WaveCalendar> {
    let table = MetadataTable::read(path)?;
    let week_col = table.required("week")?;
    let start_col = table.required("start_date")?;
    let end_col = table.required("end_date")?;

    let mut waves = Vec::with_capacity(table.height());
    for row in 0..table.height() {
        let Some(raw_week) = cell(Some(week_col), row)? else {
            continue;
        };
        let week = parse_i64(&raw_week)
            .and_then(|w| u32::try_from(w).ok())
            .ok_or_else(|| table.invalid("week", raw_week))?;
        let raw_start = cell(Some(start_col), row)?.unwrap_or_default();
        let start = parse_date(&raw_start).ok_or_else(|| table.invalid("start_date", raw_start))?;
        let raw_end = cell(Some(end_col), row)?.unwrap_or_default();
        let end = parse_date(&raw_end).ok_or_else(|| table.invalid("end_date", raw_end))?;
        if end < start {
            return Err(table.invalid("end_date", format!("{end} (before {start})")));
        }
        waves.push(Wave::new(week, start, end));
    }

    let calendar = WaveCalendar::new(waves);
    info!(waves = calendar.len(), path = %path.display(), "loaded wave calendar");
    Ok(calendar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_question_mapping() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            QUESTION_MAPPING_FILE,
            "variable,variable_recode,question_type,variable_group,exclude\n\
             ANXIOUS,,Select one,,\n\
             HLTHINS1,,Select all,HLTHINS,\n\
             WRKLOSS,WRKLOSSRV,Yes / No,,TRUE\n\
             TSPNDFOOD,,Free text,,\n",
        );
        let questions = load_question_mapping(&path).unwrap();

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[1].group_name(), "HLTHINS");
        assert_eq!(questions[2].final_name(), "WRKLOSSRV");
        assert_eq!(questions[2].question_type, QuestionType::YesNo);
        assert!(!questions[2].is_published());
    }

    #[test]
    fn test_response_mapping_keys_by_recoded_variable() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            RESPONSE_MAPPING_FILE,
            "variable,variable_recode,value,value_recode,label,label_recode\n\
             WRKLOSS,WRKLOSSRV,1,,Yes,\n\
             ANXIOUS,,4,3,Nearly every day,More than half the days\n",
        );
        let table = load_response_mapping(&path).unwrap();

        assert!(table.get("WRKLOSSRV", 1).is_some());
        assert!(table.get("WRKLOSS", 1).is_none());
        assert_eq!(table.canonical("ANXIOUS", 4), 3);
        assert_eq!(
            table.get("ANXIOUS", 4).unwrap().canonical_label(),
            Some("More than half the days")
        );
    }

    #[test]
    fn test_response_mapping_rejects_bad_value() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, RESPONSE_MAPPING_FILE, "variable,value\nANXIOUS,often\n");
        let result = load_response_mapping(&path);
        assert!(matches!(result, Err(IngestError::InvalidValue { ref field, .. }) if field == "value"));
    }

    #[test]
    fn test_numeric_mapping_upper_edge() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            NUMERIC_MAPPING_FILE,
            "variable,min_value,max_value,bin,label\n\
             TBIRTH_YEAR,18,24,1,18 - 24\n\
             TBIRTH_YEAR,25,39,2,25 - 39\n",
        );
        let bins = load_numeric_mapping(&path).unwrap();

        assert_eq!(bins.locate("TBIRTH_YEAR", 24.0).map(|b| b.code), Some(1));
        assert_eq!(bins.locate("TBIRTH_YEAR", 24.5).map(|b| b.code), Some(1));
        assert_eq!(bins.locate("TBIRTH_YEAR", 25.0).map(|b| b.code), Some(2));
        assert!(bins.locate("TBIRTH_YEAR", 40.0).is_none());
    }

    #[test]
    fn test_numeric_mapping_overlap() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            NUMERIC_MAPPING_FILE,
            "variable,min_value,max_value,bin,label\nX,0,10,1,a\nX,5,20,2,b\n",
        );
        assert!(matches!(
            load_numeric_mapping(&path),
            Err(IngestError::Model { .. })
        ));
    }

    #[test]
    fn test_geography_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, GEOGRAPHY_FILE, "county,cbsa_title\n1,Somewhere\n");
        let result = load_geography(&path);
        assert!(
            matches!(result, Err(IngestError::MissingColumn { ref column, .. }) if column == "cbsa_fips")
        );
    }

    #[test]
    fn test_geography_dedupes_counties() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            GEOGRAPHY_FILE,
            "county_fips,cbsa_fips,cbsa_title\n\
             36061,35620,New York-Newark-Jersey City\n\
             36047,35620,New York-Newark-Jersey City\n\
             01001,,\n",
        );
        let crosswalk = load_geography(&path).unwrap();
        assert_eq!(crosswalk.len(), 1);
        assert_eq!(crosswalk.title(35620), Some("New York-Newark-Jersey City"));
    }

    #[test]
    fn test_calendar() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            CALENDAR_FILE,
            "week,start_date,end_date,pub_date\n\
             41,2022-01-26,2022-02-07,2022-02-16\n\
             42,2022-03-02,2022-03-14,2022-03-23\n",
        );
        let calendar = load_calendar(&path).unwrap();
        assert_eq!(calendar.len(), 2);
        let wave = calendar.get(42).unwrap();
        assert_eq!(wave.date_range_label(), "2022-03-02 to 2022-03-14");
    }

    #[test]
    fn test_calendar_rejects_reversed_dates() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            CALENDAR_FILE,
            "week,start_date,end_date\n41,2022-02-07,2022-01-26\n",
        );
        assert!(matches!(
            load_calendar(&path),
            Err(IngestError::InvalidValue { .. })
        ));
    }
}
