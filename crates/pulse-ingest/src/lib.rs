//! File-system collaborators for the pulse pipeline.
//!
//! # Features
//!
//! - **Metadata Loading**: question, response, numeric-bin, geography and
//!   collection-date tables from a metadata directory
//! - **Wave Source**: raw `pulse-WW.csv` files from a data directory
//! - **Aggregate Store**: processed waves and the smoothed table, each file
//!   replaced atomically
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pulse_ingest::{DirectorySource, DirectoryStore, load_calendar, load_metadata};
//!
//! let metadata = load_metadata(Path::new("metadata"))?;
//! let calendar = load_calendar(&Path::new("metadata").join("collection_dates.csv"))?;
//! let source = DirectorySource::new("raw");
//! let store = DirectoryStore::new("processed")?;
//! ```

mod csv;
mod discovery;
mod error;
mod metadata;
mod store;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV ===
pub use csv::{read_csv_table, write_csv_atomic};

// === File Discovery ===
pub use discovery::{SMOOTHED_FILE_NAME, list_wave_files, parse_wave_file_name, wave_file_name};

// === Metadata ===
pub use metadata::{
    CALENDAR_FILE, GEOGRAPHY_FILE, NUMERIC_MAPPING_FILE, QUESTION_MAPPING_FILE,
    RESPONSE_MAPPING_FILE, load_calendar, load_geography, load_metadata, load_numeric_mapping,
    load_question_mapping, load_response_mapping,
};

// === Source and Store ===
pub use store::{DirectorySource, DirectoryStore, cast_cell_columns};
