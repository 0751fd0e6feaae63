//! Wave processing orchestration.
//!
//! - **pipeline**: ordered steps turning one raw wave into its cell table
//! - **batch**: many waves with a per-wave failure boundary, plus smoothing
//!   of everything a store holds
//! - **store**: the source and store contracts, with an in-memory store

pub mod batch;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod store;

pub use batch::{BatchReport, BatchRunner, WaveOutcome, smooth_store};
pub use context::{WaveContext, WaveState};
pub use error::{BoxError, Result, WaveError};
pub use pipeline::{WaveOutput, WavePipeline, WaveStep, build_default_pipeline};
pub use store::{AggregateStore, MemoryStore, WaveSource};
