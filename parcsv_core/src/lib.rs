//! `parcsv_core`: a parallel delimited-text (CSV-family) emitter.
//!
//! Build a [`Job`] with [`JobBuilder`], then hand it to [`write`]. The
//! job describes the destination, every formatting option, and the
//! typed columns ([`ColumnData`]) to write; [`write`] estimates a safe
//! per-row byte budget, plans a batching scheme across `job.nth`
//! worker threads, formats every batch in parallel, and commits the
//! results to the destination in row order — gzipping the whole
//! stream first if requested.

pub mod budget;
pub mod column;
pub mod crc32;
pub mod engine;
pub mod error;
pub mod format;
pub mod gzip;
pub mod header;
pub mod job;
pub mod planner;
pub mod tables;

pub use column::{CellValue, ColumnData};
pub use error::{Error, Result};
pub use job::{Destination, Job, JobBuilder, QuoteMethod, QuoteMode, RowNames, WriterTag};

/// Run one emission end to end: validate `job`, open its destination,
/// write the header, format and commit every row batch in parallel,
/// and close. See the crate docs for the overall flow.
pub fn write(job: &Job) -> Result<()> {
    engine::run(job)
}
