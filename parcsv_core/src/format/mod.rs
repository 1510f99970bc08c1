//! Formatters (spec §4.1): pure, allocation-free functions that append
//! one typed cell's textual representation to a caller-owned buffer.
//!
//! Each batch's scratch buffer is a `Vec<u8>` pre-reserved to its full
//! `buffSize` capacity by the planner (see `engine`); formatters only
//! ever `push`/`extend_from_slice` into that reserved capacity, so no
//! reallocation occurs while writing a batch, matching the upstream's
//! "no internal bounds checks, caller has proved the buffer suffices"
//! contract while staying in safe Rust.

mod bool_;
mod datetime;
mod float;
mod int;
mod string;

pub use bool_::{write_bool8, write_bool32, write_bool32_as_string};
pub use datetime::{
    write_date_float64, write_date_int32, write_itime, write_nanotime, write_posixct,
};
pub use float::{write_complex, write_float64};
pub use int::{write_int32, write_int64};
pub use string::{write_categ_string, write_list, write_string};

use crate::column::{CellValue, ColumnData};
use crate::job::{Job, QuoteMethod, QuoteMode, WriterTag};

/// Formatting parameters threaded through every call instead of a
/// process-wide mutable global (spec Design Notes): one `FormatCtx` is
/// built once per `Job` and borrowed for the lifetime of an emission.
#[derive(Debug, Clone, Copy)]
pub struct FormatCtx<'a> {
    pub na: &'a [u8],
    pub sep: u8,
    pub sep2: u8,
    pub dec: u8,
    pub quote: QuoteMode,
    pub qmethod: QuoteMethod,
    pub scipen: u16,
    pub squash_date_time: bool,
}

impl<'a> FormatCtx<'a> {
    /// Build the formatting context for row *data* cells (uses
    /// `job.effective_quote()`, i.e. post auto-promotion).
    pub fn for_data(job: &'a Job) -> Self {
        FormatCtx {
            na: &job.na,
            sep: job.sep,
            sep2: job.sep2,
            dec: job.dec,
            quote: job.effective_quote(),
            qmethod: job.qmethod,
            scipen: job.scipen,
            squash_date_time: job.squash_date_time,
        }
    }

    /// Build the formatting context for the header row, which may use
    /// a different quoting mode than the data rows (spec SPEC_FULL §C.3).
    pub fn for_header(job: &'a Job) -> Self {
        FormatCtx {
            quote: job.header_quote,
            ..Self::for_data(job)
        }
    }
}

/// Dispatch one cell of `column` (selected by `tag`) at `row` into
/// `buf`. This is the tagged-variant-dispatch equivalent of the
/// upstream's per-cell function-pointer table (`args.funs[whichFun]`);
/// both are explicitly sanctioned as equivalent by spec Design Notes.
pub fn write_cell(ctx: &FormatCtx, column: &ColumnData, tag: WriterTag, row: usize, buf: &mut Vec<u8>) {
    match (tag, column) {
        (WriterTag::Bool8, ColumnData::Bool8(v)) => write_bool8(v[row], ctx.na, buf),
        (WriterTag::Bool32, ColumnData::Bool32(v) | ColumnData::Bool8(v)) => {
            write_bool32(v[row], ctx.na, buf)
        }
        (WriterTag::Bool32AsString, ColumnData::Bool32AsString(v) | ColumnData::Bool8(v)) => {
            write_bool32_as_string(v[row], ctx.na, buf)
        }
        (WriterTag::Int32, ColumnData::Int32(v)) => write_int32(v[row], ctx.na, buf),
        (WriterTag::Int64, ColumnData::Int64(v)) => write_int64(v[row], ctx.na, buf),
        (WriterTag::Float64, ColumnData::Float64(v)) => {
            write_float64(v[row], ctx.dec, ctx.scipen, ctx.na, buf)
        }
        (WriterTag::Complex, ColumnData::Complex(v)) => {
            let (re, im) = v[row];
            write_complex(re, im, ctx.dec, ctx.scipen, ctx.na, buf)
        }
        (WriterTag::ITime, ColumnData::ITime(v)) => {
            write_itime(v[row], ctx.squash_date_time, ctx.na, buf)
        }
        (WriterTag::DateInt32, ColumnData::DateInt32(v)) => {
            write_date_int32(v[row], ctx.squash_date_time, ctx.na, buf)
        }
        (WriterTag::DateFloat64, ColumnData::DateFloat64(v)) => {
            write_date_float64(v[row], ctx.squash_date_time, ctx.na, buf)
        }
        (WriterTag::POSIXct, ColumnData::POSIXct(v)) => {
            write_posixct(v[row], ctx.squash_date_time, ctx.na, buf)
        }
        (WriterTag::Nanotime, ColumnData::Nanotime(v)) => {
            write_nanotime(v[row], ctx.squash_date_time, ctx.na, buf)
        }
        (WriterTag::String, ColumnData::String(v)) => {
            write_string(v[row].as_deref(), ctx, buf)
        }
        (WriterTag::CategString, ColumnData::CategString { labels, codes }) => {
            let s = codes[row].map(|c| labels[c as usize].as_str());
            write_categ_string(s, ctx, buf)
        }
        (WriterTag::List, ColumnData::List(v)) => write_list(v[row].as_deref(), ctx, buf),
        (tag, _) => {
            // A mismatched (tag, column-shape) pair is a caller bug:
            // `JobBuilder::column` pairs them, so this can only be hit
            // by constructing a `Job` by hand with an inconsistent tag.
            panic!("writer tag {tag:?} does not match column shape");
        }
    }
}

/// Dispatch a single list-item scalar cell, used by `write_list`'s
/// recursive join over `sep2`. Unlike `write_cell`, list items carry
/// their own value inline ([`CellValue`]) rather than indexing a column.
pub fn write_cell_value(ctx: &FormatCtx, value: &CellValue, buf: &mut Vec<u8>) {
    match value {
        CellValue::Bool(b) => write_bool32_as_string(*b, ctx.na, buf),
        CellValue::Int32(i) => write_int32(*i, ctx.na, buf),
        CellValue::Int64(i) => write_int64(*i, ctx.na, buf),
        CellValue::Float64(f) => write_float64(*f, ctx.dec, ctx.scipen, ctx.na, buf),
        CellValue::Str(s) => write_string(s.as_deref(), ctx, buf),
        CellValue::List(inner) => write_list(inner.as_deref(), ctx, buf),
    }
}
