//! Line-budget estimation (spec §4.2): a provable upper bound on the
//! number of bytes a single row can ever render as, used to size each
//! batch's scratch buffer so formatters never need a bounds check or a
//! mid-row reallocation.
//!
//! Ported from `fwrite.c`'s `fwriteMain` pre-pass over `args.funs`/
//! `args.colSizes`/`maxStrLen`-per-column: fixed-width writers
//! contribute their known max width, variable-width writers contribute
//! twice their observed max width (`get_max_string_len`/
//! `get_max_categ_len`/`get_max_list_item_len`), `scipen` inflates the
//! float budget and is clamped to keep an adversarial scipen from
//! blowing out the buffer, and one separator plus the end-of-line
//! marker is added per column/row.

use crate::column::ColumnData;
use crate::job::{Job, WriterTag};

/// `scipen` above this contributes nothing further to the per-float
/// width budget (spec SPEC_FULL.md §G): a huge `scipen` only ever
/// forces *shorter* scientific notation into decimal form, never a
/// longer field than this bound already covers.
const SCIPEN_CLAMP: usize = 350;

/// Extra bytes `write_float64`/`write_complex` can add beyond their
/// nominal max width when `scipen` biases the format toward (long)
/// decimal notation instead of scientific.
fn scipen_allowance(job: &Job) -> usize {
    (job.scipen as usize).min(SCIPEN_CLAMP)
}

/// Upper bound on one column's rendered cell width, excluding the
/// trailing separator.
fn column_max_width(data: &ColumnData, tag: WriterTag, job: &Job) -> usize {
    let fixed = tag.writer_max_len();
    let na_len = job.na.len();
    let base = match tag {
        WriterTag::String => data.max_string_len() * 2,
        WriterTag::CategString => data.max_categ_len() * 2,
        WriterTag::List => data.max_list_item_len() * 2,
        WriterTag::Float64 | WriterTag::Complex => fixed + scipen_allowance(job),
        _ => fixed,
    };
    // Quoting can add two bytes (opening/closing `"`); a quoted field
    // can also double in the worst case (every byte a `"` needing
    // escaping), matching the same 2x safety factor applied to string
    // columns above.
    let quote_allowance = if matches!(tag, WriterTag::String | WriterTag::CategString | WriterTag::List) {
        2
    } else {
        0
    };
    base.max(na_len) + quote_allowance
}

/// Upper bound on the row-name field's width, if present (spec
/// SPEC_FULL.md §C.2): a `Sequential` row name is a signed `Int64` of
/// `nrow`, so its width is bounded by the digit count of `nrow` plus a
/// sign, capped at the 11-byte width `writeInt32`'s NA sentinel uses
/// upstream (kept as a floor so small `nrow` still gets a safe margin).
fn row_name_width(job: &Job) -> usize {
    match &job.row_names {
        None => 0,
        Some(crate::job::RowNames::Sequential) => {
            let digits = job.nrow.max(1).ilog10() as usize + 1;
            (digits + 1).max(11) + 1 // +1 for sign, +1 for separator
        }
        Some(crate::job::RowNames::Column(data)) => {
            column_max_width(data, data.natural_tag(), job) + 1
        }
    }
}

/// `maxLineLen`: an upper bound in bytes on any single rendered row,
/// including separators and the end-of-line marker, but excluding the
/// header row (sized separately by `header::header_bytes`).
pub fn max_line_len(job: &Job) -> usize {
    let mut len = row_name_width(job);
    for (data, tag) in &job.columns {
        len += column_max_width(data, *tag, job) + 1; // +1 for the separator/EOL byte
    }
    len += job.eol.len();
    len
}
