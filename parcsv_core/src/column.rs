//! `ColumnData`: the concrete, owned realization of spec §6's
//! column-accessor interface. Rust's enums give us safe typed cell
//! reads and string-length probes directly, without the pointer-cast
//! dispatch the upstream C core uses (`((const int32_t *)col)[row]`)
//! or a trait-object host boundary we'd need to invent a caller for.
//!
//! `Float64`, `DateFloat64`, and `POSIXct` use `f64::NAN` / non-finite
//! values as their own NA sentinel (mirroring `isnan`/`isfinite` checks
//! in `fwrite.c`); the integer-backed variants use `Option<T>` since
//! Rust has no equivalent of a reserved `INT32_MIN` sentinel convention.

use crate::job::WriterTag;

/// A single scalar value inside a `List` column cell, dispatched
/// recursively with the job's `sep2` as the join separator (spec
/// §4.1 "List").
#[derive(Debug, Clone)]
pub enum CellValue {
    Bool(Option<bool>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float64(f64),
    Str(Option<String>),
    /// Nested list item, for the rare doubly-nested list column.
    List(Option<Vec<CellValue>>),
}

/// An owned, `Send + Sync` column of typed cells.
#[derive(Debug, Clone)]
pub enum ColumnData {
    /// Domain `{0,1,NA}`, written as `'0'`/`'1'`.
    Bool8(Vec<Option<bool>>),
    /// Same domain as `Bool8`, numeric writer (kept distinct because
    /// the upstream has two independent writer functions with slightly
    /// different NA handling).
    Bool32(Vec<Option<bool>>),
    /// Same domain, written as `TRUE`/`FALSE`.
    Bool32AsString(Vec<Option<bool>>),
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    /// `NAN` is NA; `+-INFINITY` writes `Inf`/`-Inf`.
    Float64(Vec<f64>),
    /// `(real, imaginary)`; `imaginary.is_nan()` means "real part only".
    Complex(Vec<(f64, f64)>),
    /// Seconds-of-day in `[0, 86399]`; `None` is NA.
    ITime(Vec<Option<i32>>),
    /// Days since 1970-01-01; `None` is NA.
    DateInt32(Vec<Option<i32>>),
    /// Days since 1970-01-01 as a double; non-finite is NA.
    DateFloat64(Vec<f64>),
    /// Seconds since the epoch; non-finite is NA.
    POSIXct(Vec<f64>),
    /// Nanoseconds since the epoch; `None` is NA.
    Nanotime(Vec<Option<i64>>),
    String(Vec<Option<String>>),
    /// A dictionary-encoded string column: `labels` is the full set of
    /// possible category labels (used by `max_categ_len`, independent
    /// of which ones actually occur), `codes` indexes into `labels`
    /// per row (`None` is NA).
    CategString {
        labels: Vec<String>,
        codes: Vec<Option<u32>>,
    },
    /// Each row is `None` (NA) or a list of scalar cells joined by
    /// `sep2` when written.
    List(Vec<Option<Vec<CellValue>>>),
}

impl ColumnData {
    /// Number of rows in this column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Bool8(v) | ColumnData::Bool32(v) | ColumnData::Bool32AsString(v) => {
                v.len()
            }
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Complex(v) => v.len(),
            ColumnData::ITime(v) => v.len(),
            ColumnData::DateInt32(v) => v.len(),
            ColumnData::DateFloat64(v) => v.len(),
            ColumnData::POSIXct(v) => v.len(),
            ColumnData::Nanotime(v) => v.len(),
            ColumnData::String(v) => v.len(),
            ColumnData::CategString { codes, .. } => codes.len(),
            ColumnData::List(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The writer tag this column's shape matches. `JobBuilder::column`
    /// takes an explicit `WriterTag` rather than deriving it, since a
    /// `Bool8`-shaped column might legitimately be written with the
    /// `Bool32` or `Bool32AsString` writer; `natural_tag` is only used
    /// by tests and the CLI's default wiring.
    pub fn natural_tag(&self) -> WriterTag {
        match self {
            ColumnData::Bool8(_) => WriterTag::Bool8,
            ColumnData::Bool32(_) => WriterTag::Bool32,
            ColumnData::Bool32AsString(_) => WriterTag::Bool32AsString,
            ColumnData::Int32(_) => WriterTag::Int32,
            ColumnData::Int64(_) => WriterTag::Int64,
            ColumnData::Float64(_) => WriterTag::Float64,
            ColumnData::Complex(_) => WriterTag::Complex,
            ColumnData::ITime(_) => WriterTag::ITime,
            ColumnData::DateInt32(_) => WriterTag::DateInt32,
            ColumnData::DateFloat64(_) => WriterTag::DateFloat64,
            ColumnData::POSIXct(_) => WriterTag::POSIXct,
            ColumnData::Nanotime(_) => WriterTag::Nanotime,
            ColumnData::String(_) => WriterTag::String,
            ColumnData::CategString { .. } => WriterTag::CategString,
            ColumnData::List(_) => WriterTag::List,
        }
    }

    /// `get_max_string_len(c, nrow)`: the longest `String` cell's byte
    /// length, across all rows actually present (NA rows don't count).
    pub fn max_string_len(&self) -> usize {
        match self {
            ColumnData::String(v) => v
                .iter()
                .filter_map(|s| s.as_deref())
                .map(str::len)
                .max()
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// `get_max_categ_len(c)`: the longest possible category label,
    /// independent of which rows use it.
    pub fn max_categ_len(&self) -> usize {
        match self {
            ColumnData::CategString { labels, .. } => {
                labels.iter().map(String::len).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// `get_max_list_item_len(c, nrow)`: the widest a single row of this
    /// `List` column could ever render as, i.e. the sum of each item's
    /// own max width plus `sep2` separators between them.
    pub fn max_list_item_len(&self) -> usize {
        match self {
            ColumnData::List(rows) => rows
                .iter()
                .filter_map(|r| r.as_ref())
                .map(|items| list_row_width(items))
                .max()
                .unwrap_or(0),
            _ => 0,
        }
    }
}

fn cell_value_width(v: &CellValue) -> usize {
    match v {
        CellValue::Bool(_) => WriterTag::Bool32AsString.writer_max_len(),
        CellValue::Int32(_) => WriterTag::Int32.writer_max_len(),
        CellValue::Int64(_) => WriterTag::Int64.writer_max_len(),
        CellValue::Float64(_) => WriterTag::Float64.writer_max_len(),
        CellValue::Str(s) => s.as_deref().map(str::len).unwrap_or(0) * 2,
        CellValue::List(Some(items)) => list_row_width(items),
        CellValue::List(None) => 0,
    }
}

fn list_row_width(items: &[CellValue]) -> usize {
    if items.is_empty() {
        return 0;
    }
    items.iter().map(cell_value_width).sum::<usize>() + (items.len() - 1)
}
