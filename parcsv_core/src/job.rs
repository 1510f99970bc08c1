//! The `Job` data model (spec §3): an immutable configuration record
//! describing one emission, plus the small enums (`QuoteMode`,
//! `QuoteMethod`, `WriterTag`) that drive formatting.

use crate::column::ColumnData;
use crate::error::{Error, Result};

/// Destination for a `Job`'s output.
#[derive(Debug, Clone)]
pub enum Destination {
    /// Write to this file path.
    File {
        /// Path to create (or append to, see [`Job::append`]).
        path: std::path::PathBuf,
    },
    /// Write to standard output. Gzip is disallowed in this mode (spec
    /// §4.6): `is_gzip` is forced to `false` regardless of
    /// [`Job::gzip`].
    Stdout,
}

/// Per-column writer selection (spec §6's "dense enum").
///
/// `writer_max_len` gives the fixed upper-bound width the line-budget
/// estimator uses for this tag; variable-width tags return `0` and are
/// instead probed per-column (`ColumnData::max_string_width`, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterTag {
    Bool8,
    Bool32,
    Bool32AsString,
    Int32,
    Int64,
    Float64,
    Complex,
    ITime,
    DateInt32,
    DateFloat64,
    POSIXct,
    Nanotime,
    String,
    CategString,
    List,
}

impl WriterTag {
    /// Fixed maximum byte width this writer can ever emit for a single
    /// cell, excluding the NA token (the budget estimator substitutes
    /// the NA token's length when it's longer). `0` marks a
    /// variable-width tag that must be probed per column.
    pub fn writer_max_len(self) -> usize {
        match self {
            // '0' or '1'; NA handled via the na-token-length substitution.
            WriterTag::Bool8 => 1,
            WriterTag::Bool32 => 1,
            // "TRUE" / "FALSE"
            WriterTag::Bool32AsString => 5,
            // sign + up to 10 digits (i32::MIN is 11 chars but that's the
            // NA sentinel in the upstream representation; kept generous).
            WriterTag::Int32 => 11,
            // sign + up to 19 digits (i64::MIN is 20 chars).
            WriterTag::Int64 => 20,
            // sign + 1 digit + '.' + up to 14 digits, or scientific
            // "-d.dddddddddddddde-NNN"; 25 covers both with margin.
            WriterTag::Float64 => 25,
            // real + imaginary (each Float64-width) + '+' + 'i'.
            WriterTag::Complex => 2 * 25 + 2,
            // "HH:MM:SS"
            WriterTag::ITime => 8,
            // "YYYY-MM-DD"
            WriterTag::DateInt32 => 10,
            WriterTag::DateFloat64 => 10,
            // "YYYY-MM-DDTHH:MM:SS.uuuuuuZ"
            WriterTag::POSIXct => 27,
            // "YYYY-MM-DDTHH:MM:SS.nnnnnnnnnZ"
            WriterTag::Nanotime => 30,
            WriterTag::String => 0,
            WriterTag::CategString => 0,
            WriterTag::List => 0,
        }
    }
}

/// Tri-valued quoting policy (spec §3/§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMode {
    /// Never quote (beyond the unconditional empty-string/NA rules).
    Off,
    /// Always quote strings.
    On,
    /// Quote a string iff it is empty or contains `sep`, `sep2`, `\n`,
    /// `\r`, or `"`.
    Auto,
}

/// How an embedded `"` is escaped when a field is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMethod {
    /// Double the quote: `"` -> `""` (the default).
    Double,
    /// Backslash-escape: `"` -> `\"`, and also escape `\` as `\\`.
    Backslash,
}

/// Row-name source (spec SPEC_FULL.md §C.2).
#[derive(Debug, Clone)]
pub enum RowNames {
    /// Print `1..=nrow` as Int64.
    Sequential,
    /// Print an arbitrary typed column as the row-name field.
    Column(ColumnData),
}

/// An immutable configuration record describing one emission.
#[derive(Debug, Clone)]
pub struct Job {
    pub destination: Destination,
    pub append: bool,
    pub bom: bool,
    pub yaml: Vec<u8>,
    pub col_names: Option<Vec<String>>,
    pub row_names: Option<RowNames>,
    pub columns: Vec<(ColumnData, WriterTag)>,
    pub nrow: usize,
    pub sep: u8,
    pub sep2: u8,
    pub dec: u8,
    pub eol: Vec<u8>,
    pub na: Vec<u8>,
    pub quote: QuoteMode,
    /// Quoting mode applied to column names; may differ from `quote`
    /// (spec SPEC_FULL.md §C.3).
    pub header_quote: QuoteMode,
    pub qmethod: QuoteMethod,
    pub scipen: u16,
    pub squash_date_time: bool,
    pub buff_mb: u32,
    pub nth: usize,
    pub gzip: bool,
    pub show_progress: bool,
    pub verbose: bool,
}

impl Job {
    /// Validate configuration invariants (spec §7 "Config" errors).
    pub fn validate(&self) -> Result<()> {
        if !(1..=1024).contains(&self.buff_mb) {
            return Err(Error::Config(format!(
                "buffMB={} outside [1,1024]",
                self.buff_mb
            )));
        }
        if self.eol.is_empty() {
            return Err(Error::Config(
                "eol must be 1 or more bytes (usually either \\n or \\r\\n) but is length 0"
                    .to_string(),
            ));
        }
        if self.columns.is_empty() {
            return Err(Error::Config("at least one column is required".to_string()));
        }
        for (col, _) in &self.columns {
            if col.len() != self.nrow {
                return Err(Error::Config(format!(
                    "column length {} does not match nrow {}",
                    col.len(),
                    self.nrow
                )));
            }
        }
        Ok(())
    }

    /// Apply the auto-quote promotion rule (spec §3): if the NA token is
    /// non-empty and quoting is `auto`, promote to `on` for the whole
    /// job so literal cells equal to the NA token are still
    /// distinguishable from missing.
    pub fn effective_quote(&self) -> QuoteMode {
        if !self.na.is_empty() && matches!(self.quote, QuoteMode::Auto) {
            QuoteMode::On
        } else {
            self.quote
        }
    }
}

/// Builder for [`Job`], defaulting the ambient fields (sep=`,`, eol=`\n`,
/// dec=`.`, na=empty, quote=auto, qmethod=double) the way `fwrite`'s R
/// wrapper defaults them.
#[derive(Debug, Clone)]
pub struct JobBuilder {
    destination: Destination,
    append: bool,
    bom: bool,
    yaml: Vec<u8>,
    col_names: Option<Vec<String>>,
    row_names: Option<RowNames>,
    columns: Vec<(ColumnData, WriterTag)>,
    sep: u8,
    sep2: u8,
    dec: u8,
    eol: Vec<u8>,
    na: Vec<u8>,
    quote: QuoteMode,
    header_quote: Option<QuoteMode>,
    qmethod: QuoteMethod,
    scipen: u16,
    squash_date_time: bool,
    buff_mb: u32,
    nth: usize,
    gzip: bool,
    show_progress: bool,
    verbose: bool,
}

impl JobBuilder {
    /// Start a new builder targeting `destination`, with no columns yet.
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            append: false,
            bom: false,
            yaml: Vec::new(),
            col_names: None,
            row_names: None,
            columns: Vec::new(),
            sep: b',',
            sep2: b'|',
            dec: b'.',
            eol: b"\n".to_vec(),
            na: Vec::new(),
            quote: QuoteMode::Auto,
            header_quote: None,
            qmethod: QuoteMethod::Double,
            scipen: 0,
            squash_date_time: false,
            buff_mb: 8,
            nth: 1,
            gzip: false,
            show_progress: false,
            verbose: false,
        }
    }

    /// Append one typed column with its chosen writer.
    pub fn column(mut self, data: ColumnData, tag: WriterTag) -> Self {
        self.columns.push((data, tag));
        self
    }

    pub fn col_names(mut self, names: Vec<String>) -> Self {
        self.col_names = Some(names);
        self
    }

    pub fn row_names(mut self, row_names: RowNames) -> Self {
        self.row_names = Some(row_names);
        self
    }

    pub fn sep(mut self, sep: u8) -> Self {
        self.sep = sep;
        self
    }

    pub fn sep2(mut self, sep2: u8) -> Self {
        self.sep2 = sep2;
        self
    }

    pub fn dec(mut self, dec: u8) -> Self {
        self.dec = dec;
        self
    }

    pub fn eol(mut self, eol: impl Into<Vec<u8>>) -> Self {
        self.eol = eol.into();
        self
    }

    pub fn na(mut self, na: impl Into<Vec<u8>>) -> Self {
        self.na = na.into();
        self
    }

    pub fn quote(mut self, quote: QuoteMode) -> Self {
        self.quote = quote;
        self
    }

    pub fn header_quote(mut self, quote: QuoteMode) -> Self {
        self.header_quote = Some(quote);
        self
    }

    pub fn qmethod(mut self, qmethod: QuoteMethod) -> Self {
        self.qmethod = qmethod;
        self
    }

    pub fn scipen(mut self, scipen: u16) -> Self {
        self.scipen = scipen;
        self
    }

    pub fn squash_date_time(mut self, squash: bool) -> Self {
        self.squash_date_time = squash;
        self
    }

    pub fn buff_mb(mut self, buff_mb: u32) -> Self {
        self.buff_mb = buff_mb;
        self
    }

    pub fn nth(mut self, nth: usize) -> Self {
        self.nth = nth.max(1);
        self
    }

    pub fn gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    pub fn yaml(mut self, yaml: impl Into<Vec<u8>>) -> Self {
        self.yaml = yaml.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Finish building. `nrow` is taken from the first column; an empty
    /// column set or mismatched lengths are caught by [`Job::validate`].
    pub fn build(self) -> Result<Job> {
        let nrow = self.columns.first().map(|(c, _)| c.len()).unwrap_or(0);
        let is_stdout = matches!(self.destination, Destination::Stdout);
        let job = Job {
            destination: self.destination,
            append: self.append,
            bom: self.bom,
            yaml: self.yaml,
            col_names: self.col_names,
            row_names: self.row_names,
            columns: self.columns,
            nrow,
            sep: self.sep,
            sep2: self.sep2,
            dec: self.dec,
            eol: self.eol,
            na: self.na,
            quote: self.quote,
            header_quote: self.header_quote.unwrap_or(self.quote),
            qmethod: self.qmethod,
            scipen: self.scipen,
            squash_date_time: self.squash_date_time,
            buff_mb: self.buff_mb,
            nth: self.nth,
            // gzip is only for file destinations (spec §4.6).
            gzip: self.gzip && !is_stdout,
            show_progress: self.show_progress,
            verbose: self.verbose,
        };
        job.validate()?;
        Ok(job)
    }
}
