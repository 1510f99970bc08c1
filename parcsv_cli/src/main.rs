use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use parcsv_core::{ColumnData, Destination, JobBuilder, QuoteMethod, QuoteMode, WriterTag};

#[derive(Parser)]
#[command(
    name = "parcsv",
    about = "Parallel delimited-text emitter — write typed columns out as CSV, optionally gzipped",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reformat a whitespace-delimited numeric table into CSV
    Emit(EmitArgs),
}

#[derive(clap::Args)]
struct EmitArgs {
    /// Source file, whitespace-separated numeric columns, one row per
    /// line ("-" reads stdin)
    input: PathBuf,
    /// Destination file ("-" writes to stdout)
    output: PathBuf,
    /// Field separator
    #[arg(long, default_value = ",")]
    sep: char,
    /// Decimal mark
    #[arg(long, default_value = ".")]
    dec: char,
    /// String written for missing/non-finite values
    #[arg(long, default_value = "")]
    na: String,
    /// Quoting mode: off | on | auto
    #[arg(long, default_value = "auto")]
    quote: String,
    /// Comma-separated column names for the header row
    #[arg(long)]
    header: Option<String>,
    /// Gzip-compress the output (disallowed when writing to stdout)
    #[arg(long)]
    gzip: bool,
    /// Per-task scratch buffer size, in MiB
    #[arg(long, default_value_t = 8)]
    buff_mb: u32,
    /// Worker thread count
    #[arg(long, default_value_t = num_cpus())]
    nth: usize,
    /// Scientific-notation bias, in extra bytes of decimal width tolerated
    #[arg(long, default_value_t = 0)]
    scipen: u16,
    /// Print a progress meter while writing
    #[arg(long)]
    progress: bool,
    /// Emit per-column/batch-planning diagnostics to stderr
    #[arg(long)]
    verbose: bool,
}

fn num_cpus() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn parse_quote_mode(s: &str) -> anyhow::Result<QuoteMode> {
    match s {
        "off" => Ok(QuoteMode::Off),
        "on" => Ok(QuoteMode::On),
        "auto" => Ok(QuoteMode::Auto),
        other => anyhow::bail!("unknown quote mode '{other}'. Valid options: off, on, auto"),
    }
}

fn read_input(path: &PathBuf) -> anyhow::Result<String> {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading input file {path:?}"))
    }
}

/// Parse a whitespace-delimited numeric table into one `Float64`
/// column per field position.
fn parse_columns(text: &str) -> anyhow::Result<Vec<ColumnData>> {
    let rows: Vec<Vec<f64>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(|tok| tok.parse::<f64>().map_err(|e| anyhow::anyhow!("{e}: {tok:?}")))
                .collect()
        })
        .collect::<anyhow::Result<_>>()?;

    let ncol = rows.first().map(|r| r.len()).unwrap_or(0);
    for (i, row) in rows.iter().enumerate() {
        anyhow::ensure!(
            row.len() == ncol,
            "row {i} has {} fields, expected {ncol}",
            row.len()
        );
    }

    let mut columns = vec![Vec::with_capacity(rows.len()); ncol];
    for row in rows {
        for (c, v) in row.into_iter().enumerate() {
            columns[c].push(v);
        }
    }
    Ok(columns.into_iter().map(ColumnData::Float64).collect())
}

fn run_emit(args: EmitArgs) -> anyhow::Result<()> {
    let text = read_input(&args.input)?;
    let columns = parse_columns(&text)?;
    let nrow = columns.first().map(ColumnData::len).unwrap_or(0);

    let destination = if args.output.to_str() == Some("-") {
        Destination::Stdout
    } else {
        Destination::File {
            path: args.output.clone(),
        }
    };

    let mut builder = JobBuilder::new(destination)
        .sep(args.sep as u8)
        .dec(args.dec as u8)
        .na(args.na.clone())
        .quote(parse_quote_mode(&args.quote)?)
        .qmethod(QuoteMethod::Double)
        .scipen(args.scipen)
        .buff_mb(args.buff_mb)
        .nth(args.nth)
        .gzip(args.gzip)
        .show_progress(args.progress)
        .verbose(args.verbose);

    for col in columns {
        builder = builder.column(col, WriterTag::Float64);
    }
    if let Some(header) = &args.header {
        builder = builder.col_names(header.split(',').map(str::to_string).collect());
    }

    let job = builder.build().context("building emission job")?;

    if args.verbose {
        eprintln!(
            "parcsv: {nrow} rows, {} columns, nth={}, buffMB={}, gzip={}",
            job.columns.len(),
            job.nth,
            job.buff_mb,
            job.gzip
        );
    }

    let t0 = Instant::now();
    parcsv_core::write(&job).context("writing output")?;
    let elapsed = t0.elapsed();

    if args.verbose {
        eprintln!("parcsv: wrote {nrow} rows in {:.3}s", elapsed.as_secs_f64());
    }
    io::stdout().flush().ok();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Emit(args) => run_emit(args),
    }
}
