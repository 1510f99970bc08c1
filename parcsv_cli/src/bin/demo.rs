//! Generates a synthetic structured dataset and writes it twice — once
//! plain, once gzipped — reporting size and throughput for each, in
//! the spirit of `ancf_cli`'s own `demo` binary.

use std::time::Instant;

use parcsv_core::{ColumnData, Destination, JobBuilder, WriterTag};

const NROW: usize = 1_000_000;

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{n} B")
    } else {
        format!("{v:.2} {}", UNITS[unit])
    }
}

fn synthetic_columns() -> Vec<(ColumnData, WriterTag)> {
    let ids: Vec<Option<i64>> = (0..NROW as i64).map(Some).collect();
    let values: Vec<f64> = (0..NROW).map(|i| (i as f64) * 0.333_333 - 12.5).collect();
    let flags: Vec<Option<bool>> = (0..NROW).map(|i| Some(i % 7 == 0)).collect();
    let labels: Vec<Option<String>> = (0..NROW)
        .map(|i| Some(format!("row-{i}, with a comma")))
        .collect();
    let days: Vec<Option<i32>> = (0..NROW).map(|i| Some((i % 20_000) as i32)).collect();

    vec![
        (ColumnData::Int64(ids), WriterTag::Int64),
        (ColumnData::Float64(values), WriterTag::Float64),
        (ColumnData::Bool32AsString(flags), WriterTag::Bool32AsString),
        (ColumnData::String(labels), WriterTag::String),
        (ColumnData::DateInt32(days), WriterTag::DateInt32),
    ]
}

fn run_once(path: &std::path::Path, gzip: bool) -> anyhow::Result<(std::time::Duration, u64)> {
    let mut builder = JobBuilder::new(Destination::File {
        path: path.to_path_buf(),
    })
    .col_names(vec![
        "id".to_string(),
        "value".to_string(),
        "flag".to_string(),
        "label".to_string(),
        "day".to_string(),
    ])
    .na("NA")
    .buff_mb(16)
    .nth(num_cpus())
    .gzip(gzip);

    for (data, tag) in synthetic_columns() {
        builder = builder.column(data, tag);
    }
    let job = builder.build()?;

    let t0 = Instant::now();
    parcsv_core::write(&job)?;
    let elapsed = t0.elapsed();
    let size = std::fs::metadata(path)?.len();
    Ok((elapsed, size))
}

fn num_cpus() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn main() -> anyhow::Result<()> {
    eprintln!("parcsv-demo: generating {NROW} synthetic rows across 5 columns");

    let plain = std::env::temp_dir().join("parcsv-demo-plain.csv");
    let gzipped = std::env::temp_dir().join("parcsv-demo-gzip.csv.gz");

    let (plain_elapsed, plain_size) = run_once(&plain, false)?;
    eprintln!(
        "  plain  : {} in {:.3}s ({}/s)",
        human_bytes(plain_size),
        plain_elapsed.as_secs_f64(),
        human_bytes((plain_size as f64 / plain_elapsed.as_secs_f64()) as u64)
    );

    let (gzip_elapsed, gzip_size) = run_once(&gzipped, true)?;
    eprintln!(
        "  gzip   : {} in {:.3}s ({}/s), ratio {:.2}x",
        human_bytes(gzip_size),
        gzip_elapsed.as_secs_f64(),
        human_bytes((gzip_size as f64 / gzip_elapsed.as_secs_f64()) as u64),
        plain_size as f64 / gzip_size as f64
    );

    let _ = std::fs::remove_file(&plain);
    let _ = std::fs::remove_file(&gzipped);
    Ok(())
}
