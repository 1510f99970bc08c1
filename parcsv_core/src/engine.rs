//! The parallel row engine (spec §4.5): formats every batch
//! concurrently, then commits each batch to the sink strictly in row
//! order.
//!
//! `fwrite.c` runs this as `#pragma omp parallel for ordered`: each
//! thread formats (and, if gzipping, deflates) its own batch into a
//! thread-private buffer, and an `ordered` section serializes the
//! actual write. `rayon`'s `par_iter().map().collect()` gives the same
//! "parallel compute, ordered commit" shape directly — the `Vec`
//! `collect()` produces is already in input order, so the commit loop
//! below is just a sequential `for` over it. A shared `AtomicBool` +
//! `Mutex<Option<Error>>` stands in for the upstream's naked shared
//! `bool failed`: any task that errors flips the flag so later tasks
//! skip their own (now-pointless) work, and the first compression
//! error wins over a later write error (spec §7).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;

use crate::budget::max_line_len;
use crate::column::ColumnData;
use crate::crc32::{crc32, crc32_combine};
use crate::error::{Error, Result};
use crate::format::{write_cell, FormatCtx};
use crate::gzip::{self, BatchCompressor, Sink};
use crate::header::header_bytes;
use crate::job::{Job, RowNames};
use crate::planner::{self, Plan};

/// One batch's commit-ready output: either plain row bytes, or a
/// deflated block plus the running-CRC inputs needed to fold it into
/// the gzip trailer. `uncompressed_len` is the batch's own formatted
/// size before any deflation, used to track peak scratch-buffer
/// utilization regardless of whether gzip is on.
struct BatchOutput {
    bytes: Vec<u8>,
    raw_crc: u32,
    raw_len: u64,
    uncompressed_len: usize,
}

/// Run one emission end to end: open the destination, write the
/// header, format and commit every row batch, and close.
pub fn run(job: &Job) -> Result<()> {
    job.validate()?;
    if job.verbose {
        verbose_column_trace(job);
    }

    let mut sink = Sink::open(job)?;

    let mut crc = 0u32;
    let mut uncompressed_len = 0u64;

    if job.gzip {
        let mut hdr = Vec::with_capacity(10);
        gzip::write_header(&mut hdr);
        sink.write_all(&hdr)?;
    }

    if job.verbose {
        eprint!(
            "Writing bom ({}), yaml ({} characters) and column names ({}) ... ",
            job.bom,
            job.yaml.len(),
            job.col_names.is_some(),
        );
    }
    let header_t0 = std::time::Instant::now();
    let header = header_bytes(job);
    if !header.is_empty() {
        commit_chunk(&mut sink, job, &header, &mut crc, &mut uncompressed_len)?;
    }
    if job.verbose {
        eprintln!("done in {:.3}s", header_t0.elapsed().as_secs_f64());
    }

    if job.nrow == 0 {
        if job.verbose {
            eprintln!("No data rows present (nrow==0)");
        }
        return finish_stream(sink, job, crc, uncompressed_len, None);
    }

    let budget_t0 = std::time::Instant::now();
    let budget = max_line_len(job);
    if job.verbose {
        eprintln!("maxLineLen={budget}. Found in {:.3}s", budget_t0.elapsed().as_secs_f64());
    }
    let plan = planner::plan(job, budget);
    if job.verbose {
        eprintln!(
            "Writing {} rows in {} batches of {} rows (each buffer size {}MB, showProgress={}, nth={})",
            job.nrow, plan.num_batches, plan.rows_per_batch, job.buff_mb, job.show_progress, plan.nth
        );
        if job.gzip {
            eprintln!(
                "zbuffSize={} returned from deflateBound",
                gzip::deflate_bound(plan.buff_size)
            );
        }
    }

    let failed = AtomicBool::new(false);
    let failure: Mutex<Option<Error>> = Mutex::new(None);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plan.nth)
        .build()
        .map_err(|e| Error::Config(format!("failed to start {} worker threads: {e}", plan.nth)))?;

    let start = std::time::Instant::now();
    let mut next_print_at = std::time::Duration::from_secs(2);
    let mut peak_buff_used_pct: u32 = 0;

    let results: Vec<Option<BatchOutput>> = pool.install(|| {
        (0..plan.num_batches)
            .into_par_iter()
            .map(|i| {
                if failed.load(Ordering::Relaxed) {
                    return None;
                }
                match format_batch(job, &plan, i) {
                    Ok(out) => Some(out),
                    Err(e) => {
                        record_failure(&failure, &failed, e);
                        None
                    }
                }
            })
            .collect()
    });

    let mut write_err = None;
    for (i, out) in results.into_iter().enumerate() {
        let Some(batch) = out else { break };
        if let Err(e) = sink.write_all(&batch.bytes) {
            write_err = Some(e);
            break;
        }
        if job.gzip {
            crc = crc32_combine(crc, batch.raw_crc, batch.raw_len);
            uncompressed_len += batch.raw_len;
        }
        let used_pct = (100 * batch.uncompressed_len / plan.buff_size.max(1)) as u32;
        peak_buff_used_pct = peak_buff_used_pct.max(used_pct);
        if job.show_progress {
            let elapsed = start.elapsed();
            let is_last = i + 1 == plan.num_batches;
            if elapsed >= next_print_at || is_last {
                report_progress(job, &plan, i, elapsed, is_last, peak_buff_used_pct);
                next_print_at = elapsed + std::time::Duration::from_secs(1);
            }
        }
    }

    let compute_err = failure.into_inner().unwrap();
    let primary_err = match (compute_err, write_err) {
        (Some(c), _) if c.is_compression() => Some(c),
        (_, Some(w)) => Some(w),
        (Some(c), None) => Some(c),
        (None, None) => None,
    };

    finish_stream(sink, job, crc, uncompressed_len, primary_err)
}

/// Write `chunk` (raw, or deflated through its own fresh compressor if
/// `job.gzip`), folding its CRC/length into the running totals.
fn commit_chunk(
    sink: &mut Sink,
    job: &Job,
    chunk: &[u8],
    crc: &mut u32,
    uncompressed_len: &mut u64,
) -> Result<()> {
    if job.gzip {
        let mut compressor = BatchCompressor::new();
        let compressed = compressor.compress_block(chunk)?;
        sink.write_all(&compressed)?;
        *crc = crc32_combine(*crc, crc32(chunk), chunk.len() as u64);
        *uncompressed_len += chunk.len() as u64;
    } else {
        sink.write_all(chunk)?;
    }
    Ok(())
}

/// Terminate the deflate stream and write the gzip trailer (if
/// gzipping and nothing has failed yet), then close the sink. A
/// close-after-success failure is suppressed when `primary_err` is
/// already set, so a real root cause isn't masked by a late close
/// error (spec §7).
fn finish_stream(
    mut sink: Sink,
    job: &Job,
    crc: u32,
    uncompressed_len: u64,
    primary_err: Option<Error>,
) -> Result<()> {
    let mut primary_err = primary_err;
    if job.gzip && primary_err.is_none() {
        match gzip::finish_stream().and_then(|block| sink.write_all(&block)) {
            Ok(()) => {
                let mut trailer = Vec::with_capacity(8);
                gzip::write_trailer(&mut trailer, crc, uncompressed_len);
                if let Err(e) = sink.write_all(&trailer) {
                    primary_err = Some(e);
                }
            }
            Err(e) => primary_err = Some(e),
        }
    }

    let close_result = sink.finish(primary_err.is_some());
    match primary_err {
        Some(e) => Err(e),
        None => close_result,
    }
}

/// Record a task's failure, preferring an earlier compression error
/// over a later one of any kind (spec §7: compression errors indicate
/// a more fundamental problem than anything downstream of it).
fn record_failure(failure: &Mutex<Option<Error>>, failed: &AtomicBool, err: Error) {
    failed.store(true, Ordering::Relaxed);
    let mut guard = failure.lock().unwrap();
    let replace = match &*guard {
        None => true,
        Some(existing) => err.is_compression() && !existing.is_compression(),
    };
    if replace {
        *guard = Some(err);
    }
}

/// Format batch `i`'s rows into one buffer, optionally deflating it
/// through a compressor owned solely by this task.
fn format_batch(job: &Job, plan: &Plan, i: usize) -> Result<BatchOutput> {
    let ctx = FormatCtx::for_data(job);
    let range = plan.batch_range(i, job.nrow);
    let mut buf = Vec::with_capacity(plan.buff_size.min(range.len() * 64 + 64));

    for row in range {
        if let Some(row_names) = &job.row_names {
            write_row_name(row_names, row, &ctx, &mut buf);
            if !job.columns.is_empty() {
                buf.push(job.sep);
            }
        }
        for (col_idx, (data, tag)) in job.columns.iter().enumerate() {
            if col_idx > 0 {
                buf.push(job.sep);
            }
            write_cell(&ctx, data, *tag, row, &mut buf);
        }
        buf.extend_from_slice(&job.eol);
    }

    let uncompressed_len = buf.len();
    if job.gzip {
        let raw_crc = crc32(&buf);
        let raw_len = buf.len() as u64;
        let mut compressor = BatchCompressor::new();
        let compressed = compressor.compress_block(&buf)?;
        Ok(BatchOutput {
            bytes: compressed,
            raw_crc,
            raw_len,
            uncompressed_len,
        })
    } else {
        Ok(BatchOutput {
            bytes: buf,
            raw_crc: 0,
            raw_len: 0,
            uncompressed_len,
        })
    }
}

/// Verbose per-column writer trace (SPEC_FULL.md §C.1), gated entirely
/// on `job.verbose` by its only caller. Mirrors `fwriteMain`'s
/// "Column writers: ..." + doRowNames/doQuote/nrow/ncol/eolLen line,
/// truncating the tag list to the first 30 + last 10 beyond 50 columns.
fn verbose_column_trace(job: &Job) {
    eprint!("Column writers: ");
    let tags: Vec<crate::job::WriterTag> = job.columns.iter().map(|(_, tag)| *tag).collect();
    if tags.len() <= 50 {
        for tag in &tags {
            eprint!("{tag:?} ");
        }
    } else {
        for tag in &tags[..30] {
            eprint!("{tag:?} ");
        }
        eprint!("... ");
        for tag in &tags[tags.len() - 10..] {
            eprint!("{tag:?} ");
        }
    }
    eprintln!(
        "\ndoRowNames={} doQuote={:?} nrow={} ncol={} eolLen={}",
        job.row_names.is_some(),
        job.effective_quote(),
        job.nrow,
        job.columns.len(),
        job.eol.len()
    );
}

fn write_row_name(row_names: &RowNames, row: usize, ctx: &FormatCtx, buf: &mut Vec<u8>) {
    match row_names {
        RowNames::Sequential => {
            crate::format::write_int64(Some(row as i64 + 1), ctx.na, buf);
        }
        RowNames::Column(data) => write_cell(ctx, data, data.natural_tag(), row, buf),
    }
}

/// A one-line progress report matching `fwriteMain`'s shape (spec
/// SPEC_FULL.md §C.10): percent complete, elapsed time, thread count,
/// peak scratch-buffer utilization, and an ETA extrapolated from the
/// rate observed so far. `\r`-prefixed so each line overwrites the
/// last; a trailing newline only on the final batch.
fn report_progress(
    job: &Job,
    plan: &Plan,
    completed_batch: usize,
    elapsed: std::time::Duration,
    is_last: bool,
    peak_buff_used_pct: u32,
) {
    let rows_done = plan.batch_range(completed_batch, job.nrow).end;
    let pct = 100.0 * rows_done as f64 / job.nrow.max(1) as f64;
    let eta = if rows_done == 0 {
        0.0
    } else {
        elapsed.as_secs_f64() * (job.nrow - rows_done) as f64 / rows_done as f64
    };
    eprint!(
        "\rWritten {pct:.1}% of {} rows in {:.1} secs using {} thread(s). maxBuffUsed={peak_buff_used_pct}%. ETA {eta:.1} secs.",
        job.nrow,
        elapsed.as_secs_f64(),
        plan.nth,
    );
    if is_last {
        eprintln!();
    }
}
