//! Batch planning (spec §4.4): turn `buffMB`, the line-budget estimate,
//! and `nrow` into a row-batching scheme the engine can hand to
//! `rayon` — one scratch buffer and one batch of rows per parallel
//! task, each task's buffer capacity fixed up front so formatting never
//! reallocates mid-batch.

use crate::job::Job;

/// A concrete batching plan for one emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    /// Bytes reserved per task's scratch buffer.
    pub buff_size: usize,
    /// Rows handled by one task (the last batch may be shorter).
    pub rows_per_batch: usize,
    /// Total number of batches covering `nrow` rows.
    pub num_batches: usize,
    /// Threads actually usable — never more than `num_batches`, since
    /// extra threads beyond the batch count would sit idle.
    pub nth: usize,
}

impl Plan {
    /// Row range `[start, end)` covered by batch `i`.
    pub fn batch_range(&self, i: usize, nrow: usize) -> std::ops::Range<usize> {
        let start = i * self.rows_per_batch;
        let end = (start + self.rows_per_batch).min(nrow);
        start..end
    }
}

/// Derive a [`Plan`] from `job` and the line-budget upper bound
/// `max_line_len` (spec §4.4). `buffSize` doubles the configured
/// `buffMB` when a single row's budget exceeds half of it, which in
/// turn guarantees `rowsPerBatch >= 2` even for a pathologically wide
/// row — mirrors `fwriteMain`'s "Decide buffer size and rowsPerBatch"
/// block verbatim, including its explicit `rowsPerBatch=2` override.
pub fn plan(job: &Job, max_line_len: usize) -> Plan {
    let configured = (job.buff_mb as usize) * 1024 * 1024;
    let max_line_len = max_line_len.max(1);
    let buff_size = configured.max(2 * max_line_len);
    // `buff_size` already absorbed the "double it when a row exceeds
    // half the configured buffer" rule above, so the ratio below is
    // always >= 2 in that case — `fwriteMain`'s explicit rowsPerBatch=2
    // override falls out of this clamp rather than needing its own arm.
    let rows_per_batch = (buff_size / max_line_len).clamp(1, job.nrow.max(1));

    let num_batches = if job.nrow == 0 {
        0
    } else {
        job.nrow.div_ceil(rows_per_batch)
    };
    let nth = job.nth.min(num_batches.max(1));

    Plan {
        buff_size,
        rows_per_batch,
        num_batches,
        nth,
    }
}
