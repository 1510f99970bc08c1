//! Gzip output (spec §4.6): opening the destination, and assembling a
//! single gzip member out of independently-deflated batches.
//!
//! Ported from `fwrite.c`'s `init_stream`/`compressbuff`: each task
//! owns its own `flate2::Compress` (raw deflate, no zlib header) and
//! flushes with `FlushCompress::Sync` so the resulting blocks
//! concatenate into one valid deflate stream when written in row
//! order. Unlike the C original, an owned `Compress` per task can't be
//! relocated out from under an in-flight stream — the upstream's
//! "never realloc the codec's stream struct" constraint doesn't apply
//! here at all (see SPEC_FULL.md §D).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::{Compress, Compression, FlushCompress, Status};

use crate::error::{Error, Result};
use crate::job::{Destination, Job};

/// Fixed 10-byte gzip member header: magic, deflate method, no flags,
/// zero mtime (deterministic output), no extra flags, OS byte `0x03`
/// ("unix") — the exact literal spec §4.6 specifies, so the same bytes
/// are produced regardless of the host platform.
const GZIP_HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03];

/// Where row bytes ultimately land.
pub enum Sink {
    File { file: File, path: PathBuf },
    Stdout(io::Stdout),
}

impl Sink {
    pub fn open(job: &Job) -> Result<Self> {
        match &job.destination {
            Destination::Stdout => Ok(Sink::Stdout(io::stdout())),
            Destination::File { path } => Ok(Sink::File {
                file: open_file(path, job.append)?,
                path: path.clone(),
            }),
        }
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let result = match self {
            Sink::File { file, .. } => file.write_all(bytes),
            Sink::Stdout(out) => out.write_all(bytes),
        };
        result.map_err(|source| self.write_error(source))
    }

    fn write_error(&self, source: io::Error) -> Error {
        match self {
            Sink::File { path, .. } => Error::Write {
                path: path.clone(),
                source,
            },
            Sink::Stdout(_) => Error::Write {
                path: PathBuf::from("<stdout>"),
                source,
            },
        }
    }

    /// Flush and close, suppressing the close error if an earlier
    /// failure already explains the job's outcome (spec §7 — a close
    /// failure after a write failure is noise, not new information).
    pub fn finish(self, earlier_failure: bool) -> Result<()> {
        match self {
            Sink::Stdout(mut out) => out.flush().map_err(|source| Error::Write {
                path: PathBuf::from("<stdout>"),
                source,
            }),
            Sink::File { mut file, path } => match file.flush() {
                Ok(()) => Ok(()),
                Err(source) if earlier_failure => {
                    let _ = source; // the earlier error is the one that matters
                    Ok(())
                }
                Err(source) => Err(Error::Close { path, source }),
            },
        }
    }
}

/// Open (or create) the destination, distinguishing "exists but isn't
/// writable" from "can't be created at all" in the error message —
/// `fwriteMain` makes the same distinction when `fopen` fails.
fn open_file(path: &Path, append: bool) -> Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true);
    if append {
        opts.append(true);
    } else {
        opts.truncate(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o666);
    }
    opts.open(path).map_err(|source| {
        let reason = if path.exists() {
            "file exists but could not be opened for writing".to_string()
        } else {
            "could not be created".to_string()
        };
        Error::Open {
            path: path.to_path_buf(),
            reason,
            source,
        }
    })
}

/// One task's private deflate stream: formats a batch, then
/// sync-flushes it into a standalone block that concatenates validly
/// with every other batch's block, in row order.
pub struct BatchCompressor {
    compress: Compress,
}

impl BatchCompressor {
    pub fn new() -> Self {
        BatchCompressor {
            // Raw deflate (no zlib header/adler32): `window_bits=15`,
            // `zlib_header=false` mirrors `deflateInit2` with
            // `windowBits=-15` in the upstream.
            compress: Compress::new_with_window_bits(Compression::default(), false, 15),
        }
    }

    /// Deflate `input`, sync-flushed so the block ends on a byte
    /// boundary and is independently valid to concatenate.
    pub fn compress_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() / 2 + 64);
        let before_in = self.compress.total_in();
        loop {
            let consumed_so_far = (self.compress.total_in() - before_in) as usize;
            let remaining = &input[consumed_so_far..];
            let status = self
                .compress
                .compress_vec(remaining, &mut out, FlushCompress::Sync)
                .map_err(|e| Error::Compression {
                    code: -1,
                    message: e.to_string(),
                })?;
            let now_consumed = (self.compress.total_in() - before_in) as usize;
            match status {
                Status::Ok | Status::BufError if now_consumed < input.len() => {
                    out.reserve(input.len());
                    continue;
                }
                _ => break,
            }
        }
        Ok(out)
    }
}

impl Default for BatchCompressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit a final, empty, `BFINAL=1` deflate block, properly terminating
/// the overall deflate stream that the independently-flushed batch
/// blocks were concatenated into. A fresh `Compress` is fine here since
/// the block carries no data of its own.
pub fn finish_stream() -> Result<Vec<u8>> {
    let mut compress = Compress::new_with_window_bits(Compression::default(), false, 15);
    let mut out = Vec::with_capacity(8);
    compress
        .compress_vec(&[], &mut out, FlushCompress::Finish)
        .map_err(|e| Error::Compression {
            code: -1,
            message: e.to_string(),
        })?;
    Ok(out)
}

/// Worst-case compressed size for a `source_len`-byte input, per zlib's
/// documented `deflateBound` formula — used only for the verbose
/// `zbuffSize=...` trace (SPEC_FULL.md §C.1), not for allocation, since
/// `flate2`/`Vec` grow on demand.
pub fn deflate_bound(source_len: usize) -> usize {
    source_len + (source_len >> 12) + (source_len >> 14) + (source_len >> 25) + 13
}

/// Write the fixed gzip member header.
pub fn write_header(buf: &mut Vec<u8>) {
    buf.extend_from_slice(&GZIP_HEADER);
}

/// Write the 8-byte gzip trailer: CRC-32 of the uncompressed stream,
/// then its length mod 2^32, both little-endian.
pub fn write_trailer(buf: &mut Vec<u8>, crc: u32, uncompressed_len: u64) {
    buf.extend_from_slice(&crc.to_le_bytes());
    buf.extend_from_slice(&((uncompressed_len & 0xFFFF_FFFF) as u32).to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_ten_bytes_and_starts_with_magic() {
        let mut buf = Vec::new();
        write_header(&mut buf);
        assert_eq!(buf.len(), 10);
        assert_eq!(&buf[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn trailer_is_eight_bytes_little_endian() {
        let mut buf = Vec::new();
        write_trailer(&mut buf, 0x12345678, 0x1_0000_0005);
        assert_eq!(buf.len(), 8);
        assert_eq!(&buf[..4], &0x1234_5678u32.to_le_bytes());
        assert_eq!(&buf[4..], &5u32.to_le_bytes());
    }

    #[test]
    fn compressed_blocks_concatenate_into_a_valid_stream() {
        use flate2::read::DeflateDecoder;
        use std::io::Read;

        let mut compressor = BatchCompressor::new();
        let mut stream = Vec::new();
        for chunk in [&b"hello, "[..], &b"world!"[..], &b" more data here"[..]] {
            stream.extend(compressor.compress_block(chunk).unwrap());
        }
        let mut decoder = DeflateDecoder::new(&stream[..]);
        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello, world! more data here");
    }

    #[test]
    fn independent_compressors_plus_finish_block_decode_as_one_stream() {
        use flate2::read::DeflateDecoder;
        use std::io::Read;

        let mut stream = Vec::new();
        for chunk in [&b"batch one "[..], &b"batch two "[..]] {
            // Each batch gets its own fresh compressor, as the engine does.
            let mut c = BatchCompressor::new();
            stream.extend(c.compress_block(chunk).unwrap());
        }
        stream.extend(finish_stream().unwrap());

        let mut decoder = DeflateDecoder::new(&stream[..]);
        let mut out = String::new();
        decoder.read_to_string(&mut out).unwrap();
        assert_eq!(out, "batch one batch two ");
    }
}
