//! String, categorical, and list formatters (spec §4.1 "String",
//! "CategString", "List").
//!
//! Ported from `fwrite.c`'s `write_string`/`writeString`: a single
//! forward scan decides whether quoting is needed (auto mode), then a
//! second pass copies bytes through, doubling or backslash-escaping
//! embedded quote characters. The scan-then-copy split avoids the
//! upstream's "scan, rewind, and requote" backtrack — in safe Rust we
//! just decide first.

use super::{write_cell_value, FormatCtx};
use crate::column::CellValue;
use crate::job::{QuoteMethod, QuoteMode};

/// Quote iff the job's mode says always, or (in `auto`) the field is
/// empty or contains a byte that would otherwise be ambiguous: `sep`,
/// `sep2` (list items reuse this same scan), `"`, `\n`, or `\r`. An
/// empty string is always quoted so it can never be confused with the
/// (possibly empty) NA token.
fn needs_quote(bytes: &[u8], ctx: &FormatCtx) -> bool {
    match ctx.quote {
        QuoteMode::On => true,
        QuoteMode::Off => false,
        QuoteMode::Auto => {
            bytes.is_empty()
                || bytes
                    .iter()
                    .any(|&b| b == ctx.sep || b == ctx.sep2 || b == b'"' || b == b'\n' || b == b'\r')
        }
    }
}

fn write_quoted_field(bytes: &[u8], ctx: &FormatCtx, buf: &mut Vec<u8>) {
    if !needs_quote(bytes, ctx) {
        buf.extend_from_slice(bytes);
        return;
    }
    buf.push(b'"');
    match ctx.qmethod {
        QuoteMethod::Double => {
            for &b in bytes {
                if b == b'"' {
                    buf.push(b'"');
                }
                buf.push(b);
            }
        }
        QuoteMethod::Backslash => {
            for &b in bytes {
                if b == b'"' || b == b'\\' {
                    buf.push(b'\\');
                }
                buf.push(b);
            }
        }
    }
    buf.push(b'"');
}

/// Write a `String` cell, or the NA token (never quoted) if `s` is `None`.
pub fn write_string(s: Option<&str>, ctx: &FormatCtx, buf: &mut Vec<u8>) {
    match s {
        Some(s) => write_quoted_field(s.as_bytes(), ctx, buf),
        None => buf.extend_from_slice(ctx.na),
    }
}

/// Write a resolved `CategString` label; identical quoting rules to
/// plain strings once the category code has been resolved to text.
pub fn write_categ_string(s: Option<&str>, ctx: &FormatCtx, buf: &mut Vec<u8>) {
    write_string(s, ctx, buf)
}

/// Write a `List` cell: `None` is NA, otherwise each item is formatted
/// by its own writer (recursing through [`write_cell_value`]) and the
/// items are joined with `sep2`.
pub fn write_list(items: Option<&[CellValue]>, ctx: &FormatCtx, buf: &mut Vec<u8>) {
    match items {
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(ctx.sep2);
                }
                write_cell_value(ctx, item, buf);
            }
        }
        None => buf.extend_from_slice(ctx.na),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Destination, JobBuilder, WriterTag};
    use crate::column::ColumnData;

    fn ctx_with(quote: QuoteMode, qmethod: QuoteMethod) -> crate::job::Job {
        JobBuilder::new(Destination::Stdout)
            .column(ColumnData::String(vec![Some("x".to_string())]), WriterTag::String)
            .quote(quote)
            .qmethod(qmethod)
            .build()
            .unwrap()
    }

    fn render(s: Option<&str>, quote: QuoteMode, qmethod: QuoteMethod) -> String {
        let job = ctx_with(quote, qmethod);
        let ctx = FormatCtx::for_data(&job);
        let mut buf = Vec::new();
        write_string(s, &ctx, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn quote_off_never_quotes() {
        assert_eq!(render(Some("hello"), QuoteMode::Off, QuoteMethod::Double), "hello");
        assert_eq!(render(Some("a,b"), QuoteMode::Off, QuoteMethod::Double), "a,b");
    }

    #[test]
    fn quote_on_always_quotes() {
        assert_eq!(render(Some("hello"), QuoteMode::On, QuoteMethod::Double), "\"hello\"");
    }

    #[test]
    fn auto_quotes_only_when_needed() {
        assert_eq!(render(Some("hello"), QuoteMode::Auto, QuoteMethod::Double), "hello");
        assert_eq!(render(Some("a,b"), QuoteMode::Auto, QuoteMethod::Double), "\"a,b\"");
        assert_eq!(render(Some(""), QuoteMode::Auto, QuoteMethod::Double), "\"\"");
    }

    #[test]
    fn embedded_quote_doubled() {
        assert_eq!(
            render(Some("say \"hi\""), QuoteMode::Auto, QuoteMethod::Double),
            "\"say \"\"hi\"\"\""
        );
    }

    #[test]
    fn embedded_quote_backslash_escaped() {
        assert_eq!(
            render(Some("say \"hi\""), QuoteMode::On, QuoteMethod::Backslash),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn na_is_never_quoted() {
        assert_eq!(render(None, QuoteMode::On, QuoteMethod::Double), "");
    }

    #[test]
    fn list_joins_with_sep2_and_recurses() {
        let job = JobBuilder::new(Destination::Stdout)
            .column(ColumnData::List(vec![None]), WriterTag::List)
            .sep2(b'|')
            .quote(QuoteMode::Auto)
            .build()
            .unwrap();
        let ctx = FormatCtx::for_data(&job);
        let mut buf = Vec::new();
        write_list(
            Some(&[
                CellValue::Int32(Some(1)),
                CellValue::Int32(Some(2)),
                CellValue::Str(Some("x".to_string())),
            ]),
            &ctx,
            &mut buf,
        );
        assert_eq!(String::from_utf8(buf).unwrap(), "1|2|x");
    }
}
