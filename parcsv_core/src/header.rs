//! Header assembly (spec §4.3): BOM, optional YAML front matter, and
//! the column-name row, built once into a single buffer before the
//! parallel row engine starts (mirrors `fwriteMain`'s one-shot header
//! write ahead of the `omp parallel` region).

use crate::format::{write_string, FormatCtx};
use crate::job::Job;

/// UTF-8 byte-order mark `fwriteMain` writes when `bom=true`.
const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Build the full header section: BOM (if requested), YAML front
/// matter (if any), and the column-name row (if `col_names` is set).
/// Returns an empty buffer when none of the three apply, so a
/// columns-only emission doesn't pay for an unused allocation.
pub fn header_bytes(job: &Job) -> Vec<u8> {
    let mut buf = Vec::new();
    if job.bom {
        buf.extend_from_slice(&BOM);
    }
    buf.extend_from_slice(&job.yaml);

    let Some(names) = &job.col_names else {
        return buf;
    };

    let ctx = FormatCtx::for_header(job);
    let mut first = true;
    if job.row_names.is_some() {
        // The row-name column gets a blank header cell, matching
        // `write.csv`'s convention of an empty leading field.
        first = false;
    }
    for name in names {
        if !first {
            buf.push(job.sep);
        }
        first = false;
        write_string(Some(name.as_str()), &ctx, &mut buf);
    }
    buf.extend_from_slice(&job.eol);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnData;
    use crate::job::{Destination, JobBuilder, QuoteMode, RowNames, WriterTag};

    fn base_job() -> JobBuilder {
        JobBuilder::new(Destination::Stdout)
            .column(ColumnData::Int32(vec![Some(1)]), WriterTag::Int32)
    }

    #[test]
    fn no_header_fields_means_empty_buffer() {
        let job = base_job().build().unwrap();
        assert!(header_bytes(&job).is_empty());
    }

    #[test]
    fn col_names_written_with_sep_and_eol() {
        let job = base_job()
            .col_names(vec!["a".to_string(), "b".to_string()])
            .build()
            .unwrap();
        assert_eq!(header_bytes(&job), b"a,b\n");
    }

    #[test]
    fn bom_and_yaml_prepended() {
        let job = base_job().bom(true).yaml(b"---\nkey: val\n---\n".to_vec()).build().unwrap();
        let bytes = header_bytes(&job);
        assert_eq!(&bytes[..3], &BOM);
        assert!(bytes.ends_with(b"---\n"));
    }

    #[test]
    fn row_names_add_blank_leading_field() {
        let job = base_job()
            .row_names(RowNames::Sequential)
            .col_names(vec!["a".to_string()])
            .build()
            .unwrap();
        assert_eq!(header_bytes(&job), b",a\n");
    }

    #[test]
    fn header_quote_independent_of_data_quote() {
        let job = base_job()
            .col_names(vec!["a".to_string()])
            .quote(QuoteMode::Off)
            .header_quote(QuoteMode::On)
            .build()
            .unwrap();
        assert_eq!(header_bytes(&job), b"\"a\"\n");
    }
}
