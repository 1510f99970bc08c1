//! End-to-end scenarios exercising `parcsv_core::write` through its
//! public API, rather than individual formatter functions.

use parcsv_core::{ColumnData, Destination, JobBuilder, QuoteMode, RowNames, WriterTag};
use tempfile::NamedTempFile;

fn run_and_read(job: &parcsv_core::Job) -> String {
    parcsv_core::write(job).unwrap();
    match &job.destination {
        Destination::File { path } => std::fs::read_to_string(path).unwrap(),
        Destination::Stdout => panic!("test helper only supports file destinations"),
    }
}

#[test]
fn scenario_1_two_int32_columns_with_na() {
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(ColumnData::Int32(vec![Some(1), Some(3)]), WriterTag::Int32)
    .column(ColumnData::Int32(vec![Some(2), None]), WriterTag::Int32)
    .na("NA")
    .build()
    .unwrap();

    assert_eq!(run_and_read(&job), "1,2\n3,NA\n");
}

#[test]
fn scenario_2_float_formatting() {
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(
        ColumnData::Float64(vec![0.5, 3.1416, 30460.0, 0.0072, -0.0, f64::NAN, f64::INFINITY]),
        WriterTag::Float64,
    )
    .build()
    .unwrap();

    assert_eq!(run_and_read(&job), "0.5\n3.1416\n30460\n0.0072\n0\n\nInf\n");
}

#[test]
fn scenario_4_posixct_formatting() {
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(
        ColumnData::POSIXct(vec![0.0, 0.123_456, 1.000]),
        WriterTag::POSIXct,
    )
    .build()
    .unwrap();

    assert_eq!(
        run_and_read(&job),
        "1970-01-01T00:00:00Z\n1970-01-01T00:00:00.123456Z\n1970-01-01T00:00:01Z\n"
    );
}

#[test]
fn scenario_3_date_formatting() {
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(
        ColumnData::DateInt32(vec![Some(0), Some(-1), Some(2_932_896)]),
        WriterTag::DateInt32,
    )
    .build()
    .unwrap();

    assert_eq!(
        run_and_read(&job),
        "1970-01-01\n1969-12-31\n9999-12-31\n"
    );

    let tmp2 = NamedTempFile::new().unwrap();
    let squashed = JobBuilder::new(Destination::File {
        path: tmp2.path().to_path_buf(),
    })
    .column(
        ColumnData::DateInt32(vec![Some(0), Some(-1), Some(2_932_896)]),
        WriterTag::DateInt32,
    )
    .squash_date_time(true)
    .build()
    .unwrap();

    assert_eq!(run_and_read(&squashed), "19700101\n19691231\n99991231\n");
}

#[test]
fn scenario_5_quoted_string_with_embedded_quote() {
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(
        ColumnData::String(vec![
            Some(String::new()),
            Some("a,b".to_string()),
            Some("he said \"hi\"".to_string()),
        ]),
        WriterTag::String,
    )
    .build()
    .unwrap();

    assert_eq!(
        run_and_read(&job),
        "\"\"\n\"a,b\"\n\"he said \"\"hi\"\"\"\n"
    );
}

#[test]
fn string_with_embedded_comma_is_auto_quoted() {
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(
        ColumnData::String(vec![Some("a,b".to_string()), Some("plain".to_string())]),
        WriterTag::String,
    )
    .build()
    .unwrap();

    assert_eq!(run_and_read(&job), "\"a,b\"\nplain\n");
}

#[test]
fn non_empty_na_token_auto_promotes_quoting_to_always() {
    // spec §3: a non-empty NA token under quote=auto promotes the whole
    // job to quote=on, so a literal cell equal to the NA token (here,
    // the literal string "NULL") is still distinguishable from a
    // missing value once quoted.
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(
        ColumnData::String(vec![Some("NULL".to_string()), None]),
        WriterTag::String,
    )
    .na("NULL")
    .quote(QuoteMode::Auto)
    .build()
    .unwrap();

    assert_eq!(job.effective_quote(), QuoteMode::On);
    assert_eq!(run_and_read(&job), "\"NULL\"\nNULL\n");
}

#[test]
fn squashed_date_and_time_columns() {
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(ColumnData::DateInt32(vec![Some(0)]), WriterTag::DateInt32)
    .column(ColumnData::ITime(vec![Some(3_723)]), WriterTag::ITime)
    .squash_date_time(true)
    .build()
    .unwrap();

    assert_eq!(run_and_read(&job), "19700101,010203\n");
}

#[test]
fn row_names_from_an_explicit_column() {
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(ColumnData::Int32(vec![Some(10), Some(20)]), WriterTag::Int32)
    .row_names(RowNames::Column(ColumnData::String(vec![
        Some("r1".to_string()),
        Some("r2".to_string()),
    ])))
    .build()
    .unwrap();

    assert_eq!(run_and_read(&job), "r1,10\nr2,20\n");
}

#[test]
fn gzip_roundtrip_with_multiple_threads_matches_plain_output() {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let nrow = 20_000;
    let col = ColumnData::Float64((0..nrow).map(|i| i as f64 * 1.5).collect());

    let plain_tmp = NamedTempFile::new().unwrap();
    let plain_job = JobBuilder::new(Destination::File {
        path: plain_tmp.path().to_path_buf(),
    })
    .column(col.clone(), WriterTag::Float64)
    .build()
    .unwrap();
    let plain = run_and_read(&plain_job);

    let gz_tmp = NamedTempFile::new().unwrap();
    let gz_job = JobBuilder::new(Destination::File {
        path: gz_tmp.path().to_path_buf(),
    })
    .column(col, WriterTag::Float64)
    .buff_mb(1)
    .nth(6)
    .gzip(true)
    .build()
    .unwrap();
    parcsv_core::write(&gz_job).unwrap();

    let compressed = std::fs::read(gz_tmp.path()).unwrap();
    let mut decoder = GzDecoder::new(&compressed[..]);
    let mut decompressed = String::new();
    decoder.read_to_string(&mut decompressed).unwrap();

    assert_eq!(decompressed, plain);
}

#[test]
fn large_table_preserves_row_order_across_thread_counts() {
    let nrow = 200_000;
    let col = ColumnData::Int64((0..nrow as i64).map(Some).collect());

    let render = |nth: usize| -> String {
        let tmp = NamedTempFile::new().unwrap();
        let job = JobBuilder::new(Destination::File {
            path: tmp.path().to_path_buf(),
        })
        .column(col.clone(), WriterTag::Int64)
        .buff_mb(1)
        .nth(nth)
        .build()
        .unwrap();
        run_and_read(&job)
    };

    let single = render(1);
    let multi = render(8);
    assert_eq!(single, multi);
    assert_eq!(single.lines().next(), Some("0"));
    assert_eq!(single.lines().last(), Some((nrow - 1).to_string().as_str()));
}

#[test]
fn quote_off_never_quotes_even_with_separators_inside() {
    let tmp = NamedTempFile::new().unwrap();
    let job = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(
        ColumnData::String(vec![Some("a,b".to_string())]),
        WriterTag::String,
    )
    .quote(QuoteMode::Off)
    .build()
    .unwrap();

    assert_eq!(run_and_read(&job), "a,b\n");
}

#[test]
fn config_validation_rejects_mismatched_column_lengths() {
    let tmp = NamedTempFile::new().unwrap();
    let result = JobBuilder::new(Destination::File {
        path: tmp.path().to_path_buf(),
    })
    .column(ColumnData::Int32(vec![Some(1), Some(2)]), WriterTag::Int32)
    .column(ColumnData::Int32(vec![Some(1)]), WriterTag::Int32)
    .build();

    assert!(result.is_err());
}
