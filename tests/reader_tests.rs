//! File-based reader tests, including cross-format equivalence

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use dit::model::{CellValue, ColumnType};
use dit::{DitError, ReadOptions, ReaderFactory};

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn write_parquet(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("score", DataType::Float64, true),
        Field::new("active", DataType::Boolean, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec![Some("alice"), Some("bob")])),
            Arc::new(Float64Array::from(vec![1.5, 2.0])),
            Arc::new(BooleanArray::from(vec![true, false])),
        ],
    )
    .unwrap();

    let file = File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    path
}

#[test]
fn cross_format_equivalence() {
    let dir = TempDir::new().unwrap();
    let csv = write_file(
        &dir,
        "data.csv",
        "id,name,score,active\n1,alice,1.5,true\n2,bob,2.0,false\n",
    );
    let json = write_file(
        &dir,
        "data.json",
        r#"[{"id": 1, "name": "alice", "score": 1.5, "active": true},
            {"id": 2, "name": "bob", "score": 2.0, "active": false}]"#,
    );
    let ndjson = write_file(
        &dir,
        "data.ndjson",
        "{\"id\": 1, \"name\": \"alice\", \"score\": 1.5, \"active\": true}\n\
         {\"id\": 2, \"name\": \"bob\", \"score\": 2.0, \"active\": false}\n",
    );
    let parquet = write_parquet(&dir, "data.parquet");

    let factory = ReaderFactory::new();
    let opts = ReadOptions::default();
    let tables: Vec<_> = [&csv, &json, &ndjson, &parquet]
        .iter()
        .map(|p| factory.read(p, &opts).unwrap())
        .collect();

    let reference = &tables[0];
    let names: Vec<&str> = reference.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["id", "name", "score", "active"]);
    let types: Vec<ColumnType> = reference.columns().iter().map(|c| c.ty).collect();
    assert_eq!(
        types,
        [
            ColumnType::Integer,
            ColumnType::Text,
            ColumnType::Float,
            ColumnType::Boolean
        ]
    );

    for table in &tables[1..] {
        assert_eq!(
            table
                .columns()
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>(),
            names
        );
        assert_eq!(
            table.columns().iter().map(|c| c.ty).collect::<Vec<_>>(),
            types
        );
        assert_eq!(table.rows(), reference.rows());
    }
}

#[test]
fn csv_limit_narrows_ingestion_and_sample() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "data.csv", "v\n1\n2\nx\n");

    let factory = ReaderFactory::new();
    let full = factory.read(&path, &ReadOptions::default()).unwrap();
    assert_eq!(full.row_count(), 3);
    assert_eq!(full.columns()[0].ty, ColumnType::Text);

    let capped = factory.read(&path, &ReadOptions::with_limit(2)).unwrap();
    assert_eq!(capped.row_count(), 2);
    // the non-numeric value was never sampled
    assert_eq!(capped.columns()[0].ty, ColumnType::Integer);
}

#[test]
fn tsv_uses_tab_delimiter() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "data.tsv", "a\tb\n1\tx\n");
    let table = ReaderFactory::new()
        .read(&path, &ReadOptions::default())
        .unwrap();
    assert_eq!(table.column_count(), 2);
    assert_eq!(table.rows()[0].cells[1], CellValue::Str("x".into()));
}

#[test]
fn json_single_object_is_one_row() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "one.json", r#"{"a": 1, "b": "x"}"#);
    let table = ReaderFactory::new()
        .read(&path, &ReadOptions::default())
        .unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.rows()[0].cells[0], CellValue::Int(1));
}

#[test]
fn json_empty_array_is_empty_table() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.json", "[]");
    let table = ReaderFactory::new()
        .read(&path, &ReadOptions::default())
        .unwrap();
    assert_eq!(table.column_count(), 0);
    assert_eq!(table.row_count(), 0);
}

#[test]
fn ndjson_key_union_yields_null_cells() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "data.ndjson", "{\"a\": 1, \"b\": 2}\n{\"a\": 3}\n");
    let table = ReaderFactory::new()
        .read(&path, &ReadOptions::default())
        .unwrap();
    assert_eq!(table.column_count(), 2);
    assert!(table.rows()[1].cells[1].is_null());
    assert!(table.columns()[1].nullable);
}

#[test]
fn malformed_json_is_a_parse_error_with_line() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.ndjson", "{\"a\": 1}\nnot json\n");
    let err = ReaderFactory::new()
        .read(&path, &ReadOptions::default())
        .unwrap_err();
    match err {
        DitError::Parse { line, .. } => assert_eq!(line, Some(2)),
        other => panic!("expected parse error, got {other}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let err = ReaderFactory::new()
        .read(std::path::Path::new("/no/such/file.csv"), &ReadOptions::default())
        .unwrap_err();
    assert!(matches!(err, DitError::Io(_)));
}

#[test]
fn extensionless_files_are_sniffed() {
    let dir = TempDir::new().unwrap();

    let csvish = write_file(&dir, "rows", "a,b\n1,2\n");
    let table = ReaderFactory::new()
        .read(&csvish, &ReadOptions::default())
        .unwrap();
    assert_eq!(table.column_count(), 2);

    let ndjsonish = write_file(&dir, "records", "{\"a\": 1}\n{\"a\": 2}\n");
    let table = ReaderFactory::new()
        .read(&ndjsonish, &ReadOptions::default())
        .unwrap();
    assert_eq!(table.row_count(), 2);
}

#[test]
fn unrecognizable_content_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "mystery.bin", "");
    let err = ReaderFactory::new()
        .read(&path, &ReadOptions::default())
        .unwrap_err();
    assert!(matches!(err, DitError::UnsupportedFormat { .. }));
}

#[test]
fn parquet_respects_limit() {
    let dir = TempDir::new().unwrap();
    let path = write_parquet(&dir, "data.parquet");
    let table = ReaderFactory::new()
        .read(&path, &ReadOptions::with_limit(1))
        .unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.rows()[0].cells[0], CellValue::Int(1));
}
