//! Parquet reader (columnar binary format)

use std::fs::File;
use std::path::Path;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Date64Array, Float16Array, Float32Array,
    Float64Array, Int16Array, Int32Array, Int64Array, Int8Array, StringArray,
    TimestampMicrosecondArray, TimestampMillisecondArray, TimestampNanosecondArray,
    TimestampSecondArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::DataType as ArrowType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{DitError, Result};
use crate::model::{CellValue, Column, ColumnType, Table, TableBuilder};

use super::{ReadOptions, Reader};

/// Reader for Parquet files. Types come from the embedded schema rather
/// than inference; its primitives map onto the semantic type enum.
pub struct ParquetReader;

impl Reader for ParquetReader {
    fn read(&self, path: &Path, opts: &ReadOptions) -> Result<Table> {
        let file = File::open(path)?;

        let reader_builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| DitError::parse(path, None, e.to_string()))?;
        let schema = reader_builder.schema().clone();
        let reader = reader_builder
            .build()
            .map_err(|e| DitError::parse(path, None, e.to_string()))?;

        let columns: Vec<Column> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                Column::with_type(field.name().clone(), i, arrow_type_to_column_type(field.data_type()))
            })
            .collect();

        let mut builder = TableBuilder::with_types(columns);

        'batches: for batch in reader {
            let batch = batch.map_err(|e| DitError::parse(path, None, e.to_string()))?;
            for row_idx in 0..batch.num_rows() {
                if opts.reached(builder.row_count()) {
                    break 'batches;
                }
                builder.push_row(
                    batch
                        .columns()
                        .iter()
                        .map(|col| extract_cell_value(col, row_idx))
                        .collect(),
                );
            }
        }

        Ok(builder.build())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext, "parquet" | "pq")
    }
}

fn arrow_type_to_column_type(arrow_type: &ArrowType) -> ColumnType {
    match arrow_type {
        ArrowType::Boolean => ColumnType::Boolean,
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32
        | ArrowType::UInt64 => ColumnType::Integer,
        ArrowType::Float16 | ArrowType::Float32 | ArrowType::Float64 => ColumnType::Float,
        ArrowType::Utf8 | ArrowType::LargeUtf8 => ColumnType::Text,
        ArrowType::Date32 | ArrowType::Date64 | ArrowType::Timestamp(_, _) => {
            ColumnType::Timestamp
        }
        // Complex types are carried as their display text
        _ => ColumnType::Text,
    }
}

fn extract_cell_value(array: &ArrayRef, row_idx: usize) -> CellValue {
    if array.is_null(row_idx) {
        return CellValue::Null;
    }

    match array.data_type() {
        ArrowType::Boolean => {
            let arr = array.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row_idx))
        }
        ArrowType::Int8 => {
            let arr = array.as_any().downcast_ref::<Int8Array>().unwrap();
            CellValue::Int(arr.value(row_idx) as i64)
        }
        ArrowType::Int16 => {
            let arr = array.as_any().downcast_ref::<Int16Array>().unwrap();
            CellValue::Int(arr.value(row_idx) as i64)
        }
        ArrowType::Int32 => {
            let arr = array.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Int(arr.value(row_idx) as i64)
        }
        ArrowType::Int64 => {
            let arr = array.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Int(arr.value(row_idx))
        }
        ArrowType::UInt8 => {
            let arr = array.as_any().downcast_ref::<UInt8Array>().unwrap();
            CellValue::Int(arr.value(row_idx) as i64)
        }
        ArrowType::UInt16 => {
            let arr = array.as_any().downcast_ref::<UInt16Array>().unwrap();
            CellValue::Int(arr.value(row_idx) as i64)
        }
        ArrowType::UInt32 => {
            let arr = array.as_any().downcast_ref::<UInt32Array>().unwrap();
            CellValue::Int(arr.value(row_idx) as i64)
        }
        ArrowType::UInt64 => {
            // Values above i64::MAX saturate rather than wrap negative
            let arr = array.as_any().downcast_ref::<UInt64Array>().unwrap();
            CellValue::Int(i64::try_from(arr.value(row_idx)).unwrap_or(i64::MAX))
        }
        ArrowType::Float16 => {
            let arr = array.as_any().downcast_ref::<Float16Array>().unwrap();
            CellValue::Float(arr.value(row_idx).to_f64())
        }
        ArrowType::Float32 => {
            let arr = array.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row_idx) as f64)
        }
        ArrowType::Float64 => {
            let arr = array.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row_idx))
        }
        ArrowType::Utf8 => {
            let arr = array.as_any().downcast_ref::<StringArray>().unwrap();
            CellValue::Str(arr.value(row_idx).to_string())
        }
        ArrowType::Date32 => {
            let arr = array.as_any().downcast_ref::<Date32Array>().unwrap();
            let days = arr.value(row_idx);
            // Date32 counts days from the Unix epoch; 719163 converts to CE days
            match chrono::NaiveDate::from_num_days_from_ce_opt(days + 719163)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
            {
                Some(dt) => CellValue::Timestamp(dt),
                None => CellValue::Int(days as i64),
            }
        }
        ArrowType::Date64 => {
            let arr = array.as_any().downcast_ref::<Date64Array>().unwrap();
            // Date64 counts milliseconds from the Unix epoch
            match chrono::DateTime::from_timestamp_millis(arr.value(row_idx)) {
                Some(dt) => CellValue::Timestamp(dt.naive_utc()),
                None => CellValue::Null,
            }
        }
        ArrowType::Timestamp(unit, _) => {
            let nanos = match unit {
                arrow::datatypes::TimeUnit::Second => {
                    let arr = array.as_any().downcast_ref::<TimestampSecondArray>().unwrap();
                    arr.value(row_idx) * 1_000_000_000
                }
                arrow::datatypes::TimeUnit::Millisecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampMillisecondArray>()
                        .unwrap();
                    arr.value(row_idx) * 1_000_000
                }
                arrow::datatypes::TimeUnit::Microsecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampMicrosecondArray>()
                        .unwrap();
                    arr.value(row_idx) * 1_000
                }
                arrow::datatypes::TimeUnit::Nanosecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampNanosecondArray>()
                        .unwrap();
                    arr.value(row_idx)
                }
            };
            CellValue::Timestamp(chrono::DateTime::from_timestamp_nanos(nanos).naive_utc())
        }
        _ => {
            let formatter = arrow::util::display::ArrayFormatter::try_new(
                array.as_ref(),
                &arrow::util::display::FormatOptions::default(),
            );
            match formatter {
                Ok(fmt) => CellValue::Str(fmt.value(row_idx).to_string()),
                Err(_) => CellValue::Null,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn uint64_above_i64_max_saturates() {
        let array: ArrayRef = Arc::new(UInt64Array::from(vec![u64::MAX, 7]));
        assert_eq!(extract_cell_value(&array, 0), CellValue::Int(i64::MAX));
        assert_eq!(extract_cell_value(&array, 1), CellValue::Int(7));
    }

    #[test]
    fn date64_extracts_as_timestamp() {
        // 2021-01-01T00:00:10 UTC in epoch milliseconds
        let array: ArrayRef = Arc::new(Date64Array::from(vec![1_609_459_210_000i64]));
        match extract_cell_value(&array, 0) {
            CellValue::Timestamp(dt) => {
                assert_eq!(dt.to_string(), "2021-01-01 00:00:10")
            }
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn float16_extracts_as_float() {
        let array: ArrayRef = Arc::new(Float16Array::from(vec![half::f16::from_f32(1.5)]));
        assert_eq!(extract_cell_value(&array, 0), CellValue::Float(1.5));
    }

    #[test]
    fn primitive_type_mapping() {
        assert_eq!(arrow_type_to_column_type(&ArrowType::Int32), ColumnType::Integer);
        assert_eq!(arrow_type_to_column_type(&ArrowType::UInt64), ColumnType::Integer);
        assert_eq!(arrow_type_to_column_type(&ArrowType::Float64), ColumnType::Float);
        assert_eq!(arrow_type_to_column_type(&ArrowType::Utf8), ColumnType::Text);
        assert_eq!(arrow_type_to_column_type(&ArrowType::Boolean), ColumnType::Boolean);
    }
}
