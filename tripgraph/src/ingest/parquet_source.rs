use std::fs::File;
use std::path::Path;
use std::time::Instant;

use arrow::array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, RecordBatch,
    TimestampMicrosecondArray, TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;

use super::{TripLoadError, TripRecord};

/// the six columns retained from the TLC trip schema, in CSV output order.
pub const TRIP_COLUMNS: [&str; 6] = [
    "tpep_pickup_datetime",
    "tpep_dropoff_datetime",
    "PULocationID",
    "DOLocationID",
    "trip_distance",
    "fare_amount",
];

/// reads a TLC trip parquet file, projecting down to [`TRIP_COLUMNS`].
/// rows with a null in any retained column are dropped; they could never
/// pass the downstream filter.
pub fn read_trip_file(filepath: &Path) -> Result<Vec<TripRecord>, TripLoadError> {
    log::info!("Reading parquet file '{}'", filepath.display());
    let start = Instant::now();

    let file = File::open(filepath).map_err(|e| TripLoadError::ReadError {
        path: filepath.to_path_buf(),
        message: e.to_string(),
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|source| TripLoadError::ParquetReaderError { source })?;
    let mask = ProjectionMask::columns(builder.parquet_schema(), TRIP_COLUMNS);
    let reader = builder
        .with_projection(mask)
        .build()
        .map_err(|source| TripLoadError::ParquetReaderError { source })?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| TripLoadError::RecordBatchRetrievalError {
            source: e.into(),
        })?;
        batch_into_records(&batch, &mut records)?;
    }

    log::info!(
        "Read {} trip rows from '{}' in {:?}",
        records.len(),
        filepath.display(),
        start.elapsed()
    );
    Ok(records)
}

fn batch_into_records(
    batch: &RecordBatch,
    records: &mut Vec<TripRecord>,
) -> Result<(), TripLoadError> {
    let pickups = timestamp_column(batch, "tpep_pickup_datetime")?;
    let dropoffs = timestamp_column(batch, "tpep_dropoff_datetime")?;
    let pickup_zones = integer_column(batch, "PULocationID")?;
    let dropoff_zones = integer_column(batch, "DOLocationID")?;
    let distances = float_column(batch, "trip_distance")?;
    let fares = float_column(batch, "fare_amount")?;

    records.reserve(batch.num_rows());
    for row in 0..batch.num_rows() {
        let (
            Some(pickup_datetime),
            Some(dropoff_datetime),
            Some(pickup_zone),
            Some(dropoff_zone),
            Some(trip_distance),
            Some(fare_amount),
        ) = (
            pickups[row],
            dropoffs[row],
            pickup_zones[row],
            dropoff_zones[row],
            distances[row],
            fares[row],
        )
        else {
            continue;
        };
        records.push(TripRecord {
            pickup_datetime,
            dropoff_datetime,
            pickup_zone,
            dropoff_zone,
            trip_distance,
            fare_amount,
        });
    }
    Ok(())
}

fn named_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, TripLoadError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| TripLoadError::ColumnNotFoundError(name.to_string()))
}

fn cast_error(name: &str, found: &DataType) -> TripLoadError {
    TripLoadError::ColumnCastError(format!("column '{name}' has unsupported type {found}"))
}

/// TLC publishes microsecond timestamps, but older exports carry nanoseconds.
fn timestamp_column(
    batch: &RecordBatch,
    name: &str,
) -> Result<Vec<Option<NaiveDateTime>>, TripLoadError> {
    let array = named_column(batch, name)?;
    match array.data_type() {
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let typed = array
                .as_any()
                .downcast_ref::<TimestampMicrosecondArray>()
                .ok_or_else(|| cast_error(name, array.data_type()))?;
            Ok(typed
                .iter()
                .map(|v| {
                    v.and_then(|us| DateTime::from_timestamp_micros(us).map(|dt| dt.naive_utc()))
                })
                .collect())
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            let typed = array
                .as_any()
                .downcast_ref::<TimestampNanosecondArray>()
                .ok_or_else(|| cast_error(name, array.data_type()))?;
            Ok(typed
                .iter()
                .map(|v| v.map(|ns| DateTime::from_timestamp_nanos(ns).naive_utc()))
                .collect())
        }
        other => Err(cast_error(name, other)),
    }
}

fn integer_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<i64>>, TripLoadError> {
    let array = named_column(batch, name)?;
    match array.data_type() {
        DataType::Int64 => {
            let typed = array
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| cast_error(name, array.data_type()))?;
            Ok(typed.iter().collect())
        }
        DataType::Int32 => {
            let typed = array
                .as_any()
                .downcast_ref::<Int32Array>()
                .ok_or_else(|| cast_error(name, array.data_type()))?;
            Ok(typed.iter().map(|v| v.map(i64::from)).collect())
        }
        other => Err(cast_error(name, other)),
    }
}

fn float_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<f64>>, TripLoadError> {
    let array = named_column(batch, name)?;
    match array.data_type() {
        DataType::Float64 => {
            let typed = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| cast_error(name, array.data_type()))?;
            Ok(typed.iter().collect())
        }
        other => Err(cast_error(name, other)),
    }
}

#[cfg(test)]
mod test {
    use std::fs::File;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, RecordBatch, TimestampMicrosecondArray};
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
    use chrono::NaiveDate;
    use parquet::arrow::ArrowWriter;

    use super::read_trip_file;

    fn micros(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
            .and_utc()
            .timestamp_micros()
    }

    fn write_fixture(path: &std::path::Path) {
        // extra VendorID column up front exercises the projection
        let schema = Arc::new(Schema::new(vec![
            Field::new("VendorID", DataType::Int64, true),
            Field::new(
                "tpep_pickup_datetime",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                true,
            ),
            Field::new(
                "tpep_dropoff_datetime",
                DataType::Timestamp(TimeUnit::Microsecond, None),
                true,
            ),
            Field::new("PULocationID", DataType::Int64, true),
            Field::new("DOLocationID", DataType::Int64, true),
            Field::new("trip_distance", DataType::Float64, true),
            Field::new("fare_amount", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![Some(1), Some(2), Some(1)])),
                Arc::new(TimestampMicrosecondArray::from(vec![
                    Some(micros(2022, 3, 1, 8, 0, 0)),
                    Some(micros(2022, 3, 1, 9, 30, 0)),
                    None,
                ])),
                Arc::new(TimestampMicrosecondArray::from(vec![
                    Some(micros(2022, 3, 1, 8, 14, 30)),
                    Some(micros(2022, 3, 1, 9, 45, 12)),
                    Some(micros(2022, 3, 1, 10, 0, 0)),
                ])),
                Arc::new(Int64Array::from(vec![Some(3), Some(18), Some(20)])),
                Arc::new(Int64Array::from(vec![Some(18), Some(3), Some(31)])),
                Arc::new(Float64Array::from(vec![Some(1.2), Some(4.7), Some(2.0)])),
                Arc::new(Float64Array::from(vec![Some(10.0), Some(18.5), Some(9.0)])),
            ],
        )
        .unwrap();

        let file = File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_read_projects_columns_and_drops_null_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yellow_tripdata_2022-03.parquet");
        write_fixture(&path);

        let records = read_trip_file(&path).unwrap();

        // the third row has a null pickup timestamp and is dropped
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pickup_zone, 3);
        assert_eq!(records[0].dropoff_zone, 18);
        assert_eq!(records[0].trip_distance, 1.2);
        assert_eq!(records[0].fare_amount, 10.0);
        assert_eq!(
            records[0]
                .pickup_datetime
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
            "2022-03-01T08:00:00"
        );
        assert_eq!(records[1].pickup_zone, 18);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let result = read_trip_file(std::path::Path::new("/nonexistent/trips.parquet"));
        assert!(matches!(
            result,
            Err(crate::ingest::TripLoadError::ReadError { .. })
        ));
    }
}
