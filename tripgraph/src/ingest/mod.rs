mod error;
mod parquet_source;
mod retry;
pub mod timestamp_codec;
mod trip_filter;
mod trip_loader;
mod trip_record;

pub use error::TripLoadError;
pub use parquet_source::read_trip_file;
pub use retry::{run_with_retry, RetryPolicy};
pub use trip_filter::TripFilter;
pub use trip_loader::{stage_csv_file, TripLoader};
pub use trip_record::TripRecord;
