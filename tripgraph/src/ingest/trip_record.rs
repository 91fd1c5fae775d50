use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp_codec;

/// One yellow-cab trip, reduced to the six columns the graph load uses.
/// Serde renames match the TLC parquet schema so the serialized CSV header
/// lines up with the column names the bulk-load statements reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    #[serde(rename = "tpep_pickup_datetime", with = "timestamp_codec")]
    pub pickup_datetime: NaiveDateTime,
    #[serde(rename = "tpep_dropoff_datetime", with = "timestamp_codec")]
    pub dropoff_datetime: NaiveDateTime,
    #[serde(rename = "PULocationID")]
    pub pickup_zone: i64,
    #[serde(rename = "DOLocationID")]
    pub dropoff_zone: i64,
    pub trip_distance: f64,
    pub fare_amount: f64,
}
