//! serde codec writing timestamps in the ISO-like form the store's native
//! `datetime()` parser accepts: second precision, no timezone suffix.

use chrono::NaiveDateTime;
use serde::{self, Deserialize, Deserializer, Serializer};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn serialize<S>(datetime: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = datetime.format(TIMESTAMP_FORMAT).to_string();
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
}
