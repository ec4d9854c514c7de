mod brief;
mod campaign;
mod output;
mod phase_run;
mod reference;

pub use brief::*;
pub use campaign::*;
pub use output::*;
pub use phase_run::*;
pub use reference::*;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

// Timestamps are stored as Unix milliseconds.
pub(crate) fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

pub(crate) fn datetime_to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

pub(crate) fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_default()
}

pub(crate) fn parse_json(s: &str, fallback: Value) -> Value {
    serde_json::from_str(s).unwrap_or(fallback)
}

pub(crate) fn empty_object() -> Value {
    Value::Object(Default::default())
}
