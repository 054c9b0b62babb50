use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use thiserror::Error;

/// 0001-01-01T00:00:00Z
const MIN_VALID_SECONDS: i64 = -62_135_596_800;
/// 10000-01-01T00:00:00Z, exclusive
const MAX_VALID_SECONDS: i64 = 253_402_300_800;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidTimestamp {
    #[error("timestamp: nil Timestamp")]
    Missing,
    #[error("timestamp: seconds:{seconds} nanos:{nanos} before 0001-01-01")]
    TooEarly { seconds: i64, nanos: i32 },
    #[error("timestamp: seconds:{seconds} nanos:{nanos} after 10000-01-01")]
    TooLate { seconds: i64, nanos: i32 },
    #[error("timestamp: seconds:{seconds} nanos:{nanos} has out-of-range nanos")]
    Nanos { seconds: i64, nanos: i32 },
}

/// Converts a platform timestamp into a UTC time, rejecting values outside the
/// range a protobuf `Timestamp` may legally hold.
pub fn to_datetime(ts: Option<&Timestamp>) -> Result<DateTime<Utc>, InvalidTimestamp> {
    let ts = ts.ok_or(InvalidTimestamp::Missing)?;
    let (seconds, nanos) = (ts.seconds, ts.nanos);
    if seconds < MIN_VALID_SECONDS {
        return Err(InvalidTimestamp::TooEarly { seconds, nanos });
    }
    if seconds >= MAX_VALID_SECONDS {
        return Err(InvalidTimestamp::TooLate { seconds, nanos });
    }
    if !(0..1_000_000_000).contains(&nanos) {
        return Err(InvalidTimestamp::Nanos { seconds, nanos });
    }
    DateTime::<Utc>::from_timestamp(seconds, nanos as u32)
        .ok_or(InvalidTimestamp::TooLate { seconds, nanos })
}

pub fn from_datetime(value: &DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: value.timestamp(),
        nanos: value.timestamp_subsec_nanos() as i32,
    }
}
