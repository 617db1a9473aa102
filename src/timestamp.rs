//! Unix-seconds → ISO-8601 conversion for export timestamps.
//!
//! Export files store `create_time`/`update_time` as fractional unix seconds.
//! Output records render them as UTC with millisecond precision and a `Z`
//! suffix (`2023-11-14T22:13:20.000Z`). Sub-millisecond digits are truncated.

use crate::error::{ConvertError, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Convert fractional unix seconds to a UTC timestamp (millisecond precision)
pub fn from_unix_seconds(secs: f64) -> Result<DateTime<Utc>> {
    let millis = (secs * 1000.0).trunc();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(ConvertError::InvalidTimestamp(secs));
    }
    DateTime::from_timestamp_millis(millis as i64).ok_or(ConvertError::InvalidTimestamp(secs))
}

/// Null or missing export timestamps coerce to the unix epoch
pub fn from_export(secs: Option<f64>) -> Result<DateTime<Utc>> {
    from_unix_seconds(secs.unwrap_or(0.0))
}

pub fn to_iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_iso<E: serde::de::Error>(s: &str) -> std::result::Result<DateTime<Utc>, E> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(E::custom)
}

/// Serde adapter for `DateTime<Utc>` fields
pub mod iso {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_iso(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_iso(&s)
    }
}

/// Serde adapter for `Option<DateTime<Utc>>` fields (`None` ⇄ `null`)
pub mod iso_option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => serializer.serialize_str(&super::to_iso(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => super::parse_iso(&s).map(Some),
            None => Ok(None),
        }
    }
}
