//! Timestamps on the wire use `yyyy-MM-dd HH:mm:ss`, always in UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp in the wire format.
pub fn format(datetime: &DateTime<Utc>) -> String {
    datetime.format(WIRE_FORMAT).to_string()
}

/// Parse a timestamp in the wire format.
pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), WIRE_FORMAT)?;
    Ok(Utc.from_utc_datetime(&naive))
}

pub fn serialize<S>(datetime: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(datetime))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(|e| D::Error::custom(format!("expected `yyyy-MM-dd HH:mm:ss`: {e}")))
}

/// The same format for optional fields; `null` and absent both mean `None`.
pub mod option {
    use super::*;

    pub fn serialize<S>(datetime: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(datetime) => super::serialize(datetime, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => parse(&s)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("expected `yyyy-MM-dd HH:mm:ss`: {e}"))),
            None => Ok(None),
        }
    }
}
