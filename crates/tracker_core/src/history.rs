use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in the recent-analyses list.
pub const RECENT_CAPACITY: usize = 6;

/// A completed analysis kept for quick re-access.
///
/// Serialized with the field names used by `/api/recent`, which is also the
/// shape of the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEntry {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(rename = "company", default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(rename = "industry", default, deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(rename = "metrics", default, deserialize_with = "lenient::string")]
    pub metrics_summary: String,
    #[serde(rename = "date", with = "lenient::date")]
    pub timestamp: DateTime<Utc>,
}

/// Prepends `entry` and keeps the [`RECENT_CAPACITY`] most recent entries.
/// Entries are never deduplicated.
pub fn prepend_capped(mut entries: Vec<RecentEntry>, entry: RecentEntry) -> Vec<RecentEntry> {
    entries.insert(0, entry);
    entries.truncate(RECENT_CAPACITY);
    entries
}

mod lenient {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];

    /// Strings pass through, numbers and booleans are rendered, null is empty.
    pub(super) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub(super) mod date {
        use super::*;

        pub(crate) fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&date.to_rfc3339())
        }

        pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            parse(raw.trim())
                .ok_or_else(|| de::Error::custom(format!("unrecognised date `{raw}`")))
        }
    }

    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}
