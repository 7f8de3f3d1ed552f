//! Persisted cache entry format.

use crate::types::Message;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// One cached response, stored as `<fingerprint>.json`.
///
/// There is no schema version field; changing this layout invalidates every
/// entry already on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(with = "utc_timestamp")]
    pub cached_at: DateTime<Utc>,
    pub model: String,
    pub messages: Vec<Message>,
    pub response: serde_json::Value,
}

impl CacheEntry {
    /// Stamp a new entry with the current UTC time.
    pub(crate) fn now(model: &str, messages: &[Message], response: serde_json::Value) -> Self {
        Self {
            cached_at: Utc::now(),
            model: model.to_string(),
            messages: messages.to_vec(),
            response,
        }
    }

    /// Time elapsed since the entry was written. Negative when `cached_at` lies
    /// in the future (clock skew between writers).
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.cached_at)
    }

    /// `age >= limit`. A limit too large to represent never elapses.
    pub fn is_older_than(&self, now: DateTime<Utc>, limit: Duration) -> bool {
        match chrono::Duration::from_std(limit) {
            Ok(limit) => self.age(now) >= limit,
            Err(_) => false,
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_bytes(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }
}

/// ISO-8601 timestamps, always written in UTC with a `Z` suffix.
///
/// Reading also accepts timestamps without an offset and interprets them as
/// UTC. Entries from writers that hashed a differently formatted request are
/// never found by `get` (their file names differ); only `clear` removes them.
mod utc_timestamp {
    use super::*;

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, NAIVE_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
