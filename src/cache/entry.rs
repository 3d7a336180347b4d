use super::key::{sha256_hex, CacheKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// One cached value as stored in both tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub namespace: String,
    pub value: Value,
    pub created_at: DateTime<Utc>,
    /// Length of the serialized value
    pub size_bytes: u64,
    /// SHA-256 of the serialized value
    pub hash: String,
    /// Per-entry TTL overriding the cache default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<u64>,
}

impl CacheEntry {
    pub fn new(
        key: &CacheKey,
        value: Value,
        created_at: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> Result<Self, serde_json::Error> {
        let serialized = serde_json::to_vec(&value)?;
        Ok(Self {
            key: key.as_str().to_string(),
            namespace: key.namespace().to_string(),
            size_bytes: serialized.len() as u64,
            hash: sha256_hex(&serialized),
            value,
            created_at,
            ttl_ms: ttl.map(|t| t.as_millis() as u64),
        })
    }

    /// Whether the stored hash still matches the value
    pub fn verify(&self) -> bool {
        serde_json::to_vec(&self.value)
            .map(|bytes| sha256_hex(bytes) == self.hash)
            .unwrap_or(false)
    }

    pub fn ttl(&self, default_ttl: Duration) -> Duration {
        self.ttl_ms.map(Duration::from_millis).unwrap_or(default_ttl)
    }

    /// An entry is fresh while `now - created_at < ttl`
    pub fn is_expired(&self, now: DateTime<Utc>, default_ttl: Duration) -> bool {
        let Ok(age) = (now - self.created_at).to_std() else {
            // created in the future
            return false;
        };
        age >= self.ttl(default_ttl)
    }
}

/// Size and age of a persisted record, as needed for eviction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    pub key: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&CacheEntry> for EntryMeta {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            key: entry.key.clone(),
            size_bytes: entry.size_bytes,
            created_at: entry.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> CacheKey {
        CacheKey::new("test", &["entry"])
    }

    #[test]
    fn test_size_is_serialized_length() {
        let value = Value::String("x".repeat(38));
        let entry = CacheEntry::new(&key(), value, Utc::now(), None).unwrap();
        assert_eq!(entry.size_bytes, 40);
        assert!(entry.verify());
    }

    #[test]
    fn test_tampered_value_fails_verification() {
        let mut entry = CacheEntry::new(&key(), json!({"a": 1}), Utc::now(), None).unwrap();
        entry.value = json!({"a": 2});
        assert!(!entry.verify());
    }

    #[test]
    fn test_floats_verify_after_reload() {
        let value = json!({
            "ratio": 1.0 / 3.0,
            "sum": 0.1 + 0.2,
            "tiny": 1e-300,
            "mixed": [123456.789, 2.5e10, -0.000123]
        });
        let entry = CacheEntry::new(&key(), value, Utc::now(), None).unwrap();
        let text = serde_json::to_string(&entry).unwrap();

        let reloaded: CacheEntry = serde_json::from_str(&text).unwrap();
        assert!(reloaded.verify());
        assert_eq!(reloaded, entry);
    }

    #[test]
    fn test_expiry_uses_per_entry_ttl() {
        let created = Utc::now();
        let entry =
            CacheEntry::new(&key(), json!(1), created, Some(Duration::from_secs(10))).unwrap();
        let default_ttl = Duration::from_secs(3600);

        assert!(!entry.is_expired(created + chrono::Duration::seconds(9), default_ttl));
        assert!(entry.is_expired(created + chrono::Duration::seconds(10), default_ttl));
        assert!(!entry.is_expired(created - chrono::Duration::seconds(5), default_ttl));
    }

    #[test]
    fn test_record_json_is_camel_case() {
        let entry = CacheEntry::new(&key(), json!("v"), Utc::now(), None).unwrap();
        let record = serde_json::to_value(&entry).unwrap();
        assert!(record.get("createdAt").is_some());
        assert!(record.get("sizeBytes").is_some());
        assert!(record.get("ttlMs").is_none());
        assert_eq!(record["namespace"], "test");
    }
}
