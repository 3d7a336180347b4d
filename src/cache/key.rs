use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Namespace for cached engine results
pub const ENGINE_BUILD_RESULT: &str = "engine-build-result";
/// Namespace for cached strategy resolutions
pub const STRATEGY_RESOLUTION: &str = "strategy-resolution";

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(bytes.as_ref()))
}

/// Content-addressed cache key: a stable hash over a namespace and logical parts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    namespace: String,
    hash: String,
}

impl CacheKey {
    pub fn new<S: AsRef<str>>(namespace: &str, parts: &[S]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        for part in parts {
            hasher.update([0u8]);
            hasher.update(part.as_ref().as_bytes());
        }
        Self {
            namespace: namespace.to_string(),
            hash: hex::encode(hasher.finalize()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The hex digest, also used as the persistent record name
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, &self.hash[..12.min(self.hash.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable_hex() {
        let a = CacheKey::new(ENGINE_BUILD_RESULT, &["manifest", "config", "engine"]);
        let b = CacheKey::new(ENGINE_BUILD_RESULT, &["manifest", "config", "engine"]);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_namespace_isolates_keys() {
        let build = CacheKey::new(ENGINE_BUILD_RESULT, &["x"]);
        let strategy = CacheKey::new(STRATEGY_RESOLUTION, &["x"]);
        assert_ne!(build.as_str(), strategy.as_str());
        assert_eq!(strategy.namespace(), STRATEGY_RESOLUTION);
    }

    #[test]
    fn test_part_boundaries_matter() {
        let a = CacheKey::new("ns", &["ab", "c"]);
        let b = CacheKey::new("ns", &["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_display_is_short() {
        let key = CacheKey::new("ns", &["a"]);
        assert_eq!(key.to_string().len(), "ns:".len() + 12);
    }
}
