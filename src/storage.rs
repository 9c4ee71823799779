//! Baseline persistence seam
//!
//! BaselineStore keeps its rolling windows in a keyed blob store behind the
//! `BaselineStorage` trait so hosts can plug in their own durable store and
//! tests can substitute an in-memory fake. Implementations must fail soft:
//! a read fault is `None`, a write fault is silently dropped.

use std::collections::HashMap;
use std::sync::Mutex;

/// Keyed blob store for baseline entry windows
pub trait BaselineStorage: Send + Sync {
    /// Read a blob; `None` when the key is absent or the read failed
    fn get(&self, key: &str) -> Option<String>;

    /// Write a blob, best-effort
    fn set(&self, key: &str, blob: &str);
}

/// In-memory storage, the default backing and the test substitute
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BaselineStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.blobs.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, blob: &str) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(key.to_string(), blob.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("baseline_hrv"), None);

        storage.set("baseline_hrv", r#"[{"date":"2024-01-15","value":52.0}]"#);
        assert_eq!(
            storage.get("baseline_hrv"),
            Some(r#"[{"date":"2024-01-15","value":52.0}]"#.to_string())
        );
    }

    #[test]
    fn test_overwrite() {
        let storage = MemoryStorage::new();
        storage.set("k", "one");
        storage.set("k", "two");
        assert_eq!(storage.get("k"), Some("two".to_string()));
    }
}
