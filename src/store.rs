use crate::config::StoreConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Uploaded image plus its enrichments. Immutable once inserted; correlation
/// between the upload request and a later generation request happens through
/// the generated id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub data_uri: String,
    pub description: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    pub fn new(
        data_uri: impl Into<String>,
        description: Option<String>,
        file_name: Option<String>,
    ) -> Self {
        Self {
            data_uri: data_uri.into(),
            description,
            file_name,
            created_at: Utc::now(),
        }
    }
}

struct StoreInner {
    entries: HashMap<String, (ImageRecord, Instant)>,
    order: VecDeque<String>,
}

/// In-process image store. Bounded by entry count and TTL so a long-lived
/// process does not accumulate every upload it has ever seen; eviction is
/// oldest-first and runs on insert.
pub struct ImageStore {
    inner: Mutex<StoreInner>,
    max_entries: usize,
    ttl: Duration,
}

impl ImageStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_entries: config.max_entries.max(1),
            ttl: Duration::from_secs(config.ttl_seconds),
        }
    }

    /// Stores a record under a fresh opaque id and returns the id.
    pub fn insert(&self, record: ImageRecord) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Instant::now();

        let mut inner = self.inner.lock().unwrap();

        while let Some(front) = inner.order.front() {
            let expired = inner
                .entries
                .get(front)
                .map(|(_, inserted)| now.duration_since(*inserted) >= self.ttl)
                .unwrap_or(true);
            if !expired {
                break;
            }
            let front = inner.order.pop_front().unwrap();
            inner.entries.remove(&front);
        }

        while inner.entries.len() >= self.max_entries {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.entries.insert(id.clone(), (record, now));
        inner.order.push_back(id.clone());

        log::debug!("stored image {} ({} entries)", id, inner.entries.len());
        id
    }

    /// Unknown or expired ids return None, never an error.
    pub fn get(&self, id: &str) -> Option<ImageRecord> {
        let inner = self.inner.lock().unwrap();
        inner.entries.get(id).and_then(|(record, inserted)| {
            if inserted.elapsed() >= self.ttl {
                None
            } else {
                Some(record.clone())
            }
        })
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(max_entries: usize, ttl_seconds: u64) -> ImageStore {
        ImageStore::new(
            StoreConfig::new()
                .with_capacity(max_entries)
                .with_ttl_seconds(ttl_seconds),
        )
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let store = store_with(16, 3600);
        let record = ImageRecord::new(
            "data:image/png;base64,abc",
            Some("a login form".to_string()),
            Some("login.png".to_string()),
        );

        let id = store.insert(record.clone());
        let fetched = store.get(&id).unwrap();

        assert_eq!(fetched.data_uri, record.data_uri);
        assert_eq!(fetched.description.as_deref(), Some("a login form"));
        assert_eq!(fetched.file_name.as_deref(), Some("login.png"));
    }

    #[test]
    fn test_unknown_id_returns_none() {
        let store = store_with(16, 3600);
        assert!(store.get("no-such-id").is_none());
    }

    #[test]
    fn test_ids_are_unique_per_insert() {
        let store = store_with(16, 3600);
        let a = store.insert(ImageRecord::new("data:,a", None, None));
        let b = store.insert(ImageRecord::new("data:,b", None, None));
        assert_ne!(a, b);
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let store = store_with(2, 3600);
        let first = store.insert(ImageRecord::new("data:,1", None, None));
        let second = store.insert(ImageRecord::new("data:,2", None, None));
        let third = store.insert(ImageRecord::new("data:,3", None, None));

        assert!(store.get(&first).is_none());
        assert!(store.get(&second).is_some());
        assert!(store.get(&third).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_expired_entries_are_gone() {
        let store = store_with(16, 0);
        let id = store.insert(ImageRecord::new("data:,x", None, None));
        assert!(store.get(&id).is_none());
    }
}
