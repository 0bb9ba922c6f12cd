//! Cleanup-on-delete hook and thumbnail URL accessors.
//!
//! Whoever owns the record-deletion transaction calls
//! [`purge_derivatives`] after removing the row. Each file deletion is
//! independent and best-effort: a missing file is not an error, and a
//! storage error is logged and swallowed so the record deletion itself is
//! never blocked by the content store.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::model::UnitImage;
use crate::store::ContentStore;

/// Public thumbnail URLs keyed by record id. Derivatives never change in
/// place once created, so entries are never invalidated — only a record's
/// existence changes.
static THUMBNAIL_URLS: Lazy<Mutex<HashMap<Uuid, String>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Delete the full-size file and every derivative named by
/// `thumbnail_sizes` from the content store.
pub async fn purge_derivatives(store: &dyn ContentStore, image: &UnitImage) {
    for path in image.all_paths() {
        if let Err(e) = store.delete(&path).await {
            warn!(%path, error = %e, "failed to delete image derivative");
        }
    }
}

/// Public URL of the smallest derivative — the canonical thumbnail.
pub fn thumbnail_url(store: &dyn ContentStore, image: &UnitImage) -> String {
    let mut cache = THUMBNAIL_URLS.lock().unwrap();
    cache
        .entry(image.id)
        .or_insert_with(|| store.url_for(&image.thumbnail_path()))
        .clone()
}

/// Thumbnail URL reachable from the application server itself.
pub fn thumbnail_internal_url(store: &dyn ContentStore, image: &UnitImage) -> String {
    store.internal_url_for(&image.thumbnail_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageKind;
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn record(path: &str, sizes: Vec<u32>) -> UnitImage {
        UnitImage {
            id: Uuid::new_v4(),
            path: path.into(),
            full_size_width: 100,
            full_size_height: 100,
            thumbnail_sizes: sizes,
            kind: ImageKind::Document,
            unit_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn purge_removes_all_files() {
        let store = MemoryStore::new();
        store.put("u/a.jpg", vec![1]).await.unwrap();
        store.put("u/a-5.jpg", vec![2]).await.unwrap();
        store.put("u/a-10.jpg", vec![3]).await.unwrap();

        purge_derivatives(&store, &record("u/a.jpg", vec![5, 10])).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn purge_tolerates_missing_and_failing_files() {
        let store = MemoryStore::new();
        store.put("u/b.jpg", vec![1]).await.unwrap();
        store.poison("u/b-5.jpg");
        // does not return an error, and still deletes what it can
        purge_derivatives(&store, &record("u/b.jpg", vec![5, 10])).await;
        assert!(!store.exists("u/b.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn thumbnail_url_is_cached_per_record() {
        let store = MemoryStore::new();
        let image = record("u/c.jpg", vec![5, 10]);
        let first = thumbnail_url(&store, &image);
        assert_eq!(first, "memory://u/c-5.jpg");
        // same record id resolves from the cache
        assert_eq!(thumbnail_url(&store, &image), first);
    }
}
