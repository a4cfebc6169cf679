use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use stockroom_core::Extension;

use crate::error::{Error, Result};

pub mod fs;

/// An immutable point-in-time view of the catalog.
///
/// Requests hold an `Arc<Snapshot>` for their whole evaluation; a refresh
/// replaces the `Arc` in the [`SnapshotStore`] and never touches a snapshot
/// that is already being read.
#[derive(Debug)]
pub struct Snapshot {
    extensions: Vec<Extension>,
    loaded_at: Timestamp,
}

impl Snapshot {
    pub fn new(extensions: Vec<Extension>) -> Self {
        Self {
            extensions,
            loaded_at: Timestamp::now(),
        }
    }

    /// Extensions in catalog order
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn loaded_at(&self) -> Timestamp {
        self.loaded_at
    }

    /// Find an extension by `publisher.extension`, ignoring case
    pub fn find(&self, identity: &str) -> Option<&Extension> {
        self.extensions
            .iter()
            .find(|ext| ext.identity().eq_ignore_ascii_case(identity))
    }
}

/// Source of catalog snapshots
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Read the whole persisted catalog
    async fn load(&self) -> Result<Vec<Extension>>;
}

/// Holds the current snapshot and swaps it wholesale on refresh.
pub struct SnapshotStore {
    catalog: Arc<dyn Catalog>,
    current: RwLock<Option<Arc<Snapshot>>>,
    /// Serializes the first load so concurrent callers share it
    first_load: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            current: RwLock::new(None),
            first_load: Mutex::new(()),
        }
    }

    /// The snapshot currently being served, if one has been loaded
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The current snapshot, loading one first if none exists yet
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }

        let _guard = self.first_load.lock().await;
        match self.current() {
            Some(snapshot) => Ok(snapshot),
            None => self.refresh().await,
        }
    }

    /// Load a fresh snapshot and make it current
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        let extensions = self.catalog.load().await.map_err(|e| match e {
            Error::CatalogUnavailable(_) => e,
            other => Error::CatalogUnavailable(other.to_string()),
        })?;

        let snapshot = Arc::new(Snapshot::new(extensions));
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&snapshot));

        info!(extensions = snapshot.len(), "Catalog snapshot loaded");
        Ok(snapshot)
    }
}

/// Refresh the store on a fixed interval. Failures keep the previous snapshot.
pub fn spawn_refresh(store: Arc<SnapshotStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = store.refresh().await {
                error!("Catalog refresh failed, keeping previous snapshot: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use stockroom_core::Publisher;

    struct Counting {
        loads: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Catalog for Counting {
        async fn load(&self) -> Result<Vec<Extension>> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Internal("disk on fire".into()));
            }
            Ok((0..=n)
                .map(|i| Extension {
                    publisher: Publisher {
                        publisher_name: "acme".into(),
                        ..Publisher::default()
                    },
                    extension_name: format!("ext{}", i),
                    ..Extension::default()
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn loads_lazily_once() {
        let store = SnapshotStore::new(Arc::new(Counting { loads: AtomicUsize::new(0), fail: false }));
        assert!(store.current().is_none());

        let first = store.snapshot().await.unwrap();
        let second = store.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    struct Yielding {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl Catalog for Yielding {
        async fn load(&self) -> Result<Vec<Extension>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(vec![Extension::default()])
        }
    }

    #[tokio::test]
    async fn concurrent_first_requests_share_one_load() {
        let catalog = Arc::new(Yielding { loads: AtomicUsize::new(0) });
        let store = SnapshotStore::new(catalog.clone());

        let (a, b, c) = tokio::join!(store.snapshot(), store.snapshot(), store.snapshot());
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert_eq!(catalog.loads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
    }

    #[tokio::test]
    async fn refresh_swaps_without_touching_held_snapshot() {
        let store = SnapshotStore::new(Arc::new(Counting { loads: AtomicUsize::new(0), fail: false }));
        let held = store.snapshot().await.unwrap();

        let fresh = store.refresh().await.unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(fresh.len(), 2);
        assert!(Arc::ptr_eq(&store.current().unwrap(), &fresh));
    }

    #[tokio::test]
    async fn load_failure_is_catalog_unavailable() {
        let store = SnapshotStore::new(Arc::new(Counting { loads: AtomicUsize::new(0), fail: true }));
        let err = store.snapshot().await.unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable(_)));
        assert!(store.current().is_none());
    }

    #[test]
    fn find_ignores_case() {
        let snapshot = Snapshot::new(vec![Extension {
            publisher: Publisher {
                publisher_name: "Acme".into(),
                ..Publisher::default()
            },
            extension_name: "Tool".into(),
            ..Extension::default()
        }]);
        assert!(snapshot.find("acme.tool").is_some());
        assert!(snapshot.find("acme.other").is_none());
    }
}
