use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::config::{StoreConfig, SUPPORTED_RESOLUTIONS};
use crate::dataset;
use crate::error::Result;
use crate::types::ResolutionStore;

type Stores = FxHashMap<u8, Arc<ResolutionStore>>;

/// Per-resolution stores, loaded from disk at most once.
///
/// The first [`get`](Self::get) for any resolution loads every supported resolution so
/// that a fallback walk never pays for I/O halfway through. After that, lookups are a map
/// access under an uncontended read lock. [`invalidate`](Self::invalidate) drops the
/// loaded data and the next access reads the files again.
///
/// A test override replaces the on-disk data wholesale while it is installed.
pub struct StoreCache {
    config: StoreConfig,
    loaded: RwLock<Option<Stores>>,
    test_override: RwLock<Option<Stores>>,
    loads: AtomicUsize,
    empty: Arc<ResolutionStore>,
}

impl StoreCache {
    /// Creates an unloaded cache reading from `config.data_dir`.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            loaded: RwLock::new(None),
            test_override: RwLock::new(None),
            loads: AtomicUsize::new(0),
            empty: Arc::new(ResolutionStore::default()),
        }
    }

    /// The dataset location this cache reads from.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the store for `resolution`, loading all datasets on first use.
    ///
    /// Resolutions without data, including unsupported ones, yield an empty store.
    ///
    /// # Errors
    ///
    /// Fails only when a dataset file exists but cannot be read or parsed. The cache stays
    /// unloaded in that case and the next call tries again.
    pub fn get(&self, resolution: u8) -> Result<Arc<ResolutionStore>> {
        if let Some(stores) = read(&self.test_override).as_ref() {
            debug!("Using test override store for r{}", resolution);
            return Ok(self.pick(stores, resolution));
        }

        if let Some(stores) = read(&self.loaded).as_ref() {
            return Ok(self.pick(stores, resolution));
        }

        let mut loaded = write(&self.loaded);
        let stores = self.load_into(&mut loaded)?;
        Ok(self.pick(stores, resolution))
    }

    /// Loads every supported resolution unless already loaded.
    ///
    /// Concurrent callers block until the first one finishes; the files are read once.
    pub fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }
        self.load_into(&mut write(&self.loaded)).map(|_| ())
    }

    // Caller holds the write lock; a slot filled by a racing caller is reused as is.
    fn load_into<'a>(&self, slot: &'a mut Option<Stores>) -> Result<&'a Stores> {
        let stores = match slot.take() {
            Some(stores) => stores,
            None => self.read_all()?,
        };
        Ok(slot.insert(stores))
    }

    fn read_all(&self) -> Result<Stores> {
        let started = Instant::now();
        let mut stores = Stores::default();
        for resolution in SUPPORTED_RESOLUTIONS {
            let store = dataset::load_resolution(&self.config, resolution)?;
            stores.insert(resolution, Arc::new(store));
        }
        self.loads.fetch_add(1, Ordering::Relaxed);

        info!(
            "Loaded {} resolution stores from {} in {:.3}ms",
            SUPPORTED_RESOLUTIONS.len(),
            self.config.data_dir.display(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(stores)
    }

    /// Whether on-disk data is currently loaded. Ignores any test override.
    pub fn is_loaded(&self) -> bool {
        read(&self.loaded).is_some()
    }

    /// Number of times the datasets have been read from disk.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Drops loaded data so the next access re-reads the dataset files.
    pub fn invalidate(&self) {
        if write(&self.loaded).take().is_some() {
            info!("Invalidated resolution stores");
        }
    }

    /// Installs (`Some`) or clears (`None`) replacement stores.
    ///
    /// While installed, every [`get`](Self::get) answers from the override alone and the
    /// real datasets are neither loaded nor modified. Resolutions missing from the
    /// override read as empty; they do not fall through to the on-disk store, so an
    /// override for r5 alone disables fallback hits at r4.
    pub fn set_test_override(&self, stores: Option<HashMap<u8, ResolutionStore>>) {
        let stores = stores.map(|stores| {
            stores
                .into_iter()
                .map(|(resolution, store)| (resolution, Arc::new(store)))
                .collect()
        });
        *write(&self.test_override) = stores;
    }

    fn pick(&self, stores: &Stores, resolution: u8) -> Arc<ResolutionStore> {
        stores
            .get(&resolution)
            .map_or_else(|| Arc::clone(&self.empty), Arc::clone)
    }
}

impl Default for StoreCache {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

// Stores are published whole; a poisoned lock still guards consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataFormat;
    use crate::types::LocationDetails;
    use std::thread;

    fn write_dataset(config: &StoreConfig, resolution: u8, json: &str) {
        std::fs::write(config.data_file_path(resolution, DataFormat::Json), json).unwrap();
    }

    #[test]
    fn test_missing_data_dir_gives_empty_stores() {
        let cache = StoreCache::new(StoreConfig::new("/nonexistent/lakhua-data"));
        for resolution in SUPPORTED_RESOLUTIONS {
            assert!(cache.get(resolution).unwrap().is_empty());
        }
        assert!(cache.is_loaded());
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_first_get_loads_all_resolutions() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        write_dataset(&config, 4, r#"{"8460145ffffffff": {"city": "Delhi Region", "state": "Delhi"}}"#);
        write_dataset(&config, 5, r#"{"8560145bfffffff": {"city": "New Delhi", "state": "Delhi"}}"#);
        let cache = StoreCache::new(config);

        assert_eq!(cache.get(5).unwrap().len(), 1);
        // r4 was read by the same load; removing the file now has no effect.
        std::fs::remove_file(dir.path().join("reverse_geo_4.json")).unwrap();
        assert_eq!(cache.get(4).unwrap()["8460145ffffffff"].city, "Delhi Region");
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_repeated_gets_do_not_reload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StoreCache::new(StoreConfig::new(dir.path()));
        for _ in 0..100 {
            cache.get(5).unwrap();
            cache.get(4).unwrap();
        }
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(StoreCache::new(StoreConfig::new(dir.path())));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get(5).map(|store| store.len()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 0);
        }
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_invalidate_reloads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        let cache = StoreCache::new(config.clone());
        assert!(cache.get(5).unwrap().is_empty());

        write_dataset(&config, 5, r#"{"8560145bfffffff": {"city": "New Delhi", "state": "Delhi"}}"#);
        assert!(cache.get(5).unwrap().is_empty());

        cache.invalidate();
        assert!(!cache.is_loaded());
        assert_eq!(cache.get(5).unwrap().len(), 1);
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn test_corrupt_dataset_propagates_and_stays_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        write_dataset(&config, 4, "[1, 2");
        let cache = StoreCache::new(config.clone());

        assert!(cache.get(5).is_err());
        assert!(!cache.is_loaded());
        assert_eq!(cache.load_count(), 0);

        write_dataset(&config, 4, "{}");
        assert!(cache.get(5).is_ok());
    }

    #[test]
    fn test_unreadable_dataset_propagates_and_stays_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        let path = config.data_file_path(5, DataFormat::Json);
        std::fs::create_dir(&path).unwrap();
        let cache = StoreCache::new(config);

        assert!(matches!(cache.get(5), Err(crate::Error::Io { .. })));
        assert!(matches!(cache.ensure_loaded(), Err(crate::Error::Io { .. })));
        assert!(!cache.is_loaded());
        assert_eq!(cache.load_count(), 0);

        std::fs::remove_dir(&path).unwrap();
        assert!(cache.get(5).unwrap().is_empty());
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_override_bypasses_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        write_dataset(&config, 5, r#"{"8560145bfffffff": {"city": "New Delhi", "state": "Delhi"}}"#);
        let cache = StoreCache::new(config);

        let mut store = ResolutionStore::default();
        store.insert("abc".to_string(), LocationDetails::new("Test", "State"));
        cache.set_test_override(Some(HashMap::from([(5, store)])));

        let r5 = cache.get(5).unwrap();
        assert_eq!(r5.len(), 1);
        assert!(r5.contains_key("abc"));
        assert!(cache.get(4).unwrap().is_empty());
        assert!(!cache.is_loaded());
        assert_eq!(cache.load_count(), 0);

        cache.set_test_override(None);
        cache.invalidate();
        assert!(cache.get(5).unwrap().contains_key("8560145bfffffff"));
    }

    #[test]
    fn test_unsupported_resolution_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StoreCache::new(StoreConfig::new(dir.path()));
        assert!(cache.get(9).unwrap().is_empty());
    }
}
