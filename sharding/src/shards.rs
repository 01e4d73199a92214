//! Resolve and cache the shards of a collection.
//!
//! The shards of a collection are looked up in a [Catalog] the first time a document is routed and
//! never change afterwards (re-sharding creates a new collection handle, and with it a new
//! [ShardList]).

use crate::Error;
use std::{
    fmt,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};
use tracing::{debug, warn};

/// Identifier of a single shard.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardId(String);

impl ShardId {
    /// Create a new [ShardId].
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ShardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Source of truth for the shards of each collection.
pub trait Catalog: Send + Sync + 'static {
    /// Returns the ordered shards of `collection`.
    ///
    /// An empty list means the collection is unknown or has no shards.
    fn shard_list(&self, collection: u64) -> Vec<ShardId>;
}

/// The shards of one collection, fetched from a [Catalog] at most once.
///
/// After the first successful lookup, [ShardList::get] does not take a lock.
pub struct ShardList {
    collection: u64,
    catalog: Arc<dyn Catalog>,

    shards: OnceLock<Vec<ShardId>>,
    populate: Mutex<()>,
}

impl ShardList {
    /// Create an unpopulated [ShardList] for `collection`.
    pub fn new(collection: u64, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            collection,
            catalog,
            shards: OnceLock::new(),
            populate: Mutex::new(()),
        }
    }

    /// The collection this list belongs to.
    pub fn collection(&self) -> u64 {
        self.collection
    }

    /// Returns whether the shards have been fetched.
    pub fn is_populated(&self) -> bool {
        self.shards.get().is_some()
    }

    /// Returns the shards of the collection, fetching them from the [Catalog] on first use.
    ///
    /// The returned list is never empty. If the [Catalog] reports no shards, nothing is cached and
    /// the next call retries the lookup.
    pub fn get(&self) -> Result<&[ShardId], Error> {
        if let Some(shards) = self.shards.get() {
            return Ok(shards);
        }

        // Serialize population and check again (another caller may have won the race)
        let _guard = self
            .populate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(shards) = self.shards.get() {
            return Ok(shards);
        }
        let shards = self.catalog.shard_list(self.collection);
        if shards.is_empty() {
            warn!(collection = self.collection, "no shards found");
            return Err(Error::InvalidShardConfiguration(format!(
                "invalid shard count for collection {}",
                self.collection
            )));
        }
        debug!(
            collection = self.collection,
            shards = shards.len(),
            "populated shard list"
        );
        Ok(self.shards.get_or_init(|| shards))
    }
}

impl fmt::Debug for ShardList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardList")
            .field("collection", &self.collection)
            .field("shards", &self.shards.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks;
    use commonware_macros::test_traced;
    use std::{sync::Barrier, thread};

    #[test_traced]
    fn test_populates_once() {
        let catalog = Arc::new(mocks::Catalog::default());
        catalog.insert(7, ["s1", "s2", "s3"]);
        let list = ShardList::new(7, catalog.clone());
        assert!(!list.is_populated());
        assert_eq!(catalog.lookups(), 0);

        // First call fetches
        let shards = list.get().unwrap();
        assert_eq!(shards, &[ShardId::from("s1"), "s2".into(), "s3".into()]);
        assert!(list.is_populated());
        assert_eq!(catalog.lookups(), 1);

        // Later calls use the cached list, even if the catalog changes
        catalog.insert(7, ["s4"]);
        for _ in 0..10 {
            assert_eq!(list.get().unwrap().len(), 3);
        }
        assert_eq!(catalog.lookups(), 1);
    }

    #[test_traced]
    fn test_empty_not_cached() {
        let catalog = Arc::new(mocks::Catalog::default());
        let list = ShardList::new(7, catalog.clone());
        assert!(matches!(
            list.get(),
            Err(Error::InvalidShardConfiguration(_))
        ));
        assert!(!list.is_populated());

        // Retried once shards exist
        catalog.insert(7, ["s1"]);
        assert_eq!(list.get().unwrap(), &[ShardId::from("s1")]);
        assert_eq!(catalog.lookups(), 2);
    }

    #[test]
    fn test_concurrent_populate() {
        let catalog = Arc::new(mocks::Catalog::default());
        catalog.insert(1, ["a", "b"]);
        let list = Arc::new(ShardList::new(1, catalog.clone()));

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let list = list.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    list.get().unwrap().to_vec()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![ShardId::from("a"), "b".into()]);
        }
        assert_eq!(catalog.lookups(), 1);
    }

    #[test]
    fn test_shard_id() {
        let id = ShardId::new("s1");
        assert_eq!(id.as_str(), "s1");
        assert_eq!(id.to_string(), "s1");
        assert_eq!(id, ShardId::from(String::from("s1")));
    }
}
