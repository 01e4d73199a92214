//! Mock implementations for testing.

use crate::shards::{self, ShardId};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

/// An in-memory [shards::Catalog] that counts lookups.
#[derive(Default)]
pub struct Catalog {
    collections: Mutex<HashMap<u64, Vec<ShardId>>>,
    lookups: AtomicUsize,
}

impl Catalog {
    /// Set (or replace) the shards of `collection`.
    pub fn insert<S: Into<ShardId>>(&self, collection: u64, shards: impl IntoIterator<Item = S>) {
        let shards = shards.into_iter().map(Into::into).collect();
        self.collections.lock().unwrap().insert(collection, shards);
    }

    /// Number of times [shards::Catalog::shard_list] has been called.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl shards::Catalog for Catalog {
    fn shard_list(&self, collection: u64) -> Vec<ShardId> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.collections
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

/// Shard identifiers `s1` through `sn`.
pub fn shard_ids(n: usize) -> Vec<ShardId> {
    (1..=n).map(|i| ShardId::new(format!("s{i}"))).collect()
}
