//! Hash-based routing shared by every strategy that places documents by their shard keys.
//!
//! The reduced hash is mixed once more with [MIX] before selecting among more than one shard.
//! With a single shard, the reduction still runs (it may report an error) but its hash is unused.

use crate::{
    document::Value,
    fnv::{self, MIX},
    reducer::Reducer,
    shards::{ShardId, ShardList},
    Error,
};
use std::marker::PhantomData;

/// Routes documents by reducing their shard keys with `R` and selecting a shard by modulo.
#[derive(Debug)]
pub struct Hashed<R: Reducer> {
    shard_keys: Vec<String>,
    default_shard_keys: bool,
    shards: ShardList,
    _reducer: PhantomData<R>,
}

impl<R: Reducer> Hashed<R> {
    /// Create a new [Hashed] strategy.
    ///
    /// Fails with [Error::BadShardKeyConfiguration] if `shard_keys` is empty or contains an empty
    /// attribute.
    pub(super) fn new(
        shard_keys: Vec<String>,
        default_shard_keys: bool,
        shards: ShardList,
    ) -> Result<Self, Error> {
        if shard_keys.is_empty() {
            return Err(Error::BadShardKeyConfiguration(
                "no shard keys".to_string(),
            ));
        }
        if shard_keys.iter().any(String::is_empty) {
            return Err(Error::BadShardKeyConfiguration(
                "empty shard key".to_string(),
            ));
        }
        Ok(Self {
            shard_keys,
            default_shard_keys,
            shards,
            _reducer: PhantomData,
        })
    }

    /// The configured shard key attributes.
    pub fn shard_keys(&self) -> &[String] {
        &self.shard_keys
    }

    /// Whether the shard keys are the primary key (optionally with a selector).
    pub fn uses_default_shard_keys(&self) -> bool {
        self.default_shard_keys
    }

    /// The (lazily populated) shards of the collection.
    pub fn shards(&self) -> &ShardList {
        &self.shards
    }

    /// Returns the shard responsible for `document`.
    pub fn responsible_shard(
        &self,
        document: &Value,
        complete: bool,
        key: &str,
    ) -> Result<(ShardId, bool), Error> {
        let shards = self.shards.get()?;

        // Reduce even if there is only one shard (the reduction may fail)
        let (hash, error) = R::reduce(document, &self.shard_keys, complete, key);
        if let Some(error) = error {
            return Err(error);
        }
        let shard = match shards {
            [] => {
                return Err(Error::InvalidShardConfiguration(format!(
                    "no shards for collection {}",
                    self.shards.collection()
                )));
            }
            [shard] => shard,
            _ => {
                let hash = fnv::hash(hash, MIX);
                &shards[(hash % shards.len() as u64) as usize]
            }
        };
        Ok((shard.clone(), self.default_shard_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fnv::SEED,
        mocks,
        reducer::{Community, Enterprise},
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use serde_json::json;
    use std::{collections::HashSet, sync::Arc};

    fn hashed<R: Reducer>(shard_keys: &[&str], shards: usize) -> (Hashed<R>, Arc<mocks::Catalog>) {
        let catalog = Arc::new(mocks::Catalog::default());
        catalog.insert(1, mocks::shard_ids(shards));
        let list = ShardList::new(1, catalog.clone());
        let keys = shard_keys.iter().map(|key| key.to_string()).collect();
        (Hashed::new(keys, false, list).unwrap(), catalog)
    }

    #[test]
    fn test_invalid_shard_keys() {
        let catalog = Arc::new(mocks::Catalog::default());
        let result = Hashed::<Enterprise>::new(vec![], false, ShardList::new(1, catalog.clone()));
        assert!(matches!(result, Err(Error::BadShardKeyConfiguration(_))));
        let result = Hashed::<Enterprise>::new(
            vec!["a".to_string(), String::new()],
            false,
            ShardList::new(1, catalog.clone()),
        );
        assert!(matches!(result, Err(Error::BadShardKeyConfiguration(_))));

        // Nothing is fetched at construction
        assert_eq!(catalog.lookups(), 0);
    }

    #[test]
    fn test_single_shard() {
        let (strategy, _) = hashed::<Community>(&["a"], 1);
        for value in 0..100 {
            let doc = Value::from(json!({ "a": value }));
            let (shard, _) = strategy.responsible_shard(&doc, true, "").unwrap();
            assert_eq!(shard, ShardId::from("s1"));
        }
    }

    #[test]
    fn test_single_shard_checks_error() {
        let (strategy, _) = hashed::<Community>(&["a"], 1);
        let result = strategy.responsible_shard(&Value::from(json!({})), false, "");
        assert!(matches!(result, Err(Error::MissingShardingAttributes)));
        let result = strategy.responsible_shard(&Value::Int(1), true, "");
        assert!(matches!(result, Err(Error::InvalidDocumentShape)));
    }

    #[test]
    fn test_modulo_after_mix() {
        let (strategy, _) = hashed::<Enterprise>(&["_key"], 3);
        let doc = Value::from(json!({"_key": "abc"}));
        let (shard, _) = strategy.responsible_shard(&doc, true, "").unwrap();

        let hash = fnv::hash(Value::string("abc").hash(SEED), MIX);
        let expected = mocks::shard_ids(3)[(hash % 3) as usize].clone();
        assert_eq!(shard, expected);
    }

    #[test]
    fn test_covers_all_shards() {
        let shards = 7;
        let (strategy, catalog) = hashed::<Enterprise>(&["_key"], shards);
        let mut rng = StdRng::seed_from_u64(0);
        let mut seen = HashSet::new();
        for _ in 0..1_000 {
            let key: u64 = rng.gen();
            let doc = Value::from(json!({ "_key": key.to_string() }));
            let (shard, _) = strategy.responsible_shard(&doc, true, "").unwrap();
            seen.insert(shard);
        }
        assert_eq!(seen.len(), shards);
        assert_eq!(catalog.lookups(), 1);
    }

    #[test]
    fn test_missing_shards() {
        let catalog = Arc::new(mocks::Catalog::default());
        let strategy = Hashed::<Enterprise>::new(
            vec!["_key".to_string()],
            true,
            ShardList::new(1, catalog),
        )
        .unwrap();
        let result = strategy.responsible_shard(&Value::from(json!({"_key": "a"})), true, "");
        assert!(matches!(result, Err(Error::InvalidShardConfiguration(_))));
    }
}
