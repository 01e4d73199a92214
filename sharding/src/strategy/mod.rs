//! Select the shard responsible for a document.
//!
//! A [Strategy] is chosen when a sharded collection is created and persisted as a [Descriptor]
//! (its name and shard keys). Whenever the collection is loaded, [Strategy::open] rebuilds the
//! same strategy from the [Descriptor].
//!
//! # Strategies
//!
//! | Name                | Reducer        | Notes                                |
//! |---------------------|----------------|--------------------------------------|
//! | `none`              | -              | Never routes (not usable on routers) |
//! | `community-compat`  | [Community]    | Legacy                               |
//! | `enterprise-compat` | [Enterprise]   | Legacy                               |
//! | `hash`              | [Enterprise]   | Default for new collections          |
//!
//! Strategies that require an enterprise build (`enterprise-smart-edge-compat`,
//! `enterprise-hash-smart-edge`, and `enterprise-hex-smart-vertex`) can be opened but fail to
//! route with [Error::FeatureNotAvailable]. Any other name is rejected with
//! [Error::UnknownStrategy].
//!
//! # Routing
//!
//! Hash-based strategies resolve the collection's [crate::ShardList], reduce the document's shard
//! keys to a hash (see [crate::reducer]), and, if there is more than one shard, mix the hash with a
//! constant phrase before selecting `shards[hash % shards.len()]`.
//!
//! # Example
//!
//! ```rust
//! use commonware_sharding::{mocks, strategy, Config, Descriptor, Role, Strategy, Value};
//! use std::sync::Arc;
//!
//! // Register the shards of collection 1
//! let catalog = Arc::new(mocks::Catalog::default());
//! catalog.insert(1, ["s1", "s2", "s3"]);
//!
//! // Open the default strategy for a new collection
//! let cfg = Config { collection: 1, role: Role::Coordinator, smart_edge: false };
//! let descriptor = Descriptor::new(strategy::default_name(cfg.role), ["_key"]);
//! let strategy = Strategy::open(&descriptor, &cfg, catalog).unwrap();
//!
//! // Route a document
//! let document = Value::object([("_key", Value::string("abc"))]);
//! let (shard, default_shard_keys) = strategy.responsible_shard(&document, true, "").unwrap();
//! assert!(default_shard_keys);
//!
//! // Routing by key alone selects the same shard
//! let (by_key, _) = strategy.responsible_shard(&Value::string("abc"), false, "").unwrap();
//! assert_eq!(shard, by_key);
//! ```

mod descriptor;
pub use descriptor::{Descriptor, MAX_ATTRIBUTE_LENGTH, MAX_NAME_LENGTH, MAX_SHARD_KEYS};
mod hashed;
pub use hashed::Hashed;

use crate::{
    document::Value,
    key::{PRIMARY_KEY, PRIMARY_KEY_POSTFIX, PRIMARY_KEY_PREFIX},
    reducer::{Community, Enterprise},
    shards::{Catalog, ShardId, ShardList},
    Error,
};
use std::sync::Arc;
use tracing::debug;

/// Never routes. Used for collections on nodes that do not route documents.
pub const NONE: &str = "none";

/// Legacy hash-based strategy using the [Community] reducer.
pub const COMMUNITY_COMPAT: &str = "community-compat";

/// Legacy hash-based strategy using the [Enterprise] reducer.
pub const ENTERPRISE_COMPAT: &str = "enterprise-compat";

/// Default hash-based strategy for new collections.
pub const HASH: &str = "hash";

/// Legacy strategy for smart graph edge collections (enterprise only).
pub const ENTERPRISE_SMART_EDGE_COMPAT: &str = "enterprise-smart-edge-compat";

/// Strategy for smart graph edge collections (enterprise only).
pub const ENTERPRISE_HASH_SMART_EDGE: &str = "enterprise-hash-smart-edge";

/// Strategy for smart graph vertex collections keyed by hex prefixes (enterprise only).
pub const ENTERPRISE_HEX_SMART_VERTEX: &str = "enterprise-hex-smart-vertex";

/// Strategies that are recognized but can only be used by an enterprise build.
const ENTERPRISE_ONLY: [&str; 3] = [
    ENTERPRISE_SMART_EDGE_COMPAT,
    ENTERPRISE_HASH_SMART_EDGE,
    ENTERPRISE_HEX_SMART_VERTEX,
];

/// The role of the node a [Strategy] is opened on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// A standalone node (nothing is sharded).
    Single,
    /// A node that routes requests to shards.
    Coordinator,
    /// A node that stores shards.
    Server,
}

/// Configuration for opening a [Strategy].
#[derive(Clone, Debug)]
pub struct Config {
    /// Identifier of the collection, used to look up its shards.
    pub collection: u64,

    /// The role of the local node.
    pub role: Role,

    /// Whether the collection is the edge collection of a smart graph.
    pub smart_edge: bool,
}

/// The name of the strategy to use for new collections created on a node with `role`.
pub fn default_name(role: Role) -> &'static str {
    match role {
        Role::Coordinator => HASH,
        Role::Single | Role::Server => NONE,
    }
}

/// A sharding strategy bound to the shard keys and shards of one collection.
#[derive(Debug)]
pub enum Strategy {
    None {
        shard_keys: Vec<String>,
    },
    Unavailable {
        name: String,
        shard_keys: Vec<String>,
    },
    CommunityCompat(Hashed<Community>),
    EnterpriseCompat(Hashed<Enterprise>),
    Hash(Hashed<Enterprise>),
}

impl Strategy {
    /// Open the [Strategy] named by `descriptor` for the collection described by `cfg`.
    ///
    /// Shards are not fetched from `catalog` until the first document is routed. Shard keys that
    /// could not be decoded from a persisted [Descriptor] are rejected with
    /// [Error::BadShardKeyConfiguration].
    pub fn open(
        descriptor: &Descriptor,
        cfg: &Config,
        catalog: Arc<dyn Catalog>,
    ) -> Result<Self, Error> {
        Self::check_bounds(&descriptor.shard_keys)?;
        let shard_keys = descriptor.shard_keys.clone();
        let strategy = match descriptor.name.as_str() {
            NONE => {
                if cfg.role == Role::Coordinator {
                    return Err(Error::UnsupportedOperation(format!(
                        "sharding strategy {NONE} cannot be used for sharded collections"
                    )));
                }
                Self::None { shard_keys }
            }
            COMMUNITY_COMPAT => {
                let default_shard_keys = Self::is_primary_key(&shard_keys, false);
                let shards = Self::shards(cfg, catalog);
                let hashed = Hashed::new(shard_keys, default_shard_keys, shards)?;
                Self::check_smart_edge(cfg, COMMUNITY_COMPAT)?;
                Self::CommunityCompat(hashed)
            }
            ENTERPRISE_COMPAT => {
                let default_shard_keys = Self::is_primary_key(&shard_keys, true);
                let shards = Self::shards(cfg, catalog);
                let hashed = Hashed::new(shard_keys, default_shard_keys, shards)?;
                Self::check_smart_edge(cfg, ENTERPRISE_COMPAT)?;
                Self::EnterpriseCompat(hashed)
            }
            HASH => {
                let default_shard_keys = Self::is_primary_key(&shard_keys, true);
                let shards = Self::shards(cfg, catalog);
                let hashed = Hashed::new(shard_keys, default_shard_keys, shards)?;
                Self::check_smart_edge(cfg, HASH)?;
                Self::Hash(hashed)
            }
            name if ENTERPRISE_ONLY.contains(&name) => Self::Unavailable {
                name: name.to_string(),
                shard_keys,
            },
            name => return Err(Error::UnknownStrategy(name.to_string())),
        };
        debug!(
            collection = cfg.collection,
            strategy = strategy.name(),
            default_shard_keys = strategy.uses_default_shard_keys(),
            "opened sharding strategy"
        );
        Ok(strategy)
    }

    fn shards(cfg: &Config, catalog: Arc<dyn Catalog>) -> ShardList {
        ShardList::new(cfg.collection, catalog)
    }

    /// Reject shard keys that could not be persisted in a [Descriptor].
    fn check_bounds(shard_keys: &[String]) -> Result<(), Error> {
        if shard_keys.len() > MAX_SHARD_KEYS {
            return Err(Error::BadShardKeyConfiguration(format!(
                "{} shard keys exceed the maximum of {MAX_SHARD_KEYS}",
                shard_keys.len()
            )));
        }
        if let Some(attribute) = shard_keys
            .iter()
            .find(|attribute| attribute.len() > MAX_ATTRIBUTE_LENGTH)
        {
            return Err(Error::BadShardKeyConfiguration(format!(
                "shard key of {} bytes exceeds the maximum of {MAX_ATTRIBUTE_LENGTH}",
                attribute.len()
            )));
        }
        Ok(())
    }

    fn check_smart_edge(cfg: &Config, name: &str) -> Result<(), Error> {
        if cfg.smart_edge {
            return Err(Error::SmartEdgeCollection(name.to_string()));
        }
        Ok(())
    }

    /// Returns whether `shard_keys` is exactly the primary key or, if `selectors` is set, the
    /// primary key with a partial-key selector.
    fn is_primary_key(shard_keys: &[String], selectors: bool) -> bool {
        match shard_keys {
            [key] if key == PRIMARY_KEY => true,
            [key] => selectors && (key == PRIMARY_KEY_PREFIX || key == PRIMARY_KEY_POSTFIX),
            _ => false,
        }
    }

    /// The persisted name of the strategy.
    pub fn name(&self) -> &str {
        match self {
            Self::None { .. } => NONE,
            Self::Unavailable { name, .. } => name,
            Self::CommunityCompat(_) => COMMUNITY_COMPAT,
            Self::EnterpriseCompat(_) => ENTERPRISE_COMPAT,
            Self::Hash(_) => HASH,
        }
    }

    /// The configured shard key attributes.
    pub fn shard_keys(&self) -> &[String] {
        match self {
            Self::None { shard_keys } | Self::Unavailable { shard_keys, .. } => shard_keys,
            Self::CommunityCompat(hashed) => hashed.shard_keys(),
            Self::EnterpriseCompat(hashed) | Self::Hash(hashed) => hashed.shard_keys(),
        }
    }

    /// Whether documents are sharded by their primary key (optionally with a selector).
    pub fn uses_default_shard_keys(&self) -> bool {
        match self {
            Self::None { .. } | Self::Unavailable { .. } => false,
            Self::CommunityCompat(hashed) => hashed.uses_default_shard_keys(),
            Self::EnterpriseCompat(hashed) | Self::Hash(hashed) => {
                hashed.uses_default_shard_keys()
            }
        }
    }

    /// The persisted identity of this strategy.
    pub fn descriptor(&self) -> Descriptor {
        Descriptor::new(self.name(), self.shard_keys().iter().cloned())
    }

    /// Returns the shard responsible for `document` and whether the collection is sharded by its
    /// primary key.
    ///
    /// `document` is either an object or, if the only shard key is the primary key, a bare `_key`
    /// or `collection/_key` string. `complete` indicates whether `document` contains all of its
    /// attributes (it may not for updates). If `document` has no `_key`, a non-empty `key` is used
    /// in its place.
    pub fn responsible_shard(
        &self,
        document: &Value,
        complete: bool,
        key: &str,
    ) -> Result<(ShardId, bool), Error> {
        match self {
            Self::None { .. } => Err(Error::UnsupportedOperation(format!(
                "unexpected invocation of sharding strategy {NONE}"
            ))),
            Self::Unavailable { name, .. } => Err(Error::FeatureNotAvailable(format!(
                "sharding strategy '{name}' is only available in the enterprise edition"
            ))),
            Self::CommunityCompat(hashed) => hashed.responsible_shard(document, complete, key),
            Self::EnterpriseCompat(hashed) | Self::Hash(hashed) => {
                hashed.responsible_shard(document, complete, key)
            }
        }
    }

    /// Returns whether `self` and `other` place identical documents on equally indexed shards.
    ///
    /// Strategies with the same name are compatible. In addition, [HASH] is compatible with
    /// [ENTERPRISE_HEX_SMART_VERTEX] if it shards by a partial primary key (`_key:` or `:_key`).
    pub fn is_compatible(&self, other: &Strategy) -> bool {
        if self.name() == other.name() {
            return true;
        }
        match self {
            Self::Hash(hashed) => {
                other.name() == ENTERPRISE_HEX_SMART_VERTEX
                    && matches!(
                        hashed.shard_keys(),
                        [key] if key == PRIMARY_KEY_PREFIX || key == PRIMARY_KEY_POSTFIX
                    )
            }
            _ => false,
        }
    }
}
