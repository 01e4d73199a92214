//! Route documents to shards with frozen, versioned hashing strategies.
//!
//! A sharded collection is created with a [Strategy] (identified by a persisted name) and an
//! ordered list of shard key attributes. To route a document, the configured attributes are
//! extracted from it, folded into a single hash (see [reducer]), and the hash selects one entry of
//! the collection's shard list (see [shards]).
//!
//! # Warning
//!
//! The mapping from document to shard is part of the on-disk format of every collection created
//! with a given strategy. Strategies are therefore frozen: fixing or "improving" one would silently
//! move existing documents to different shards. New behavior must be introduced as a new strategy
//! with a new name.
//!
//! # Status
//!
//! `commonware-sharding` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

use thiserror::Error;

pub mod document;
pub mod fnv;
pub mod key;
pub mod mocks;
pub mod reducer;
pub mod shards;
pub mod strategy;

pub use document::Value;
pub use shards::{Catalog, ShardId, ShardList};
pub use strategy::{Config, Descriptor, Role, Strategy};

/// Errors that can occur when opening a [Strategy] or routing a document with it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not all sharding attributes given")]
    MissingShardingAttributes,
    #[error("invalid document shape")]
    InvalidDocumentShape,
    #[error("invalid shard configuration: {0}")]
    InvalidShardConfiguration(String),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("feature not available: {0}")]
    FeatureNotAvailable(String),
    #[error("bad shard key configuration: {0}")]
    BadShardKeyConfiguration(String),
    #[error("unknown sharding strategy: {0}")]
    UnknownStrategy(String),
    #[error("sharding strategy {0} cannot be used for smart edge collections")]
    SmartEdgeCollection(String),
    #[error("codec error: {0}")]
    Codec(#[from] commonware_codec::Error),
}
