//! Fold the shard key attributes of a document into a single hash.
//!
//! Two [Reducer]s exist. They differ only in what is hashed when a partial-key selector (see
//! [crate::key]) cannot be applied to a value:
//!
//! - [Community] hashes the original value.
//! - [Enterprise] hashes [Value::Null].
//!
//! Both are frozen. Collections created with either one depend on its exact output, so the two
//! must never be unified.

use crate::{
    document::Value,
    fnv::SEED,
    key::{self, Selector, PRIMARY_KEY},
    Error,
};
use std::borrow::Cow;

/// Hashed in place of a shard key attribute that is not present in a document.
static NULL: Value = Value::Null;

/// Reduce a document (or a bare primary key) to the hash that decides its shard.
pub trait Reducer: Send + Sync + 'static {
    /// The value hashed when a partial-key selector cannot be applied to `original`.
    fn fallback(original: &Value) -> &Value;

    /// Fold the values of `shard_keys` in `document` into a hash, in order.
    ///
    /// `document` must either be an object or, when the only shard key is the primary key (with
    /// or without a selector), a bare `_key` or `collection/_key` string. If the primary key is
    /// absent from an object, the non-empty `key` is used in its place.
    ///
    /// An error does not stop the fold: a hash is always returned and callers must check the
    /// error before trusting it. A missing attribute hashes as [Value::Null] and, if the document
    /// is not `complete`, yields [Error::MissingShardingAttributes].
    fn reduce(
        document: &Value,
        shard_keys: &[String],
        complete: bool,
        key: &str,
    ) -> (u64, Option<Error>) {
        let mut hash = SEED;
        match document {
            Value::Object(_) => {
                let mut error = None;
                for attribute in shard_keys {
                    let (name, selector) = key::parse(attribute);
                    let explicit;
                    let sub = match document.get(name) {
                        Some(sub) => sub,
                        None if name == PRIMARY_KEY && !key.is_empty() => {
                            explicit = Value::string(key);
                            &explicit
                        }
                        None => {
                            if !complete {
                                error = Some(Error::MissingShardingAttributes);
                            }
                            &NULL
                        }
                    };
                    hash = Self::select(sub, selector, false).hash(hash);
                }
                (hash, error)
            }
            Value::String(_) => {
                // Only the primary key is known (e.g. update or remove by key)
                if let [attribute] = shard_keys {
                    let (name, selector) = key::parse(attribute);
                    if name == PRIMARY_KEY {
                        return (Self::select(document, selector, true).hash(hash), None);
                    }
                }
                if !complete {
                    return (hash, Some(Error::MissingShardingAttributes));
                }
                (hash, Some(Error::InvalidDocumentShape))
            }
            _ => (hash, Some(Error::InvalidDocumentShape)),
        }
    }

    /// Narrow `value` with `selector`, substituting [Reducer::fallback] if it does not apply.
    fn select(value: &Value, selector: Selector, split_primary_key: bool) -> Cow<'_, Value> {
        key::extract(value, selector, split_primary_key)
            .unwrap_or_else(|| Cow::Borrowed(Self::fallback(value)))
    }
}

/// Hashes the original value when a selector does not apply.
#[derive(Clone, Copy, Debug, Default)]
pub struct Community;

impl Reducer for Community {
    fn fallback(original: &Value) -> &Value {
        original
    }
}

/// Hashes [Value::Null] when a selector does not apply.
#[derive(Clone, Copy, Debug, Default)]
pub struct Enterprise;

impl Reducer for Enterprise {
    fn fallback(_: &Value) -> &Value {
        &NULL
    }
}
