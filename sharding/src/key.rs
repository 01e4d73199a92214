//! Parse shard key attributes and extract the part of a value they select.
//!
//! A shard key attribute may select only part of a string value:
//!
//! - `name:` hashes the portion of the value before its first `:`.
//! - `:name` hashes the portion of the value after its last `:`.
//! - `name` hashes the whole value.
//!
//! This lets a single attribute carry a composite key (e.g. `tenant:order`) of which only one
//! side decides placement.

use crate::document::Value;
use std::borrow::Cow;

/// The primary key attribute of every document.
pub const PRIMARY_KEY: &str = "_key";

/// Shard by the portion of the primary key before its first `:`.
pub const PRIMARY_KEY_PREFIX: &str = "_key:";

/// Shard by the portion of the primary key after its last `:`.
pub const PRIMARY_KEY_POSTFIX: &str = ":_key";

/// The part of an attribute's value that participates in sharding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector {
    /// The entire value.
    Whole,
    /// The portion of a string before its first `:`.
    BeforeColon,
    /// The portion of a string after its last `:`.
    AfterColon,
}

/// Split a configured shard key attribute into its base name and [Selector].
///
/// A trailing `:` takes precedence over a leading one.
pub fn parse(attribute: &str) -> (&str, Selector) {
    if let Some(name) = attribute.strip_suffix(':') {
        (name, Selector::BeforeColon)
    } else if let Some(name) = attribute.strip_prefix(':') {
        (name, Selector::AfterColon)
    } else {
        (attribute, Selector::Whole)
    }
}

/// Narrow `value` to the part chosen by `selector`.
///
/// If `split_primary_key` is set and `value` is a string containing `/` (a `collection/key`
/// identifier), only the part after the first `/` is considered.
///
/// Returns `None` if `selector` cannot be applied (the value is not a string or does not contain
/// a `:`). What is hashed instead is decided by the [crate::reducer::Reducer].
pub fn extract(
    value: &Value,
    selector: Selector,
    split_primary_key: bool,
) -> Option<Cow<'_, Value>> {
    let Value::String(full) = value else {
        return match selector {
            Selector::Whole => Some(Cow::Borrowed(value)),
            Selector::BeforeColon | Selector::AfterColon => None,
        };
    };

    // Only take the key from a full identifier
    let split = if split_primary_key {
        full.find('/').map(|pos| &full[pos + 1..])
    } else {
        None
    };
    let key = split.unwrap_or(full.as_str());

    match selector {
        Selector::Whole => match split {
            Some(key) => Some(Cow::Owned(Value::string(key))),
            None => Some(Cow::Borrowed(value)),
        },
        Selector::BeforeColon => key
            .find(':')
            .map(|pos| Cow::Owned(Value::string(&key[..pos]))),
        Selector::AfterColon => key
            .rfind(':')
            .map(|pos| Cow::Owned(Value::string(&key[pos + 1..]))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("_key", "_key", Selector::Whole; "whole")]
    #[test_case("_key:", "_key", Selector::BeforeColon; "prefix")]
    #[test_case(":_key", "_key", Selector::AfterColon; "postfix")]
    #[test_case(":a:", ":a", Selector::BeforeColon; "trailing wins")]
    #[test_case(":", "", Selector::BeforeColon; "colon only")]
    #[test_case("", "", Selector::Whole; "empty")]
    #[test_case("a:b", "a:b", Selector::Whole; "inner colon")]
    fn test_parse(attribute: &str, name: &str, selector: Selector) {
        assert_eq!(parse(attribute), (name, selector));
    }

    #[test_case("a:b:c", Selector::Whole, Some("a:b:c"); "whole")]
    #[test_case("a:b:c", Selector::BeforeColon, Some("a"); "before first")]
    #[test_case("a:b:c", Selector::AfterColon, Some("c"); "after last")]
    #[test_case(":c", Selector::BeforeColon, Some(""); "empty before")]
    #[test_case("a:", Selector::AfterColon, Some(""); "empty after")]
    #[test_case("abc", Selector::BeforeColon, None; "no colon before")]
    #[test_case("abc", Selector::AfterColon, None; "no colon after")]
    #[test_case("c/a:b", Selector::BeforeColon, Some("c/a"); "slash kept")]
    fn test_extract_string(input: &str, selector: Selector, expected: Option<&str>) {
        let value = Value::string(input);
        let extracted = extract(&value, selector, false);
        assert_eq!(
            extracted.as_deref().and_then(Value::as_str),
            expected,
            "{input:?} {selector:?}"
        );
    }

    #[test]
    fn test_extract_not_string() {
        let value = Value::Int(42);
        assert_eq!(
            extract(&value, Selector::Whole, false).as_deref(),
            Some(&value)
        );
        assert!(extract(&value, Selector::BeforeColon, false).is_none());
        assert!(extract(&value, Selector::AfterColon, true).is_none());
        assert!(extract(&Value::Null, Selector::AfterColon, false).is_none());
    }

    #[test]
    fn test_extract_split_primary_key() {
        let id = Value::string("customers/a:b");
        let extracted = extract(&id, Selector::Whole, true);
        assert_eq!(extracted.as_deref(), Some(&Value::string("a:b")));
        let extracted = extract(&id, Selector::BeforeColon, true);
        assert_eq!(extracted.as_deref(), Some(&Value::string("a")));
        let extracted = extract(&id, Selector::AfterColon, true);
        assert_eq!(extracted.as_deref(), Some(&Value::string("b")));

        // Only the first slash separates the collection
        let id = Value::string("c/d/e");
        let extracted = extract(&id, Selector::Whole, true);
        assert_eq!(extracted.as_deref(), Some(&Value::string("d/e")));

        // Without a slash, the value is used as is
        let key = Value::string("42");
        assert!(matches!(
            extract(&key, Selector::Whole, true),
            Some(Cow::Borrowed(_))
        ));
    }
}
