#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use commonware_sharding::{
    mocks,
    strategy::{COMMUNITY_COMPAT, ENTERPRISE_COMPAT, HASH},
    Config, Descriptor, Error, Role, Strategy, Value,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const MAX_DEPTH: usize = 3;
const MAX_MEMBERS: usize = 8;
const MAX_SHARDS: u8 = 32;
const ATTRIBUTES: [&str; 7] = ["_key", "_key:", ":_key", "a", "a:", ":a", "b"];

fn value(u: &mut Unstructured<'_>, depth: usize) -> arbitrary::Result<Value> {
    let choice = if depth >= MAX_DEPTH {
        u.int_in_range(0..=4)?
    } else {
        u.int_in_range(0..=6)?
    };
    Ok(match choice {
        0 => Value::Null,
        1 => Value::Bool(u.arbitrary()?),
        2 => Value::Int(u.arbitrary()?),
        3 => Value::Double(u.arbitrary()?),
        4 => Value::String(u.arbitrary()?),
        5 => {
            let len = u.int_in_range(0..=MAX_MEMBERS)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(value(u, depth + 1)?);
            }
            Value::Array(items)
        }
        _ => {
            let len = u.int_in_range(0..=MAX_MEMBERS)?;
            let mut members = Vec::with_capacity(len);
            for _ in 0..len {
                let name = *u.choose(&ATTRIBUTES)?;
                members.push((name.trim_matches(':').to_string(), value(u, depth + 1)?));
            }
            Value::Object(members)
        }
    })
}

#[derive(Debug)]
struct FuzzInput {
    name: &'static str,
    shard_keys: Vec<&'static str>,
    shards: u8,
    document: Value,
    complete: bool,
    key: String,
}

impl<'a> Arbitrary<'a> for FuzzInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let name = *u.choose(&[COMMUNITY_COMPAT, ENTERPRISE_COMPAT, HASH])?;
        let count = u.int_in_range(1..=3)?;
        let mut shard_keys = Vec::with_capacity(count);
        for _ in 0..count {
            shard_keys.push(*u.choose(&ATTRIBUTES)?);
        }
        Ok(Self {
            name,
            shard_keys,
            shards: u.int_in_range(1..=MAX_SHARDS)?,
            document: value(u, 0)?,
            complete: u.arbitrary()?,
            key: u.arbitrary()?,
        })
    }
}

fn fuzz(input: FuzzInput) {
    let catalog = Arc::new(mocks::Catalog::default());
    catalog.insert(1, mocks::shard_ids(input.shards as usize));
    let cfg = Config {
        collection: 1,
        role: Role::Coordinator,
        smart_edge: false,
    };
    let descriptor = Descriptor::new(input.name, input.shard_keys.iter().copied());
    let strategy = Strategy::open(&descriptor, &cfg, catalog).expect("valid descriptor");

    let first = strategy.responsible_shard(&input.document, input.complete, &input.key);
    let second = strategy.responsible_shard(&input.document, input.complete, &input.key);
    match (first, second) {
        (Ok(first), Ok(second)) => {
            assert_eq!(first, second);
            assert!(mocks::shard_ids(input.shards as usize).contains(&first.0));
        }
        (Err(Error::MissingShardingAttributes), Err(Error::MissingShardingAttributes)) => {}
        (Err(Error::InvalidDocumentShape), Err(Error::InvalidDocumentShape)) => {}
        (first, second) => panic!("unexpected results: {first:?} {second:?}"),
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
