use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error as CodecError, Read, ReadRangeExt, Write};

/// Maximum number of shard key attributes accepted when decoding a [Descriptor].
pub const MAX_SHARD_KEYS: usize = 8;

/// Maximum length (in bytes) of a strategy name accepted when decoding a [Descriptor].
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum length (in bytes) of a shard key attribute accepted when decoding a [Descriptor].
pub const MAX_ATTRIBUTE_LENGTH: usize = 256;

/// The persisted identity of a collection's sharding: the strategy name and its shard keys.
///
/// A [Descriptor] is stored when a collection is created and used to reopen the same
/// [super::Strategy] whenever the collection is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    /// Name of the strategy.
    pub name: String,

    /// Ordered shard key attributes (optionally with a partial-key selector).
    pub shard_keys: Vec<String>,
}

impl Descriptor {
    /// Create a new [Descriptor].
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        shard_keys: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            shard_keys: shard_keys.into_iter().map(Into::into).collect(),
        }
    }
}

fn utf8(bytes: Vec<u8>, context: &'static str) -> Result<String, CodecError> {
    String::from_utf8(bytes).map_err(|_| CodecError::Invalid(context, "invalid utf-8"))
}

impl Write for Descriptor {
    fn write(&self, buf: &mut impl BufMut) {
        self.name.as_bytes().to_vec().write(buf);
        self.shard_keys.len().write(buf);
        for attribute in &self.shard_keys {
            attribute.as_bytes().to_vec().write(buf);
        }
    }
}

impl Read for Descriptor {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        let name = Vec::<u8>::read_range(buf, ..=MAX_NAME_LENGTH)?;
        let name = utf8(name, "Descriptor::name")?;
        let shard_keys = Vec::<Vec<u8>>::read_cfg(
            buf,
            &((..=MAX_SHARD_KEYS).into(), ((..=MAX_ATTRIBUTE_LENGTH).into(), ())),
        )?
        .into_iter()
        .map(|attribute| utf8(attribute, "Descriptor::shard_keys"))
        .collect::<Result<_, _>>()?;
        Ok(Self { name, shard_keys })
    }
}

impl EncodeSize for Descriptor {
    fn encode_size(&self) -> usize {
        self.name.as_bytes().to_vec().encode_size()
            + self.shard_keys.len().encode_size()
            + self
                .shard_keys
                .iter()
                .map(|attribute| attribute.as_bytes().to_vec().encode_size())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::{DecodeExt, Encode};

    #[test]
    fn test_codec() {
        let descriptor = Descriptor::new("hash", ["_key:", "tenant"]);
        let encoded = descriptor.encode();
        assert_eq!(encoded.len(), descriptor.encode_size());
        assert_eq!(encoded.len(), 1 + 4 + 1 + 1 + 5 + 1 + 6);
        let decoded = Descriptor::decode(encoded).unwrap();
        assert_eq!(descriptor, decoded);
    }

    #[test]
    fn test_decode_too_many_keys() {
        let keys: Vec<String> = (0..=MAX_SHARD_KEYS).map(|i| format!("k{i}")).collect();
        let encoded = Descriptor::new("hash", keys).encode();
        assert!(matches!(
            Descriptor::decode(encoded),
            Err(CodecError::InvalidLength(_))
        ));
    }

    #[test]
    fn test_decode_long_name() {
        let encoded = Descriptor::new("x".repeat(MAX_NAME_LENGTH + 1), ["_key"]).encode();
        assert!(matches!(
            Descriptor::decode(encoded),
            Err(CodecError::InvalidLength(_))
        ));
    }

    #[test]
    fn test_decode_truncated() {
        let encoded = Descriptor::new("hash", ["_key"]).encode();
        let truncated = &encoded[..encoded.len() - 1];
        assert!(matches!(
            Descriptor::decode(truncated),
            Err(CodecError::EndOfBuffer)
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        // Name of length 2 followed by no shard keys
        let buf = [0x02u8, 0xff, 0xfe, 0x00];
        assert!(matches!(
            Descriptor::decode(&buf[..]),
            Err(CodecError::Invalid("Descriptor::name", "invalid utf-8"))
        ));
    }
}
