use serde::Deserialize;
use serde::Serialize;

use super::base64_bytes;
use super::lossy_text;
use super::null_default;
use crate::watch::Indexed;

/// One entry of the key-value store
///
/// Equality covers the stored bytes, so a change that only differs in
/// non-UTF-8 content is still seen by a watch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "WireKeyValue")]
pub struct KeyValue {
    pub key: String,
    /// Value as text, `None` when the key holds no value. Bytes that are
    /// not valid UTF-8 are replaced; see `raw_value`.
    pub value: Option<String>,
    /// Value exactly as stored
    pub raw_value: Option<Vec<u8>>,
    pub session: Option<String>,
    pub flags: u64,
    pub create_index: u64,
    pub modify_index: u64,
    pub lock_index: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireKeyValue {
    #[serde(default, deserialize_with = "null_default")]
    key: String,
    #[serde(default, deserialize_with = "base64_bytes")]
    value: Option<Vec<u8>>,
    #[serde(default)]
    session: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    flags: u64,
    #[serde(default, deserialize_with = "null_default")]
    create_index: u64,
    #[serde(default, deserialize_with = "null_default")]
    modify_index: u64,
    #[serde(default, deserialize_with = "null_default")]
    lock_index: u64,
}

impl From<WireKeyValue> for KeyValue {
    fn from(wire: WireKeyValue) -> Self {
        Self {
            key: wire.key,
            value: wire.value.as_deref().map(lossy_text),
            raw_value: wire.value,
            session: wire.session,
            flags: wire.flags,
            create_index: wire.create_index,
            modify_index: wire.modify_index,
            lock_index: wire.lock_index,
        }
    }
}

impl KeyValue {
    /// An absent key reads as the default entry
    pub fn is_present(&self) -> bool {
        !self.key.is_empty()
    }
}

impl Indexed for KeyValue {
    fn index(&self) -> u64 {
        self.modify_index
    }
}

/// Entries under a prefix plus the index they were read at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueList {
    pub index: u64,
    pub list: Vec<KeyValue>,
}

impl Indexed for KeyValueList {
    fn index(&self) -> u64 {
        self.index
    }
}

/// Write options of a key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueOptions {
    /// Opaque flags stored with the entry
    pub flags: u64,
    /// Session to acquire a lock with
    pub acquire_session: Option<String>,
    /// Session to release a lock with
    pub release_session: Option<String>,
    /// Check-and-set: only write when the entry's modify index matches.
    /// `Some(0)` writes only when the key does not exist.
    pub cas_index: Option<u64>,
}
