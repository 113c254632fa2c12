//! Resource models of the HTTP API.
//!
//! Only the fields the built-in clients and watches need are modelled;
//! unknown fields are ignored. List types carry the `X-Consul-Index` of the
//! response they were read from so that watches can compare them.

mod catalog;
mod event;
mod kv;
pub use catalog::*;
pub use event::*;
pub use kv::*;


use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use serde::Deserialize;
use serde::Deserializer;

/// Treats an explicit JSON `null` like a missing field
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a base64 field into the stored bytes. Invalid base64 is a
/// decode error.
pub(crate) fn base64_bytes<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(encoded) => BASE64_ENGINE
            .decode(encoded.as_bytes())
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid base64 value: {e}"))),
    }
}

/// Decodes a base64 field into text. Invalid UTF-8 is replaced.
pub(crate) fn base64_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(base64_bytes(deserializer)?.map(|bytes| lossy_text(&bytes)))
}

pub(crate) fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
