//! Value codecs.

use crate::{Error, ErrorContext, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

/// Payload written for keys whose authoritative answer is empty.
pub const EMPTY_SENTINEL: &str = "";

/// Blank payloads count as the sentinel, whatever whitespace a backend kept.
pub fn is_sentinel(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Converts values to and from the text stored in the cache.
pub trait Codec<V>: Send + Sync {
    fn encode(&self, value: &V) -> Result<String>;
    fn decode(&self, raw: &str) -> Result<V>;
}

/// JSON payloads via serde_json.
pub struct JsonCodec<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> JsonCodec<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for JsonCodec<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for JsonCodec<V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for JsonCodec<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JsonCodec")
    }
}

impl<V> Codec<V> for JsonCodec<V>
where
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &V) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, raw: &str) -> Result<V> {
        serde_json::from_str(raw).map_err(|e| {
            Error::codec_with_context(
                e.to_string(),
                ErrorContext::new()
                    .with_details(format!("payload length {}", raw.len()))
                    .with_source("json_codec"),
            )
        })
    }
}
