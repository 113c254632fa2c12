use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::INDEX_PARAM;
use crate::constants::WAIT_PARAM;

/// Options of a blocking query: wait for a change after `index`, at most
/// for `wait`.
///
/// `index == 0` means there is no prior state and the store answers
/// immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingQueryOptions {
    pub index: u64,
    /// Duration string understood by the store, e.g. "30s" or "5m"
    pub wait: Option<String>,
}

impl BlockingQueryOptions {
    pub fn new(
        index: u64,
        wait: impl Into<String>,
    ) -> Self {
        Self {
            index,
            wait: Some(wait.into()),
        }
    }

    pub fn with_index(
        mut self,
        index: u64,
    ) -> Self {
        self.index = index;
        self
    }

    pub fn with_wait(
        mut self,
        wait: impl Into<String>,
    ) -> Self {
        self.wait = Some(wait.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Param {
    /// Emitted as a bare key, e.g. `recurse`
    Flag,
    Value(String),
}

/// Query string builder
///
/// Empty and absent values are dropped on insert, so an encoded query never
/// contains `key=` with nothing after it. Parameters are kept sorted by key
/// which makes the encoded form stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: BTreeMap<String, Param>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `Query::new().put(key, value)`
    pub fn of(
        key: &str,
        value: impl ToString,
    ) -> Self {
        Self::new().put(key, value)
    }

    /// Adds `key=value` unless the value renders to an empty string
    pub fn put(
        mut self,
        key: &str,
        value: impl ToString,
    ) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.params.insert(key.to_string(), Param::Value(value));
        }
        self
    }

    /// Adds `key=value` only when a value is present
    pub fn put_opt<V: ToString>(
        self,
        key: &str,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(v) => self.put(key, v),
            None => self,
        }
    }

    /// Adds a presence-only parameter when `enabled`
    pub fn flag(
        mut self,
        key: &str,
        enabled: bool,
    ) -> Self {
        if enabled {
            self.params.insert(key.to_string(), Param::Flag);
        }
        self
    }

    /// Adds `index` and `wait` of a blocking query when they are set
    pub fn blocking(
        self,
        options: Option<&BlockingQueryOptions>,
    ) -> Self {
        let Some(options) = options else {
            return self;
        };
        let query = if options.index > 0 {
            self.put(INDEX_PARAM, options.index)
        } else {
            self
        };
        query.put_opt(WAIT_PARAM, options.wait.as_deref())
    }

    /// Adds `key=value` unless the key is already present
    pub fn put_if_absent(
        self,
        key: &str,
        value: impl ToString,
    ) -> Self {
        if self.params.contains_key(key) {
            self
        } else {
            self.put(key, value)
        }
    }

    /// Value of `key`. Flags read as an empty string.
    pub fn get(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.params.get(key).map(|p| match p {
            Param::Flag => "",
            Param::Value(v) => v.as_str(),
        })
    }

    pub fn contains(
        &self,
        key: &str,
    ) -> bool {
        self.params.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Percent-encodes keys and values independently and joins them with `&`
    pub fn encode(&self) -> String {
        self.params
            .iter()
            .map(|(key, param)| match param {
                Param::Flag => urlencoding::encode(key).into_owned(),
                Param::Value(value) => format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)),
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl From<&BlockingQueryOptions> for Query {
    fn from(options: &BlockingQueryOptions) -> Self {
        Query::new().blocking(Some(options))
    }
}
