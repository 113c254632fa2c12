use serde::Deserialize;
use serde::Serialize;

use super::base64_text;
use super::null_default;
use crate::watch::Indexed;

/// A user event fired through the agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    #[serde(rename = "ID", default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "base64_text")]
    pub payload: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub node_filter: String,
    #[serde(default, deserialize_with = "null_default")]
    pub service_filter: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tag_filter: String,
    #[serde(default, deserialize_with = "null_default")]
    pub version: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub l_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventList {
    pub index: u64,
    pub list: Vec<Event>,
}

impl Indexed for EventList {
    fn index(&self) -> u64 {
        self.index
    }
}

/// Filters and payload of a fired event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOptions {
    /// Regular expression over node names
    pub node: Option<String>,
    /// Regular expression over service names
    pub service: Option<String>,
    /// Regular expression over service tags
    pub tag: Option<String>,
    pub payload: Option<String>,
}
