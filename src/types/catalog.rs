use std::collections::BTreeMap;

use serde::Deserialize;

use super::null_default;
use crate::watch::Indexed;

/// A service name and the union of its instances' tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub tags: Vec<String>,
}

/// Services registered in the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceList {
    pub index: u64,
    pub list: Vec<Service>,
}

impl ServiceList {
    /// Builds the list from the catalog's `{name: [tags]}` object
    pub(crate) fn from_catalog(
        index: u64,
        services: BTreeMap<String, Option<Vec<String>>>,
    ) -> Self {
        let list = services
            .into_iter()
            .map(|(name, tags)| Service {
                name,
                tags: tags.unwrap_or_default(),
            })
            .collect();
        Self { index, list }
    }
}

impl Indexed for ServiceList {
    fn index(&self) -> u64 {
        self.index
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    #[serde(rename = "ID", default, deserialize_with = "null_default")]
    pub id: String,
    /// Node name
    #[serde(default, deserialize_with = "null_default")]
    pub node: String,
    #[serde(default, deserialize_with = "null_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_default")]
    pub datacenter: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tagged_addresses: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_default")]
    pub meta: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeList {
    pub index: u64,
    pub list: Vec<Node>,
}

impl Indexed for NodeList {
    fn index(&self) -> u64 {
        self.index
    }
}

/// A registered service instance as seen by the health endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceInstance {
    #[serde(rename = "ID", default, deserialize_with = "null_default")]
    pub id: String,
    /// Service name
    #[serde(default, deserialize_with = "null_default")]
    pub service: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_default")]
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    #[default]
    Passing,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Check {
    #[serde(rename = "CheckID", default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub node: String,
    #[serde(default, deserialize_with = "null_default")]
    pub status: CheckStatus,
    #[serde(rename = "ServiceID", default, deserialize_with = "null_default")]
    pub service_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub output: String,
}

/// A node, one service instance on it, and the checks covering both
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceEntry {
    #[serde(default)]
    pub node: Node,
    #[serde(default)]
    pub service: ServiceInstance,
    #[serde(default, deserialize_with = "null_default")]
    pub checks: Vec<Check>,
}

impl ServiceEntry {
    /// Worst status among the entry's checks; critical beats warning beats passing
    pub fn aggregated_status(&self) -> CheckStatus {
        let mut status = CheckStatus::Passing;
        for check in &self.checks {
            match check.status {
                CheckStatus::Critical => return CheckStatus::Critical,
                CheckStatus::Warning => status = CheckStatus::Warning,
                _ => {}
            }
        }
        status
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEntryList {
    pub index: u64,
    pub list: Vec<ServiceEntry>,
}

impl Indexed for ServiceEntryList {
    fn index(&self) -> u64 {
        self.index
    }
}
