//! Serializable description of a graph: which nodes to place, how to
//! configure them and how to wire them.

use crate::error::FlowError;
use crate::nodes::{FilterNode, RequestNode, StringConstantNode, WatchNode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fs;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub nodes: Vec<FlowNodeDefinition>,
    #[serde(default)]
    pub links: Vec<FlowLinkDefinition>,
}

/// A node to place. `id` is a label local to the flow file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNodeDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    /// Overrides of the type's default property values.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLinkDefinition {
    pub source: String,
    #[serde(default)]
    pub source_slot: usize,
    pub target: String,
    #[serde(default)]
    pub target_slot: usize,
}

impl FlowNodeDefinition {
    pub fn new(id: &str, node_type: &str) -> Self {
        Self {
            id: id.to_string(),
            node_type: node_type.to_string(),
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }
}

impl FlowLinkDefinition {
    pub fn new(source: &str, source_slot: usize, target: &str, target_slot: usize) -> Self {
        Self {
            source: source.to_string(),
            source_slot,
            target: target.to_string(),
            target_slot,
        }
    }
}

impl FlowDefinition {
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &str) -> Result<Self, FlowError> {
        let content = fs::read_to_string(path).map_err(|source| FlowError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, FlowError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The starter pipeline: a URL constant feeds a request whose response is
    /// filtered down to completed todos and shown in a watch.
    pub fn demo() -> Self {
        Self {
            nodes: vec![
                FlowNodeDefinition::new("url", StringConstantNode::TYPE_NAME)
                    .with_property("value", json!("https://jsonplaceholder.typicode.com/todos")),
                FlowNodeDefinition::new("fetch", RequestNode::TYPE_NAME),
                FlowNodeDefinition::new("filter", FilterNode::TYPE_NAME)
                    .with_property("key", json!("completed"))
                    .with_property("operator", json!("=="))
                    .with_property("value", json!("true")),
                FlowNodeDefinition::new("watch", WatchNode::TYPE_NAME),
            ],
            links: vec![
                FlowLinkDefinition::new("url", 0, "fetch", 0),
                FlowLinkDefinition::new("fetch", 0, "filter", 0),
                FlowLinkDefinition::new("filter", 0, "watch", 0),
            ],
        }
    }
}
