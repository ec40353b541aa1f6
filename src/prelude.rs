//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the jsonflow crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use jsonflow::prelude::*;
//!
//! # fn run_example(registry: std::sync::Arc<NodeRegistry>) -> Result<()> {
//! let flow = FlowDefinition::from_file("path/to/flow.json")?;
//! let mut graph = Graph::from_flow(registry, &flow)?;
//! graph.tick();
//! # Ok(())
//! # }
//! ```

// Graph host and registry
pub use crate::graph::{Graph, Link, NodeId, NodeInstance};
pub use crate::registry::NodeRegistry;

// Node authoring
pub use crate::node::{
    EvalContext, NodeSchema, NodeState, NodeType, PortSpec, PortType, Properties,
    PropertyControl, PropertySpec, SharedNodeType,
};
pub use crate::value::PortValue;

// Built-in nodes
pub use crate::nodes::{
    FilterNode, JsonConstantNode, MergeNode, PropertyNode, RequestNode, StringConstantNode,
    TemplateNode, WatchNode,
};

// Networking
pub use crate::fetch::{
    FetchConfig, FetchRequest, FetchResponse, Fetcher, HttpFetcher, HttpMethod, SharedFetcher,
};

// Flow files
pub use crate::flow::{FlowDefinition, FlowLinkDefinition, FlowNodeDefinition};

// Error types
pub use crate::error::{FetchError, FlowError, GraphError, RegistryError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
