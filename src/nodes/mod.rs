//! The built-in node types.

pub mod display;
pub mod json;
pub mod request;

pub use display::{JsonConstantNode, StringConstantNode, WatchNode};
pub use json::{FilterNode, MergeNode, PropertyNode, TemplateNode};
pub use request::RequestNode;

use crate::error::RegistryError;
use crate::fetch::SharedFetcher;
use crate::registry::NodeRegistry;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Registers every built-in node type. The request node spawns its network
/// tasks on `runtime` through `fetcher`.
pub fn register_builtin_nodes(
    registry: &mut NodeRegistry,
    fetcher: SharedFetcher,
    runtime: Handle,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(RequestNode::new(fetcher, runtime)))?;
    registry.register(Arc::new(PropertyNode::new()))?;
    registry.register(Arc::new(FilterNode::new()))?;
    registry.register(Arc::new(MergeNode::new()))?;
    registry.register(Arc::new(TemplateNode::new()))?;
    registry.register(Arc::new(WatchNode::new()))?;
    registry.register(Arc::new(StringConstantNode::new()))?;
    registry.register(Arc::new(JsonConstantNode::new()))?;
    Ok(())
}
