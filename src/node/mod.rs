pub mod context;
pub mod schema;

pub use context::*;
pub use schema::*;

use std::sync::Arc;

/// Defines the contract for a kind of node that can be placed in a graph.
///
/// A node type is stateless and shared by every instance placed from it. All
/// per-instance data (properties, output cache, transient state) arrives
/// through the [`EvalContext`] handed to [`NodeType::evaluate`].
pub trait NodeType: Send + Sync {
    fn schema(&self) -> &NodeSchema;

    /// Runs one tick for one instance. Must return promptly and never fail;
    /// problems are reported as values on the output ports.
    fn evaluate(&self, ctx: &mut EvalContext<'_>);

    /// Optional custom drawing hook: the lines to show on the node's body.
    fn display(&self, _state: &NodeState) -> Option<Vec<String>> {
        None
    }

    fn type_name(&self) -> &str {
        &self.schema().type_name
    }
}

pub type SharedNodeType = Arc<dyn NodeType>;
