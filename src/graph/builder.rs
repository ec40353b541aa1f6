use super::{Graph, NodeId};
use crate::error::GraphError;
use crate::flow::FlowDefinition;
use crate::registry::NodeRegistry;
use ahash::AHashMap;
use std::sync::Arc;

impl Graph {
    /// Builds a graph from a flow definition: places every node, applies its
    /// property overrides, then wires the links.
    pub fn from_flow(registry: Arc<NodeRegistry>, flow: &FlowDefinition) -> Result<Self, GraphError> {
        let mut graph = Graph::new(registry);
        let mut placed: AHashMap<&str, NodeId> = AHashMap::new();

        for node_def in &flow.nodes {
            if placed.contains_key(node_def.id.as_str()) {
                return Err(GraphError::DuplicateFlowNode(node_def.id.clone()));
            }
            let id = graph.add_node(&node_def.node_type)?;
            for (name, value) in &node_def.properties {
                graph.set_property(id, name, value.clone())?;
            }
            placed.insert(&node_def.id, id);
            graph.labels.insert(node_def.id.clone(), id);
        }

        let resolve = |label: &str| {
            placed
                .get(label)
                .copied()
                .ok_or_else(|| GraphError::UnknownFlowNode(label.to_string()))
        };
        for link in &flow.links {
            let source = resolve(&link.source)?;
            let target = resolve(&link.target)?;
            graph.connect(source, link.source_slot, target, link.target_slot)?;
        }

        tracing::debug!(
            target: crate::TRACING_TARGET,
            nodes = graph.len(),
            links = flow.links.len(),
            "Built graph from flow"
        );
        Ok(graph)
    }
}
