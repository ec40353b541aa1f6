use crate::error::GraphError;
use crate::node::{EvalContext, NodeState, Properties, SharedNodeType};
use crate::registry::NodeRegistry;
use crate::value::PortValue;
use ahash::AHashMap;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

mod builder;

pub type NodeId = usize;

/// One placed occurrence of a node type.
pub struct NodeInstance {
    id: NodeId,
    node_type: SharedNodeType,
    properties: Properties,
    outputs: Vec<PortValue>,
    state: NodeState,
}

impl NodeInstance {
    fn new(id: NodeId, node_type: SharedNodeType) -> Self {
        let schema = node_type.schema();
        let properties = schema.default_properties();
        let outputs = vec![PortValue::Absent; schema.outputs.len()];
        Self {
            id,
            node_type,
            properties,
            outputs,
            state: NodeState::empty(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn type_name(&self) -> &str {
        self.node_type.type_name()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn outputs(&self) -> &[PortValue] {
        &self.outputs
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn input_count(&self) -> usize {
        self.node_type.schema().inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }
}

/// A connection from one node's output slot to another node's input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub source: NodeId,
    pub source_slot: usize,
    pub target: NodeId,
    pub target_slot: usize,
}

/// A minimal host for the node library: owns instances and links and runs
/// ticks in dependency order.
///
/// Each input slot takes at most one link; an output slot may feed any
/// number of inputs. Links that would close a cycle are refused, so every
/// tick can evaluate upstream nodes before the nodes they feed.
pub struct Graph {
    registry: Arc<NodeRegistry>,
    nodes: BTreeMap<NodeId, NodeInstance>,
    // (target, target_slot) -> (source, source_slot)
    links: BTreeMap<(NodeId, usize), (NodeId, usize)>,
    labels: AHashMap<String, NodeId>,
    next_id: NodeId,
    ticks: u64,
}

impl Graph {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self {
            registry,
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            labels: AHashMap::new(),
            next_id: 0,
            ticks: 0,
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Places a new instance of `type_name` with its default properties.
    pub fn add_node(&mut self, type_name: &str) -> Result<NodeId, GraphError> {
        let node_type = self.registry.get(type_name)?.clone();
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, NodeInstance::new(id, node_type));
        tracing::debug!(target: crate::TRACING_TARGET, node = id, node_type = type_name, "Added node");
        Ok(id)
    }

    /// Removes a node and every link touching it. Work the node started (an
    /// outstanding request) is not cancelled; its result is discarded.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.nodes.remove(&id).ok_or(GraphError::NodeNotFound(id))?;
        self.links
            .retain(|&(target, _), &mut (source, _)| target != id && source != id);
        self.labels.retain(|_, node| *node != id);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeInstance> {
        self.nodes.get(&id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by the label it was given in a flow definition.
    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.labels.get(label).copied()
    }

    /// Labels paired with their nodes, sorted by node id.
    pub fn labels(&self) -> Vec<(&str, NodeId)> {
        let mut labels: Vec<_> = self.labels.iter().map(|(l, id)| (l.as_str(), *id)).collect();
        labels.sort_by_key(|(_, id)| *id);
        labels
    }

    pub fn set_property(&mut self, id: NodeId, name: &str, value: Value) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        let schema = node.node_type.schema();
        if schema.property(name).is_none() {
            return Err(GraphError::UnknownProperty {
                type_name: schema.type_name.clone(),
                property: name.to_string(),
            });
        }
        node.properties.set(name, value);
        Ok(())
    }

    /// Links `source`'s output slot to `target`'s input slot, replacing any
    /// link already feeding that input.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_slot: usize,
        target: NodeId,
        target_slot: usize,
    ) -> Result<(), GraphError> {
        let source_node = self.nodes.get(&source).ok_or(GraphError::NodeNotFound(source))?;
        let target_node = self.nodes.get(&target).ok_or(GraphError::NodeNotFound(target))?;
        check_slot(source, "output", source_slot, source_node.output_count())?;
        check_slot(target, "input", target_slot, target_node.input_count())?;

        if source == target || self.reaches(target, source) {
            return Err(GraphError::Cycle {
                source_node: source,
                target_node: target,
            });
        }

        self.links
            .insert((target, target_slot), (source, source_slot));
        Ok(())
    }

    /// Removes the link feeding `target`'s input slot, if there is one.
    pub fn disconnect(&mut self, target: NodeId, target_slot: usize) -> Option<Link> {
        self.links
            .remove(&(target, target_slot))
            .map(|(source, source_slot)| Link {
                source,
                source_slot,
                target,
                target_slot,
            })
    }

    pub fn links(&self) -> Vec<Link> {
        self.links
            .iter()
            .map(|(&(target, target_slot), &(source, source_slot))| Link {
                source,
                source_slot,
                target,
                target_slot,
            })
            .collect()
    }

    /// Whether `to` is downstream of `from`.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.extend(
                self.links
                    .iter()
                    .filter(|(_, (source, _))| *source == current)
                    .map(|(&(target, _), _)| target),
            );
        }
        false
    }

    /// Node ids in dependency order; ties go to the lower id.
    pub fn evaluation_order(&self) -> Vec<NodeId> {
        let mut indegree: BTreeMap<NodeId, usize> = self.nodes.keys().map(|&id| (id, 0)).collect();
        let mut downstream: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for (&(target, _), &(source, _)) in &self.links {
            *indegree.entry(target).or_default() += 1;
            downstream.entry(source).or_default().push(target);
        }

        let mut ready: BTreeSet<NodeId> = indegree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_first() {
            order.push(id);
            for next in downstream.get(&id).into_iter().flatten() {
                if let Some(degree) = indegree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*next);
                    }
                }
            }
        }
        order
    }

    /// Runs one evaluation pass over every node.
    pub fn tick(&mut self) {
        self.ticks += 1;
        let order = self.evaluation_order();
        tracing::debug!(target: crate::TRACING_TARGET, tick = self.ticks, nodes = order.len(), "Tick");

        for id in order {
            let inputs = self.gather_inputs(id);
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            let node_type = node.node_type.clone();
            let mut ctx = EvalContext::new(
                id,
                &inputs,
                &node.properties,
                &mut node.outputs,
                &mut node.state,
            );
            node_type.evaluate(&mut ctx);
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    fn gather_inputs(&self, id: NodeId) -> Vec<PortValue> {
        let count = self.nodes.get(&id).map_or(0, NodeInstance::input_count);
        (0..count)
            .map(|slot| {
                self.links
                    .get(&(id, slot))
                    .and_then(|&(source, source_slot)| {
                        self.nodes.get(&source)?.outputs.get(source_slot).cloned()
                    })
                    .unwrap_or_default()
            })
            .collect()
    }

    /// The cached value of an output slot.
    pub fn output(&self, id: NodeId, slot: usize) -> Option<&PortValue> {
        self.nodes.get(&id)?.outputs.get(slot)
    }

    /// What the node draws on its body, for node types with a display hook.
    pub fn display(&self, id: NodeId) -> Option<Vec<String>> {
        let node = self.nodes.get(&id)?;
        node.node_type.display(&node.state)
    }
}

fn check_slot(
    node: NodeId,
    direction: &'static str,
    slot: usize,
    available: usize,
) -> Result<(), GraphError> {
    if slot < available {
        Ok(())
    } else {
        Err(GraphError::SlotOutOfRange {
            node,
            direction,
            slot,
            available,
        })
    }
}
