use super::schema::Properties;
use crate::value::PortValue;
use serde_json::Value;
use std::any::Any;

static ABSENT: PortValue = PortValue::Absent;

/// Transient, type-specific state of one node instance (request bookkeeping,
/// the Watch display text, ...).
///
/// Every instance starts with an empty state. A node type claims it the first
/// time it asks for its own state type.
pub struct NodeState(Box<dyn Any + Send>);

impl NodeState {
    pub fn empty() -> Self {
        Self(Box::new(()))
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn get_or_default<T: Any + Send + Default>(&mut self) -> &mut T {
        if !self.0.is::<T>() {
            self.0 = Box::new(T::default());
        }
        self.0
            .downcast_mut::<T>()
            .expect("node state holds the type that was just installed")
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeState").finish_non_exhaustive()
    }
}

/// Everything a node's evaluation function may read or write during one tick.
pub struct EvalContext<'a> {
    node_id: usize,
    inputs: &'a [PortValue],
    properties: &'a Properties,
    outputs: &'a mut [PortValue],
    state: &'a mut NodeState,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        node_id: usize,
        inputs: &'a [PortValue],
        properties: &'a Properties,
        outputs: &'a mut [PortValue],
        state: &'a mut NodeState,
    ) -> Self {
        Self {
            node_id,
            inputs,
            properties,
            outputs,
            state,
        }
    }

    pub fn node_id(&self) -> usize {
        self.node_id
    }

    /// The value on an input slot. Unconnected or undeclared slots are absent.
    pub fn input(&self, slot: usize) -> &PortValue {
        self.inputs.get(slot).unwrap_or(&ABSENT)
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn property_str(&self, name: &str) -> &str {
        self.properties.get_str(name)
    }

    /// Overwrites the cached value of an output slot. Writes to undeclared
    /// slots are dropped.
    pub fn set_output(&mut self, slot: usize, value: impl Into<PortValue>) {
        match self.outputs.get_mut(slot) {
            Some(out) => *out = value.into(),
            None => tracing::debug!(
                target: crate::TRACING_TARGET,
                node = self.node_id,
                slot,
                "Dropped write to undeclared output slot"
            ),
        }
    }

    pub fn state<T: Any + Send + Default>(&mut self) -> &mut T {
        self.state.get_or_default::<T>()
    }
}
