use crate::error::RegistryError;
use crate::fetch::SharedFetcher;
use crate::node::SharedNodeType;
use std::collections::BTreeMap;
use tokio::runtime::Handle;

/// The set of node types a graph may instantiate, keyed by identifier.
///
/// A registry is populated once at startup and then shared (usually behind an
/// `Arc`) by every graph that places nodes from it.
#[derive(Default)]
pub struct NodeRegistry {
    types: BTreeMap<String, SharedNodeType>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding all built-in node types.
    pub fn with_builtin_nodes(
        fetcher: SharedFetcher,
        runtime: Handle,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        crate::nodes::register_builtin_nodes(&mut registry, fetcher, runtime)?;
        Ok(registry)
    }

    pub fn register(&mut self, node_type: SharedNodeType) -> Result<(), RegistryError> {
        let name = node_type.type_name().to_string();
        if self.types.contains_key(&name) {
            return Err(RegistryError::DuplicateNodeType(name));
        }
        tracing::debug!(target: crate::TRACING_TARGET, node_type = %name, "Registered node type");
        self.types.insert(name, node_type);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Result<&SharedNodeType, RegistryError> {
        self.types
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownNodeType(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered identifiers in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
