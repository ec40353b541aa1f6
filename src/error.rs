use thiserror::Error;

/// Errors raised while populating or querying a `NodeRegistry`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Node type '{0}' is already registered")]
    DuplicateNodeType(String),

    #[error("Node type '{0}' is not registered")]
    UnknownNodeType(String),
}

/// Errors raised while editing or building a graph.
///
/// These are structural problems with the graph itself. Node evaluation never
/// produces them; nodes degrade to sentinel values instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Node {0} does not exist in this graph")]
    NodeNotFound(usize),

    #[error("Node {node} has no {direction} slot {slot} (it declares {available})")]
    SlotOutOfRange {
        node: usize,
        direction: &'static str,
        slot: usize,
        available: usize,
    },

    #[error("Node type '{type_name}' has no property named '{property}'")]
    UnknownProperty { type_name: String, property: String },

    #[error("Linking node {source_node} to node {target_node} would create a cycle")]
    Cycle {
        source_node: usize,
        target_node: usize,
    },

    #[error("Flow link refers to node '{0}', which is not defined in the flow")]
    UnknownFlowNode(String),

    #[error("Flow defines node '{0}' more than once")]
    DuplicateFlowNode(String),
}

/// Errors raised while loading a flow definition.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Could not read flow file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse flow JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors produced by a `Fetcher`. The request node turns every one of these
/// into an error payload on its `Response` port.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Response (status {status}) is not valid JSON: {source}")]
    InvalidJson {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}
