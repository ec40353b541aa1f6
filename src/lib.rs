//! # jsonflow - JSON Dataflow Node Library
//!
//! **jsonflow** provides a small library of dataflow nodes for fetching, reshaping
//! and inspecting JSON: an HTTP request node, dot-path extraction, array
//! filtering, shallow merging, object templating, a watch display and constants.
//! Nodes are evaluated once per *tick* by a host graph that feeds each node the
//! latest outputs of the nodes wired into it.
//!
//! ## Core Workflow
//!
//! 1.  **Build a Registry**: `NodeRegistry::with_builtin_nodes` installs every
//!     built-in node type. Custom node types implement the `NodeType` trait and
//!     are added with `NodeRegistry::register`.
//! 2.  **Describe a Graph**: either place nodes by hand with `Graph::add_node` and
//!     `Graph::connect`, or load a `FlowDefinition` from JSON and call
//!     `Graph::from_flow`.
//! 3.  **Tick**: call `Graph::tick` repeatedly. Every tick evaluates the nodes in
//!     dependency order. Evaluation never blocks: the request node runs its HTTP
//!     exchange as a background task and publishes the result on a later tick.
//! 4.  **Read Results**: `Graph::output` returns the cached value of any output
//!     port and `Graph::display` returns what a watch node shows.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jsonflow::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let fetcher = Arc::new(HttpFetcher::with_defaults()?);
//!     let registry = NodeRegistry::with_builtin_nodes(fetcher, tokio::runtime::Handle::current())?;
//!
//!     let mut graph = Graph::from_flow(Arc::new(registry), &FlowDefinition::demo())?;
//!     let watch = graph.node_by_label("watch").expect("demo flow has a watch node");
//!
//!     for _ in 0..20 {
//!         graph.tick();
//!         tokio::time::sleep(std::time::Duration::from_millis(100)).await;
//!     }
//!
//!     for line in graph.display(watch).unwrap_or_default() {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fetch;
pub mod flow;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod prelude;
pub mod registry;
pub mod value;

/// Tracing target for node evaluation and graph operations.
pub const TRACING_TARGET: &str = "jsonflow";
