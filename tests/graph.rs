//! Tests for the graph host: wiring rules, evaluation order and flow building.
mod common;
use common::*;
use jsonflow::prelude::*;
use serde_json::json;

#[test]
fn test_unknown_node_type_is_rejected() {
    let mut graph = Graph::new(pure_registry());
    let err = graph.add_node("json/unknown").unwrap_err();
    assert!(matches!(
        err,
        GraphError::Registry(RegistryError::UnknownNodeType(ref name)) if name == "json/unknown"
    ));
    assert!(graph.is_empty());
}

#[test]
fn test_unknown_property_is_rejected() {
    let mut graph = Graph::new(pure_registry());
    let node = graph.add_node(PropertyNode::TYPE_NAME).unwrap();
    let err = graph.set_property(node, "colour", json!("red")).unwrap_err();
    assert!(matches!(err, GraphError::UnknownProperty { ref property, .. } if property == "colour"));

    let err = graph.set_property(99, "path", json!("a")).unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound(99)));
}

#[test]
fn test_connect_checks_slot_ranges() {
    let mut graph = Graph::new(pure_registry());
    let source = graph.add_node(JsonConstantNode::TYPE_NAME).unwrap();
    let merge = graph.add_node(MergeNode::TYPE_NAME).unwrap();

    let err = graph.connect(source, 1, merge, 0).unwrap_err();
    assert!(matches!(
        err,
        GraphError::SlotOutOfRange {
            direction: "output",
            slot: 1,
            available: 1,
            ..
        }
    ));

    let err = graph.connect(source, 0, merge, 2).unwrap_err();
    assert!(matches!(
        err,
        GraphError::SlotOutOfRange {
            direction: "input",
            available: 2,
            ..
        }
    ));
    assert!(graph.links().is_empty());
}

#[test]
fn test_cycles_are_refused() {
    let mut graph = Graph::new(pure_registry());
    let a = graph.add_node(PropertyNode::TYPE_NAME).unwrap();
    let b = graph.add_node(PropertyNode::TYPE_NAME).unwrap();
    let c = graph.add_node(PropertyNode::TYPE_NAME).unwrap();
    graph.connect(a, 0, b, 0).unwrap();
    graph.connect(b, 0, c, 0).unwrap();

    let err = graph.connect(c, 0, a, 0).unwrap_err();
    assert!(matches!(
        err,
        GraphError::Cycle {
            source_node,
            target_node
        } if source_node == c && target_node == a
    ));

    assert!(matches!(
        graph.connect(a, 0, a, 0),
        Err(GraphError::Cycle { .. })
    ));
    assert_eq!(graph.links().len(), 2);
}

#[test]
fn test_unconnected_inputs_are_absent() {
    let mut graph = Graph::new(pure_registry());
    let property = graph.add_node(PropertyNode::TYPE_NAME).unwrap();
    let merge = graph.add_node(MergeNode::TYPE_NAME).unwrap();

    graph.tick();
    assert_eq!(graph.output(property, 0), Some(&PortValue::Absent));
    assert_eq!(graph.output(merge, 0), Some(&PortValue::from(json!({}))));
}

#[test]
fn test_upstream_evaluates_first_within_a_tick() {
    let mut graph = Graph::new(pure_registry());
    // Downstream node gets the lower id.
    let property = graph.add_node(PropertyNode::TYPE_NAME).unwrap();
    let source = graph.add_node(JsonConstantNode::TYPE_NAME).unwrap();
    graph
        .set_property(source, "value", json!(r#"{"user": {"name": "Ada"}}"#))
        .unwrap();
    graph.set_property(property, "path", json!("user.name")).unwrap();
    graph.connect(source, 0, property, 0).unwrap();

    assert_eq!(graph.evaluation_order(), vec![source, property]);

    graph.tick();
    assert_eq!(graph.output(property, 0), Some(&PortValue::from("Ada")));
    assert_eq!(graph.tick_count(), 1);
}

#[test]
fn test_evaluation_order_breaks_ties_by_id() {
    let mut graph = Graph::new(pure_registry());
    let a = graph.add_node(JsonConstantNode::TYPE_NAME).unwrap();
    let b = graph.add_node(JsonConstantNode::TYPE_NAME).unwrap();
    let merge = graph.add_node(MergeNode::TYPE_NAME).unwrap();
    let watch = graph.add_node(WatchNode::TYPE_NAME).unwrap();
    graph.connect(merge, 0, watch, 0).unwrap();
    graph.connect(b, 0, merge, 0).unwrap();
    graph.connect(a, 0, merge, 1).unwrap();

    assert_eq!(graph.evaluation_order(), vec![a, b, merge, watch]);
}

#[test]
fn test_connect_replaces_existing_input_link() {
    let mut graph = Graph::new(pure_registry());
    let first = graph.add_node(JsonConstantNode::TYPE_NAME).unwrap();
    let second = graph.add_node(JsonConstantNode::TYPE_NAME).unwrap();
    let watch = graph.add_node(WatchNode::TYPE_NAME).unwrap();
    graph.set_property(second, "value", json!("[1]")).unwrap();

    graph.connect(first, 0, watch, 0).unwrap();
    graph.connect(second, 0, watch, 0).unwrap();
    assert_eq!(
        graph.links(),
        vec![Link {
            source: second,
            source_slot: 0,
            target: watch,
            target_slot: 0,
        }]
    );

    graph.tick();
    assert_eq!(
        graph.display(watch),
        Some(vec!["[".to_string(), "  1".to_string(), "]".to_string()])
    );
}

#[test]
fn test_disconnect_leaves_input_absent() {
    let (mut graph, source, watch) = fed_by_constant(WatchNode::TYPE_NAME, json!(true));
    graph.tick();
    assert_eq!(graph.display(watch), Some(vec!["true".to_string()]));

    let removed = graph.disconnect(watch, 0).unwrap();
    assert_eq!(removed.source, source);
    assert!(graph.disconnect(watch, 0).is_none());

    graph.tick();
    assert_eq!(graph.display(watch), Some(vec!["(no data)".to_string()]));
}

#[test]
fn test_remove_node_detaches_links() {
    let (mut graph, source, watch) = fed_by_constant(WatchNode::TYPE_NAME, json!(1));
    graph.remove_node(source).unwrap();

    assert!(graph.links().is_empty());
    assert!(graph.node(source).is_none());
    assert_eq!(graph.len(), 1);
    assert!(matches!(graph.remove_node(source), Err(GraphError::NodeNotFound(_))));

    graph.tick();
    assert_eq!(graph.display(watch), Some(vec!["(no data)".to_string()]));
}

#[test]
fn test_instances_start_with_default_properties() {
    let mut graph = Graph::new(pure_registry());
    let template = graph.add_node(TemplateNode::TYPE_NAME).unwrap();
    let node = graph.node(template).unwrap();
    assert_eq!(node.type_name(), TemplateNode::TYPE_NAME);
    assert_eq!(node.properties().get_str("key1"), "id");
    assert_eq!(node.input_count(), 2);
    assert_eq!(node.outputs(), &[PortValue::Absent]);
}

#[test]
fn test_from_flow_resolves_labels() {
    let flow = FlowDefinition {
        nodes: vec![
            FlowNodeDefinition::new("data", JsonConstantNode::TYPE_NAME)
                .with_property("value", json!(r#"{"a": {"b": 5}}"#)),
            FlowNodeDefinition::new("pick", PropertyNode::TYPE_NAME)
                .with_property("path", json!("a.b")),
        ],
        links: vec![FlowLinkDefinition::new("data", 0, "pick", 0)],
    };
    let mut graph = Graph::from_flow(pure_registry(), &flow).unwrap();

    let pick = graph.node_by_label("pick").unwrap();
    let data = graph.node_by_label("data").unwrap();
    assert_eq!(graph.labels(), vec![("data", data), ("pick", pick)]);
    assert!(graph.node_by_label("missing").is_none());

    graph.tick();
    assert_eq!(graph.output(pick, 0), Some(&PortValue::from(json!(5))));
}

#[test]
fn test_from_flow_rejects_bad_definitions() {
    let duplicate = FlowDefinition {
        nodes: vec![
            FlowNodeDefinition::new("a", WatchNode::TYPE_NAME),
            FlowNodeDefinition::new("a", WatchNode::TYPE_NAME),
        ],
        links: vec![],
    };
    assert!(matches!(
        Graph::from_flow(pure_registry(), &duplicate),
        Err(GraphError::DuplicateFlowNode(ref label)) if label == "a"
    ));

    let dangling = FlowDefinition {
        nodes: vec![FlowNodeDefinition::new("watch", WatchNode::TYPE_NAME)],
        links: vec![FlowLinkDefinition::new("ghost", 0, "watch", 0)],
    };
    assert!(matches!(
        Graph::from_flow(pure_registry(), &dangling),
        Err(GraphError::UnknownFlowNode(ref label)) if label == "ghost"
    ));

    let bad_property = FlowDefinition {
        nodes: vec![
            FlowNodeDefinition::new("watch", WatchNode::TYPE_NAME)
                .with_property("depth", json!(3)),
        ],
        links: vec![],
    };
    assert!(matches!(
        Graph::from_flow(pure_registry(), &bad_property),
        Err(GraphError::UnknownProperty { .. })
    ));
}

#[test]
fn test_registry_rejects_duplicates() {
    let mut registry = NodeRegistry::new();
    registry.register(std::sync::Arc::new(WatchNode::new())).unwrap();
    let err = registry
        .register(std::sync::Arc::new(WatchNode::new()))
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateNodeType(ref name) if name == "json/watch"));
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("json/watch"));
}
