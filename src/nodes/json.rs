//! Pure, synchronous nodes that reshape JSON values.

use crate::node::{EvalContext, NodeSchema, NodeType, PortType};
use crate::value::{PortValue, parse_leading_float, to_number};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;

/// Walks `path` (dot-separated keys or array indices) into `input`.
///
/// Absent or null input yields absent, and an empty path returns the input
/// as-is. Stepping into a null, a primitive or a missing key yields absent.
pub fn extract_path(input: &PortValue, path: &str) -> PortValue {
    let Some(root) = input.as_json().filter(|v| !v.is_null()) else {
        return PortValue::Absent;
    };
    if path.is_empty() {
        return input.clone();
    }

    let mut current = root;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => array_index(segment).and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return PortValue::Absent,
        }
    }
    PortValue::Json(current.clone())
}

/// Canonical decimal array index: digits only, no sign, no leading zero.
fn array_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    canonical.then(|| segment.parse().ok()).flatten()
}

pub struct PropertyNode {
    schema: NodeSchema,
}

impl PropertyNode {
    pub const TYPE_NAME: &'static str = "json/property";

    pub fn new() -> Self {
        Self {
            schema: NodeSchema::new(
                Self::TYPE_NAME,
                "JSON Property",
                "Extract a value by dot-path (e.g. data.items)",
            )
            .with_input("JSON", PortType::Json)
            .with_output("Value", PortType::Json)
            .with_text_property("path", ""),
        }
    }
}

impl Default for PropertyNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeType for PropertyNode {
    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>) {
        let value = extract_path(ctx.input(0), ctx.property_str("path"));
        ctx.set_output(0, value);
    }
}

/// Comparison applied by the filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    /// Anything unrecognized: every element passes.
    PassThrough,
}

impl FilterOperator {
    pub const CHOICES: [&'static str; 7] = ["==", "!=", ">", "<", ">=", "<=", "contains"];

    pub fn parse(op: &str) -> Self {
        match op {
            "==" => FilterOperator::Equal,
            "!=" => FilterOperator::NotEqual,
            ">" => FilterOperator::Greater,
            "<" => FilterOperator::Less,
            ">=" => FilterOperator::GreaterOrEqual,
            "<=" => FilterOperator::LessOrEqual,
            "contains" => FilterOperator::Contains,
            _ => FilterOperator::PassThrough,
        }
    }

    fn accepts(&self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (_, None) => false,
            (FilterOperator::Greater, Some(o)) => o == Ordering::Greater,
            (FilterOperator::Less, Some(o)) => o == Ordering::Less,
            (FilterOperator::GreaterOrEqual, Some(o)) => o != Ordering::Less,
            (FilterOperator::LessOrEqual, Some(o)) => o != Ordering::Greater,
            _ => false,
        }
    }
}

/// A compiled filter condition over the elements of an array.
///
/// Whether ordering comparisons are numeric is decided once, from the
/// comparison value, and applied to every element alike.
#[derive(Debug, Clone)]
pub struct FilterCondition {
    key: String,
    operator: FilterOperator,
    value: String,
    numeric: Option<f64>,
}

impl FilterCondition {
    pub fn new(key: &str, operator: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            operator: FilterOperator::parse(operator),
            value: value.to_string(),
            numeric: parse_leading_float(value),
        }
    }

    fn field(&self, item: &Value) -> PortValue {
        if self.key.is_empty() {
            return PortValue::Json(item.clone());
        }
        match item {
            Value::Object(map) => map.get(&self.key).cloned().into(),
            Value::Array(items) => array_index(&self.key)
                .and_then(|i| items.get(i))
                .cloned()
                .into(),
            _ => PortValue::Absent,
        }
    }

    pub fn matches(&self, item: &Value) -> bool {
        let field = self.field(item);
        match self.operator {
            FilterOperator::Equal => field.to_string() == self.value,
            FilterOperator::NotEqual => field.to_string() != self.value,
            FilterOperator::Contains => field
                .to_string()
                .to_lowercase()
                .contains(&self.value.to_lowercase()),
            FilterOperator::PassThrough => true,
            op => {
                let ordering = match self.numeric {
                    Some(cmp) => to_number(&field).partial_cmp(&cmp),
                    None if field.is_nullish() => None,
                    None => Some(field.to_string().as_str().cmp(self.value.as_str())),
                };
                op.accepts(ordering)
            }
        }
    }

    /// Keeps the matching elements in their original order. Non-arrays yield nothing.
    pub fn apply(&self, input: &PortValue) -> Vec<Value> {
        match input.as_json() {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|item| self.matches(item))
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }
}

pub struct FilterNode {
    schema: NodeSchema,
}

impl FilterNode {
    pub const TYPE_NAME: &'static str = "json/filter";

    pub fn new() -> Self {
        Self {
            schema: NodeSchema::new(Self::TYPE_NAME, "JSON Filter", "Filter a JSON array by condition")
                .with_input("Array", PortType::Json)
                .with_output("Filtered", PortType::Json)
                .with_output("Count", PortType::Number)
                .with_text_property("key", "")
                .with_combo_property("operator", "==", &FilterOperator::CHOICES)
                .with_text_property("value", ""),
        }
    }
}

impl Default for FilterNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeType for FilterNode {
    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>) {
        let condition = FilterCondition::new(
            ctx.property_str("key"),
            ctx.property_str("operator"),
            ctx.property_str("value"),
        );
        let filtered = condition.apply(ctx.input(0));
        let count = filtered.len();
        ctx.set_output(0, Value::Array(filtered));
        ctx.set_output(1, json!(count));
    }
}

/// Shallow merge: `b`'s top-level fields override `a`'s. Missing or
/// non-object inputs count as `{}`.
pub fn shallow_merge(a: &PortValue, b: &PortValue) -> Value {
    let mut merged = Map::new();
    for side in [a, b] {
        if let Some(Value::Object(fields)) = side.as_json() {
            merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    Value::Object(merged)
}

pub struct MergeNode {
    schema: NodeSchema,
}

impl MergeNode {
    pub const TYPE_NAME: &'static str = "json/merge";

    pub fn new() -> Self {
        Self {
            schema: NodeSchema::new(Self::TYPE_NAME, "JSON Merge", "Shallow-merge two JSON objects")
                .with_input("A", PortType::Json)
                .with_input("B", PortType::Json)
                .with_output("Merged", PortType::Json),
        }
    }
}

impl Default for MergeNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeType for MergeNode {
    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>) {
        let merged = shallow_merge(ctx.input(0), ctx.input(1));
        ctx.set_output(0, merged);
    }
}

pub struct TemplateNode {
    schema: NodeSchema,
}

impl TemplateNode {
    pub const TYPE_NAME: &'static str = "json/template";

    pub fn new() -> Self {
        Self {
            schema: NodeSchema::new(Self::TYPE_NAME, "JSON Template", "Build a JSON object from inputs")
                .with_input("key1", PortType::Json)
                .with_input("key2", PortType::Json)
                .with_output("Object", PortType::Json)
                .with_text_property("key1", "id")
                .with_text_property("key2", "name"),
        }
    }
}

impl Default for TemplateNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeType for TemplateNode {
    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>) {
        let mut object = Map::new();
        for (slot, key) in [(0, "key1"), (1, "key2")] {
            // Absent inputs leave the field out; a null input is still written.
            if let Some(value) = ctx.input(slot).as_json() {
                object.insert(ctx.property_str(key).to_string(), value.clone());
            }
        }
        ctx.set_output(0, Value::Object(object));
    }
}
