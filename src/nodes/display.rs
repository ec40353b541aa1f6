use crate::node::{EvalContext, NodeSchema, NodeState, NodeType, PortType};
use crate::value::PortValue;
use serde_json::{Value, json};

/// Lines the Watch node draws before collapsing the rest into an indicator.
pub const WATCH_MAX_LINES: usize = 20;

const NO_DATA: &str = "(no data)";

/// Renders a port value the way the Watch node shows it: two-space-indented
/// JSON, `(no data)` for absent, plain string conversion if serialization fails.
pub fn render_watch_text(value: &PortValue) -> String {
    match value.as_json() {
        None => NO_DATA.to_string(),
        Some(json) => serde_json::to_string_pretty(json).unwrap_or_else(|_| value.to_string()),
    }
}

/// Splits `text` into at most `max_lines` lines plus a `... (+N more lines)` marker.
pub fn truncate_lines(text: &str, max_lines: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut shown: Vec<String> = lines.iter().take(max_lines).map(|l| l.to_string()).collect();
    if lines.len() > max_lines {
        shown.push(format!("... (+{} more lines)", lines.len() - max_lines));
    }
    shown
}

#[derive(Debug, Default)]
pub struct WatchState {
    pub text: String,
}

pub struct WatchNode {
    schema: NodeSchema,
}

impl WatchNode {
    pub const TYPE_NAME: &'static str = "json/watch";

    pub fn new() -> Self {
        Self {
            schema: NodeSchema::new(Self::TYPE_NAME, "JSON Watch", "Display JSON data")
                .with_input("JSON", PortType::Json),
        }
    }
}

impl Default for WatchNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeType for WatchNode {
    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>) {
        let text = render_watch_text(ctx.input(0));
        ctx.state::<WatchState>().text = text;
    }

    fn display(&self, state: &NodeState) -> Option<Vec<String>> {
        state
            .get::<WatchState>()
            .filter(|s| !s.text.is_empty())
            .map(|s| truncate_lines(&s.text, WATCH_MAX_LINES))
    }
}

pub struct StringConstantNode {
    schema: NodeSchema,
}

impl StringConstantNode {
    pub const TYPE_NAME: &'static str = "basic/string";
    pub const DEFAULT_VALUE: &'static str = "https://jsonplaceholder.typicode.com/users";

    pub fn new() -> Self {
        Self {
            schema: NodeSchema::new(Self::TYPE_NAME, "String", "Output a constant string value")
                .with_output("String", PortType::String)
                .with_text_property("value", Self::DEFAULT_VALUE),
        }
    }
}

impl Default for StringConstantNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeType for StringConstantNode {
    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>) {
        let value = ctx.property("value").cloned().unwrap_or(Value::Null);
        ctx.set_output(0, value);
    }
}

/// Parses JSON text, substituting `{"_parseError": ...}` for invalid input.
pub fn parse_json_constant(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|e| json!({ "_parseError": e.to_string() }))
}

pub struct JsonConstantNode {
    schema: NodeSchema,
}

impl JsonConstantNode {
    pub const TYPE_NAME: &'static str = "json/constant";
    pub const DEFAULT_VALUE: &'static str = r#"{"completed": false}"#;

    pub fn new() -> Self {
        Self {
            schema: NodeSchema::new(Self::TYPE_NAME, "JSON Value", "Output a constant JSON object")
                .with_output("JSON", PortType::Json)
                .with_text_property("value", Self::DEFAULT_VALUE),
        }
    }
}

impl Default for JsonConstantNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeType for JsonConstantNode {
    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>) {
        let parsed = match ctx.property("value") {
            Some(Value::String(text)) => parse_json_constant(text),
            Some(literal) => literal.clone(),
            None => Value::Null,
        };
        ctx.set_output(0, parsed);
    }
}
