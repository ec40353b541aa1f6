use ahash::AHashMap;
use serde_json::Value;
use std::fmt;

/// Loose type tag on a port. Only used as an editor hint, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortType {
    String,
    Number,
    Json,
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortType::String => write!(f, "string"),
            PortType::Number => write!(f, "number"),
            PortType::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub name: String,
    pub port_type: PortType,
}

/// The editor control a property is edited with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyControl {
    Text,
    Combo(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    pub default: Value,
    pub control: PropertyControl,
}

/// Static description of a node type: identifier, ports and properties.
///
/// The port lists fix the arity of every instance created from the type.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSchema {
    pub type_name: String,
    pub title: String,
    pub description: String,
    pub inputs: Vec<PortSpec>,
    pub outputs: Vec<PortSpec>,
    pub properties: Vec<PropertySpec>,
}

impl NodeSchema {
    pub fn new(type_name: &str, title: &str, description: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_input(mut self, name: &str, port_type: PortType) -> Self {
        self.inputs.push(PortSpec {
            name: name.to_string(),
            port_type,
        });
        self
    }

    pub fn with_output(mut self, name: &str, port_type: PortType) -> Self {
        self.outputs.push(PortSpec {
            name: name.to_string(),
            port_type,
        });
        self
    }

    pub fn with_text_property(mut self, name: &str, default: &str) -> Self {
        self.properties.push(PropertySpec {
            name: name.to_string(),
            default: Value::String(default.to_string()),
            control: PropertyControl::Text,
        });
        self
    }

    pub fn with_combo_property(mut self, name: &str, default: &str, choices: &[&str]) -> Self {
        self.properties.push(PropertySpec {
            name: name.to_string(),
            default: Value::String(default.to_string()),
            control: PropertyControl::Combo(choices.iter().map(|c| c.to_string()).collect()),
        });
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Fresh property values for a new instance, taken from the declared defaults.
    pub fn default_properties(&self) -> Properties {
        Properties(
            self.properties
                .iter()
                .map(|p| (p.name.clone(), p.default.clone()))
                .collect(),
        )
    }
}

/// The user-edited property values of one node instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(AHashMap<String, Value>);

impl Properties {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The property as text; missing and non-string properties read as `""`.
    pub fn get_str(&self, name: &str) -> &str {
        self.0.get(name).and_then(Value::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: Value) -> Option<Value> {
        self.0.insert(name.to_string(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
