//! Normalized view of a dereferenced OpenAPI document.
//!
//! Only the parts the prober needs are modelled: servers, GET operations,
//! their parameters and the content types of their responses. Everything
//! else in the document is ignored on deserialization.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Root of a dereferenced API description
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSchema {
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
}

impl ApiSchema {
    /// URL of the first declared server, if any
    pub fn first_server_url(&self) -> Option<&str> {
        self.servers
            .first()
            .map(|s| s.url.as_str())
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
}

/// Operations available on one path template
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,
    /// Parameters shared by every operation on the path
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Parameters of the GET operation merged with path-level ones.
    ///
    /// An operation parameter replaces a path-level parameter with the same
    /// name and location.
    pub fn get_parameters(&self) -> Vec<&Parameter> {
        let Some(get) = &self.get else {
            return Vec::new();
        };

        let mut merged: Vec<&Parameter> = self
            .parameters
            .iter()
            .filter(|shared| {
                !get.parameters
                    .iter()
                    .any(|p| p.name == shared.name && p.location == shared.location)
            })
            .collect();
        merged.extend(get.parameters.iter());
        merged
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

impl Operation {
    /// Whether the `200` response declares any of the given content types
    pub fn ok_response_has_content_type(&self, content_types: &[&str]) -> bool {
        self.responses
            .get("200")
            .map(|r| content_types.iter().any(|ct| r.content.contains_key(*ct)))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub content: BTreeMap<String, Value>,
}

/// Where a parameter is carried in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub example: Option<Value>,
    #[serde(default)]
    pub examples: Option<Value>,
    #[serde(default)]
    pub schema: Option<ParameterSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterSchema {
    #[serde(default)]
    pub example: Option<Value>,
    #[serde(default)]
    pub examples: Option<Value>,
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
}

impl Parameter {
    /// Example value declared in the document, in priority order:
    /// parameter `example`, parameter `examples`, schema `example`,
    /// schema `examples`, then the first schema `enum` entry.
    pub fn declared_example(&self) -> Option<String> {
        let schema = self.schema.as_ref();
        let candidates = [
            self.example.as_ref(),
            self.examples.as_ref().and_then(first_example),
            schema.and_then(|s| s.example.as_ref()),
            schema.and_then(|s| s.examples.as_ref()).and_then(first_example),
            schema
                .and_then(|s| s.enum_values.as_ref())
                .and_then(|values| values.first()),
        ];

        candidates.into_iter().flatten().find_map(example_to_string)
    }
}

/// First entry of an `examples` field.
///
/// JSON Schema uses an array; OpenAPI parameters use a map of named Example
/// objects whose payload sits under `value`.
fn first_example(examples: &Value) -> Option<&Value> {
    match examples {
        Value::Array(items) => items.first(),
        Value::Object(named) => named
            .values()
            .next()
            .map(|example| example.get("value").unwrap_or(example)),
        _ => None,
    }
}

/// Render an example as it would appear in a URL
pub fn example_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(example_to_string).collect();
            (!parts.is_empty()).then(|| parts.join(","))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
