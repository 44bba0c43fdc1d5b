//! Inlining of `$ref` pointers across a bundle of documents.
//!
//! A reference is `<document>#<pointer>`. An empty document part points into
//! the document holding the reference; any other is resolved against that
//! document's location and must already be loaded into the [`Bundle`]. A
//! reference that points back into one of its own ancestors is left in place
//! as a `$ref` object, since a recursive schema cannot be expanded into a tree.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde_json::{Map, Value};
use tracing::debug;

use crate::ports::SchemaError;

/// Parsed documents keyed by resolved location, plus the entry document
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    root: String,
    documents: HashMap<String, Value>,
}

impl Bundle {
    pub fn new(root: impl Into<String>, document: Value) -> Self {
        let root = root.into();
        let mut documents = HashMap::new();
        documents.insert(root.clone(), document);
        Self { root, documents }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn contains(&self, location: &str) -> bool {
        self.documents.contains_key(location)
    }

    pub fn insert(&mut self, location: impl Into<String>, document: Value) {
        self.documents.insert(location.into(), document);
    }

    pub fn document(&self, location: &str) -> Option<&Value> {
        self.documents.get(location)
    }
}

pub(crate) fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Location of `target` relative to the document at `base`.
///
/// URLs are joined with URL semantics; file paths are joined onto the
/// directory of `base` with `.` components removed.
pub fn resolve_location(base: &str, target: &str) -> Result<String, String> {
    if target.is_empty() {
        return Ok(base.to_string());
    }
    if is_remote(target) {
        return Url::parse(target).map(|url| url.to_string()).map_err(|e| e.to_string());
    }
    if is_remote(base) {
        return Url::parse(base)
            .and_then(|base| base.join(target))
            .map(|url| url.to_string())
            .map_err(|e| e.to_string());
    }

    let base = base.strip_prefix("file://").unwrap_or(base);
    let target = target.strip_prefix("file://").unwrap_or(target);
    let joined = Path::new(base).parent().unwrap_or(Path::new("")).join(target);
    Ok(joined.components().collect::<PathBuf>().display().to_string())
}

fn split_reference(reference: &str) -> (&str, &str) {
    reference.split_once('#').unwrap_or((reference, ""))
}

/// Locations of the other documents that `document` (found at `location`)
/// references
pub fn external_locations(document: &Value, location: &str) -> Result<BTreeSet<String>, SchemaError> {
    let mut found = BTreeSet::new();
    collect_external(document, location, &mut found)?;
    Ok(found)
}

fn collect_external(node: &Value, location: &str, found: &mut BTreeSet<String>) -> Result<(), SchemaError> {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                let (document, _) = split_reference(reference);
                if !document.is_empty() {
                    let target = resolve_location(location, document).map_err(|reason| SchemaError::Reference {
                        reference: reference.clone(),
                        reason,
                    })?;
                    found.insert(target);
                }
            }
            map.values().try_for_each(|value| collect_external(value, location, found))
        }
        Value::Array(items) => items.iter().try_for_each(|item| collect_external(item, location, found)),
        _ => Ok(()),
    }
}

/// Dereference a self-contained document
pub fn dereference(root: &Value) -> Result<Value, SchemaError> {
    dereference_bundle(&Bundle::new("", root.clone()))
}

/// Dereference the bundle's entry document, following references into the
/// other documents of the bundle
pub fn dereference_bundle(bundle: &Bundle) -> Result<Value, SchemaError> {
    let root = bundle.document(bundle.root()).ok_or_else(|| SchemaError::Reference {
        reference: bundle.root().to_string(),
        reason: "entry document is not loaded".to_string(),
    })?;
    let mut resolver = Resolver {
        bundle,
        active: Vec::new(),
    };
    resolver.resolve(root, bundle.root())
}

struct Resolver<'a> {
    bundle: &'a Bundle,
    /// `location#pointer` of every reference being expanded
    active: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn resolve(&mut self, node: &Value, location: &str) -> Result<Value, SchemaError> {
        match node {
            Value::Object(map) => match map.get("$ref") {
                Some(Value::String(reference)) => self.resolve_reference(reference, map, location),
                _ => map
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), self.resolve(value, location)?)))
                    .collect::<Result<Map<_, _>, _>>()
                    .map(Value::Object),
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item, location))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_reference(
        &mut self,
        reference: &str,
        node: &Map<String, Value>,
        location: &str,
    ) -> Result<Value, SchemaError> {
        let reference_err = |reason: String| SchemaError::Reference {
            reference: reference.to_string(),
            reason,
        };

        let (document, fragment) = split_reference(reference);
        let target_location = resolve_location(location, document).map_err(reference_err)?;
        let pointer = urlencoding::decode(fragment)
            .map_err(|_| reference_err("fragment is not valid UTF-8".to_string()))?;

        let key = format!("{target_location}#{pointer}");
        if self.active.contains(&key) {
            debug!(%reference, "leaving recursive reference in place");
            return Ok(Value::Object(node.clone()));
        }

        let bundle = self.bundle;
        let target = bundle
            .document(&target_location)
            .ok_or_else(|| reference_err(format!("document {target_location} is not loaded")))?
            .pointer(&pointer)
            .ok_or_else(|| reference_err("target does not exist".to_string()))?;

        self.active.push(key);
        let resolved = self.resolve(target, &target_location);
        self.active.pop();
        let resolved = resolved?;

        // Sibling keys (summary, description, ...) override the referenced object
        match resolved {
            Value::Object(mut merged) if node.len() > 1 => {
                for (key, value) in node.iter().filter(|(key, _)| key.as_str() != "$ref") {
                    merged.insert(key.clone(), self.resolve(value, location)?);
                }
                Ok(Value::Object(merged))
            }
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inlines_component_parameters() {
        let doc = json!({
            "paths": { "/users/{id}": { "get": { "parameters": [{ "$ref": "#/components/parameters/Id" }] } } },
            "components": { "parameters": { "Id": { "name": "id", "in": "path", "example": 3 } } }
        });

        let resolved = dereference(&doc).unwrap();
        assert_eq!(
            resolved.pointer("/paths/~1users~1{id}/get/parameters/0/name"),
            Some(&json!("id"))
        );
    }

    #[test]
    fn follows_chained_references() {
        let doc = json!({
            "a": { "$ref": "#/b" },
            "b": { "$ref": "#/c" },
            "c": { "value": 1 }
        });
        assert_eq!(dereference(&doc).unwrap()["a"], json!({ "value": 1 }));
    }

    #[test]
    fn decodes_escaped_pointers() {
        let doc = json!({
            "x": { "$ref": "#/paths/~1a%7Bb%7D" },
            "paths": { "/a{b}": { "ok": true } }
        });
        assert_eq!(dereference(&doc).unwrap()["x"], json!({ "ok": true }));
    }

    #[test]
    fn siblings_override_target() {
        let doc = json!({
            "x": { "$ref": "#/y", "description": "local" },
            "y": { "description": "shared", "type": "string" }
        });
        assert_eq!(
            dereference(&doc).unwrap()["x"],
            json!({ "description": "local", "type": "string" })
        );
    }

    #[test]
    fn recursive_schema_is_left_in_place() {
        let doc = json!({
            "Node": { "properties": { "child": { "$ref": "#/Node" } } },
            "use": { "$ref": "#/Node" }
        });
        let resolved = dereference(&doc).unwrap();
        assert_eq!(
            resolved.pointer("/use/properties/child"),
            Some(&json!({ "$ref": "#/Node" }))
        );
    }

    #[test]
    fn dangling_and_unloaded_refs_fail() {
        assert!(matches!(
            dereference(&json!({ "x": { "$ref": "#/missing" } })),
            Err(SchemaError::Reference { .. })
        ));
        assert!(matches!(
            dereference(&json!({ "x": { "$ref": "other.yaml#/a" } })),
            Err(SchemaError::Reference { reason, .. }) if reason.contains("not loaded")
        ));
    }

    #[test]
    fn follows_references_into_other_documents() {
        let mut bundle = Bundle::new(
            "specs/openapi.yaml",
            json!({ "paths": { "/a": { "get": { "parameters": [{ "$ref": "./params.yaml#/Id" }] } } } }),
        );
        bundle.insert(
            "specs/params.yaml",
            json!({
                "Id": { "name": "id", "in": "path", "schema": { "$ref": "#/IdSchema" } },
                "IdSchema": { "example": 7 }
            }),
        );

        let resolved = dereference_bundle(&bundle).unwrap();
        assert_eq!(
            resolved.pointer("/paths/~1a/get/parameters/0"),
            Some(&json!({ "name": "id", "in": "path", "schema": { "example": 7 } }))
        );
    }

    #[test]
    fn locations_resolve_against_the_referencing_document() {
        assert_eq!(resolve_location("specs/openapi.yaml", "./params.yaml").unwrap(), "specs/params.yaml");
        assert_eq!(resolve_location("openapi.yaml", "shared/p.yaml").unwrap(), "shared/p.yaml");
        assert_eq!(resolve_location("/srv/api/openapi.json", "/etc/p.json").unwrap(), "/etc/p.json");
        assert_eq!(
            resolve_location("https://h.test/v1/openapi.yaml", "./common/p.yaml").unwrap(),
            "https://h.test/v1/common/p.yaml"
        );
        assert_eq!(
            resolve_location("specs/openapi.yaml", "https://h.test/p.yaml").unwrap(),
            "https://h.test/p.yaml"
        );
        assert_eq!(resolve_location("specs/openapi.yaml", "").unwrap(), "specs/openapi.yaml");
    }

    #[test]
    fn lists_external_documents_once() {
        let doc = json!({
            "a": { "$ref": "./p.yaml#/A" },
            "b": [{ "$ref": "p.yaml#/B" }, { "$ref": "#/a" }],
            "c": { "$ref": "https://h.test/q.yaml" }
        });
        let found = external_locations(&doc, "specs/openapi.yaml").unwrap();
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec!["https://h.test/q.yaml".to_string(), "specs/p.yaml".to_string()]
        );
    }
}
