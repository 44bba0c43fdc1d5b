use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::domain::ApiSchema;
use crate::ports::{SchemaError, SchemaSource};

use super::deref::{dereference_bundle, external_locations, is_remote, resolve_location, Bundle};

/// OpenAPI document read from a local file or an `http(s)` URL, together
/// with every file or URL its `$ref`s point to
pub struct OpenApiSource {
    location: String,
    client: Client,
    timeout: Duration,
}

impl OpenApiSource {
    pub fn new(location: impl Into<String>, timeout: Duration) -> Self {
        Self {
            location: location.into(),
            client: Client::new(),
            timeout,
        }
    }

    async fn read(&self, location: &str) -> Result<String, SchemaError> {
        let fetch_err = |reason: String| SchemaError::Fetch {
            source_name: location.to_string(),
            reason,
        };

        if is_remote(location) {
            let response = self
                .client
                .get(location)
                .timeout(self.timeout)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| fetch_err(e.to_string()))?;
            response.text().await.map_err(|e| fetch_err(e.to_string()))
        } else {
            tokio::fs::read_to_string(location)
                .await
                .map_err(|e| fetch_err(e.to_string()))
        }
    }

    async fn fetch_document(&self, location: &str) -> Result<Value, SchemaError> {
        let raw = self.read(location).await?;
        debug!(source = %location, bytes = raw.len(), "fetched API description");
        parse_document(&raw, location)
    }

    /// Load the entry document and, transitively, every external document
    /// it references. Each location is fetched once.
    async fn bundle(&self) -> Result<Bundle, SchemaError> {
        let root = resolve_location("", &self.location).map_err(|reason| SchemaError::Fetch {
            source_name: self.location.clone(),
            reason,
        })?;
        let mut bundle = Bundle::new(root.clone(), self.fetch_document(&root).await?);

        let mut pending = vec![root];
        while let Some(location) = pending.pop() {
            let referenced = match bundle.document(&location) {
                Some(document) => external_locations(document, &location)?,
                None => continue,
            };

            for target in referenced {
                if bundle.contains(&target) {
                    continue;
                }
                let document = self.fetch_document(&target).await?;
                bundle.insert(target.clone(), document);
                pending.push(target);
            }
        }

        Ok(bundle)
    }
}

#[async_trait]
impl SchemaSource for OpenApiSource {
    fn describe(&self) -> String {
        self.location.clone()
    }

    async fn load(&self) -> Result<ApiSchema, SchemaError> {
        let bundle = self.bundle().await?;
        let resolved = dereference_bundle(&bundle)?;
        let schema: ApiSchema =
            serde_json::from_value(resolved).map_err(|e| SchemaError::Shape(e.to_string()))?;

        info!(source = %self.location, paths = schema.paths.len(), "loaded API description");
        Ok(schema)
    }
}

/// Parse a document as JSON, falling back to YAML
pub fn parse_document(raw: &str, source_name: &str) -> Result<Value, SchemaError> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Ok(value);
    }

    let parse_err = |reason: String| SchemaError::Parse {
        source_name: source_name.to_string(),
        reason,
    };

    let yaml: serde_yaml::Value = serde_yaml::from_str(raw).map_err(|e| parse_err(e.to_string()))?;
    yaml_to_json(yaml).map_err(parse_err)
}

/// Convert YAML to JSON, stringifying scalar mapping keys (`200:` → `"200"`)
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("unsupported number {n}"))?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported mapping key {other:?}")),
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => {
            let tagged = *tagged;
            yaml_to_json(tagged.value)?
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YAML_DOCUMENT: &str = r#"
openapi: 3.0.3
servers:
  - url: https://api.example.com/v1
paths:
  /pets/{petId}:
    get:
      parameters:
        - $ref: '#/components/parameters/PetId'
      responses:
        200:
          description: ok
components:
  parameters:
    PetId:
      name: petId
      in: path
      required: true
      schema:
        type: integer
        example: 12
"#;

    #[test]
    fn parses_json() {
        let value = parse_document(r#"{"paths": {}}"#, "inline").unwrap();
        assert_eq!(value, json!({ "paths": {} }));
    }

    #[test]
    fn parses_yaml_with_numeric_keys() {
        let value = parse_document(YAML_DOCUMENT, "inline").unwrap();
        assert!(value.pointer("/paths/~1pets~1{petId}/get/responses/200").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_document("paths: [unclosed", "inline"),
            Err(SchemaError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn loads_and_dereferences_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.yaml");
        std::fs::write(&path, YAML_DOCUMENT).unwrap();

        let source = OpenApiSource::new(path.display().to_string(), Duration::from_secs(1));
        let schema = source.load().await.unwrap();

        assert_eq!(schema.first_server_url(), Some("https://api.example.com/v1"));
        let params = schema.paths["/pets/{petId}"].get_parameters();
        assert_eq!(params[0].name, "petId");
        assert_eq!(params[0].declared_example().as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn follows_references_into_sibling_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("shared")).unwrap();
        std::fs::write(
            dir.path().join("openapi.yaml"),
            r#"
servers:
  - url: https://api.example.com
paths:
  /orders/{orderId}:
    get:
      parameters:
        - $ref: './shared/params.yaml#/OrderId'
  /orders:
    get:
      parameters:
        - $ref: 'shared/params.yaml#/Limit'
"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("shared/params.yaml"),
            r#"
OrderId:
  name: orderId
  in: path
  required: true
  schema:
    $ref: './schemas.json#/OrderId'
Limit:
  name: limit
  in: query
  example: 10
"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("shared/schemas.json"), r#"{"OrderId": {"example": "ord_1"}}"#).unwrap();

        let source = OpenApiSource::new(dir.path().join("openapi.yaml").display().to_string(), Duration::from_secs(1));
        let schema = source.load().await.unwrap();

        let order = schema.paths["/orders/{orderId}"].get_parameters();
        assert_eq!(order[0].name, "orderId");
        assert_eq!(order[0].declared_example().as_deref(), Some("ord_1"));
        let list = schema.paths["/orders"].get_parameters();
        assert_eq!(list[0].declared_example().as_deref(), Some("10"));
    }

    #[tokio::test]
    async fn missing_referenced_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.json");
        std::fs::write(&path, r#"{"paths": {"/a": {"get": {"parameters": [{"$ref": "gone.json#/P"}]}}}}"#).unwrap();

        let source = OpenApiSource::new(path.display().to_string(), Duration::from_secs(1));
        match source.load().await {
            Err(SchemaError::Fetch { source_name, .. }) => assert!(source_name.ends_with("gone.json")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let source = OpenApiSource::new("/definitely/not/here.json", Duration::from_secs(1));
        assert!(matches!(source.load().await, Err(SchemaError::Fetch { .. })));
    }
}
