use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{ApiSchema, Parameter, ParameterLocation};
use crate::ports::{Diagnostic, Diagnostics, ExampleProvider};

/// `200` content types that stream and cannot be timed with one round trip
pub const STREAMING_CONTENT_TYPES: [&str; 3] =
    ["text/event-stream", "application/x-ndjson", "application/stream+json"];

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no base URL: the API description declares no servers and none was configured")]
    NoBaseUrl,

    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// What to do with an endpoint whose required parameter has no value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingParameterPolicy {
    /// Probe anyway with the placeholder left in the URL
    #[default]
    BestEffort,
    /// Leave the endpoint out of this run
    Exclude,
}

/// Turns the GET operations of an API description into probe URLs
pub struct TargetResolver {
    examples: Arc<dyn ExampleProvider>,
    missing: MissingParameterPolicy,
    diagnostics: Arc<dyn Diagnostics>,
}

impl TargetResolver {
    pub fn new(
        examples: Arc<dyn ExampleProvider>,
        missing: MissingParameterPolicy,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            examples,
            missing,
            diagnostics,
        }
    }

    /// Map each probeable endpoint path to its concrete URL.
    ///
    /// `base_url` overrides the first server declared in the schema.
    pub fn resolve(
        &self,
        schema: &ApiSchema,
        base_url: Option<&str>,
    ) -> Result<BTreeMap<String, String>, ResolveError> {
        let base = base_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| schema.first_server_url())
            .ok_or(ResolveError::NoBaseUrl)?;
        let base = Url::parse(base).map_err(|e| ResolveError::InvalidBaseUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;

        let mut targets = BTreeMap::new();
        for (path, item) in &schema.paths {
            let Some(get) = &item.get else {
                continue;
            };

            if get.ok_response_has_content_type(&STREAMING_CONTENT_TYPES) {
                self.diagnostics.emit(Diagnostic::EndpointExcluded {
                    endpoint: path.clone(),
                    reason: "streaming response".to_string(),
                });
                continue;
            }

            if let Some(url) = self.resolve_endpoint(&base, path, item.get_parameters()) {
                debug!(endpoint = %path, %url, "resolved probe target");
                targets.insert(path.clone(), url);
            }
        }

        Ok(targets)
    }

    fn resolve_endpoint(
        &self,
        base: &Url,
        path: &str,
        parameters: Vec<&Parameter>,
    ) -> Option<String> {
        let mut resolved_path = path.to_string();
        let mut query = Vec::new();

        for param in parameters {
            if !matches!(param.location, ParameterLocation::Path | ParameterLocation::Query) {
                continue;
            }

            let value = self
                .examples
                .example_value(&param.name, path)
                .or_else(|| param.declared_example());

            let Some(value) = value else {
                if param.required {
                    self.diagnostics.emit(Diagnostic::MissingExample {
                        endpoint: path.to_string(),
                        parameter: param.name.clone(),
                    });
                    if self.missing == MissingParameterPolicy::Exclude {
                        self.diagnostics.emit(Diagnostic::EndpointExcluded {
                            endpoint: path.to_string(),
                            reason: format!("required parameter {} has no value", param.name),
                        });
                        return None;
                    }
                }
                continue;
            };

            match param.location {
                ParameterLocation::Path => {
                    let placeholder = format!("{{{}}}", param.name);
                    resolved_path = resolved_path.replace(&placeholder, &urlencoding::encode(&value));
                }
                _ => query.push((param.name.clone(), value)),
            }
        }

        let mut url = base.clone();
        let joined = format!("{}{}", base.path().trim_end_matches('/'), resolved_path);
        url.set_path(&joined);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &query {
                pairs.append_pair(name, value);
            }
        }

        Some(url.to_string())
    }
}
