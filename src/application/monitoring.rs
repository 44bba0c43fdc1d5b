use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{EndpointReport, Observation};
use crate::ports::{ObservationStore, SchemaError, SchemaSource, StoreError};

use super::aggregator::aggregate;
use super::detector::{AlertDispatcher, AlertRecord};
use super::prober::Prober;
use super::reducer::reduce;
use super::resolver::{ResolveError, TargetResolver};

/// Errors that abort a whole run before or after probing
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to load API description from {source_name}")]
    Schema {
        source_name: String,
        #[source]
        source: SchemaError,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to persist observations")]
    Store(#[from] StoreError),
}

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub observations: Vec<(String, Observation)>,
    pub alerts: Vec<AlertRecord>,
    pub reports: Vec<EndpointReport>,
}

/// Runs one measurement pass: resolve, probe, persist, alert, report
pub struct MonitoringService {
    schema_source: Arc<dyn SchemaSource>,
    resolver: TargetResolver,
    prober: Prober,
    dispatcher: AlertDispatcher,
    base_url: Option<String>,
    samples: usize,
}

impl MonitoringService {
    pub fn new(
        schema_source: Arc<dyn SchemaSource>,
        resolver: TargetResolver,
        prober: Prober,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self {
            schema_source,
            resolver,
            prober,
            dispatcher,
            base_url: None,
            samples: 5,
        }
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub async fn run_once<S>(&self, store: &mut S) -> Result<RunSummary, RunError>
    where
        S: ObservationStore + ?Sized,
    {
        let schema = self
            .schema_source
            .load()
            .await
            .map_err(|source| RunError::Schema {
                source_name: self.schema_source.describe(),
                source,
            })?;

        let targets = self.resolver.resolve(&schema, self.base_url.as_deref())?;
        info!(endpoints = targets.len(), samples = self.samples, "probing endpoints");

        // Probing is concurrent; the store is only touched afterwards, from here
        let measured = join_all(targets.iter().map(|(endpoint, url)| async move {
            let samples = self.prober.sample(endpoint, url, self.samples).await;
            (endpoint.clone(), reduce(&samples))
        }))
        .await;

        let mut observations = Vec::with_capacity(measured.len());
        for (endpoint, observation) in measured {
            let Some(observation) = observation else {
                continue;
            };
            debug!(%endpoint, status = %observation.status, duration_ms = observation.duration_ms, "measured");
            store.add(&endpoint, observation.clone()).await;
            observations.push((endpoint, observation));
        }

        store.flush().await?;

        let endpoints: Vec<String> = targets.keys().cloned().collect();
        let alerts = self.dispatcher.dispatch(store, &endpoints).await;

        let now = Utc::now();
        let mut reports = Vec::with_capacity(endpoints.len());
        for endpoint in &endpoints {
            let history = store.get_history(endpoint).await;
            reports.push(aggregate(endpoint, &history, now));
        }

        info!(
            observations = observations.len(),
            alerts = alerts.len(),
            "run complete"
        );

        Ok(RunSummary {
            observations,
            alerts,
            reports,
        })
    }
}
