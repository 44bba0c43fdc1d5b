use std::collections::HashMap;

use crate::domain::Status;
use crate::ports::{ExampleProvider, StatusPolicy};

/// Upper bound (exclusive) for a response to count as `up` by default
pub const DEFAULT_LATENCY_THRESHOLD_MS: u64 = 300;

fn is_success(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

/// Never supplies a value, so the API description decides
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExamples;

impl ExampleProvider for NoExamples {
    fn example_value(&self, _param_name: &str, _path: &str) -> Option<String> {
        None
    }
}

/// Example values from configuration; per-path values win over global ones
#[derive(Debug, Default, Clone)]
pub struct ConfiguredExamples {
    global: HashMap<String, String>,
    per_path: HashMap<String, HashMap<String, String>>,
}

impl ConfiguredExamples {
    pub fn new(global: HashMap<String, String>, per_path: HashMap<String, HashMap<String, String>>) -> Self {
        Self { global, per_path }
    }
}

impl ExampleProvider for ConfiguredExamples {
    fn example_value(&self, param_name: &str, path: &str) -> Option<String> {
        self.per_path
            .get(path)
            .and_then(|params| params.get(param_name))
            .or_else(|| self.global.get(param_name))
            .cloned()
    }
}

/// `up` for a 2xx answered in under 300 ms, `down` otherwise
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStatusPolicy;

impl StatusPolicy for DefaultStatusPolicy {
    fn classify(&self, status_code: u16, _path: &str, duration_ms: u64) -> Status {
        if is_success(status_code) && duration_ms < DEFAULT_LATENCY_THRESHOLD_MS {
            Status::Up
        } else {
            Status::Down
        }
    }
}

/// Latency and status-code driven classification.
///
/// Status codes listed in `degraded_status_codes` are `degraded`. Any other
/// non-2xx is `down`. A 2xx faster than the (per-path) latency threshold is
/// `up`; a slower one is `degraded` while under `degraded_latency_ms` and
/// `down` beyond it or when that limit is unset.
#[derive(Debug, Clone)]
pub struct LatencyStatusPolicy {
    pub latency_threshold_ms: u64,
    pub degraded_latency_ms: Option<u64>,
    pub degraded_status_codes: Vec<u16>,
    pub path_latency_ms: HashMap<String, u64>,
}

impl Default for LatencyStatusPolicy {
    fn default() -> Self {
        Self {
            latency_threshold_ms: DEFAULT_LATENCY_THRESHOLD_MS,
            degraded_latency_ms: None,
            degraded_status_codes: Vec::new(),
            path_latency_ms: HashMap::new(),
        }
    }
}

impl StatusPolicy for LatencyStatusPolicy {
    fn classify(&self, status_code: u16, path: &str, duration_ms: u64) -> Status {
        if self.degraded_status_codes.contains(&status_code) {
            return Status::Degraded;
        }
        if !is_success(status_code) {
            return Status::Down;
        }

        let threshold = self
            .path_latency_ms
            .get(path)
            .copied()
            .unwrap_or(self.latency_threshold_ms);

        match self.degraded_latency_ms {
            _ if duration_ms < threshold => Status::Up,
            Some(limit) if duration_ms < limit => Status::Degraded,
            _ => Status::Down,
        }
    }
}
