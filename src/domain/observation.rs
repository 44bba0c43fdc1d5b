use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Status;

/// Outcome of one physical HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Milliseconds since the Unix epoch when the request started
    pub started_at: i64,
    pub url: String,
    /// `None` when the request never produced a response (network error, timeout)
    pub status_code: Option<u16>,
    pub duration_ms: u64,
    pub succeeded: bool,
    pub status: Status,
}

impl Sample {
    pub fn failed(started_at: i64, url: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            started_at,
            url: url.into(),
            status_code: None,
            duration_ms,
            succeeded: false,
            status: Status::Down,
        }
    }
}

/// Reduced result of all samples taken for one endpoint in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub status: Status,
    pub duration_ms: u64,
    pub url: String,
}

impl Observation {
    pub fn new(timestamp: i64, status: Status, duration_ms: u64, url: impl Into<String>) -> Self {
        Self {
            timestamp,
            status,
            duration_ms,
            url: url.into(),
        }
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
    }

    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            timestamp: self.timestamp,
            status: self.status,
            duration_ms: self.duration_ms,
        }
    }
}

/// One retained history point, without the probed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: i64,
    pub status: Status,
    pub duration_ms: u64,
}

/// The two most recent observations of an endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointState {
    pub current: Option<Observation>,
    pub previous: Option<Observation>,
}

impl EndpointState {
    /// Status the endpoint moved into, if the latest observation is alert-worthy.
    ///
    /// A first-ever `up` is not a transition; neither is an unchanged status.
    pub fn transition(&self) -> Option<Status> {
        let current = self.current.as_ref()?;
        match &self.previous {
            None if current.status.is_up() => None,
            Some(previous) if previous.status == current.status => None,
            _ => Some(current.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(status: Status, duration_ms: u64) -> Observation {
        Observation::new(1_700_000_000_000, status, duration_ms, "http://api.test/x")
    }

    #[test]
    fn no_transition_without_current() {
        assert_eq!(EndpointState::default().transition(), None);
    }

    #[test]
    fn first_up_is_not_a_transition() {
        let state = EndpointState {
            current: Some(obs(Status::Up, 10)),
            previous: None,
        };
        assert_eq!(state.transition(), None);
    }

    #[test]
    fn first_down_is_a_transition() {
        let state = EndpointState {
            current: Some(obs(Status::Down, 10)),
            previous: None,
        };
        assert_eq!(state.transition(), Some(Status::Down));
    }

    #[test]
    fn same_status_ignores_duration_change() {
        let state = EndpointState {
            current: Some(obs(Status::Degraded, 900)),
            previous: Some(obs(Status::Degraded, 20)),
        };
        assert_eq!(state.transition(), None);
    }

    #[test]
    fn recovery_is_a_transition() {
        let state = EndpointState {
            current: Some(obs(Status::Up, 10)),
            previous: Some(obs(Status::Down, 5000)),
        };
        assert_eq!(state.transition(), Some(Status::Up));
    }
}
