use chrono::Duration;
use serde::Serialize;

use super::HistoryEntry;

/// Trailing time range used for aggregate reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Window {
    #[serde(rename = "60m")]
    Past60Minutes,
    #[serde(rename = "24h")]
    Past24Hours,
    #[serde(rename = "7d")]
    Past7Days,
    #[serde(rename = "30d")]
    Past30Days,
}

impl Window {
    pub const ALL: [Window; 4] = [
        Window::Past60Minutes,
        Window::Past24Hours,
        Window::Past7Days,
        Window::Past30Days,
    ];

    pub fn span(&self) -> Duration {
        match self {
            Self::Past60Minutes => Duration::minutes(60),
            Self::Past24Hours => Duration::hours(24),
            Self::Past7Days => Duration::days(7),
            Self::Past30Days => Duration::days(30),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Past60Minutes => "60m",
            Self::Past24Hours => "24h",
            Self::Past7Days => "7d",
            Self::Past30Days => "30d",
        }
    }
}

/// Aggregates over the observations of one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStats {
    pub window: Window,
    /// Inclusive lower bound, milliseconds since the Unix epoch
    pub since: i64,
    pub count: usize,
    pub mean_duration_ms: Option<u64>,
    pub down_ratio: Option<f64>,
    pub degraded_ratio: Option<f64>,
}

/// Per-endpoint report produced at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointReport {
    pub endpoint: String,
    pub latest: Option<HistoryEntry>,
    pub windows: Vec<WindowStats>,
}

impl EndpointReport {
    pub fn window(&self, window: Window) -> Option<&WindowStats> {
        self.windows.iter().find(|w| w.window == window)
    }
}
