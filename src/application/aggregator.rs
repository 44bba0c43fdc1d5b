use chrono::{DateTime, Utc};

use crate::domain::{EndpointReport, HistoryEntry, Status, Window, WindowStats};

/// Statistics over the entries at or after `now - window`
pub fn window_stats(history: &[HistoryEntry], window: Window, now: DateTime<Utc>) -> WindowStats {
    let since = (now - window.span()).timestamp_millis();
    let in_window: Vec<&HistoryEntry> = history.iter().filter(|e| e.timestamp >= since).collect();
    let count = in_window.len();

    let ratio = |status: Status| {
        (count > 0).then(|| in_window.iter().filter(|e| e.status == status).count() as f64 / count as f64)
    };

    let mean_duration_ms = (count > 0).then(|| {
        let total: u64 = in_window.iter().map(|e| e.duration_ms).sum();
        (total as f64 / count as f64).round() as u64
    });

    WindowStats {
        window,
        since,
        count,
        mean_duration_ms,
        down_ratio: ratio(Status::Down),
        degraded_ratio: ratio(Status::Degraded),
    }
}

/// Report for one endpoint over all standard windows
pub fn aggregate(endpoint: &str, history: &[HistoryEntry], now: DateTime<Utc>) -> EndpointReport {
    EndpointReport {
        endpoint: endpoint.to_string(),
        latest: history.last().copied(),
        windows: Window::ALL
            .iter()
            .map(|window| window_stats(history, *window, now))
            .collect(),
    }
}
