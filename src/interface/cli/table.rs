use crate::domain::{EndpointReport, Window};

fn percent(ratio: Option<f64>) -> String {
    ratio
        .map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

fn millis(ms: Option<u64>) -> String {
    ms.map(|ms| format!("{ms}ms")).unwrap_or_else(|| "-".to_string())
}

fn title(report: &EndpointReport) -> String {
    match &report.latest {
        Some(latest) => format!("{} - {} - {}ms", report.endpoint, latest.status, latest.duration_ms),
        None => format!("{} - unknown - 0ms", report.endpoint),
    }
}

/// Render reports as a plain-text table, one row per endpoint
pub fn render_reports(reports: &[EndpointReport]) -> String {
    let mut header = vec!["endpoint".to_string()];
    for window in Window::ALL {
        header.push(format!("down {}", window.label()));
        header.push(format!("degr {}", window.label()));
        header.push(format!("dur {}", window.label()));
    }

    let mut rows = vec![header];
    for report in reports {
        let mut row = vec![title(report)];
        for window in Window::ALL {
            let stats = report.window(window);
            row.push(percent(stats.and_then(|s| s.down_ratio)));
            row.push(percent(stats.and_then(|s| s.degraded_ratio)));
            row.push(millis(stats.and_then(|s| s.mean_duration_ms)));
        }
        rows.push(row);
    }

    let columns = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|c| rows.iter().map(|row| row[c].chars().count()).max().unwrap_or(0))
        .collect();

    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::aggregator::aggregate;
    use crate::domain::{HistoryEntry, Status};
    use chrono::Utc;

    #[test]
    fn renders_one_row_per_endpoint() {
        let now = Utc::now();
        let history = [
            HistoryEntry {
                timestamp: now.timestamp_millis() - 1000,
                status: Status::Down,
                duration_ms: 300,
            },
            HistoryEntry {
                timestamp: now.timestamp_millis(),
                status: Status::Up,
                duration_ms: 100,
            },
        ];
        let reports = vec![aggregate("/users", &history, now), aggregate("/empty", &[], now)];

        let table = render_reports(&reports);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("endpoint"));
        assert!(lines[0].contains("dur 30d"));
        assert!(lines[1].starts_with("/users - up - 100ms"));
        assert!(lines[1].contains("50.0%"));
        assert!(lines[1].contains("200ms"));
        assert!(lines[2].starts_with("/empty - unknown - 0ms"));
        assert!(lines[2].contains(" - "));
    }
}
