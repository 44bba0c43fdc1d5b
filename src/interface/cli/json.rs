use crate::application::RunSummary;

/// Render the whole run summary as pretty-printed JSON
pub fn render_json(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::aggregator::aggregate;
    use crate::application::AlertRecord;
    use crate::domain::{Observation, Status};
    use chrono::Utc;
    use serde_json::Value;

    #[test]
    fn summary_carries_observations_alerts_and_windows() {
        let now = Utc::now();
        let observation = Observation::new(now.timestamp_millis(), Status::Down, 812, "https://api.test/users");
        let summary = RunSummary {
            observations: vec![("/users".to_string(), observation.clone())],
            alerts: vec![AlertRecord {
                endpoint: "/users".to_string(),
                status: Status::Down,
                sink: "console".to_string(),
                delivered: true,
            }],
            reports: vec![aggregate("/users", &[observation.to_history_entry()], now)],
        };

        let value: Value = serde_json::from_str(&render_json(&summary).unwrap()).unwrap();

        assert_eq!(value["observations"][0][0], "/users");
        assert_eq!(value["observations"][0][1]["status"], "down");
        assert_eq!(value["alerts"][0]["sink"], "console");
        assert_eq!(value["reports"][0]["latest"]["duration_ms"], 812);
        assert_eq!(value["reports"][0]["windows"][0]["window"], "60m");
        assert_eq!(value["reports"][0]["windows"][0]["down_ratio"], 1.0);
    }
}
