//! On-disk representation of the observation snapshot.
//!
//! The snapshot is a JSON object keyed by endpoint. Each history is an array
//! of `[timestamp_ms, "status", duration_ms, "url"]` tuples, oldest first.
//! Keys are kept sorted so that encoding the same snapshot always yields the
//! same bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Observation, Status};

pub type Snapshot = BTreeMap<String, Vec<Observation>>;

#[derive(Serialize)]
struct RecordRef<'a>(i64, Status, u64, &'a str);

/// Records written before URLs were tracked carry only three fields
#[derive(Deserialize)]
#[serde(untagged)]
enum Record {
    Full(i64, Status, u64, String),
    Bare(i64, Status, u64),
}

impl From<Record> for Observation {
    fn from(record: Record) -> Self {
        match record {
            Record::Full(timestamp, status, duration_ms, url) => {
                Observation::new(timestamp, status, duration_ms, url)
            }
            Record::Bare(timestamp, status, duration_ms) => {
                Observation::new(timestamp, status, duration_ms, String::new())
            }
        }
    }
}

fn records(history: &[Observation]) -> Vec<RecordRef<'_>> {
    history
        .iter()
        .map(|o| RecordRef(o.timestamp, o.status, o.duration_ms, &o.url))
        .collect()
}

pub fn encode(snapshot: &Snapshot) -> serde_json::Result<String> {
    let view: BTreeMap<&str, Vec<RecordRef<'_>>> = snapshot
        .iter()
        .map(|(endpoint, history)| (endpoint.as_str(), records(history)))
        .collect();
    serde_json::to_string(&view)
}

/// Serialized size of one endpoint's history in bytes
pub fn encoded_len(history: &[Observation]) -> serde_json::Result<usize> {
    serde_json::to_vec(&records(history)).map(|bytes| bytes.len())
}

pub fn decode(raw: &str) -> serde_json::Result<Snapshot> {
    let parsed: BTreeMap<String, Vec<Record>> = serde_json::from_str(raw)?;
    Ok(parsed
        .into_iter()
        .map(|(endpoint, history)| (endpoint, history.into_iter().map(Observation::from).collect()))
        .collect())
}
