//! Collapses the samples of one endpoint into a single observation.
//!
//! The status is the status of the last sample, so a late failure always
//! wins. The duration is a running average taken in sample order, where each
//! new sample is averaged with the value so far. Later samples therefore weigh
//! more than in a plain mean: `[100, 300, 600]` reduces to 400, not 333.

use crate::domain::{Observation, Sample};

/// Average of two durations, rounding halves up
fn running_average(acc: u64, next: u64) -> u64 {
    (acc + next).div_ceil(2)
}

pub fn reduce(samples: &[Sample]) -> Option<Observation> {
    let (first, rest) = samples.split_first()?;

    let mut observation = Observation::new(first.started_at, first.status, first.duration_ms, first.url.clone());
    for sample in rest {
        observation.status = sample.status;
        observation.duration_ms = running_average(observation.duration_ms, sample.duration_ms);
    }

    Some(observation)
}
