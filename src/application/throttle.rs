use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Sliding-window start-rate limiter.
///
/// Admits at most `limit` starts within any rolling `interval`. Callers are
/// admitted in the order they arrive.
#[derive(Debug)]
pub struct Throttle {
    limit: usize,
    interval: Duration,
    starts: Mutex<VecDeque<Instant>>,
}

impl Throttle {
    pub fn new(limit: usize, interval: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            interval,
            starts: Mutex::new(VecDeque::with_capacity(limit)),
        }
    }

    /// At most `limit` starts per second
    pub fn per_second(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(1))
    }

    /// Wait until a start slot is free and claim it
    pub async fn acquire(&self) {
        // tokio's Mutex is fair, so holding it while sleeping keeps FIFO order
        let mut starts = self.starts.lock().await;
        loop {
            let now = Instant::now();
            while starts
                .front()
                .is_some_and(|oldest| now.duration_since(*oldest) >= self.interval)
            {
                starts.pop_front();
            }

            if starts.len() < self.limit {
                starts.push_back(now);
                return;
            }

            if let Some(oldest) = starts.front().copied() {
                sleep_until(oldest + self.interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn admits_limit_then_waits_for_window() {
        let throttle = Throttle::per_second(2);
        let origin = Instant::now();

        let mut offsets = Vec::new();
        for _ in 0..5 {
            throttle.acquire().await;
            offsets.push(origin.elapsed());
        }

        assert_eq!(offsets[0], Duration::ZERO);
        assert_eq!(offsets[1], Duration::ZERO);
        assert_eq!(offsets[2], Duration::from_secs(1));
        assert_eq!(offsets[3], Duration::from_secs(1));
        assert_eq!(offsets[4], Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn no_window_exceeds_limit_under_contention() {
        let throttle = Arc::new(Throttle::per_second(3));
        let origin = Instant::now();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let throttle = throttle.clone();
                tokio::spawn(async move {
                    throttle.acquire().await;
                    origin.elapsed()
                })
            })
            .collect();

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap());
        }
        starts.sort();

        for (i, start) in starts.iter().enumerate() {
            let in_window = starts[i..]
                .iter()
                .take_while(|later| **later - *start < Duration::from_secs(1))
                .count();
            assert!(in_window <= 3, "{in_window} starts within one second of {start:?}");
        }
        assert_eq!(starts.last().copied(), Some(Duration::from_secs(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn slots_free_up_after_interval() {
        let throttle = Throttle::per_second(1);
        throttle.acquire().await;
        tokio::time::advance(Duration::from_millis(1500)).await;

        let before = Instant::now();
        throttle.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
