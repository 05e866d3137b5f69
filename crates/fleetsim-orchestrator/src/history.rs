//! Bounded history of utilization samples

use fleetsim_core::{UtilizationSample, UtilizationSnapshot};
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Samples written by the sampling loop and read by the evaluation loop.
///
/// Appends and reads are serialized by one mutex, so readers only ever see
/// complete samples. The oldest sample is dropped once `capacity` is reached.
pub struct MetricsHistory {
    samples: Mutex<VecDeque<UtilizationSample>>,
    capacity: usize,
}

impl MetricsHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Append a snapshot stamped with the current time
    pub async fn record(&self, snapshot: UtilizationSnapshot) -> UtilizationSample {
        let sample = UtilizationSample::now(snapshot);
        let mut samples = self.samples.lock().await;
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
        sample
    }

    /// Most recent snapshot, or the all-zero snapshot before the first sample
    pub async fn latest(&self) -> UtilizationSnapshot {
        self.latest_sample()
            .await
            .map(|s| s.snapshot)
            .unwrap_or_default()
    }

    pub async fn latest_sample(&self) -> Option<UtilizationSample> {
        self.samples.lock().await.back().copied()
    }

    pub async fn len(&self) -> usize {
        self.samples.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.samples.lock().await.is_empty()
    }

    /// All retained samples, oldest first
    pub async fn samples(&self) -> Vec<UtilizationSample> {
        self.samples.lock().await.iter().copied().collect()
    }
}
