use crate::storage::MemoryStorage;
use crate::utils::time::{current_timestamp, elapsed_seconds};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

pub struct Metrics {
    pub total_announces: AtomicU64,
    pub successful_announces: AtomicU64,
    pub failed_announces: AtomicU64,
    pub registry_requests: AtomicU64,
    pub failed_registry_requests: AtomicU64,
    pub peers_reaped: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_announces: u64,
    pub successful_announces: u64,
    pub failed_announces: u64,
    pub success_rate: f64,
    pub registry_requests: u64,
    pub failed_registry_requests: u64,
    pub peers_reaped: u64,
    /// `None` when the storage backend is not the in-process one
    pub active_peers: Option<usize>,
    pub active_swarms: Option<usize>,
    pub uptime_seconds: i64,
    pub announces_per_second: f64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            total_announces: AtomicU64::new(0),
            successful_announces: AtomicU64::new(0),
            failed_announces: AtomicU64::new(0),
            registry_requests: AtomicU64::new(0),
            failed_registry_requests: AtomicU64::new(0),
            peers_reaped: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn increment_announces(&self) {
        self.total_announces.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_successful(&self) {
        self.successful_announces.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed_announces.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_registry_requests(&self) {
        self.registry_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_registry_failures(&self) {
        self.failed_registry_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_reaped(&self, count: usize) {
        self.peers_reaped.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Counters plus derived rates; peer counts come from `memory` when the
    /// tracker runs on the in-memory backend.
    pub fn get_snapshot(&self, memory: Option<&MemoryStorage>) -> MetricsSnapshot {
        self.snapshot_at(memory, current_timestamp())
    }

    fn snapshot_at(&self, memory: Option<&MemoryStorage>, current_time: i64) -> MetricsSnapshot {
        let total_announces = self.total_announces.load(Ordering::Relaxed);
        let successful_announces = self.successful_announces.load(Ordering::Relaxed);

        let success_rate = if total_announces > 0 {
            (successful_announces as f64 / total_announces as f64) * 100.0
        } else {
            0.0
        };

        let uptime_seconds = elapsed_seconds(self.start_time, current_time);

        let announces_per_second = if uptime_seconds > 0 {
            total_announces as f64 / uptime_seconds as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            total_announces,
            successful_announces,
            failed_announces: self.failed_announces.load(Ordering::Relaxed),
            success_rate,
            registry_requests: self.registry_requests.load(Ordering::Relaxed),
            failed_registry_requests: self.failed_registry_requests.load(Ordering::Relaxed),
            peers_reaped: self.peers_reaped.load(Ordering::Relaxed),
            active_peers: memory.map(MemoryStorage::total_peers),
            active_swarms: memory.map(MemoryStorage::active_swarms),
            uptime_seconds,
            announces_per_second,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
