//! Observability and Metrics
//!
//! Counters for map-response generation, owned by a [`crate::mapper::Mapper`]
//! and shared with whoever wants to export them.
//!
//! Uses atomic counters for thread-safe metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collector for map-response operations
#[derive(Debug)]
pub struct Metrics {
    /// Full map responses produced
    pub map_responses: AtomicU64,
    /// Keepalive responses produced
    pub keep_alive_responses: AtomicU64,
    /// Builds that ended in an error
    pub build_failures: AtomicU64,
    /// Total framed bytes handed back to the serving layer
    pub bytes_framed: AtomicU64,
    /// Payloads compressed
    pub compression_total: AtomicU64,
    /// Bytes before compression, summed over compressed payloads
    pub compression_bytes_in: AtomicU64,
    /// Bytes after compression, summed over compressed payloads
    pub compression_bytes_out: AtomicU64,
    /// Payloads sealed for the legacy transport
    pub sealed_total: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            map_responses: AtomicU64::new(0),
            keep_alive_responses: AtomicU64::new(0),
            build_failures: AtomicU64::new(0),
            bytes_framed: AtomicU64::new(0),
            compression_total: AtomicU64::new(0),
            compression_bytes_in: AtomicU64::new(0),
            compression_bytes_out: AtomicU64::new(0),
            sealed_total: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a framed full map response
    pub fn map_response(&self, byte_count: u64) {
        self.map_responses.fetch_add(1, Ordering::Relaxed);
        self.bytes_framed.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a framed keepalive response
    pub fn keep_alive_response(&self, byte_count: u64) {
        self.keep_alive_responses.fetch_add(1, Ordering::Relaxed);
        self.bytes_framed.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a failed build
    pub fn build_failure(&self) {
        self.build_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one compressed payload
    pub fn compressed(&self, bytes_in: u64, bytes_out: u64) {
        self.compression_total.fetch_add(1, Ordering::Relaxed);
        self.compression_bytes_in
            .fetch_add(bytes_in, Ordering::Relaxed);
        self.compression_bytes_out
            .fetch_add(bytes_out, Ordering::Relaxed);
    }

    /// Record one sealed payload
    pub fn sealed(&self) {
        self.sealed_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            map_responses: self.map_responses.load(Ordering::Relaxed),
            keep_alive_responses: self.keep_alive_responses.load(Ordering::Relaxed),
            build_failures: self.build_failures.load(Ordering::Relaxed),
            bytes_framed: self.bytes_framed.load(Ordering::Relaxed),
            compression_total: self.compression_total.load(Ordering::Relaxed),
            compression_bytes_in: self.compression_bytes_in.load(Ordering::Relaxed),
            compression_bytes_out: self.compression_bytes_out.load(Ordering::Relaxed),
            sealed_total: self.sealed_total.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            map_responses = snapshot.map_responses,
            keep_alive_responses = snapshot.keep_alive_responses,
            build_failures = snapshot.build_failures,
            bytes_framed = snapshot.bytes_framed,
            compression_total = snapshot.compression_total,
            compression_ratio = snapshot.compression_ratio(),
            sealed_total = snapshot.sealed_total,
            uptime_seconds = snapshot.uptime_seconds,
            "Mapper metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub map_responses: u64,
    pub keep_alive_responses: u64,
    pub build_failures: u64,
    pub bytes_framed: u64,
    pub compression_total: u64,
    pub compression_bytes_in: u64,
    pub compression_bytes_out: u64,
    pub sealed_total: u64,
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    /// Output/input size ratio over all compressed payloads; 1.0 when none
    pub fn compression_ratio(&self) -> f64 {
        if self.compression_bytes_in == 0 {
            return 1.0;
        }
        self.compression_bytes_out as f64 / self.compression_bytes_in as f64
    }
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.map_response(100);
        metrics.keep_alive_response(22);
        metrics.compressed(1000, 250);
        metrics.sealed();
        metrics.build_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.map_responses, 1);
        assert_eq!(snapshot.keep_alive_responses, 1);
        assert_eq!(snapshot.bytes_framed, 122);
        assert_eq!(snapshot.sealed_total, 1);
        assert_eq!(snapshot.build_failures, 1);
        assert!((snapshot.compression_ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_without_compression() {
        assert!((Metrics::new().snapshot().compression_ratio() - 1.0).abs() < f64::EPSILON);
    }
}
