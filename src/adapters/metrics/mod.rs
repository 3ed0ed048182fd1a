//! Metrics Adapter
//!
//! Prometheus counters, gauges and histograms for sync runs and
//! votes. The registry is rendered by the HTTP API on `/metrics`.

pub mod prometheus;

pub use prometheus::MetricsRegistry;
