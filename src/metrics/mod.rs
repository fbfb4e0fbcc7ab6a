pub mod collector;

pub use collector::{Metrics, MetricsSnapshot};
