pub mod announce;
pub mod fallback;
pub mod health;
pub mod infohash;
pub mod manifest;
pub mod metrics;
