pub mod bencode;
pub mod core;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod policy;
pub mod storage;
pub mod utils;
pub mod validation;
