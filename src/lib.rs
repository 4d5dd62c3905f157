pub mod pipeline;
pub mod config;
pub mod domain;
pub mod schedule;
pub mod sources;
pub mod sinks;
pub mod observability;
pub mod metrics_server;

pub use pipeline::{Pipeline, Envelope};
