//! Dashboard rollup use-cases.

pub mod service;

pub use service::{AnalyticsService, Dashboard};
