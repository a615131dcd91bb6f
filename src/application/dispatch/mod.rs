//! Agent assignment and self-service use-cases.

pub mod service;

pub use service::{CreateAgentInput, DispatchService};
