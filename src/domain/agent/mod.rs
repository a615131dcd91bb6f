//! Delivery agent aggregate: profile record, workload snapshots, repository
//! trait.

pub mod model;
pub mod repository;

pub use model::{AgentProfile, AgentStats, AgentWorkload};
pub use repository::{AgentRepositoryInterface, NewAgentProfile};
