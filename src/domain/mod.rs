//! Core business entities, enums, and repository traits.

pub mod agent;
pub mod error;
pub mod order;
pub mod user;

pub use agent::{AgentProfile, AgentRepositoryInterface, AgentStats, AgentWorkload, NewAgentProfile};
pub use error::{DomainError, DomainResult};
pub use order::{
    AgentBrief, NewOrder, Order, OrderFilter, OrderRepositoryInterface, OrderStatus, OrderView,
    PartyBrief, PaymentStatus, TransitionPolicy,
};
pub use user::{NewUser, RequestIdentity, User, UserFilter, UserRepositoryInterface, UserRole};
