//! SeaORM repository implementations

pub mod agent_repository;
pub mod order_repository;
pub mod user_repository;

pub use agent_repository::AgentRepository;
pub use order_repository::OrderRepository;
pub use user_repository::UserRepository;
