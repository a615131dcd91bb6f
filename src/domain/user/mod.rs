//! User aggregate: account record, roles, request identity, repository trait.

pub mod model;
pub mod repository;

pub use model::{RequestIdentity, User, UserRole};
pub use repository::{NewUser, UserFilter, UserRepositoryInterface};
