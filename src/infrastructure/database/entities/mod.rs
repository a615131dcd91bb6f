//! SeaORM entities

pub mod agent;
pub mod order;
pub mod user;
