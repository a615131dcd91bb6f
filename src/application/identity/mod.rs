//! Credential verification and account management use-cases.

pub mod service;

pub use service::{AuthSession, IdentityService, SignupInput};
