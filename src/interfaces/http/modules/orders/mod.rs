//! Order placement, visibility, status advancement and cancellation
//! endpoints.

pub mod dto;
pub mod handlers;

pub use handlers::OrderHandlerState;
