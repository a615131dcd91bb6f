//! Order aggregate: lifecycle states, transition policy, joined views,
//! repository trait.

pub mod model;
pub mod repository;

pub use model::{
    AgentBrief, Order, OrderStatus, OrderView, PartyBrief, PaymentStatus, TransitionPolicy,
};
pub use repository::{NewOrder, OrderFilter, OrderRepositoryInterface};
