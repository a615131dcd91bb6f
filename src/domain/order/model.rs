use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order lifecycle states.
///
/// `pending → assigned → en_route → delivered` with `cancelled` reachable
/// from every non-terminal state. `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Assigned,
    EnRoute,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::EnRoute => "en_route",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "assigned" => Some(Self::Assigned),
            "en_route" => Some(Self::EnRoute),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// No transition is defined out of a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment tracking, separate from the delivery lifecycle. Flips to `Paid`
/// automatically when the order reaches `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

/// Explicit status transition table.
///
/// `Lenient` keeps the behavior operators rely on today: any non-terminal
/// order can be moved to any status, including fast-forwarding
/// `pending → delivered`. `Strict` restricts advancement to adjacent steps,
/// with cancellation reachable from every non-terminal state. Terminal
/// states admit no transition under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Lenient,
    Strict,
}

impl TransitionPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lenient" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        use OrderStatus::*;

        if from.is_terminal() {
            return false;
        }

        match self {
            Self::Lenient => true,
            Self::Strict => matches!(
                (from, to),
                (Pending, Assigned)
                    | (Assigned, EnRoute)
                    | (EnRoute, Delivered)
                    | (Pending, Cancelled)
                    | (Assigned, Cancelled)
                    | (EnRoute, Cancelled)
            ),
        }
    }
}

/// A single requested charging/delivery transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    /// Agent profile id; non-null only once the order has been assigned.
    pub assigned_to: Option<String>,
    pub current_location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub battery_type: String,
    pub vehicle_model: Option<String>,
    pub charge_level: String,
    pub amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Owner or agent-operator display fields joined onto an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyBrief {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Assigned-agent display fields joined onto an order.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentBrief {
    pub id: String,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    pub user: Option<PartyBrief>,
}

/// An order joined with its owner and assigned-agent display data, the
/// shape returned to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub order: Order,
    pub user: Option<PartyBrief>,
    pub agent: Option<AgentBrief>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    const ALL: [OrderStatus; 5] = [Pending, Assigned, EnRoute, Delivered, Cancelled];

    #[test]
    fn status_round_trips_through_strings() {
        for status in ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn terminal_states_admit_no_transition() {
        for policy in [TransitionPolicy::Lenient, TransitionPolicy::Strict] {
            for to in ALL {
                assert!(!policy.allows(Delivered, to), "{policy:?} delivered->{to}");
                assert!(!policy.allows(Cancelled, to), "{policy:?} cancelled->{to}");
            }
        }
    }

    #[test]
    fn lenient_allows_fast_forward() {
        let policy = TransitionPolicy::Lenient;
        assert!(policy.allows(Pending, Delivered));
        assert!(policy.allows(EnRoute, Pending));
    }

    #[test]
    fn strict_allows_only_adjacent_steps() {
        let policy = TransitionPolicy::Strict;
        assert!(policy.allows(Pending, Assigned));
        assert!(policy.allows(Assigned, EnRoute));
        assert!(policy.allows(EnRoute, Delivered));
        assert!(!policy.allows(Pending, Delivered));
        assert!(!policy.allows(Pending, EnRoute));
        assert!(!policy.allows(Assigned, Pending));
    }

    #[test]
    fn strict_allows_cancellation_from_any_non_terminal() {
        let policy = TransitionPolicy::Strict;
        for from in [Pending, Assigned, EnRoute] {
            assert!(policy.allows(from, Cancelled), "{from}->cancelled");
        }
    }
}
