//! Order status progression

use serde::{Deserialize, Serialize};

/// Status of a food order.
///
/// Linear progression once placed:
/// Cart → Placed → Preparing → PickedUp → Delivered.
/// The customer may cancel only while the order is still Placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Items are being collected; not visible to the restaurant yet.
    Cart,
    Placed,
    Preparing,
    PickedUp,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Next stage in the linear progression, if any.
    pub fn next(self) -> Option<OrderStatus> {
        use OrderStatus::*;
        match self {
            Cart => Some(Placed),
            Placed => Some(Preparing),
            Preparing => Some(PickedUp),
            PickedUp => Some(Delivered),
            Delivered | Cancelled => None,
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// Only single forward steps are legal, plus Placed → Cancelled.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self == OrderStatus::Placed && next == OrderStatus::Cancelled {
            return true;
        }
        self.next() == Some(next)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Cart => "Cart",
            OrderStatus::Placed => "Placed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::PickedUp => "PickedUp",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
