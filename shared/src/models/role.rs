//! Account roles
//!
//! Capability-tagged actor type. Permissions are checked per operation
//! against the variant, not by inheritance: a staff account carries the
//! restaurant it manages, a contractor carries no extra data.

use serde::{Deserialize, Serialize};

/// Role of an account, tagged with the capability scope it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountRole {
    /// Regular customer: may request/cancel own reservations, place orders.
    Customer,
    /// Restaurant staff: may confirm/cancel reservations and drive order
    /// status for their own restaurant only.
    Staff {
        /// Restaurant record ID ("restaurant:xyz")
        restaurant: String,
    },
    /// Delivery contractor: may claim orders and drive pickup/delivery.
    Contractor,
}

impl AccountRole {
    /// Whether this actor is staff of the given restaurant.
    pub fn is_staff_of(&self, restaurant_id: &str) -> bool {
        matches!(self, AccountRole::Staff { restaurant } if restaurant == restaurant_id)
    }

    pub fn is_customer(&self) -> bool {
        matches!(self, AccountRole::Customer)
    }

    pub fn is_contractor(&self) -> bool {
        matches!(self, AccountRole::Contractor)
    }

    /// Short label used in logs and JWT claims.
    pub fn label(&self) -> &'static str {
        match self {
            AccountRole::Customer => "customer",
            AccountRole::Staff { .. } => "staff",
            AccountRole::Contractor => "contractor",
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRole::Staff { restaurant } => write!(f, "staff({restaurant})"),
            other => write!(f, "{}", other.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_scope_is_per_restaurant() {
        let role = AccountRole::Staff {
            restaurant: "restaurant:abc".into(),
        };
        assert!(role.is_staff_of("restaurant:abc"));
        assert!(!role.is_staff_of("restaurant:other"));
        assert!(!AccountRole::Customer.is_staff_of("restaurant:abc"));
    }

    #[test]
    fn role_round_trips_through_json() {
        let role = AccountRole::Staff {
            restaurant: "restaurant:abc".into(),
        };
        let json = serde_json::to_string(&role).unwrap();
        let back: AccountRole = serde_json::from_str(&json).unwrap();
        assert_eq!(role, back);
    }
}
