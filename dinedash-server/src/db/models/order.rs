//! Order Model

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{OrderStatus, Timestamp};
use surrealdb::RecordId;

/// Order ID type
pub type OrderId = RecordId;

/// One line of an order. The unit price is captured when the item is
/// added so later menu edits do not change a placed order's total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(with = "serde_helpers::record_id")]
    pub menu_item: RecordId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub customer: RecordId,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    /// Delivery contractor who claimed the order
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub contractor: Option<RecordId>,
    /// Fixed at placement time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_placed: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_delivered: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Sum of line totals for an open cart; placed orders use `total`.
    pub fn calc_total(&self) -> Decimal {
        if self.status == OrderStatus::Cart {
            self.lines.iter().map(|l| l.line_total()).sum()
        } else {
            self.total.unwrap_or_default()
        }
    }
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAddItem {
    /// Menu item record ID ("menu_item:abc")
    pub menu_item: String,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn line(qty: u32, price: f64) -> OrderLine {
        OrderLine {
            menu_item: RecordId::from_table_key("menu_item", "x"),
            name: "Item".into(),
            quantity: qty,
            unit_price: Decimal::from_f64(price).unwrap(),
        }
    }

    #[test]
    fn cart_total_sums_lines() {
        let order = Order {
            id: None,
            restaurant: RecordId::from_table_key("restaurant", "r"),
            customer: RecordId::from_table_key("account", "c"),
            lines: vec![line(2, 9.50), line(1, 4.25)],
            status: OrderStatus::Cart,
            contractor: None,
            total: None,
            date_placed: None,
            date_delivered: None,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(order.calc_total(), Decimal::from_f64(23.25).unwrap());
    }

    #[test]
    fn placed_total_is_frozen() {
        let mut order = Order {
            id: None,
            restaurant: RecordId::from_table_key("restaurant", "r"),
            customer: RecordId::from_table_key("account", "c"),
            lines: vec![line(1, 10.0)],
            status: OrderStatus::Placed,
            contractor: None,
            total: Some(Decimal::from_f64(10.0).unwrap()),
            date_placed: Some(1),
            date_delivered: None,
            created_at: 0,
            updated_at: 0,
        };
        // Line mutation after placement must not change the total
        order.lines[0].quantity = 5;
        assert_eq!(order.calc_total(), Decimal::from_f64(10.0).unwrap());
    }
}
