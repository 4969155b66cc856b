//! OrderService - cart management and delivery status progression

use shared::{OrderStatus, WorkflowEvent, WorkflowEventKind};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use tokio::sync::broadcast;

use crate::auth::CurrentUser;
use crate::db::models::{Order, OrderAddItem, OrderLine};
use crate::db::repository::{MenuItemRepository, OrderRepository};
use crate::reservations::{WorkflowError, WorkflowResult};

pub struct OrderService {
    orders: OrderRepository,
    menu_items: MenuItemRepository,
    event_tx: broadcast::Sender<WorkflowEvent>,
}

impl OrderService {
    pub fn new(db: Surreal<Db>, event_tx: broadcast::Sender<WorkflowEvent>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            menu_items: MenuItemRepository::new(db),
            event_tx,
        }
    }

    /// Repository access for read-only listing endpoints
    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }

    /// Add a menu item to the customer's cart for that restaurant,
    /// creating the cart on first use. Adding an item already in the
    /// cart bumps its quantity.
    pub async fn add_item(
        &self,
        actor: &CurrentUser,
        restaurant_id: &str,
        item: OrderAddItem,
    ) -> WorkflowResult<Order> {
        if !actor.role.is_customer() {
            return Err(WorkflowError::Permission(
                "Only customers can order food".to_string(),
            ));
        }
        if item.quantity == 0 {
            return Err(WorkflowError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let menu_item = self
            .menu_items
            .find_by_id(&item.menu_item)
            .await?
            .ok_or_else(|| {
                WorkflowError::NotFound(format!("Menu item not found: {}", item.menu_item))
            })?;
        let restaurant: RecordId = parse_id(restaurant_id)?;
        if menu_item.restaurant != restaurant {
            return Err(WorkflowError::Validation(
                "Menu item belongs to a different restaurant".to_string(),
            ));
        }

        let customer: RecordId = parse_id(&actor.id)?;
        let cart = match self.orders.find_cart(&customer, &restaurant).await? {
            Some(cart) => cart,
            None => self.orders.create_cart(customer, restaurant).await?,
        };

        let menu_item_id = menu_item
            .id
            .clone()
            .ok_or_else(|| WorkflowError::Database("Menu item record without id".to_string()))?;
        let mut lines = cart.lines.clone();
        match lines.iter_mut().find(|l| l.menu_item == menu_item_id) {
            Some(line) => line.quantity += item.quantity,
            None => lines.push(OrderLine {
                menu_item: menu_item_id,
                name: menu_item.name,
                quantity: item.quantity,
                unit_price: menu_item.price,
            }),
        }

        Ok(self.orders.set_lines(&order_id(&cart)?, lines).await?)
    }

    /// Remove a line from the cart
    pub async fn remove_item(
        &self,
        actor: &CurrentUser,
        restaurant_id: &str,
        menu_item_id: &str,
    ) -> WorkflowResult<Order> {
        let customer: RecordId = parse_id(&actor.id)?;
        let restaurant: RecordId = parse_id(restaurant_id)?;
        let cart = self
            .orders
            .find_cart(&customer, &restaurant)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("No open cart".to_string()))?;

        let target: RecordId = parse_id(menu_item_id)?;
        let lines: Vec<OrderLine> = cart
            .lines
            .iter()
            .filter(|l| l.menu_item != target)
            .cloned()
            .collect();
        if lines.len() == cart.lines.len() {
            return Err(WorkflowError::NotFound(
                "Item is not in the cart".to_string(),
            ));
        }

        Ok(self.orders.set_lines(&order_id(&cart)?, lines).await?)
    }

    /// Place the cart: freezes the total and makes the order visible
    /// to the restaurant.
    pub async fn place(&self, actor: &CurrentUser, restaurant_id: &str) -> WorkflowResult<Order> {
        let customer: RecordId = parse_id(&actor.id)?;
        let restaurant: RecordId = parse_id(restaurant_id)?;
        let cart = self
            .orders
            .find_cart(&customer, &restaurant)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("No open cart".to_string()))?;
        if cart.lines.is_empty() {
            return Err(WorkflowError::Validation("Cart is empty".to_string()));
        }

        let placed = self
            .orders
            .mark_placed(&order_id(&cart)?, cart.calc_total())
            .await?;
        self.emit_status_change(actor, &placed, OrderStatus::Cart);
        Ok(placed)
    }

    /// Customer cancels a placed order. Later stages cannot be
    /// cancelled.
    pub async fn cancel(&self, actor: &CurrentUser, order_id: &str) -> WorkflowResult<Order> {
        let order = self.load(order_id).await?;
        if order.customer.to_string() != actor.id {
            return Err(WorkflowError::Permission("Not your order".to_string()));
        }
        self.transition(actor, order, OrderStatus::Cancelled).await
    }

    /// Staff of the restaurant starts preparation
    pub async fn start_preparing(
        &self,
        actor: &CurrentUser,
        order_id: &str,
    ) -> WorkflowResult<Order> {
        let order = self.load(order_id).await?;
        if !actor.role.is_staff_of(&order.restaurant.to_string()) {
            return Err(WorkflowError::Permission(
                "Only staff of this restaurant can update the order".to_string(),
            ));
        }
        self.transition(actor, order, OrderStatus::Preparing).await
    }

    /// Contractor claims an order that is being prepared
    pub async fn claim(&self, actor: &CurrentUser, order_id: &str) -> WorkflowResult<Order> {
        if !actor.role.is_contractor() {
            return Err(WorkflowError::Permission(
                "Only delivery contractors can claim orders".to_string(),
            ));
        }
        let order = self.load(order_id).await?;
        if order.status != OrderStatus::Preparing {
            return Err(WorkflowError::Conflict(format!(
                "Order is {}, only Preparing orders can be claimed",
                order.status
            )));
        }
        let contractor: RecordId = parse_id(&actor.id)?;
        // Conditional write: a racing claim that lost the update gets
        // no row back.
        self.orders
            .assign_contractor(order_id, contractor)
            .await?
            .ok_or_else(|| WorkflowError::Conflict("Order is already claimed".to_string()))
    }

    /// Assigned contractor picks the order up
    pub async fn pick_up(&self, actor: &CurrentUser, order_id: &str) -> WorkflowResult<Order> {
        let order = self.claimed_by(actor, order_id).await?;
        self.transition(actor, order, OrderStatus::PickedUp).await
    }

    /// Assigned contractor hands the order over
    pub async fn deliver(&self, actor: &CurrentUser, order_id: &str) -> WorkflowResult<Order> {
        let order = self.claimed_by(actor, order_id).await?;
        self.transition(actor, order, OrderStatus::Delivered).await
    }

    async fn claimed_by(&self, actor: &CurrentUser, order_id: &str) -> WorkflowResult<Order> {
        let order = self.load(order_id).await?;
        let claimed = order
            .contractor
            .as_ref()
            .map(|c| c.to_string() == actor.id)
            .unwrap_or(false);
        if !claimed {
            return Err(WorkflowError::Permission(
                "Order is not assigned to you".to_string(),
            ));
        }
        Ok(order)
    }

    async fn transition(
        &self,
        actor: &CurrentUser,
        order: Order,
        to: OrderStatus,
    ) -> WorkflowResult<Order> {
        if !order.status.can_transition_to(to) {
            return Err(WorkflowError::Conflict(format!(
                "Cannot move order from {} to {}",
                order.status, to
            )));
        }
        let from = order.status;
        let updated = self
            .orders
            .set_status(&order_id(&order)?, to)
            .await?;
        self.emit_status_change(actor, &updated, from);
        Ok(updated)
    }

    async fn load(&self, id: &str) -> WorkflowResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Order not found: {}", id)))
    }

    fn emit_status_change(&self, actor: &CurrentUser, order: &Order, from: OrderStatus) {
        let event = WorkflowEvent::new(
            actor.id.clone(),
            WorkflowEventKind::OrderStatusChanged {
                order_id: order
                    .id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                restaurant_id: order.restaurant.to_string(),
                customer_id: order.customer.to_string(),
                from,
                to: order.status,
            },
        );
        if self.event_tx.send(event).is_err() {
            tracing::debug!("No workflow event subscribers");
        }
    }
}

fn parse_id(id: &str) -> WorkflowResult<RecordId> {
    id.parse()
        .map_err(|_| WorkflowError::Validation(format!("Invalid ID: {}", id)))
}

fn order_id(order: &Order) -> WorkflowResult<String> {
    order
        .id
        .as_ref()
        .map(|id| id.to_string())
        .ok_or_else(|| WorkflowError::Database("Order record without id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{AccountRepository, RestaurantRepository};
    use crate::db::models::{MenuItemCreate, RestaurantCreate, WeeklyHours};
    use rust_decimal::Decimal;
    use shared::AccountRole;

    struct Fixture {
        service: OrderService,
        customer: CurrentUser,
        staff: CurrentUser,
        contractor: CurrentUser,
        restaurant_id: String,
        item_id: String,
    }

    async fn setup() -> Fixture {
        let db = DbService::new_in_memory().await.unwrap().db;
        let accounts = AccountRepository::new(db.clone());
        let restaurants = RestaurantRepository::new(db.clone());
        let menu_items = MenuItemRepository::new(db.clone());

        let customer_account = accounts
            .create("c@example.com", "Customer", "pass123", AccountRole::Customer)
            .await
            .unwrap();
        let staff_account = accounts
            .create("s@example.com", "Staff", "pass123", AccountRole::Customer)
            .await
            .unwrap();
        let contractor_account = accounts
            .create("d@example.com", "Driver", "pass123", AccountRole::Contractor)
            .await
            .unwrap();

        let restaurant = restaurants
            .create(
                staff_account.id.clone().unwrap(),
                RestaurantCreate {
                    name: "Burgers".into(),
                    description: "Burgers".into(),
                    address: "2 Side St".into(),
                    latitude: Decimal::new(40, 0),
                    longitude: Decimal::new(-3, 0),
                    hours: WeeklyHours::default(),
                },
            )
            .await
            .unwrap();
        let restaurant_id = restaurant.id.clone().unwrap().to_string();

        let item = menu_items
            .create(
                restaurant.id.unwrap(),
                MenuItemCreate {
                    name: "Cheeseburger".into(),
                    description: "With fries".into(),
                    price: Decimal::new(950, 2),
                },
            )
            .await
            .unwrap();

        let (event_tx, _) = broadcast::channel(64);
        Fixture {
            service: OrderService::new(db, event_tx),
            customer: CurrentUser {
                id: customer_account.id.unwrap().to_string(),
                email: "c@example.com".into(),
                display_name: "Customer".into(),
                role: AccountRole::Customer,
            },
            staff: CurrentUser {
                id: staff_account.id.unwrap().to_string(),
                email: "s@example.com".into(),
                display_name: "Staff".into(),
                role: AccountRole::Staff {
                    restaurant: restaurant_id.clone(),
                },
            },
            contractor: CurrentUser {
                id: contractor_account.id.unwrap().to_string(),
                email: "d@example.com".into(),
                display_name: "Driver".into(),
                role: AccountRole::Contractor,
            },
            restaurant_id,
            item_id: item.id.unwrap().to_string(),
        }
    }

    fn add(f: &Fixture, qty: u32) -> OrderAddItem {
        OrderAddItem {
            menu_item: f.item_id.clone(),
            quantity: qty,
        }
    }

    #[tokio::test]
    async fn adding_same_item_bumps_quantity() {
        let f = setup().await;
        f.service
            .add_item(&f.customer, &f.restaurant_id, add(&f, 1))
            .await
            .unwrap();
        let cart = f
            .service
            .add_item(&f.customer, &f.restaurant_id, add(&f, 2))
            .await
            .unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);
    }

    #[tokio::test]
    async fn placing_freezes_total() {
        let f = setup().await;
        f.service
            .add_item(&f.customer, &f.restaurant_id, add(&f, 2))
            .await
            .unwrap();
        let placed = f.service.place(&f.customer, &f.restaurant_id).await.unwrap();
        assert_eq!(placed.status, OrderStatus::Placed);
        assert_eq!(placed.total.unwrap(), Decimal::new(1900, 2));
        assert!(placed.date_placed.is_some());
    }

    #[tokio::test]
    async fn placing_empty_cart_rejected() {
        let f = setup().await;
        f.service
            .add_item(&f.customer, &f.restaurant_id, add(&f, 1))
            .await
            .unwrap();
        f.service
            .remove_item(&f.customer, &f.restaurant_id, &f.item_id)
            .await
            .unwrap();
        let err = f
            .service
            .place(&f.customer, &f.restaurant_id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn full_delivery_progression() {
        let f = setup().await;
        f.service
            .add_item(&f.customer, &f.restaurant_id, add(&f, 1))
            .await
            .unwrap();
        let placed = f.service.place(&f.customer, &f.restaurant_id).await.unwrap();
        let id = placed.id.unwrap().to_string();

        f.service.start_preparing(&f.staff, &id).await.unwrap();
        f.service.claim(&f.contractor, &id).await.unwrap();
        f.service.pick_up(&f.contractor, &id).await.unwrap();
        let delivered = f.service.deliver(&f.contractor, &id).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert!(delivered.date_delivered.is_some());
    }

    #[tokio::test]
    async fn stage_skipping_rejected() {
        let f = setup().await;
        f.service
            .add_item(&f.customer, &f.restaurant_id, add(&f, 1))
            .await
            .unwrap();
        let placed = f.service.place(&f.customer, &f.restaurant_id).await.unwrap();
        let id = placed.id.unwrap().to_string();

        // Not claimable before Preparing
        let err = f.service.claim(&f.contractor, &id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn customer_cancel_only_while_placed() {
        let f = setup().await;
        f.service
            .add_item(&f.customer, &f.restaurant_id, add(&f, 1))
            .await
            .unwrap();
        let placed = f.service.place(&f.customer, &f.restaurant_id).await.unwrap();
        let id = placed.id.unwrap().to_string();
        f.service.start_preparing(&f.staff, &id).await.unwrap();

        let err = f.service.cancel(&f.customer, &id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn claim_is_exclusive() {
        let f = setup().await;
        f.service
            .add_item(&f.customer, &f.restaurant_id, add(&f, 1))
            .await
            .unwrap();
        let placed = f.service.place(&f.customer, &f.restaurant_id).await.unwrap();
        let id = placed.id.unwrap().to_string();
        f.service.start_preparing(&f.staff, &id).await.unwrap();
        f.service.claim(&f.contractor, &id).await.unwrap();

        let err = f.service.claim(&f.contractor, &id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));

        let rival = CurrentUser {
            id: "account:rival".into(),
            email: "r@example.com".into(),
            display_name: "Rival".into(),
            role: AccountRole::Contractor,
        };
        let err = f.service.pick_up(&rival, &id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Permission(_)));
    }

    #[tokio::test]
    async fn racing_claims_one_wins() {
        let f = setup().await;
        let rival = CurrentUser {
            id: "account:rival".into(),
            email: "r@example.com".into(),
            display_name: "Rival".into(),
            role: AccountRole::Contractor,
        };
        for _ in 0..8 {
            f.service
                .add_item(&f.customer, &f.restaurant_id, add(&f, 1))
                .await
                .unwrap();
            let placed = f.service.place(&f.customer, &f.restaurant_id).await.unwrap();
            let id = placed.id.unwrap().to_string();
            f.service.start_preparing(&f.staff, &id).await.unwrap();

            let (a, b) = tokio::join!(
                f.service.claim(&f.contractor, &id),
                f.service.claim(&rival, &id),
            );
            let wins = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
            assert_eq!(wins, 1);

            let stored = f.service.orders().find_by_id(&id).await.unwrap().unwrap();
            let winner = if a.is_ok() { &f.contractor } else { &rival };
            assert_eq!(stored.contractor.unwrap().to_string(), winner.id);
        }
    }
}
