use hdi::prelude::*;

use crate::properties::{delivery_window, installed_properties, OrdersProperties};
use crate::slot::{DeliveryWindow, TimeSlot};
use crate::status::OrderStatus;

pub const SAME_DAY_TAG: &str = "SAME_DAY";
pub const SCHEDULE_TAG: &str = "SCHEDULE";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryType {
    SameDay,
    Scheduled,
    Other,
}

impl DeliveryType {
    // Unknown or missing tags fall back to Other
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some(SAME_DAY_TAG) => DeliveryType::SameDay,
            Some(SCHEDULE_TAG) => DeliveryType::Scheduled,
            _ => DeliveryType::Other,
        }
    }
}

// Snapshot of a product at checkout
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: f64,
}

impl OrderLine {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * self.quantity
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduledDelivery {
    pub date: u64,          // Microseconds at the start of the local delivery day
    pub slot_label: String, // A TimeSlot stored label, e.g. "11:00 AM"
}

impl ScheduledDelivery {
    pub fn slot(&self) -> Option<TimeSlot> {
        TimeSlot::from_stored_label(&self.slot_label)
    }
}

#[hdk_entry_helper]
#[derive(Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub created_at: u64,
    pub order_status: OrderStatus,
    pub delivery_type: Option<String>, // "SAME_DAY", "SCHEDULE" or anything else
    pub total_price: f64,
    pub products: Vec<OrderLine>,
    pub scheduled_delivery: Option<ScheduledDelivery>,
    pub customer_pub_key: AgentPubKey,
}

impl Order {
    pub fn delivery(&self) -> DeliveryType {
        DeliveryType::from_tag(self.delivery_type.as_deref())
    }
}

impl AsRef<Order> for Order {
    fn as_ref(&self) -> &Order {
        self
    }
}

/// Checks a freshly placed order, independent of who authored it.
pub fn check_new_order(order: &Order, window: &DeliveryWindow) -> Result<(), String> {
    if order.id.trim().is_empty() {
        return Err("Order id cannot be empty".into());
    }
    if !order.total_price.is_finite() || order.total_price < 0.0 {
        return Err("Order total must be a non-negative amount".into());
    }
    if order.products.is_empty() {
        return Err("Order must contain at least one product".into());
    }
    if order
        .products
        .iter()
        .any(|line| !(line.quantity > 0.0) || !(line.unit_price >= 0.0))
    {
        return Err("Order lines need a positive quantity and a non-negative price".into());
    }
    if !matches!(
        order.order_status,
        OrderStatus::Placed | OrderStatus::PaymentPending
    ) {
        return Err(format!(
            "New orders must start as PLACED or PAYMENT_PENDING, got {:?}",
            order.order_status
        ));
    }
    check_scheduled_delivery(order, window)
}

fn check_scheduled_delivery(order: &Order, window: &DeliveryWindow) -> Result<(), String> {
    match (order.delivery(), &order.scheduled_delivery) {
        (DeliveryType::Scheduled, None) => {
            Err("Scheduled orders must carry a delivery slot".into())
        }
        (_, Some(scheduled)) => {
            let slot = scheduled
                .slot()
                .ok_or_else(|| format!("Unreadable delivery slot '{}'", scheduled.slot_label))?;
            if !window.contains(&slot) {
                return Err(format!(
                    "Delivery slot '{}' is outside delivery hours",
                    scheduled.slot_label
                ));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

// Only the status moves, and only along a legal transition
pub fn check_order_update(original: &Order, updated: &Order) -> Result<(), String> {
    if updated.id != original.id
        || updated.created_at != original.created_at
        || updated.customer_pub_key != original.customer_pub_key
        || updated.products != original.products
        || updated.delivery_type != original.delivery_type
        || updated.scheduled_delivery != original.scheduled_delivery
    {
        return Err("Only the status of an order can change".into());
    }
    if updated.total_price != original.total_price {
        return Err("Order total cannot change".into());
    }
    if !original.order_status.can_transition_to(updated.order_status) {
        return Err(format!(
            "Order cannot move from {:?} to {:?}",
            original.order_status, updated.order_status
        ));
    }
    Ok(())
}

/// Who may change an order: the store admin may make any move, the customer
/// may only cancel.
pub fn check_update_author(
    author: &AgentPubKey,
    properties: &OrdersProperties,
    original: &Order,
    updated: &Order,
) -> Result<(), String> {
    if properties.is_admin(author) {
        return Ok(());
    }
    if *author != original.customer_pub_key {
        return Err("Only the store or the customer can change an order".into());
    }
    if updated.order_status != OrderStatus::Cancelled {
        return Err(format!(
            "Customers can only cancel their orders, not move them to {:?}",
            updated.order_status
        ));
    }
    Ok(())
}

pub fn validate_create_order(
    action: EntryCreationAction,
    order: Order,
) -> ExternResult<ValidateCallbackResult> {
    // Updates are checked against their author in validate_update_order
    if let EntryCreationAction::Create(create) = &action {
        if create.author != order.customer_pub_key {
            return Ok(ValidateCallbackResult::Invalid(
                "Orders can only be placed by their customer".into(),
            ));
        }
        if let Err(reason) = check_new_order(&order, &delivery_window()?) {
            return Ok(ValidateCallbackResult::Invalid(reason));
        }
    }
    Ok(ValidateCallbackResult::Valid)
}

pub fn validate_update_order(
    action: Update,
    order: Order,
    _original_action: EntryCreationAction,
    original_order: Order,
) -> ExternResult<ValidateCallbackResult> {
    let properties = installed_properties()?;
    let checked = check_update_author(&action.author, &properties, &original_order, &order)
        .and_then(|()| check_order_update(&original_order, &order));
    match checked {
        Ok(()) => Ok(ValidateCallbackResult::Valid),
        Err(reason) => Ok(ValidateCallbackResult::Invalid(reason)),
    }
}

pub fn validate_delete_order(
    _action: Delete,
    _original_action: EntryCreationAction,
    _original_order: Order,
) -> ExternResult<ValidateCallbackResult> {
    Ok(ValidateCallbackResult::Invalid(
        "Orders cannot be deleted, cancel them instead".to_string(),
    ))
}
