use hdk::prelude::*;
use orders_integrity::*;

pub mod classify;
pub mod config;
pub mod order;
pub mod slots;

use classify::OrderBuckets;
use order::{OrderWithHash, PlaceOrderInput, UpdateOrderStatusInput};
use slots::{DeliverySlots, GetDeliverySlotsInput};

// Called the first time a zome call is made to the cell containing this zome
#[hdk_extern]
pub fn init() -> ExternResult<InitCallbackResult> {
    // Refuse to start with delivery hours that cannot produce slots
    match config::orders_properties() {
        Ok(properties) => {
            debug!(
                "[init] Delivery hours {}:00-{}:00, UTC offset {} minutes",
                properties.opens_at, properties.closes_at, properties.utc_offset_minutes
            );
            Ok(InitCallbackResult::Pass)
        }
        Err(e) => {
            error!("[init] Bad DNA properties: {:?}", e);
            Ok(InitCallbackResult::Fail(format!("{:?}", e)))
        }
    }
}

// Bookable delivery slots for today or tomorrow
#[hdk_extern]
pub fn get_delivery_slots(input: GetDeliverySlotsInput) -> ExternResult<DeliverySlots> {
    slots::get_delivery_slots_impl(input)
}

// Caller's orders split into same day, other, scheduled and history
#[hdk_extern]
pub fn get_order_buckets(_: ()) -> ExternResult<OrderBuckets<OrderWithHash>> {
    order::get_order_buckets_impl()
}

// Check out a cart as a new order
#[hdk_extern]
pub fn place_order(input: PlaceOrderInput) -> ExternResult<ActionHash> {
    order::place_order_impl(input)
}

#[hdk_extern]
pub fn get_order(order_hash: ActionHash) -> ExternResult<Option<Order>> {
    order::get_order_impl(order_hash)
}

#[hdk_extern]
pub fn get_orders(_: ()) -> ExternResult<Vec<OrderWithHash>> {
    order::get_orders_impl()
}

// Move an order along its lifecycle (store and courier side)
#[hdk_extern]
pub fn update_order_status(input: UpdateOrderStatusInput) -> ExternResult<ActionHash> {
    order::update_order_status_impl(input)
}

#[hdk_extern]
pub fn cancel_order(order_hash: ActionHash) -> ExternResult<ActionHash> {
    order::cancel_order_impl(order_hash)
}
