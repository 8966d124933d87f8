use hdk::prelude::*;
use orders_integrity::*;
use std::collections::HashMap;

use crate::classify::{classify, OrderBuckets};
use crate::config::{is_admin, orders_properties};
use crate::slots::{check_bookable, LocalClock};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderWithHash {
    pub order_hash: ActionHash,
    pub order: Order,
}

impl AsRef<Order> for OrderWithHash {
    fn as_ref(&self) -> &Order {
        &self.order
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PlaceOrderInput {
    pub products: Vec<OrderLine>,
    pub delivery_type: Option<String>,
    pub scheduled_delivery: Option<ScheduledDelivery>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateOrderStatusInput {
    pub order_hash: ActionHash,
    pub status: OrderStatus,
}

pub(crate) fn place_order_impl(input: PlaceOrderInput) -> ExternResult<ActionHash> {
    let agent_pub_key = agent_info()?.agent_initial_pubkey;
    let now = sys_time()?.as_micros();

    if input.products.is_empty() {
        return Err(wasm_error!(WasmErrorInner::Guest(
            "Cart is empty".to_string()
        )));
    }

    let delivery = DeliveryType::from_tag(input.delivery_type.as_deref());
    let scheduled_delivery = match delivery {
        DeliveryType::Scheduled => {
            let scheduled = input.scheduled_delivery.ok_or_else(|| {
                wasm_error!(WasmErrorInner::Guest(
                    "Scheduled orders need a delivery slot".to_string()
                ))
            })?;
            // Slots are checked on the store's clock, as get_delivery_slots offers them
            let properties = orders_properties()?;
            let clock = LocalClock::at(now, properties.utc_offset_minutes);
            let slot = check_bookable(&properties.window(), &clock, &scheduled)
                .map_err(|e| wasm_error!(WasmErrorInner::Guest(e)))?;
            debug!(
                "[place_order] Booked slot {} on {}",
                slot.display_label, scheduled.date
            );
            Some(scheduled)
        }
        _ => {
            if input.scheduled_delivery.is_some() {
                debug!("[place_order] Ignoring delivery slot on a {:?} order", delivery);
            }
            None
        }
    };

    let order = Order {
        id: now.to_string(),
        created_at: now as u64,
        order_status: OrderStatus::Placed,
        delivery_type: input.delivery_type,
        total_price: input.products.iter().map(OrderLine::subtotal).sum(),
        products: input.products,
        scheduled_delivery,
        customer_pub_key: agent_pub_key.clone(),
    };
    warn!(
        "[place_order] Placing order {} with {} lines, total {}",
        order.id,
        order.products.len(),
        order.total_price
    );

    let order_hash = create_entry(EntryTypes::Order(order))?;
    create_link(
        agent_pub_key,
        order_hash.clone(),
        LinkTypes::AgentToOrder,
        LinkTag::new("customer"),
    )?;

    Ok(order_hash)
}

pub(crate) fn get_order_impl(order_hash: ActionHash) -> ExternResult<Option<Order>> {
    match get(order_hash, GetOptions::default())? {
        Some(record) => {
            let order: Order = record
                .entry()
                .to_app_option()
                .map_err(|e| {
                    wasm_error!(WasmErrorInner::Guest(format!(
                        "Failed to deserialize: {}",
                        e
                    )))
                })?
                .ok_or(wasm_error!(WasmErrorInner::Guest(
                    "Expected app entry".to_string()
                )))?;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}

// Follows updates to the newest version of an order
fn latest_order_hash(order_hash: ActionHash) -> ExternResult<Option<ActionHash>> {
    let mut latest_hash = order_hash;
    loop {
        let Some(details) = get_details(latest_hash.clone(), GetOptions::default())? else {
            return Ok(None);
        };
        let Details::Record(record_details) = details else {
            return Err(wasm_error!(WasmErrorInner::Guest(
                "Order hash does not point at a record".to_string()
            )));
        };
        match record_details
            .updates
            .iter()
            .max_by_key(|update| update.action().timestamp())
        {
            Some(update) => latest_hash = update.action_address().clone(),
            None => return Ok(Some(latest_hash)),
        }
    }
}

pub(crate) fn get_latest_order(order_hash: ActionHash) -> ExternResult<Option<OrderWithHash>> {
    let Some(latest_hash) = latest_order_hash(order_hash)? else {
        return Ok(None);
    };
    Ok(get_order_impl(latest_hash.clone())?.map(|order| OrderWithHash {
        order_hash: latest_hash,
        order,
    }))
}

/// Keeps one version per order id. Of two versions, the one the other can
/// move to wins, so a stale link never shows an order twice.
pub fn latest_versions(orders: Vec<OrderWithHash>) -> Vec<OrderWithHash> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut latest: Vec<OrderWithHash> = Vec::with_capacity(orders.len());
    for candidate in orders {
        match positions.get(&candidate.order.id) {
            Some(&position) => {
                let kept = &mut latest[position];
                if kept
                    .order
                    .order_status
                    .can_transition_to(candidate.order.order_status)
                {
                    *kept = candidate;
                }
            }
            None => {
                positions.insert(candidate.order.id.clone(), latest.len());
                latest.push(candidate);
            }
        }
    }
    latest
}

// Caller's orders, newest first
pub(crate) fn get_orders_impl() -> ExternResult<Vec<OrderWithHash>> {
    let agent_pub_key = agent_info()?.agent_initial_pubkey;

    let links = get_links(
        GetLinksInputBuilder::try_new(agent_pub_key, LinkTypes::AgentToOrder)?.build(),
    )?;
    debug!("[get_orders] Found {} order links", links.len());

    let mut orders = Vec::new();
    for link in links {
        let Some(order_hash) = link.target.clone().into_action_hash() else {
            warn!("[get_orders] Link target is not an ActionHash: {:?}", link.target);
            continue;
        };
        match get_latest_order(order_hash.clone())? {
            Some(order) => orders.push(order),
            None => warn!("[get_orders] Could not retrieve order {:?}", order_hash),
        }
    }

    let linked = orders.len();
    let mut orders = latest_versions(orders);
    if orders.len() < linked {
        warn!(
            "[get_orders] {} links pointed at older versions of an order",
            linked - orders.len()
        );
    }

    orders.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
    Ok(orders)
}

pub(crate) fn get_order_buckets_impl() -> ExternResult<OrderBuckets<OrderWithHash>> {
    let orders = get_orders_impl()?;
    let total = orders.len();

    let buckets = classify(orders, &StandardStatusMapper);
    let dropped = total - buckets.len();
    if dropped > 0 {
        warn!(
            "[get_order_buckets] {} orders fit no bucket, leaving them out",
            dropped
        );
    }
    debug!("[get_order_buckets] {} orders, {} dropped", total, dropped);
    Ok(buckets)
}

/// Checks a status change asked for on `order_hash` against the newest
/// version of the order. Changes to an older version are refused.
pub fn check_status_change(
    order_hash: &ActionHash,
    latest: &OrderWithHash,
    status: OrderStatus,
) -> Result<(), String> {
    if *order_hash != latest.order_hash {
        return Err(format!(
            "Order {} has a newer version, reload it and try again",
            latest.order.id
        ));
    }
    if !latest.order.order_status.can_transition_to(status) {
        return Err(format!(
            "Order {} cannot move from {:?} to {:?}",
            latest.order.id, latest.order.order_status, status
        ));
    }
    Ok(())
}

fn set_order_status(
    order_hash: ActionHash,
    latest: OrderWithHash,
    status: OrderStatus,
) -> ExternResult<ActionHash> {
    check_status_change(&order_hash, &latest, status)
        .map_err(|e| wasm_error!(WasmErrorInner::Guest(e)))?;

    let customer = latest.order.customer_pub_key.clone();
    let mut updated_order = latest.order;
    updated_order.order_status = status;
    let update_hash = update_entry(order_hash.clone(), updated_order)?;

    // Point the customer's link at the new version
    let links = get_links(
        GetLinksInputBuilder::try_new(customer.clone(), LinkTypes::AgentToOrder)?.build(),
    )?;
    let mut found_link = false;
    for link in links {
        if link.target.clone().into_action_hash() == Some(order_hash.clone()) {
            found_link = true;
            delete_link(link.create_link_hash)?;
        }
    }
    if !found_link {
        warn!("[set_order_status] No customer link found for order {:?}", order_hash);
    }

    create_link(
        customer,
        update_hash.clone(),
        LinkTypes::AgentToOrder,
        LinkTag::new("customer"),
    )?;
    Ok(update_hash)
}

pub(crate) fn update_order_status_impl(input: UpdateOrderStatusInput) -> ExternResult<ActionHash> {
    if !is_admin()? {
        return Err(wasm_error!(WasmErrorInner::Guest(
            "Only the store can update order status".to_string()
        )));
    }

    let latest = get_latest_order(input.order_hash.clone())?
        .ok_or(wasm_error!(WasmErrorInner::Guest("Order not found".to_string())))?;
    warn!(
        "[update_order_status] Order {}: {:?} -> {:?}",
        latest.order.id, latest.order.order_status, input.status
    );
    set_order_status(input.order_hash, latest, input.status)
}

pub(crate) fn cancel_order_impl(order_hash: ActionHash) -> ExternResult<ActionHash> {
    let agent_pub_key = agent_info()?.agent_initial_pubkey;
    let latest = get_latest_order(order_hash.clone())?
        .ok_or(wasm_error!(WasmErrorInner::Guest("Order not found".to_string())))?;

    if latest.order.customer_pub_key != agent_pub_key {
        return Err(wasm_error!(WasmErrorInner::Guest(
            "Order does not belong to this customer".to_string()
        )));
    }
    if !StandardStatusMapper
        .customer_status(latest.order.order_status)
        .is_current()
    {
        return Err(wasm_error!(WasmErrorInner::Guest(format!(
            "Order {} is already closed",
            latest.order.id
        ))));
    }

    warn!("[cancel_order] Customer cancelling order {}", latest.order.id);
    set_order_status(order_hash, latest, OrderStatus::Cancelled)
}
