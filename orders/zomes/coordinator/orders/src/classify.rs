use hdk::prelude::*;
use orders_integrity::*;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderBucket {
    SameDay,
    Other,
    Scheduled,
    History,
}

/// Orders split into the Current (same day + other), Scheduled and History tabs.
/// Each list is newest first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderBuckets<T> {
    pub same_day: Vec<T>,
    pub other: Vec<T>,
    pub scheduled: Vec<T>,
    pub history: Vec<T>,
}

impl<T> Default for OrderBuckets<T> {
    fn default() -> Self {
        Self {
            same_day: Vec::new(),
            other: Vec::new(),
            scheduled: Vec::new(),
            history: Vec::new(),
        }
    }
}

impl<T> OrderBuckets<T> {
    pub fn bucket(&self, bucket: OrderBucket) -> &[T] {
        match bucket {
            OrderBucket::SameDay => &self.same_day,
            OrderBucket::Other => &self.other,
            OrderBucket::Scheduled => &self.scheduled,
            OrderBucket::History => &self.history,
        }
    }

    fn bucket_mut(&mut self, bucket: OrderBucket) -> &mut Vec<T> {
        match bucket {
            OrderBucket::SameDay => &mut self.same_day,
            OrderBucket::Other => &mut self.other,
            OrderBucket::Scheduled => &mut self.scheduled,
            OrderBucket::History => &mut self.history,
        }
    }

    pub fn len(&self) -> usize {
        self.same_day.len() + self.other.len() + self.scheduled.len() + self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The bucket an order is shown in, if any.
///
/// History is decided on the stored status, current on the customer status.
/// An order whose customer status is closed while its stored status is not
/// DELIVERED or CANCELLED (a refund, say) is in no bucket.
pub fn bucket_of(order: &Order, mapper: &impl StatusMapper) -> Option<OrderBucket> {
    if order.order_status.is_history() {
        return Some(OrderBucket::History);
    }
    if !mapper.customer_status(order.order_status).is_current() {
        return None;
    }
    Some(match order.delivery() {
        DeliveryType::SameDay => OrderBucket::SameDay,
        DeliveryType::Scheduled => OrderBucket::Scheduled,
        DeliveryType::Other => OrderBucket::Other,
    })
}

pub fn classify<T, I>(orders: I, mapper: &impl StatusMapper) -> OrderBuckets<T>
where
    T: AsRef<Order>,
    I: IntoIterator<Item = T>,
{
    let mut buckets = OrderBuckets::default();
    for item in orders {
        if let Some(bucket) = bucket_of(item.as_ref(), mapper) {
            buckets.bucket_mut(bucket).push(item);
        }
    }

    for bucket in [
        &mut buckets.same_day,
        &mut buckets.other,
        &mut buckets.scheduled,
        &mut buckets.history,
    ] {
        // Stable, so equal timestamps keep their input order
        bucket.sort_by(|a, b| b.as_ref().created_at.cmp(&a.as_ref().created_at));
    }
    buckets
}
