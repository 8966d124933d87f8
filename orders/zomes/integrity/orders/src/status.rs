use hdi::prelude::*;

/// Every status an order can be stored with, including the internal ones the
/// store and the delivery partner use.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PaymentPending,
    Placed,
    Confirmed,
    Preparing,
    Packed,
    ReadyForDispatch,
    OutForDelivery,
    DeliveryAttempted,
    Delivered,
    Cancelled,
    Refunded,
}

/// The six statuses shown to customers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Placed,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl CustomerStatus {
    pub fn is_current(&self) -> bool {
        !matches!(self, CustomerStatus::Delivered | CustomerStatus::Cancelled)
    }
}

impl OrderStatus {
    /// Raw statuses that put an order on the History tab.
    pub fn is_history(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    fn stage(&self) -> u8 {
        match self {
            OrderStatus::PaymentPending => 0,
            OrderStatus::Placed => 1,
            OrderStatus::Confirmed => 2,
            OrderStatus::Preparing => 3,
            OrderStatus::Packed => 4,
            OrderStatus::ReadyForDispatch => 5,
            OrderStatus::OutForDelivery => 6,
            OrderStatus::DeliveryAttempted => 7,
            OrderStatus::Delivered => 8,
            OrderStatus::Cancelled | OrderStatus::Refunded => 9,
        }
    }

    /// Whether an order may move from `self` to `next`.
    ///
    /// Orders only move forward, except that a failed attempt can go back out
    /// for delivery. Any open order can be cancelled; delivered and cancelled
    /// orders can only be refunded, and a refund is final.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (*self, next) {
            (Refunded, _) => false,
            (Delivered | Cancelled, Refunded) => true,
            (Delivered | Cancelled, _) => false,
            (_, Refunded) => false,
            (_, Cancelled) => true,
            (DeliveryAttempted, OutForDelivery) => true,
            (current, next) => next.stage() > current.stage(),
        }
    }
}

/// Reduces stored statuses to what the customer is shown.
pub trait StatusMapper {
    fn customer_status(&self, status: OrderStatus) -> CustomerStatus;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardStatusMapper;

impl StatusMapper for StandardStatusMapper {
    fn customer_status(&self, status: OrderStatus) -> CustomerStatus {
        match status {
            OrderStatus::PaymentPending | OrderStatus::Placed => CustomerStatus::Placed,
            OrderStatus::Confirmed => CustomerStatus::Confirmed,
            OrderStatus::Preparing | OrderStatus::Packed | OrderStatus::ReadyForDispatch => {
                CustomerStatus::Preparing
            }
            OrderStatus::OutForDelivery | OrderStatus::DeliveryAttempted => {
                CustomerStatus::OutForDelivery
            }
            OrderStatus::Delivered => CustomerStatus::Delivered,
            OrderStatus::Cancelled | OrderStatus::Refunded => CustomerStatus::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(OrderStatus::PaymentPending, CustomerStatus::Placed)]
    #[test_case(OrderStatus::Packed, CustomerStatus::Preparing)]
    #[test_case(OrderStatus::ReadyForDispatch, CustomerStatus::Preparing)]
    #[test_case(OrderStatus::DeliveryAttempted, CustomerStatus::OutForDelivery)]
    #[test_case(OrderStatus::Refunded, CustomerStatus::Cancelled)]
    #[test_case(OrderStatus::Delivered, CustomerStatus::Delivered)]
    fn internal_statuses_map_to_customer_statuses(raw: OrderStatus, shown: CustomerStatus) {
        assert_eq!(StandardStatusMapper.customer_status(raw), shown);
    }

    #[test]
    fn refunded_is_not_history_but_maps_to_a_closed_status() {
        let shown = StandardStatusMapper.customer_status(OrderStatus::Refunded);
        assert!(!shown.is_current());
        assert!(!OrderStatus::Refunded.is_history());
    }

    #[test_case(OrderStatus::Placed, OrderStatus::Confirmed, true ; "forward")]
    #[test_case(OrderStatus::Placed, OrderStatus::Cancelled, true ; "cancel open order")]
    #[test_case(OrderStatus::PaymentPending, OrderStatus::Placed, true ; "payment cleared")]
    #[test_case(OrderStatus::Preparing, OrderStatus::Confirmed, false ; "backwards")]
    #[test_case(OrderStatus::Placed, OrderStatus::Placed, false ; "same status")]
    #[test_case(OrderStatus::DeliveryAttempted, OrderStatus::OutForDelivery, true ; "retry delivery")]
    #[test_case(OrderStatus::Cancelled, OrderStatus::Placed, false ; "reopen cancelled")]
    #[test_case(OrderStatus::Delivered, OrderStatus::Cancelled, false ; "cancel delivered")]
    #[test_case(OrderStatus::Cancelled, OrderStatus::Refunded, true ; "refund cancelled")]
    #[test_case(OrderStatus::Confirmed, OrderStatus::Refunded, false ; "refund open order")]
    #[test_case(OrderStatus::Refunded, OrderStatus::Delivered, false ; "refund is final")]
    fn transitions(from: OrderStatus, to: OrderStatus, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }
}
