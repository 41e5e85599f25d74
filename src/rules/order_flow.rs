use crate::entity::sea_orm_active_enums::OrderStatus;

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// pending -> confirmed -> shipped -> delivered, and any non-terminal
    /// state may be cancelled. Re-setting the current status is rejected.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Confirmed) | (Confirmed, Shipped) | (Shipped, Delivered) => true,
            (Pending | Confirmed | Shipped, Cancelled) => true,
            _ => false,
        }
    }
}
