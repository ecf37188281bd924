//! The order board: outstanding customer requests in arrival order.

use serde::{Deserialize, Serialize};

use crate::ids::{CustomerId, StaffId};
use crate::recipes::Recipe;

/// One customer's request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub customer: CustomerId,
    pub item: Recipe,
    /// Cook currently producing for this order.
    pub claimed_by: Option<StaffId>,
}

/// FIFO list of open orders, at most one per customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBoard {
    orders: Vec<Order>,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post an order. Returns false if the customer already has one.
    pub fn post(&mut self, customer: CustomerId, item: Recipe) -> bool {
        if self.contains(customer) {
            return false;
        }
        self.orders.push(Order {
            customer,
            item,
            claimed_by: None,
        });
        true
    }

    pub fn remove(&mut self, customer: CustomerId) -> Option<Order> {
        let idx = self.orders.iter().position(|o| o.customer == customer)?;
        Some(self.orders.remove(idx))
    }

    pub fn get(&self, customer: CustomerId) -> Option<&Order> {
        self.orders.iter().find(|o| o.customer == customer)
    }

    pub fn contains(&self, customer: CustomerId) -> bool {
        self.get(customer).is_some()
    }

    /// Mark an unclaimed order as being cooked by `staff`.
    pub fn claim(&mut self, customer: CustomerId, staff: StaffId) -> bool {
        match self.orders.iter_mut().find(|o| o.customer == customer) {
            Some(order) if order.claimed_by.is_none() => {
                order.claimed_by = Some(staff);
                true
            }
            _ => false,
        }
    }

    /// Clear the claim on an order if `staff` holds it.
    pub fn release_claim(&mut self, customer: CustomerId, staff: StaffId) {
        if let Some(order) = self.orders.iter_mut().find(|o| o.customer == customer) {
            if order.claimed_by == Some(staff) {
                order.claimed_by = None;
            }
        }
    }

    /// Clear every claim held by `staff`.
    pub fn release_claims_of(&mut self, staff: StaffId) {
        for order in &mut self.orders {
            if order.claimed_by == Some(staff) {
                order.claimed_by = None;
            }
        }
    }

    /// Open orders for `item`, claimed or not.
    pub fn demand_for(&self, item: Recipe) -> usize {
        self.orders.iter().filter(|o| o.item == item).count()
    }

    /// Orders in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_order_per_customer() {
        let mut board = OrderBoard::new();
        assert!(board.post(CustomerId(1), Recipe::Burger));
        assert!(!board.post(CustomerId(1), Recipe::Pizza));
        assert_eq!(board.len(), 1);
        assert_eq!(board.get(CustomerId(1)).unwrap().item, Recipe::Burger);
    }

    #[test]
    fn test_fifo_order() {
        let mut board = OrderBoard::new();
        board.post(CustomerId(3), Recipe::Soda);
        board.post(CustomerId(1), Recipe::Burger);
        board.post(CustomerId(2), Recipe::Burger);
        let ids: Vec<_> = board.iter().map(|o| o.customer).collect();
        assert_eq!(ids, vec![CustomerId(3), CustomerId(1), CustomerId(2)]);

        board.remove(CustomerId(1));
        let ids: Vec<_> = board.iter().map(|o| o.customer).collect();
        assert_eq!(ids, vec![CustomerId(3), CustomerId(2)]);
        assert!(board.remove(CustomerId(1)).is_none());
    }

    #[test]
    fn test_claims() {
        let mut board = OrderBoard::new();
        board.post(CustomerId(1), Recipe::Burger);
        assert!(board.claim(CustomerId(1), StaffId(0)));
        assert!(!board.claim(CustomerId(1), StaffId(1)));

        board.release_claim(CustomerId(1), StaffId(1));
        assert_eq!(board.get(CustomerId(1)).unwrap().claimed_by, Some(StaffId(0)));

        board.release_claims_of(StaffId(0));
        assert_eq!(board.get(CustomerId(1)).unwrap().claimed_by, None);
        assert_eq!(board.demand_for(Recipe::Burger), 1);
        assert_eq!(board.demand_for(Recipe::Soda), 0);
    }
}
