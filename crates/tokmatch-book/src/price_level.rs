//! A single price level in the order book.
//!
//! Orders at the same price are kept in ascending `sequence` order in a
//! [`VecDeque`]: the front has the earliest sequence and is filled first.

use std::collections::VecDeque;

use tokmatch_types::{Order, OrderId};

/// A single price level containing all orders at that price.
///
/// The deque is ordered by ascending `sequence` — the front is the oldest
/// admission and carries the highest time priority. Insertion seeks the
/// correct position rather than assuming arrival order, so a level rebuilt
/// from persisted orders in arbitrary order ends up identical.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The price at this level.
    pub price: u64,
    /// Orders in time-priority order (front = earliest sequence).
    pub orders: VecDeque<Order>,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[must_use]
    pub fn new(price: u64) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
        }
    }

    /// Insert an order at its sequence position.
    ///
    /// In the live path new admissions always carry the largest sequence
    /// seen so far, so this is an O(1) append; during rehydration it walks
    /// back to the correct slot.
    pub fn insert(&mut self, order: Order) {
        let pos = self
            .orders
            .iter()
            .position(|o| o.sequence > order.sequence)
            .unwrap_or(self.orders.len());
        self.orders.insert(pos, order);
    }

    /// Remove and return the front (earliest sequence) order.
    pub fn pop_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    /// Peek at the front order without removing it.
    #[must_use]
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Mutable access to the front order.
    pub fn front_mut(&mut self) -> Option<&mut Order> {
        self.orders.front_mut()
    }

    /// Total remaining quantity across all orders at this level.
    #[must_use]
    pub fn total_remaining(&self) -> u64 {
        self.orders.iter().map(Order::remaining).sum()
    }

    /// Remove a specific order by ID. Returns the removed order, or `None`.
    pub fn remove_order(&mut self, order_id: &OrderId) -> Option<Order> {
        let pos = self.orders.iter().position(|o| o.id == *order_id)?;
        self.orders.remove(pos)
    }

    /// Find an order by ID.
    #[must_use]
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == *order_id)
    }

    /// Returns `true` if there are no orders at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }
}

#[cfg(test)]
mod tests {
    use tokmatch_types::Side;

    use super::*;

    fn make_order(price: u64, qty: u64, seq: u64) -> Order {
        Order::dummy(Side::Buy, price, qty, seq)
    }

    #[test]
    fn live_inserts_keep_fifo() {
        let mut level = PriceLevel::new(100);
        let o1 = make_order(100, 1, 0);
        let o2 = make_order(100, 1, 1);
        let id1 = o1.id;

        level.insert(o1);
        level.insert(o2);

        assert_eq!(level.len(), 2);
        let popped = level.pop_front().unwrap();
        assert_eq!(popped.id, id1, "earliest sequence should be first out");
        assert_eq!(level.len(), 1);
    }

    #[test]
    fn out_of_order_inserts_sort_by_sequence() {
        let mut level = PriceLevel::new(100);
        level.insert(make_order(100, 1, 5));
        level.insert(make_order(100, 1, 1));
        level.insert(make_order(100, 1, 3));

        let seqs: Vec<u64> = level.orders.iter().map(|o| o.sequence).collect();
        assert_eq!(seqs, vec![1, 3, 5]);
    }

    #[test]
    fn total_remaining_excludes_fills() {
        let mut level = PriceLevel::new(100);
        let mut partly = make_order(100, 5, 0);
        partly.apply_fill(2);
        level.insert(partly);
        level.insert(make_order(100, 3, 1));
        assert_eq!(level.total_remaining(), 6);
    }

    #[test]
    fn remove_order_by_id() {
        let mut level = PriceLevel::new(100);
        let o1 = make_order(100, 1, 0);
        let o2 = make_order(100, 1, 1);
        let target_id = o2.id;

        level.insert(o1);
        level.insert(o2);

        let removed = level.remove_order(&target_id);
        assert!(removed.is_some());
        assert_eq!(removed.unwrap().id, target_id);
        assert_eq!(level.len(), 1);
    }

    #[test]
    fn remove_nonexistent_order() {
        let mut level = PriceLevel::new(100);
        level.insert(make_order(100, 1, 0));
        assert!(level.remove_order(&OrderId::new()).is_none());
    }

    #[test]
    fn empty_level() {
        let level = PriceLevel::new(100);
        assert!(level.is_empty());
        assert_eq!(level.len(), 0);
        assert_eq!(level.total_remaining(), 0);
        assert!(level.front().is_none());
    }
}
