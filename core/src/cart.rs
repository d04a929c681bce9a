//! Capacity-bounded cart a requester fills before submitting.

use crate::error::CartError;
use crate::types::ItemId;

/// Default number of items a cart can hold
pub const DEFAULT_CART_CAPACITY: usize = 10;

/// Ordered, capacity-bounded list of selected items
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cart {
    capacity: usize,
    items: Vec<ItemId>,
}

impl Cart {
    /// Creates an empty cart holding at most `capacity` items
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Appends `item` at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Full`] if the cart already holds `capacity` items.
    pub fn add(&mut self, item: ItemId) -> Result<(), CartError> {
        if self.is_full() {
            return Err(CartError::Full {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes the first entry equal to `item`, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] if no entry matches.
    pub fn remove(&mut self, item: &ItemId) -> Result<(), CartError> {
        let Some(position) = self.items.iter().position(|entry| entry == item) else {
            return Err(CartError::NotFound(item.clone()));
        };
        self.items.remove(position);
        Ok(())
    }

    /// Snapshot of the current contents
    #[must_use]
    pub fn items(&self) -> Vec<ItemId> {
        self.items.clone()
    }

    /// Number of items in the cart
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another `add` would fail
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Maximum number of items
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CART_CAPACITY)
    }
}
