//! Error types for the lending core.
//!
//! Every failure is recoverable and returned as a typed result. Normal no-op
//! outcomes such as "nothing to undo" are not errors and live in the
//! controller's outcome types instead.

use crate::types::ItemId;
use thiserror::Error;

/// Errors raised by the availability ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// At least one requested unit is not in stock
    #[error("Out of stock: {0}")]
    OutOfStock(ItemId),

    /// The shared ledger lock was poisoned by a panicking holder
    #[error("Ledger lock poisoned")]
    Poisoned,
}

/// Errors raised by the cart
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart already holds `capacity` items
    #[error("Cart full ({capacity} max).")]
    Full {
        /// Maximum number of items
        capacity: usize,
    },

    /// No entry matches the item being removed
    #[error("Item not found: {0}")]
    NotFound(ItemId),
}

/// Errors surfaced by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store rejected or failed to persist the record
    #[error("Failed to persist reminder: {0}")]
    Persist(String),
}

/// Errors returned by lifecycle controller operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LendingError {
    /// No requester is signed in
    #[error("Please log in first.")]
    NotAuthenticated,

    /// Submission attempted with nothing selected
    #[error("Cart is empty.")]
    EmptyCart,

    /// Reservation failed for the named item; nothing was changed
    #[error("Out of stock: {0}")]
    OutOfStock(ItemId),

    /// Cart capacity reached
    #[error("Cart full ({capacity} max).")]
    CartFull {
        /// Maximum number of items
        capacity: usize,
    },

    /// Cart removal found no matching entry
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// Item is not tracked by the ledger
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// Item is tracked but has no stock left
    #[error("Item unavailable: {0}")]
    Unavailable(ItemId),

    /// An undo record failed its consistency check
    #[error("Unknown undo action.")]
    UnknownUndoAction,

    /// The shared ledger lock was poisoned
    #[error("Ledger lock poisoned")]
    LedgerPoisoned,
}

impl From<LedgerError> for LendingError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::OutOfStock(item) => Self::OutOfStock(item),
            LedgerError::Poisoned => Self::LedgerPoisoned,
        }
    }
}

impl From<CartError> for LendingError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::Full { capacity } => Self::CartFull { capacity },
            CartError::NotFound(item) => Self::NotFound(item),
        }
    }
}

impl LendingError {
    /// Short stable label used for metrics and structured logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::EmptyCart => "empty_cart",
            Self::OutOfStock(_) => "out_of_stock",
            Self::CartFull { .. } => "cart_full",
            Self::NotFound(_) => "not_found",
            Self::UnknownItem(_) => "unknown_item",
            Self::Unavailable(_) => "unavailable",
            Self::UnknownUndoAction => "unknown_undo_action",
            Self::LedgerPoisoned => "ledger_poisoned",
        }
    }
}
