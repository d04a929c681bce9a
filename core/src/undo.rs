//! LIFO log of compensating actions.

use std::sync::Arc;

use crate::request::BorrowRequest;
use crate::types::ItemList;

/// Compensation for one prior state change.
///
/// Created alongside the operation it reverses and consumed exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoRecord {
    /// Reverses a submission by returning its items to stock
    CancelBorrow {
        /// The submitted request
        request: Arc<BorrowRequest>,
    },
    /// Reverses a return by taking the items back out of stock
    RevertReturn {
        /// The returned items, one entry per unit
        items: ItemList,
    },
}

impl UndoRecord {
    /// Short label for logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CancelBorrow { .. } => "cancel_borrow",
            Self::RevertReturn { .. } => "revert_return",
        }
    }
}

/// Stack of undo records; only the most recent one is reachable
#[derive(Clone, Debug, Default)]
pub struct UndoStack {
    records: Vec<UndoRecord>,
}

impl UndoStack {
    /// Creates an empty stack
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Pushes a record on top
    pub fn push(&mut self, record: UndoRecord) {
        self.records.push(record);
    }

    /// Pops the most recent record; `None` means there is nothing to undo
    pub fn pop(&mut self) -> Option<UndoRecord> {
        self.records.pop()
    }

    /// Number of stacked records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the stack is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
