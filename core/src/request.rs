//! Borrow request records and the builder that produces them.
//!
//! Building a request is pure apart from reading the injected clock: it does
//! not touch the ledger, the queues or the history.

use crate::environment::Clock;
use crate::error::LendingError;
use crate::types::{ItemId, ItemList, PriorityClass, ReasonCode, RequestId, Requester};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Immutable borrow request.
///
/// Shared read-only between the dispatch queue that holds it and the
/// requester's history once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRequest {
    id: RequestId,
    requester: Requester,
    items: ItemList,
    reason: ReasonCode,
    priority: PriorityClass,
    wants_id_deposit: bool,
    created_at: DateTime<Utc>,
}

impl BorrowRequest {
    /// Starts building a request for `requester` covering `items`
    #[must_use]
    pub fn builder(requester: Requester, items: impl IntoIterator<Item = ItemId>) -> RequestBuilder {
        RequestBuilder::new(requester, items)
    }

    /// Unique request id
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Who asked for the items
    #[must_use]
    pub const fn requester(&self) -> &Requester {
        &self.requester
    }

    /// Requested items in cart order
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Reason given by the requester
    #[must_use]
    pub const fn reason(&self) -> &ReasonCode {
        &self.reason
    }

    /// Priority class derived from the reason
    #[must_use]
    pub const fn priority(&self) -> PriorityClass {
        self.priority
    }

    /// Whether the requester leaves an ID card as deposit
    #[must_use]
    pub const fn wants_id_deposit(&self) -> bool {
        self.wants_id_deposit
    }

    /// Creation time (UTC)
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Creation time rendered as RFC 3339 with microsecond precision
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// Builder for [`BorrowRequest`]
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    requester: Requester,
    items: ItemList,
    reason: ReasonCode,
    wants_id_deposit: bool,
}

impl RequestBuilder {
    /// Creates a builder with the default reason (`normal`) and an ID deposit
    #[must_use]
    pub fn new(requester: Requester, items: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            requester,
            items: items.into_iter().collect(),
            reason: ReasonCode::Normal,
            wants_id_deposit: true,
        }
    }

    /// Sets the reason code
    #[must_use]
    pub fn reason(mut self, reason: ReasonCode) -> Self {
        self.reason = reason;
        self
    }

    /// Sets whether an ID deposit is left
    #[must_use]
    pub const fn id_deposit(mut self, wants_id_deposit: bool) -> Self {
        self.wants_id_deposit = wants_id_deposit;
        self
    }

    /// Produces the immutable request, stamping it with `clock.now()`.
    ///
    /// # Errors
    ///
    /// Returns [`LendingError::EmptyCart`] if the item list is empty.
    pub fn build(self, clock: &dyn Clock) -> Result<BorrowRequest, LendingError> {
        if self.items.is_empty() {
            return Err(LendingError::EmptyCart);
        }

        let priority = self.reason.priority();
        Ok(BorrowRequest {
            id: RequestId::new(),
            requester: self.requester,
            items: self.items,
            reason: self.reason,
            priority,
            wants_id_deposit: self.wants_id_deposit,
            created_at: clock.now(),
        })
    }
}
