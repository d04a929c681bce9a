//! Lifecycle controller: orchestrates cart, ledger, queues, history and undo.
//!
//! Each operation checks all of its preconditions before it mutates anything,
//! so a rejected call leaves every structure exactly as it was.
//!
//! # Borrow flow
//!
//! ```text
//! Idle ──add_to_cart──▶ Building ──submit──▶ Validating ──▶ Committed
//!                                                     └───▶ Rejected
//! ```
//!
//! # Undo
//!
//! Undo is single-level. Cancelling a borrow puts its items back in stock but
//! leaves the request in its dispatch queue and in the requester's history.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::config::LendingConfig;
use crate::environment::{Catalog, IdentityProvider, LendingEnvironment, Reminder};
use crate::error::LendingError;
use crate::history::HistoryBook;
use crate::ledger::Ledger;
use crate::metrics;
use crate::queue::{FifoQueue, PriorityQueue};
use crate::request::BorrowRequest;
use crate::types::{ItemId, ItemList, ReasonCode, Requester};
use crate::undo::{UndoRecord, UndoStack};

// ============================================================================
// Inputs and outcomes
// ============================================================================

/// Where the current borrow flow stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorrowPhase {
    /// Nothing selected, nothing submitted yet
    Idle,
    /// Cart holds at least one item
    Building,
    /// Submission in progress
    Validating,
    /// Last submission was accepted
    Committed,
    /// Last submission was refused
    Rejected,
}

/// Options for [`LendingController::submit`].
///
/// Unset reason and deposit flag fall back to the controller's config.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Reason code driving the priority class
    pub reason: Option<ReasonCode>,
    /// Route to the priority queue instead of the FIFO queue
    pub prioritize: bool,
    /// Whether an ID card is left as deposit
    pub wants_id_deposit: Option<bool>,
    /// Borrow date, as entered
    pub borrow_date: Option<String>,
    /// Promised return date, as entered
    pub return_date: Option<String>,
}

impl SubmitOptions {
    /// Normal-priority options using config defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reason code
    #[must_use]
    pub fn reason(mut self, reason: impl Into<ReasonCode>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Routes the request to the priority queue
    #[must_use]
    pub const fn prioritize(mut self, prioritize: bool) -> Self {
        self.prioritize = prioritize;
        self
    }

    /// Sets the ID deposit flag
    #[must_use]
    pub const fn id_deposit(mut self, wants_id_deposit: bool) -> Self {
        self.wants_id_deposit = Some(wants_id_deposit);
        self
    }

    /// Sets borrow and return dates, which triggers a reminder
    #[must_use]
    pub fn dates(mut self, borrow_date: impl Into<String>, return_date: impl Into<String>) -> Self {
        self.borrow_date = Some(borrow_date.into());
        self.return_date = Some(return_date.into());
        self
    }
}

/// Number of requests waiting in each dispatch queue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueDepths {
    /// FIFO queue size
    pub pending: usize,
    /// Priority queue size
    pub priority: usize,
}

/// Result of an accepted submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// The committed request
    pub request: Arc<BorrowRequest>,
    /// Queue depths right after the request was enqueued
    pub depths: QueueDepths,
    /// `None` when no dates were given, otherwise whether the reminder was stored
    pub reminder_saved: Option<bool>,
}

impl fmt::Display for SubmitReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Submitted ({}). Pending: {} | Priority: {}",
            self.request.reason(),
            self.depths.pending,
            self.depths.priority
        )
    }
}

/// Result of a return
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReturnReceipt {
    /// Units put back in stock
    pub count: usize,
}

impl fmt::Display for ReturnReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Returned {} item(s).", self.count)
    }
}

/// Result of [`LendingController::undo`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The undo stack was empty; nothing changed
    NothingToUndo,
    /// A submission's items went back into stock
    BorrowCancelled {
        /// The request whose stock was restored
        request: Arc<BorrowRequest>,
    },
    /// A return's items were taken back out of stock
    ReturnReverted {
        /// The items that were reclaimed
        items: ItemList,
    },
}

impl UndoOutcome {
    /// Whether the call was a no-op
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::NothingToUndo)
    }
}

impl fmt::Display for UndoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToUndo => f.write_str("Nothing to undo."),
            Self::BorrowCancelled { .. } => f.write_str("Undo successful: borrow cancelled."),
            Self::ReturnReverted { .. } => f.write_str("Undo successful: return reverted."),
        }
    }
}

/// Structured receipt data; turning it into text is the caller's business
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Borrower display name
    pub borrower_name: String,
    /// Borrower student id
    pub student_id: String,
    /// Borrower email
    pub email: String,
    /// Borrowed items
    pub items: Vec<ItemId>,
    /// Borrow date, as entered
    pub borrow_date: String,
    /// Return date, as entered
    pub return_date: String,
    /// When the receipt was issued
    pub issued_at: DateTime<Utc>,
}

/// Ordering for [`LendingController::sorted_items`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Case-insensitive name, ascending
    #[default]
    Name,
    /// Available count, descending; ties by name rather than catalog order
    Availability,
}

// ============================================================================
// Controller
// ============================================================================

/// Single-session lifecycle controller
#[derive(Debug)]
pub struct LendingController {
    config: LendingConfig,
    env: LendingEnvironment,
    ledger: Ledger,
    cart: Cart,
    pending: FifoQueue<Arc<BorrowRequest>>,
    priority: PriorityQueue<Arc<BorrowRequest>>,
    undo: UndoStack,
    history: HistoryBook,
    session: Option<Requester>,
    phase: BorrowPhase,
}

impl LendingController {
    /// Creates a controller over an existing ledger
    #[must_use]
    pub fn new(ledger: Ledger, env: LendingEnvironment, config: LendingConfig) -> Self {
        let cart = Cart::with_capacity(config.cart_capacity);
        Self {
            config,
            env,
            ledger,
            cart,
            pending: FifoQueue::new(),
            priority: PriorityQueue::new(),
            undo: UndoStack::new(),
            history: HistoryBook::new(),
            session: None,
            phase: BorrowPhase::Idle,
        }
    }

    /// Creates a controller whose ledger is seeded from `catalog`
    #[must_use]
    pub fn from_catalog(catalog: &dyn Catalog, env: LendingEnvironment, config: LendingConfig) -> Self {
        Self::new(Ledger::seed(catalog), env, config)
    }

    // ---------------------------------------------------------------- session

    /// Makes `requester` the active session's user
    pub fn sign_in(&mut self, requester: Requester) {
        tracing::info!(requester = %requester.name, "Signed in");
        self.session = Some(requester);
    }

    /// Asks `provider` to authenticate and signs in on success.
    ///
    /// # Errors
    ///
    /// Returns [`LendingError::NotAuthenticated`] if the provider refuses.
    pub fn sign_in_with(
        &mut self,
        provider: &dyn IdentityProvider,
        identifier: &str,
        secret: Option<&str>,
    ) -> Result<&Requester, LendingError> {
        let Some(requester) = provider.authenticate(identifier, secret) else {
            tracing::warn!(identifier, "Login failed");
            return Err(self.reject(LendingError::NotAuthenticated));
        };
        self.sign_in(requester);
        self.require_requester()
    }

    /// Ends the session; cart, queues and history stay as they are
    pub fn sign_out(&mut self) {
        if let Some(requester) = self.session.take() {
            tracing::info!(requester = %requester.name, "Signed out");
        }
    }

    /// The signed-in requester, if any
    #[must_use]
    pub const fn current_requester(&self) -> Option<&Requester> {
        self.session.as_ref()
    }

    // ------------------------------------------------------------------- cart

    /// Adds a tracked, in-stock item to the cart.
    ///
    /// # Errors
    ///
    /// - [`LendingError::UnknownItem`] if the ledger does not track `item`
    /// - [`LendingError::Unavailable`] if its stock is zero
    /// - [`LendingError::CartFull`] if the cart is at capacity
    pub fn add_to_cart(&mut self, item: impl Into<ItemId>) -> Result<(), LendingError> {
        let item = item.into();
        if !self.ledger.contains(&item) {
            return Err(self.reject(LendingError::UnknownItem(item)));
        }
        if self.ledger.get(&item) == 0 {
            return Err(self.reject(LendingError::Unavailable(item)));
        }
        if let Err(error) = self.cart.add(item.clone()) {
            return Err(self.reject(error.into()));
        }

        tracing::debug!(item = %item, size = self.cart.len(), "Added to cart");
        self.phase = BorrowPhase::Building;
        Ok(())
    }

    /// Removes the first matching entry from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`LendingError::NotFound`] if the cart holds no such item.
    pub fn remove_from_cart(&mut self, item: &ItemId) -> Result<(), LendingError> {
        if let Err(error) = self.cart.remove(item) {
            return Err(self.reject(error.into()));
        }
        tracing::debug!(item = %item, size = self.cart.len(), "Removed from cart");
        self.phase = if self.cart.is_empty() {
            BorrowPhase::Idle
        } else {
            BorrowPhase::Building
        };
        Ok(())
    }

    /// Snapshot of the cart contents
    #[must_use]
    pub fn cart_items(&self) -> Vec<ItemId> {
        self.cart.items()
    }

    /// Current cart
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Where the borrow flow stands.
    ///
    /// A refused submission reports `Rejected` until the cart is next edited.
    #[must_use]
    pub const fn phase(&self) -> BorrowPhase {
        self.phase
    }

    // ----------------------------------------------------------------- submit

    /// Submits the cart as a borrow request.
    ///
    /// On success the ledger is decremented, the request is queued and logged
    /// in history, a `CancelBorrow` undo record is pushed and the cart is
    /// replaced with a fresh one.
    ///
    /// # Errors
    ///
    /// - [`LendingError::NotAuthenticated`] if nobody is signed in
    /// - [`LendingError::EmptyCart`] if the cart is empty
    /// - [`LendingError::OutOfStock`] if any unit cannot be reserved; cart,
    ///   ledger and queues are untouched
    #[tracing::instrument(skip(self, options), fields(prioritize = options.prioritize))]
    pub fn submit(&mut self, options: SubmitOptions) -> Result<SubmitReceipt, LendingError> {
        self.phase = BorrowPhase::Validating;

        let requester = match self.require_requester() {
            Ok(requester) => requester.clone(),
            Err(error) => return Err(self.reject_submission(error)),
        };
        let items = self.cart.items();
        if items.is_empty() {
            return Err(self.reject_submission(LendingError::EmptyCart));
        }
        if let Err(error) = self.ledger.reserve(&items) {
            return Err(self.reject_submission(error.into()));
        }

        let reason = options
            .reason
            .unwrap_or_else(|| self.config.default_reason.clone());
        let wants_id_deposit = options
            .wants_id_deposit
            .unwrap_or(self.config.id_deposit_default);
        let request = match BorrowRequest::builder(requester, items)
            .reason(reason)
            .id_deposit(wants_id_deposit)
            .build(self.env.clock.as_ref())
        {
            Ok(request) => Arc::new(request),
            Err(error) => {
                // Unreachable with a non-empty cart; give the stock back anyway.
                self.ledger.release(&self.cart.items());
                return Err(self.reject_submission(error));
            }
        };

        let queue = if options.prioritize {
            self.priority.push(request.priority(), Arc::clone(&request));
            "priority"
        } else {
            self.pending.enqueue(Arc::clone(&request));
            "pending"
        };
        tracing::debug!(
            request_id = %request.id(),
            queue,
            priority = %request.priority(),
            "Request routed"
        );

        self.history.append(Arc::clone(&request));
        self.undo.push(UndoRecord::CancelBorrow {
            request: Arc::clone(&request),
        });

        let reminder_saved = match (options.borrow_date, options.return_date) {
            (Some(borrow_date), Some(return_date)) => {
                Some(self.save_reminder(&request, borrow_date, return_date))
            }
            _ => None,
        };

        self.cart = Cart::with_capacity(self.config.cart_capacity);
        self.phase = BorrowPhase::Committed;

        let depths = self.queue_depths();
        metrics::record_submission(queue, depths.pending, depths.priority);
        tracing::info!(
            request_id = %request.id(),
            requester = %request.requester().name,
            items = request.items().len(),
            reason = %request.reason(),
            pending = depths.pending,
            priority = depths.priority,
            "Borrow request submitted"
        );

        Ok(SubmitReceipt {
            request,
            depths,
            reminder_saved,
        })
    }

    // ----------------------------------------------------------------- return

    /// Puts `items` back in stock, one unit per occurrence.
    ///
    /// # Errors
    ///
    /// - [`LendingError::NotAuthenticated`] if nobody is signed in
    /// - [`LendingError::UnknownItem`] for the first item the ledger does not
    ///   track; nothing is returned in that case
    #[tracing::instrument(skip_all)]
    pub fn return_items<I>(&mut self, items: I) -> Result<ReturnReceipt, LendingError>
    where
        I: IntoIterator,
        I::Item: Into<ItemId>,
    {
        if let Err(error) = self.require_requester() {
            return Err(self.reject(error));
        }

        let items: ItemList = items.into_iter().map(Into::into).collect();
        if let Some(unknown) = items.iter().find(|item| !self.ledger.contains(item)) {
            let error = LendingError::UnknownItem(unknown.clone());
            tracing::warn!(item = %unknown, "Return of an untracked item refused");
            return Err(self.reject(error));
        }
        self.ledger.release(&items);
        let count = items.len();
        self.undo.push(UndoRecord::RevertReturn { items });

        metrics::record_return(count);
        tracing::info!(count, "Items returned");
        Ok(ReturnReceipt { count })
    }

    // ------------------------------------------------------------------- undo

    /// Reverses the most recent submission or return.
    ///
    /// # Errors
    ///
    /// Returns [`LendingError::UnknownUndoAction`] if the popped record fails
    /// its consistency check. The record is discarded.
    pub fn undo(&mut self) -> Result<UndoOutcome, LendingError> {
        let Some(record) = self.undo.pop() else {
            tracing::debug!("Nothing to undo");
            return Ok(UndoOutcome::NothingToUndo);
        };
        let kind = record.kind();

        let outcome = match record {
            UndoRecord::CancelBorrow { request } => {
                if request.items().is_empty() {
                    tracing::error!(
                        request_id = %request.id(),
                        "Undo record for a request without items"
                    );
                    return Err(self.reject(LendingError::UnknownUndoAction));
                }
                self.ledger.release(request.items());
                UndoOutcome::BorrowCancelled { request }
            }
            UndoRecord::RevertReturn { items } => {
                self.ledger.reclaim(&items);
                UndoOutcome::ReturnReverted { items }
            }
        };

        metrics::record_undo(kind);
        tracing::info!(kind, "Undo applied");
        Ok(outcome)
    }

    /// Number of undo records waiting
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    // ---------------------------------------------------------------- history

    /// The signed-in requester's submissions, oldest first (empty if signed out)
    #[must_use]
    pub fn history(&self) -> Vec<Arc<BorrowRequest>> {
        self.session
            .as_ref()
            .map(|requester| self.history.list(requester))
            .unwrap_or_default()
    }

    /// Discards the signed-in requester's history.
    ///
    /// # Errors
    ///
    /// Returns [`LendingError::NotAuthenticated`] if nobody is signed in.
    pub fn clear_history(&mut self) -> Result<(), LendingError> {
        let requester = match self.require_requester() {
            Ok(requester) => requester.clone(),
            Err(error) => return Err(self.reject(error)),
        };
        self.history.clear(&requester);
        tracing::info!(requester = %requester.name, "Borrow history cleared");
        Ok(())
    }

    // -------------------------------------------------------------- reminders

    /// Every reminder known to the persistence collaborator
    #[must_use]
    pub fn reminders(&self) -> Vec<Reminder> {
        self.env.reminders.list()
    }

    /// Receipt data for the signed-in requester, or `None` if signed out
    #[must_use]
    pub fn receipt(
        &self,
        items: &[ItemId],
        borrow_date: impl Into<String>,
        return_date: impl Into<String>,
    ) -> Option<Receipt> {
        let requester = self.session.as_ref()?;
        Some(Receipt {
            borrower_name: requester.name.clone(),
            student_id: requester.student_id.clone(),
            email: requester.email.clone(),
            items: items.to_vec(),
            borrow_date: borrow_date.into(),
            return_date: return_date.into(),
            issued_at: self.env.clock.now(),
        })
    }

    // ---------------------------------------------------------------- catalog

    /// Available units of `item` (0 if unknown)
    #[must_use]
    pub fn availability_of(&self, item: &ItemId) -> u32 {
        self.ledger.get(item)
    }

    /// Read-only view of the ledger
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Items whose id contains `query`, ignoring case
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<ItemId> {
        let needle = query.to_lowercase();
        self.ledger
            .iter()
            .filter(|(item, _)| item.as_str().to_lowercase().contains(&needle))
            .map(|(item, _)| item.clone())
            .collect()
    }

    /// Every tracked item in the requested order
    #[must_use]
    pub fn sorted_items(&self, key: SortKey) -> Vec<ItemId> {
        let mut entries: Vec<(&ItemId, u32)> = self.ledger.iter().collect();
        match key {
            SortKey::Name => {
                entries.sort_by_cached_key(|(item, _)| item.as_str().to_lowercase());
            }
            SortKey::Availability => entries.sort_by(|(a, a_count), (b, b_count)| {
                b_count
                    .cmp(a_count)
                    .then_with(|| a.as_str().to_lowercase().cmp(&b.as_str().to_lowercase()))
            }),
        }
        entries.into_iter().map(|(item, _)| item.clone()).collect()
    }

    // --------------------------------------------------------------- dispatch

    /// Current depth of both dispatch queues
    #[must_use]
    pub fn queue_depths(&self) -> QueueDepths {
        QueueDepths {
            pending: self.pending.len(),
            priority: self.priority.len(),
        }
    }

    /// Takes the oldest normal request for processing
    pub fn next_pending(&mut self) -> Option<Arc<BorrowRequest>> {
        let request = self.pending.dequeue();
        self.record_depths();
        request
    }

    /// Takes the most urgent expedited request for processing
    pub fn next_priority(&mut self) -> Option<Arc<BorrowRequest>> {
        let request = self.priority.pop();
        self.record_depths();
        request
    }

    // ---------------------------------------------------------------- helpers

    fn require_requester(&self) -> Result<&Requester, LendingError> {
        self.session.as_ref().ok_or(LendingError::NotAuthenticated)
    }

    fn reject(&self, error: LendingError) -> LendingError {
        metrics::record_rejection(&error);
        tracing::debug!(error = %error, "Operation rejected");
        error
    }

    fn reject_submission(&mut self, error: LendingError) -> LendingError {
        self.phase = BorrowPhase::Rejected;
        metrics::record_rejection(&error);
        tracing::warn!(error = %error, "Borrow request rejected");
        error
    }

    fn save_reminder(&self, request: &BorrowRequest, borrow_date: String, return_date: String) -> bool {
        let reminder = Reminder {
            user: request.requester().name.clone(),
            items: request.items().to_vec(),
            borrow_date,
            return_date,
        };
        match self.env.reminders.save(reminder) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(request_id = %request.id(), error = %error, "Reminder not saved");
                false
            }
        }
    }

    fn record_depths(&self) {
        let depths = self.queue_depths();
        metrics::record_queue_depths(depths.pending, depths.priority);
    }
}
