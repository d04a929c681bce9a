//! # CircuitLend Core
//!
//! Request lifecycle core for a small equipment-lending workflow.
//!
//! Users assemble a cart, submit borrow requests that are queued (FIFO or
//! priority-ordered), return items, and undo recent state-changing actions.
//!
//! ## Core Concepts
//!
//! - **Ledger**: authoritative per-item available-stock count, never negative
//! - **Cart**: capacity-bounded list of selected items
//! - **BorrowRequest**: immutable record built from a cart, with a priority
//!   class derived from its reason code
//! - **Dispatch queues**: FIFO for normal requests, stable min-heap for
//!   expedited ones
//! - **Undo stack**: LIFO log of compensating actions
//! - **History**: per-requester append-only log of submissions
//! - **Environment**: injected collaborators (clock, reminder store, catalog,
//!   identity provider)
//!
//! ## Example
//!
//! ```
//! use circuitlend_core::{
//!     ItemId, LendingConfig, LendingController, LendingEnvironment, Requester,
//!     StaticCatalog, SubmitOptions,
//! };
//!
//! let catalog = StaticCatalog::new([("Breadboard", 10)]);
//! let mut controller = LendingController::from_catalog(
//!     &catalog,
//!     LendingEnvironment::default(),
//!     LendingConfig::default(),
//! );
//!
//! controller.sign_in(Requester::new("Theresa", "2026-00001", "theresa@school.edu"));
//! controller.add_to_cart("Breadboard")?;
//! let receipt = controller.submit(SubmitOptions::new())?;
//! assert_eq!(receipt.depths.pending, 1);
//! assert_eq!(controller.availability_of(&ItemId::from("Breadboard")), 9);
//!
//! controller.undo()?;
//! assert_eq!(controller.availability_of(&ItemId::from("Breadboard")), 10);
//! # Ok::<(), circuitlend_core::LendingError>(())
//! ```

pub mod cart;
pub mod config;
pub mod controller;
pub mod environment;
pub mod error;
pub mod history;
pub mod ledger;
pub mod metrics;
pub mod queue;
pub mod request;
pub mod types;
pub mod undo;

// Re-export commonly used types
pub use cart::{Cart, DEFAULT_CART_CAPACITY};
pub use config::LendingConfig;
pub use controller::{
    BorrowPhase, LendingController, QueueDepths, Receipt, ReturnReceipt, SortKey, SubmitOptions,
    SubmitReceipt, UndoOutcome,
};
pub use environment::{
    Catalog, Clock, IdentityProvider, InMemoryReminderStore, LendingEnvironment, Reminder,
    ReminderStore, StaticCatalog, SystemClock,
};
pub use error::{CartError, LedgerError, LendingError, StoreError};
pub use history::{HistoryBook, HistoryLog};
pub use ledger::{Ledger, SharedLedger};
pub use queue::{FifoQueue, PriorityQueue};
pub use request::{BorrowRequest, RequestBuilder};
pub use types::{ItemId, ItemList, PriorityClass, ReasonCode, RequestId, Requester, RequesterKey};
pub use undo::{UndoRecord, UndoStack};
