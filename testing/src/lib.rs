//! # CircuitLend Testing
//!
//! Testing utilities and helpers for the CircuitLend lending core.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - Fixtures for requesters and the demo catalog
//! - A Given-When-Then harness for controller scenarios
//!
//! ## Example
//!
//! ```
//! use circuitlend_core::{ItemId, SubmitOptions};
//! use circuitlend_testing::{ControllerTest, fixtures};
//!
//! ControllerTest::new()
//!     .given_stock([("Breadboard", 10)])
//!     .given_signed_in(fixtures::theresa())
//!     .given_cart(["Breadboard"])
//!     .when(|controller| controller.submit(SubmitOptions::new()))
//!     .then_result(|result| assert!(result.is_ok()))
//!     .then_controller(|controller| {
//!         assert_eq!(controller.availability_of(&ItemId::from("Breadboard")), 9);
//!     })
//!     .run();
//! ```

pub mod controller_test;

use chrono::{DateTime, Utc};
use circuitlend_core::environment::Clock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use circuitlend_core::{IdentityProvider, Reminder, ReminderStore, Requester, StoreError};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use circuitlend_testing::mocks::FixedClock;
    /// use circuitlend_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2026-01-05 08:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2026-01-05T08:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Reminder store that records every call and can be told to fail
    #[derive(Debug, Default)]
    pub struct RecordingReminderStore {
        saved: Mutex<Vec<Reminder>>,
        failing: AtomicBool,
    }

    impl RecordingReminderStore {
        /// Create an empty, working store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Make subsequent `save` calls fail (or succeed again)
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Number of reminders stored so far
        #[must_use]
        pub fn saved_count(&self) -> usize {
            self.list().len()
        }
    }

    impl ReminderStore for RecordingReminderStore {
        fn save(&self, reminder: Reminder) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Persist("disk full".to_string()));
            }
            self.saved
                .lock()
                .map_err(|_| StoreError::Persist("lock poisoned".to_string()))?
                .push(reminder);
            Ok(())
        }

        fn list(&self) -> Vec<Reminder> {
            self.saved
                .lock()
                .map(|saved| saved.clone())
                .unwrap_or_default()
        }
    }

    /// Identity provider over a fixed set of accounts.
    ///
    /// Accounts are found by email or student id. An account registered
    /// without a secret accepts any login that omits one.
    #[derive(Debug, Default)]
    pub struct StaticIdentityProvider {
        accounts: Vec<(Requester, Option<String>)>,
        by_identifier: HashMap<String, usize>,
    }

    impl StaticIdentityProvider {
        /// Create a provider with no accounts
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Register an account
        #[must_use]
        pub fn with_account(mut self, requester: Requester, secret: Option<&str>) -> Self {
            let index = self.accounts.len();
            for identifier in [&requester.email, &requester.student_id] {
                if !identifier.is_empty() {
                    self.by_identifier.insert(identifier.clone(), index);
                }
            }
            self.accounts.push((requester, secret.map(str::to_string)));
            self
        }
    }

    impl IdentityProvider for StaticIdentityProvider {
        fn authenticate(&self, identifier: &str, secret: Option<&str>) -> Option<Requester> {
            let (requester, expected) = self.accounts.get(*self.by_identifier.get(identifier)?)?;
            match (expected.as_deref(), secret) {
                (_, None) => Some(requester.clone()),
                (Some(expected), Some(given)) if expected == given => Some(requester.clone()),
                _ => None,
            }
        }
    }
}

/// Fixtures shared by tests and demos
pub mod fixtures {
    use super::mocks::{RecordingReminderStore, test_clock};
    use circuitlend_core::{LendingEnvironment, Requester, StaticCatalog};
    use std::sync::Arc;

    /// A requester with every identity field set
    #[must_use]
    pub fn theresa() -> Requester {
        Requester::new("Theresa", "2026-00001", "theresa@school.edu")
    }

    /// A requester registered without an email
    #[must_use]
    pub fn juan() -> Requester {
        Requester::new("Juan", "2026-12345", "")
    }

    /// The electronics-lab catalog with its starting stock
    #[must_use]
    pub fn lab_catalog() -> StaticCatalog {
        StaticCatalog::new([
            ("Breadboard", 10),
            ("DC Power Supply", 15),
            ("AC Power Supply", 15),
            ("Digital Multimeter", 10),
            ("AC Ammeter", 10),
            ("AC Voltmeter", 10),
            ("Analog Multimeter", 10),
            ("Resistors (10 Ω – 1 kΩ)", 100),
            ("Potentiometer", 10),
            ("Capacitors (0.1 µF – 100 µF)", 40),
            ("Inductors (10 mH – 1.389 H)", 10),
            ("Connecting Wires", 100),
            ("Alligator Clips", 10),
            ("Switches", 10),
        ])
    }

    /// Environment with the fixed test clock and a recording reminder store.
    ///
    /// The store is returned alongside so tests can inspect it.
    #[must_use]
    pub fn test_environment() -> (LendingEnvironment, Arc<RecordingReminderStore>) {
        let store = Arc::new(RecordingReminderStore::new());
        let env = LendingEnvironment::new(Arc::new(test_clock()), store.clone());
        (env, store)
    }
}

/// Installs a test-friendly tracing subscriber once per process.
///
/// Honours `RUST_LOG`; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use controller_test::ControllerTest;
pub use mocks::{FixedClock, RecordingReminderStore, StaticIdentityProvider, test_clock};
