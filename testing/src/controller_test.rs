//! Given-When-Then harness for controller scenarios
//!
//! Builds a [`LendingController`] from a stock table, a session and a cart,
//! runs one operation against it, then checks both what the operation
//! returned and what the controller looks like afterwards.

#![allow(clippy::module_name_repetitions)] // ControllerTest is the natural name

use circuitlend_core::{ItemId, Ledger, LendingConfig, LendingController, LendingEnvironment, Requester};

use crate::fixtures;

/// Setup step run against the controller before the operation under test
type Setup = Box<dyn FnOnce(&mut LendingController)>;

/// Type alias for result assertion functions
type ResultAssertion<T> = Box<dyn FnOnce(&T)>;

/// Type alias for controller assertion functions
type ControllerAssertion = Box<dyn FnOnce(&LendingController)>;

/// Fluent builder for the Given part of a scenario
///
/// # Example
///
/// ```
/// use circuitlend_core::{LendingError, SubmitOptions};
/// use circuitlend_testing::ControllerTest;
///
/// ControllerTest::new()
///     .given_stock([("Breadboard", 10)])
///     .given_cart(["Breadboard"])
///     .when(|controller| controller.submit(SubmitOptions::new()))
///     .then_result(|result| assert_eq!(*result, Err(LendingError::NotAuthenticated)))
///     .then_controller(|controller| assert_eq!(controller.cart_items().len(), 1))
///     .run();
/// ```
pub struct ControllerTest {
    stock: Vec<(ItemId, u32)>,
    environment: Option<LendingEnvironment>,
    config: LendingConfig,
    requester: Option<Requester>,
    cart: Vec<ItemId>,
    setup: Vec<Setup>,
}

impl Default for ControllerTest {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerTest {
    /// Start a scenario with no stock, nobody signed in and default config
    #[must_use]
    pub fn new() -> Self {
        Self {
            stock: Vec::new(),
            environment: None,
            config: LendingConfig::default(),
            requester: None,
            cart: Vec::new(),
            setup: Vec::new(),
        }
    }

    /// Set the environment (defaults to [`fixtures::test_environment`])
    #[must_use]
    pub fn with_env(mut self, env: LendingEnvironment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the controller config
    #[must_use]
    pub fn with_config(mut self, config: LendingConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the ledger (Given)
    #[must_use]
    pub fn given_stock<I, S>(mut self, stock: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<ItemId>,
    {
        self.stock
            .extend(stock.into_iter().map(|(item, count)| (item.into(), count)));
        self
    }

    /// Sign `requester` in before anything else happens (Given)
    #[must_use]
    pub fn given_signed_in(mut self, requester: Requester) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Put items in the cart through `add_to_cart` (Given)
    #[must_use]
    pub fn given_cart<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        self.cart.extend(items.into_iter().map(Into::into));
        self
    }

    /// Run an arbitrary preparation step after sign-in and cart setup (Given)
    #[must_use]
    pub fn given<F>(mut self, step: F) -> Self
    where
        F: FnOnce(&mut LendingController) + 'static,
    {
        self.setup.push(Box::new(step));
        self
    }

    /// Set the operation under test (When)
    #[must_use]
    pub fn when<T, F>(self, operation: F) -> ControllerScenario<T>
    where
        F: FnOnce(&mut LendingController) -> T + 'static,
    {
        ControllerScenario {
            given: self,
            operation: Box::new(operation),
            result_assertions: Vec::new(),
            controller_assertions: Vec::new(),
        }
    }

    #[allow(clippy::panic)] // Test code can panic
    fn build(self) -> LendingController {
        let ledger: Ledger = self.stock.into_iter().collect();
        let env = self
            .environment
            .unwrap_or_else(|| fixtures::test_environment().0);
        let mut controller = LendingController::new(ledger, env, self.config);

        if let Some(requester) = self.requester {
            controller.sign_in(requester);
        }
        for item in self.cart {
            if let Err(error) = controller.add_to_cart(item.clone()) {
                panic!("given_cart could not add {item}: {error}");
            }
        }
        for step in self.setup {
            step(&mut controller);
        }
        controller
    }
}

/// A scenario with its operation chosen, collecting Then assertions
pub struct ControllerScenario<T> {
    given: ControllerTest,
    operation: Box<dyn FnOnce(&mut LendingController) -> T>,
    result_assertions: Vec<ResultAssertion<T>>,
    controller_assertions: Vec<ControllerAssertion>,
}

impl<T> ControllerScenario<T> {
    /// Add an assertion about what the operation returned (Then)
    #[must_use]
    pub fn then_result<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&T) + 'static,
    {
        self.result_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the controller afterwards (Then)
    #[must_use]
    pub fn then_controller<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&LendingController) + 'static,
    {
        self.controller_assertions.push(Box::new(assertion));
        self
    }

    /// Run the scenario and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if a `given_cart` item cannot be added, or if any assertion
    /// fails.
    pub fn run(self) {
        let mut controller = self.given.build();

        let result = (self.operation)(&mut controller);

        for assertion in self.result_assertions {
            assertion(&result);
        }
        for assertion in self.controller_assertions {
            assertion(&controller);
        }
    }
}

/// Helper assertions for controller state
pub mod assertions {
    use circuitlend_core::{ItemId, LendingController, QueueDepths};

    /// Assert the available count of one item
    ///
    /// # Panics
    ///
    /// Panics if the count differs.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_stock(controller: &LendingController, item: &str, expected: u32) {
        let actual = controller.availability_of(&ItemId::from(item));
        assert_eq!(
            actual, expected,
            "Expected {expected} unit(s) of {item} in stock, but found {actual}"
        );
    }

    /// Assert both queue depths
    ///
    /// # Panics
    ///
    /// Panics if either depth differs.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_depths(controller: &LendingController, pending: usize, priority: usize) {
        assert_eq!(
            controller.queue_depths(),
            QueueDepths { pending, priority },
            "Unexpected queue depths"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use circuitlend_core::{LendingError, SubmitOptions};

    #[test]
    fn test_scenario_submit() {
        ControllerTest::new()
            .given_stock([("Breadboard", 10)])
            .given_signed_in(fixtures::theresa())
            .given_cart(["Breadboard"])
            .when(|controller| controller.submit(SubmitOptions::new()))
            .then_result(|result| {
                assert_eq!(result.as_ref().unwrap().depths.pending, 1);
            })
            .then_controller(|controller| {
                assertions::assert_stock(controller, "Breadboard", 9);
                assertions::assert_depths(controller, 1, 0);
            })
            .run();
    }

    #[test]
    fn test_given_steps_run_in_order() {
        ControllerTest::new()
            .given_stock([("Switches", 3)])
            .given_signed_in(fixtures::juan())
            .given(|controller| {
                controller.add_to_cart("Switches").unwrap();
                controller.submit(SubmitOptions::new()).unwrap();
            })
            .when(LendingController::undo)
            .then_result(|result| assert!(result.as_ref().is_ok_and(|o| !o.is_noop())))
            .then_controller(|controller| assertions::assert_stock(controller, "Switches", 3))
            .run();
    }

    #[test]
    #[should_panic(expected = "given_cart could not add")]
    fn test_given_cart_rejects_unknown_items() {
        ControllerTest::new()
            .given_cart(["Oscilloscope"])
            .when(|controller| controller.cart_items().len())
            .run();
    }

    #[test]
    fn test_without_session() {
        ControllerTest::new()
            .given_stock([("Switches", 1)])
            .when(|controller| controller.return_items(["Switches"]))
            .then_result(|result| assert_eq!(*result, Err(LendingError::NotAuthenticated)))
            .run();
    }
}
