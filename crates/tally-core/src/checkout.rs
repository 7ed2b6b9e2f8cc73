//! # Checkout
//!
//! The lifecycle of a single checkout attempt.
//!
//! ```text
//!   Idle ──► Validating ──► Committing ──► Success
//!                │               │
//!                └──► Failed ◄───┘
//! ```
//!
//! An attempt is used once. `Failed` and `Success` are terminal; a new
//! checkout starts a new attempt. The commit itself (one store transaction)
//! happens outside this crate, between [`CheckoutAttempt::prepare`] and
//! [`CheckoutAttempt::succeed`] / [`CheckoutAttempt::fail`].

use chrono::{DateTime, Utc};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::types::{PaymentMethod, Sale};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    Validating,
    Committing,
    Success,
    Failed,
}

impl CheckoutPhase {
    /// Whether `self → next` is a legal step.
    pub fn can_transition_to(self, next: CheckoutPhase) -> bool {
        use CheckoutPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Committing)
                | (Validating, Failed)
                | (Committing, Success)
                | (Committing, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CheckoutPhase::Success | CheckoutPhase::Failed)
    }
}

/// One checkout attempt.
#[derive(Debug, Clone)]
pub struct CheckoutAttempt {
    phase: CheckoutPhase,
    failure: Option<String>,
}

impl Default for CheckoutAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutAttempt {
    pub fn new() -> Self {
        CheckoutAttempt {
            phase: CheckoutPhase::Idle,
            failure: None,
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Why the attempt failed, if it did.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn transition(&mut self, next: CheckoutPhase) -> CoreResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(CoreError::InvalidCheckoutTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Validates the cart and builds the sale to commit.
    ///
    /// Moves `Idle → Validating → Committing`, or to `Failed` if the cart
    /// cannot be checked out.
    pub fn prepare(
        &mut self,
        cart: &Cart,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> CoreResult<Sale> {
        self.transition(CheckoutPhase::Validating)?;

        match cart.to_sale(payment_method, now) {
            Ok(sale) => {
                self.transition(CheckoutPhase::Committing)?;
                Ok(sale)
            }
            Err(err) => {
                self.fail(err.to_string())?;
                Err(err)
            }
        }
    }

    /// The store committed the sale.
    pub fn succeed(&mut self) -> CoreResult<()> {
        self.transition(CheckoutPhase::Success)
    }

    /// Validation or the commit failed.
    pub fn fail(&mut self, reason: impl Into<String>) -> CoreResult<()> {
        self.transition(CheckoutPhase::Failed)?;
        self.failure = Some(reason.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use crate::types::Product;

    fn stocked_cart() -> Cart {
        let product = Product {
            id: 1,
            name: "Tea".to_string(),
            sku: "TEA-1".to_string(),
            barcode: None,
            category_id: None,
            description: String::new(),
            price_cents: 250,
            cost_cents: 0,
            stock: Quantity::from_units(4),
            unit: "pcs".to_string(),
            low_stock_threshold: Quantity::from_units(10),
            tax_rate_bps: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut cart = Cart::new();
        cart.add_item(&product).unwrap();
        cart
    }

    #[test]
    fn test_happy_path() {
        let mut attempt = CheckoutAttempt::new();
        let sale = attempt
            .prepare(&stocked_cart(), PaymentMethod::Cash, Utc::now())
            .unwrap();

        assert_eq!(sale.total_cents, 250);
        assert_eq!(attempt.phase(), CheckoutPhase::Committing);

        attempt.succeed().unwrap();
        assert_eq!(attempt.phase(), CheckoutPhase::Success);
        assert!(attempt.phase().is_terminal());
    }

    #[test]
    fn test_empty_cart_fails_attempt() {
        let mut attempt = CheckoutAttempt::new();
        let err = attempt
            .prepare(&Cart::new(), PaymentMethod::Cash, Utc::now())
            .unwrap_err();

        assert!(matches!(err, CoreError::EmptyCart));
        assert_eq!(attempt.phase(), CheckoutPhase::Failed);
        assert_eq!(attempt.failure(), Some("Cart is empty"));
    }

    #[test]
    fn test_attempt_is_single_use() {
        let mut attempt = CheckoutAttempt::new();
        attempt
            .prepare(&stocked_cart(), PaymentMethod::Card, Utc::now())
            .unwrap();
        attempt.fail("store unavailable").unwrap();

        let err = attempt
            .prepare(&stocked_cart(), PaymentMethod::Card, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidCheckoutTransition {
                from: CheckoutPhase::Failed,
                to: CheckoutPhase::Validating
            }
        ));
        assert!(attempt.succeed().is_err());
    }

    #[test]
    fn test_cannot_succeed_from_idle() {
        let mut attempt = CheckoutAttempt::new();
        assert!(attempt.succeed().is_err());
        assert_eq!(attempt.phase(), CheckoutPhase::Idle);
    }
}
