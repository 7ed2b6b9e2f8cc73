//! # Cart
//!
//! The session cart: ordered lines plus the selected customer.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Method                  Cart Change           │
//! │  ───────────────          ──────                  ───────────           │
//! │                                                                         │
//! │  pos add <product> ─────► add_item() ───────────► push line / qty + 1  │
//! │                                                                         │
//! │  pos qty <line> <n> ────► set_quantity() ───────► lines[i].qty = n     │
//! │                                                                         │
//! │  pos remove <line> ─────► remove_item() ────────► lines.remove(i)      │
//! │                                                                         │
//! │  pos clear ─────────────► clear() ──────────────► lines + customer     │
//! │                                                                         │
//! │  pos checkout ──────────► to_sale() ────────────► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is never persisted. It lives in the terminal session and is
//! dropped when the session ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{PaymentMethod, Product, Sale, SaleItem, TaxRate};

/// A line in the cart.
///
/// Price, tax rate and the stock cap are captured when the line is created.
/// Later edits to the product do not change an existing line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub price_cents: i64,
    pub tax_rate_bps: u32,
    pub unit: String,
    pub quantity: Quantity,
    /// Product stock at the moment the line was added.
    pub max_stock: Quantity,
}

impl CartLine {
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            price_cents: product.price_cents,
            tax_rate_bps: product.tax_rate_bps,
            unit: product.unit.clone(),
            quantity: Quantity::ONE,
            max_stock: product.stock,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Price × quantity.
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }

    pub fn tax(&self) -> Money {
        self.line_total().calculate_tax(self.tax_rate())
    }

    fn to_sale_item(&self) -> SaleItem {
        SaleItem {
            product_id: self.product_id,
            name: self.name.clone(),
            price_cents: self.price_cents,
            quantity: self.quantity,
            tax_rate_bps: self.tax_rate_bps,
        }
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product bumps the quantity)
/// - Every line quantity is > 0 and ≤ its `max_stock`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub customer_id: Option<i64>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity + 1, unless the line already holds
    ///   the product's whole live stock
    /// - Otherwise: new line with quantity 1
    pub fn add_item(&mut self, product: &Product) -> CoreResult<()> {
        if product.is_out_of_stock() {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
            });
        }

        match self.lines.iter().position(|l| l.product_id == product.id) {
            Some(index) => {
                let current = self.lines[index].quantity;
                if current >= product.stock {
                    return Err(CoreError::StockLimit {
                        name: product.name.clone(),
                        available: product.stock,
                    });
                }
                self.lines[index].quantity += Quantity::ONE;
                self.keep_totals_in_range(|cart| cart.lines[index].quantity = current)
            }
            None => {
                self.lines.push(CartLine::from_product(product));
                self.keep_totals_in_range(|cart| {
                    cart.lines.pop();
                })
            }
        }
    }

    /// Sets a line's quantity exactly.
    ///
    /// Zero or less removes the line. Above the captured stock cap, or a
    /// quantity whose totals no longer fit, is rejected and the line is left
    /// as it was.
    pub fn set_quantity(&mut self, index: usize, quantity: Quantity) -> CoreResult<()> {
        if !quantity.is_positive() {
            return self.remove_item(index);
        }

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound(index))?;

        if quantity > line.max_stock {
            return Err(CoreError::ExceedsStock {
                name: line.name.clone(),
                available: line.max_stock,
            });
        }

        let previous = line.quantity;
        line.quantity = quantity;
        self.keep_totals_in_range(|cart| cart.lines[index].quantity = previous)
    }

    // Undoes the last edit when the totals stop fitting.
    fn keep_totals_in_range(&mut self, undo: impl FnOnce(&mut Cart)) -> CoreResult<()> {
        if let Err(err) = self.compute_totals() {
            undo(self);
            return Err(err);
        }
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound(index));
        }
        self.lines.remove(index);
        Ok(())
    }

    /// Empties the cart and deselects the customer.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.customer_id = None;
    }

    pub fn select_customer(&mut self, customer_id: Option<i64>) {
        self.customer_id = customer_id;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Subtotal, tax and total. Tax is rounded per line, then summed.
    ///
    /// Fails with `AmountTooLarge` instead of wrapping when any line or sum
    /// leaves the i64 cent range.
    pub fn compute_totals(&self) -> CoreResult<CartTotals> {
        let mut subtotal = Money::zero();
        let mut tax = Money::zero();

        for line in &self.lines {
            let too_large = || CoreError::AmountTooLarge(line.name.clone());
            let line_total = line
                .price()
                .checked_multiply_quantity(line.quantity)
                .ok_or_else(too_large)?;
            let line_tax = line_total
                .checked_tax(line.tax_rate())
                .ok_or_else(too_large)?;

            subtotal = subtotal.checked_add(line_total).ok_or_else(too_large)?;
            tax = tax.checked_add(line_tax).ok_or_else(too_large)?;
        }

        let total = subtotal
            .checked_add(tax)
            .ok_or_else(|| CoreError::AmountTooLarge("sale total".to_string()))?;

        Ok(CartTotals {
            item_count: self.item_count(),
            total_quantity: self.total_quantity(),
            subtotal,
            tax,
            total,
        })
    }

    /// Builds the sale this cart would commit as. The id is left at 0.
    pub fn to_sale(&self, payment_method: PaymentMethod, now: DateTime<Utc>) -> CoreResult<Sale> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let totals = self.compute_totals()?;

        Ok(Sale {
            id: 0,
            date: now,
            customer_id: self.customer_id,
            items: self.lines.iter().map(CartLine::to_sale_item).collect(),
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
            payment_method,
        })
    }
}

/// Cart totals summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: Quantity,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: i64, price_cents: i64, stock: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            barcode: None,
            category_id: None,
            description: String::new(),
            price_cents,
            cost_cents: 0,
            stock: Quantity::from_units(stock),
            unit: "pcs".to_string(),
            low_stock_threshold: Quantity::from_units(10),
            tax_rate_bps: 1000,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cart_add_same_product_merges() {
        let mut cart = Cart::new();
        let product = test_product(1, 999, 5);

        cart.add_item(&product).unwrap();
        cart.add_item(&product).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), Quantity::from_units(2));
    }

    #[test]
    fn test_cart_rejects_out_of_stock() {
        let mut cart = Cart::new();
        let product = test_product(1, 999, 0);

        let err = cart.add_item(&product).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_add_beyond_live_stock_is_rejected() {
        let mut cart = Cart::new();
        let product = test_product(1, 999, 2);

        cart.add_item(&product).unwrap();
        cart.add_item(&product).unwrap();
        let err = cart.add_item(&product).unwrap_err();

        assert!(matches!(err, CoreError::StockLimit { .. }));
        assert_eq!(cart.lines[0].quantity, Quantity::from_units(2));
    }

    #[test]
    fn test_set_quantity_respects_captured_cap() {
        let mut cart = Cart::new();
        cart.add_item(&test_product(1, 500, 3)).unwrap();

        cart.set_quantity(0, Quantity::from_milli(2500)).unwrap();
        assert_eq!(cart.lines[0].quantity, Quantity::from_milli(2500));

        let err = cart.set_quantity(0, Quantity::from_units(4)).unwrap_err();
        assert!(matches!(err, CoreError::ExceedsStock { .. }));
        assert_eq!(cart.lines[0].quantity, Quantity::from_milli(2500));
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(&test_product(1, 500, 3)).unwrap();
        cart.add_item(&test_product(2, 700, 3)).unwrap();

        cart.set_quantity(0, Quantity::zero()).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.lines[0].product_id, 2);
        assert!(matches!(
            cart.set_quantity(5, Quantity::ONE),
            Err(CoreError::LineNotFound(5))
        ));
    }

    #[test]
    fn test_totals_scenario() {
        // price 10, qty 2, tax 10%
        let mut cart = Cart::new();
        let product = test_product(1, 1000, 10);
        cart.add_item(&product).unwrap();
        cart.add_item(&product).unwrap();

        let totals = cart.compute_totals().unwrap();
        assert_eq!(totals.subtotal.cents(), 2000);
        assert_eq!(totals.tax.cents(), 200);
        assert_eq!(totals.total.cents(), 2200);
        assert_eq!(totals.total, totals.subtotal + totals.tax);
    }

    #[test]
    fn test_tax_is_rounded_per_line() {
        let mut cart = Cart::new();
        let mut a = test_product(1, 5, 10);
        a.tax_rate_bps = 1000;
        let mut b = a.clone();
        b.id = 2;

        cart.add_item(&a).unwrap();
        cart.add_item(&b).unwrap();

        // 0.5 cent per line rounds up to 1 cent each
        assert_eq!(cart.compute_totals().unwrap().tax.cents(), 2);
    }

    #[test]
    fn test_quantity_whose_total_overflows_is_rejected() {
        let mut cart = Cart::new();
        cart.add_item(&test_product(1, 10_000, 1_000_000_000_000_000))
            .unwrap();

        let err = cart
            .set_quantity(0, Quantity::from_units(1_000_000_000_000_000))
            .unwrap_err();

        assert!(matches!(err, CoreError::AmountTooLarge(_)));
        assert_eq!(cart.lines[0].quantity, Quantity::ONE);
        assert_eq!(cart.compute_totals().unwrap().total.cents(), 11_000);
    }

    #[test]
    fn test_totals_overflow_is_an_error() {
        let mut cart = Cart::new();
        cart.add_item(&test_product(1, 10_000, 5)).unwrap();
        cart.lines[0].quantity = Quantity::from_units(1_000_000_000_000_000);

        assert!(matches!(
            cart.compute_totals(),
            Err(CoreError::AmountTooLarge(_))
        ));
        assert!(matches!(
            cart.to_sale(PaymentMethod::Cash, Utc::now()),
            Err(CoreError::AmountTooLarge(_))
        ));
    }

    #[test]
    fn test_line_whose_sum_overflows_is_not_added() {
        let mut cart = Cart::new();
        let mut a = test_product(1, i64::MAX / 2 + 1, 1);
        a.tax_rate_bps = 0;
        let mut b = a.clone();
        b.id = 2;
        cart.add_item(&a).unwrap();

        let err = cart.add_item(&b).unwrap_err();

        assert!(matches!(err, CoreError::AmountTooLarge(_)));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_clear_resets_customer() {
        let mut cart = Cart::new();
        cart.add_item(&test_product(1, 100, 1)).unwrap();
        cart.select_customer(Some(7));

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.customer_id, None);
    }

    #[test]
    fn test_to_sale_snapshots_lines() {
        let mut cart = Cart::new();
        cart.add_item(&test_product(1, 1000, 10)).unwrap();
        cart.select_customer(Some(3));

        let sale = cart.to_sale(PaymentMethod::Cash, Utc::now()).unwrap();
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].name, "Product 1");
        assert_eq!(sale.customer_id, Some(3));
        assert_eq!(sale.total_cents, 1100);

        assert!(matches!(
            Cart::new().to_sale(PaymentMethod::Card, Utc::now()),
            Err(CoreError::EmptyCart)
        ));
    }
}
