//! # Search & Sort
//!
//! Case-insensitive substring search over in-memory records.
//!
//! Each searchable record names its text fields through a small enum so that
//! call sites pick the fields they match against:
//!
//! ```rust
//! use tally_core::search::{search, ProductField, PRODUCT_LIST_FIELDS};
//! # let products: Vec<tally_core::Product> = Vec::new();
//!
//! let hits = search(&products, "cola", PRODUCT_LIST_FIELDS);
//! let by_sku = search(&products, "PRD-", &[ProductField::Sku]);
//! # assert!(hits.is_empty() && by_sku.is_empty());
//! ```

use std::cmp::Ordering;

use crate::types::{Customer, Product};

/// A record with named text fields.
pub trait Searchable {
    type Field: Copy;

    /// Text of one field, `None` when the field is unset.
    fn field_text(&self, field: Self::Field) -> Option<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Sku,
    Barcode,
    Description,
}

/// Fields matched by the product list.
pub const PRODUCT_LIST_FIELDS: &[ProductField] = &[
    ProductField::Name,
    ProductField::Sku,
    ProductField::Barcode,
    ProductField::Description,
];

/// Fields matched by the POS product picker.
pub const POS_PICKER_FIELDS: &[ProductField] =
    &[ProductField::Name, ProductField::Sku, ProductField::Barcode];

impl Searchable for Product {
    type Field = ProductField;

    fn field_text(&self, field: ProductField) -> Option<&str> {
        match field {
            ProductField::Name => Some(&self.name),
            ProductField::Sku => Some(&self.sku),
            ProductField::Barcode => self.barcode.as_deref(),
            ProductField::Description => Some(&self.description),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Phone,
    Email,
}

pub const CUSTOMER_FIELDS: &[CustomerField] =
    &[CustomerField::Name, CustomerField::Phone, CustomerField::Email];

impl Searchable for Customer {
    type Field = CustomerField;

    fn field_text(&self, field: CustomerField) -> Option<&str> {
        match field {
            CustomerField::Name => Some(&self.name),
            CustomerField::Phone => Some(&self.phone),
            CustomerField::Email => self.email.as_deref(),
        }
    }
}

/// Records where any of `fields` contains `query`, ignoring case.
///
/// An empty (or all-whitespace) query matches everything.
pub fn search<'a, T: Searchable>(items: &'a [T], query: &str, fields: &[T::Field]) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| {
            fields.iter().any(|&field| {
                item.field_text(field)
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
        .collect()
}

/// Keeps products in `category_id`, or all of them when no category is given.
pub fn filter_by_category<'a>(products: Vec<&'a Product>, category_id: Option<i64>) -> Vec<&'a Product> {
    match category_id {
        Some(id) => products
            .into_iter()
            .filter(|p| p.category_id == Some(id))
            .collect(),
        None => products,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort by a key.
pub fn sort_by<T, K, F>(items: &mut [T], key: F, order: SortOrder)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| {
        let ord: Ordering = key(a).cmp(&key(b));
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
}
