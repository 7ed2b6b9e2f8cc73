//! # Receipts
//!
//! Built-in receipt templates rendered to HTML.
//!
//! ## Template Catalog
//! ```text
//! ┌────┬──────────────────────────┬──────────────────────┬──────────────┐
//! │ id │ name                     │ key                  │ paper        │
//! ├────┼──────────────────────────┼──────────────────────┼──────────────┤
//! │ 1  │ Thermal 58mm - Minimal   │ thermal-58-minimal   │ 58mm roll    │
//! │ 2  │ Thermal 58mm - Classic   │ thermal-58-classic   │ 58mm roll    │
//! │ 3  │ Thermal 80mm - Standard  │ thermal-80-standard  │ 80mm roll    │
//! │ 4  │ Thermal 80mm - Detailed  │ thermal-80-detailed  │ 80mm roll    │
//! │ 5  │ Thermal 80mm - Premium   │ thermal-80-premium   │ 80mm roll    │
//! │ 6  │ A4 - Invoice             │ a4-invoice           │ A4 sheet     │
//! │ 7  │ A4 - Formal              │ a4-formal            │ A4 sheet     │
//! └────┴──────────────────────────┴──────────────────────┴──────────────┘
//! ```
//!
//! Every template is a plain function with the same signature, so rendering
//! never touches the store. Unknown keys are an error rather than a fallback.

mod templates;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::settings::Settings;
use crate::types::{Customer, ReceiptTemplateMeta, Sale};

/// Signature shared by all template renderers.
pub type RenderFn = fn(&Sale, Option<&Customer>, &Settings) -> String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ReceiptTemplate {
    #[serde(rename = "thermal-58-minimal")]
    Thermal58Minimal,
    #[serde(rename = "thermal-58-classic")]
    Thermal58Classic,
    #[default]
    #[serde(rename = "thermal-80-standard")]
    Thermal80Standard,
    #[serde(rename = "thermal-80-detailed")]
    Thermal80Detailed,
    #[serde(rename = "thermal-80-premium")]
    Thermal80Premium,
    #[serde(rename = "a4-invoice")]
    A4Invoice,
    #[serde(rename = "a4-formal")]
    A4Formal,
}

impl ReceiptTemplate {
    pub const ALL: [ReceiptTemplate; 7] = [
        ReceiptTemplate::Thermal58Minimal,
        ReceiptTemplate::Thermal58Classic,
        ReceiptTemplate::Thermal80Standard,
        ReceiptTemplate::Thermal80Detailed,
        ReceiptTemplate::Thermal80Premium,
        ReceiptTemplate::A4Invoice,
        ReceiptTemplate::A4Formal,
    ];

    /// Catalog id (1-based, stable).
    pub fn id(&self) -> i64 {
        match self {
            ReceiptTemplate::Thermal58Minimal => 1,
            ReceiptTemplate::Thermal58Classic => 2,
            ReceiptTemplate::Thermal80Standard => 3,
            ReceiptTemplate::Thermal80Detailed => 4,
            ReceiptTemplate::Thermal80Premium => 5,
            ReceiptTemplate::A4Invoice => 6,
            ReceiptTemplate::A4Formal => 7,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ReceiptTemplate::Thermal58Minimal => "thermal-58-minimal",
            ReceiptTemplate::Thermal58Classic => "thermal-58-classic",
            ReceiptTemplate::Thermal80Standard => "thermal-80-standard",
            ReceiptTemplate::Thermal80Detailed => "thermal-80-detailed",
            ReceiptTemplate::Thermal80Premium => "thermal-80-premium",
            ReceiptTemplate::A4Invoice => "a4-invoice",
            ReceiptTemplate::A4Formal => "a4-formal",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReceiptTemplate::Thermal58Minimal => "Thermal 58mm - Minimal",
            ReceiptTemplate::Thermal58Classic => "Thermal 58mm - Classic",
            ReceiptTemplate::Thermal80Standard => "Thermal 80mm - Standard",
            ReceiptTemplate::Thermal80Detailed => "Thermal 80mm - Detailed",
            ReceiptTemplate::Thermal80Premium => "Thermal 80mm - Premium",
            ReceiptTemplate::A4Invoice => "A4 - Invoice",
            ReceiptTemplate::A4Formal => "A4 - Formal",
        }
    }

    pub fn renderer(&self) -> RenderFn {
        match self {
            ReceiptTemplate::Thermal58Minimal => templates::thermal_58_minimal,
            ReceiptTemplate::Thermal58Classic => templates::thermal_58_classic,
            ReceiptTemplate::Thermal80Standard => templates::thermal_80_standard,
            ReceiptTemplate::Thermal80Detailed => templates::thermal_80_detailed,
            ReceiptTemplate::Thermal80Premium => templates::thermal_80_premium,
            ReceiptTemplate::A4Invoice => templates::a4_invoice,
            ReceiptTemplate::A4Formal => templates::a4_formal,
        }
    }

    /// Renders the receipt body as an HTML fragment.
    pub fn render(&self, sale: &Sale, customer: Option<&Customer>, settings: &Settings) -> String {
        (self.renderer())(sale, customer, settings)
    }

    /// Metadata rows seeded into the template catalog.
    pub fn catalog() -> Vec<ReceiptTemplateMeta> {
        ReceiptTemplate::ALL
            .iter()
            .map(|t| ReceiptTemplateMeta {
                id: t.id(),
                name: t.name().to_string(),
                key: t.key().to_string(),
            })
            .collect()
    }
}

impl fmt::Display for ReceiptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReceiptTemplate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReceiptTemplate::ALL
            .into_iter()
            .find(|t| t.key() == wanted)
            .ok_or_else(|| CoreError::UnknownTemplate(wanted.to_string()))
    }
}

/// Wraps a rendered fragment in a standalone printable document.
pub fn document(sale_id: i64, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Receipt #{sale_id}</title>
<link rel="stylesheet" href="css/main.css">
<link rel="stylesheet" href="css/receipt-templates.css">
</head>
<body>
{body}
</body>
</html>
"#
    )
}

/// `receipt_{id}_{YYYY-MM-DD}.html`.
pub fn receipt_filename(sale_id: i64, date: &str) -> String {
    format!("receipt_{sale_id}_{date}.html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use crate::types::{PaymentMethod, SaleItem};
    use chrono::Utc;

    fn sale() -> Sale {
        Sale {
            id: 17,
            date: Utc::now(),
            customer_id: None,
            items: vec![
                SaleItem {
                    product_id: 1,
                    name: "Fish & Chips <large>".to_string(),
                    price_cents: 1000,
                    quantity: Quantity::from_units(2),
                    tax_rate_bps: 1000,
                },
                SaleItem {
                    product_id: 2,
                    name: "Lemonade".to_string(),
                    price_cents: 250,
                    quantity: Quantity::from_milli(1500),
                    tax_rate_bps: 0,
                },
            ],
            subtotal_cents: 2375,
            tax_cents: 200,
            total_cents: 2575,
            payment_method: PaymentMethod::Card,
        }
    }

    fn customer() -> Customer {
        Customer {
            id: 3,
            name: "Ana Silva".to_string(),
            phone: "555-123-4567".to_string(),
            email: Some("ana@example.com".to_string()),
            address: Some("12 Harbour Rd".to_string()),
            notes: String::new(),
            total_purchases_cents: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_keys_round_trip() {
        for template in ReceiptTemplate::ALL {
            assert_eq!(template.key().parse::<ReceiptTemplate>().unwrap(), template);
            let json = serde_json::to_string(&template).unwrap();
            assert_eq!(json, format!("\"{}\"", template.key()));
        }
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let err = "thermal-99-fancy".parse::<ReceiptTemplate>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownTemplate(key) if key == "thermal-99-fancy"));
    }

    #[test]
    fn test_catalog_matches_ids() {
        let catalog = ReceiptTemplate::catalog();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog[2].id, 3);
        assert_eq!(catalog[2].key, "thermal-80-standard");
        assert_eq!(catalog[6].name, "A4 - Formal");
    }

    #[test]
    fn test_every_template_renders_core_fields() {
        let settings = Settings::default();
        for template in ReceiptTemplate::ALL {
            let html = template.render(&sale(), None, &settings);
            assert!(html.contains("17"), "{template} is missing the invoice id");
            assert!(html.contains("$25.75"), "{template} is missing the total");
            assert!(html.contains("Fish &amp; Chips &lt;large&gt;"), "{template} did not escape");
            assert!(!html.contains("<large>"), "{template} leaked raw markup");
            assert!(html.contains("1.5"), "{template} is missing the fractional quantity");
        }
    }

    #[test]
    fn test_walk_in_labels() {
        let settings = Settings::default();
        let standard = ReceiptTemplate::Thermal80Standard.render(&sale(), None, &settings);
        assert!(standard.contains("Walk-in"));

        for template in [ReceiptTemplate::Thermal80Detailed, ReceiptTemplate::A4Formal] {
            let html = template.render(&sale(), None, &settings);
            assert!(html.contains("Walk-in Customer"));
        }

        let with_customer =
            ReceiptTemplate::Thermal80Standard.render(&sale(), Some(&customer()), &settings);
        assert!(with_customer.contains("Ana Silva"));
        assert!(!with_customer.contains("Walk-in"));
    }

    #[test]
    fn test_footer_fallbacks() {
        let settings = Settings {
            receipt_footer: String::new(),
            ..Settings::default()
        };
        let cases = [
            (ReceiptTemplate::Thermal58Minimal, "Thank you!"),
            (ReceiptTemplate::Thermal80Premium, "Thank you for shopping with us!"),
            (ReceiptTemplate::A4Formal, "Thank you for your patronage"),
            (ReceiptTemplate::A4Invoice, "Thank you for your business!"),
        ];
        for (template, footer) in cases {
            assert!(template.render(&sale(), None, &settings).contains(footer));
        }
    }

    #[test]
    fn test_payment_is_uppercase() {
        let html = ReceiptTemplate::Thermal58Classic.render(&sale(), None, &Settings::default());
        assert!(html.contains("CARD"));
    }

    #[test]
    fn test_detailed_shows_line_tax() {
        let html =
            ReceiptTemplate::Thermal80Detailed.render(&sale(), Some(&customer()), &Settings::default());
        // 10% of 2 × $10.00
        assert!(html.contains("$2.00"));
        assert!(html.contains("ana@example.com"));
        assert!(html.contains("TAX INVOICE"));
    }

    #[test]
    fn test_document_and_filename() {
        let doc = document(17, "<div>body</div>");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Receipt #17</title>"));
        assert!(doc.contains(r#"href="css/receipt-templates.css""#));
        assert!(doc.contains("<div>body</div>"));
        assert_eq!(receipt_filename(17, "2024-01-05"), "receipt_17_2024-01-05.html");
    }
}
