//! # Export & Import
//!
//! JSON and CSV encodings of record collections, plus the full-backup document.
//!
//! ## CSV Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  header row   = field names of the FIRST record, in declaration order   │
//! │  strings      = quoted when they contain , " CR or LF ("" escapes ")    │
//! │  numbers/bool = written bare                                            │
//! │  null         = empty cell                                              │
//! │  lists/maps   = compact JSON in one (quoted) cell, e.g. sale items      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Imports strip identifiers: the store assigns fresh ids on insert.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::quantity::Quantity;
use crate::types::{
    Backup, Category, Customer, PaymentMethod, Product, Sale, SaleItem, SettingsRecord,
    BACKUP_VERSION, DEFAULT_LOW_STOCK_THRESHOLD,
};

// =============================================================================
// Formats & File Names
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Guesses the format from a file name; anything but `.csv` is JSON.
    pub fn from_path(path: &str) -> Self {
        if path.to_lowercase().ends_with(".csv") {
            ExportFormat::Csv
        } else {
            ExportFormat::Json
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ValidationError::NotAllowed {
                field: "format".to_string(),
                allowed: vec!["json".to_string(), "csv".to_string()],
            }),
        }
    }
}

/// `{stem}_{date}.{ext}`, e.g. `products_2024-01-05.csv`.
pub fn export_filename(stem: &str, date: &str, format: ExportFormat) -> String {
    format!("{stem}_{date}.{}", format.extension())
}

/// `pos_backup_{date}.json`.
pub fn backup_filename(date: &str) -> String {
    format!("pos_backup_{date}.json")
}

// =============================================================================
// JSON
// =============================================================================

/// Pretty-printed JSON array.
pub fn to_json<T: Serialize>(records: &[T]) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parses a JSON array of records, dropping any `id` field.
pub fn from_json<T: DeserializeOwned>(text: &str) -> CoreResult<Vec<T>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(CoreError::InvalidImport(
            "expected a JSON array of records".to_string(),
        ));
    };

    items
        .into_iter()
        .map(|mut item| {
            if let Value::Object(map) = &mut item {
                map.remove("id");
            }
            serde_json::from_value(item).map_err(CoreError::from)
        })
        .collect()
}

// =============================================================================
// CSV Encoding
// =============================================================================

fn csv_cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    };

    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

/// Encodes records as CSV. Header is the first record's field names.
pub fn to_csv<T: Serialize>(records: &[T]) -> CoreResult<String> {
    let rows = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    let Some(Value::Object(first)) = rows.first() else {
        return Err(CoreError::NothingToExport);
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| csv_cell(Some(&Value::String(h.clone()))))
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in &rows {
        let line = headers
            .iter()
            .map(|h| csv_cell(row.get(h)))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    Ok(lines.join("\n"))
}

// =============================================================================
// CSV Decoding
// =============================================================================

fn split_csv(text: &str) -> CoreResult<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                if !(record.is_empty() && field.is_empty()) {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CoreError::InvalidImport("unterminated quoted field".to_string()));
    }
    if !(record.is_empty() && field.is_empty()) {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

/// One data row of a CSV file, addressed by header name.
#[derive(Debug, Clone)]
pub struct CsvRow {
    headers: Arc<Vec<String>>,
    cells: Vec<String>,
    /// 1-based line of the row in the file (the header is line 1).
    line: usize,
}

impl CsvRow {
    fn invalid(&self, column: &str, reason: impl Display) -> CoreError {
        CoreError::InvalidImport(format!("row {}, column '{}': {}", self.line, column, reason))
    }

    /// Raw cell text, `None` if the column does not exist.
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == column)?;
        Some(self.cells.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Required column.
    pub fn text(&self, column: &str) -> CoreResult<String> {
        self.get(column)
            .map(str::to_string)
            .ok_or_else(|| self.invalid(column, "missing column"))
    }

    /// Optional column; empty or blank cells read as `None`, as they do in
    /// JSON records.
    pub fn opt_text(&self, column: &str) -> Option<String> {
        self.get(column)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    }

    pub fn parse<T>(&self, column: &str) -> CoreResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.text(column)?;
        raw.trim().parse().map_err(|e| self.invalid(column, e))
    }

    pub fn opt_parse<T>(&self, column: &str) -> CoreResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.opt_text(column) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| self.invalid(column, e)),
            None => Ok(None),
        }
    }

    /// Nested JSON stored in a single cell.
    pub fn json<T: DeserializeOwned>(&self, column: &str) -> CoreResult<T> {
        let raw = self.text(column)?;
        serde_json::from_str(&raw).map_err(|e| self.invalid(column, e))
    }
}

/// Splits CSV text into rows keyed by the header line.
pub fn parse_csv(text: &str) -> CoreResult<Vec<CsvRow>> {
    let mut records = split_csv(text)?.into_iter();
    let Some(headers) = records.next() else {
        return Err(CoreError::InvalidImport("file is empty".to_string()));
    };
    let headers = Arc::new(headers);

    Ok(records
        .enumerate()
        .map(|(i, cells)| CsvRow {
            headers: Arc::clone(&headers),
            cells,
            line: i + 2,
        })
        .collect())
}

/// A record that can be rebuilt from a CSV row.
///
/// `now` fills timestamps the file does not carry.
pub trait CsvRecord: Sized {
    fn from_csv(row: &CsvRow, now: DateTime<Utc>) -> CoreResult<Self>;
}

impl CsvRecord for Product {
    fn from_csv(row: &CsvRow, now: DateTime<Utc>) -> CoreResult<Self> {
        Ok(Product {
            id: 0,
            name: row.text("name")?,
            sku: row.text("sku")?,
            barcode: row.opt_text("barcode"),
            category_id: row.opt_parse("categoryId")?,
            description: row.opt_text("description").unwrap_or_default(),
            price_cents: row.parse("priceCents")?,
            cost_cents: row.opt_parse("costCents")?.unwrap_or(0),
            stock: row.opt_parse("stock")?.unwrap_or(Quantity::zero()),
            unit: row.opt_text("unit").unwrap_or_else(|| "pcs".to_string()),
            low_stock_threshold: row
                .opt_parse("lowStockThreshold")?
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            tax_rate_bps: row.opt_parse("taxRateBps")?.unwrap_or(0),
            created_at: row.opt_parse("createdAt")?.unwrap_or(now),
            updated_at: row.opt_parse("updatedAt")?.unwrap_or(now),
        })
    }
}

impl CsvRecord for Customer {
    fn from_csv(row: &CsvRow, now: DateTime<Utc>) -> CoreResult<Self> {
        Ok(Customer {
            id: 0,
            name: row.text("name")?,
            phone: row.opt_text("phone").unwrap_or_default(),
            email: row.opt_text("email"),
            address: row.opt_text("address"),
            notes: row.opt_text("notes").unwrap_or_default(),
            total_purchases_cents: row.opt_parse("totalPurchasesCents")?.unwrap_or(0),
            created_at: row.opt_parse("createdAt")?.unwrap_or(now),
            updated_at: row.opt_parse("updatedAt")?.unwrap_or(now),
        })
    }
}

impl CsvRecord for Category {
    fn from_csv(row: &CsvRow, _now: DateTime<Utc>) -> CoreResult<Self> {
        Ok(Category {
            id: 0,
            name: row.text("name")?,
        })
    }
}

impl CsvRecord for Sale {
    fn from_csv(row: &CsvRow, now: DateTime<Utc>) -> CoreResult<Self> {
        let items: Vec<SaleItem> = row.json("items")?;
        Ok(Sale {
            id: 0,
            date: row.opt_parse("date")?.unwrap_or(now),
            customer_id: row.opt_parse("customerId")?,
            items,
            subtotal_cents: row.parse("subtotalCents")?,
            tax_cents: row.parse("taxCents")?,
            total_cents: row.parse("totalCents")?,
            payment_method: row.parse::<PaymentMethod>("paymentMethod")?,
        })
    }
}

/// Parses CSV text into records, ids stripped.
pub fn from_csv<T: CsvRecord>(text: &str, now: DateTime<Utc>) -> CoreResult<Vec<T>> {
    parse_csv(text)?
        .iter()
        .map(|row| T::from_csv(row, now))
        .collect()
}

/// Decodes an import file in either format.
pub fn import_records<T>(text: &str, format: ExportFormat, now: DateTime<Utc>) -> CoreResult<Vec<T>>
where
    T: CsvRecord + DeserializeOwned,
{
    match format {
        ExportFormat::Json => from_json(text),
        ExportFormat::Csv => from_csv(text, now),
    }
}

// =============================================================================
// Backup
// =============================================================================

/// Assembles a backup document stamped with `now`.
pub fn build_backup(
    products: Vec<Product>,
    customers: Vec<Customer>,
    sales: Vec<Sale>,
    categories: Vec<Category>,
    settings: Vec<SettingsRecord>,
    now: DateTime<Utc>,
) -> Backup {
    Backup {
        products,
        customers,
        sales,
        categories,
        settings,
        export_date: now,
        version: BACKUP_VERSION.to_string(),
    }
}

pub fn backup_to_json(backup: &Backup) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(backup)?)
}

/// Parses a backup document. The four primary collections must be present.
pub fn parse_backup(text: &str) -> CoreResult<Backup> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(map) = &value else {
        return Err(CoreError::InvalidImport(
            "backup must be a JSON object".to_string(),
        ));
    };

    for key in ["products", "customers", "sales", "categories"] {
        if !map.get(key).map(Value::is_array).unwrap_or(false) {
            return Err(CoreError::InvalidImport(format!(
                "backup is missing the '{key}' list"
            )));
        }
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn product(name: &str, description: &str) -> Product {
        Product {
            id: 9,
            name: name.to_string(),
            sku: "SKU-1".to_string(),
            barcode: None,
            category_id: Some(2),
            description: description.to_string(),
            price_cents: 1099,
            cost_cents: 500,
            stock: Quantity::from_milli(2500),
            unit: "kg".to_string(),
            low_stock_threshold: Quantity::from_units(5),
            tax_rate_bps: 1800,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let csv = to_csv(&[product("Rice, Basmati", "says \"best\"")]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,name,sku,barcode,categoryId,description,priceCents,costCents,stock,unit,lowStockThreshold,taxRateBps,createdAt,updatedAt"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("9,\"Rice, Basmati\",SKU-1,,2,\"says \"\"best\"\"\",1099,500,2.5,kg,5,1800,"));
    }

    #[test]
    fn test_empty_export_is_rejected() {
        let err = to_csv::<Product>(&[]).unwrap_err();
        assert!(matches!(err, CoreError::NothingToExport));
    }

    #[test]
    fn test_product_csv_round_trip() {
        let original = vec![
            product("Rice, Basmati", "line one\nline two"),
            product("Plain", ""),
        ];
        let csv = to_csv(&original).unwrap();

        let restored: Vec<Product> = from_csv(&csv, Utc::now()).unwrap();

        let expected: Vec<Product> = original
            .into_iter()
            .map(|p| Product { id: 0, ..p })
            .collect();
        assert_eq!(restored, expected);
    }

    #[test]
    fn test_sale_csv_round_trip_keeps_items() {
        let sale = Sale {
            id: 4,
            date: fixed_now(),
            customer_id: None,
            items: vec![SaleItem {
                product_id: 1,
                name: "Tea, green".to_string(),
                price_cents: 250,
                quantity: Quantity::from_units(2),
                tax_rate_bps: 500,
            }],
            subtotal_cents: 500,
            tax_cents: 25,
            total_cents: 525,
            payment_method: PaymentMethod::Upi,
        };

        let csv = to_csv(&[sale.clone()]).unwrap();
        let restored: Vec<Sale> = from_csv(&csv, Utc::now()).unwrap();

        assert_eq!(restored, vec![Sale { id: 0, ..sale }]);
    }

    #[test]
    fn test_csv_missing_column_reports_row() {
        let err = from_csv::<Product>("name,sku\nTea,T-1\n", Utc::now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid import file: row 2, column 'priceCents': missing column"
        );
    }

    #[test]
    fn test_json_import_strips_ids() {
        let text = r#"[{"id": 42, "name": "Snacks"}, {"name": "Dairy"}]"#;
        let categories: Vec<Category> = from_json(text).unwrap();
        assert_eq!(categories.len(), 2);
        assert!(categories.iter().all(|c| c.id == 0));
    }

    #[test]
    fn test_blank_optional_text_imports_alike() {
        let json = r#"[{
            "name": "Ana", "phone": "555-0100", "email": "", "address": " ",
            "createdAt": "2024-03-01T12:00:00Z", "updatedAt": "2024-03-01T12:00:00Z"
        }]"#;
        let from_json: Vec<Customer> =
            import_records(json, ExportFormat::Json, fixed_now()).unwrap();

        let csv = "name,phone,email,address\nAna,555-0100,,\n";
        let from_csv: Vec<Customer> =
            import_records(csv, ExportFormat::Csv, fixed_now()).unwrap();

        assert_eq!(from_json[0].email, None);
        assert_eq!(from_json[0].address, None);
        assert_eq!(from_json, from_csv);
    }

    #[test]
    fn test_json_import_requires_array() {
        let err = from_json::<Category>(r#"{"name": "Snacks"}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidImport(_)));
    }

    #[test]
    fn test_backup_requires_collections() {
        assert!(parse_backup(r#"{"products": [], "customers": []}"#).is_err());

        let backup = build_backup(vec![], vec![], vec![], vec![], vec![], fixed_now());
        let text = backup_to_json(&backup).unwrap();
        assert!(text.contains("\"version\": \"1.0.0\""));
        assert_eq!(parse_backup(&text).unwrap(), backup);
    }

    #[test]
    fn test_filenames() {
        assert_eq!(
            export_filename("customers", "2024-03-01", ExportFormat::Csv),
            "customers_2024-03-01.csv"
        );
        assert_eq!(backup_filename("2024-03-01"), "pos_backup_2024-03-01.json");
        assert_eq!(ExportFormat::from_path("dump.CSV"), ExportFormat::Csv);
    }
}
