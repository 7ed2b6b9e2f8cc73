//! Template renderers. One function per [`super::ReceiptTemplate`] variant.
//!
//! All user-supplied text passes through [`esc`].

use chrono::{DateTime, Local};

use crate::format::{format_date, DateStyle};
use crate::money::Money;
use crate::settings::Settings;
use crate::types::{Customer, Sale, SaleItem};

fn esc(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escaped value, or `fallback` when the value is blank.
fn or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        esc(value)
    }
}

/// Renders `html` around the escaped value only when the value is set.
fn when(value: &str, html: impl Fn(String) -> String) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        html(esc(value))
    }
}

/// Formatting state shared by one render call.
struct Ctx<'a> {
    settings: &'a Settings,
    local_date: DateTime<Local>,
}

impl<'a> Ctx<'a> {
    fn new(sale: &Sale, settings: &'a Settings) -> Self {
        Ctx {
            settings,
            local_date: sale.date.with_timezone(&Local),
        }
    }

    fn money(&self, amount: Money) -> String {
        esc(&self.settings.format_money(amount))
    }

    fn date(&self, style: DateStyle) -> String {
        format_date(&self.local_date, style)
    }

    fn footer(&self, fallback: &str) -> String {
        or(&self.settings.receipt_footer, fallback)
    }
}

fn payment(sale: &Sale) -> String {
    sale.payment_method.as_str().to_uppercase()
}

fn rows(items: &[SaleItem], row: impl Fn(usize, &SaleItem) -> String) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| row(i + 1, item))
        .collect()
}

// =============================================================================
// Thermal 58mm
// =============================================================================

pub(super) fn thermal_58_minimal(sale: &Sale, customer: Option<&Customer>, settings: &Settings) -> String {
    let ctx = Ctx::new(sale, settings);
    let items = rows(&sale.items, |_, item| {
        format!(
            r#"
      <tr>
        <td>{}</td>
        <td class="text-center">{}</td>
        <td class="text-right">{}</td>
      </tr>"#,
            esc(&item.name),
            item.quantity,
            ctx.money(item.line_total())
        )
    });
    let customer_line = customer
        .map(|c| format!("<p><strong>Customer:</strong> {}</p>", esc(&c.name)))
        .unwrap_or_default();

    format!(
        r#"<div class="receipt thermal-58">
  <div class="receipt-header text-center">
    <h2>{store}</h2>
    {phone}
  </div>
  <div class="receipt-divider"></div>
  <div class="receipt-info">
    <p><strong>Invoice:</strong> #{id}</p>
    <p><strong>Date:</strong> {date}</p>
    {customer_line}
  </div>
  <div class="receipt-divider"></div>
  <table class="receipt-items">
    <thead>
      <tr><th>Item</th><th>Qty</th><th>Amt</th></tr>
    </thead>
    <tbody>{items}
    </tbody>
  </table>
  <div class="receipt-divider"></div>
  <div class="receipt-total">
    <p><strong>Subtotal:</strong> <span>{subtotal}</span></p>
    <p><strong>Tax:</strong> <span>{tax}</span></p>
    <p class="total-line"><strong>TOTAL:</strong> <span>{total}</span></p>
  </div>
  <div class="receipt-divider"></div>
  <div class="receipt-footer text-center">
    <p>{footer}</p>
  </div>
</div>"#,
        store = or(&settings.store_name, "Store"),
        phone = when(&settings.store_phone, |p| format!("<p>{p}</p>")),
        id = sale.id,
        date = ctx.date(DateStyle::DateTime),
        subtotal = ctx.money(sale.subtotal()),
        tax = ctx.money(sale.tax()),
        total = ctx.money(sale.total()),
        footer = ctx.footer("Thank you!"),
    )
}

pub(super) fn thermal_58_classic(sale: &Sale, customer: Option<&Customer>, settings: &Settings) -> String {
    let ctx = Ctx::new(sale, settings);
    let items = rows(&sale.items, |_, item| {
        format!(
            r#"
      <tr>
        <td>{}</td>
        <td>{}</td>
        <td>{}</td>
        <td>{}</td>
      </tr>"#,
            esc(&item.name),
            item.quantity,
            ctx.money(item.price()),
            ctx.money(item.line_total())
        )
    });
    let customer_lines = customer
        .map(|c| {
            format!(
                "<p><strong>Customer:</strong> {}</p>\n    {}",
                esc(&c.name),
                when(&c.phone, |p| format!("<p><strong>Phone:</strong> {p}</p>"))
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="receipt thermal-58">
  <div class="receipt-header text-center">
    <h1>{store}</h1>
    {address}
    {phone}
    {email}
  </div>
  <div class="receipt-divider-bold"></div>
  <div class="receipt-info">
    <p><strong>Invoice #:</strong> {id}</p>
    <p><strong>Date:</strong> {date}</p>
    {customer_lines}
  </div>
  <div class="receipt-divider-bold"></div>
  <table class="receipt-items">
    <thead>
      <tr><th>Item</th><th>Qty</th><th>Price</th><th>Total</th></tr>
    </thead>
    <tbody>{items}
    </tbody>
  </table>
  <div class="receipt-divider"></div>
  <div class="receipt-total">
    <p>Subtotal: <span>{subtotal}</span></p>
    <p>Tax: <span>{tax}</span></p>
    <p class="total-line">TOTAL: <span>{total}</span></p>
    <p>Payment: <span>{payment}</span></p>
  </div>
  <div class="receipt-divider-bold"></div>
  <div class="receipt-footer text-center">
    <p>{footer}</p>
    <p class="text-sm">Visit again!</p>
  </div>
</div>"#,
        store = or(&settings.store_name, "Store"),
        address = when(&settings.store_address, |a| format!(r#"<p class="text-sm">{a}</p>"#)),
        phone = when(&settings.store_phone, |p| format!("<p>Tel: {p}</p>")),
        email = when(&settings.store_email, |e| format!("<p>{e}</p>")),
        id = sale.id,
        date = ctx.date(DateStyle::DateTime),
        subtotal = ctx.money(sale.subtotal()),
        tax = ctx.money(sale.tax()),
        total = ctx.money(sale.total()),
        payment = payment(sale),
        footer = ctx.footer("Thank you for your business!"),
    )
}

// =============================================================================
// Thermal 80mm
// =============================================================================

pub(super) fn thermal_80_standard(sale: &Sale, customer: Option<&Customer>, settings: &Settings) -> String {
    let ctx = Ctx::new(sale, settings);
    let items = rows(&sale.items, |_, item| {
        format!(
            r#"
      <tr>
        <td>{}</td>
        <td class="text-center">{}</td>
        <td class="text-right">{}</td>
        <td class="text-right">{}</td>
      </tr>"#,
            esc(&item.name),
            item.quantity,
            ctx.money(item.price()),
            ctx.money(item.line_total())
        )
    });
    let customer_block = match customer {
        Some(c) => format!(
            "<p><strong>Customer:</strong> {}</p>\n      <p><strong>Phone:</strong> {}</p>",
            esc(&c.name),
            esc(&c.phone)
        ),
        None => "<p><strong>Customer:</strong> Walk-in</p>".to_string(),
    };

    format!(
        r#"<div class="receipt thermal-80">
  <div class="receipt-header text-center">
    <h1 style="font-size: 1.5rem; margin-bottom: 0.5rem;">{store}</h1>
    {address}
    <p>Tel: {phone} | Email: {email}</p>
  </div>
  <div class="receipt-divider-bold"></div>
  <div class="receipt-info" style="display: grid; grid-template-columns: 1fr 1fr; gap: 0.5rem;">
    <div>
      <p><strong>Invoice #:</strong> {id}</p>
      <p><strong>Date:</strong> {date}</p>
      <p><strong>Time:</strong> {time}</p>
    </div>
    <div>
      {customer_block}
    </div>
  </div>
  <div class="receipt-divider-bold"></div>
  <table class="receipt-items" style="width: 100%;">
    <thead>
      <tr>
        <th style="text-align: left;">Item</th>
        <th style="text-align: center;">Qty</th>
        <th style="text-align: right;">Price</th>
        <th style="text-align: right;">Amount</th>
      </tr>
    </thead>
    <tbody>{items}
    </tbody>
  </table>
  <div class="receipt-divider"></div>
  <div class="receipt-total">
    <p>Subtotal: <span>{subtotal}</span></p>
    <p>Tax ({tax_name}): <span>{tax}</span></p>
    <div class="receipt-divider"></div>
    <p class="total-line" style="font-size: 1.25rem;">TOTAL: <span>{total}</span></p>
    <p>Payment Method: <span>{payment}</span></p>
  </div>
  <div class="receipt-divider-bold"></div>
  <div class="receipt-footer text-center">
    <p style="font-weight: bold;">{footer}</p>
    <p class="text-sm">Please visit again</p>
  </div>
</div>"#,
        store = or(&settings.store_name, "Store Name"),
        address = when(&settings.store_address, |a| format!("<p>{a}</p>")),
        phone = or(&settings.store_phone, "N/A"),
        email = or(&settings.store_email, "N/A"),
        id = sale.id,
        date = ctx.date(DateStyle::Short),
        time = ctx.date(DateStyle::Time),
        tax_name = or(&settings.tax_name, "Tax"),
        subtotal = ctx.money(sale.subtotal()),
        tax = ctx.money(sale.tax()),
        total = ctx.money(sale.total()),
        payment = payment(sale),
        footer = ctx.footer("Thank you for your business!"),
    )
}

pub(super) fn thermal_80_detailed(sale: &Sale, customer: Option<&Customer>, settings: &Settings) -> String {
    let ctx = Ctx::new(sale, settings);
    let cell = "padding: 0.5rem; border: 1px solid #000;";
    let items = rows(&sale.items, |n, item| {
        format!(
            r#"
      <tr>
        <td style="{cell}">{n}</td>
        <td style="{cell}">{}</td>
        <td class="text-center" style="{cell}">{}</td>
        <td class="text-right" style="{cell}">{}</td>
        <td class="text-right" style="{cell}">{}</td>
        <td class="text-right" style="{cell}">{}</td>
      </tr>"#,
            esc(&item.name),
            item.quantity,
            ctx.money(item.price()),
            ctx.money(item.tax()),
            ctx.money(item.line_total())
        )
    });
    let customer_block = match customer {
        Some(c) => format!(
            "<p><strong>Bill To:</strong></p>\n        <p>{}</p>\n        <p>{}</p>\n        {}",
            esc(&c.name),
            esc(&c.phone),
            when(c.email.as_deref().unwrap_or(""), |e| format!("<p>{e}</p>"))
        ),
        None => "<p><strong>Customer:</strong> Walk-in Customer</p>".to_string(),
    };

    format!(
        r#"<div class="receipt thermal-80">
  <div class="receipt-header text-center" style="border: 2px solid #000; padding: 1rem; margin-bottom: 1rem;">
    <h1 style="font-size: 1.75rem; margin-bottom: 0.5rem;">{store}</h1>
    {address}
    <p>Phone: {phone}</p>
    <p>Email: {email}</p>
  </div>
  <div style="text-align: center; background: #000; color: #fff; padding: 0.5rem; margin-bottom: 1rem;">
    <h2 style="margin: 0; color: #fff;">TAX INVOICE</h2>
  </div>
  <div class="receipt-info" style="display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; margin-bottom: 1rem;">
    <div>
      <p><strong>Invoice Number:</strong> #{id}</p>
      <p><strong>Date:</strong> {date}</p>
      <p><strong>Time:</strong> {time}</p>
    </div>
    <div>
      {customer_block}
    </div>
  </div>
  <table class="receipt-items" style="width: 100%; border: 1px solid #000;">
    <thead style="background: #f0f0f0;">
      <tr>
        <th style="text-align: left; {cell}">#</th>
        <th style="text-align: left; {cell}">Item Description</th>
        <th style="text-align: center; {cell}">Qty</th>
        <th style="text-align: right; {cell}">Unit Price</th>
        <th style="text-align: right; {cell}">Tax</th>
        <th style="text-align: right; {cell}">Amount</th>
      </tr>
    </thead>
    <tbody>{items}
    </tbody>
  </table>
  <div class="receipt-total" style="margin-top: 1rem; text-align: right;">
    <p>Subtotal: <span>{subtotal}</span></p>
    <p>Tax Amount: <span>{tax}</span></p>
    <div style="border-top: 2px solid #000; margin: 0.5rem 0;"></div>
    <p style="font-size: 1.5rem; font-weight: bold;">GRAND TOTAL: <span>{total}</span></p>
    <p>Payment: <span>{payment}</span></p>
  </div>
  <div style="margin-top: 2rem; padding-top: 1rem; border-top: 2px dashed #000;">
    <div class="receipt-footer text-center">
      <p style="font-weight: bold;">{footer}</p>
      <p class="text-sm">This is a computer-generated receipt</p>
    </div>
  </div>
</div>"#,
        store = or(&settings.store_name, "Store Name"),
        address = when(&settings.store_address, |a| format!(r#"<p style="font-weight: 600;">{a}</p>"#)),
        phone = or(&settings.store_phone, "N/A"),
        email = or(&settings.store_email, "N/A"),
        id = sale.id,
        date = ctx.date(DateStyle::Long),
        time = ctx.date(DateStyle::Time),
        subtotal = ctx.money(sale.subtotal()),
        tax = ctx.money(sale.tax()),
        total = ctx.money(sale.total()),
        payment = payment(sale),
        footer = ctx.footer("Thank you for your business!"),
    )
}

pub(super) fn thermal_80_premium(sale: &Sale, customer: Option<&Customer>, settings: &Settings) -> String {
    let ctx = Ctx::new(sale, settings);
    let items = rows(&sale.items, |_, item| {
        format!(
            r#"
      <tr style="border-bottom: 1px solid #dee2e6;">
        <td style="padding: 0.75rem;">{}</td>
        <td class="text-center" style="padding: 0.75rem;">{}</td>
        <td class="text-right" style="padding: 0.75rem;">{}</td>
        <td class="text-right" style="padding: 0.75rem; font-weight: bold;">{}</td>
      </tr>"#,
            esc(&item.name),
            item.quantity,
            ctx.money(item.price()),
            ctx.money(item.line_total())
        )
    });
    let customer_block = customer
        .map(|c| {
            format!(
                r#"<div style="margin-top: 1rem; padding-top: 1rem; border-top: 1px solid #dee2e6;">
      <p style="color: #6c757d; font-size: 0.875rem;">CUSTOMER</p>
      <p style="font-weight: bold;">{}</p>
      <p>{}</p>
    </div>"#,
                esc(&c.name),
                esc(&c.phone)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="receipt thermal-80 receipt-premium">
  <div class="receipt-header text-center" style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 1.5rem;">
    <h1 style="font-size: 2rem; margin-bottom: 0.5rem; color: white;">{store}</h1>
    {address}
    <p style="color: rgba(255,255,255,0.9);">Tel: {phone} | Email: {email}</p>
  </div>
  <div style="background: #f8f9fa; padding: 1rem; border-radius: 8px; margin-bottom: 1rem;">
    <div style="display: grid; grid-template-columns: 1fr 1fr; gap: 1rem;">
      <div>
        <p style="color: #6c757d; font-size: 0.875rem;">INVOICE NUMBER</p>
        <p style="font-weight: bold; font-size: 1.25rem;">#{id}</p>
      </div>
      <div style="text-align: right;">
        <p style="color: #6c757d; font-size: 0.875rem;">DATE &amp; TIME</p>
        <p style="font-weight: bold;">{date}</p>
      </div>
    </div>
    {customer_block}
  </div>
  <table class="receipt-items" style="width: 100%; margin-bottom: 1rem;">
    <thead>
      <tr style="background: #f8f9fa;">
        <th style="text-align: left; padding: 0.75rem;">Item</th>
        <th style="text-align: center; padding: 0.75rem;">Qty</th>
        <th style="text-align: right; padding: 0.75rem;">Price</th>
        <th style="text-align: right; padding: 0.75rem;">Total</th>
      </tr>
    </thead>
    <tbody>{items}
    </tbody>
  </table>
  <div style="background: #f8f9fa; padding: 1rem; border-radius: 8px; margin-bottom: 1rem;">
    <div class="receipt-total">
      <p><span>Subtotal:</span> <span style="font-weight: bold;">{subtotal}</span></p>
      <p><span>Tax:</span> <span style="font-weight: bold;">{tax}</span></p>
      <div style="border-top: 2px solid #dee2e6; margin: 0.75rem 0;"></div>
      <p style="font-size: 1.5rem; color: #667eea;"><span style="font-weight: bold;">TOTAL:</span> <span style="font-weight: bold;">{total}</span></p>
      <p><span>Payment:</span> <span style="font-weight: bold;">{payment}</span></p>
    </div>
  </div>
  <div class="receipt-footer text-center" style="padding-top: 1rem; border-top: 2px dashed #dee2e6;">
    <p style="font-weight: bold; font-size: 1.1rem; margin-bottom: 0.5rem;">{footer}</p>
    <p style="color: #6c757d; font-size: 0.875rem;">We appreciate your business</p>
  </div>
</div>"#,
        store = or(&settings.store_name, "Premium Store"),
        address = when(&settings.store_address, |a| {
            format!(r#"<p style="color: rgba(255,255,255,0.9);">{a}</p>"#)
        }),
        phone = or(&settings.store_phone, "N/A"),
        email = or(&settings.store_email, "N/A"),
        id = sale.id,
        date = ctx.date(DateStyle::DateTime),
        subtotal = ctx.money(sale.subtotal()),
        tax = ctx.money(sale.tax()),
        total = ctx.money(sale.total()),
        payment = payment(sale),
        footer = ctx.footer("Thank you for shopping with us!"),
    )
}

// =============================================================================
// A4
// =============================================================================

fn bill_to_lines(c: &Customer) -> String {
    [
        Some(format!("<p>{}</p>", esc(&c.phone))),
        c.email.as_deref().map(|e| when(e, |e| format!("<p>{e}</p>"))),
        c.address.as_deref().map(|a| when(a, |a| format!("<p>{a}</p>"))),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n      ")
}

pub(super) fn a4_invoice(sale: &Sale, customer: Option<&Customer>, settings: &Settings) -> String {
    let ctx = Ctx::new(sale, settings);
    let cell = "padding: 1rem; border: 1px solid #ddd;";
    let items = rows(&sale.items, |n, item| {
        format!(
            r#"
      <tr>
        <td style="{cell}">{n}</td>
        <td style="{cell}">{}</td>
        <td style="text-align: center; {cell}">{}</td>
        <td style="text-align: right; {cell}">{}</td>
        <td style="text-align: right; {cell} font-weight: bold;">{}</td>
      </tr>"#,
            esc(&item.name),
            item.quantity,
            ctx.money(item.price()),
            ctx.money(item.line_total())
        )
    });
    let bill_to = customer
        .map(|c| {
            format!(
                r#"<div style="background: #f8f9fa; padding: 1.5rem; border-radius: 8px; margin-bottom: 2rem;">
      <h3 style="margin-bottom: 0.5rem;">Bill To:</h3>
      <p style="font-weight: bold; font-size: 1.1rem;">{}</p>
      {}
    </div>"#,
                esc(&c.name),
                bill_to_lines(c)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="receipt a4-invoice" style="max-width: 210mm; padding: 20mm; font-family: Arial, sans-serif;">
  <div style="display: grid; grid-template-columns: 1fr 1fr; gap: 2rem; margin-bottom: 2rem;">
    <div>
      <h1 style="font-size: 2rem; margin-bottom: 1rem;">{store}</h1>
      {address}
      <p>Phone: {phone}</p>
      <p>Email: {email}</p>
    </div>
    <div style="text-align: right;">
      <h2 style="font-size: 2.5rem; color: #667eea; margin-bottom: 1rem;">INVOICE</h2>
      <p><strong>Invoice #:</strong> {id}</p>
      <p><strong>Date:</strong> {date}</p>
    </div>
  </div>
  {bill_to}
  <table style="width: 100%; border-collapse: collapse; margin-bottom: 2rem;">
    <thead>
      <tr style="background: #667eea; color: white;">
        <th style="text-align: left; {cell}">#</th>
        <th style="text-align: left; {cell}">Description</th>
        <th style="text-align: center; {cell}">Quantity</th>
        <th style="text-align: right; {cell}">Unit Price</th>
        <th style="text-align: right; {cell}">Amount</th>
      </tr>
    </thead>
    <tbody>{items}
    </tbody>
  </table>
  <div style="display: flex; justify-content: flex-end; margin-bottom: 3rem;">
    <div style="width: 300px;">
      <div style="display: flex; justify-content: space-between; padding: 0.5rem 0; border-bottom: 1px solid #ddd;">
        <span>Subtotal:</span> <span style="font-weight: bold;">{subtotal}</span>
      </div>
      <div style="display: flex; justify-content: space-between; padding: 0.5rem 0; border-bottom: 1px solid #ddd;">
        <span>Tax:</span> <span style="font-weight: bold;">{tax}</span>
      </div>
      <div style="display: flex; justify-content: space-between; padding: 1rem; background: #667eea; color: white; margin-top: 0.5rem; border-radius: 4px;">
        <span style="font-size: 1.25rem; font-weight: bold;">TOTAL:</span> <span style="font-size: 1.25rem; font-weight: bold;">{total}</span>
      </div>
    </div>
  </div>
  <div style="border-top: 2px solid #ddd; padding-top: 2rem; text-align: center;">
    <p style="font-weight: bold; margin-bottom: 0.5rem;">{footer}</p>
    <p style="color: #6c757d; font-size: 0.875rem;">Payment Method: {payment}</p>
  </div>
</div>"#,
        store = or(&settings.store_name, "Company Name"),
        address = when(&settings.store_address, |a| format!("<p>{a}</p>")),
        phone = or(&settings.store_phone, "N/A"),
        email = or(&settings.store_email, "N/A"),
        id = sale.id,
        date = ctx.date(DateStyle::Long),
        subtotal = ctx.money(sale.subtotal()),
        tax = ctx.money(sale.tax()),
        total = ctx.money(sale.total()),
        payment = payment(sale),
        footer = ctx.footer("Thank you for your business!"),
    )
}

pub(super) fn a4_formal(sale: &Sale, customer: Option<&Customer>, settings: &Settings) -> String {
    let ctx = Ctx::new(sale, settings);
    let cell = "padding: 1rem; border: 1px solid #000;";
    let heading = "margin-bottom: 1rem; border-bottom: 1px solid #000; padding-bottom: 0.5rem;";
    let items = rows(&sale.items, |n, item| {
        format!(
            r#"
      <tr style="border-bottom: 1px solid #000;">
        <td style="{cell}">{n}</td>
        <td style="{cell}"><strong>{}</strong></td>
        <td style="text-align: center; {cell}">{}</td>
        <td style="text-align: right; {cell}">{}</td>
        <td style="text-align: right; {cell}">{}</td>
        <td style="text-align: right; {cell}"><strong>{}</strong></td>
      </tr>"#,
            esc(&item.name),
            item.quantity,
            ctx.money(item.price()),
            ctx.money(item.tax()),
            ctx.money(item.line_total())
        )
    });
    let party = match customer {
        Some(c) => format!(
            r#"<div style="border: 1px solid #000; padding: 1.5rem;">
      <h3 style="{heading}">Bill To</h3>
      <p><strong>{}</strong></p>
      {}
    </div>"#,
            esc(&c.name),
            bill_to_lines(c)
        ),
        None => format!(
            r#"<div style="border: 1px solid #000; padding: 1.5rem;">
      <h3 style="{heading}">Customer</h3>
      <p>Walk-in Customer</p>
    </div>"#
        ),
    };

    format!(
        r#"<div class="receipt a4-formal" style="max-width: 210mm; padding: 20mm; font-family: 'Times New Roman', serif;">
  <div style="text-align: center; border: 3px double #000; padding: 2rem; margin-bottom: 2rem;">
    <h1 style="font-size: 2.5rem; margin-bottom: 0.5rem; letter-spacing: 2px;">{store}</h1>
    {address}
    <p style="font-size: 1.1rem;">Tel: {phone} | Email: {email}</p>
  </div>
  <div style="text-align: center; margin-bottom: 2rem;">
    <h2 style="font-size: 2rem; border-top: 2px solid #000; border-bottom: 2px solid #000; padding: 1rem; display: inline-block; min-width: 300px;">TAX INVOICE</h2>
  </div>
  <div style="display: grid; grid-template-columns: 1fr 1fr; gap: 2rem; margin-bottom: 2rem;">
    <div style="border: 1px solid #000; padding: 1.5rem;">
      <h3 style="{heading}">Invoice Details</h3>
      <p><strong>Invoice Number:</strong> #{id}</p>
      <p><strong>Date of Issue:</strong> {date}</p>
      <p><strong>Time:</strong> {time}</p>
    </div>
    {party}
  </div>
  <table style="width: 100%; border-collapse: collapse; margin-bottom: 2rem; border: 2px solid #000;">
    <thead>
      <tr style="background: #000; color: white;">
        <th style="text-align: left; {cell}">S.No.</th>
        <th style="text-align: left; {cell}">Particulars</th>
        <th style="text-align: center; {cell}">Qty</th>
        <th style="text-align: right; {cell}">Rate</th>
        <th style="text-align: right; {cell}">Tax</th>
        <th style="text-align: right; {cell}">Amount</th>
      </tr>
    </thead>
    <tbody>{items}
    </tbody>
  </table>
  <div style="display: flex; justify-content: flex-end; margin-bottom: 3rem;">
    <div style="width: 350px; border: 2px solid #000; padding: 1.5rem;">
      <div style="display: flex; justify-content: space-between; padding: 0.5rem 0; border-bottom: 1px solid #000;">
        <span><strong>Subtotal:</strong></span> <span>{subtotal}</span>
      </div>
      <div style="display: flex; justify-content: space-between; padding: 0.5rem 0; border-bottom: 1px solid #000;">
        <span><strong>Tax Amount:</strong></span> <span>{tax}</span>
      </div>
      <div style="display: flex; justify-content: space-between; padding: 1rem; background: #000; color: white; margin-top: 0.5rem;">
        <span style="font-size: 1.5rem; font-weight: bold;">GRAND TOTAL:</span> <span style="font-size: 1.5rem; font-weight: bold;">{total}</span>
      </div>
      <div style="display: flex; justify-content: space-between; padding: 0.5rem 0; margin-top: 0.5rem;">
        <span><strong>Payment Mode:</strong></span> <span>{payment}</span>
      </div>
    </div>
  </div>
  <div style="border-top: 2px double #000; padding-top: 2rem; margin-top: 3rem;">
    <div style="text-align: center; margin-bottom: 2rem;">
      <p style="font-weight: bold; font-size: 1.1rem;">{footer}</p>
    </div>
    <div style="display: grid; grid-template-columns: 1fr 1fr; gap: 2rem;">
      <div>
        <p style="border-top: 1px solid #000; padding-top: 0.5rem; display: inline-block; min-width: 200px; text-align: center;">Customer Signature</p>
      </div>
      <div style="text-align: right;">
        <p style="border-top: 1px solid #000; padding-top: 0.5rem; display: inline-block; min-width: 200px; text-align: center;">Authorized Signatory</p>
      </div>
    </div>
  </div>
  <div style="text-align: center; margin-top: 2rem; font-size: 0.875rem; color: #666;">
    <p>This is a computer-generated invoice and does not require a physical signature</p>
  </div>
</div>"#,
        store = or(&settings.store_name, "COMPANY NAME"),
        address = when(&settings.store_address, |a| format!(r#"<p style="font-size: 1.1rem;">{a}</p>"#)),
        phone = or(&settings.store_phone, "N/A"),
        email = or(&settings.store_email, "N/A"),
        id = sale.id,
        date = ctx.date(DateStyle::Long),
        time = ctx.date(DateStyle::Time),
        subtotal = ctx.money(sale.subtotal()),
        tax = ctx.money(sale.tax()),
        total = ctx.money(sale.total()),
        payment = payment(sale),
        footer = ctx.footer("Thank you for your patronage"),
    )
}
