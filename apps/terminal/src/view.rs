//! # View Components
//!
//! Generic text renderers shared by every feature module. Pure functions of
//! their input: no store access, no session state.
//!
//! ```text
//! ┌──────────────┐ ┌──────────┐
//! │ Today's Sales│ │ Products │   stat_cards
//! │ $22.00       │ │ 14       │
//! └──────────────┘ └──────────┘
//!
//! ID  Name        Stock  Status       table
//! ──  ──────────  ─────  ───────────
//! 1   Green Tea   4      [Low stock]  badge
//!
//! ✓ Product saved                     alert
//! ```

/// Alert flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
    Danger,
}

impl Tone {
    fn icon(self) -> char {
        match self {
            Tone::Success => '✓',
            Tone::Info => 'ℹ',
            Tone::Warning => '⚠',
            Tone::Danger => '✗',
        }
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, to: usize) -> String {
    let mut out = String::with_capacity(to);
    out.push_str(text);
    out.extend(std::iter::repeat(' ').take(to.saturating_sub(width(text))));
    out
}

/// One-line message with a tone icon.
pub fn alert(tone: Tone, message: impl AsRef<str>) -> String {
    format!("{} {}", tone.icon(), message.as_ref())
}

pub fn badge(label: &str) -> String {
    format!("[{}]", label)
}

/// Title underlined to its own width.
pub fn heading(title: &str) -> String {
    format!("{}\n{}", title, "═".repeat(width(title)))
}

/// Left-aligned columns sized to their widest cell.
///
/// ## Returns
/// `empty` when there are no rows, so every list has an empty state.
pub fn table(headers: &[&str], rows: &[Vec<String>], empty: &str) -> String {
    if rows.is_empty() {
        return alert(Tone::Info, empty);
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(width(cell));
            }
        }
    }

    let render_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_row(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(render_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Boxed label/value cards laid side by side.
pub fn stat_cards(cards: &[(&str, String)]) -> String {
    let widths: Vec<usize> = cards
        .iter()
        .map(|(label, value)| width(label).max(width(value)) + 1)
        .collect();

    let line = |f: &dyn Fn(usize, usize) -> String| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| f(i, *w))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let top = line(&|_, w| format!("┌{}┐", "─".repeat(w + 1)));
    let labels = line(&|i, w| format!("│ {}│", pad(cards[i].0, w)));
    let values = line(&|i, w| format!("│ {}│", pad(&cards[i].1, w)));
    let bottom = line(&|_, w| format!("└{}┘", "─".repeat(w + 1)));

    [top, labels, values, bottom].join("\n")
}

/// Aligned `key: value` lines for detail views.
pub fn details(fields: &[(&str, String)]) -> String {
    let key_width = fields.iter().map(|(k, _)| width(k)).max().unwrap_or(0);
    fields
        .iter()
        .map(|(k, v)| format!("{}  {}", pad(&format!("{}:", k), key_width + 1), v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Joins rendered blocks with a blank line between them.
pub fn sections(blocks: &[String]) -> String {
    blocks
        .iter()
        .filter(|b| !b.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_aligns_columns() {
        let rows = vec![
            vec!["1".to_string(), "Green Tea".to_string()],
            vec!["12".to_string(), "Rice".to_string()],
        ];
        let out = table(&["ID", "Name"], &rows, "No products");
        assert_eq!(
            out,
            "ID  Name\n──  ─────────\n1   Green Tea\n12  Rice"
        );
    }

    #[test]
    fn test_table_empty_state() {
        assert_eq!(table(&["ID"], &[], "No sales yet"), "ℹ No sales yet");
    }

    #[test]
    fn test_stat_cards() {
        let out = stat_cards(&[("Sales", "$2.00".to_string()), ("Items", "3".to_string())]);
        assert_eq!(
            out,
            "┌───────┐ ┌───────┐\n│ Sales │ │ Items │\n│ $2.00 │ │ 3     │\n└───────┘ └───────┘"
        );
    }

    #[test]
    fn test_details_and_alerts() {
        let out = details(&[("Name", "Tea".into()), ("SKU", "T-1".into())]);
        assert_eq!(out, "Name:  Tea\nSKU:   T-1");
        assert_eq!(alert(Tone::Success, "Saved"), "✓ Saved");
        assert_eq!(alert(Tone::Danger, "Nope"), "✗ Nope");
        assert_eq!(badge("Low stock"), "[Low stock]");
    }

    #[test]
    fn test_heading_counts_chars() {
        assert_eq!(heading("Café"), "Café\n════");
    }
}
