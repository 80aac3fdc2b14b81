//! Terminal display utilities for CLI output.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};

use crate::models::Reference;

/// Widest name shown in table output before truncation
const NAME_WIDTH: usize = 50;

/// Truncate text to `max_width` characters, appending an ellipsis if cut.
///
/// # Examples
///
/// ```
/// use likeminded::utils::display::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let kept: String = text.chars().take(max_width - 3).collect();
    format!("{}...", kept.trim_end())
}

/// Render references as a table.
pub fn references_table(references: &[Reference]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Kind", "ID", "Name", "Location", "URL"]);

    for reference in references {
        table.add_row(vec![
            Cell::new(reference.kind()),
            Cell::new(reference.id()),
            Cell::new(truncate_with_ellipsis(reference.name(), NAME_WIDTH))
                .add_attribute(Attribute::Bold),
            Cell::new(reference.location()),
            Cell::new(reference.url()),
        ]);
    }

    table.to_string()
}

/// Render references one per line.
pub fn references_plain(references: &[Reference]) -> String {
    references
        .iter()
        .map(|r| {
            let mut line = format!("[{}] {} (#{})", r.kind(), r.name(), r.id());
            if !r.location().is_empty() {
                line.push_str(&format!(" - {}", r.location()));
            }
            if !r.url().is_empty() {
                line.push_str(&format!("\n  URL: {}", r.url()));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mask a secret for display, keeping the last four characters.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
