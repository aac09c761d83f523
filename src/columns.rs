use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimum column width in pixels; resize updates below this are rejected.
pub const MIN_COLUMN_WIDTH: f64 = 50.0;

/// Tracks the full header list, the visible subset, display aliases and
/// pixel widths for one imported sheet.
///
/// The full header list is fixed at import. Hiding a column removes it from
/// the visible subset only; record data is retained. Aliases and widths are
/// independent of visibility and persist per sheet id until cleared.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct ColumnModel {
    original: Vec<String>,
    visible: Vec<String>,
    aliases: HashMap<String, String>,
    widths: HashMap<String, f64>,
}

impl ColumnModel {
    /// Build from the imported header list, re-applying any persisted
    /// hidden-column list and aliases for this sheet.
    pub fn new(headers: Vec<String>, hidden: &[String], aliases: HashMap<String, String>) -> Self {
        let visible = headers
            .iter()
            .filter(|h| !hidden.contains(h))
            .cloned()
            .collect();
        ColumnModel {
            original: headers,
            visible,
            aliases,
            widths: HashMap::new(),
        }
    }

    pub fn original(&self) -> &[String] {
        &self.original
    }

    pub fn visible(&self) -> &[String] {
        &self.visible
    }

    /// Headers currently hidden, in original order.
    pub fn hidden(&self) -> Vec<String> {
        self.original
            .iter()
            .filter(|h| !self.visible.contains(h))
            .cloned()
            .collect()
    }

    /// Move a header out of the visible subset. Unknown headers are ignored.
    pub fn hide(&mut self, header: &str) {
        self.visible.retain(|h| h != header);
    }

    /// Reset visibility to the full original header list.
    pub fn restore(&mut self) {
        self.visible = self.original.clone();
    }

    pub fn set_alias(&mut self, header: &str, alias: &str) {
        if alias.trim().is_empty() {
            self.aliases.remove(header);
        } else {
            self.aliases.insert(header.to_string(), alias.to_string());
        }
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// Display name for a header: the alias when set, else the raw header.
    pub fn display<'a>(&'a self, header: &'a str) -> &'a str {
        self.aliases.get(header).map(String::as_str).unwrap_or(header)
    }

    /// Apply one move of a drag-resize gesture: `start_width + (x - start_x)`.
    /// Updates below the minimum are rejected on every move event, not
    /// clamped. Returns whether the width changed.
    pub fn resize(&mut self, header: &str, start_width: f64, start_x: f64, current_x: f64) -> bool {
        let new_width = start_width + (current_x - start_x);
        self.set_width(header, new_width)
    }

    /// Set an absolute width; rejected when below [`MIN_COLUMN_WIDTH`].
    pub fn set_width(&mut self, header: &str, px: f64) -> bool {
        if px <= MIN_COLUMN_WIDTH {
            return false;
        }
        self.widths.insert(header.to_string(), px);
        true
    }

    pub fn width(&self, header: &str) -> Option<f64> {
        self.widths.get(header).copied()
    }
}
