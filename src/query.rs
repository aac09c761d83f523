use crate::selection::SelectionSet;
use crate::store::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Filter, search and sort settings driving the derived page.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct FilterState {
    /// Per-header substring filters, matched case-insensitively (AND).
    pub filters: HashMap<String, String>,
    /// Global free-text search across all visible headers (OR).
    pub search: String,
    /// Sort column, or none for import order.
    pub sort_key: Option<String>,
    pub direction: SortDirection,
}

impl FilterState {
    pub fn clear(&mut self) {
        self.filters.clear();
        self.search.clear();
    }

    /// Click-on-header behavior: same key flips direction, new key sorts
    /// ascending.
    pub fn toggle_sort(&mut self, header: &str) {
        if self.sort_key.as_deref() == Some(header) {
            self.direction = self.direction.flipped();
        } else {
            self.sort_key = Some(header.to_string());
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Global search stage: keep a record when ANY visible header's value
/// contains the search string, case-insensitively.
pub fn apply_search<'a>(records: Vec<&'a Record>, visible: &[String], search: &str) -> Vec<&'a Record> {
    let term = search.trim().to_lowercase();
    if term.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| {
            visible
                .iter()
                .any(|h| r.get(h).to_lowercase().contains(&term))
        })
        .collect()
}

/// Per-column filter stage: keep a record when EVERY header with a non-empty
/// filter string has a value containing it, case-insensitively.
pub fn apply_filters<'a>(
    records: Vec<&'a Record>,
    visible: &[String],
    filters: &HashMap<String, String>,
) -> Vec<&'a Record> {
    records
        .into_iter()
        .filter(|r| {
            visible.iter().all(|h| match filters.get(h) {
                Some(f) if !f.is_empty() => r.get(h).to_lowercase().contains(&f.to_lowercase()),
                _ => true,
            })
        })
        .collect()
}

/// Sort stage: locale-naive string comparison on raw values, empty string
/// for missing ones, fixed tie-break of 0. The sort is stable so tied
/// records preserve their prior relative order.
pub fn apply_sort<'a>(
    mut records: Vec<&'a Record>,
    sort_key: Option<&str>,
    direction: SortDirection,
) -> Vec<&'a Record> {
    if let Some(key) = sort_key {
        records.sort_by(|a, b| {
            let va = a.get(key);
            let vb = b.get(key);
            let ord = if va < vb {
                Ordering::Less
            } else if va > vb {
                Ordering::Greater
            } else {
                Ordering::Equal
            };
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }
    records
}

/// Page slice `[(page-1)*size, page*size)`. Page numbers are 1-based; an
/// out-of-range page yields an empty slice.
pub fn paginate<'a>(records: Vec<&'a Record>, page: usize, page_size: usize) -> Vec<&'a Record> {
    if page == 0 || page_size == 0 {
        return Vec::new();
    }
    records
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect()
}

/// Number of pages for a result set, never less than 1.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// Full derivation chain before pagination.
///
/// When `only_selected` is set, only records in that set are retained and
/// the search and per-column filter stages are SKIPPED entirely; the
/// selected view always shows every checked row.
pub fn run<'a>(
    records: &'a [Record],
    visible: &[String],
    state: &FilterState,
    only_selected: Option<&SelectionSet>,
) -> Vec<&'a Record> {
    let rows: Vec<&Record> = match only_selected {
        Some(selection) => records.iter().filter(|r| selection.contains(&r.id)).collect(),
        None => {
            let rows: Vec<&Record> = records.iter().collect();
            let rows = apply_search(rows, visible, &state.search);
            apply_filters(rows, visible, &state.filters)
        }
    };
    apply_sort(rows, state.sort_key.as_deref(), state.direction)
}
