use crate::columns::ColumnModel;
use crate::error::Result;
use crate::query::{self, FilterState};
use crate::selection::SelectionSet;
use crate::store::{Record, RowStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

/// The editable, filterable, sortable data grid for one loaded sheet.
///
/// Owns the row store, column model, selection sets and filter state, and
/// enforces the invariants that cross those components: deleting records
/// prunes both id sets, any change to filters/search/sort/page-size resets
/// the page when it would fall out of bounds, and a fresh import resets all
/// derived state. The visible page is a pure recomputation over the current
/// state on every read.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct DataGrid {
    pub store: RowStore,
    pub columns: ColumnModel,
    pub selected: SelectionSet,
    pub highlighted: SelectionSet,
    pub filters: FilterState,
    pub only_selected: bool,
    page: usize,
    rows_per_page: usize,
}

impl Default for DataGrid {
    fn default() -> Self {
        DataGrid {
            store: RowStore::new(),
            columns: ColumnModel::default(),
            selected: SelectionSet::new(),
            highlighted: SelectionSet::new(),
            filters: FilterState::default(),
            only_selected: false,
            page: 1,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl DataGrid {
    pub fn new() -> Self {
        DataGrid::default()
    }

    /// Replace the dataset with freshly parsed sheet content.
    ///
    /// `hidden` and `aliases` are this sheet's persisted column settings,
    /// re-applied to the new header list. All derived state (selection,
    /// highlight, filters, search, page) resets.
    pub fn import(
        &mut self,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        hidden: &[String],
        aliases: HashMap<String, String>,
    ) {
        self.store.import(&headers, rows);
        self.columns = ColumnModel::new(headers, hidden, aliases);
        self.selected.clear();
        self.highlighted.clear();
        self.filters = FilterState::default();
        self.only_selected = false;
        self.page = 1;
        log::info!(
            "imported {} records, {} visible columns",
            self.store.len(),
            self.columns.visible().len()
        );
    }

    pub fn update_row(&mut self, id: &str, fields: HashMap<String, String>) -> Result<()> {
        self.store.update(id, fields)
    }

    /// Delete one record, keeping the id sets consistent with live records.
    pub fn delete_row(&mut self, id: &str) -> Result<()> {
        self.store.delete(id)?;
        let gone = [id.to_string()];
        self.selected.prune(&gone);
        self.highlighted.prune(&gone);
        self.clamp_page();
        Ok(())
    }

    /// Delete every selected record; returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selected.to_vec();
        let removed = self.store.delete_many(&ids);
        self.selected.prune(&ids);
        self.highlighted.prune(&ids);
        self.clamp_page();
        log::info!("deleted {} selected record(s)", removed);
        removed
    }

    pub fn set_filter(&mut self, header: &str, value: &str) {
        if value.is_empty() {
            self.filters.filters.remove(header);
        } else {
            self.filters.filters.insert(header.to_string(), value.to_string());
        }
        self.clamp_page();
    }

    pub fn set_search(&mut self, term: &str) {
        self.filters.search = term.to_string();
        self.clamp_page();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.clamp_page();
    }

    pub fn toggle_sort(&mut self, header: &str) {
        self.filters.toggle_sort(header);
        self.clamp_page();
    }

    pub fn set_rows_per_page(&mut self, size: usize) {
        self.rows_per_page = size.max(1);
        self.clamp_page();
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        query::page_count(self.matching().len(), self.rows_per_page)
    }

    pub fn next_page(&mut self) {
        if self.page < self.page_count() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn set_only_selected(&mut self, on: bool) {
        self.only_selected = on;
        self.clamp_page();
    }

    /// The derived result set before pagination: only-selected shortcut or
    /// search + per-column filters, then the stable sort.
    pub fn matching(&self) -> Vec<&Record> {
        let only = if self.only_selected {
            Some(&self.selected)
        } else {
            None
        };
        query::run(
            self.store.records(),
            self.columns.visible(),
            &self.filters,
            only,
        )
    }

    /// The visible page of the derived result set.
    pub fn page_rows(&self) -> Vec<&Record> {
        query::paginate(self.matching(), self.page, self.rows_per_page)
    }

    pub fn toggle_row(&mut self, id: &str) {
        self.selected.toggle(id);
    }

    /// Select or deselect every row on the current page.
    pub fn toggle_page_selection(&mut self) {
        let page_ids: Vec<String> = self.page_rows().iter().map(|r| r.id.clone()).collect();
        self.selected
            .toggle_page(page_ids.iter().map(String::as_str));
    }

    pub fn toggle_highlight(&mut self, id: &str) {
        self.highlighted.toggle(id);
    }

    pub fn clear_highlights(&mut self) {
        self.highlighted.clear();
    }

    /// Records currently selected, in store order.
    pub fn selected_records(&self) -> Vec<&Record> {
        self.store.filter_by_ids(&self.selected)
    }

    /// Reset to page 1 when the current page index would be out of bounds.
    fn clamp_page(&mut self) {
        if self.page > query::page_count(self.matching().len(), self.rows_per_page) {
            self.page = 1;
        }
    }
}
