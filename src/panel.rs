use crate::error::{PanelError, Result};
use crate::export::PdfConfig;
use crate::fetcher::{self, LoadToken, LoadTracker, SheetSource};
use crate::grid::DataGrid;
use crate::messaging::{self, Batch, Channel};
use crate::selection::SelectionSet;
use crate::storage::{self, KeyValueStore};
use crate::store::Record;
use crate::{csv, export};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "planbot@2025";

/// One tracked Google Sheet.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Sheet {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TeamMember {
    pub email: String,
    pub role: Role,
}

/// A named snapshot of checked rows: the ids plus a copy of the record data
/// as it looked when saved.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SavedSelection {
    pub name: String,
    pub ids: Vec<String>,
    pub data: Vec<Record>,
    pub saved_at: String,
}

/// Application state for the admin panel.
///
/// Owns the sheet registry, the live [`DataGrid`], saved selections, the
/// team-member list and the PDF export configuration. Persisted values are
/// loaded once at construction and written back by the explicit `persist_*`
/// calls each mutation makes; the core never touches storage behind the
/// caller's back.
pub struct AdminPanel<S: KeyValueStore> {
    store: S,
    pub sheets: Vec<Sheet>,
    pub active_sheet: Option<String>,
    pub grid: DataGrid,
    pub saved_selections: Vec<SavedSelection>,
    pub team: Vec<TeamMember>,
    pub pdf_config: PdfConfig,
    pub logged_in: bool,
    loads: LoadTracker,
}

impl<S: KeyValueStore> AdminPanel<S> {
    /// Build the panel from whatever the store remembers.
    pub fn new(store: S) -> Result<Self> {
        let sheets: Vec<Sheet> = storage::load_json(&store, storage::KEY_SHEETS)?;
        let active_sheet: Option<String> = storage::load_json(&store, storage::KEY_ACTIVE_SHEET)?;
        let saved_selections = storage::load_json(&store, storage::KEY_SAVED_SELECTIONS)?;
        let team = storage::load_json(&store, storage::KEY_TEAM_MEMBERS)?;
        let pdf_config = match store.get(storage::KEY_PDF_CONFIG) {
            Some(raw) => serde_json::from_str(&raw)?,
            None => PdfConfig::default(),
        };
        let logged_in: bool = storage::load_json(&store, storage::KEY_LOGGED_IN)?;

        Ok(AdminPanel {
            store,
            sheets,
            active_sheet,
            grid: DataGrid::new(),
            saved_selections,
            team,
            pdf_config,
            logged_in,
            loads: LoadTracker::new(),
        })
    }

    // ----- login -----

    /// Hardcoded credential check; sets and persists the login flag.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if username == ADMIN_USERNAME && password == ADMIN_PASSWORD {
            self.logged_in = true;
            storage::save_json(&self.store, storage::KEY_LOGGED_IN, &true)?;
            Ok(())
        } else {
            Err(PanelError::BadCredentials)
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        self.logged_in = false;
        self.grid = DataGrid::new();
        storage::save_json(&self.store, storage::KEY_LOGGED_IN, &false)
    }

    // ----- sheet registry -----

    /// Register a sheet by pasted URL or raw id and make it active.
    pub fn add_sheet(&mut self, url_or_id: &str, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(PanelError::EmptyName);
        }
        let id = fetcher::extract_sheet_id(url_or_id.trim());
        if self.sheets.iter().any(|s| s.id == id) {
            return Err(PanelError::Duplicate(id));
        }
        self.sheets.push(Sheet {
            id: id.clone(),
            name: name.trim().to_string(),
        });
        self.active_sheet = Some(id);
        self.persist_sheets()
    }

    /// Drop a sheet; when it was active, the first remaining sheet takes
    /// over (or none).
    pub fn remove_sheet(&mut self, id: &str) -> Result<()> {
        let before = self.sheets.len();
        self.sheets.retain(|s| s.id != id);
        if self.sheets.len() == before {
            return Err(PanelError::NotFound(id.to_string()));
        }
        if self.active_sheet.as_deref() == Some(id) {
            self.active_sheet = self.sheets.first().map(|s| s.id.clone());
        }
        self.persist_sheets()
    }

    pub fn set_active_sheet(&mut self, id: &str) -> Result<()> {
        if !self.sheets.iter().any(|s| s.id == id) {
            return Err(PanelError::NotFound(id.to_string()));
        }
        self.active_sheet = Some(id.to_string());
        self.persist_sheets()
    }

    pub fn active_sheet_name(&self) -> Option<&str> {
        let id = self.active_sheet.as_deref()?;
        self.sheets
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
    }

    fn persist_sheets(&self) -> Result<()> {
        storage::save_json(&self.store, storage::KEY_SHEETS, &self.sheets)?;
        storage::save_json(&self.store, storage::KEY_ACTIVE_SHEET, &self.active_sheet)
    }

    // ----- sheet loading -----

    /// Begin a load of the active sheet. Only the newest token may complete;
    /// starting another load abandons any in-flight one.
    pub fn begin_load(&mut self) -> Result<LoadToken> {
        if self.active_sheet.is_none() {
            return Err(PanelError::Network(
                "please select a Google Sheet".to_string(),
            ));
        }
        Ok(self.loads.begin())
    }

    /// Finish a load with the fetched CSV text. Returns `false` (leaving the
    /// prior dataset untouched) when the token went stale.
    pub fn complete_load(&mut self, token: LoadToken, csv_text: &str) -> Result<bool> {
        if !self.loads.is_current(token) {
            log::debug!("discarding stale sheet load");
            return Ok(false);
        }
        let sheet_id = self
            .active_sheet
            .clone()
            .ok_or_else(|| PanelError::Network("please select a Google Sheet".to_string()))?;

        let (headers, rows) = csv::parse_sheet(csv_text);
        let hidden: Vec<String> =
            storage::load_json(&self.store, &storage::hidden_columns_key(&sheet_id))?;
        let aliases: HashMap<String, String> =
            storage::load_json(&self.store, &storage::column_aliases_key(&sheet_id))?;
        self.grid.import(headers, rows, &hidden, aliases);
        Ok(true)
    }

    /// Fetch and import the active sheet in one step. On any failure the
    /// prior dataset is retained unchanged.
    pub fn load_active_sheet(&mut self, source: &dyn SheetSource) -> Result<()> {
        let token = self.begin_load()?;
        let sheet_id = self
            .active_sheet
            .clone()
            .ok_or_else(|| PanelError::Network("please select a Google Sheet".to_string()))?;
        let body = source.fetch_csv(&sheet_id)?;
        self.complete_load(token, &body)?;
        Ok(())
    }

    // ----- column settings -----

    /// Hide a column and persist the hidden list for this sheet.
    pub fn hide_column(&mut self, header: &str) -> Result<()> {
        self.grid.columns.hide(header);
        if let Some(id) = &self.active_sheet {
            storage::save_json(
                &self.store,
                &storage::hidden_columns_key(id),
                &self.grid.columns.hidden(),
            )?;
        }
        Ok(())
    }

    /// Restore all columns and clear the persisted hidden list.
    pub fn restore_columns(&mut self) -> Result<()> {
        self.grid.columns.restore();
        if let Some(id) = &self.active_sheet {
            self.store.remove(&storage::hidden_columns_key(id))?;
        }
        Ok(())
    }

    /// Replace the alias map and persist it for this sheet.
    pub fn set_column_aliases(&mut self, aliases: HashMap<String, String>) -> Result<()> {
        for (header, alias) in &aliases {
            self.grid.columns.set_alias(header, alias);
        }
        if let Some(id) = &self.active_sheet {
            storage::save_json(
                &self.store,
                &storage::column_aliases_key(id),
                self.grid.columns.aliases(),
            )?;
        }
        Ok(())
    }

    // ----- saved selections -----

    /// Snapshot the current selection under a name, replacing any previous
    /// snapshot with the same name.
    pub fn save_selection(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(PanelError::EmptyName);
        }
        if self.grid.selected.is_empty() {
            return Err(PanelError::EmptySelection);
        }
        let data: Vec<Record> = self
            .grid
            .selected_records()
            .into_iter()
            .cloned()
            .collect();
        self.saved_selections.retain(|s| s.name != name);
        self.saved_selections.push(SavedSelection {
            name: name.to_string(),
            ids: self.grid.selected.to_vec(),
            data,
            saved_at: Local::now().to_rfc3339(),
        });
        self.persist_selections()
    }

    /// Replace the live selection with a saved one's ids.
    pub fn load_selection(&mut self, name: &str) -> Result<()> {
        let saved = self
            .saved_selections
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| PanelError::NotFound(name.to_string()))?;
        self.grid.selected = SelectionSet::from_ids(saved.ids.iter().cloned());
        Ok(())
    }

    pub fn delete_selection(&mut self, name: &str) -> Result<()> {
        let before = self.saved_selections.len();
        self.saved_selections.retain(|s| s.name != name);
        if self.saved_selections.len() == before {
            return Err(PanelError::NotFound(name.to_string()));
        }
        self.persist_selections()
    }

    pub fn rename_selection(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if new_name.trim().is_empty() {
            return Err(PanelError::EmptyName);
        }
        if self.saved_selections.iter().any(|s| s.name == new_name) {
            return Err(PanelError::Duplicate(new_name.to_string()));
        }
        let saved = self
            .saved_selections
            .iter_mut()
            .find(|s| s.name == old_name)
            .ok_or_else(|| PanelError::NotFound(old_name.to_string()))?;
        saved.name = new_name.to_string();
        self.persist_selections()
    }

    fn persist_selections(&self) -> Result<()> {
        storage::save_json(
            &self.store,
            storage::KEY_SAVED_SELECTIONS,
            &self.saved_selections,
        )
    }

    // ----- team members -----

    pub fn add_team_member(&mut self, email: &str, role: Role) -> Result<()> {
        if email.trim().is_empty() {
            return Err(PanelError::EmptyName);
        }
        if self.team.iter().any(|m| m.email == email) {
            return Err(PanelError::Duplicate(email.to_string()));
        }
        self.team.push(TeamMember {
            email: email.to_string(),
            role,
        });
        self.persist_team()
    }

    pub fn remove_team_member(&mut self, email: &str) -> Result<()> {
        let before = self.team.len();
        self.team.retain(|m| m.email != email);
        if self.team.len() == before {
            return Err(PanelError::NotFound(email.to_string()));
        }
        self.persist_team()
    }

    pub fn set_member_role(&mut self, email: &str, role: Role) -> Result<()> {
        let member = self
            .team
            .iter_mut()
            .find(|m| m.email == email)
            .ok_or_else(|| PanelError::NotFound(email.to_string()))?;
        member.role = role;
        self.persist_team()
    }

    fn persist_team(&self) -> Result<()> {
        storage::save_json(&self.store, storage::KEY_TEAM_MEMBERS, &self.team)
    }

    // ----- export & messaging -----

    pub fn set_pdf_config(&mut self, config: PdfConfig) -> Result<()> {
        self.pdf_config = config;
        storage::save_json(&self.store, storage::KEY_PDF_CONFIG, &self.pdf_config)
    }

    /// CSV of the whole derived result set (filters and sort applied).
    pub fn export_all_csv(&self) -> Result<String> {
        let rows = self.grid.matching();
        export::to_csv(&rows, &self.visible_or(None))
    }

    /// CSV of the selected rows, optionally restricted to chosen columns.
    pub fn export_selected_csv(&self, columns: Option<&[String]>) -> Result<String> {
        let rows = self.grid.selected_records();
        export::to_csv(&rows, &self.visible_or(columns))
    }

    /// Printable HTML for the selected rows or the whole derived set.
    pub fn export_pdf_document(
        &self,
        selected_only: bool,
        columns: Option<&[String]>,
        widths: &[f64],
        title: &str,
    ) -> Result<String> {
        export::validate_widths(widths)?;
        let rows = if selected_only {
            self.grid.selected_records()
        } else {
            self.grid.matching()
        };
        export::to_printable_document(
            &rows,
            &self.visible_or(columns),
            widths,
            title,
            &self.pdf_config,
        )
    }

    /// Prepare a messaging batch over the selected rows.
    pub fn prepare_batch(
        &self,
        channel: Channel,
        column: &str,
        subject: &str,
        message: &str,
    ) -> Batch {
        let rows = self.grid.selected_records();
        messaging::build_batch(&rows, column, subject, message, channel)
    }

    fn visible_or(&self, columns: Option<&[String]>) -> Vec<String> {
        match columns {
            Some(cols) => cols.to_vec(),
            None => self.grid.columns.visible().to_vec(),
        }
    }
}
