//! # Sheet Admin
//!
//! An admin console engine for event-registration data held in Google Sheets,
//! built in Rust.
//!
//! ## Overview
//!
//! This project reworks a browser-based registration admin panel into a Rust
//! backend. Organizers point it at a public Google Sheet; the engine imports
//! the sheet as CSV and provides everything the admin console needs: live
//! filtering, search, sorting and pagination over the rows, row selection with
//! named saved snapshots, per-sheet column settings, CSV and printable-PDF
//! export, and staggered bulk messaging over email or WhatsApp deep links.
//!
//! ## Architecture
//!
//! The engine is a set of pure components composed by a grid controller:
//!
//! ### Core Components
//! - CSV Codec - Parses Google's CSV output and serializes exports, including
//!   the phone-literal escape that keeps spreadsheet apps from mangling
//!   phone numbers
//! - Row Store - Ordered records with stable `row-<n>` ids for the session
//! - Column Model - Visibility, display aliases and pixel widths per sheet
//! - Selection Sets - Checked and highlighted row ids, pruned on delete
//! - Query Pipeline - filter, search, sort and paginate as pure stages
//! - Export Codec - CSV text and a printable HTML document with a colgroup
//!   percentage layout
//!
//! ### Application Layer
//! - Admin Panel - Sheet registry, saved selections, team members, login
//!   flag and the load lifecycle, persisted through a key-value store
//! - Fetcher - Three-strategy sheet retrieval behind a `SheetSource` trait,
//!   with single-flight load tracking
//! - Bulk Sender - An explicit task queue advanced once per stagger tick,
//!   cancellable between steps
//!
//! ### Persistence Layer
//! - `KeyValueStore` trait with an in-memory store for tests and a JSON-file
//!   store for the server
//!
//! ## Modules
//!
//! - **csv**: CSV parsing and serialization (quoting, phone-literal escape)
//! - **store**: Record and RowStore (import, update, delete)
//! - **columns**: ColumnModel (hide/restore, aliases, width gestures)
//! - **selection**: SelectionSet (toggle, page toggle, pruning)
//! - **query**: FilterState and the filter/search/sort/paginate stages
//! - **grid**: DataGrid, the controller enforcing cross-component invariants
//! - **export**: CSV export and the printable PDF document
//! - **messaging**: Phone normalization, placeholder templates, deep links
//! - **sender**: BulkSender task queue
//! - **fetcher**: Sheet id extraction, retrieval strategies, load tracking
//! - **storage**: KeyValueStore trait and implementations
//! - **panel**: AdminPanel application state
//! - **error**: The shared error type
//! - **app**: Routing and handlers (behind the `web` feature)
//!
//! ## REST API Endpoints
//!
//! - `/api/login`, `/api/logout` - Session flag
//! - `/api/sheets`, `/api/sheets/:id`, `/api/sheets/:id/activate` - Registry
//! - `/api/load` - Fetch and import the active sheet
//! - `/api/grid`, `/api/grid/*` - The visible page and its filter state
//! - `/api/rows/*`, `/api/select/*`, `/api/highlight/*` - Row operations
//! - `/api/columns/*` - Visibility, aliases, widths
//! - `/api/selections*` - Saved selection snapshots
//! - `/api/team*` - Team member list
//! - `/api/export/csv`, `/api/export/pdf` - Exports
//! - `/api/batch` - Prepare a bulk messaging batch

pub mod columns;
pub mod csv;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod grid;
pub mod messaging;
pub mod panel;
pub mod query;
pub mod selection;
pub mod sender;
pub mod storage;
pub mod store;

#[cfg(feature = "web")]
pub mod app;

/// Re-export the main types to make the crate easier to use
pub use columns::{ColumnModel, MIN_COLUMN_WIDTH};
pub use error::{PanelError, Result};
pub use export::PdfConfig;
pub use fetcher::{HttpSheetSource, LoadToken, LoadTracker, SheetSource};
pub use grid::{DataGrid, DEFAULT_ROWS_PER_PAGE};
pub use messaging::{Batch, Channel, Outbound, Template};
pub use panel::{AdminPanel, Role, SavedSelection, Sheet, TeamMember};
pub use query::{FilterState, SortDirection};
pub use selection::SelectionSet;
pub use sender::{BulkSender, STAGGER, TAB_WARNING_THRESHOLD};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use store::{Record, RowStore};
