use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::PanelError;
use crate::export::PdfConfig;
use crate::fetcher::{HttpSheetSource, SheetSource};
use crate::messaging::Channel;
use crate::panel::{AdminPanel, Role};
use crate::storage::JsonFileStore;

pub struct AppState {
    panel: Mutex<AdminPanel<JsonFileStore>>,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct AddSheetRequest {
    url: String,
    name: String,
}

#[derive(Deserialize)]
struct HeaderValue {
    header: String,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct SearchRequest {
    term: String,
}

#[derive(Deserialize)]
struct PageRequest {
    page: Option<usize>,
    rows_per_page: Option<usize>,
}

#[derive(Deserialize)]
struct RowUpdate {
    id: String,
    fields: HashMap<String, String>,
}

#[derive(Deserialize)]
struct IdRequest {
    id: String,
}

#[derive(Deserialize)]
struct NameRequest {
    name: String,
}

#[derive(Deserialize)]
struct RenameRequest {
    old_name: String,
    new_name: String,
}

#[derive(Deserialize)]
struct FlagRequest {
    on: bool,
}

#[derive(Deserialize)]
struct AliasRequest {
    aliases: HashMap<String, String>,
}

#[derive(Deserialize)]
struct WidthRequest {
    header: String,
    px: f64,
}

#[derive(Deserialize)]
struct MemberRequest {
    email: String,
    role: Role,
}

#[derive(Deserialize)]
struct ExportQuery {
    #[serde(default)]
    selected: bool,
}

#[derive(Deserialize)]
struct PdfRequest {
    #[serde(default)]
    selected_only: bool,
    columns: Option<Vec<String>>,
    widths: Vec<f64>,
    title: String,
}

#[derive(Deserialize)]
struct BatchRequest {
    channel: Channel,
    column: String,
    #[serde(default)]
    subject: String,
    message: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

impl StatusResponse {
    fn ok() -> Json<StatusResponse> {
        Json(StatusResponse {
            status: "ok".to_string(),
            message: None,
        })
    }
}

/// Map an engine error to an HTTP response.
fn fail(e: PanelError) -> Response {
    let status = match e {
        PanelError::NotFound(_) => StatusCode::NOT_FOUND,
        PanelError::BadCredentials => StatusCode::UNAUTHORIZED,
        PanelError::Storage(_) | PanelError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        PanelError::Network(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(StatusResponse {
            status: "error".to_string(),
            message: Some(e.to_string()),
        }),
    )
        .into_response()
}

pub async fn run(store_path: &str, bind: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::open(store_path)?;
    let panel = AdminPanel::new(store)?;

    let app_state = Arc::new(AppState {
        panel: Mutex::new(panel),
    });

    let app = Router::new()
        .route("/", get(serve_landing))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/sheets", get(list_sheets).post(add_sheet))
        .route("/api/sheets/:id", delete(remove_sheet))
        .route("/api/sheets/:id/activate", post(activate_sheet))
        .route("/api/load", post(load_sheet))
        .route("/api/grid", get(get_grid))
        .route("/api/grid/filter", post(set_filter))
        .route("/api/grid/search", post(set_search))
        .route("/api/grid/clear_filters", post(clear_filters))
        .route("/api/grid/sort", post(toggle_sort))
        .route("/api/grid/page", post(set_page))
        .route("/api/rows/update", post(update_row))
        .route("/api/rows/delete", post(delete_row))
        .route("/api/rows/delete_selected", post(delete_selected))
        .route("/api/select/toggle", post(toggle_select))
        .route("/api/select/page", post(toggle_page_selection))
        .route("/api/select/clear", post(clear_selection))
        .route("/api/select/only", post(set_only_selected))
        .route("/api/highlight/toggle", post(toggle_highlight))
        .route("/api/highlight/clear", post(clear_highlights))
        .route("/api/columns/hide", post(hide_column))
        .route("/api/columns/restore", post(restore_columns))
        .route("/api/columns/aliases", post(set_aliases))
        .route("/api/columns/width", post(set_width))
        .route("/api/selections", get(list_selections).post(save_selection))
        .route("/api/selections/load", post(load_selection))
        .route("/api/selections/delete", post(delete_selection))
        .route("/api/selections/rename", post(rename_selection))
        .route("/api/team", get(list_team).post(add_member))
        .route("/api/team/remove", post(remove_member))
        .route("/api/team/role", post(set_member_role))
        .route("/api/pdf_config", post(set_pdf_config))
        .route("/api/export/csv", get(export_csv))
        .route("/api/export/pdf", post(export_pdf))
        .route("/api/batch", post(prepare_batch))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = TcpListener::bind(bind).await?;
    log::info!("listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_landing() -> Html<&'static str> {
    Html("<!DOCTYPE html><html><body><h1>Sheet Admin</h1><p>The API lives under /api.</p></body></html>")
}

async fn login(State(state): State<Arc<AppState>>, Json(payload): Json<LoginRequest>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.login(&payload.username, &payload.password) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn logout(State(state): State<Arc<AppState>>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.logout() {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn list_sheets(State(state): State<Arc<AppState>>) -> Response {
    let panel = state.panel.lock().unwrap();
    Json(serde_json::json!({
        "sheets": panel.sheets,
        "active": panel.active_sheet,
    }))
    .into_response()
}

async fn add_sheet(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddSheetRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.add_sheet(&payload.url, &payload.name) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn remove_sheet(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.remove_sheet(&id) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn activate_sheet(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.set_active_sheet(&id) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

/// Fetch the active sheet without holding the panel lock across the network
/// round-trip. A load that finishes after a newer one began is discarded.
async fn load_sheet(State(state): State<Arc<AppState>>) -> Response {
    let (token, sheet_id) = {
        let mut panel = state.panel.lock().unwrap();
        let token = match panel.begin_load() {
            Ok(token) => token,
            Err(e) => return fail(e),
        };
        let id = panel.active_sheet.clone().unwrap_or_default();
        (token, id)
    };

    let fetched = tokio::task::spawn_blocking(move || {
        let source = HttpSheetSource::new();
        source.fetch_csv(&sheet_id)
    })
    .await;

    let body = match fetched {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => return fail(e),
        Err(e) => return fail(PanelError::Network(e.to_string())),
    };

    let mut panel = state.panel.lock().unwrap();
    match panel.complete_load(token, &body) {
        Ok(true) => StatusResponse::ok().into_response(),
        Ok(false) => fail(PanelError::Network(
            "superseded by a newer load".to_string(),
        )),
        Err(e) => fail(e),
    }
}

async fn get_grid(State(state): State<Arc<AppState>>) -> Response {
    let panel = state.panel.lock().unwrap();
    let grid = &panel.grid;
    let headers: Vec<serde_json::Value> = grid
        .columns
        .visible()
        .iter()
        .map(|h| {
            serde_json::json!({
                "header": h,
                "display": grid.columns.display(h),
                "width": grid.columns.width(h),
            })
        })
        .collect();
    let rows: Vec<serde_json::Value> = grid
        .page_rows()
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r.id,
                "fields": r.fields,
                "selected": grid.selected.contains(&r.id),
                "highlighted": grid.highlighted.contains(&r.id),
            })
        })
        .collect();

    Json(serde_json::json!({
        "headers": headers,
        "rows": rows,
        "page": grid.page(),
        "page_count": grid.page_count(),
        "total": grid.matching().len(),
        "selected": grid.selected.len(),
        "only_selected": grid.only_selected,
    }))
    .into_response()
}

async fn set_filter(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HeaderValue>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.set_filter(&payload.header, &payload.value);
    StatusResponse::ok().into_response()
}

async fn set_search(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SearchRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.set_search(&payload.term);
    StatusResponse::ok().into_response()
}

async fn clear_filters(State(state): State<Arc<AppState>>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.clear_filters();
    StatusResponse::ok().into_response()
}

async fn toggle_sort(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HeaderValue>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.toggle_sort(&payload.header);
    StatusResponse::ok().into_response()
}

async fn set_page(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PageRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    if let Some(size) = payload.rows_per_page {
        panel.grid.set_rows_per_page(size);
    }
    if let Some(page) = payload.page {
        while panel.grid.page() < page && panel.grid.page() < panel.grid.page_count() {
            panel.grid.next_page();
        }
        while panel.grid.page() > page && panel.grid.page() > 1 {
            panel.grid.prev_page();
        }
    }
    StatusResponse::ok().into_response()
}

async fn update_row(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RowUpdate>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.grid.update_row(&payload.id, payload.fields) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn delete_row(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IdRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.grid.delete_row(&payload.id) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn delete_selected(State(state): State<Arc<AppState>>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    let removed = panel.grid.delete_selected();
    Json(serde_json::json!({ "status": "ok", "removed": removed })).into_response()
}

async fn toggle_select(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IdRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.toggle_row(&payload.id);
    StatusResponse::ok().into_response()
}

async fn toggle_page_selection(State(state): State<Arc<AppState>>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.toggle_page_selection();
    StatusResponse::ok().into_response()
}

async fn clear_selection(State(state): State<Arc<AppState>>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.selected.clear();
    StatusResponse::ok().into_response()
}

async fn set_only_selected(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FlagRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.set_only_selected(payload.on);
    StatusResponse::ok().into_response()
}

async fn toggle_highlight(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IdRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.toggle_highlight(&payload.id);
    StatusResponse::ok().into_response()
}

async fn clear_highlights(State(state): State<Arc<AppState>>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    panel.grid.clear_highlights();
    StatusResponse::ok().into_response()
}

async fn hide_column(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HeaderValue>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.hide_column(&payload.header) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn restore_columns(State(state): State<Arc<AppState>>) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.restore_columns() {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn set_aliases(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AliasRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.set_column_aliases(payload.aliases) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn set_width(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WidthRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    let applied = panel.grid.columns.set_width(&payload.header, payload.px);
    Json(serde_json::json!({ "status": "ok", "applied": applied })).into_response()
}

async fn list_selections(State(state): State<Arc<AppState>>) -> Response {
    let panel = state.panel.lock().unwrap();
    Json(serde_json::json!({ "selections": panel.saved_selections })).into_response()
}

async fn save_selection(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NameRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.save_selection(&payload.name) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn load_selection(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NameRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.load_selection(&payload.name) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn delete_selection(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NameRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.delete_selection(&payload.name) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn rename_selection(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RenameRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.rename_selection(&payload.old_name, &payload.new_name) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn list_team(State(state): State<Arc<AppState>>) -> Response {
    let panel = state.panel.lock().unwrap();
    Json(serde_json::json!({ "team": panel.team })).into_response()
}

async fn add_member(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MemberRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.add_team_member(&payload.email, payload.role) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn remove_member(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NameRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.remove_team_member(&payload.name) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn set_member_role(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MemberRequest>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.set_member_role(&payload.email, payload.role) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn set_pdf_config(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PdfConfig>,
) -> Response {
    let mut panel = state.panel.lock().unwrap();
    match panel.set_pdf_config(payload) {
        Ok(()) => StatusResponse::ok().into_response(),
        Err(e) => fail(e),
    }
}

async fn export_csv(
    Query(params): Query<ExportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let panel = state.panel.lock().unwrap();
    let result = if params.selected {
        panel.export_selected_csv(None)
    } else {
        panel.export_all_csv()
    };
    match result {
        Ok(csv) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/csv")
            .header(
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"registrations.csv\"",
            )
            .body(axum::body::Body::from(csv))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => fail(e),
    }
}

async fn export_pdf(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PdfRequest>,
) -> Response {
    let panel = state.panel.lock().unwrap();
    match panel.export_pdf_document(
        payload.selected_only,
        payload.columns.as_deref(),
        &payload.widths,
        &payload.title,
    ) {
        Ok(html) => Html(html).into_response(),
        Err(e) => fail(e),
    }
}

async fn prepare_batch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BatchRequest>,
) -> Response {
    let panel = state.panel.lock().unwrap();
    let batch = panel.prepare_batch(
        payload.channel,
        &payload.column,
        &payload.subject,
        &payload.message,
    );
    Json(serde_json::json!({
        "messages": batch.messages,
        "skipped": batch.skipped,
    }))
    .into_response()
}
