#![cfg(not(tarpaulin_include))]

use sheet_admin::app;

/// Main entry point for the web application
///
/// Starts the admin-panel API server. Persistent state (tracked sheets,
/// saved selections, column settings, team members) lives in a single JSON
/// file whose location can be overridden with the `SHEET_ADMIN_STORE`
/// environment variable; `SHEET_ADMIN_BIND` overrides the listen address.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let store_path =
        std::env::var("SHEET_ADMIN_STORE").unwrap_or_else(|_| "sheet_admin.json".to_string());
    let bind = std::env::var("SHEET_ADMIN_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    app::run(&store_path, &bind).await
}
