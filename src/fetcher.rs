use crate::error::{PanelError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref SHEET_URL_REGEX: Regex =
        Regex::new(r"spreadsheets/d/([a-zA-Z0-9-_]+)").unwrap();
}

/// Pull the sheet id out of a pasted Google Sheets URL, or accept a raw id.
pub fn extract_sheet_id(url_or_id: &str) -> String {
    SHEET_URL_REGEX
        .captures(url_or_id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| url_or_id.to_string())
}

/// Retrieves raw CSV text for a sheet id, or fails with a NetworkError.
/// The engine only sees this seam; the HTTP strategies live behind it.
pub trait SheetSource {
    fn fetch_csv(&self, sheet_id: &str) -> Result<String>;
}

/// The three retrieval strategies, tried in order. The first that yields a
/// 2xx response with a non-empty body wins.
fn strategy_urls(sheet_id: &str) -> [String; 3] {
    let gviz = format!(
        "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv&gid=0",
        sheet_id
    );
    [
        format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
            sheet_id
        ),
        format!(
            "https://api.allorigins.win/raw?url={}",
            urlencoding::encode(&gviz)
        ),
        gviz,
    ]
}

/// Blocking HTTP implementation of [`SheetSource`].
pub struct HttpSheetSource {
    client: reqwest::blocking::Client,
}

impl Default for HttpSheetSource {
    fn default() -> Self {
        HttpSheetSource::new()
    }
}

impl HttpSheetSource {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        HttpSheetSource { client }
    }
}

impl SheetSource for HttpSheetSource {
    fn fetch_csv(&self, sheet_id: &str) -> Result<String> {
        let mut last_failure = String::from("no retrieval strategy succeeded");

        for url in strategy_urls(sheet_id) {
            log::debug!("fetching sheet {} via {}", sheet_id, url);
            match self.client.get(&url).send() {
                Ok(response) if response.status().is_success() => match response.text() {
                    Ok(body) if !body.trim().is_empty() => return Ok(body),
                    Ok(_) => last_failure = "no data found in the sheet".to_string(),
                    Err(e) => last_failure = e.to_string(),
                },
                Ok(response) => {
                    last_failure = format!("HTTP {} from {}", response.status(), url);
                }
                Err(e) => last_failure = e.to_string(),
            }
        }

        Err(PanelError::Network(format!(
            "{}. Make sure the sheet is public and the URL is correct.",
            last_failure
        )))
    }
}

/// Single-flight bookkeeping for sheet loads.
///
/// Starting a load bumps the generation and returns a token; a completion
/// carrying a stale token is discarded, so a new load invalidates any prior
/// in-flight one and an abandoned fetch can finish without clobbering state.
#[derive(Debug, Default)]
pub struct LoadTracker {
    generation: u64,
}

/// Token identifying one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

impl LoadTracker {
    pub fn new() -> Self {
        LoadTracker::default()
    }

    /// Begin a load, invalidating every earlier token.
    pub fn begin(&mut self) -> LoadToken {
        self.generation += 1;
        LoadToken(self.generation)
    }

    /// Whether a completing load is still the latest one.
    pub fn is_current(&self, token: LoadToken) -> bool {
        token.0 == self.generation
    }
}
