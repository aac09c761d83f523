use std::fmt;

/// Error type shared across the admin engine.
///
/// Every operation that can refuse its input reports one of these variants;
/// nothing in the engine is fatal. The web layer and test binaries format
/// them with `Display` and keep the application interactive.
#[derive(Debug)]
pub enum PanelError {
    /// A record id was not found in the row store.
    NotFound(String),
    /// An export was requested over zero rows.
    EmptyExport,
    /// Column width percentages did not round to a 100% total.
    InvalidWidths(f64),
    /// A name field (saved selection, sheet) was empty.
    EmptyName,
    /// An operation over the selection was requested with no rows selected.
    EmptySelection,
    /// A saved selection or sheet with this name/id already exists.
    Duplicate(String),
    /// All sheet retrieval strategies failed.
    Network(String),
    /// The key-value store failed to read or write.
    Storage(String),
    /// A persisted value could not be decoded.
    Corrupt(String),
    /// Login was attempted with wrong credentials.
    BadCredentials,
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::NotFound(id) => write!(f, "no record with id {id}"),
            PanelError::EmptyExport => write!(f, "there is no data to export"),
            PanelError::InvalidWidths(total) => {
                write!(f, "total width must be 100%, current total is {total:.2}%")
            }
            PanelError::EmptyName => write!(f, "name cannot be empty"),
            PanelError::EmptySelection => write!(f, "no rows are selected"),
            PanelError::Duplicate(name) => write!(f, "\"{name}\" already exists"),
            PanelError::Network(msg) => write!(f, "failed to fetch sheet data: {msg}"),
            PanelError::Storage(msg) => write!(f, "storage error: {msg}"),
            PanelError::Corrupt(key) => write!(f, "stored value for \"{key}\" is not valid JSON"),
            PanelError::BadCredentials => write!(f, "invalid credentials, try again"),
        }
    }
}

impl std::error::Error for PanelError {}

impl From<serde_json::Error> for PanelError {
    fn from(e: serde_json::Error) -> Self {
        PanelError::Corrupt(e.to_string())
    }
}

impl From<std::io::Error> for PanelError {
    fn from(e: std::io::Error) -> Self {
        PanelError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
