use notes_core::Settings;
use std::path::PathBuf;

/// Per-process state shared by every worker.
///
/// Holds only the database location; each request opens (and drops) its
/// own connection.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub api_prefix: String,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            db_path: settings.db_path.clone(),
            api_prefix: settings.api_prefix.clone(),
        }
    }
}
