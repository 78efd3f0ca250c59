use std::env;
use std::path::PathBuf;

/// Default HTTP port for the API server
pub const DEFAULT_PORT: u16 = 4010;

/// File name of the SQLite database inside the AutoHub directory
pub const DATABASE_FILE_NAME: &str = "autohub.db";

/// Get the path to the AutoHub directory (~/.autohub)
pub fn autohub_dir() -> PathBuf {
    // AUTOHUB_HOME wins, then HOME (useful for tests)
    if let Ok(dir) = env::var("AUTOHUB_HOME") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".autohub")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".autohub")
    }
}

/// Get the path to the default database file (~/.autohub/autohub.db)
pub fn database_file() -> PathBuf {
    autohub_dir().join(DATABASE_FILE_NAME)
}
