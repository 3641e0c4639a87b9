use std::path::PathBuf;
use anyhow::Result;

/// Returns the application data directory.
/// Uses `dirs::data_dir()` + "aria" (e.g., %APPDATA%/aria or ~/.local/share/aria).
/// Creates the directory if it doesn't exist.
pub fn get_aria_data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    let path = base.join("aria");

    if !path.exists() {
        std::fs::create_dir_all(&path)?;
    }

    Ok(path)
}
