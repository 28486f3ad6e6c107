use std::env;
use std::fs;
use std::path::PathBuf;

/// Platform application-data root (`%APPDATA%`, `~/Library/Application Support`, `~/.local/share`).
pub fn appdata_dir() -> PathBuf {
    match env::consts::OS {
        "windows" => env::var_os("APPDATA")
            .or_else(|| env::var_os("LOCALAPPDATA"))
            .map(PathBuf::from),
        "macos" => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join("Library").join("Application Support")),
        _ => env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".local").join("share")),
    }
    .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the root directory used by the launcher itself.
pub fn default_app_dir() -> PathBuf {
    appdata_dir().join("home-launcher")
}

/// Directory holding the persisted `configClient` and `accounts` collections.
pub fn database_dir() -> PathBuf {
    default_app_dir().join("databases")
}

/// Game root handed to the external launcher. macOS keeps the folder visible,
/// every other platform hides it behind a leading dot.
pub fn game_root_dir(data_directory: &str) -> PathBuf {
    game_root_in(&appdata_dir(), data_directory, cfg!(target_os = "macos"))
}

fn game_root_in(base: &std::path::Path, data_directory: &str, macos: bool) -> PathBuf {
    if macos {
        base.join(data_directory)
    } else {
        base.join(format!(".{data_directory}"))
    }
}

/// Create the on-disk folder layout expected by the launcher.
pub fn ensure_base_dirs() -> std::io::Result<()> {
    for dir in [default_app_dir(), database_dir()] {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
