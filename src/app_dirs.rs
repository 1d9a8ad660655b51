use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "botornot").map(|pd| pd.config_dir().join("config.json"))
    }

    /// Where the tracing log goes; the terminal itself belongs to the TUI.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("botornot");
            Some(state_dir.join("botornot.log"))
        } else {
            ProjectDirs::from("", "", "botornot")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("botornot.log"))
        }
    }
}
