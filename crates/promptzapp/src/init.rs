//! # Context Bootstrap
//!
//! [`initialize`] turns "where is my data" into a ready [`PromptzApi`]:
//!
//! 1. Resolve the data directory.
//! 2. Load [`PromptzConfig`] from `promptz.toml` in that directory.
//! 3. Build an [`FsBackend`] over it.
//! 4. Load the library and the widget state.
//!
//! ## Data Directory Resolution
//!
//! In priority order:
//! 1. `data_override`, when the host passes one.
//! 2. The `PROMPTZ_DATA` environment variable. Tests use this to isolate state.
//! 3. The OS-appropriate data directory (via the `directories` crate).
//!
//! The directory does not need to exist. It is created on the first write.

use crate::api::PromptzApi;
use crate::config::PromptzConfig;
use crate::error::{PromptzError, Result};
use crate::store::fs_backend::FsBackend;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DATA_ENV_VAR: &str = "PROMPTZ_DATA";
pub const CONFIG_FILE: &str = "promptz.toml";

pub struct PromptzContext {
    pub api: PromptzApi<FsBackend>,
    pub config: PromptzConfig,
    pub data_dir: PathBuf,
}

pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("com", "promptz", "promptz")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            PromptzError::Persistence("could not determine a data directory".to_string())
        })
}

pub fn load_config(data_dir: &std::path::Path) -> PromptzConfig {
    Clapfig::builder()
        .app_name("promptz")
        .file_name(CONFIG_FILE)
        .search_paths(vec![SearchPath::Path(data_dir.to_path_buf())])
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default()
}

/// Initialize the promptz context over the filesystem bridge.
///
/// # Examples
///
/// ```ignore
/// // OS data directory (or $PROMPTZ_DATA)
/// let ctx = initialize(None)?;
///
/// // Explicit directory
/// let ctx = initialize(Some(PathBuf::from("/tmp/promptz")))?;
/// ```
pub fn initialize(data_override: Option<PathBuf>) -> Result<PromptzContext> {
    let data_dir = resolve_data_dir(data_override)?;
    let config = load_config(&data_dir);
    tracing::debug!("promptz data dir: {}", data_dir.display());

    let api = PromptzApi::load(FsBackend::new(data_dir.clone()), &config)?;

    Ok(PromptzContext {
        api,
        config,
        data_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionMode;
    use tempfile::tempdir;

    #[test]
    fn test_override_wins() {
        let dir = tempdir().unwrap();
        let resolved = resolve_data_dir(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn test_initialize_empty_dir() {
        let dir = tempdir().unwrap();
        let ctx = initialize(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(ctx.api.library().category_names(), vec!["default"]);
        assert_eq!(ctx.data_dir, dir.path());
        // Nothing is written until the first mutation
        assert!(!dir.path().join("library.json").exists());
    }

    #[test]
    fn test_initialize_reads_config_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "separator = \" / \"\nselection_mode = \"single\"\n",
        )
        .unwrap();

        let ctx = initialize(Some(dir.path().to_path_buf())).unwrap();

        assert_eq!(ctx.config.separator, " / ");
        assert_eq!(ctx.api.selection().mode(), SelectionMode::Single);
        assert_eq!(ctx.api.settings().separator, " / ");
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "theme_color = \"black\"\n").unwrap();

        let config = load_config(dir.path());

        assert_eq!(config.theme_color, "black");
        assert_eq!(config.separator, ", ");
        assert_eq!(config.language, "en");
        assert_eq!(config.selection_mode(), SelectionMode::Multi);
    }
}
