use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const NOTES_DIR_NAME: &str = ".vsnotes";
pub const REGISTRY_DB_FILE: &str = "metadata.db";
pub const LOG_DIR_NAME: &str = "logs";

pub const IDENTITY_CONFIG_DIR: &str = ".vscode";
pub const IDENTITY_CONFIG_FILE: &str = "vsnotes-config.json";

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_WORKSPACE_ID_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesConfig {
    pub app_data_base: PathBuf,
    pub scan_interval: Duration,
    pub workspace_id_length: usize,
}

impl NotesConfig {
    pub fn new(app_data_base: impl Into<PathBuf>) -> Self {
        Self {
            app_data_base: app_data_base.into(),
            scan_interval: DEFAULT_SCAN_INTERVAL,
            workspace_id_length: DEFAULT_WORKSPACE_ID_LENGTH,
        }
    }

    pub fn for_current_user() -> AppResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Internal("unable to resolve home directory".to_string()))?;
        Ok(Self::new(home))
    }

    pub fn with_scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    pub fn with_workspace_id_length(mut self, length: usize) -> Self {
        self.workspace_id_length = length;
        self
    }

    pub fn notes_root(&self) -> PathBuf {
        self.app_data_base.join(NOTES_DIR_NAME)
    }

    pub fn workspace_notes_dir(&self, workspace_id: &str) -> PathBuf {
        self.notes_root().join(workspace_id)
    }

    pub fn registry_db_path(&self) -> PathBuf {
        self.notes_root().join(REGISTRY_DB_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.notes_root().join(LOG_DIR_NAME)
    }
}

pub fn identity_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root
        .join(IDENTITY_CONFIG_DIR)
        .join(IDENTITY_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::{identity_config_path, NotesConfig, DEFAULT_SCAN_INTERVAL};
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn derived_paths_hang_off_the_notes_root() {
        let config = NotesConfig::new("/data");
        assert_eq!(config.notes_root(), Path::new("/data/.vsnotes"));
        assert_eq!(
            config.workspace_notes_dir("aB3k9Zq1LmP0xR7T"),
            Path::new("/data/.vsnotes/aB3k9Zq1LmP0xR7T")
        );
        assert_eq!(config.registry_db_path(), Path::new("/data/.vsnotes/metadata.db"));
        assert_eq!(config.log_dir(), Path::new("/data/.vsnotes/logs"));
        assert_eq!(config.scan_interval, DEFAULT_SCAN_INTERVAL);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = NotesConfig::new("/data")
            .with_scan_interval(Duration::from_millis(50))
            .with_workspace_id_length(8);
        assert_eq!(config.scan_interval, Duration::from_millis(50));
        assert_eq!(config.workspace_id_length, 8);
    }

    #[test]
    fn identity_file_lives_under_dot_vscode() {
        assert_eq!(
            identity_config_path(Path::new("/work/project")),
            Path::new("/work/project/.vscode/vsnotes-config.json")
        );
    }
}
