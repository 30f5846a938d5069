mod config;
mod db;
mod errors;
mod identity;
mod index;
mod models;
mod notes_dir;
mod reconciler;
mod session;

pub use crate::config::{
    identity_config_path, NotesConfig, DEFAULT_SCAN_INTERVAL, DEFAULT_WORKSPACE_ID_LENGTH,
};
pub use crate::db::{record_workspace, Database, RegistryStore};
pub use crate::errors::{AppError, AppResult};
pub use crate::identity::{generate_workspace_id, is_valid_workspace_id, IdentityStore};
pub use crate::index::{LiveIndex, SubscriptionId};
pub use crate::models::{ChangeSet, IndexState, NoteFile, RegistryEntry, WorkspaceIdentity};
pub use crate::notes_dir::{NoteDirectory, DEFAULT_NOTE_EXTENSION};
pub use crate::reconciler::{diff_entries, scan_directory};
pub use crate::session::WorkspaceSession;

use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn open_registry(config: &NotesConfig) -> AppResult<Database> {
    Database::new(&config.registry_db_path())
}

// JSON logs to a daily rolling file under the notes root. Filtering follows
// `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(config: &NotesConfig) -> AppResult<()> {
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "notes.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}
