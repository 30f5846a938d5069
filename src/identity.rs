use crate::config::{identity_config_path, NotesConfig};
use crate::errors::{AppError, AppResult};
use crate::models::WorkspaceIdentity;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub fn generate_workspace_id(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

// Ids become a directory name under the notes root, so anything beyond
// `[A-Za-z0-9]` could escape it.
pub fn is_valid_workspace_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Debug, Clone)]
pub struct IdentityStore {
    id_length: usize,
}

impl IdentityStore {
    pub fn new(config: &NotesConfig) -> Self {
        Self {
            id_length: config.workspace_id_length,
        }
    }

    // A moved workspace gets its path refreshed in memory only; `persist`
    // writes it back.
    pub fn load(&self, workspace_root: &Path) -> AppResult<WorkspaceIdentity> {
        if workspace_root.as_os_str().is_empty() {
            return Err(AppError::NoWorkspace(
                "no workspace root is open".to_string(),
            ));
        }
        let current_path = workspace_root.to_string_lossy().to_string();
        let config_path = identity_config_path(workspace_root);

        let raw = match fs::read_to_string(&config_path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %config_path.display(), "identity file not found, generating");
                let identity =
                    WorkspaceIdentity::new(current_path, generate_workspace_id(self.id_length));
                if let Err(error) = self.persist(workspace_root, &identity) {
                    tracing::warn!(
                        workspace_id = %identity.workspace_id,
                        error = %error,
                        "identity will not survive restart"
                    );
                }
                return Ok(identity);
            }
            Err(error) => return Err(AppError::from(error)),
        };

        tracing::debug!(path = %config_path.display(), "reading identity file");
        let mut identity: WorkspaceIdentity = serde_json::from_str(&raw).map_err(|error| {
            AppError::ConfigCorrupt(format!("{}: {}", config_path.display(), error))
        })?;
        if !is_valid_workspace_id(&identity.workspace_id) {
            return Err(AppError::ConfigCorrupt(format!(
                "{}: invalid workspaceID {:?}",
                config_path.display(),
                identity.workspace_id
            )));
        }
        if identity.workspace_path != current_path {
            tracing::debug!(
                workspace_id = %identity.workspace_id,
                previous = %identity.workspace_path,
                current = %current_path,
                "workspace path changed"
            );
            identity.workspace_path = current_path;
        }
        Ok(identity)
    }

    pub fn persist(&self, workspace_root: &Path, identity: &WorkspaceIdentity) -> AppResult<()> {
        let config_path = identity_config_path(workspace_root);
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                AppError::Persistence(format!("{}: {}", parent.display(), error))
            })?;
        }
        let body = serde_json::to_string_pretty(identity)?;
        fs::write(&config_path, body)
            .map_err(|error| AppError::Persistence(format!("{}: {}", config_path.display(), error)))
    }
}
