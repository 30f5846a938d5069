use crate::config::NotesConfig;
use crate::errors::{AppError, AppResult};
use crate::identity::is_valid_workspace_id;
use crate::models::WorkspaceIdentity;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_NOTE_EXTENSION: &str = "md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDirectory {
    path: PathBuf,
}

impl NoteDirectory {
    pub fn ensure(config: &NotesConfig, identity: &WorkspaceIdentity) -> AppResult<Self> {
        if !is_valid_workspace_id(&identity.workspace_id) {
            return Err(AppError::DirectoryCreate(format!(
                "workspace identifier {:?} is not a plain directory name",
                identity.workspace_id
            )));
        }
        let root = config.notes_root();
        let path = config.workspace_notes_dir(&identity.workspace_id);
        for dir in [&root, &path] {
            if dir.is_dir() {
                continue;
            }
            tracing::info!(path = %dir.display(), "creating notes directory");
            fs::create_dir_all(dir).map_err(|error| {
                AppError::DirectoryCreate(format!("{}: {}", dir.display(), error))
            })?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve_note_path(&self, name: &str) -> AppResult<PathBuf> {
        validate_note_name(name)?;
        let mut file_name = PathBuf::from(name);
        if file_name.extension().is_none() {
            file_name.set_extension(DEFAULT_NOTE_EXTENSION);
        }
        Ok(self.path.join(file_name))
    }

    pub async fn save_note(&self, name: &str, content: &str) -> AppResult<PathBuf> {
        let path = self.resolve_note_path(name)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|error| AppError::Persistence(format!("{}: {}", path.display(), error)))?;
        tracing::debug!(path = %path.display(), "note saved");
        Ok(path)
    }

    pub async fn delete_note(&self, path: &Path) -> AppResult<()> {
        if path.parent() != Some(self.path.as_path()) {
            return Err(AppError::InvalidNoteName(format!(
                "{} is not inside {}",
                path.display(),
                self.path.display()
            )));
        }
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "note deleted");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound(path.display().to_string()))
            }
            Err(error) => Err(AppError::from(error)),
        }
    }
}

fn validate_note_name(name: &str) -> AppResult<()> {
    let mut components = Path::new(name).components();
    let valid = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidNoteName(name.to_string()))
    }
}
