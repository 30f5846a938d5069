use crate::config::NotesConfig;
use crate::db::{record_workspace, Database, RegistryStore};
use crate::errors::AppResult;
use crate::identity::IdentityStore;
use crate::index::{LiveIndex, SubscriptionId};
use crate::models::{NoteFile, WorkspaceIdentity};
use crate::notes_dir::NoteDirectory;
use std::path::{Path, PathBuf};

pub struct WorkspaceSession {
    identity: WorkspaceIdentity,
    notes: NoteDirectory,
    index: LiveIndex,
    registry: Option<Database>,
}

impl WorkspaceSession {
    // Opens the registry database under the notes root. A registry that
    // cannot be opened is logged and the session runs without it.
    pub async fn open_default(config: &NotesConfig, workspace_root: &Path) -> AppResult<Self> {
        let identity = IdentityStore::new(config).load(workspace_root)?;
        let notes = NoteDirectory::ensure(config, &identity)?;
        let registry = match Database::new(&config.registry_db_path()) {
            Ok(registry) => Some(registry),
            Err(error) => {
                tracing::warn!(
                    workspace_id = %identity.workspace_id,
                    error = %error,
                    "registry unavailable, continuing without it"
                );
                None
            }
        };
        let store = registry.as_ref().map(|db| db as &dyn RegistryStore);
        let mut session = Self::start(config, identity, notes, store).await;
        session.registry = registry;
        Ok(session)
    }

    // Identity and notes directory failures abort the open; registry
    // failures are only logged.
    pub async fn open(
        config: &NotesConfig,
        workspace_root: &Path,
        registry: Option<&dyn RegistryStore>,
    ) -> AppResult<Self> {
        let identity = IdentityStore::new(config).load(workspace_root)?;
        let notes = NoteDirectory::ensure(config, &identity)?;
        Ok(Self::start(config, identity, notes, registry).await)
    }

    async fn start(
        config: &NotesConfig,
        identity: WorkspaceIdentity,
        notes: NoteDirectory,
        registry: Option<&dyn RegistryStore>,
    ) -> Self {
        match registry {
            Some(registry) => record_workspace(registry, &identity),
            None => tracing::debug!(workspace_id = %identity.workspace_id, "no registry attached"),
        }

        let index = LiveIndex::start(notes.path(), config.scan_interval).await;
        tracing::info!(
            workspace_id = %identity.workspace_id,
            workspace_path = %identity.workspace_path,
            "workspace notes session opened"
        );
        Self {
            identity,
            notes,
            index,
            registry: None,
        }
    }

    pub fn identity(&self) -> &WorkspaceIdentity {
        &self.identity
    }

    pub fn notes_dir(&self) -> &Path {
        self.notes.path()
    }

    pub fn registry(&self) -> Option<&Database> {
        self.registry.as_ref()
    }

    pub fn index(&self) -> &LiveIndex {
        &self.index
    }

    pub fn notes(&self) -> Vec<NoteFile> {
        self.index.list()
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.index.subscribe(observer)
    }

    pub async fn save_note(&self, name: &str, content: &str) -> AppResult<PathBuf> {
        let path = self.notes.save_note(name, content).await?;
        self.index.note_saved(&path).await;
        Ok(path)
    }

    pub async fn delete_note(&self, path: &Path) -> AppResult<()> {
        self.notes.delete_note(path).await?;
        self.index.refresh().await;
        Ok(())
    }

    pub async fn document_saved(&self, path: &Path) {
        self.index.note_saved(path).await;
    }

    pub async fn close(self) {
        self.index.shutdown().await;
    }
}
