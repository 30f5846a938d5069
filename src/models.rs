use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceIdentity {
    #[serde(rename = "workspacePath")]
    pub workspace_path: String,
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,
    // Fields written by newer versions survive a rewrite.
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl WorkspaceIdentity {
    pub fn new(workspace_path: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_path: workspace_path.into(),
            workspace_id: workspace_id.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,
    #[serde(rename = "workspacePath")]
    pub workspace_path: String,
}

impl From<&WorkspaceIdentity> for RegistryEntry {
    fn from(identity: &WorkspaceIdentity) -> Self {
        Self {
            workspace_id: identity.workspace_id.clone(),
            workspace_path: identity.workspace_path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFile {
    pub name: String,
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexState {
    Uninitialized,
    Scanning,
    Idle,
    Disposed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<NoteFile>,
    pub removed: Vec<NoteFile>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::WorkspaceIdentity;
    use serde_json::json;

    #[test]
    fn identity_uses_persisted_field_names() {
        let identity = WorkspaceIdentity::new("/work/project", "aB3k9Zq1LmP0xR7T");
        let value = serde_json::to_value(&identity).expect("serialize");
        assert_eq!(
            value,
            json!({"workspacePath": "/work/project", "workspaceID": "aB3k9Zq1LmP0xR7T"})
        );
    }

    #[test]
    fn identity_keeps_unknown_fields() {
        let raw = r#"{"workspacePath":"/w","workspaceID":"abc","theme":"dark"}"#;
        let identity: WorkspaceIdentity = serde_json::from_str(raw).expect("parse");
        assert_eq!(identity.extra.get("theme"), Some(&json!("dark")));
        let value = serde_json::to_value(&identity).expect("serialize");
        assert_eq!(value["theme"], json!("dark"));
    }
}
