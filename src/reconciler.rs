use crate::errors::{AppError, AppResult};
use crate::models::{ChangeSet, NoteFile};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// Regular files directly under `directory`; symlinks are followed.
pub async fn scan_directory(directory: &Path) -> AppResult<Vec<NoteFile>> {
    let mut reader = tokio::fs::read_dir(directory).await.map_err(|error| {
        AppError::DirectoryUnavailable(format!("{}: {}", directory.display(), error))
    })?;

    let mut notes = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(|error| {
        AppError::DirectoryUnavailable(format!("{}: {}", directory.display(), error))
    })? {
        let file_path = entry.path();
        // An entry can vanish between listing and stat; it simply is not a note.
        let is_file = match tokio::fs::metadata(&file_path).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        };
        if !is_file {
            continue;
        }
        notes.push(NoteFile {
            name: entry.file_name().to_string_lossy().to_string(),
            file_path,
        });
    }
    Ok(notes)
}

// A rename shows up as one removal plus one addition.
pub fn diff_entries(previous: &[NoteFile], current: &[NoteFile]) -> ChangeSet {
    let before: HashSet<&PathBuf> = previous.iter().map(|note| &note.file_path).collect();
    let after: HashSet<&PathBuf> = current.iter().map(|note| &note.file_path).collect();

    ChangeSet {
        added: current
            .iter()
            .filter(|note| !before.contains(&note.file_path))
            .cloned()
            .collect(),
        removed: previous
            .iter()
            .filter(|note| !after.contains(&note.file_path))
            .cloned()
            .collect(),
    }
}
