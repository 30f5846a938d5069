use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use workspace_notes_lib::{
    identity_config_path, open_registry, IndexState, NotesConfig, RegistryStore, WorkspaceSession,
};

fn config(home: &std::path::Path, interval: Duration) -> NotesConfig {
    NotesConfig::new(home).with_scan_interval(interval)
}

#[tokio::test]
async fn identity_and_registry_survive_a_restart() {
    let home = tempfile::tempdir().expect("home");
    let workspace = tempfile::tempdir().expect("workspace");
    let config = config(home.path(), Duration::from_secs(3600));

    let first_id = {
        let registry = open_registry(&config).expect("registry");
        let session = WorkspaceSession::open(&config, workspace.path(), Some(&registry))
            .await
            .expect("first open");
        session.save_note("todo.md", "ship it").await.expect("save");
        let id = session.identity().workspace_id.clone();
        session.close().await;
        id
    };

    let registry = open_registry(&config).expect("reopen registry");
    let session = WorkspaceSession::open(&config, workspace.path(), Some(&registry))
        .await
        .expect("second open");

    assert_eq!(session.identity().workspace_id, first_id);
    assert_eq!(registry.list_all().expect("list").len(), 1);
    assert_eq!(session.notes().len(), 1);
    assert_eq!(session.notes()[0].name, "todo.md");
}

#[tokio::test]
async fn seeded_identity_lists_existing_notes() {
    let home = tempfile::tempdir().expect("home");
    let workspace = tempfile::tempdir().expect("workspace");
    let identity_file = identity_config_path(workspace.path());
    fs::create_dir_all(identity_file.parent().expect("parent")).expect("mkdir");
    fs::write(
        &identity_file,
        r#"{"workspacePath":"/somewhere/else","workspaceID":"aB3k9Zq1LmP0xR7T"}"#,
    )
    .expect("seed identity");

    let notes_dir = home.path().join(".vsnotes").join("aB3k9Zq1LmP0xR7T");
    fs::create_dir_all(&notes_dir).expect("notes dir");
    fs::write(notes_dir.join("todo.md"), "").expect("todo");
    fs::write(notes_dir.join("ideas.md"), "").expect("ideas");

    let config = config(home.path(), Duration::from_secs(3600));
    let registry = open_registry(&config).expect("registry");
    let session = WorkspaceSession::open(&config, workspace.path(), Some(&registry))
        .await
        .expect("open");

    assert_eq!(session.identity().workspace_path, workspace.path().to_string_lossy());
    let mut notes = session.notes();
    notes.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].name, "ideas.md");
    assert_eq!(notes[0].file_path, notes_dir.join("ideas.md"));
    assert_eq!(notes[1].file_path, notes_dir.join("todo.md"));
}

#[tokio::test]
async fn polling_picks_up_external_changes_and_notifies() {
    let home = tempfile::tempdir().expect("home");
    let workspace = tempfile::tempdir().expect("workspace");
    let config = config(home.path(), Duration::from_millis(25));
    let registry = open_registry(&config).expect("registry");
    let session = WorkspaceSession::open(&config, workspace.path(), Some(&registry))
        .await
        .expect("open");

    let changes = Arc::new(AtomicUsize::new(0));
    let observed = changes.clone();
    session.subscribe(move || {
        observed.fetch_add(1, Ordering::SeqCst);
    });

    fs::write(session.notes_dir().join("external.md"), "").expect("external note");

    let seen = tokio::time::timeout(Duration::from_secs(5), async {
        while session.notes().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(seen.is_ok(), "external note never appeared");
    assert!(changes.load(Ordering::SeqCst) >= 1);

    let index_state = session.index().state();
    assert!(matches!(index_state, IndexState::Idle | IndexState::Scanning));
    session.close().await;
}
