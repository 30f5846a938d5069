use crate::models::{IndexState, NoteFile};
use crate::reconciler::{diff_entries, scan_directory};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

type Observer = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct IndexShared {
    directory: PathBuf,
    entries: RwLock<Vec<NoteFile>>,
    state: Mutex<IndexState>,
    observers: RwLock<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
    pass_lock: tokio::sync::Mutex<()>,
    follow_up: AtomicBool,
    disposed: AtomicBool,
    shutdown: Notify,
}

impl IndexShared {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn set_state(&self, next: IndexState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != IndexState::Disposed {
            *state = next;
        }
    }

    // Returns false when the call coalesced into a pass already in flight.
    async fn run_passes(&self) -> bool {
        let mut ran = false;
        loop {
            if self.is_disposed() {
                return ran;
            }
            let Ok(guard) = self.pass_lock.try_lock() else {
                self.follow_up.store(true, Ordering::SeqCst);
                // The holder checks the flag only after releasing the lock. If
                // the lock is free again it may have looked too early.
                if self.pass_lock.try_lock().is_err() {
                    return ran;
                }
                continue;
            };
            self.follow_up.store(false, Ordering::SeqCst);
            self.reconcile_once().await;
            drop(guard);
            ran = true;
            if !self.follow_up.load(Ordering::SeqCst) {
                return ran;
            }
        }
    }

    async fn reconcile_once(&self) {
        self.set_state(IndexState::Scanning);
        let listing = scan_directory(&self.directory).await;
        if self.is_disposed() {
            return;
        }

        let current = match listing {
            Ok(current) => current,
            Err(error) => {
                tracing::warn!(
                    directory = %self.directory.display(),
                    error = %error,
                    "reconciliation skipped, keeping previous listing"
                );
                self.set_state(IndexState::Idle);
                return;
            }
        };

        let changes = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let changes = diff_entries(&entries, &current);
            if !changes.is_empty() {
                *entries = current;
            }
            changes
        };
        self.set_state(IndexState::Idle);

        if !changes.is_empty() {
            tracing::debug!(
                directory = %self.directory.display(),
                added = changes.added.len(),
                removed = changes.removed.len(),
                "note index changed"
            );
            self.notify_observers();
        }
    }

    fn notify_observers(&self) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect::<Vec<_>>();
        for observer in observers {
            if catch_unwind(AssertUnwindSafe(|| observer())).is_err() {
                tracing::warn!(directory = %self.directory.display(), "note index observer panicked");
            }
        }
    }
}

// Dropping the index disposes it.
pub struct LiveIndex {
    shared: Arc<IndexShared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl LiveIndex {
    pub async fn start(directory: impl Into<PathBuf>, interval: Duration) -> Self {
        let shared = Arc::new(IndexShared {
            directory: directory.into(),
            entries: RwLock::new(Vec::new()),
            state: Mutex::new(IndexState::Uninitialized),
            observers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            pass_lock: tokio::sync::Mutex::new(()),
            follow_up: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            shutdown: Notify::new(),
        });

        shared.run_passes().await;
        tracing::info!(
            directory = %shared.directory.display(),
            notes = shared.entries.read().unwrap_or_else(PoisonError::into_inner).len(),
            "note index started"
        );

        let timer = spawn_timer(shared.clone(), interval);
        Self {
            shared,
            timer: Mutex::new(Some(timer)),
        }
    }

    pub fn state(&self) -> IndexState {
        *self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list(&self) -> Vec<NoteFile> {
        self.shared
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn refresh(&self) {
        self.shared.run_passes().await;
    }

    pub async fn note_saved(&self, saved: &Path) -> bool {
        let saved = saved.to_string_lossy().to_lowercase();
        let known = self
            .shared
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|note| note.file_path.to_string_lossy().to_lowercase() == saved);
        if known {
            return false;
        }
        self.shared.run_passes().await
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.shared.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.shared
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self
            .shared
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(current, _)| *current != id);
        observers.len() != before
    }

    // A pass already in flight finishes but its result is discarded.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.shared.state.lock().unwrap_or_else(PoisonError::into_inner) = IndexState::Disposed;
        self.shared.shutdown.notify_one();
        self.shared
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!(directory = %self.shared.directory.display(), "note index disposed");
    }

    // Disposes and waits for the timer task to exit, including any pass it
    // was running.
    pub async fn shutdown(&self) {
        self.dispose();
        let timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(timer) = timer {
            if let Err(error) = timer.await {
                tracing::warn!(
                    directory = %self.shared.directory.display(),
                    error = %error,
                    "note index timer task failed"
                );
            }
        }
    }
}

impl Drop for LiveIndex {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn spawn_timer(shared: Arc<IndexShared>, period: Duration) -> JoinHandle<()> {
    let period = period.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shared.shutdown.notified() => break,
                _ = interval.tick() => {}
            }
            if shared.is_disposed() {
                break;
            }
            shared.run_passes().await;
        }
    })
}
