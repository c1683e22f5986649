//! services/tutor/src/store.rs
//!
//! The application store: single source of truth for uploaded files, their
//! chat sessions and messages, and aggregate usage statistics. All mutation
//! goes through the operations here; readers only ever see fully committed
//! snapshots.
//!
//! Files are held as `Vec<Arc<PdfFile>>` and updated copy-on-write: a mutation
//! rebuilds only the touched file and republishes the root through a watch
//! channel, so untouched files are structurally shared between snapshots and
//! subscribers learn about every new root.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tutor_core::domain::{
    ChatSession, DocumentAnalysis, Message, PdfFile, Sender, TopicCount, UserStats,
};
use tutor_core::ports::{DocumentAnalyzer, PortError, PortResult};
use uuid::Uuid;

/// Name given to the session seeded when a file is first added.
pub const INITIAL_SESSION_NAME: &str = "المحادثة الأولى";

/// Fixed per-file score fed into the running creativity average.
/// Placeholder until real per-file scoring exists.
const FILE_CREATIVITY_SCORE: u32 = 50;

/// Upper bound on how long a single simulated analysis may take before the
/// upload is failed. Collaborator calls model an external service and must not
/// be able to wedge an upload forever.
const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

//=========================================================================================
// Snapshots
//=========================================================================================

/// An immutable view of the full file tree plus statistics, as of the last
/// committed mutation. Cloning is cheap: files are shared `Arc`s.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// Most-recent-first.
    pub files: Vec<Arc<PdfFile>>,
    pub stats: UserStats,
}

impl StoreSnapshot {
    pub fn file(&self, file_id: Uuid) -> Option<&Arc<PdfFile>> {
        self.files.iter().find(|f| f.id == file_id)
    }
}

//=========================================================================================
// TutorStore
//=========================================================================================

struct Inner {
    files: Vec<Arc<PdfFile>>,
    stats: UserStats,
    /// One token per live file; cancelled (and removed) when the file is
    /// deleted so pending collaborator tasks stop writing into it.
    cancel_tokens: HashMap<Uuid, CancellationToken>,
}

/// The single owner of all file/session/message state and statistics.
pub struct TutorStore {
    analyzer: Arc<dyn DocumentAnalyzer>,
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<StoreSnapshot>,
}

impl TutorStore {
    /// Creates an empty store using the given analyzer for file uploads.
    pub fn new(analyzer: Arc<dyn DocumentAnalyzer>) -> Self {
        let (snapshot_tx, _) = watch::channel(StoreSnapshot::default());
        Self {
            analyzer,
            inner: Mutex::new(Inner {
                files: Vec::new(),
                stats: UserStats::default(),
                cancel_tokens: HashMap::new(),
            }),
            snapshot_tx,
        }
    }

    /// Adds an uploaded file: runs the analyzer, seeds the initial session with
    /// the assistant welcome message, prepends the file (collection is
    /// most-recent-first) and updates the statistics.
    ///
    /// The returned file is fully formed. If the analyzer fails, the error is
    /// propagated and the store is left untouched; no partial file is created.
    pub async fn add_file(&self, file_name: &str) -> PortResult<Arc<PdfFile>> {
        // The collaborator call happens before any state is taken, so a
        // failure here cannot leave a half-committed file behind.
        let analysis = tokio::time::timeout(ANALYSIS_TIMEOUT, self.analyzer.analyze(file_name))
            .await
            .map_err(|_| {
                PortError::Unexpected(format!("analysis of '{}' timed out", file_name))
            })??;

        let file = Arc::new(PdfFile {
            id: Uuid::new_v4(),
            name: file_name.to_string(),
            sessions: vec![seed_session(INITIAL_SESSION_NAME, file_name, &analysis)],
            analysis,
            created_at: Utc::now(),
        });

        let mut inner = self.lock();
        inner.files.insert(0, Arc::clone(&file));
        inner.cancel_tokens.insert(file.id, CancellationToken::new());

        let n = inner.stats.files_analyzed;
        // Same integer floor as the observed behavior; trivially 50 while the
        // per-file score is the fixed placeholder.
        inner.stats.avg_creativity =
            (inner.stats.avg_creativity * n + FILE_CREATIVITY_SCORE) / (n + 1);
        inner.stats.files_analyzed = n + 1;
        inner.stats.common_topics = rank_topics(&inner.files);
        self.publish(&inner);

        info!(
            "File '{}' added ({} pages, {} chapters)",
            file.name,
            file.analysis.page_count,
            file.analysis.chapters.len()
        );
        Ok(file)
    }

    /// Appends a new session to an existing file, seeded with the same welcome
    /// message form used at file creation. Sessions are most-recent-last.
    pub fn add_session(&self, file_id: Uuid, session_name: &str) -> PortResult<ChatSession> {
        let mut inner = self.lock();
        let slot = find_file(&mut inner.files, file_id)?;

        let session = seed_session(session_name, &slot.name, &slot.analysis);
        let mut updated = (**slot).clone();
        updated.sessions.push(session.clone());
        *slot = Arc::new(updated);
        self.publish(&inner);

        info!("Session '{}' added to file {}", session.name, file_id);
        Ok(session)
    }

    /// Appends a message to the named session, leaving every other file and
    /// session untouched. A missing file or session is an explicit error.
    pub fn add_message(
        &self,
        file_id: Uuid,
        session_id: Uuid,
        message: Message,
    ) -> PortResult<()> {
        let mut inner = self.lock();
        let slot = find_file(&mut inner.files, file_id)?;

        let mut updated = (**slot).clone();
        let session = updated
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| {
                PortError::NotFound(format!("session {} in file {}", session_id, file_id))
            })?;
        session.history.push(message);
        *slot = Arc::new(updated);
        self.publish(&inner);
        Ok(())
    }

    /// Deletes a file and everything under it, cancelling any collaborator
    /// task still pending for it. Returns `false` (and changes nothing) when
    /// the id is unknown.
    pub fn delete_file(&self, file_id: Uuid) -> bool {
        let mut inner = self.lock();
        let before = inner.files.len();
        inner.files.retain(|f| f.id != file_id);
        if inner.files.len() == before {
            return false;
        }

        if let Some(token) = inner.cancel_tokens.remove(&file_id) {
            token.cancel();
        }
        self.publish(&inner);
        info!("File {} and all owned sessions deleted", file_id);
        true
    }

    /// The last committed snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// A receiver that observes every committed root after subscription.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn stats(&self) -> UserStats {
        self.lock().stats.clone()
    }

    /// A child of the file's cancellation token, or `None` if the file no
    /// longer exists. Collaborator tasks race against this token.
    pub fn file_token(&self, file_id: Uuid) -> Option<CancellationToken> {
        self.lock()
            .cancel_tokens
            .get(&file_id)
            .map(|t| t.child_token())
    }

    // The lock is only ever held for plain in-memory updates, never across an
    // await point.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }

    fn publish(&self, inner: &Inner) {
        self.snapshot_tx.send_replace(StoreSnapshot {
            files: inner.files.clone(),
            stats: inner.stats.clone(),
        });
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn find_file(files: &mut [Arc<PdfFile>], file_id: Uuid) -> PortResult<&mut Arc<PdfFile>> {
    files
        .iter_mut()
        .find(|f| f.id == file_id)
        .ok_or_else(|| PortError::NotFound(format!("file {}", file_id)))
}

/// Builds a session pre-seeded with the assistant welcome message that
/// summarizes the file's analysis.
fn seed_session(name: &str, file_name: &str, analysis: &DocumentAnalysis) -> ChatSession {
    let welcome = format!(
        "أهلاً بك! لقد قمت بتحليل ملفك \"{}\". يحتوي على {} صفحة، وأهم فصوله هي: {}. أنا جاهز لمساعدتك في فهمه بشكل أعمق.",
        file_name,
        analysis.page_count,
        analysis.chapters.join("، ")
    );
    ChatSession {
        id: Uuid::new_v4(),
        name: name.to_string(),
        history: vec![Message::new(Sender::Assistant, welcome)],
        created_at: Utc::now(),
    }
}

/// Counts each main topic across all live files and ranks descending by
/// count, then by topic for a stable order.
fn rank_topics(files: &[Arc<PdfFile>]) -> Vec<TopicCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for file in files {
        for topic in &file.analysis.main_topics {
            *counts.entry(topic.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<TopicCount> = counts
        .into_iter()
        .map(|(topic, count)| TopicCount {
            topic: topic.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
    ranked
}
