use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};

use crate::builder::EngineBuilder;
use crate::engine::{run, CancellationToken, EngineOptions};
use crate::error::SearchError;
use crate::request::{RequestId, SearchRequest};
use crate::results::SearchOutcome;
use crate::traits::FileSystem;

// ---------------------------------------------------------------------------
// SearchHandle
// ---------------------------------------------------------------------------

/// Returned by [`SearchEngine::submit`]. Identifies the request and can
/// cancel it.
#[derive(Debug, Clone)]
pub struct SearchHandle {
    id:    RequestId,
    token: CancellationToken,
}

impl SearchHandle {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Ask the worker to stop. The request still produces exactly one
    /// outcome, with status `Cancelled`.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

// ---------------------------------------------------------------------------
// SearchEngine
// ---------------------------------------------------------------------------

/// Runs searches on background workers and hands their outcomes back to the
/// thread that owns the engine.
///
/// The owning thread submits requests and drains outcomes with
/// [`try_next`](Self::try_next) from its event loop, or blocks with
/// [`wait`](Self::wait). A new submission supersedes every request still in
/// flight. Superseded and cancelled requests report `Cancelled` and never
/// leak matches, even when their worker finished first.
///
/// ```rust,no_run
/// use filesift::{FilterSpec, SearchEngine, SearchRequest};
///
/// let mut engine = SearchEngine::new();
/// let spec = FilterSpec::default().extension("txt").recursive(true);
/// let handle = engine.submit(SearchRequest::new("/var/log", spec))?;
///
/// let outcome = engine.wait().expect("one outcome per request");
/// assert_eq!(outcome.id, handle.id());
/// for m in &outcome.matches {
///     println!("{}", m.absolute_path.display());
/// }
/// # Ok::<(), filesift::SearchError>(())
/// ```
pub struct SearchEngine {
    fs:           Arc<dyn FileSystem>,
    default_root: PathBuf,
    thread_name:  String,
    next_id:      u64,
    pending:      HashMap<RequestId, CancellationToken>,
    tx:           Sender<SearchOutcome>,
    rx:           Receiver<SearchOutcome>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// An engine over the local disk with default settings.
    pub fn new() -> Self {
        EngineBuilder::default().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn from_parts(
        fs: Arc<dyn FileSystem>,
        default_root: PathBuf,
        thread_name: String,
    ) -> Self {
        let (tx, rx) = unbounded();
        Self {
            fs,
            default_root,
            thread_name,
            next_id: 0,
            pending: HashMap::new(),
            tx,
            rx,
        }
    }

    // ── Submission ────────────────────────────────────────────────────────

    /// Start a search on a new worker.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidRoot`] if the root does not exist or is
    /// not a directory. No worker is spawned and no outcome will follow.
    /// Every `Ok` submission produces exactly one outcome.
    pub fn submit(&mut self, request: SearchRequest) -> Result<SearchHandle, SearchError> {
        let root = request.resolve_root(&*self.fs, &self.default_root)?;
        let spec = request.spec;

        self.cancel_all();

        self.next_id += 1;
        let id = RequestId(self.next_id);
        let token = CancellationToken::new();
        self.pending.insert(id, token.clone());

        let fs = Arc::clone(&self.fs);
        let tx = self.tx.clone();
        let worker_token = token.clone();

        let spawned = thread::Builder::new()
            .name(format!("{}-{}", self.thread_name, id.get()))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    run(
                        id,
                        EngineOptions {
                            fs:        &*fs,
                            root:      &root,
                            recursive: spec.is_recursive(),
                            matcher:   &spec,
                            cancel:    &worker_token,
                        },
                    )
                }));
                let outcome = result.unwrap_or_else(|payload| {
                    let reason = panic_reason(&*payload);
                    warn!("search {id} worker panicked: {reason}");
                    SearchOutcome::failed(id, reason)
                });
                if tx.send(outcome).is_err() {
                    debug!("search {id}: engine dropped, discarding outcome");
                }
            });

        if let Err(e) = spawned {
            let err = SearchError::WorkerSpawn(e);
            warn!("search {id}: {err}");
            // We hold the receiver, so this cannot fail.
            let _ = self.tx.send(SearchOutcome::failed(id, err.to_string()));
        } else {
            info!("search {id} submitted");
        }

        Ok(SearchHandle { id, token })
    }

    /// Cancel one request. Same as [`SearchHandle::cancel`].
    pub fn cancel(&self, handle: &SearchHandle) {
        handle.cancel();
    }

    /// Cancel every request whose outcome has not been delivered yet.
    pub fn cancel_all(&self) {
        for (id, token) in &self.pending {
            if !token.is_cancelled() {
                debug!("search {id} superseded");
                token.cancel();
            }
        }
    }

    /// Number of submitted requests whose outcome has not been delivered.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    // ── Delivery ──────────────────────────────────────────────────────────

    /// Take the next finished outcome without blocking.
    pub fn try_next(&mut self) -> Option<SearchOutcome> {
        let outcome = self.rx.try_recv().ok()?;
        Some(self.settle(outcome))
    }

    /// Block until the next outcome arrives. `None` when nothing is in flight.
    pub fn wait(&mut self) -> Option<SearchOutcome> {
        if self.pending.is_empty() {
            return None;
        }
        let outcome = self.rx.recv().ok()?;
        Some(self.settle(outcome))
    }

    /// Block up to `timeout` for the next outcome.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<SearchOutcome> {
        if self.pending.is_empty() {
            return None;
        }
        let outcome = self.rx.recv_timeout(timeout).ok()?;
        Some(self.settle(outcome))
    }

    /// Retire the request and make sure a cancelled one carries no matches.
    fn settle(&mut self, outcome: SearchOutcome) -> SearchOutcome {
        match self.pending.remove(&outcome.id) {
            Some(token) if token.is_cancelled() => outcome.into_cancelled(),
            _ => outcome,
        }
    }
}

impl Drop for SearchEngine {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            debug!("engine dropped with {} searches in flight", self.pending.len());
        }
        self.cancel_all();
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterSpec;
    use crate::results::SearchStatus;
    use crate::testing::MemoryFileSystem;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn engine(fs: MemoryFileSystem) -> SearchEngine {
        SearchEngine::builder()
            .file_system(fs)
            .default_root("/r")
            .build()
    }

    fn tree() -> MemoryFileSystem {
        MemoryFileSystem::new("/r")
            .file("a.txt", "hello")
            .dir("s")
            .file("s/c.txt", "hello")
    }

    #[test]
    fn delivers_exactly_one_outcome() {
        let mut engine = engine(tree());
        let handle = engine
            .submit(SearchRequest::new("/r", FilterSpec::default().recursive(true)))
            .unwrap();
        assert_eq!(engine.in_flight(), 1);

        let outcome = engine.next_timeout(TIMEOUT).unwrap();
        assert_eq!(outcome.id, handle.id());
        assert_eq!(outcome.status, SearchStatus::Completed);
        assert_eq!(outcome.matches.len(), 2);

        assert_eq!(engine.in_flight(), 0);
        assert!(engine.wait().is_none());
        assert!(engine.try_next().is_none());
    }

    #[test]
    fn invalid_root_spawns_nothing() {
        let mut engine = engine(tree());
        let err = engine
            .submit(SearchRequest::new("/elsewhere", FilterSpec::default()))
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidRoot(_)));
        assert_eq!(engine.in_flight(), 0);
        assert!(engine.try_next().is_none());
    }

    #[test]
    fn empty_root_uses_default() {
        let mut engine = engine(tree());
        engine.submit(SearchRequest::new("", FilterSpec::default())).unwrap();
        let outcome = engine.next_timeout(TIMEOUT).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].absolute_path, PathBuf::from("/r/a.txt"));
    }

    #[test]
    fn cancel_mid_walk_reports_cancelled() {
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let mut engine = engine(tree().gated(gate_rx));
        let handle = engine
            .submit(SearchRequest::new("/r", FilterSpec::default().recursive(true)))
            .unwrap();

        engine.cancel(&handle);
        drop(gate_tx);

        let outcome = engine.next_timeout(TIMEOUT).unwrap();
        assert_eq!(outcome.id, handle.id());
        assert_eq!(outcome.status, SearchStatus::Cancelled);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn newer_request_supersedes_older_one() {
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let mut engine = engine(tree().gated(gate_rx));
        let first = engine
            .submit(SearchRequest::new("/r", FilterSpec::default().recursive(true)))
            .unwrap();
        let second = engine
            .submit(SearchRequest::new("/r", FilterSpec::default().name("c")))
            .unwrap();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second.id() > first.id());
        drop(gate_tx);

        let mut outcomes: Vec<_> = (0..2).filter_map(|_| engine.next_timeout(TIMEOUT)).collect();
        outcomes.sort_by_key(|o| o.id);
        assert_eq!(outcomes.len(), 2);

        assert_eq!(outcomes[0].id, first.id());
        assert_eq!(outcomes[0].status, SearchStatus::Cancelled);
        assert!(outcomes[0].matches.is_empty());

        assert_eq!(outcomes[1].id, second.id());
        assert_eq!(outcomes[1].status, SearchStatus::Completed);
        // Non-recursive, so only top-level files qualify.
        assert!(outcomes[1].matches.is_empty());
    }

    #[test]
    fn cancel_after_finish_still_hides_matches() {
        let mut engine = engine(tree());
        let handle = engine.submit(SearchRequest::new("/r", FilterSpec::default())).unwrap();
        // Give the worker time to finish before cancelling.
        thread::sleep(Duration::from_millis(100));
        handle.cancel();

        let outcome = engine.next_timeout(TIMEOUT).unwrap();
        assert_eq!(outcome.status, SearchStatus::Cancelled);
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn worker_panic_reports_failed() {
        let mut engine = engine(tree().panicking());
        let handle = engine.submit(SearchRequest::new("/r", FilterSpec::default())).unwrap();
        let outcome = engine.next_timeout(TIMEOUT).unwrap();
        assert_eq!(outcome.id, handle.id());
        assert_eq!(outcome.status, SearchStatus::Failed("walk exploded".into()));
        assert_eq!(engine.in_flight(), 0);
    }

    #[test]
    fn dropping_engine_cancels_workers() {
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let mut engine = engine(tree().gated(gate_rx));
        let handle = engine.submit(SearchRequest::new("/r", FilterSpec::default())).unwrap();
        drop(engine);
        assert!(handle.is_cancelled());
        drop(gate_tx);
    }

    #[test]
    fn panic_reason_reads_both_payload_kinds() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_reason(&*s), "static");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_reason(&*s), "owned");
        let s: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_reason(&*s), "worker panicked");
    }
}
