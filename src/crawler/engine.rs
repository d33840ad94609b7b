//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the crawl loop and the state machine around it:
//! - Validating the seed and creating a fresh session per run
//! - Running the fetch → parse → enqueue loop on a background task
//! - Pausing between requests
//! - Cooperative cancellation with a bounded stop latency
//! - Notifying the sink, including exactly one completion per run

use crate::config::Config;
use crate::crawler::fetcher::{FetchResult, Fetcher, FetcherConfig};
use crate::crawler::parser::{parse_page, PageRecord};
use crate::crawler::session::{CrawlSession, CrawlStatistics, EngineState};
use crate::crawler::sink::CrawlSink;
use crate::url::{domain_of, parse_seed, CrawlTarget};
use crate::{GrabbyError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;

/// How long [`CrawlEngine::stop`] waits for the loop to wind down
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest title prefix echoed in crawl logs
const TITLE_PREVIEW_CHARS: usize = 50;

/// Same-origin crawler with a start/stop lifecycle
///
/// The engine owns one HTTP client for its whole lifetime. Each call to
/// [`start`](Self::start) creates a new run with its own session; the
/// previous run's results stay readable until then.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use url_grabby::config::Config;
/// use url_grabby::crawler::{CrawlEngine, NoopSink};
///
/// # async fn example() -> Result<(), url_grabby::GrabbyError> {
/// let engine = CrawlEngine::new(&Config::default(), Arc::new(NoopSink))?;
/// assert!(engine.start("https://example.com", Duration::from_secs(1)));
/// let state = engine.wait().await;
/// println!("{}: {} pages", state, engine.records().len());
/// # Ok(())
/// # }
/// ```
pub struct CrawlEngine {
    fetcher: Fetcher,
    sink: Arc<dyn CrawlSink>,
    max_pages: usize,
    current: Mutex<Option<Arc<Run>>>,
}

/// Everything belonging to one crawl run
struct Run {
    session: Mutex<CrawlSession>,
    state: Mutex<EngineState>,
    cancel: CancellationToken,
    /// Cancelled once the completion sink has been called
    done: CancellationToken,
    finished: AtomicBool,
    loop_task: Mutex<Option<AbortHandle>>,
}

impl Run {
    fn new(session: CrawlSession) -> Self {
        Self {
            session: Mutex::new(session),
            state: Mutex::new(EngineState::Running),
            cancel: CancellationToken::new(),
            done: CancellationToken::new(),
            finished: AtomicBool::new(false),
            loop_task: Mutex::new(None),
        }
    }

    fn state(&self) -> EngineState {
        *lock_or_recover(&self.state)
    }

    fn snapshot<T>(&self, read: impl FnOnce(&CrawlSession) -> T) -> T {
        read(&lock_or_recover(&self.session))
    }

    fn session(&self) -> Result<MutexGuard<'_, CrawlSession>> {
        self.session
            .lock()
            .map_err(|_| GrabbyError::CriticalLoop("session lock poisoned".to_string()))
    }

    /// Moves the run to its terminal state and calls the completion sink
    ///
    /// Only the first caller has any effect.
    fn finish(&self, state: EngineState, sink: &dyn CrawlSink) {
        if self.finished.swap(true, Ordering::SeqCst) {
            return;
        }

        *lock_or_recover(&self.state) = state;
        let records = self.snapshot(|session| session.records.clone());

        match state {
            EngineState::Stopped => emit(sink, "Crawling stopped"),
            _ => emit(sink, "Crawling completed - all pages processed"),
        }
        emit(sink, &format!("Total pages crawled: {}", records.len()));

        sink.on_completion(&records);
        self.done.cancel();
    }
}

impl CrawlEngine {
    /// Creates an engine from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Ready to start
    /// * `Err(GrabbyError)` - The HTTP client could not be built
    pub fn new(config: &Config, sink: Arc<dyn CrawlSink>) -> Result<Self> {
        let fetcher = Fetcher::new(&FetcherConfig::from_config(
            &config.crawler,
            &config.user_agent,
        ))?;
        Ok(Self::with_fetcher(fetcher, sink, config.crawler.max_pages))
    }

    /// Creates an engine around an existing fetcher
    ///
    /// `max_pages` of 0 means unlimited.
    pub fn with_fetcher(fetcher: Fetcher, sink: Arc<dyn CrawlSink>, max_pages: usize) -> Self {
        Self {
            fetcher,
            sink,
            max_pages,
            current: Mutex::new(None),
        }
    }

    /// Starts crawling from `seed` on a background task
    ///
    /// Returns false, without touching the current session, when a crawl is
    /// already running, when the seed has no `scheme://host`, or when called
    /// outside a tokio runtime. Otherwise replaces the session and returns
    /// immediately.
    pub fn start(&self, seed: &str, delay: Duration) -> bool {
        // Sinks may call back into the engine; never call them under `current`
        match self.launch(seed, delay) {
            Ok(()) => true,
            Err(Some(reason)) => {
                emit(self.sink.as_ref(), &reason);
                false
            }
            Err(None) => false,
        }
    }

    /// Validates the seed and spawns a new run under the `current` lock
    ///
    /// On refusal returns the message to log, if any.
    fn launch(&self, seed: &str, delay: Duration) -> std::result::Result<(), Option<String>> {
        let mut current = lock_or_recover(&self.current);

        if current
            .as_ref()
            .is_some_and(|run| !run.state().can_start())
        {
            return Err(Some("Crawling is already running!".to_string()));
        }

        let domain = domain_of(seed);
        if domain.is_empty() {
            return Err(Some(format!("Invalid starting URL: {}", seed)));
        }

        let seed_target =
            parse_seed(seed).map_err(|e| Some(format!("Invalid starting URL: {}", e)))?;

        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("Cannot start crawl outside a tokio runtime: {}", e);
                return Err(None);
            }
        };

        let run = Arc::new(Run::new(CrawlSession::new(seed_target, domain.clone())));
        let crawl = CrawlLoop {
            run: Arc::clone(&run),
            fetcher: self.fetcher.clone(),
            sink: Arc::clone(&self.sink),
            domain,
            delay,
            max_pages: self.max_pages,
        };

        let loop_handle = runtime.spawn(crawl.run());
        *lock_or_recover(&run.loop_task) = Some(loop_handle.abort_handle());
        runtime.spawn(supervise(
            loop_handle,
            Arc::clone(&run),
            Arc::clone(&self.sink),
        ));

        *current = Some(run);
        Ok(())
    }

    /// Requests cancellation and waits for the loop to end
    ///
    /// Waits at most [`STOP_TIMEOUT`]. If the loop has not exited by then it
    /// is aborted and the run is finished as `Stopped` here. Calling this when
    /// nothing is running is a no-op.
    pub async fn stop(&self) {
        let Some(run) = self.current_run() else {
            return;
        };
        if run.state() != EngineState::Running {
            return;
        }

        if !run.cancel.is_cancelled() {
            emit(self.sink.as_ref(), "Stopping crawl process...");
            run.cancel.cancel();
        }

        if tokio::time::timeout(STOP_TIMEOUT, run.done.cancelled())
            .await
            .is_err()
        {
            tracing::warn!(
                "Crawl loop did not stop within {:?}, aborting it",
                STOP_TIMEOUT
            );
            if let Some(task) = lock_or_recover(&run.loop_task).take() {
                task.abort();
            }
            run.finish(EngineState::Stopped, self.sink.as_ref());
        }
    }

    /// Waits until the current run has finished and returns its final state
    ///
    /// Returns immediately when no run is active.
    pub async fn wait(&self) -> EngineState {
        match self.current_run() {
            Some(run) => {
                run.done.cancelled().await;
                run.state()
            }
            None => EngineState::Idle,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.current_run()
            .map(|run| run.state())
            .unwrap_or_default()
    }

    /// Returns true while the crawl loop is active
    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    /// Counters of the current or last run
    pub fn statistics(&self) -> CrawlStatistics {
        self.current_run()
            .map(|run| run.snapshot(CrawlSession::statistics))
            .unwrap_or_default()
    }

    /// Copy of the records collected so far, in completion order
    pub fn records(&self) -> Vec<PageRecord> {
        self.current_run()
            .map(|run| run.snapshot(|session| session.records.clone()))
            .unwrap_or_default()
    }

    /// Copy of the current or last session
    pub fn session(&self) -> Option<CrawlSession> {
        self.current_run()
            .map(|run| run.snapshot(|session| session.clone()))
    }

    /// Origin locked by the current or last run
    pub fn domain(&self) -> Option<String> {
        self.current_run()
            .map(|run| run.snapshot(|session| session.domain().to_string()))
    }

    fn current_run(&self) -> Option<Arc<Run>> {
        lock_or_recover(&self.current).clone()
    }
}

/// Waits for the loop task and finishes the run whatever happened to it
async fn supervise(
    loop_handle: JoinHandle<Result<EngineState>>,
    run: Arc<Run>,
    sink: Arc<dyn CrawlSink>,
) {
    let state = match loop_handle.await {
        Ok(Ok(state)) => state,
        Ok(Err(e)) => {
            emit_error(sink.as_ref(), &e.to_string());
            EngineState::Stopped
        }
        Err(e) if e.is_panic() => {
            emit_error(
                sink.as_ref(),
                &GrabbyError::CriticalLoop("crawl task panicked".to_string()).to_string(),
            );
            EngineState::Stopped
        }
        Err(_) => EngineState::Stopped,
    };

    run.finish(state, sink.as_ref());
}

/// What the loop does next
enum Next {
    /// Frontier empty or page limit reached
    Exhausted,
    /// Dequeued target was already visited
    Skip,
    Fetch(CrawlTarget),
}

/// The crawl loop of one run
struct CrawlLoop {
    run: Arc<Run>,
    fetcher: Fetcher,
    sink: Arc<dyn CrawlSink>,
    domain: String,
    delay: Duration,
    max_pages: usize,
}

impl CrawlLoop {
    async fn run(self) -> Result<EngineState> {
        self.log("Starting crawl process...");
        self.log(&format!("Target domain: {}", self.domain));
        self.log(&format!(
            "Request delay: {:.1} seconds",
            self.delay.as_secs_f64()
        ));

        loop {
            if self.run.cancel.is_cancelled() {
                return Ok(EngineState::Stopped);
            }

            let target = match self.next_target()? {
                Next::Exhausted => return Ok(EngineState::Completed),
                Next::Skip => continue,
                Next::Fetch(target) => target,
            };

            self.log(&format!("Crawling: {}", target));

            let result = tokio::select! {
                biased;
                _ = self.run.cancel.cancelled() => {
                    self.log(&format!("Fetch interrupted: {}", target));
                    return Ok(EngineState::Stopped);
                }
                result = self.fetcher.fetch(&target) => result,
            };

            self.handle_result(&target, result)?;
            self.report_progress()?;

            if self.run.cancel.is_cancelled() {
                return Ok(EngineState::Stopped);
            }

            if !self.delay.is_zero() {
                tokio::select! {
                    _ = self.run.cancel.cancelled() => return Ok(EngineState::Stopped),
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
        }
    }

    /// Pops the next target and marks it visited
    fn next_target(&self) -> Result<Next> {
        let mut session = self.run.session()?;

        if self.max_pages > 0 && session.frontier.visited_len() >= self.max_pages {
            drop(session);
            self.log(&format!("Page limit of {} reached", self.max_pages));
            return Ok(Next::Exhausted);
        }

        let Some(target) = session.frontier.dequeue() else {
            return Ok(Next::Exhausted);
        };

        if session.frontier.is_visited(&target) {
            tracing::debug!("Skipping already visited {}", target);
            return Ok(Next::Skip);
        }

        session.frontier.mark_visited(target.clone());
        Ok(Next::Fetch(target))
    }

    fn handle_result(&self, target: &CrawlTarget, result: FetchResult) -> Result<()> {
        match result {
            FetchResult::Success { body, .. } => {
                let parsed = parse_page(target, &body, &self.domain);

                for invalid in &parsed.links.invalid {
                    self.warn(&format!("Error processing link: {}", invalid));
                }

                let title_preview = preview(&parsed.record.title);
                let new_links = {
                    let mut session = self.run.session()?;
                    session.records.push(parsed.record);
                    parsed
                        .links
                        .links
                        .into_iter()
                        .filter(|link| session.frontier.try_enqueue(link.clone()))
                        .count()
                };

                self.log(&format!("✓ Extracted data from: {}", target));
                self.log(&format!("  Title: {}", title_preview));
                if new_links > 0 {
                    self.log(&format!("  Found {} new links", new_links));
                }
            }

            FetchResult::NonHtml { content_type } => {
                self.log(&format!(
                    "Skipping non-HTML content: {} ({})",
                    target,
                    if content_type.is_empty() {
                        "no content type"
                    } else {
                        content_type.as_str()
                    }
                ));
            }

            error @ (FetchResult::HttpError { .. } | FetchResult::NetworkError { .. }) => {
                self.warn(&format!(
                    "✗ Request error for {}: {}",
                    target,
                    error.describe()
                ));
            }
        }

        Ok(())
    }

    fn report_progress(&self) -> Result<()> {
        let stats = self.run.session()?.statistics();
        self.sink
            .on_progress(stats.visited_count, stats.total_discovered());
        Ok(())
    }

    fn log(&self, message: &str) {
        emit(self.sink.as_ref(), message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        self.sink.on_log(message);
    }
}

fn emit(sink: &dyn CrawlSink, message: &str) {
    tracing::info!("{}", message);
    sink.on_log(message);
}

fn emit_error(sink: &dyn CrawlSink, message: &str) {
    tracing::error!("{}", message);
    sink.on_log(message);
}

fn preview(title: &str) -> String {
    if title.chars().count() > TITLE_PREVIEW_CHARS {
        let cut: String = title.chars().take(TITLE_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
