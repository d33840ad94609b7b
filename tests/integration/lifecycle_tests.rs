//! Start/stop lifecycle of the crawl engine

use crate::crawl_tests::{
    assert_no_more_completions, create_engine, mount_page, observe_run, test_fetcher,
};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedSender};
use url_grabby::crawler::{
    CrawlEngine, CrawlEvent, CrawlSink, EngineState, PageRecord, STOP_TIMEOUT,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Forwards logs and completion, but blows up on the first progress report
struct PanicOnProgress(UnboundedSender<CrawlEvent>);

impl CrawlSink for PanicOnProgress {
    fn on_log(&self, message: &str) {
        self.0.on_log(message);
    }

    fn on_progress(&self, _visited: usize, _total_discovered: usize) {
        panic!("progress sink failure");
    }

    fn on_completion(&self, records: &[PageRecord]) {
        self.0.on_completion(records);
    }
}

/// Reads the engine back from inside every log notification
#[derive(Default)]
struct EngineReadingSink {
    engine: OnceLock<Weak<CrawlEngine>>,
    seen: Mutex<Vec<EngineState>>,
}

impl CrawlSink for EngineReadingSink {
    fn on_log(&self, _message: &str) {
        if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
            let state = engine.state();
            let _ = engine.statistics();
            self.seen.lock().unwrap().push(state);
        }
    }

    fn on_progress(&self, _visited: usize, _total_discovered: usize) {}

    fn on_completion(&self, _records: &[PageRecord]) {}
}

async fn site_with_children(server: &MockServer, children: usize) {
    let links: String = (1..=children)
        .map(|i| format!(r#"<a href="/p{}">page {}</a>"#, i, i))
        .collect();
    mount_page(server, "/", &format!("<title>Root</title>{}", links)).await;
    for i in 1..=children {
        mount_page(server, &format!("/p{}", i), "<title>Child</title>").await;
    }
}

#[tokio::test]
async fn test_stop_interrupts_delay() {
    let server = MockServer::start().await;
    site_with_children(&server, 5).await;

    let (engine, mut rx) = create_engine(0);
    assert!(engine.start(&server.uri(), Duration::from_secs(30)));

    // Wait until the first page is done and the loop sits in its delay
    let first = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(event) = rx.recv().await {
            if let CrawlEvent::Progress { visited, .. } = event {
                return visited;
            }
        }
        0
    })
    .await
    .expect("no progress reported");
    assert_eq!(first, 1);
    assert!(engine.is_running());

    let asked = Instant::now();
    engine.stop().await;
    assert!(asked.elapsed() < STOP_TIMEOUT);

    assert_eq!(engine.state(), EngineState::Stopped);
    let observed = observe_run(&mut rx).await;
    assert_eq!(observed.records.len(), 1);
    assert!(observed.logs.iter().any(|l| l == "Crawling stopped"));
    assert!(observed
        .logs
        .iter()
        .any(|l| l == "Total pages crawled: 1"));

    let stats = engine.statistics();
    assert_eq!(stats.visited_count, 1);
    assert_eq!(stats.queue_size, 5);

    engine.stop().await;
    assert_no_more_completions(&mut rx);
}

#[tokio::test]
async fn test_stop_interrupts_slow_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<title>Slow</title>", "text/html")
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let (engine, mut rx) = create_engine(0);
    assert!(engine.start(&server.uri(), Duration::ZERO));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let asked = Instant::now();
    engine.stop().await;
    assert!(asked.elapsed() < STOP_TIMEOUT);

    let observed = observe_run(&mut rx).await;
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(observed.records.is_empty());
}

#[tokio::test]
async fn test_start_while_running_is_refused() {
    let server = MockServer::start().await;
    site_with_children(&server, 3).await;

    let (engine, mut rx) = create_engine(0);
    assert!(engine.start(&server.uri(), Duration::from_secs(30)));
    let domain = engine.domain();

    assert!(!engine.start("http://other.invalid/", Duration::ZERO));
    assert!(engine.is_running());
    assert_eq!(engine.domain(), domain);

    engine.stop().await;
    observe_run(&mut rx).await;
}

#[tokio::test]
async fn test_restart_resets_session() {
    let first_site = MockServer::start().await;
    site_with_children(&first_site, 2).await;
    let second_site = MockServer::start().await;
    mount_page(&second_site, "/", "<title>Alone</title>").await;

    let (engine, mut rx) = create_engine(0);

    assert!(engine.start(&first_site.uri(), Duration::ZERO));
    let first = observe_run(&mut rx).await;
    assert_eq!(engine.wait().await, EngineState::Completed);
    assert_eq!(first.records.len(), 3);
    assert_eq!(engine.records().len(), 3);

    assert!(engine.start(&second_site.uri(), Duration::ZERO));
    let second = observe_run(&mut rx).await;
    assert_eq!(engine.wait().await, EngineState::Completed);

    assert_eq!(second.records.len(), 1);
    assert_eq!(second.records[0].title, "Alone");
    assert_eq!(engine.statistics().visited_count, 1);
    assert_eq!(engine.domain(), Some(second_site.uri()));
}

#[tokio::test]
async fn test_restart_after_stop() {
    let server = MockServer::start().await;
    site_with_children(&server, 2).await;

    let (engine, mut rx) = create_engine(0);
    assert!(engine.start(&server.uri(), Duration::from_secs(30)));
    engine.stop().await;
    observe_run(&mut rx).await;
    assert_eq!(engine.state(), EngineState::Stopped);

    assert!(engine.start(&server.uri(), Duration::ZERO));
    let observed = observe_run(&mut rx).await;
    assert_eq!(engine.state(), EngineState::Completed);
    assert_eq!(observed.records.len(), 3);
}

#[tokio::test]
async fn test_invalid_seed_keeps_previous_results() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<title>Kept</title>").await;

    let (engine, mut rx) = create_engine(0);
    assert!(engine.start(&server.uri(), Duration::ZERO));
    observe_run(&mut rx).await;
    engine.wait().await;

    assert!(!engine.start("no-scheme.example", Duration::ZERO));
    assert_eq!(engine.state(), EngineState::Completed);
    assert_eq!(engine.records()[0].title, "Kept");
}

#[tokio::test]
async fn test_panicking_loop_ends_stopped_with_partial_results() {
    let server = MockServer::start().await;
    site_with_children(&server, 2).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let engine = CrawlEngine::with_fetcher(test_fetcher(), Arc::new(PanicOnProgress(tx)), 0);
    assert!(engine.start(&server.uri(), Duration::ZERO));

    let observed = observe_run(&mut rx).await;
    assert_eq!(engine.wait().await, EngineState::Stopped);
    assert!(!engine.is_running());

    assert_eq!(observed.records.len(), 1);
    assert_eq!(observed.records[0].title, "Root");
    assert!(observed
        .logs
        .iter()
        .any(|l| l.starts_with("Critical error in crawl loop")));
    assert!(observed.logs.iter().any(|l| l == "Crawling stopped"));

    engine.stop().await;
    assert_no_more_completions(&mut rx);
}

#[tokio::test]
async fn test_sink_may_read_engine_during_start() {
    let server = MockServer::start().await;
    site_with_children(&server, 2).await;

    let sink = Arc::new(EngineReadingSink::default());
    let engine = Arc::new(CrawlEngine::with_fetcher(test_fetcher(), sink.clone(), 0));
    assert!(sink.engine.set(Arc::downgrade(&engine)).is_ok());

    assert!(engine.start(&server.uri(), Duration::from_secs(30)));

    // Refusals log through the sink; a sink that locks the engine must not hang
    let starter = Arc::clone(&engine);
    let refused = tokio::time::timeout(
        Duration::from_secs(5),
        tokio::task::spawn_blocking(move || {
            (
                starter.start("http://other.invalid/", Duration::ZERO),
                starter.start("no-scheme.example", Duration::ZERO),
            )
        }),
    )
    .await
    .expect("start blocked while logging")
    .unwrap();
    assert_eq!(refused, (false, false));

    engine.stop().await;
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(sink.seen.lock().unwrap().contains(&EngineState::Running));
}
