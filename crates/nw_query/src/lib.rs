//! Glue between raw input events and the search/feed engines.
//!
//! The controller debounces free-text input, discards superseded results by
//! sequence number, and keeps a bounded most-recent-first query history.
//! Hosts call the controller, never the engines directly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nw_core::{Article, Result};
use nw_feed::{FeedPaginator, FeedSort, Period};
use nw_index::ArticleIndex;
use nw_search::{ScoredResult, SearchEngine, SearchQuery};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Bounded recent-query history, matching the original's 8-entry cap.
const RECENT_LIMIT: usize = 8;

/// A delivered search result set, tagged with the sequence number of the
/// submission that produced it.
#[derive(Debug)]
pub struct SearchOutcome {
    pub seq: u64,
    pub text: String,
    pub results: Vec<ScoredResult>,
}

struct Inner {
    index: Arc<ArticleIndex>,
    engine: SearchEngine,
    paginator: Mutex<FeedPaginator>,
    debounce: Duration,
    seq: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
    recent: Mutex<VecDeque<String>>,
    outcomes: mpsc::UnboundedSender<SearchOutcome>,
    searches_run: AtomicU64,
}

impl Inner {
    async fn run_query(&self, text: &str, category: Option<&str>) -> Vec<ScoredResult> {
        let query = SearchQuery::parse(text, category);
        if query.is_empty() {
            return Vec::new();
        }
        let corpus = self.index.all().await;
        self.searches_run.fetch_add(1, Ordering::Relaxed);
        let results = self.engine.search(&query, &corpus);
        if !results.is_empty() {
            self.remember(text.trim()).await;
        }
        results
    }

    async fn remember(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let mut recent = self.recent.lock().await;
        recent.retain(|q| q != text);
        recent.push_front(text.to_string());
        recent.truncate(RECENT_LIMIT);
    }
}

#[derive(Clone)]
pub struct QueryController {
    inner: Arc<Inner>,
}

impl QueryController {
    /// Controller with the default engine, sort and debounce delay.
    pub fn new(
        index: Arc<ArticleIndex>,
        page_size: usize,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SearchOutcome>)> {
        Ok(Self::with_config(
            index,
            SearchEngine::new(),
            FeedPaginator::new(page_size)?,
            DEFAULT_DEBOUNCE,
        ))
    }

    pub fn with_config(
        index: Arc<ArticleIndex>,
        engine: SearchEngine,
        paginator: FeedPaginator,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            inner: Arc::new(Inner {
                index,
                engine,
                paginator: Mutex::new(paginator),
                debounce,
                seq: AtomicU64::new(0),
                pending: Mutex::new(None),
                recent: Mutex::new(VecDeque::new()),
                outcomes: tx,
                searches_run: AtomicU64::new(0),
            }),
        };
        (controller, rx)
    }

    /// Run a search immediately against the current snapshot. Non-empty
    /// result sets record the query in the recent history.
    pub async fn run_query(&self, text: &str, category: Option<&str>) -> Vec<ScoredResult> {
        self.inner.run_query(text, category).await
    }

    /// Debounced submission. Only the last call within the debounce window
    /// executes, and only the submission that is still the newest when its
    /// results are ready delivers an outcome. Returns the submission's
    /// sequence number.
    pub async fn submit(&self, text: impl Into<String>, category: Option<String>) -> u64 {
        let text = text.into();
        let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);

        let mut pending = self.inner.pending.lock().await;
        if let Some(stale) = pending.take() {
            // a superseded pending call never executes
            stale.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if inner.seq.load(Ordering::SeqCst) != seq {
                return;
            }
            let results = inner.run_query(&text, category.as_deref()).await;
            if inner.seq.load(Ordering::SeqCst) != seq {
                debug!("Discarding stale results for {:?} (seq {})", text, seq);
                return;
            }
            let _ = inner.outcomes.send(SearchOutcome { seq, text, results });
        }));
        seq
    }

    /// Next feed window over the current snapshot.
    pub async fn run_feed_page(&self) -> (Vec<Article>, bool) {
        let corpus = self.inner.index.all().await;
        self.inner.paginator.lock().await.next_page(&corpus)
    }

    pub async fn set_period(&self, period: Period) {
        self.inner.paginator.lock().await.configure(period);
    }

    pub async fn set_sort(&self, sort: FeedSort) {
        self.inner.paginator.lock().await.set_sort(sort);
    }

    pub async fn feed_total_pages(&self) -> usize {
        let corpus = self.inner.index.all().await;
        self.inner.paginator.lock().await.total_pages(&corpus)
    }

    pub async fn go_to_feed_page(&self, n: usize) -> Vec<Article> {
        let corpus = self.inner.index.all().await;
        self.inner.paginator.lock().await.go_to_page(n, &corpus)
    }

    /// Recent successful queries, most recent first.
    pub async fn recent_queries(&self) -> Vec<String> {
        self.inner.recent.lock().await.iter().cloned().collect()
    }

    /// Number of underlying engine invocations so far.
    pub fn searches_run(&self) -> u64 {
        self.inner.searches_run.load(Ordering::Relaxed)
    }
}
