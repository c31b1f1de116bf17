//! Time-windowed, paginated feed slices over an article collection.
//!
//! A paginator instance serves either infinite-scroll consumption
//! (`next_page`) or page-numbered consumption (`go_to_page`), not both in
//! one session; mixing them leaves `current_page` bookkeeping inconsistent.
//! Callers must also serialize `next_page`/`configure` on an instance, the
//! same way the host disables its "load more" control while a page is in
//! flight.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use nw_core::{Article, Error, Result};
use tracing::debug;

/// Recency window applied before pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    All,
    Days(u32),
}

impl FromStr for Period {
    type Err = Error;

    /// Parses the raw UI strings ("all", "7", "30"). Zero or junk is a
    /// configuration error, not user input to degrade gracefully on.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Period::All);
        }
        match s.parse::<u32>() {
            Ok(days) if days > 0 => Ok(Period::Days(days)),
            _ => Err(Error::Config(format!("invalid period: {s:?}"))),
        }
    }
}

/// Sort order applied to the filtered source before windowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedSort {
    #[default]
    Latest,
    MostViewed,
    MostShared,
}

impl FromStr for FeedSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "latest" => Ok(FeedSort::Latest),
            "mostviewed" | "most-viewed" => Ok(FeedSort::MostViewed),
            "trending" | "most-shared" => Ok(FeedSort::MostShared),
            other => Err(Error::Config(format!("invalid sort: {other:?}"))),
        }
    }
}

/// Newest first, missing dates last, ascending id as the final tie-break.
fn cmp_latest(a: &Article, b: &Article) -> Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| a.id.cmp(&b.id))
}

impl FeedSort {
    fn compare(&self, a: &Article, b: &Article) -> Ordering {
        match self {
            FeedSort::Latest => cmp_latest(a, b),
            FeedSort::MostViewed => b.views.cmp(&a.views).then_with(|| cmp_latest(a, b)),
            FeedSort::MostShared => b.shares.cmp(&a.shares).then_with(|| cmp_latest(a, b)),
        }
    }
}

/// Incremental windowing over a filtered, sorted article sequence.
#[derive(Debug, Clone)]
pub struct FeedPaginator {
    page_size: usize,
    period: Period,
    sort: FeedSort,
    current_page: usize,
    exhausted: bool,
}

impl FeedPaginator {
    pub fn new(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::Config("page_size must be positive".into()));
        }
        Ok(Self {
            page_size,
            period: Period::All,
            sort: FeedSort::Latest,
            current_page: 0,
            exhausted: false,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn sort(&self) -> FeedSort {
        self.sort
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Change the recency filter and restart pagination.
    pub fn configure(&mut self, period: Period) {
        self.period = period;
        self.reset();
    }

    /// Change the sort order and restart pagination.
    pub fn set_sort(&mut self, sort: FeedSort) {
        self.sort = sort;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.current_page = 0;
        self.exhausted = false;
    }

    /// The filtered, sorted sequence the windows slice into. Articles
    /// without a parseable date cannot be proven recent and are excluded
    /// from period-filtered views.
    pub fn filtered_source(&self, all: &[Article]) -> Vec<Article> {
        self.filtered_source_at(all, Utc::now())
    }

    pub fn filtered_source_at(&self, all: &[Article], now: DateTime<Utc>) -> Vec<Article> {
        let mut filtered: Vec<Article> = match self.period {
            Period::All => all.to_vec(),
            Period::Days(days) => {
                let cutoff = now - Duration::milliseconds(i64::from(days) * 86_400_000);
                all.iter()
                    .filter(|a| a.published_at.is_some_and(|ts| ts >= cutoff))
                    .cloned()
                    .collect()
            }
        };
        filtered.sort_by(|a, b| self.sort.compare(a, b));
        filtered
    }

    /// Produce the next window and advance. Once exhausted, further calls
    /// return an empty slice and `true` without advancing.
    pub fn next_page(&mut self, all: &[Article]) -> (Vec<Article>, bool) {
        self.next_page_at(all, Utc::now())
    }

    pub fn next_page_at(&mut self, all: &[Article], now: DateTime<Utc>) -> (Vec<Article>, bool) {
        if self.exhausted {
            return (Vec::new(), true);
        }
        let filtered = self.filtered_source_at(all, now);
        let start = self.current_page * self.page_size;
        if start >= filtered.len() {
            self.exhausted = true;
            return (Vec::new(), true);
        }
        let end = (start + self.page_size).min(filtered.len());
        let items = filtered[start..end].to_vec();
        self.current_page += 1;
        let is_last = items.len() < self.page_size || end >= filtered.len();
        self.exhausted = is_last;
        debug!("📄 Feed page {} ({} items, last: {})", self.current_page, items.len(), is_last);
        (items, is_last)
    }

    pub fn total_pages(&self, all: &[Article]) -> usize {
        self.total_pages_at(all, Utc::now())
    }

    pub fn total_pages_at(&self, all: &[Article], now: DateTime<Utc>) -> usize {
        self.filtered_source_at(all, now).len().div_ceil(self.page_size)
    }

    /// Jump to page `n` (clamped) for page-numbered UIs. Leaves the
    /// exhaustion flag alone; see the type-level note on mixing modes.
    pub fn go_to_page(&mut self, n: usize, all: &[Article]) -> Vec<Article> {
        self.go_to_page_at(n, all, Utc::now())
    }

    pub fn go_to_page_at(&mut self, n: usize, all: &[Article], now: DateTime<Utc>) -> Vec<Article> {
        let filtered = self.filtered_source_at(all, now);
        let total = filtered.len().div_ceil(self.page_size);
        if total == 0 {
            self.current_page = 0;
            return Vec::new();
        }
        self.current_page = n.min(total - 1);
        let start = self.current_page * self.page_size;
        let end = (start + self.page_size).min(filtered.len());
        filtered[start..end].to_vec()
    }
}

/// Articles related to `article`: same category (case-insensitive), the
/// article itself excluded, newest first. Falls back to all other articles
/// when the category yields nothing.
pub fn related_to(article: &Article, corpus: &[Article], limit: usize) -> Vec<Article> {
    let mut related: Vec<Article> = match &article.category {
        Some(cat) => corpus
            .iter()
            .filter(|it| it.id != article.id && it.category_matches(cat))
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    if related.is_empty() {
        related = corpus
            .iter()
            .filter(|it| it.id != article.id)
            .cloned()
            .collect();
    }
    related.sort_by(cmp_latest);
    related.truncate(limit);
    related
}
