//! In-memory article store with atomic snapshot replacement.
//!
//! The index is the only shared mutable state in the pipeline. `load`
//! swaps the whole snapshot behind an `RwLock`, so concurrent readers see
//! either the old collection or the new one, never a mix.

use std::collections::HashMap;
use std::sync::Arc;

use nw_core::{Article, RawArticle, Result};
use tokio::sync::RwLock;
use tracing::{info, warn};

pub mod sources;

pub use sources::{ArticleSource, HttpSource, JsonFileSource};

#[derive(Debug, Default)]
struct Snapshot {
    articles: Vec<Article>,
    by_id: HashMap<String, usize>,
    by_slug: HashMap<String, usize>,
}

impl Snapshot {
    fn build(records: Vec<RawArticle>) -> (Snapshot, LoadReport) {
        let mut snap = Snapshot::default();
        let mut report = LoadReport::default();

        for raw in records {
            let title = raw.title.clone();
            let Some(article) = raw.normalize() else {
                warn!("⚠️ Skipping article record without id: {:?}", title);
                report.skipped += 1;
                continue;
            };
            if snap.by_id.contains_key(&article.id) {
                warn!("⚠️ Duplicate article id {}, keeping first occurrence", article.id);
                report.duplicates += 1;
                continue;
            }
            let idx = snap.articles.len();
            snap.by_id.insert(article.id.clone(), idx);
            if let Some(slug) = &article.slug {
                snap.by_slug.entry(slug.clone()).or_insert(idx);
            }
            snap.articles.push(article);
            report.loaded += 1;
        }

        (snap, report)
    }
}

/// Outcome of a [`ArticleIndex::load`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Single-writer, many-reader article collection.
pub struct ArticleIndex {
    snapshot: RwLock<Arc<Snapshot>>,
}

impl ArticleIndex {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Replace the entire collection with `records`. Records without a
    /// usable id are skipped, duplicate ids keep their first occurrence.
    pub async fn load(&self, records: Vec<RawArticle>) -> LoadReport {
        let (snap, report) = Snapshot::build(records);
        info!(
            "📰 Loaded {} articles ({} skipped, {} duplicates)",
            report.loaded, report.skipped, report.duplicates
        );
        *self.snapshot.write().await = Arc::new(snap);
        report
    }

    /// Fetch from `source` and load the result. On a fetch or parse error
    /// the previous snapshot is kept and the error is returned.
    pub async fn reload_from(&self, source: &dyn ArticleSource) -> Result<LoadReport> {
        let records = source.fetch().await?;
        Ok(self.load(records).await)
    }

    /// Defensive copy of the current collection, in load order.
    pub async fn all(&self) -> Vec<Article> {
        self.snapshot.read().await.articles.clone()
    }

    pub async fn len(&self) -> usize {
        self.snapshot.read().await.articles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot.read().await.articles.is_empty()
    }

    pub async fn find_by_id(&self, id: &str) -> Option<Article> {
        let snap = self.snapshot.read().await;
        snap.by_id.get(id).map(|&i| snap.articles[i].clone())
    }

    pub async fn find_by_slug(&self, slug: &str) -> Option<Article> {
        let snap = self.snapshot.read().await;
        snap.by_slug.get(slug).map(|&i| snap.articles[i].clone())
    }

    /// Distinct category labels, case preserved from their first occurrence,
    /// de-duplicated case-insensitively, in first-occurrence order.
    pub async fn distinct_categories(&self) -> Vec<String> {
        let snap = self.snapshot.read().await;
        let mut seen: Vec<String> = Vec::new();
        let mut out: Vec<String> = Vec::new();
        for article in &snap.articles {
            if let Some(cat) = &article.category {
                let folded = cat.to_lowercase();
                if !seen.contains(&folded) {
                    seen.push(folded);
                    out.push(cat.clone());
                }
            }
        }
        out
    }
}

impl Default for ArticleIndex {
    fn default() -> Self {
        Self::new()
    }
}
