//! Relevance-ranked free-text search over an in-memory article corpus.
//!
//! Scoring is deterministic: for a fixed corpus, query and clock the result
//! order is identical across calls. Ties break by descending publish date
//! (missing dates last), then ascending id.

use chrono::{DateTime, Utc};
use nw_core::Article;
use tracing::debug;

pub mod highlight;

pub use highlight::{match_spans, Span};

/// Per-term weight for a title substring match.
const TITLE_WEIGHT: u32 = 300;
/// Per-term weight for an excerpt substring match.
const EXCERPT_WEIGHT: u32 = 150;
/// Per-term weight for a body-text substring match.
const CONTENT_WEIGHT: u32 = 75;
/// Recency bonus cap; decays linearly over this many days.
const RECENCY_CAP_DAYS: i64 = 50;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Tokenize raw query text: whitespace split, lowercased, empty tokens
/// dropped. Duplicates are kept on purpose; a repeated term contributes
/// its weight once per occurrence.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| !t.is_empty())
        .collect()
}

/// A parsed query: ordered tokens plus an optional category constraint.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub terms: Vec<String>,
    pub category: Option<String>,
}

impl SearchQuery {
    pub fn parse(text: &str, category: Option<&str>) -> Self {
        Self {
            terms: tokenize(text),
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// An article paired with its relevance score.
#[derive(Debug, Clone)]
pub struct ScoredResult {
    pub article: Article,
    pub score: u32,
}

/// How the category constraint compares against an article's category.
/// `Exact` is the contract; `Contains` preserves the divergent substring
/// behavior some hosts relied on and must be opted into explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryMatch {
    #[default]
    Exact,
    Contains,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEngine {
    category_match: CategoryMatch,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category_match(category_match: CategoryMatch) -> Self {
        Self { category_match }
    }

    /// Score and rank `corpus` against `query` using the current clock for
    /// the recency bonus.
    pub fn search(&self, query: &SearchQuery, corpus: &[Article]) -> Vec<ScoredResult> {
        self.search_at(query, corpus, Utc::now())
    }

    /// Clock-injected variant of [`search`](Self::search). Pure over its
    /// inputs.
    pub fn search_at(
        &self,
        query: &SearchQuery,
        corpus: &[Article],
        now: DateTime<Utc>,
    ) -> Vec<ScoredResult> {
        if query.terms.is_empty() {
            // An empty query is "no query yet", never "browse all".
            return Vec::new();
        }

        let mut results: Vec<ScoredResult> = corpus
            .iter()
            .filter(|a| self.category_allows(a, query.category.as_deref()))
            .filter_map(|a| {
                // The recency bonus applies after all tokens, unconditionally;
                // only a total of zero keeps an article out. A fresh article
                // can therefore surface on recency alone.
                let score = term_score(a, &query.terms) + recency_bonus(a.published_at, now);
                if score == 0 {
                    return None;
                }
                Some(ScoredResult {
                    article: a.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|x, y| {
            y.score
                .cmp(&x.score)
                .then_with(|| y.article.published_at.cmp(&x.article.published_at))
                .then_with(|| x.article.id.cmp(&y.article.id))
        });

        debug!("🔎 {} results for {:?}", results.len(), query.terms);
        results
    }

    fn category_allows(&self, article: &Article, wanted: Option<&str>) -> bool {
        let Some(wanted) = wanted else { return true };
        match self.category_match {
            CategoryMatch::Exact => article.category_matches(wanted),
            CategoryMatch::Contains => article
                .category
                .as_deref()
                .map(|c| c.to_lowercase().contains(&wanted.to_lowercase()))
                .unwrap_or(false),
        }
    }
}

/// Sum of per-token field weights. Each token occurrence counts, so a
/// repeated token multiplies its contribution.
fn term_score(article: &Article, terms: &[String]) -> u32 {
    let title = article.title.to_lowercase();
    let excerpt = article.excerpt.as_deref().map(str::to_lowercase);
    let content = article.content_text.as_deref().map(str::to_lowercase);

    let mut score = 0;
    for term in terms {
        if title.contains(term) {
            score += TITLE_WEIGHT;
        }
        if excerpt.as_deref().is_some_and(|e| e.contains(term)) {
            score += EXCERPT_WEIGHT;
        }
        if content.as_deref().is_some_and(|c| c.contains(term)) {
            score += CONTENT_WEIGHT;
        }
    }
    score
}

/// `max(0, 50 - min(50, round(days_since_publish)))`, computed once per
/// article. Missing dates get no bonus; future dates count as published now.
fn recency_bonus(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
    let Some(ts) = published_at else { return 0 };
    let days = ((now - ts).num_milliseconds() as f64 / MS_PER_DAY).max(0.0);
    let days = (days.round() as i64).min(RECENCY_CAP_DAYS);
    (RECENCY_CAP_DAYS - days) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn article(id: &str, title: &str) -> Article {
        Article {
            id: id.to_string(),
            slug: None,
            title: title.to_string(),
            excerpt: None,
            content_text: None,
            category: None,
            published_at: None,
            views: 0,
            shares: 0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_query_returns_nothing() {
        let corpus = vec![article("1", "Cricket news")];
        let engine = SearchEngine::new();
        let query = SearchQuery::parse("   ", None);
        assert!(query.is_empty());
        assert!(engine.search_at(&query, &corpus, now()).is_empty());
    }

    #[test]
    fn tokenize_keeps_duplicates_and_lowercases() {
        assert_eq!(tokenize("Cricket  CRICKET win"), vec!["cricket", "cricket", "win"]);
        assert!(tokenize(" \t ").is_empty());
    }

    #[test]
    fn score_composition_title_vs_content() {
        let ten_days_ago = now() - Duration::days(10);
        let mut title_hit = article("1", "Cricket World Cup");
        title_hit.excerpt = Some("India wins".into());
        title_hit.content_text = Some("long text without the word".into());
        title_hit.published_at = Some(ten_days_ago);

        let mut content_hit = article("2", "Morning briefing");
        content_hit.content_text = Some("a cricket season preview".into());
        content_hit.published_at = Some(ten_days_ago);

        let engine = SearchEngine::new();
        let query = SearchQuery::parse("cricket", None);
        let results = engine.search_at(&query, &[title_hit, content_hit], now());

        // 10 days old -> bonus 40
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].article.id, "1");
        assert_eq!(results[0].score, 300 + 40);
        assert_eq!(results[1].article.id, "2");
        assert_eq!(results[1].score, 75 + 40);
    }

    #[test]
    fn repeated_terms_stack() {
        let mut a = article("1", "cricket cricket");
        a.published_at = None;
        let engine = SearchEngine::new();
        let query = SearchQuery::parse("cricket cricket", None);
        let results = engine.search_at(&query, &[a], now());
        // two tokens, each hits the title once
        assert_eq!(results[0].score, 600);
    }

    #[test]
    fn zero_total_articles_never_surface() {
        // past the recency window and no term match -> total 0
        let mut stale = article("1", "Unrelated headline");
        stale.published_at = Some(now() - Duration::days(60));
        let undated = article("2", "Another headline");
        let engine = SearchEngine::new();
        let results =
            engine.search_at(&SearchQuery::parse("cricket", None), &[stale, undated], now());
        assert!(results.is_empty());
    }

    #[test]
    fn recent_article_surfaces_on_recency_alone() {
        let mut fresh = article("1", "Unrelated headline");
        fresh.published_at = Some(now() - Duration::days(10));
        let engine = SearchEngine::new();
        let results = engine.search_at(&SearchQuery::parse("cricket", None), &[fresh], now());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 40);
    }

    #[test]
    fn search_is_deterministic() {
        let day = now() - Duration::days(3);
        let corpus: Vec<Article> = (0..20)
            .map(|i| {
                let mut a = article(&format!("{i:02}"), "cricket update");
                a.published_at = Some(day);
                a
            })
            .collect();
        let engine = SearchEngine::new();
        let query = SearchQuery::parse("cricket", None);
        let first: Vec<String> = engine
            .search_at(&query, &corpus, now())
            .into_iter()
            .map(|r| r.article.id)
            .collect();
        let second: Vec<String> = engine
            .search_at(&query, &corpus, now())
            .into_iter()
            .map(|r| r.article.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn ties_break_by_date_then_id() {
        let older = now() - Duration::days(60);
        let newer = now() - Duration::days(55);

        let mut a = article("b", "cricket");
        a.published_at = Some(newer);
        let mut b = article("a", "cricket");
        b.published_at = Some(older);
        let mut c = article("c", "cricket");
        c.published_at = Some(older);

        // all three are past the recency window, so scores are equal
        let engine = SearchEngine::new();
        let results = engine.search_at(&SearchQuery::parse("cricket", None), &[a, b, c], now());
        let ids: Vec<&str> = results.iter().map(|r| r.article.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn missing_dates_sort_last_among_equal_scores() {
        let stale = now() - Duration::days(90);
        let mut dated = article("z", "cricket");
        dated.published_at = Some(stale);
        let undated = article("a", "cricket");

        let engine = SearchEngine::new();
        let results = engine.search_at(&SearchQuery::parse("cricket", None), &[undated, dated], now());
        let ids: Vec<&str> = results.iter().map(|r| r.article.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn category_filter_is_exclusive() {
        let mut sports = article("1", "news roundup");
        sports.category = Some("Sports".into());
        let mut politics = article("2", "news roundup");
        politics.category = Some("Politics".into());
        let uncategorized = article("3", "news roundup");

        let engine = SearchEngine::new();
        let query = SearchQuery::parse("news", Some("sports"));
        let results = engine.search_at(&query, &[sports, politics, uncategorized], now());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].article.id, "1");
    }

    #[test]
    fn contains_mode_is_opt_in() {
        let mut a = article("1", "news");
        a.category = Some("Sports News".into());

        let exact = SearchEngine::new();
        let query = SearchQuery::parse("news", Some("sports"));
        assert!(exact.search_at(&query, std::slice::from_ref(&a), now()).is_empty());

        let contains = SearchEngine::with_category_match(CategoryMatch::Contains);
        assert_eq!(contains.search_at(&query, &[a], now()).len(), 1);
    }
}
