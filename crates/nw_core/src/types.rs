use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A normalized article record. Immutable once loaded; the index replaces
/// whole snapshots instead of editing articles in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub slug: Option<String>,
    pub title: String,
    pub excerpt: Option<String>,
    pub content_text: Option<String>,
    pub category: Option<String>,
    /// `None` when the source record carried no parseable date. Sorts last
    /// in every descending-date order and is excluded from period filters.
    pub published_at: Option<DateTime<Utc>>,
    pub views: u64,
    pub shares: u64,
}

impl Article {
    /// Case-insensitive exact category comparison.
    pub fn category_matches(&self, wanted: &str) -> bool {
        self.category
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(wanted))
            .unwrap_or(false)
    }
}

/// The wire shape of an article record as the backend (or a static JSON
/// fixture) delivers it. Ids may arrive as numbers or strings, the body text
/// under `contentText` or `content`, and dates in several formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub id: Option<IdValue>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, alias = "content")]
    pub content_text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateValue>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub shares: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Num(i64),
    Text(String),
}

impl IdValue {
    pub fn as_string(&self) -> String {
        match self {
            IdValue::Num(n) => n.to_string(),
            IdValue::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Millis(i64),
    Text(String),
}

impl DateValue {
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            DateValue::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            DateValue::Text(s) => parse_date_str(s),
        }
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    // epoch milliseconds delivered as a string
    if let Ok(ms) = s.parse::<i64>() {
        return Utc.timestamp_millis_opt(ms).single();
    }
    None
}

impl RawArticle {
    /// The record's id as a string, if it has a non-empty one.
    pub fn id_str(&self) -> Option<String> {
        self.id
            .as_ref()
            .map(|id| id.as_string())
            .filter(|s| !s.is_empty())
    }

    /// Normalize into an [`Article`]. Returns `None` when the record has no
    /// usable id; unparseable dates become `published_at = None` rather than
    /// failing the record.
    pub fn normalize(self) -> Option<Article> {
        let id = self.id_str()?;
        let published_at = self.published_at.as_ref().and_then(DateValue::parse);
        Some(Article {
            id,
            slug: self.slug.filter(|s| !s.is_empty()),
            title: self.title,
            excerpt: self.excerpt,
            content_text: self.content_text,
            category: self.category.filter(|c| !c.is_empty()),
            published_at,
            views: self.views,
            shares: self.shares,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_normalize_the_same_way() {
        let a: RawArticle = serde_json::from_str(r#"{"id": 42, "title": "A"}"#).unwrap();
        let b: RawArticle = serde_json::from_str(r#"{"id": "42", "title": "B"}"#).unwrap();
        assert_eq!(a.normalize().unwrap().id, "42");
        assert_eq!(b.normalize().unwrap().id, "42");
    }

    #[test]
    fn missing_id_yields_no_article() {
        let raw: RawArticle = serde_json::from_str(r#"{"title": "orphan"}"#).unwrap();
        assert!(raw.normalize().is_none());
        let raw: RawArticle = serde_json::from_str(r#"{"id": "  ", "title": "blank"}"#).unwrap();
        assert!(raw.normalize().is_none());
    }

    #[test]
    fn content_alias_is_accepted() {
        let raw: RawArticle =
            serde_json::from_str(r#"{"id": "1", "title": "t", "content": "body"}"#).unwrap();
        assert_eq!(raw.content_text.as_deref(), Some("body"));
    }

    #[test]
    fn date_formats() {
        let rfc: RawArticle =
            serde_json::from_str(r#"{"id":"1","publishedAt":"2024-03-01T10:00:00Z"}"#).unwrap();
        assert!(rfc.normalize().unwrap().published_at.is_some());

        let plain: RawArticle =
            serde_json::from_str(r#"{"id":"2","publishedAt":"2024-03-01"}"#).unwrap();
        assert!(plain.normalize().unwrap().published_at.is_some());

        let millis: RawArticle =
            serde_json::from_str(r#"{"id":"3","publishedAt":1709287200000}"#).unwrap();
        assert!(millis.normalize().unwrap().published_at.is_some());

        let junk: RawArticle =
            serde_json::from_str(r#"{"id":"4","publishedAt":"not a date"}"#).unwrap();
        assert!(junk.normalize().unwrap().published_at.is_none());

        let missing: RawArticle = serde_json::from_str(r#"{"id":"5"}"#).unwrap();
        assert!(missing.normalize().unwrap().published_at.is_none());
    }

    #[test]
    fn category_match_is_case_insensitive() {
        let raw: RawArticle =
            serde_json::from_str(r#"{"id":"1","category":"Sports"}"#).unwrap();
        let article = raw.normalize().unwrap();
        assert!(article.category_matches("sports"));
        assert!(article.category_matches("SPORTS"));
        assert!(!article.category_matches("politics"));
    }
}
