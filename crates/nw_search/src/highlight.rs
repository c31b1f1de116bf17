//! Match-span computation for result highlighting.
//!
//! The host owns the markup; this module only reports which byte ranges of
//! a text matched the query terms. Matching is case-insensitive and
//! non-overlapping, with longer terms tried first so a term nested inside
//! another never splits its span.

/// A half-open byte range into the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Compute the non-overlapping match spans of `terms` within `text`.
/// Duplicate terms are collapsed; empty terms are ignored.
pub fn match_spans(text: &str, terms: &[String]) -> Vec<Span> {
    let mut uniq: Vec<String> = Vec::new();
    for term in terms {
        let lowered = term.to_lowercase();
        if !lowered.is_empty() && !uniq.contains(&lowered) {
            uniq.push(lowered);
        }
    }
    if uniq.is_empty() {
        return Vec::new();
    }
    // longest first, so "cricketer" wins over "cricket" at the same offset
    uniq.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    let needles: Vec<Vec<char>> = uniq.iter().map(|t| t.chars().collect()).collect();

    let positions: Vec<(usize, char)> = text.char_indices().collect();
    let lowered: Vec<char> = positions
        .iter()
        .map(|(_, c)| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    let mut spans = Vec::new();
    let mut i = 0;
    while i < lowered.len() {
        let hit = needles.iter().find(|needle| {
            i + needle.len() <= lowered.len() && lowered[i..i + needle.len()] == needle[..]
        });
        match hit {
            Some(needle) => {
                let (start, _) = positions[i];
                let (last_start, last_char) = positions[i + needle.len() - 1];
                spans.push(Span {
                    start,
                    end: last_start + last_char.len_utf8(),
                });
                i += needle.len();
            }
            None => i += 1,
        }
    }
    spans
}
