use feed_rs::model::{Entry, Feed};

/// Substituted when an entry carries no title.
const FALLBACK_TITLE: &str = "Untitled";
/// Substituted when an entry carries no link.
const FALLBACK_LINK: &str = "No URL available";

/// A validated article ready for summarization.
///
/// Invariant (held by [`extract`], not the type): `content` is never empty
/// or all-whitespace. Entries that cannot produce usable content are dropped
/// before an `Article` is ever constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub content: String,
}

/// Normalizes a parsed feed into at most `max_articles` articles.
///
/// Entries are taken in feed order — the first `max_articles` are
/// considered, then validated; no re-sorting, no backfilling from later
/// entries. Per entry, content is selected by a strict fallback chain,
/// first non-empty wins:
///
/// 1. entry summary (`feed-rs` folds the RSS `<description>` element into
///    this field, so it covers both)
/// 2. entry content body
/// 3. entry title
///
/// An entry whose selected content is empty or all-whitespace is dropped
/// entirely. An empty return value means the feed produced no usable
/// content this run — the caller's quarantine trigger.
pub fn extract(feed: Feed, max_articles: usize) -> Vec<Article> {
    feed.entries
        .into_iter()
        .take(max_articles)
        .filter_map(article_from_entry)
        .collect()
}

fn article_from_entry(entry: Entry) -> Option<Article> {
    let content = select_content(&entry)?;

    let title = entry
        .title
        .map(|t| t.content)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_else(|| FALLBACK_LINK.to_string());

    Some(Article {
        title,
        link,
        content,
    })
}

fn select_content(entry: &Entry) -> Option<String> {
    let candidates = [
        entry.summary.as_ref().map(|s| s.content.as_str()),
        entry.content.as_ref().and_then(|c| c.body.as_deref()),
        entry.title.as_ref().map(|t| t.content.as_str()),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.trim().is_empty())
        .map(str::to_string)
}
