//! Feed retrieval and article extraction.
//!
//! Two stages, both failure-isolated per feed:
//!
//! - [`fetcher`] - single-attempt HTTP retrieval bounded by the configured
//!   timeout, with a closed error taxonomy the pipeline branches on
//! - [`extractor`] - normalizes a parsed feed into validated [`Article`]s
//!   via a field-fallback chain, dropping entries without usable content

mod extractor;
mod fetcher;

pub use extractor::{extract, Article};
pub use fetcher::{fetch_feed, FetchError};
