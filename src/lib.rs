//! sift — a single-run RSS/Atom digest generator.
//!
//! Reads a newline-delimited list of feed URLs, extracts recent article
//! content, summarizes each article through an Ollama chat backend, and
//! writes a dated markdown digest. Optionally synthesizes an audio narration
//! of the digest through an OpenAI-compatible text-to-speech endpoint.
//!
//! The run is strictly sequential: feeds and articles are processed in
//! source order, one network call at a time. Failure handling is layered so
//! that no single feed or article can abort the run:
//!
//! - an unreachable or unparseable feed yields zero articles and is moved to
//!   the quarantine list
//! - a failed summarization skips that one article
//! - a failed audio synthesis leaves the already-written digest untouched
//!
//! Only a missing/empty feed list or an unrecoverable model-provisioning
//! failure aborts the run, and both happen before any output is written.

pub mod config;
pub mod digest;
pub mod feed;
pub mod pipeline;
pub mod registry;
pub mod summarize;
pub mod tts;
pub mod util;
