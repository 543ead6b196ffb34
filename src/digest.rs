//! Digest assembly: markdown rendering and the narration script.

use chrono::NaiveDate;

use crate::util::strip_markdown;

/// One summarized article in the digest, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    pub heading: String,
    pub body: String,
    pub link: String,
}

/// Everything one run produced.
#[derive(Debug)]
pub struct RunReport {
    pub date: NaiveDate,
    pub entries: Vec<DigestEntry>,
    pub quarantined: Vec<String>,
    /// Plain-text narration script; only built when audio is enabled.
    pub narration: Option<String>,
}

impl RunReport {
    /// Shared basename for the digest and audio artifacts,
    /// e.g. `2024-03-15_feed-summaries`.
    pub fn file_stem(&self) -> String {
        format!("{}_feed-summaries", self.date.format("%Y-%m-%d"))
    }
}

/// Renders the markdown digest.
///
/// Header `# News for <Weekday, Month DD, YYYY>`, then one block per entry:
/// heading, body, link, each followed by a blank line. Entries appear in
/// the order they arrived — feed order, then article order within the feed.
pub fn render_markdown(report: &RunReport) -> String {
    let mut out = format!("# News for {}\n\n", report.date.format("%A, %B %d, %Y"));
    for entry in &report.entries {
        out.push_str(&format!(
            "## {}\n\n{}\n\n{}\n\n",
            entry.heading, entry.body, entry.link
        ));
    }
    out
}

/// Builds the plain-text narration script from the same entries.
///
/// Each entry becomes `<heading>. <body>` with markdown markers stripped
/// for speech-friendliness; heading and body are stripped before
/// concatenation so a body that opens with a marker loses it too. Entries
/// are joined by newlines. Links are deliberately omitted — they read
/// terribly aloud.
pub fn render_narration(entries: &[DigestEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{}. {}",
                strip_markdown(&entry.heading),
                strip_markdown(&entry.body)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
