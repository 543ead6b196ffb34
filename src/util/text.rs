/// Flattens markdown into a single speech-friendly line.
///
/// Each line loses any leading run of `#` heading markers (plus the one
/// space that conventionally follows), then all lines are rejoined with
/// single spaces — so blank-line gaps collapse into plain spacing and no
/// newlines survive. Content is otherwise untouched:
///
/// ```
/// use sift::util::strip_markdown;
///
/// assert_eq!(strip_markdown("## Title\n\nBody text"), "Title  Body text");
/// assert_eq!(strip_markdown("plain sentence"), "plain sentence");
/// ```
pub fn strip_markdown(text: &str) -> String {
    text.lines()
        .map(strip_heading_marker)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_heading_marker(line: &str) -> &str {
    let stripped = line.trim_start_matches('#');
    if stripped.len() == line.len() {
        // No marker; inline '#' characters are left alone
        return line;
    }
    stripped.strip_prefix(' ').unwrap_or(stripped)
}
