//! Context-preserving masking for slide-deck text.
//!
//! Slide content mixes prose with the structural table headers that make
//! the extraction readable; whole-field masking would destroy them. So
//! masking runs line by line: a line carrying a header keyword passes
//! verbatim, every other line gets EMAIL and PHONE masked outright and
//! capitalized multi-word runs masked as names unless they contain a
//! domain keyword (section titles are capitalized too).

use std::sync::LazyLock;

use regex::Regex;

/// Keywords that mark a line as a structural table header.
const HEADER_KEYWORDS: &[&str] = &["Revision", r"Full\s*Name", "Email", "Date", "Changes"];

/// Capitalized runs containing one of these are section titles, not
/// person names.
const NAME_ALLOW_LIST: &[&str] = &["Changes", "Network", "Security", "Policy", "Diagram", "Review"];

static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b(?:{})\b", HEADER_KEYWORDS.join("|"))).unwrap());

static ALLOWED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i)(?:{})", NAME_ALLOW_LIST.join("|"))).unwrap());

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\+?\d{1,3}[-.\s]?)?(?:\(?\d{3}\)?[-.\s]?)?\d{3}[-.\s]?\d{4}\b").unwrap()
});

/// Two or more consecutive capitalized words.
static CAPITALIZED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\b").unwrap());

fn mask_line(line: &str) -> String {
    if HEADER_LINE.is_match(line) {
        return line.to_string();
    }

    let masked = EMAIL.replace_all(line, "<EMAIL>");
    let masked = PHONE.replace_all(&masked, "<PHONE>");
    let masked = CAPITALIZED_RUN.replace_all(&masked, |caps: &regex::Captures<'_>| {
        let run = &caps[0];
        if ALLOWED_TITLE.is_match(run) {
            run.to_string()
        } else {
            "<FULL_NAME>".to_string()
        }
    });
    masked.into_owned()
}

/// Mask slide text line by line, preserving structural header lines.
///
/// Empty input comes back unchanged.
pub fn mask_slide_text(text: &str) -> String {
    if text.is_empty() {
        return text.to_string();
    }
    text.lines().map(mask_line).collect::<Vec<_>>().join("\n")
}
