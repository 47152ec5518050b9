//! Rule-based sentence boundary detection.
//!
//! Periods that do not end a sentence are swapped for a placeholder, every
//! remaining terminator becomes an explicit break, and the text is split on
//! those breaks. Rules run in a fixed order with no backtracking; later rules
//! may rewrite text touched by earlier ones.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use quick_xml::escape::unescape;
use regex::Regex;
use tracing::trace;

const PRD: &str = "<prd>";
const STOP: &str = "<stop>";

const STARTERS: &str = r"(Mr|Mrs|Ms|Dr|He\s|She\s|It\s|They\s|Their\s|Our\s|We\s|But\s|However\s|That\s|This\s|Wherever)";
const SUFFIXES: &str = "(Inc|Ltd|Jr|Sr|Co)";

fn rule(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid segmentation regex")
}

static PREFIXES: Lazy<Regex> = Lazy::new(|| rule(r"\b(Mr|Mrs|Ms|Dr|St|Prof|Fig|Figs|fig|figs)[.]"));
static WEBSITES: Lazy<Regex> = Lazy::new(|| rule(r"[.](com|net|org|io|gov)"));
static INITIAL: Lazy<Regex> = Lazy::new(|| rule(r"\s([A-Z])[.] "));
static ACRONYM_BREAK: Lazy<Regex> =
    Lazy::new(|| rule(&format!(r"([A-Z][.][A-Z][.](?:[A-Z][.])?) {STARTERS}")));
static THREE_INITIALS: Lazy<Regex> = Lazy::new(|| rule(r"([A-Z])[.]([A-Z])[.]([A-Z])[.]"));
static TWO_INITIALS: Lazy<Regex> = Lazy::new(|| rule(r"([A-Z])[.]([A-Z])[.]"));
static SUFFIX_BREAK: Lazy<Regex> = Lazy::new(|| rule(&format!(r" {SUFFIXES}[.] {STARTERS}")));
static SUFFIX: Lazy<Regex> = Lazy::new(|| rule(&format!(r" {SUFFIXES}[.]")));
static DIGIT_CAPITAL: Lazy<Regex> = Lazy::new(|| rule(r"([0-9])([A-Z])[.]"));
static DECIMAL: Lazy<Regex> = Lazy::new(|| rule(r"([0-9])[.]([0-9])"));
static FIGURE_PANEL: Lazy<Regex> = Lazy::new(|| rule(r"([0-9])[.]([A-Ka-k])"));
static SPECIES: Lazy<Regex> = Lazy::new(|| rule(r"([A-Z])[.] ?([a-z]+)"));

const QUOTE_SWAPS: [(&str, &str); 6] = [
    (".\u{201d}", "\u{201d}."),
    (".\"", "\"."),
    ("!\u{201d}", "\u{201d}!"),
    ("!\"", "\"!"),
    ("?\u{201d}", "\u{201d}?"),
    ("?\"", "\"?"),
];

/// Split `text` into trimmed, non-empty sentences. Never fails: non-blank
/// input yields at least one sentence. Blank input yields none, because an
/// empty sentence is never returned.
pub fn segment(text: &str) -> Vec<String> {
    let mut marked = format!(" {text}  ").replace('\n', " ");

    marked = replace(&PREFIXES, &marked, "${1}<prd>");
    marked = replace(&WEBSITES, &marked, "<prd>${1}");
    marked = marked.replace("Ph.D.", "Ph<prd>D<prd>");
    marked = replace(&INITIAL, &marked, " ${1}<prd> ");
    marked = replace(&ACRONYM_BREAK, &marked, "${1}<stop> ${2}");
    marked = replace(&THREE_INITIALS, &marked, "${1}<prd>${2}<prd>${3}<prd>");
    marked = replace(&TWO_INITIALS, &marked, "${1}<prd>${2}<prd>");
    marked = replace(&SUFFIX_BREAK, &marked, " ${1}.<stop> ${2}");
    marked = replace(&SUFFIX, &marked, " ${1}<prd>");
    marked = replace(&DIGIT_CAPITAL, &marked, "${1}${2}<prd>");
    marked = replace(&DECIMAL, &marked, "${1}<prd>${2}");
    marked = replace(&FIGURE_PANEL, &marked, "${1}<prd>${2}");
    marked = replace(&SPECIES, &marked, "${1}<prd> ${2}");

    for (from, to) in QUOTE_SWAPS {
        marked = marked.replace(from, to);
    }
    marked = marked
        .replace("e.g.", "e<prd>g<prd>")
        .replace("i.e.", "i<prd>e<prd>");

    marked = marked
        .replace('.', ".<stop>")
        .replace('?', "?<stop>")
        .replace('!', "!<stop>")
        .replace(PRD, ".");

    let mut sentences: Vec<String> = marked
        .split(STOP)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(decode_entities)
        .collect();

    if sentences.is_empty() && !text.trim().is_empty() {
        sentences.push(decode_entities(text.trim()));
    }
    trace!(count = sentences.len(), "segmented text");
    sentences
}

fn replace(pattern: &Regex, text: &str, replacement: &str) -> String {
    pattern.replace_all(text, replacement).into_owned()
}

/// Decode character entities, leaving text with stray `&` untouched.
fn decode_entities(piece: &str) -> String {
    match unescape(piece) {
        Ok(Cow::Borrowed(raw)) => raw.to_string(),
        Ok(Cow::Owned(decoded)) => decoded,
        Err(_) => piece.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_has_no_sentences() {
        assert!(segment("").is_empty());
        assert!(segment(" \n ").is_empty());
    }

    #[test]
    fn placeholder_only_input_falls_back_to_text() {
        assert_eq!(segment("<stop>"), vec!["<stop>".to_string()]);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(segment("Fos &amp; Jun bind."), vec!["Fos & Jun bind."]);
        assert_eq!(segment("R&D matters."), vec!["R&D matters."]);
    }
}
