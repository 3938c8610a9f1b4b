//! The utterance parsing pipeline: numeral normalization, intent
//! classification, vocabulary stripping, and entity segmentation.
//!
//! Every stage is a pure function over an immutable [`VocabularySet`]; the
//! pipeline allocates a handful of strings and never fails. Garbage input
//! degrades to an empty candidate list, never to an error.

pub mod cleaner;
pub mod intent;
pub mod numerals;
pub mod segmenter;

pub use segmenter::CandidateItem;

use crate::domain::command::CartAction;
use crate::vocabulary::VocabularySet;

/// The output of all four parse stages for one utterance. Intermediate
/// strings are kept so callers can show how a command was understood.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedUtterance {
    pub action: CartAction,
    pub normalized: String,
    pub cleaned: String,
    pub candidates: Vec<CandidateItem>,
}

pub fn parse_utterance(text: &str, vocabulary: &VocabularySet) -> ParsedUtterance {
    let normalized = numerals::normalize(text, vocabulary);
    let action = intent::classify(&normalized, vocabulary);
    let cleaned = cleaner::clean(&normalized, vocabulary);
    let candidates = segmenter::segment(&cleaned, vocabulary);

    ParsedUtterance { action, normalized, cleaned, candidates }
}

/// True when `needle` occurs in `haystack` without extending an ASCII word.
/// ASCII letters and digits bind to their neighbors; any other character is a
/// boundary. Scripts written without spaces (Thai, for example) therefore
/// still match inside a run of text, while "add" never matches "addendum".
pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    let mut offset = 0;
    while let Some(found) = haystack.get(offset..).and_then(|rest| rest.find(needle)) {
        let begin = offset + found;
        let end = begin + needle.len();
        if boundary_before(haystack, begin) && boundary_after(haystack, end) {
            return true;
        }
        offset = match haystack[begin..].chars().next() {
            Some(ch) => begin + ch.len_utf8(),
            None => return false,
        };
    }
    false
}

/// Replaces every word-boundary occurrence of `needle` with `replacement`,
/// using the same boundary rule as [`contains_word`].
pub(crate) fn replace_word(haystack: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }

    let mut output = String::with_capacity(haystack.len());
    let mut index = 0;
    while index < haystack.len() {
        if haystack[index..].starts_with(needle)
            && boundary_before(haystack, index)
            && boundary_after(haystack, index + needle.len())
        {
            output.push_str(replacement);
            index += needle.len();
            continue;
        }
        match haystack[index..].chars().next() {
            Some(ch) => {
                output.push(ch);
                index += ch.len_utf8();
            }
            None => break,
        }
    }
    output
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn boundary_before(haystack: &str, index: usize) -> bool {
    haystack[..index].chars().next_back().map_or(true, |ch| !ch.is_ascii_alphanumeric())
}

fn boundary_after(haystack: &str, index: usize) -> bool {
    haystack[index..].chars().next().map_or(true, |ch| !ch.is_ascii_alphanumeric())
}
