use serde::{Deserialize, Serialize};

use crate::vocabulary::VocabularySet;

/// A product name fragment and the quantity the speaker attached to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub name: String,
    pub quantity: u32,
}

/// Splits cleaned text into candidate items on digit runs.
///
/// Each digit run binds to the fragment directly before it; a run with no
/// usable fragment before it (it leads the string, or the fragment was taken
/// by an earlier run) binds to the fragment after it. Fragments left without
/// a quantity default to 1, which also covers text with no digits at all.
/// Fragments are dropped when, after trailing-unit-noun stripping, they are
/// at most one character or a stop word. Repeated names keep the first
/// occurrence only.
pub fn segment(cleaned: &str, vocabulary: &VocabularySet) -> Vec<CandidateItem> {
    let (fragments, quantities) = split_on_digit_runs(cleaned);

    // fragments.len() == quantities.len() + 1 by construction.
    let mut assigned: Vec<Option<u32>> = vec![None; fragments.len()];
    let mut taken: Vec<bool> = fragments.iter().map(|f| f.trim().is_empty()).collect();

    for (run, quantity) in quantities.iter().enumerate() {
        if !taken[run] {
            assigned[run] = Some(*quantity);
            taken[run] = true;
        } else if !taken[run + 1] {
            assigned[run + 1] = Some(*quantity);
            taken[run + 1] = true;
        }
        // A run with no fragment on either side has nothing to quantify.
    }

    let mut items: Vec<CandidateItem> = Vec::new();
    for (index, fragment) in fragments.iter().enumerate() {
        let Some(name) = refine_fragment(fragment, vocabulary) else {
            continue;
        };
        let lowered = name.to_lowercase();
        if items.iter().any(|item| item.name.to_lowercase() == lowered) {
            continue;
        }
        items.push(CandidateItem { name, quantity: assigned[index].unwrap_or(1) });
    }

    items
}

/// Interleaves the text between digit runs with the parsed runs, so callers
/// can pair them positionally. Digit runs split even inside a word, which
/// handles transcripts like "lemonade2".
fn split_on_digit_runs(text: &str) -> (Vec<String>, Vec<u32>) {
    let mut fragments = Vec::new();
    let mut quantities = Vec::new();
    let mut current = String::new();
    let mut digits = String::new();

    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        if !digits.is_empty() {
            fragments.push(std::mem::take(&mut current));
            quantities.push(parse_quantity(&digits));
            digits.clear();
        }
        current.push(ch);
    }

    if !digits.is_empty() {
        fragments.push(std::mem::take(&mut current));
        quantities.push(parse_quantity(&digits));
    }
    fragments.push(current);

    (fragments, quantities)
}

/// Spoken quantities below 1 make no sense, and anything that overflows a
/// u32 is transcription noise; both clamp to 1.
fn parse_quantity(digits: &str) -> u32 {
    digits.parse::<u32>().map(|value| value.max(1)).unwrap_or(1)
}

fn refine_fragment(fragment: &str, vocabulary: &VocabularySet) -> Option<String> {
    let trimmed = fragment.trim();
    let name = strip_trailing_unit_noun(trimmed, vocabulary).trim();

    if name.chars().count() <= 1 {
        return None;
    }
    if vocabulary.is_stop_word(name) {
        return None;
    }

    Some(name.to_string())
}

/// Strips a unit noun only when it is the whole trailing token, so "boxer"
/// keeps its tail even though "box" is a unit noun.
fn strip_trailing_unit_noun<'a>(fragment: &'a str, vocabulary: &VocabularySet) -> &'a str {
    match fragment.rsplit_once(char::is_whitespace) {
        Some((head, tail)) if vocabulary.is_unit_noun(tail) => head,
        None if vocabulary.is_unit_noun(fragment) => "",
        _ => fragment,
    }
}
