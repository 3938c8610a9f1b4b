//! Action vocabulary, filler words, unit nouns, and the numeral lexicon.
//!
//! A `VocabularySet` is an immutable snapshot: the parser borrows one set for
//! the whole pipeline run, so an admin reload can never change matching rules
//! mid-utterance. `VocabularyStore` swaps whole snapshots between requests and
//! bumps a version number on every swap.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::VocabularyConfig;

const ADD_WORDS: &[&str] = &["add", "put", "order", "buy"];
const DECREASE_WORDS: &[&str] = &["decrease", "reduce", "down", "fewer"];
const DELETE_WORDS: &[&str] = &["delete", "remove", "take out", "drop"];
const CLEAR_QUALIFIERS: &[&str] = &["everything", "all", "whole cart", "entire cart"];
const CLEAR_PHRASES: &[&str] =
    &["empty the cart", "clear the cart", "clear cart", "cancel everything"];
const FILLER_WORDS: &[&str] = &[
    "please", "thanks", "thank you", "kindly", "i", "me", "my", "we", "us", "a", "an", "the",
    "some", "to", "for", "of", "would", "like", "want", "just", "and", "with", "also",
];
const UNIT_NOUNS: &[&str] = &[
    "bottle", "bottles", "cup", "cups", "piece", "pieces", "box", "boxes", "bag", "bags", "glass",
    "glasses",
];
const STOP_WORDS: &[&str] = &["please", "thanks", "thank you", "kindly"];

const ONES: &[(&str, u64)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
];

const TEENS: &[(&str, u64)] = &[
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
];

const TENS: &[(&str, u64)] = &[
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

/// Immutable, versioned snapshot of every word list the parser consults.
/// All entries are lowercased at construction; matching is done against
/// lowercased utterances.
#[derive(Clone, Debug, PartialEq)]
pub struct VocabularySet {
    version: u32,
    add_words: Vec<String>,
    decrease_words: Vec<String>,
    delete_words: Vec<String>,
    clear_qualifiers: Vec<String>,
    clear_phrases: Vec<String>,
    filler_words: Vec<String>,
    unit_nouns: Vec<String>,
    stop_words: Vec<String>,
    // Sorted longest-word-first so compound words win over their parts.
    numerals: Vec<(String, u64)>,
}

impl VocabularySet {
    /// Built-in English vocabulary, version 1.
    pub fn builtin() -> Self {
        Self::with_overrides(1, &VocabularyConfig::default())
    }

    /// Built-in vocabulary extended with operator-supplied entries. Custom
    /// words extend the built-in lists; custom numerals shadow built-in
    /// numerals with the same word.
    pub fn with_overrides(version: u32, overrides: &VocabularyConfig) -> Self {
        let mut numerals = english_numerals();
        for (word, value) in &overrides.numerals {
            numerals.insert(normalize_word(word), *value);
        }

        let mut sorted: Vec<(String, u64)> = numerals.into_iter().collect();
        sorted.sort_by(|a, b| {
            b.0.chars().count().cmp(&a.0.chars().count()).then_with(|| b.0.cmp(&a.0))
        });

        Self {
            version,
            add_words: merge_words(ADD_WORDS, &overrides.add_words),
            decrease_words: merge_words(DECREASE_WORDS, &overrides.decrease_words),
            delete_words: merge_words(DELETE_WORDS, &overrides.delete_words),
            clear_qualifiers: merge_words(CLEAR_QUALIFIERS, &[]),
            clear_phrases: merge_words(CLEAR_PHRASES, &overrides.clear_phrases),
            filler_words: merge_words(FILLER_WORDS, &overrides.filler_words),
            unit_nouns: merge_words(UNIT_NOUNS, &overrides.unit_nouns),
            stop_words: merge_words(STOP_WORDS, &overrides.stop_words),
            numerals: sorted,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn add_words(&self) -> &[String] {
        &self.add_words
    }

    pub fn decrease_words(&self) -> &[String] {
        &self.decrease_words
    }

    pub fn delete_words(&self) -> &[String] {
        &self.delete_words
    }

    pub fn clear_qualifiers(&self) -> &[String] {
        &self.clear_qualifiers
    }

    pub fn clear_phrases(&self) -> &[String] {
        &self.clear_phrases
    }

    pub fn filler_words(&self) -> &[String] {
        &self.filler_words
    }

    pub fn unit_nouns(&self) -> &[String] {
        &self.unit_nouns
    }

    pub fn stop_words(&self) -> &[String] {
        &self.stop_words
    }

    /// Numeral entries sorted longest-word-first.
    pub fn numerals(&self) -> &[(String, u64)] {
        &self.numerals
    }

    pub fn is_unit_noun(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.unit_nouns.iter().any(|noun| noun == &word)
    }

    pub fn is_stop_word(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.stop_words.iter().any(|word| word == &text)
    }

    /// Every word the cleaner strips regardless of chosen action: all action
    /// vocabulary plus fillers, longest entry first so phrases are removed
    /// before the words they contain.
    pub fn removable_words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self
            .clear_phrases
            .iter()
            .chain(self.clear_qualifiers.iter())
            .chain(self.add_words.iter())
            .chain(self.decrease_words.iter())
            .chain(self.delete_words.iter())
            .chain(self.filler_words.iter())
            .map(String::as_str)
            .collect();
        words.sort_by(|a, b| {
            b.chars().count().cmp(&a.chars().count()).then_with(|| b.cmp(a))
        });
        words.dedup();
        words
    }
}

/// Swappable holder for the active vocabulary snapshot. Readers clone an
/// `Arc` and keep using it even if a reload lands mid-request.
#[derive(Debug)]
pub struct VocabularyStore {
    inner: RwLock<Arc<VocabularySet>>,
}

impl VocabularyStore {
    pub fn new(set: VocabularySet) -> Self {
        Self { inner: RwLock::new(Arc::new(set)) }
    }

    pub async fn current(&self) -> Arc<VocabularySet> {
        self.inner.read().await.clone()
    }

    /// Builds a new snapshot from `overrides`, swaps it in, and returns the
    /// new version number.
    pub async fn reload(&self, overrides: &VocabularyConfig) -> u32 {
        let mut guard = self.inner.write().await;
        let version = guard.version().wrapping_add(1);
        *guard = Arc::new(VocabularySet::with_overrides(version, overrides));
        version
    }
}

fn merge_words(builtin: &[&str], extra: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(builtin.len() + extra.len());
    for word in builtin.iter().map(|word| normalize_word(word)) {
        if !word.is_empty() && !merged.contains(&word) {
            merged.push(word);
        }
    }
    for word in extra.iter().map(|word| normalize_word(word)) {
        if !word.is_empty() && !merged.contains(&word) {
            merged.push(word);
        }
    }
    merged
}

fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

fn english_numerals() -> BTreeMap<String, u64> {
    let mut numerals = BTreeMap::new();
    numerals.insert("zero".to_string(), 0);

    for (word, value) in ONES.iter().chain(TEENS.iter()).chain(TENS.iter()) {
        numerals.insert((*word).to_string(), *value);
    }

    // Spoken compounds: "twenty five", "ninety nine", and so on.
    for (tens_word, tens_value) in TENS {
        for (ones_word, ones_value) in ONES {
            numerals.insert(format!("{tens_word} {ones_word}"), tens_value + ones_value);
        }
    }

    numerals.insert("hundred".to_string(), 100);
    numerals.insert("a hundred".to_string(), 100);
    numerals.insert("one hundred".to_string(), 100);
    numerals.insert("dozen".to_string(), 12);
    numerals.insert("a dozen".to_string(), 12);

    numerals
}

#[cfg(test)]
mod tests {
    use crate::config::VocabularyConfig;

    use super::{VocabularySet, VocabularyStore};

    #[test]
    fn builtin_numerals_are_sorted_longest_first() {
        let vocabulary = VocabularySet::builtin();
        let words: Vec<&str> =
            vocabulary.numerals().iter().map(|(word, _)| word.as_str()).collect();

        let twenty_five = words.iter().position(|word| *word == "twenty five");
        let twenty = words.iter().position(|word| *word == "twenty");
        let five = words.iter().position(|word| *word == "five");

        assert!(twenty_five < twenty, "compound must come before its tens part");
        assert!(twenty < five, "longer word must come before shorter word");
    }

    #[test]
    fn overrides_extend_builtin_lists() {
        let overrides = VocabularyConfig {
            add_words: vec!["Grab".to_string()],
            unit_nouns: vec!["can".to_string(), "cans".to_string()],
            ..VocabularyConfig::default()
        };
        let vocabulary = VocabularySet::with_overrides(3, &overrides);

        assert_eq!(vocabulary.version(), 3);
        assert!(vocabulary.add_words().contains(&"add".to_string()));
        assert!(vocabulary.add_words().contains(&"grab".to_string()));
        assert!(vocabulary.is_unit_noun("CANS"));
    }

    #[test]
    fn custom_numerals_shadow_builtin_values() {
        let mut overrides = VocabularyConfig::default();
        overrides.numerals.insert("dozen".to_string(), 13);
        let vocabulary = VocabularySet::with_overrides(2, &overrides);

        let dozen = vocabulary
            .numerals()
            .iter()
            .find(|(word, _)| word == "dozen")
            .map(|(_, value)| *value);
        assert_eq!(dozen, Some(13));
    }

    #[test]
    fn thai_numerals_sort_by_char_count_not_bytes() {
        let mut overrides = VocabularyConfig::default();
        overrides.numerals.insert("สอง".to_string(), 2);
        overrides.numerals.insert("ยี่สิบสอง".to_string(), 22);
        let vocabulary = VocabularySet::with_overrides(2, &overrides);

        let words: Vec<&str> =
            vocabulary.numerals().iter().map(|(word, _)| word.as_str()).collect();
        let compound = words.iter().position(|word| *word == "ยี่สิบสอง");
        let single = words.iter().position(|word| *word == "สอง");
        assert!(compound < single, "nine-char Thai compound must come before three-char word");
    }

    #[test]
    fn removable_words_cover_all_action_vocabulary() {
        let vocabulary = VocabularySet::builtin();
        let removable = vocabulary.removable_words();

        assert!(removable.contains(&"add"));
        assert!(removable.contains(&"remove"));
        assert!(removable.contains(&"decrease"));
        assert!(removable.contains(&"everything"));
        assert!(removable.contains(&"empty the cart"));
        assert!(removable.contains(&"please"));

        let empty_cart = removable.iter().position(|word| *word == "empty the cart");
        let all = removable.iter().position(|word| *word == "all");
        assert!(empty_cart < all, "phrases must be stripped before short words");
    }

    #[tokio::test]
    async fn store_reload_bumps_version_atomically() {
        let store = VocabularyStore::new(VocabularySet::builtin());
        let before = store.current().await;
        assert_eq!(before.version(), 1);

        let overrides = VocabularyConfig {
            add_words: vec!["grab".to_string()],
            ..VocabularyConfig::default()
        };
        let version = store.reload(&overrides).await;
        assert_eq!(version, 2);

        let after = store.current().await;
        assert!(after.add_words().contains(&"grab".to_string()));
        // The snapshot taken before the reload is unchanged.
        assert!(!before.add_words().contains(&"grab".to_string()));
    }
}
