use crate::vocabulary::VocabularySet;

/// Lowercases the utterance and rewrites every numeral word to its digit
/// form, padded with a single space on each side. The lexicon is consulted
/// longest word first, so "twenty five" becomes ` 25 ` before "twenty" or
/// "five" get a chance to match. Digit tokens are not lexicon words, which
/// makes the pass idempotent.
pub fn normalize(text: &str, vocabulary: &VocabularySet) -> String {
    let mut output = text.to_lowercase();

    for (word, value) in vocabulary.numerals() {
        if output.contains(word.as_str()) {
            let padded = format!(" {value} ");
            output = super::replace_word(&output, word, &padded);
        }
    }

    output
}
