use crate::vocabulary::VocabularySet;

/// Strips all action vocabulary and generic fillers from the utterance, no
/// matter which action was classified, then collapses whitespace. Stripping
/// everything keeps a decrease utterance like "reduce the lemonade" from
/// leaking "reduce" into the product fragment. The result may be empty.
pub fn clean(text: &str, vocabulary: &VocabularySet) -> String {
    let mut output = text.to_lowercase();

    for word in vocabulary.removable_words() {
        if output.contains(word) {
            output = super::replace_word(&output, word, " ");
        }
    }

    super::collapse_whitespace(&output)
}

#[cfg(test)]
mod tests {
    use crate::vocabulary::VocabularySet;

    use super::clean;

    struct Case {
        name: &'static str,
        text: &'static str,
        expected: &'static str,
    }

    #[test]
    fn strips_vocabulary_and_fillers() {
        let vocabulary = VocabularySet::builtin();
        let cases = [
            Case { name: "action and filler", text: "please add 2 lemonade", expected: "2 lemonade" },
            Case {
                name: "vocabulary of other actions is stripped too",
                text: "remove 1 lemonade",
                expected: "1 lemonade",
            },
            Case {
                name: "clear phrase fully removed",
                text: "empty the cart",
                expected: "",
            },
            Case {
                name: "multi word filler",
                text: "2 lemonade thank you",
                expected: "2 lemonade",
            },
            Case {
                name: "embedded words survive",
                text: "addendum or dropper",
                expected: "addendum or dropper",
            },
            Case {
                name: "whitespace collapsed",
                text: "  add   2   lemonade  ",
                expected: "2 lemonade",
            },
            Case { name: "only vocabulary", text: "remove everything please", expected: "" },
            Case { name: "empty input", text: "", expected: "" },
        ];

        for case in cases {
            assert_eq!(clean(case.text, &vocabulary), case.expected, "case: {}", case.name);
        }
    }

    #[test]
    fn phrase_is_stripped_before_its_component_words() {
        let vocabulary = VocabularySet::builtin();
        // "take out" goes as a unit; no stray "take" or "out" token remains.
        assert_eq!(clean("take out the cola", &vocabulary), "cola");
    }
}
