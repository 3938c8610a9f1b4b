use crate::domain::command::CartAction;
use crate::vocabulary::VocabularySet;

/// Classifies the action for one utterance. Priority when several word lists
/// match: clear, then delete, then decrease. Anything else, including empty
/// or unrecognized input, is an add. A clear is either a dedicated clear
/// phrase, or a delete word combined with a whole-cart qualifier.
pub fn classify(text: &str, vocabulary: &VocabularySet) -> CartAction {
    let text = text.to_lowercase();

    let has_clear_phrase =
        vocabulary.clear_phrases().iter().any(|phrase| super::contains_word(&text, phrase));
    let has_delete = vocabulary.delete_words().iter().any(|word| super::contains_word(&text, word));
    let has_qualifier =
        vocabulary.clear_qualifiers().iter().any(|word| super::contains_word(&text, word));

    if has_clear_phrase || (has_delete && has_qualifier) {
        return CartAction::Clear;
    }
    if has_delete {
        return CartAction::Delete;
    }
    if vocabulary.decrease_words().iter().any(|word| super::contains_word(&text, word)) {
        return CartAction::Decrease;
    }

    CartAction::Add
}
