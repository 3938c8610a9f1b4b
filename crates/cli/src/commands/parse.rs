use cartwright_core::config::{AppConfig, LoadOptions};
use cartwright_core::parser::parse_utterance;
use cartwright_core::vocabulary::VocabularySet;

use crate::commands::CommandResult;

/// Runs the four parser stages over one utterance and prints every
/// intermediate form. Vocabulary overrides from the config file apply, so
/// operators can check a custom numeral or filler word before deploying it.
pub fn run(text: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "parse",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let vocabulary = VocabularySet::with_overrides(1, &config.vocabulary);
    let parsed = parse_utterance(text, &vocabulary);

    let breakdown = serde_json::json!({
        "command": "parse",
        "input": text,
        "normalized": parsed.normalized,
        "action": parsed.action,
        "cleaned": parsed.cleaned,
        "candidates": parsed.candidates,
    });

    let output = serde_json::to_string_pretty(&breakdown).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"parse\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    });

    CommandResult { exit_code: 0, output }
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
