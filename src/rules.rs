use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::language::Language;

// Rule sets shipped with the binary
const GREEK_RULES: &str = include_str!("../rules/greek.txt");
const ENGLISH_RULES: &str = include_str!("../rules/english.txt");

/// Error types for rule-set management
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("Failed to save rules for {language}: {source}")]
    Save {
        language: Language,
        source: std::io::Error,
    },
}

/// Built-in rule-set text for a language
pub fn default_rules(language: Language) -> &'static str {
    match language {
        Language::Greek => GREEK_RULES,
        Language::English => ENGLISH_RULES,
    }
}

/// Rule-set blob for a language
///
/// A user-replaceable `<dir>/<language>.txt` wins over the embedded
/// default when present. The blob is opaque to the core: it is appended
/// verbatim to the Reviewer instructions and never parsed.
pub fn load_rules(dir: Option<&Path>, language: Language) -> String {
    if let Some(dir) = dir {
        let path = dir.join(format!("{}.txt", language.name()));
        if let Ok(text) = fs::read_to_string(&path) {
            debug!(path = %path.display(), "loaded replacement rules");
            return text;
        }
    }
    default_rules(language).to_string()
}

/// Replace the rule set for a language
pub fn save_rules(dir: &Path, language: Language, text: &str) -> Result<(), RulesError> {
    fs::create_dir_all(dir).map_err(|source| RulesError::Save { language, source })?;
    let path = dir.join(format!("{}.txt", language.name()));
    fs::write(&path, text).map_err(|source| RulesError::Save { language, source })?;
    debug!(path = %path.display(), "saved replacement rules");
    Ok(())
}
