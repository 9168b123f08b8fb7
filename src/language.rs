use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Supported document languages for review
///
/// The language steers which rule set is appended to the Reviewer
/// instructions and which hint line is sent with each segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Modern Greek (monotonic)
    Greek,
    /// English (American conventions)
    English,
}

impl Language {
    /// Get the language name as a lowercase string
    pub fn name(&self) -> &str {
        match self {
            Language::Greek => "greek",
            Language::English => "english",
        }
    }

    /// Instruction line sent to the Reviewer alongside a text segment
    pub fn hint(&self) -> &str {
        match self {
            Language::Greek => {
                "This text is in Greek. Pay special attention to Final Nu (Τελικό Ν) rules."
            }
            Language::English => "This text is in English. Enforce Oxford comma and active voice.",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "greek" | "el" => Ok(Language::Greek),
            "english" | "en" => Ok(Language::English),
            _ => Err(anyhow::anyhow!("Unsupported language: {}", s)),
        }
    }
}
