use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Composite key addressing one edit's decision
///
/// `edit` indexes the paragraph's resolved, stable-order edit list, not
/// the raw proposal list: re-analysis renumbers edits, and a key left
/// over from an older numbering simply reads back as pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecisionKey {
    pub paragraph: usize,
    pub edit: usize,
}

impl DecisionKey {
    pub fn new(paragraph: usize, edit: usize) -> Self {
        Self { paragraph, edit }
    }
}

/// Lifecycle state of a decision on an edit
///
/// Transitions: pending to accepted, pending to rejected, accepted and
/// rejected directly between each other, and anything back to pending via
/// an explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// A user's decision on one edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDecision {
    pub status: DecisionStatus,
    /// Replacement text supplied by the user; only meaningful when the
    /// decision is accepted
    pub custom_text: Option<String>,
}

impl EditDecision {
    /// Text actually written for an accepted edit
    ///
    /// A custom override wins over the Reviewer suggestion when it is
    /// non-empty after trimming whitespace.
    pub fn final_text<'a>(&'a self, revised: &'a str) -> &'a str {
        match &self.custom_text {
            Some(custom) if !custom.trim().is_empty() => custom,
            _ => revised,
        }
    }
}

/// Per-session store of edit decisions
///
/// Created for one review session, reset whenever a new analysis run
/// starts, and passed by reference to whoever needs it. Decisions are
/// created implicitly as pending the first time a key is referenced.
/// Never persisted.
#[derive(Debug, Clone, Default)]
pub struct DecisionStore {
    decisions: HashMap<DecisionKey, EditDecision>,
}

impl DecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decision for a key, registering it as pending on first reference
    pub fn get(&mut self, key: DecisionKey) -> &EditDecision {
        self.decisions.entry(key).or_default()
    }

    /// Decision for a key without registering it
    pub fn peek(&self, key: DecisionKey) -> EditDecision {
        self.decisions.get(&key).cloned().unwrap_or_default()
    }

    /// Status for a key; unknown (or stale) keys read as pending
    pub fn status(&self, key: DecisionKey) -> DecisionStatus {
        self.decisions
            .get(&key)
            .map(|decision| decision.status)
            .unwrap_or_default()
    }

    /// Record a decision
    ///
    /// Custom text is trimmed and only retained on an accepted decision;
    /// rejecting (or resetting to pending) always clears it.
    pub fn set(&mut self, key: DecisionKey, status: DecisionStatus, custom_text: Option<String>) {
        let custom_text = match status {
            DecisionStatus::Accepted => custom_text
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            DecisionStatus::Rejected | DecisionStatus::Pending => None,
        };
        self.decisions.insert(key, EditDecision { status, custom_text });
    }

    /// Apply a status to every key currently known
    ///
    /// Custom text survives only a transition to accepted.
    pub fn bulk_set(&mut self, status: DecisionStatus) {
        for decision in self.decisions.values_mut() {
            decision.status = status;
            if status != DecisionStatus::Accepted {
                decision.custom_text = None;
            }
        }
    }

    /// Discard every decision; the next reference starts from pending
    pub fn reset_all(&mut self) {
        self.decisions.clear();
    }

    /// Number of keys currently known
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Number of known decisions with the given status
    pub fn count(&self, status: DecisionStatus) -> usize {
        self.decisions
            .values()
            .filter(|decision| decision.status == status)
            .count()
    }
}
