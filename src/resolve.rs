use tracing::debug;

use crate::proposal::EditProposal;
use crate::span::{LocatedEdit, locate};

/// Policy for choosing which of several conflicting edits survives
///
/// Both policies feed the same greedy sweep; they differ only in the
/// order candidates are considered, which decides who wins a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePolicy {
    /// Consider candidates by start offset, ties by original sequence
    /// number. Among proposals with identical spans the earliest proposal
    /// wins. Used for numbering and highlighting, where edit numbers must
    /// stay stable across renders.
    StableOrder,
    /// Consider candidates by span length descending, so a long edit is
    /// never shadowed by a shorter one that overlaps it. Used for export
    /// substitution.
    LongestFirst,
}

/// Locate and filter proposals down to a non-overlapping edit set
///
/// 1. Locate every proposal, dropping no-ops and spans that do not occur
///    in `text`.
/// 2. Order candidates by the policy's sort key.
/// 3. Sweep greedily, keeping each candidate that does not overlap an
///    already-kept one.
///
/// This is first-fit greedy interval scheduling, not a maximum
/// non-overlapping set search: conflicting proposals on the same
/// paragraph are rare and a deterministic outcome matters more than an
/// optimal one. The kept set is returned in left-to-right span order
/// regardless of the order candidates were considered in.
///
/// # Arguments
/// * `text` - The paragraph text the proposals quote
/// * `proposals` - Raw proposal list in Reviewer order
/// * `policy` - Conflict policy deciding who survives an overlap
///
/// # Returns
/// * Non-overlapping `LocatedEdit`s sorted by start offset
pub fn resolve(text: &str, proposals: &[EditProposal], policy: ResolvePolicy) -> Vec<LocatedEdit> {
    let candidates: Vec<LocatedEdit> = proposals
        .iter()
        .enumerate()
        .filter(|(_, proposal)| !proposal.is_noop())
        .filter_map(|(index, proposal)| locate(text, proposal, index + 1))
        .collect();

    sweep(candidates, policy)
}

/// Re-run the conflict sweep over already-located edits
///
/// Used at export time, where the accepted subset was located during
/// numbering and must stay non-overlapping under the export policy
/// without being searched for again.
pub fn sweep(mut candidates: Vec<LocatedEdit>, policy: ResolvePolicy) -> Vec<LocatedEdit> {
    match policy {
        ResolvePolicy::StableOrder => {
            candidates.sort_by_key(|edit| (edit.start(), edit.sequence_number));
        }
        ResolvePolicy::LongestFirst => {
            candidates.sort_by(|a, b| {
                b.span
                    .len()
                    .cmp(&a.span.len())
                    .then(a.start().cmp(&b.start()))
                    .then(a.sequence_number.cmp(&b.sequence_number))
            });
        }
    }

    let mut kept: Vec<LocatedEdit> = Vec::new();
    for candidate in candidates {
        if kept.iter().any(|edit| edit.span.overlaps(&candidate.span)) {
            debug!(
                span = ?candidate.span,
                sequence = candidate.sequence_number,
                "discarding conflicting edit"
            );
            continue;
        }
        kept.push(candidate);
    }

    // Emit left to right whichever order candidates were considered in
    kept.sort_by_key(|edit| (edit.start(), edit.sequence_number));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::Category;

    fn proposal(original: &str, revised: &str) -> EditProposal {
        EditProposal {
            original_text: original.to_string(),
            revised_text: revised.to_string(),
            rule_category: Category::Grammar,
            reasoning: String::new(),
        }
    }

    fn assert_non_overlapping(edits: &[LocatedEdit]) {
        for (i, a) in edits.iter().enumerate() {
            for b in edits.iter().skip(i + 1) {
                assert!(
                    a.end() <= b.start() || b.end() <= a.start(),
                    "spans {:?} and {:?} overlap",
                    a.span,
                    b.span
                );
            }
        }
    }

    #[test]
    fn test_resolve_never_overlaps() {
        let text = "the quick brown fox jumps over the lazy dog";
        let proposals = vec![
            proposal("quick brown", "slow grey"),
            proposal("brown fox", "red fox"),
            proposal("lazy", "sleepy"),
            proposal("the lazy dog", "a dog"),
        ];

        for policy in [ResolvePolicy::StableOrder, ResolvePolicy::LongestFirst] {
            let resolved = resolve(text, &proposals, policy);
            assert_non_overlapping(&resolved);
        }
    }

    #[test]
    fn test_stable_order_keeps_lower_sequence_on_tie() {
        let text = "foo bar foo";
        let proposals = vec![proposal("foo", "first"), proposal("foo", "second")];

        let resolved = resolve(text, &proposals, ResolvePolicy::StableOrder);

        // Both locate at offset 0; the earlier proposal wins
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].sequence_number, 1);
        assert_eq!(resolved[0].proposal.revised_text, "first");
    }

    #[test]
    fn test_longest_first_keeps_longer_of_overlapping() {
        let text = "the quick brown fox";
        let proposals = vec![proposal("quick", "slow"), proposal("quick brown", "slow grey")];

        let resolved = resolve(text, &proposals, ResolvePolicy::LongestFirst);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].proposal.original_text, "quick brown");
    }

    #[test]
    fn test_stable_order_keeps_earlier_of_overlapping() {
        let text = "the quick brown fox";
        let proposals = vec![proposal("quick", "slow"), proposal("quick brown", "slow grey")];

        let resolved = resolve(text, &proposals, ResolvePolicy::StableOrder);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].proposal.original_text, "quick");
    }

    #[test]
    fn test_unlocatable_proposals_are_dropped() {
        let text = "already revised paragraph";
        let proposals = vec![
            proposal("revised", "rewritten"),
            proposal("not in the text", "whatever"),
        ];

        let resolved = resolve(text, &proposals, ResolvePolicy::StableOrder);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].proposal.original_text, "revised");
    }

    #[test]
    fn test_noops_are_dropped() {
        let text = "some text";
        let proposals = vec![proposal("some", "some"), proposal("text", "words")];

        let resolved = resolve(text, &proposals, ResolvePolicy::StableOrder);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].proposal.original_text, "text");
    }

    #[test]
    fn test_kept_set_is_sorted_by_start() {
        let text = "alpha beta gamma delta";
        let proposals = vec![
            proposal("delta", "d"),
            proposal("alpha", "a"),
            proposal("gamma", "g"),
        ];

        for policy in [ResolvePolicy::StableOrder, ResolvePolicy::LongestFirst] {
            let resolved = resolve(text, &proposals, policy);
            let starts: Vec<usize> = resolved.iter().map(|edit| edit.start()).collect();
            let mut sorted = starts.clone();
            sorted.sort_unstable();
            assert_eq!(starts, sorted);
        }
    }

    #[test]
    fn test_disjoint_edits_all_survive() {
        let text = "one two three";
        let proposals = vec![proposal("one", "1"), proposal("two", "2"), proposal("three", "3")];

        for policy in [ResolvePolicy::StableOrder, ResolvePolicy::LongestFirst] {
            assert_eq!(resolve(text, &proposals, policy).len(), 3);
        }
    }
}
