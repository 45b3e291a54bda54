//! Collapsing of repeated articles.
//!
//! Portals sometimes render the same article twice (a table of contents with
//! full text, or a page that repeats the law body for printing). Provisions
//! sharing a reference and language are merged into one; when the copies
//! disagree on substance the disagreement is counted as a conflict.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SOURCE_LANGUAGE;
use crate::types::Provision;

/// Outcome counters of one [`dedupe`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupStats {
    /// Provisions dropped because an earlier one had the same key.
    pub duplicates: usize,
    /// Dropped provisions whose content differed beyond whitespace.
    pub conflicts: usize,
}

impl DedupStats {
    /// True when no article had to be merged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.duplicates == 0
    }
}

/// Merge provisions that share `(reference, language)`.
///
/// Output keeps first-seen order. The surviving copy carries the longer
/// content (after whitespace collapsing); on a tie the earlier copy stays.
/// A title found on either copy is kept when the winner has none.
///
/// # Examples
/// ```
/// use fagui_harvester::dedup::dedupe;
/// use fagui_harvester::types::Provision;
///
/// let (out, stats) = dedupe(vec![
///     Provision::new("X", "1", "甲"),
///     Provision::new("X", "1", " 甲 "),
/// ]);
/// assert_eq!(out.len(), 1);
/// assert_eq!((stats.duplicates, stats.conflicts), (1, 0));
/// ```
pub fn dedupe(provisions: Vec<Provision>) -> (Vec<Provision>, DedupStats) {
    let mut stats = DedupStats::default();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut kept: Vec<Provision> = Vec::with_capacity(provisions.len());

    for mut provision in provisions {
        provision.provision_ref = provision.provision_ref.trim().to_string();
        let language = if provision.language.trim().is_empty() {
            SOURCE_LANGUAGE.to_string()
        } else {
            provision.language.clone()
        };
        let key = (provision.provision_ref.clone(), language);

        let Some(&slot) = index.get(&key) else {
            index.insert(key, kept.len());
            kept.push(provision);
            continue;
        };

        stats.duplicates += 1;
        let holder = &mut kept[slot];
        let held = collapse_whitespace(&holder.content);
        let incoming = collapse_whitespace(&provision.content);

        if held != incoming {
            stats.conflicts += 1;
            tracing::debug!(
                document_id = %holder.document_id,
                provision_ref = %holder.provision_ref,
                held_chars = held.chars().count(),
                incoming_chars = incoming.chars().count(),
                "Conflicting copies of article"
            );
        }

        let mut loser = provision;
        if incoming.chars().count() > held.chars().count() {
            std::mem::swap(holder, &mut loser);
        }
        if holder.title.as_deref().is_none_or(str::is_empty) {
            holder.title = loser.title.filter(|t| !t.is_empty());
        }
    }

    if stats.conflicts > 0 {
        tracing::warn!(
            duplicates = stats.duplicates,
            conflicts = stats.conflicts,
            "Duplicate articles with differing content"
        );
    } else if !stats.is_clean() {
        tracing::debug!(duplicates = stats.duplicates, "Merged duplicate articles");
    }

    (kept, stats)
}

/// Trim and collapse every whitespace run to a single space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
