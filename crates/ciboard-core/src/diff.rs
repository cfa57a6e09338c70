//! Candidate counts for the filter cards.
//!
//! Each card lists the values of one section with a count of how many rows
//! that value would contribute. The upstream provider sends two summaries per
//! view: one computed without any filter (global) and one with the current
//! filters applied (current).

use crate::state::{FilterState, Selection};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Server-computed counts per section and value-key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateSummary {
    sections: BTreeMap<String, BTreeMap<String, u64>>,
}

impl AggregateSummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a summary from a JSON object of objects of counts.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text is not that shape or a
    /// count is negative.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Add `count` to `section`/`key`.
    pub fn add(&mut self, section: &str, key: &str, count: u64) {
        let slot = self
            .sections
            .entry(section.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default();
        *slot = slot.saturating_add(count);
    }

    #[must_use]
    pub fn count(&self, section: &str, key: &str) -> Option<u64> {
        self.sections.get(section)?.get(key).copied()
    }

    #[must_use]
    pub fn section(&self, section: &str) -> Option<&BTreeMap<String, u64>> {
        self.sections.get(section)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl<S: AsRef<str>, K: AsRef<str>> FromIterator<(S, K, u64)> for AggregateSummary {
    fn from_iter<I: IntoIterator<Item = (S, K, u64)>>(iter: I) -> Self {
        let mut summary = Self::new();
        for (section, key, count) in iter {
            summary.add(section.as_ref(), key.as_ref(), count);
        }
        summary
    }
}

/// Which summary a section's counts are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountPolicy {
    /// Sections the user has narrowed read the current summary, untouched
    /// sections read the global one.
    #[default]
    SelfExcluding,
    /// Every section reads the global summary.
    AlwaysGlobal,
}

impl CountPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelfExcluding => "self-excluding",
            Self::AlwaysGlobal => "always-global",
        }
    }
}

/// One row of a filter card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub available: u64,
    pub selected: bool,
}

/// `section -> value-key -> entry`.
pub type DiffView = BTreeMap<String, BTreeMap<String, DiffEntry>>;

/// [`diff_with_policy`] under [`CountPolicy::SelfExcluding`].
#[must_use]
pub fn diff(global: &AggregateSummary, current: &AggregateSummary, state: &FilterState) -> DiffView {
    diff_with_policy(global, current, state, CountPolicy::SelfExcluding)
}

/// Compute the filter-card rows for every value-key in either summary.
///
/// Keys that are selected but absent from both summaries are reported with
/// `available: 0` so they stay visible and can be deselected. Mapping entries
/// are pins, not filter-card values, and get no rows of their own.
#[must_use]
pub fn diff_with_policy(
    global: &AggregateSummary,
    current: &AggregateSummary,
    state: &FilterState,
    policy: CountPolicy,
) -> DiffView {
    let mut sections: BTreeSet<&str> = global.section_names().collect();
    sections.extend(current.section_names());
    sections.extend(
        state
            .sections()
            .filter(|(_, selection)| !matches!(selection, Selection::Entries(_)))
            .map(|(name, _)| name)
            .filter(|name| !state.selected_keys(name).is_empty()),
    );

    let mut view = DiffView::new();
    for section in sections {
        let source = match policy {
            CountPolicy::SelfExcluding if state.is_active(section) => current,
            CountPolicy::SelfExcluding | CountPolicy::AlwaysGlobal => global,
        };

        let mut keys: BTreeSet<&str> = BTreeSet::new();
        for summary in [global, current] {
            if let Some(counts) = summary.section(section) {
                keys.extend(counts.keys().map(String::as_str));
            }
        }
        if !matches!(state.get(section), Some(Selection::Entries(_))) {
            keys.extend(state.selected_keys(section));
        }

        let rows = keys
            .into_iter()
            .map(|key| {
                let entry = DiffEntry {
                    available: source.count(section, key).unwrap_or(0),
                    selected: state.is_selected(section, key),
                };
                (key.to_string(), entry)
            })
            .collect();
        view.insert(section.to_string(), rows);
    }
    view
}
