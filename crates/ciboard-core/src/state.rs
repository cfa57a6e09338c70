//! In-memory filter selections for one view.
//!
//! [`FilterState`] is sparse: a section that is absent has nothing selected.
//! It is a plain value. Reducers never mutate a state they are given; they
//! return a new one, so equality checks and history entries stay cheap.

use crate::schema::{FilterSchema, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What is selected in one section.
///
/// Untagged in JSON: keys are an array, entries a string map, a range an
/// object with `min` and `max`, and a choice a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    /// Selected value-keys of a boolean-set section.
    Keys(BTreeSet<String>),
    /// Entries of a mapping section. Listed before `Range` so a string map
    /// is never read as a range with both bounds open.
    Entries(BTreeMap<String, String>),
    /// Bounds of a range section; `None` leaves that side open.
    Range { min: Option<i64>, max: Option<i64> },
    /// The chosen value of a single-enum or text section.
    Choice(String),
}

impl Selection {
    /// Returns true if this selection carries nothing (no keys, no bounds).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Keys(keys) => keys.is_empty(),
            Self::Entries(entries) => entries.is_empty(),
            Self::Range { min, max } => min.is_none() && max.is_none(),
            Self::Choice(value) => value.is_empty(),
        }
    }

    /// Returns true if `key` is selected (for entries: has a value).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        match self {
            Self::Keys(keys) => keys.contains(key),
            Self::Entries(entries) => entries.contains_key(key),
            Self::Choice(value) => value == key,
            Self::Range { .. } => false,
        }
    }

    /// Canonical form of this selection under `kind`, or `None` if nothing
    /// admissible remains.
    fn canonical(&self, kind: &ValueKind) -> Option<Self> {
        let out = match (self, kind) {
            (Self::Keys(keys), ValueKind::BooleanSet { .. }) => Self::Keys(
                keys.iter()
                    .filter(|k| kind.key_problem(k).is_none())
                    .cloned()
                    .collect(),
            ),
            (Self::Range { min, max }, ValueKind::Range) => {
                if let (Some(lo), Some(hi)) = (min, max)
                    && lo > hi
                {
                    return None;
                }
                Self::Range {
                    min: *min,
                    max: *max,
                }
            }
            (Self::Choice(value), ValueKind::SingleEnum { default, .. }) => {
                if value == default || kind.key_problem(value).is_some() {
                    return None;
                }
                Self::Choice(value.clone())
            }
            (Self::Choice(value), ValueKind::Text) => {
                if kind.key_problem(value).is_some() {
                    return None;
                }
                Self::Choice(value.clone())
            }
            (Self::Entries(entries), ValueKind::Mapping { .. }) => Self::Entries(
                entries
                    .iter()
                    .filter(|(k, v)| {
                        kind.key_problem(k).is_none() && ValueKind::entry_value_problem(v).is_none()
                    })
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            _ => return None,
        };
        (!out.is_empty()).then_some(out)
    }
}

/// Active selections keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    sections: BTreeMap<String, Selection>,
}

impl FilterState {
    /// The canonical empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of sections with an active selection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn get(&self, section: &str) -> Option<&Selection> {
        self.sections.get(section)
    }

    /// Returns true if the user has narrowed `section` in any way.
    #[must_use]
    pub fn is_active(&self, section: &str) -> bool {
        self.sections.get(section).is_some_and(|s| !s.is_empty())
    }

    #[must_use]
    pub fn is_selected(&self, section: &str, key: &str) -> bool {
        self.sections.get(section).is_some_and(|s| s.contains(key))
    }

    /// Selected value-keys of `section` in sorted order.
    ///
    /// Yields the choice for single-enum and text sections, the entry keys for
    /// a mapping, and nothing for ranges.
    #[must_use]
    pub fn selected_keys(&self, section: &str) -> Vec<&str> {
        match self.sections.get(section) {
            Some(Selection::Keys(keys)) => keys.iter().map(String::as_str).collect(),
            Some(Selection::Entries(entries)) => entries.keys().map(String::as_str).collect(),
            Some(Selection::Choice(value)) => vec![value.as_str()],
            Some(Selection::Range { .. }) | None => Vec::new(),
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.sections.iter().map(|(name, sel)| (name.as_str(), sel))
    }

    /// Copy of `self` with `section` set to `selection`, or removed if the
    /// selection is empty.
    #[must_use]
    pub(crate) fn with_section(&self, section: &str, selection: Selection) -> Self {
        let mut sections = self.sections.clone();
        if selection.is_empty() {
            sections.remove(section);
        } else {
            sections.insert(section.to_string(), selection);
        }
        Self { sections }
    }

    #[must_use]
    pub(crate) fn without_section(&self, section: &str) -> Self {
        if !self.sections.contains_key(section) {
            return self.clone();
        }
        let mut sections = self.sections.clone();
        sections.remove(section);
        Self { sections }
    }

    /// Canonical form under `schema`.
    ///
    /// Drops sections the schema does not know or whose selection does not
    /// match the section kind, inadmissible keys and entries, empty sections,
    /// open-ended ranges on both sides, inverted ranges, and enum choices equal
    /// to the section default.
    #[must_use]
    pub fn canonicalize(&self, schema: &FilterSchema) -> Self {
        let sections = self
            .sections
            .iter()
            .filter_map(|(name, sel)| {
                let kind = schema.section_kind(name).ok()?;
                sel.canonical(kind).map(|s| (name.clone(), s))
            })
            .collect();
        Self { sections }
    }

    #[must_use]
    pub fn is_canonical(&self, schema: &FilterSchema) -> bool {
        self.canonicalize(schema) == *self
    }
}

impl FromIterator<(String, Selection)> for FilterState {
    /// Collects raw selections; empty ones are skipped but nothing else is
    /// validated. Call [`FilterState::canonicalize`] before trusting the result.
    fn from_iter<I: IntoIterator<Item = (String, Selection)>>(iter: I) -> Self {
        let sections = iter.into_iter().filter(|(_, sel)| !sel.is_empty()).collect();
        Self { sections }
    }
}
