//! Flat string-keyed encoding of a [`FilterState`].
//!
//! The record is what ends up in the address-bar query string:
//!
//! | kind        | keys                           | value                            |
//! |-------------|--------------------------------|----------------------------------|
//! | boolean-set | `<section>`                    | sorted keys joined by `,`        |
//! | single-enum | `<section>`                    | the chosen value                 |
//! | text        | `<section>`                    | the value                        |
//! | mapping     | `<section>`                    | sorted `key:value` joined by `,` |
//! | range       | `<section>Min`, `<section>Max` | integer bound                    |
//!
//! Decoding is field-by-field. A malformed section falls back to its empty
//! default and never invalidates its siblings; keys the schema does not own
//! are ignored.

use crate::error::MalformedValue;
use crate::schema::{
    ENTRY_SEPARATOR, FilterSchema, LIST_SEPARATOR, RANGE_MAX_SUFFIX, RANGE_MIN_SUFFIX, Section,
    ValueKind,
};
use crate::state::{FilterState, Selection};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// String-keyed query representation.
pub type QueryRecord = BTreeMap<String, String>;

/// Encoder/decoder bound to one view's schema.
#[derive(Debug, Clone, Copy)]
pub struct FilterCodec<'a> {
    schema: &'a FilterSchema,
}

impl<'a> FilterCodec<'a> {
    #[must_use]
    pub const fn new(schema: &'a FilterSchema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub const fn schema(&self) -> &'a FilterSchema {
        self.schema
    }

    /// Encode `state` in canonical sparse form.
    ///
    /// The state is canonicalized first, so sections with nothing admissible
    /// selected are omitted.
    #[must_use]
    pub fn encode(&self, state: &FilterState) -> QueryRecord {
        let canonical = state.canonicalize(self.schema);
        let mut out = QueryRecord::new();
        for (section, selection) in canonical.sections() {
            match selection {
                Selection::Keys(keys) => {
                    let joined = keys
                        .iter()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(&LIST_SEPARATOR.to_string());
                    out.insert(section.to_string(), joined);
                }
                Selection::Entries(entries) => {
                    let joined = entries
                        .iter()
                        .map(|(key, value)| format!("{key}{ENTRY_SEPARATOR}{value}"))
                        .collect::<Vec<_>>()
                        .join(&LIST_SEPARATOR.to_string());
                    out.insert(section.to_string(), joined);
                }
                Selection::Choice(value) => {
                    out.insert(section.to_string(), value.clone());
                }
                Selection::Range { min, max } => {
                    if let Some(min) = min {
                        out.insert(range_min_key(section), min.to_string());
                    }
                    if let Some(max) = max {
                        out.insert(range_max_key(section), max.to_string());
                    }
                }
            }
        }
        out
    }

    /// Decode `raw`, logging every field that had to be dropped.
    #[must_use]
    pub fn decode(&self, raw: &QueryRecord) -> FilterState {
        let (state, rejected) = self.decode_report(raw);
        for bad in &rejected {
            warn!(
                view = self.schema.name(),
                section = %bad.section,
                key = %bad.key,
                reason = bad.reason,
                "dropping malformed filter value"
            );
        }
        state
    }

    /// Decode `raw` and return the fields that fell back to their default.
    #[must_use]
    pub fn decode_report(&self, raw: &QueryRecord) -> (FilterState, Vec<MalformedValue>) {
        let mut rejected = Vec::new();
        let state = self
            .schema
            .sections()
            .filter_map(|section| match decode_section(section, raw) {
                Ok(Some(selection)) => Some((section.name.clone(), selection)),
                Ok(None) => None,
                Err(bad) => {
                    rejected.push(bad);
                    None
                }
            })
            .collect();
        (state, rejected)
    }
}

#[must_use]
pub fn range_min_key(section: &str) -> String {
    format!("{section}{RANGE_MIN_SUFFIX}")
}

#[must_use]
pub fn range_max_key(section: &str) -> String {
    format!("{section}{RANGE_MAX_SUFFIX}")
}

fn decode_section(
    section: &Section,
    raw: &QueryRecord,
) -> Result<Option<Selection>, MalformedValue> {
    let name = section.name.as_str();
    let kind = &section.kind;
    match kind {
        ValueKind::BooleanSet { .. } => {
            let Some(value) = raw.get(name) else {
                return Ok(None);
            };
            let mut keys = BTreeSet::new();
            for item in value.split(LIST_SEPARATOR).map(str::trim) {
                if item.is_empty() {
                    continue;
                }
                if let Some(reason) = kind.key_problem(item) {
                    return Err(malformed(name, name, value, reason));
                }
                keys.insert(item.to_string());
            }
            Ok((!keys.is_empty()).then_some(Selection::Keys(keys)))
        }
        ValueKind::SingleEnum { default, .. } => {
            let Some(value) = raw.get(name) else {
                return Ok(None);
            };
            let value = value.trim();
            if let Some(reason) = kind.key_problem(value) {
                return Err(malformed(name, name, value, reason));
            }
            Ok((value != default.as_str()).then(|| Selection::Choice(value.to_string())))
        }
        ValueKind::Text => {
            let value = raw.get(name).map_or("", |v| v.trim());
            Ok((!value.is_empty()).then(|| Selection::Choice(value.to_string())))
        }
        ValueKind::Mapping { .. } => {
            let Some(value) = raw.get(name) else {
                return Ok(None);
            };
            let mut entries = BTreeMap::new();
            for item in value.split(LIST_SEPARATOR).map(str::trim) {
                if item.is_empty() {
                    continue;
                }
                let Some((key, text)) = item.split_once(ENTRY_SEPARATOR) else {
                    return Err(malformed(name, name, value, "mapping entry has no ':'"));
                };
                let (key, text) = (key.trim(), text.trim());
                if let Some(reason) = kind
                    .key_problem(key)
                    .or_else(|| ValueKind::entry_value_problem(text))
                {
                    return Err(malformed(name, name, value, reason));
                }
                entries.insert(key.to_string(), text.to_string());
            }
            Ok((!entries.is_empty()).then_some(Selection::Entries(entries)))
        }
        ValueKind::Range => {
            let min_key = range_min_key(name);
            let max_key = range_max_key(name);
            let min = parse_bound(name, &min_key, raw.get(&min_key))?;
            let max = parse_bound(name, &max_key, raw.get(&max_key))?;
            if let (Some(lo), Some(hi)) = (min, max)
                && lo > hi
            {
                let shown = format!("{lo}..{hi}");
                return Err(malformed(name, &min_key, &shown, "range minimum exceeds maximum"));
            }
            let selection = Selection::Range { min, max };
            Ok((!selection.is_empty()).then_some(selection))
        }
    }
}

fn parse_bound(
    section: &str,
    key: &str,
    value: Option<&String>,
) -> Result<Option<i64>, MalformedValue> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| malformed(section, key, value, "range bound is not an integer"))
}

fn malformed(section: &str, key: &str, raw: &str, reason: &'static str) -> MalformedValue {
    MalformedValue {
        section: section.to_string(),
        key: key.to_string(),
        raw: raw.to_string(),
        reason,
    }
}
