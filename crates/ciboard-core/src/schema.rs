//! Declarative description of the filterable sections of one dashboard view.
//!
//! A [`FilterSchema`] is built once per view (tree details, hardware details,
//! or a view declared in config) and is read-only afterwards. The codec and
//! reducer are generic over it, so the build/boot/test tabs share one
//! implementation and differ only in the schema they are handed.

use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Separator between value-keys of a boolean-set section in a query value.
pub const LIST_SEPARATOR: char = ',';

/// Separator between the key and the value of one mapping entry.
pub const ENTRY_SEPARATOR: char = ':';

/// Query-key suffix carrying the lower bound of a range section.
pub const RANGE_MIN_SUFFIX: &str = "Min";

/// Query-key suffix carrying the upper bound of a range section.
pub const RANGE_MAX_SUFFIX: &str = "Max";

/// How the values of a section are shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValueKind {
    /// Any number of value-keys may be selected at once.
    ///
    /// `domain: None` accepts any well-formed key (configs, issue ids, test
    /// paths come from the data, not from the schema).
    BooleanSet {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        domain: Option<BTreeSet<String>>,
        /// Keys are indexes written as plain decimal (`0`, `12`, never `012`).
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        integer_keys: bool,
    },
    /// Inclusive integer bounds, either of which may be open.
    Range,
    /// Exactly one of `allowed`; `default` is represented by absence.
    SingleEnum { allowed: Vec<String>, default: String },
    /// At most one free-form value; absence means no filter.
    Text,
    /// Value-key to text pairs, such as a tree index pinned to a commit.
    Mapping {
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        integer_keys: bool,
    },
}

impl ValueKind {
    /// Short label used in error messages and schema listings.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BooleanSet { .. } => "boolean-set",
            Self::Range => "range",
            Self::SingleEnum { .. } => "single-enum",
            Self::Text => "text",
            Self::Mapping { .. } => "mapping",
        }
    }

    /// Why `key` is not an admissible value-key for this kind, if it isn't.
    pub(crate) fn key_problem(&self, key: &str) -> Option<&'static str> {
        match self {
            Self::BooleanSet {
                domain,
                integer_keys,
            } => list_key_problem(key, *integer_keys).or_else(|| {
                domain
                    .as_ref()
                    .is_some_and(|d| !d.contains(key))
                    .then_some("value-key is outside the section domain")
            }),
            Self::Mapping { integer_keys } => {
                if key.contains(ENTRY_SEPARATOR) {
                    Some("value-key contains the entry separator ':'")
                } else {
                    list_key_problem(key, *integer_keys)
                }
            }
            Self::Text => {
                if key.is_empty() {
                    Some("value is empty")
                } else if key.trim() != key {
                    Some("value has surrounding whitespace")
                } else {
                    None
                }
            }
            Self::SingleEnum { allowed, .. } => {
                if allowed.iter().any(|a| a == key) {
                    None
                } else {
                    Some("value is not one of the allowed values")
                }
            }
            Self::Range => Some("range sections have no value-keys"),
        }
    }

    /// Why `value` cannot be stored under a key of a mapping section.
    pub(crate) fn entry_value_problem(value: &str) -> Option<&'static str> {
        if value.is_empty() {
            Some("mapping value is empty")
        } else if value.contains(LIST_SEPARATOR) {
            Some("mapping value contains the list separator ','")
        } else if value.trim() != value {
            Some("mapping value has surrounding whitespace")
        } else {
            None
        }
    }
}

fn list_key_problem(key: &str, integer_keys: bool) -> Option<&'static str> {
    if key.is_empty() {
        Some("value-key is empty")
    } else if key.contains(LIST_SEPARATOR) {
        Some("value-key contains the list separator ','")
    } else if key.trim() != key {
        Some("value-key has surrounding whitespace")
    } else if integer_keys && !is_index(key) {
        Some("value-key is not a non-negative integer")
    } else {
        None
    }
}

/// Plain decimal `u32` with no sign and no leading zeros.
fn is_index(key: &str) -> bool {
    key.parse::<u32>().is_ok_and(|n| n.to_string() == key)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    #[serde(flatten)]
    pub kind: ValueKind,
}

/// The sections of one view, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSchema {
    name: String,
    sections: Vec<Section>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FilterSchema {
    /// Start building a schema for the view called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> FilterSchemaBuilder {
        FilterSchemaBuilder {
            name: name.into(),
            sections: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the kind of `section`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownSection`] if the section was never
    /// registered.
    pub fn section_kind(&self, section: &str) -> Result<&ValueKind, FilterError> {
        self.index
            .get(section)
            .map(|&i| &self.sections[i].kind)
            .ok_or_else(|| FilterError::UnknownSection(section.to_string()))
    }

    #[must_use]
    pub fn contains(&self, section: &str) -> bool {
        self.index.contains_key(section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns true if the codec reads `query_key` for some section.
    ///
    /// Range sections own `<section>Min` and `<section>Max`; every other kind
    /// owns the bare section name.
    #[must_use]
    pub fn owns_key(&self, query_key: &str) -> bool {
        if let Some(&i) = self.index.get(query_key) {
            return !matches!(self.sections[i].kind, ValueKind::Range);
        }
        [RANGE_MIN_SUFFIX, RANGE_MAX_SUFFIX].iter().any(|suffix| {
            query_key
                .strip_suffix(suffix)
                .and_then(|base| self.index.get(base))
                .is_some_and(|&i| matches!(self.sections[i].kind, ValueKind::Range))
        })
    }

    /// Check that `key` may be selected in `section`.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownSection`] for an unregistered section,
    /// [`FilterError::KindMismatch`] for range sections, and
    /// [`FilterError::InvalidValueKey`] when the key is rejected by the kind.
    pub fn validate_key(&self, section: &str, key: &str) -> Result<(), FilterError> {
        let kind = self.section_kind(section)?;
        if matches!(kind, ValueKind::Range) {
            return Err(FilterError::KindMismatch {
                section: section.to_string(),
                kind: kind.label(),
                operation: "selecting a value-key",
            });
        }
        match kind.key_problem(key) {
            Some(reason) => Err(FilterError::InvalidValueKey {
                section: section.to_string(),
                value: key.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Check that `key` may map to `value` in a mapping section.
    ///
    /// # Errors
    ///
    /// As [`FilterSchema::validate_key`], plus [`FilterError::KindMismatch`]
    /// for any non-mapping section and [`FilterError::InvalidValueKey`] for a
    /// rejected value.
    pub fn validate_entry(&self, section: &str, key: &str, value: &str) -> Result<(), FilterError> {
        let kind = self.section_kind(section)?;
        if !matches!(kind, ValueKind::Mapping { .. }) {
            return Err(FilterError::KindMismatch {
                section: section.to_string(),
                kind: kind.label(),
                operation: "setting a mapping entry",
            });
        }
        self.validate_key(section, key)?;
        match ValueKind::entry_value_problem(value) {
            Some(reason) => Err(FilterError::InvalidValueKey {
                section: section.to_string(),
                value: value.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Builder returned by [`FilterSchema::builder`].
#[derive(Debug, Clone)]
pub struct FilterSchemaBuilder {
    name: String,
    sections: Vec<Section>,
}

impl FilterSchemaBuilder {
    /// Register a section with an explicit kind.
    #[must_use]
    pub fn section(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.sections.push(Section {
            name: name.into(),
            kind,
        });
        self
    }

    /// Open multi-select section.
    #[must_use]
    pub fn boolean_set(self, name: impl Into<String>) -> Self {
        self.section(
            name,
            ValueKind::BooleanSet {
                domain: None,
                integer_keys: false,
            },
        )
    }

    /// Open multi-select section whose keys are indexes.
    #[must_use]
    pub fn index_set(self, name: impl Into<String>) -> Self {
        self.section(
            name,
            ValueKind::BooleanSet {
                domain: None,
                integer_keys: true,
            },
        )
    }

    /// Multi-select section restricted to `domain`.
    #[must_use]
    pub fn closed_set<I, S>(self, name: impl Into<String>, domain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain = domain.into_iter().map(Into::into).collect();
        self.section(
            name,
            ValueKind::BooleanSet {
                domain: Some(domain),
                integer_keys: false,
            },
        )
    }

    #[must_use]
    pub fn range(self, name: impl Into<String>) -> Self {
        self.section(name, ValueKind::Range)
    }

    /// Single free-form value, such as a search path.
    #[must_use]
    pub fn text(self, name: impl Into<String>) -> Self {
        self.section(name, ValueKind::Text)
    }

    /// Index to text pairs.
    #[must_use]
    pub fn index_mapping(self, name: impl Into<String>) -> Self {
        self.section(name, ValueKind::Mapping { integer_keys: true })
    }

    #[must_use]
    pub fn single_enum<I, S>(self, name: impl Into<String>, allowed: I, default: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = allowed.into_iter().map(Into::into).collect();
        self.section(
            name,
            ValueKind::SingleEnum {
                allowed,
                default: default.to_string(),
            },
        )
    }

    /// Freeze the schema.
    ///
    /// # Errors
    ///
    /// [`FilterError::DuplicateSection`] if a name was registered twice, or
    /// [`FilterError::InvalidDefault`] if an enum default is not allowed.
    pub fn build(self) -> Result<FilterSchema, FilterError> {
        let mut index = HashMap::with_capacity(self.sections.len());
        for (i, section) in self.sections.iter().enumerate() {
            if index.insert(section.name.clone(), i).is_some() {
                return Err(FilterError::DuplicateSection(section.name.clone()));
            }
            if let ValueKind::SingleEnum { allowed, default } = &section.kind
                && !allowed.contains(default)
            {
                return Err(FilterError::InvalidDefault {
                    section: section.name.clone(),
                    default: default.clone(),
                });
            }
        }
        Ok(FilterSchema {
            name: self.name,
            sections: self.sections,
            index,
        })
    }
}
