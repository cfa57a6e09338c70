//! Pure state transitions driven by user intents.
//!
//! Every operation takes the current [`FilterState`] by reference and returns
//! a new one; the input is never modified. Results are always canonical.

use crate::error::FilterError;
use crate::schema::{FilterSchema, ValueKind};
use crate::state::{FilterState, Selection};
use std::collections::{BTreeMap, BTreeSet};

/// Reducer bound to one view's schema.
#[derive(Debug, Clone, Copy)]
pub struct FilterReducer<'a> {
    schema: &'a FilterSchema,
}

impl<'a> FilterReducer<'a> {
    #[must_use]
    pub const fn new(schema: &'a FilterSchema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub const fn schema(&self) -> &'a FilterSchema {
        self.schema
    }

    /// Flip `key` in `section`.
    ///
    /// For boolean-set sections the key is removed if selected and added
    /// otherwise; removing the last key drops the section, so
    /// `toggle(toggle(s, k), k) == s`. For single-enum and text sections
    /// toggling the current choice clears it, any other key replaces it.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownSection`], [`FilterError::KindMismatch`] on a
    /// range or mapping section, or [`FilterError::InvalidValueKey`].
    pub fn toggle(
        &self,
        state: &FilterState,
        section: &str,
        key: &str,
    ) -> Result<FilterState, FilterError> {
        let kind = self.schema.section_kind(section)?;
        if matches!(kind, ValueKind::Mapping { .. }) {
            return Err(FilterError::KindMismatch {
                section: section.to_string(),
                kind: kind.label(),
                operation: "toggling a value-key",
            });
        }
        self.schema.validate_key(section, key)?;
        let next = match (kind, state.get(section)) {
            (ValueKind::BooleanSet { .. }, Some(Selection::Keys(keys))) => {
                let mut keys = keys.clone();
                if !keys.remove(key) {
                    keys.insert(key.to_string());
                }
                Selection::Keys(keys)
            }
            (ValueKind::BooleanSet { .. }, _) => Selection::Keys(BTreeSet::from([key.to_string()])),
            (ValueKind::SingleEnum { default, .. }, current) => {
                let already = matches!(current, Some(Selection::Choice(v)) if v == key);
                if already || key == default.as_str() {
                    return Ok(state.without_section(section));
                }
                Selection::Choice(key.to_string())
            }
            (ValueKind::Text, Some(Selection::Choice(current))) if current == key => {
                return Ok(state.without_section(section));
            }
            (ValueKind::Text, _) => Selection::Choice(key.to_string()),
            (ValueKind::Range | ValueKind::Mapping { .. }, _) => {
                return Err(FilterError::KindMismatch {
                    section: section.to_string(),
                    kind: kind.label(),
                    operation: "toggling a value-key",
                });
            }
        };
        Ok(state.with_section(section, next))
    }

    /// Drop every selection in `section`.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownSection`] if the schema has no such section.
    pub fn clear_section(
        &self,
        state: &FilterState,
        section: &str,
    ) -> Result<FilterState, FilterError> {
        self.schema.section_kind(section)?;
        Ok(state.without_section(section))
    }

    /// The canonical empty state. Idempotent.
    #[must_use]
    pub fn clear_all(&self, _state: &FilterState) -> FilterState {
        FilterState::new()
    }

    /// Set `section` to exactly `keys`; an empty set drops the section.
    ///
    /// Single-enum and text sections accept at most one key.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownSection`], [`FilterError::KindMismatch`] for
    /// ranges, mappings or several keys on a single-value section, and
    /// [`FilterError::InvalidValueKey`] for any rejected key.
    pub fn replace_section<I, S>(
        &self,
        state: &FilterState,
        section: &str,
        keys: I,
    ) -> Result<FilterState, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kind = self.schema.section_kind(section)?;
        if matches!(kind, ValueKind::Range | ValueKind::Mapping { .. }) {
            return Err(FilterError::KindMismatch {
                section: section.to_string(),
                kind: kind.label(),
                operation: "replacing value-keys",
            });
        }
        let keys: BTreeSet<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        for key in &keys {
            self.schema.validate_key(section, key)?;
        }
        match kind {
            ValueKind::BooleanSet { .. } => Ok(state.with_section(section, Selection::Keys(keys))),
            _ if keys.len() > 1 => Err(FilterError::KindMismatch {
                section: section.to_string(),
                kind: kind.label(),
                operation: "replacing with several values",
            }),
            _ => match keys.into_iter().next() {
                Some(value) => self.set_choice(state, section, &value),
                None => Ok(state.without_section(section)),
            },
        }
    }

    /// Set the bounds of a range section; two open bounds drop the section.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownSection`], [`FilterError::KindMismatch`] for a
    /// non-range section, [`FilterError::InvalidValueKey`] if `min > max`.
    pub fn set_range(
        &self,
        state: &FilterState,
        section: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<FilterState, FilterError> {
        let kind = self.schema.section_kind(section)?;
        if !matches!(kind, ValueKind::Range) {
            return Err(FilterError::KindMismatch {
                section: section.to_string(),
                kind: kind.label(),
                operation: "setting range bounds",
            });
        }
        if let (Some(lo), Some(hi)) = (min, max)
            && lo > hi
        {
            return Err(FilterError::InvalidValueKey {
                section: section.to_string(),
                value: format!("{lo}..{hi}"),
                reason: "range minimum exceeds maximum",
            });
        }
        Ok(state.with_section(section, Selection::Range { min, max }))
    }

    /// Choose `value` in a single-enum or text section; choosing the enum
    /// default drops it.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownSection`], [`FilterError::KindMismatch`] for any
    /// other kind, [`FilterError::InvalidValueKey`] for a value that is not
    /// allowed.
    pub fn set_choice(
        &self,
        state: &FilterState,
        section: &str,
        value: &str,
    ) -> Result<FilterState, FilterError> {
        let kind = self.schema.section_kind(section)?;
        let default = match kind {
            ValueKind::SingleEnum { default, .. } => Some(default.as_str()),
            ValueKind::Text => None,
            _ => {
                return Err(FilterError::KindMismatch {
                    section: section.to_string(),
                    kind: kind.label(),
                    operation: "choosing a single value",
                });
            }
        };
        self.schema.validate_key(section, value)?;
        if default == Some(value) {
            return Ok(state.without_section(section));
        }
        Ok(state.with_section(section, Selection::Choice(value.to_string())))
    }

    /// Set or, with `value: None`, remove one entry of a mapping section.
    /// Removing the last entry drops the section.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownSection`], [`FilterError::KindMismatch`] for a
    /// non-mapping section, [`FilterError::InvalidValueKey`] for a rejected
    /// key or value.
    pub fn set_entry(
        &self,
        state: &FilterState,
        section: &str,
        key: &str,
        value: Option<&str>,
    ) -> Result<FilterState, FilterError> {
        let mut entries = match state.get(section) {
            Some(Selection::Entries(entries)) => entries.clone(),
            _ => BTreeMap::new(),
        };
        match value {
            Some(value) => {
                self.schema.validate_entry(section, key, value)?;
                entries.insert(key.to_string(), value.to_string());
            }
            None => {
                let kind = self.schema.section_kind(section)?;
                if !matches!(kind, ValueKind::Mapping { .. }) {
                    return Err(FilterError::KindMismatch {
                        section: section.to_string(),
                        kind: kind.label(),
                        operation: "removing a mapping entry",
                    });
                }
                entries.remove(key);
            }
        }
        Ok(state.with_section(section, Selection::Entries(entries)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FilterSchema {
        FilterSchema::builder("test")
            .closed_set("arch", ["arm64", "x86"])
            .boolean_set("configs")
            .range("duration")
            .single_enum("table", ["all", "failed", "success"], "all")
            .text("path")
            .index_mapping("commits")
            .build()
            .expect("schema should build")
    }

    #[test]
    fn toggle_adds_then_removes() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let empty = FilterState::new();

        let on = r.toggle(&empty, "arch", "arm64").expect("toggle on");
        assert!(on.is_selected("arch", "arm64"));
        assert_eq!(on.len(), 1);

        let off = r.toggle(&on, "arch", "arm64").expect("toggle off");
        assert_eq!(off, empty);
        assert!(off.get("arch").is_none());
    }

    #[test]
    fn toggle_keeps_other_keys() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let s = r
            .replace_section(&FilterState::new(), "arch", ["arm64", "x86"])
            .expect("replace");
        let s = r.toggle(&s, "arch", "x86").expect("toggle");
        assert_eq!(s.selected_keys("arch"), ["arm64"]);
    }

    #[test]
    fn toggle_does_not_touch_input() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let before = r
            .toggle(&FilterState::new(), "configs", "defconfig")
            .expect("toggle");
        let snapshot = before.clone();
        let _after = r.toggle(&before, "configs", "tinyconfig").expect("toggle");
        assert_eq!(before, snapshot);
    }

    #[test]
    fn toggle_unknown_section_fails() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let err = r
            .toggle(&FilterState::new(), "compiler", "gcc")
            .expect_err("unknown section");
        assert_eq!(err, FilterError::UnknownSection("compiler".into()));
    }

    #[test]
    fn toggle_on_range_is_kind_mismatch() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let err = r
            .toggle(&FilterState::new(), "duration", "5")
            .expect_err("range toggle");
        assert!(matches!(err, FilterError::KindMismatch { .. }));
    }

    #[test]
    fn toggle_single_enum() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let failed = r.toggle(&FilterState::new(), "table", "failed").expect("on");
        assert_eq!(failed.selected_keys("table"), ["failed"]);
        let success = r.toggle(&failed, "table", "success").expect("switch");
        assert_eq!(success.selected_keys("table"), ["success"]);
        let cleared = r.toggle(&success, "table", "success").expect("off");
        assert!(cleared.is_empty());
        let default = r.toggle(&FilterState::new(), "table", "all").expect("default");
        assert!(default.is_empty());
    }

    #[test]
    fn clear_section_and_all() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let s = r.toggle(&FilterState::new(), "arch", "x86").expect("toggle");
        let s = r.toggle(&s, "configs", "defconfig").expect("toggle");

        let no_arch = r.clear_section(&s, "arch").expect("clear");
        assert!(!no_arch.is_active("arch"));
        assert!(no_arch.is_active("configs"));

        assert!(r.clear_section(&s, "nope").is_err());

        let empty = r.clear_all(&s);
        assert!(empty.is_empty());
        assert_eq!(r.clear_all(&empty), empty);
    }

    #[test]
    fn replace_section_exact_and_empty() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let s = r.toggle(&FilterState::new(), "configs", "a").expect("toggle");
        let s = r.replace_section(&s, "configs", ["b", "c"]).expect("replace");
        assert_eq!(s.selected_keys("configs"), ["b", "c"]);
        let s = r
            .replace_section(&s, "configs", Vec::<String>::new())
            .expect("replace empty");
        assert!(s.is_empty());
    }

    #[test]
    fn replace_section_validates_keys() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let err = r
            .replace_section(&FilterState::new(), "arch", ["arm64", "mips"])
            .expect_err("outside domain");
        assert!(matches!(err, FilterError::InvalidValueKey { .. }));

        let err = r
            .replace_section(&FilterState::new(), "table", ["failed", "success"])
            .expect_err("two values");
        assert!(matches!(err, FilterError::KindMismatch { .. }));
    }

    #[test]
    fn set_range_rules() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let s = r
            .set_range(&FilterState::new(), "duration", Some(1), Some(30))
            .expect("set");
        assert!(s.is_active("duration"));
        let open = r.set_range(&s, "duration", None, None).expect("clear");
        assert!(open.is_empty());
        assert!(r.set_range(&s, "duration", Some(9), Some(1)).is_err());
        assert!(r.set_range(&s, "arch", Some(1), None).is_err());
    }

    #[test]
    fn set_choice_rules() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let s = r
            .set_choice(&FilterState::new(), "table", "failed")
            .expect("choose");
        assert!(s.is_selected("table", "failed"));
        assert!(r.set_choice(&s, "table", "all").expect("default").is_empty());
        assert!(r.set_choice(&s, "table", "bogus").is_err());
        assert!(r.set_choice(&s, "configs", "x").is_err());
    }

    #[test]
    fn text_holds_at_most_one_value() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let s = r.toggle(&FilterState::new(), "path", "boot").expect("toggle");
        let s = r.toggle(&s, "path", "baseline.login").expect("switch");
        assert_eq!(s.selected_keys("path"), ["baseline.login"]);
        assert!(r.toggle(&s, "path", "baseline.login").expect("off").is_empty());

        let chosen = r.set_choice(&s, "path", "kselftest").expect("choose");
        assert_eq!(chosen.selected_keys("path"), ["kselftest"]);

        let err = r
            .replace_section(&s, "path", ["a", "b"])
            .expect_err("two paths");
        assert!(matches!(err, FilterError::KindMismatch { .. }));
        let one = r.replace_section(&s, "path", ["a"]).expect("one path");
        assert_eq!(one.selected_keys("path"), ["a"]);
        assert!(r.set_choice(&s, "path", "").is_err());
    }

    #[test]
    fn set_entry_adds_and_removes() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let s = r
            .set_entry(&FilterState::new(), "commits", "0", Some("abc123"))
            .expect("pin");
        let s = r.set_entry(&s, "commits", "1", Some("def456")).expect("pin");
        let s = r.set_entry(&s, "commits", "0", Some("fff000")).expect("repin");
        assert_eq!(
            s.get("commits"),
            Some(&Selection::Entries(BTreeMap::from([
                ("0".to_string(), "fff000".to_string()),
                ("1".to_string(), "def456".to_string()),
            ])))
        );
        let s = r.set_entry(&s, "commits", "1", None).expect("unpin");
        let s = r.set_entry(&s, "commits", "0", None).expect("unpin");
        assert!(s.is_empty());
    }

    #[test]
    fn set_entry_rejects_bad_input() {
        let schema = schema();
        let r = FilterReducer::new(&schema);
        let empty = FilterState::new();
        assert!(matches!(
            r.set_entry(&empty, "commits", "tip", Some("abc")),
            Err(FilterError::InvalidValueKey { .. })
        ));
        assert!(r.set_entry(&empty, "commits", "0", Some("")).is_err());
        assert!(matches!(
            r.set_entry(&empty, "configs", "0", None),
            Err(FilterError::KindMismatch { .. })
        ));
        assert!(matches!(
            r.toggle(&empty, "commits", "0"),
            Err(FilterError::KindMismatch { .. })
        ));
        assert!(r.replace_section(&empty, "commits", ["0"]).is_err());
    }
}
