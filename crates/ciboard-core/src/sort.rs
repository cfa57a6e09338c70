//! Column sort state for the build/boot/test tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
    #[default]
    Unsorted,
}

impl SortDirection {
    /// Query-string token for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Unsorted => "none",
        }
    }

    /// Parse a query-string token; anything unrecognised is `Unsorted`.
    ///
    /// Older links carry `false` for an unsorted column.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Self::Asc,
            "desc" => Self::Desc,
            _ => Self::Unsorted,
        }
    }

    /// Next direction on a header click: `Unsorted -> Asc -> Desc -> Unsorted`.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::Unsorted => Self::Asc,
            Self::Asc => Self::Desc,
            Self::Desc => Self::Unsorted,
        }
    }

    #[must_use]
    pub const fn is_sorted(self) -> bool {
        !matches!(self, Self::Unsorted)
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which column a table is sorted by, if any.
///
/// An unsorted state never names a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    column: Option<String>,
    direction: SortDirection,
}

impl SortState {
    /// Build a sort state, dropping the column when `direction` is unsorted
    /// or the column name is empty.
    #[must_use]
    pub fn new(column: Option<&str>, direction: SortDirection) -> Self {
        match column.map(str::trim).filter(|c| !c.is_empty()) {
            Some(column) if direction.is_sorted() => Self {
                column: Some(column.to_string()),
                direction,
            },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    #[must_use]
    pub const fn is_sorted(&self) -> bool {
        self.direction.is_sorted()
    }

    /// Header click on `column`: a new column starts ascending, the current
    /// column advances through the cycle.
    #[must_use]
    pub fn click(&self, column: &str) -> Self {
        if self.column() == Some(column) {
            Self::new(Some(column), self.direction.cycle())
        } else {
            Self::new(Some(column), SortDirection::Asc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_has_period_three() {
        for start in [SortDirection::Asc, SortDirection::Desc, SortDirection::Unsorted] {
            assert_eq!(start.cycle().cycle().cycle(), start);
        }
        assert_eq!(SortDirection::Unsorted.cycle(), SortDirection::Asc);
        assert_eq!(SortDirection::Asc.cycle(), SortDirection::Desc);
    }

    #[test]
    fn parse_lenient_never_fails() {
        assert_eq!(SortDirection::parse_lenient("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse_lenient(" DESC "), SortDirection::Desc);
        assert_eq!(SortDirection::parse_lenient("false"), SortDirection::Unsorted);
        assert_eq!(SortDirection::parse_lenient("sideways"), SortDirection::Unsorted);
        assert_eq!(SortDirection::parse_lenient(""), SortDirection::Unsorted);
    }

    #[test]
    fn click_same_column_cycles() {
        let s = SortState::default().click("duration");
        assert_eq!(s.column(), Some("duration"));
        assert_eq!(s.direction(), SortDirection::Asc);

        let s = s.click("duration");
        assert_eq!(s.direction(), SortDirection::Desc);

        let s = s.click("duration");
        assert!(!s.is_sorted());
        assert_eq!(s.column(), None);
    }

    #[test]
    fn click_other_column_restarts() {
        let s = SortState::new(Some("duration"), SortDirection::Desc).click("config");
        assert_eq!(s.column(), Some("config"));
        assert_eq!(s.direction(), SortDirection::Asc);
    }

    #[test]
    fn unsorted_drops_column() {
        assert_eq!(
            SortState::new(Some("duration"), SortDirection::Unsorted),
            SortState::default()
        );
        assert_eq!(SortState::new(Some("  "), SortDirection::Asc), SortState::default());
    }
}
