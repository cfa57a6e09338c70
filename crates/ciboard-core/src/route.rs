//! Full search record of a details route.
//!
//! A route's query string carries more than filters: the time interval, the
//! tree search box, the active tab, the table sort and the page. Keys owned by
//! the view schema are handed to [`FilterCodec`]; the route-level keys below
//! are parsed here; everything else is kept verbatim in `extra` so links
//! produced by other pages survive a round trip.
//!
//! Every route-level field falls back to its default on a bad value, and
//! [`RouteCodec::encode`] omits fields that equal their default.

use crate::codec::{FilterCodec, QueryRecord};
use crate::error::FilterError;
use crate::pagination::{DEFAULT_PAGE_SIZE, PaginationCursor};
use crate::reducer::FilterReducer;
use crate::schema::FilterSchema;
use crate::sort::{SortDirection, SortState};
use crate::state::FilterState;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const INTERVAL_KEY: &str = "intervalInDays";
pub const TREE_SEARCH_KEY: &str = "treeSearch";
pub const TAB_KEY: &str = "currentPageTab";
pub const SORT_KEY: &str = "sort";
pub const SORT_DIRECTION_KEY: &str = "sortDirection";
pub const PAGE_KEY: &str = "page";
pub const PAGE_SIZE_KEY: &str = "pageSize";

/// Query keys the route layer owns. They take precedence over schema keys.
pub const RESERVED_KEYS: [&str; 7] = [
    INTERVAL_KEY,
    TREE_SEARCH_KEY,
    TAB_KEY,
    SORT_KEY,
    SORT_DIRECTION_KEY,
    PAGE_KEY,
    PAGE_SIZE_KEY,
];

/// Default look-back window in days.
pub const DEFAULT_INTERVAL_IN_DAYS: u32 = 7;

#[must_use]
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

// ---------------------------------------------------------------------------
// PageTab
// ---------------------------------------------------------------------------

/// Tab of a details page.
///
/// Serialized with the same `global.*` token the query string carries; the
/// bare tab name is still read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PageTab {
    #[default]
    #[serde(rename = "global.builds", alias = "builds")]
    Builds,
    #[serde(rename = "global.boots", alias = "boots")]
    Boots,
    #[serde(rename = "global.tests", alias = "tests")]
    Tests,
}

impl PageTab {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Builds => "global.builds",
            Self::Boots => "global.boots",
            Self::Tests => "global.tests",
        }
    }

    /// Parse a tab token; unknown tokens are `None`.
    ///
    /// Accepts the full `global.*` token and the bare tab name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_start_matches("global.") {
            "builds" => Some(Self::Builds),
            "boots" => Some(Self::Boots),
            "tests" => Some(Self::Tests),
            _ => None,
        }
    }
}

impl fmt::Display for PageTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RouteSearch
// ---------------------------------------------------------------------------

/// Values used when a route-level key is absent or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefaults {
    pub interval_in_days: u32,
    pub page_size: usize,
}

impl Default for RouteDefaults {
    fn default() -> Self {
        Self {
            interval_in_days: DEFAULT_INTERVAL_IN_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Decoded search record of one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSearch {
    pub interval_in_days: u32,
    pub tree_search: String,
    pub tab: PageTab,
    pub sort: SortState,
    /// Zero-based; the query string carries it one-based.
    pub page_index: usize,
    pub page_size: usize,
    pub filters: FilterState,
    /// Unrecognized keys, re-emitted verbatim on encode.
    pub extra: QueryRecord,
}

impl RouteSearch {
    /// The all-defaults record.
    #[must_use]
    pub fn with_defaults(defaults: RouteDefaults) -> Self {
        Self {
            interval_in_days: defaults.interval_in_days,
            tree_search: String::new(),
            tab: PageTab::default(),
            sort: SortState::default(),
            page_index: 0,
            page_size: defaults.page_size,
            filters: FilterState::new(),
            extra: QueryRecord::new(),
        }
    }

    /// Pagination cursor for a table of `total_items` rows.
    #[must_use]
    pub fn cursor(&self, total_items: usize) -> PaginationCursor {
        PaginationCursor::new(self.page_index, self.page_size, total_items)
    }

    /// Clamp the page to the new row count once fresh totals arrive.
    #[must_use]
    pub fn resize(&self, total_items: usize) -> Self {
        let cursor = self.cursor(total_items);
        Self {
            page_index: cursor.page_index(),
            page_size: cursor.page_size(),
            ..self.clone()
        }
    }

    /// `[now - interval, now]`, the window data is requested for.
    ///
    /// An interval reaching before the earliest representable instant starts
    /// the window there.
    #[must_use]
    pub fn time_window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Duration::try_days(i64::from(self.interval_in_days))
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        (start, now)
    }

    /// Apply a user intent.
    ///
    /// Anything that changes which rows match (filters, interval, tree search)
    /// sends the table back to its first page. Tab changes also drop the sort,
    /// since each tab has its own columns. `total_items` is the current row
    /// count, needed to stop paging past the end.
    ///
    /// # Errors
    ///
    /// Propagates [`FilterError`] from the reducer for filter intents.
    pub fn apply(
        &self,
        reducer: &FilterReducer<'_>,
        intent: &Intent,
        total_items: usize,
    ) -> Result<Self, FilterError> {
        let state = &self.filters;
        let filters = match intent {
            Intent::Toggle { section, key } => reducer.toggle(state, section, key)?,
            Intent::ClearSection { section } => reducer.clear_section(state, section)?,
            Intent::ClearAll => reducer.clear_all(state),
            Intent::Replace { section, keys } => reducer.replace_section(state, section, keys)?,
            Intent::SetRange { section, min, max } => {
                reducer.set_range(state, section, *min, *max)?
            }
            Intent::Choose { section, value } => reducer.set_choice(state, section, value)?,
            Intent::SetEntry {
                section,
                key,
                value,
            } => reducer.set_entry(state, section, key, value.as_deref())?,
            Intent::NextPage => {
                return Ok(self.with_cursor(self.cursor(total_items).forward()));
            }
            Intent::PreviousPage => {
                return Ok(self.with_cursor(self.cursor(total_items).back()));
            }
            Intent::SetPageSize(size) => {
                return Ok(self.with_cursor(self.cursor(total_items).set_page_size(*size)));
            }
            Intent::SortBy { column } => {
                return Ok(Self {
                    sort: self.sort.click(column),
                    ..self.clone()
                });
            }
            Intent::SelectTab(tab) => {
                if *tab == self.tab {
                    return Ok(self.clone());
                }
                return Ok(Self {
                    tab: *tab,
                    sort: SortState::default(),
                    page_index: 0,
                    ..self.clone()
                });
            }
            Intent::SetInterval(days) => {
                return Ok(Self {
                    interval_in_days: (*days).max(1),
                    page_index: 0,
                    ..self.clone()
                });
            }
            Intent::SetTreeSearch(text) => {
                return Ok(Self {
                    tree_search: text.clone(),
                    page_index: 0,
                    ..self.clone()
                });
            }
        };
        Ok(Self {
            filters,
            page_index: 0,
            ..self.clone()
        })
    }

    fn with_cursor(&self, cursor: PaginationCursor) -> Self {
        Self {
            page_index: cursor.page_index(),
            page_size: cursor.page_size(),
            ..self.clone()
        }
    }
}

/// A user action on a details route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Toggle { section: String, key: String },
    ClearSection { section: String },
    ClearAll,
    Replace { section: String, keys: Vec<String> },
    SetRange {
        section: String,
        min: Option<i64>,
        max: Option<i64>,
    },
    Choose { section: String, value: String },
    /// Pin `key` to `value` in a mapping section; `None` unpins it.
    SetEntry {
        section: String,
        key: String,
        value: Option<String>,
    },
    NextPage,
    PreviousPage,
    SetPageSize(usize),
    SortBy { column: String },
    SelectTab(PageTab),
    SetInterval(u32),
    SetTreeSearch(String),
}

// ---------------------------------------------------------------------------
// RouteCodec
// ---------------------------------------------------------------------------

/// Encoder/decoder for a whole route search record.
#[derive(Debug, Clone, Copy)]
pub struct RouteCodec<'a> {
    filters: FilterCodec<'a>,
    defaults: RouteDefaults,
}

impl<'a> RouteCodec<'a> {
    #[must_use]
    pub const fn new(schema: &'a FilterSchema, defaults: RouteDefaults) -> Self {
        Self {
            filters: FilterCodec::new(schema),
            defaults,
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &'a FilterSchema {
        self.filters.schema()
    }

    #[must_use]
    pub const fn defaults(&self) -> RouteDefaults {
        self.defaults
    }

    #[must_use]
    pub const fn reducer(&self) -> FilterReducer<'a> {
        FilterReducer::new(self.filters.schema())
    }

    /// Decode a raw query record. Never fails.
    #[must_use]
    pub fn decode(&self, raw: &QueryRecord) -> RouteSearch {
        let defaults = self.defaults;
        let interval_in_days = parse_positive(raw, INTERVAL_KEY)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(defaults.interval_in_days);
        let page_size = parse_positive(raw, PAGE_SIZE_KEY).unwrap_or(defaults.page_size);
        let page_index = parse_positive(raw, PAGE_KEY).map_or(0, |page| page - 1);
        let tab = match raw.get(TAB_KEY) {
            Some(token) => PageTab::parse(token).unwrap_or_else(|| {
                debug!(key = TAB_KEY, value = %token, "unknown tab, using default");
                PageTab::default()
            }),
            None => PageTab::default(),
        };
        let direction = raw
            .get(SORT_DIRECTION_KEY)
            .map_or(SortDirection::Unsorted, |d| SortDirection::parse_lenient(d));
        let sort = SortState::new(raw.get(SORT_KEY).map(String::as_str), direction);
        let tree_search = raw.get(TREE_SEARCH_KEY).cloned().unwrap_or_default();

        let schema = self.filters.schema();
        let extra = raw
            .iter()
            .filter(|(key, _)| !is_reserved(key) && !schema.owns_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        RouteSearch {
            interval_in_days,
            tree_search,
            tab,
            sort,
            page_index,
            page_size,
            filters: self.filters.decode(raw),
            extra,
        }
    }

    /// Encode `search`, omitting every field equal to its default.
    #[must_use]
    pub fn encode(&self, search: &RouteSearch) -> QueryRecord {
        let schema = self.filters.schema();
        let mut out: QueryRecord = search
            .extra
            .iter()
            .filter(|(key, _)| !is_reserved(key) && !schema.owns_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        out.extend(self.filters.encode(&search.filters));

        if search.interval_in_days != self.defaults.interval_in_days {
            out.insert(INTERVAL_KEY.to_string(), search.interval_in_days.to_string());
        }
        if !search.tree_search.is_empty() {
            out.insert(TREE_SEARCH_KEY.to_string(), search.tree_search.clone());
        }
        if search.tab != PageTab::default() {
            out.insert(TAB_KEY.to_string(), search.tab.as_str().to_string());
        }
        if let Some(column) = search.sort.column() {
            out.insert(SORT_KEY.to_string(), column.to_string());
            out.insert(
                SORT_DIRECTION_KEY.to_string(),
                search.sort.direction().as_str().to_string(),
            );
        }
        if search.page_index > 0 {
            out.insert(PAGE_KEY.to_string(), (search.page_index + 1).to_string());
        }
        if search.page_size != self.defaults.page_size {
            out.insert(PAGE_SIZE_KEY.to_string(), search.page_size.to_string());
        }
        out
    }
}

fn parse_positive(raw: &QueryRecord, key: &str) -> Option<usize> {
    let value = raw.get(key)?;
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            debug!(key, value = %value, "ignoring non-positive route value");
            None
        }
    }
}
