//! ciboard-core library.
//!
//! Filter, sort and pagination state of the CI dashboard details pages, and
//! its query-string form.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for schema wiring errors ([`FilterError`]);
//!   `anyhow::Result` for config loading and view lookup.
//! - **Logging**: Use `tracing` macros (`warn!` for dropped query fields,
//!   `debug!` for fallbacks and discarded responses).
//! - **Values**: states, cursors and route records are plain values; every
//!   operation returns a new one.

pub mod codec;
pub mod config;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod pagination;
pub mod reducer;
pub mod route;
pub mod schema;
pub mod sort;
pub mod state;
pub mod summary;
pub mod views;

pub use codec::{FilterCodec, QueryRecord};
pub use diff::{AggregateSummary, CountPolicy, DiffEntry, DiffView, diff, diff_with_policy};
pub use error::{ErrorCode, FilterError, MalformedValue};
pub use pagination::PaginationCursor;
pub use reducer::FilterReducer;
pub use route::{Intent, PageTab, RouteCodec, RouteDefaults, RouteSearch};
pub use schema::{FilterSchema, ValueKind};
pub use sort::{SortDirection, SortState};
pub use state::{FilterState, Selection};
