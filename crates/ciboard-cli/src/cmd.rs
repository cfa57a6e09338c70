pub mod completions;
pub mod config;
pub mod decode;
pub mod diff;
pub mod filter;
pub mod page;
pub mod query;
pub mod request;
pub mod schema;
pub mod sort;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::{Context, Result};
use ciboard_core::codec::QueryRecord;
use ciboard_core::config::ProjectConfig;
use ciboard_core::route::{Intent, RouteCodec, RouteSearch};
use ciboard_core::schema::FilterSchema;
use ciboard_core::state::Selection;
use ciboard_core::views;
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

/// Resolved config and view schema shared by every route command.
pub struct Session {
    pub config: ProjectConfig,
    pub schema: FilterSchema,
    pub output: OutputMode,
}

impl Session {
    pub fn open(config: ProjectConfig, view: &str, output: OutputMode) -> Result<Self> {
        let schema = views::lookup(view, &config)?;
        debug!(view, sections = schema.len(), "opened view");
        Ok(Self {
            config,
            schema,
            output,
        })
    }

    pub fn codec(&self) -> RouteCodec<'_> {
        RouteCodec::new(&self.schema, self.config.route_defaults())
    }

    /// Decode `raw`, apply `intent` and print the resulting route.
    pub fn apply_and_render(
        &self,
        raw: &QueryRecord,
        intent: &Intent,
        total_items: usize,
    ) -> Result<()> {
        let codec = self.codec();
        let search = codec.decode(raw);
        let next = search
            .apply(&codec.reducer(), intent, total_items)
            .with_context(|| format!("applying {intent:?} to view '{}'", self.schema.name()))?;
        render_route(self.output, &RouteOutcome::new(&codec, next))
    }
}

/// A route state together with its encoded query.
#[derive(Debug, Serialize)]
pub struct RouteOutcome {
    pub view: String,
    pub query: String,
    pub record: QueryRecord,
    pub search: RouteSearch,
}

impl RouteOutcome {
    pub fn new(codec: &RouteCodec<'_>, search: RouteSearch) -> Self {
        let record = codec.encode(&search);
        Self {
            view: codec.schema().name().to_string(),
            query: query::to_query_string(&record),
            record,
            search,
        }
    }
}

pub fn render_route(output: OutputMode, outcome: &RouteOutcome) -> Result<()> {
    render_mode(
        output,
        outcome,
        |o, w| writeln!(w, "{}", o.query),
        pretty_route,
    )
}

fn pretty_route(outcome: &RouteOutcome, w: &mut dyn Write) -> io::Result<()> {
    let search = &outcome.search;
    pretty_section(w, &format!("View {}", outcome.view))?;
    pretty_kv(w, "query", &outcome.query)?;
    pretty_kv(w, "tab", search.tab.as_str())?;
    pretty_kv(w, "interval", format!("{} days", search.interval_in_days))?;
    if !search.tree_search.is_empty() {
        pretty_kv(w, "tree search", &search.tree_search)?;
    }
    if let Some(column) = search.sort.column() {
        pretty_kv(w, "sort", format!("{column} {}", search.sort.direction()))?;
    }
    pretty_kv(
        w,
        "page",
        format!("{} (size {})", search.page_index + 1, search.page_size),
    )?;
    writeln!(w)?;
    if search.filters.is_empty() {
        writeln!(w, "No active filters")?;
    } else {
        pretty_section(w, "Active filters")?;
        for (section, selection) in search.filters.sections() {
            pretty_kv(w, section, describe_selection(selection))?;
        }
    }
    if !search.extra.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Passed through")?;
        for (key, value) in &search.extra {
            pretty_kv(w, key, value)?;
        }
    }
    Ok(())
}

pub fn describe_selection(selection: &Selection) -> String {
    match selection {
        Selection::Keys(keys) => keys.iter().cloned().collect::<Vec<_>>().join(", "),
        Selection::Entries(entries) => entries
            .iter()
            .map(|(key, value)| format!("{key} -> {value}"))
            .collect::<Vec<_>>()
            .join(", "),
        Selection::Choice(value) => value.clone(),
        Selection::Range { min, max } => {
            let bound = |b: &Option<i64>| b.map_or_else(|| "*".to_string(), |v| v.to_string());
            format!("{} ..= {}", bound(min), bound(max))
        }
    }
}
