//! `cib page`: move through a table of known size.

use super::Session;
use super::query::{QueryArgs, to_query_string};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use ciboard_core::codec::QueryRecord;
use ciboard_core::route::Intent;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct PageArgs {
    /// Number of rows the table currently holds.
    #[arg(long)]
    pub total: usize,

    /// Go to the next page.
    #[arg(long, conflicts_with = "prev")]
    pub next: bool,

    /// Go to the previous page.
    #[arg(long)]
    pub prev: bool,

    /// Change the page size, keeping the first visible row on screen.
    #[arg(long)]
    pub size: Option<usize>,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Debug, Serialize)]
struct PageReport {
    query: String,
    record: QueryRecord,
    page: usize,
    page_count: usize,
    page_size: usize,
    start_index: usize,
    end_index: usize,
    /// One-based first visible row, 0 for an empty table.
    first_row: usize,
    last_row: usize,
    total_items: usize,
    has_next: bool,
    has_previous: bool,
}

pub fn run_page(args: &PageArgs, session: &Session) -> Result<()> {
    let codec = session.codec();
    let reducer = codec.reducer();
    let mut search = codec.decode(&args.query.record()?).resize(args.total);

    if let Some(size) = args.size {
        search = search.apply(&reducer, &Intent::SetPageSize(size), args.total)?;
    }
    if args.next {
        search = search.apply(&reducer, &Intent::NextPage, args.total)?;
    }
    if args.prev {
        search = search.apply(&reducer, &Intent::PreviousPage, args.total)?;
    }

    let cursor = search.cursor(args.total);
    let (first_row, last_row, total_items) = cursor.display_range();
    let record = codec.encode(&search);
    let report = PageReport {
        query: to_query_string(&record),
        record,
        page: cursor.page_index() + 1,
        page_count: cursor.page_count(),
        page_size: cursor.page_size(),
        start_index: cursor.start_index(),
        end_index: cursor.end_index(),
        first_row,
        last_row,
        total_items,
        has_next: cursor.has_next(),
        has_previous: cursor.has_previous(),
    };
    render_page(session.output, &report)
}

fn render_page(output: OutputMode, report: &PageReport) -> Result<()> {
    render_mode(
        output,
        report,
        |r, w| writeln!(w, "{}", r.query),
        |r, w| {
            pretty_section(w, &format!("Page {} of {}", r.page, r.page_count))?;
            pretty_kv(
                w,
                "showing",
                format!("{}-{} of {}", r.first_row, r.last_row, r.total_items),
            )?;
            pretty_kv(w, "page size", r.page_size.to_string())?;
            pretty_kv(w, "query", &r.query)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: PageArgs,
    }

    #[test]
    fn page_args_require_total() {
        assert!(Wrapper::try_parse_from(["test", "--next"]).is_err());
        let w = Wrapper::parse_from(["test", "--total", "25", "--next", "-q", "page=2"]);
        assert_eq!(w.args.total, 25);
        assert!(w.args.next);
        assert!(!w.args.prev);
    }

    #[test]
    fn next_conflicts_with_prev() {
        assert!(Wrapper::try_parse_from(["test", "--total", "5", "--next", "--prev"]).is_err());
    }
}
