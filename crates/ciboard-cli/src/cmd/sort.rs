//! `cib sort`: click a table header.

use super::Session;
use super::query::QueryArgs;
use anyhow::Result;
use ciboard_core::route::{Intent, PageTab};
use clap::Args;

#[derive(Args, Debug)]
pub struct SortArgs {
    /// Column whose header is clicked.
    pub column: String,

    /// Switch to this tab before sorting (builds, boots, tests).
    #[arg(long, value_parser = parse_tab)]
    pub tab: Option<PageTab>,

    #[command(flatten)]
    pub query: QueryArgs,
}

fn parse_tab(raw: &str) -> Result<PageTab, String> {
    PageTab::parse(raw).ok_or_else(|| format!("unknown tab '{raw}' (expected builds, boots or tests)"))
}

pub fn run_sort(args: &SortArgs, session: &Session) -> Result<()> {
    let mut raw = args.query.record()?;
    if let Some(tab) = args.tab {
        let codec = session.codec();
        let search = codec
            .decode(&raw)
            .apply(&codec.reducer(), &Intent::SelectTab(tab), 0)?;
        raw = codec.encode(&search);
    }
    let intent = Intent::SortBy {
        column: args.column.clone(),
    };
    session.apply_and_render(&raw, &intent, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: SortArgs,
    }

    #[test]
    fn sort_args_parse_tab() {
        let w = Wrapper::parse_from(["test", "duration", "--tab", "boots"]);
        assert_eq!(w.args.column, "duration");
        assert_eq!(w.args.tab, Some(PageTab::Boots));
        assert!(Wrapper::try_parse_from(["test", "duration", "--tab", "issues"]).is_err());
    }
}
