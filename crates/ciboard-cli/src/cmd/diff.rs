//! `cib diff`: filter-card counts for the current query.

use super::Session;
use super::query::QueryArgs;
use crate::output::{OutputMode, pretty_section, render_mode};
use anyhow::{Context, Result};
use ciboard_core::diff::{AggregateSummary, CountPolicy, DiffView, diff_with_policy};
use ciboard_core::summary::{BuildSummary, TestSummary};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Summary computed without filters (JSON file).
    #[arg(long, value_name = "FILE")]
    pub global: PathBuf,

    /// Summary computed with the current filters; defaults to --global.
    #[arg(long, value_name = "FILE")]
    pub current: Option<PathBuf>,

    /// Shape of the summary files.
    #[arg(long, value_enum, default_value = "aggregate")]
    pub from: SummaryKind,

    /// Override the count policy from config.
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Only show this section.
    #[arg(long)]
    pub section: Option<String>,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SummaryKind {
    /// `{section: {value: count}}`
    Aggregate,
    /// Backend build summary.
    Build,
    /// Backend boots summary.
    Boots,
    /// Backend tests summary.
    Tests,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum PolicyArg {
    SelfExcluding,
    AlwaysGlobal,
}

impl From<PolicyArg> for CountPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::SelfExcluding => Self::SelfExcluding,
            PolicyArg::AlwaysGlobal => Self::AlwaysGlobal,
        }
    }
}

#[derive(Debug, Serialize)]
struct DiffReport {
    view: String,
    policy: CountPolicy,
    sections: DiffView,
}

pub fn run_diff(args: &DiffArgs, session: &Session) -> Result<()> {
    let global = load_summary(&args.global, args.from)?;
    let current = match &args.current {
        Some(path) => load_summary(path, args.from)?,
        None => global.clone(),
    };
    let policy = args
        .policy
        .map_or(session.config.diff.policy, CountPolicy::from);

    let state = session.codec().decode(&args.query.record()?).filters;
    let mut sections = diff_with_policy(&global, &current, &state, policy);
    if let Some(only) = &args.section {
        session.schema.section_kind(only)?;
        sections.retain(|name, _| name == only);
    }

    let report = DiffReport {
        view: session.schema.name().to_string(),
        policy,
        sections,
    };
    render_diff(session.output, &report)
}

fn load_summary(path: &Path, kind: SummaryKind) -> Result<AggregateSummary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed = match kind {
        SummaryKind::Aggregate => AggregateSummary::from_json(&content),
        SummaryKind::Build => {
            serde_json::from_str::<BuildSummary>(&content).map(|s| s.to_aggregate())
        }
        SummaryKind::Boots => {
            serde_json::from_str::<TestSummary>(&content).map(|s| s.to_aggregate("bootStatus"))
        }
        SummaryKind::Tests => {
            serde_json::from_str::<TestSummary>(&content).map(|s| s.to_aggregate("testStatus"))
        }
    };
    parsed.with_context(|| format!("Failed to parse summary {}", path.display()))
}

fn render_diff(output: OutputMode, report: &DiffReport) -> Result<()> {
    render_mode(
        output,
        report,
        |r, w| {
            for (section, rows) in &r.sections {
                for (key, entry) in rows {
                    let mark = if entry.selected { "*" } else { "-" };
                    writeln!(w, "{section}\t{key}\t{}\t{mark}", entry.available)?;
                }
            }
            Ok(())
        },
        |r, w| {
            if r.sections.is_empty() {
                return writeln!(w, "No values to filter on");
            }
            for (section, rows) in &r.sections {
                pretty_section(w, section)?;
                for (key, entry) in rows {
                    let mark = if entry.selected { "[x]" } else { "[ ]" };
                    writeln!(w, "{mark} {key:<32} {:>8}", entry.available)?;
                }
                writeln!(w)?;
            }
            Ok(())
        },
    )
}
