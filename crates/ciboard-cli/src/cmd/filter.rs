//! Filter intents: `cib toggle`, `cib clear`, `cib replace`, `cib range`,
//! `cib choose` and `cib pin`.
//!
//! Each command decodes the current query, applies one intent and prints the
//! resulting query. Any filter change sends the table back to page 1.

use super::Session;
use super::query::QueryArgs;
use anyhow::{Result, bail};
use ciboard_core::route::Intent;
use clap::Args;

#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Filter section (e.g. archs, testStatus).
    pub section: String,
    /// Value-key to flip.
    pub key: String,
    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Section to clear. Omit together with --all to clear everything.
    pub section: Option<String>,
    /// Clear every filter section.
    #[arg(long, conflicts_with = "section")]
    pub all: bool,
    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug)]
pub struct ReplaceArgs {
    pub section: String,
    /// New value-keys; none clears the section.
    pub keys: Vec<String>,
    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug)]
pub struct RangeArgs {
    pub section: String,
    /// Lower bound; omit for open.
    #[arg(long, allow_hyphen_values = true)]
    pub min: Option<i64>,
    /// Upper bound; omit for open.
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<i64>,
    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug)]
pub struct ChooseArgs {
    pub section: String,
    /// Value to choose; the section default clears it.
    pub value: String,
    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug)]
pub struct PinArgs {
    /// Mapping section (e.g. treeCommits).
    pub section: String,
    /// Entry key, such as a tree index.
    pub key: String,
    /// Value to pin; omit to unpin the key.
    pub value: Option<String>,
    #[command(flatten)]
    pub query: QueryArgs,
}

pub fn run_toggle(args: &ToggleArgs, session: &Session) -> Result<()> {
    let intent = Intent::Toggle {
        section: args.section.clone(),
        key: args.key.clone(),
    };
    session.apply_and_render(&args.query.record()?, &intent, 0)
}

pub fn run_clear(args: &ClearArgs, session: &Session) -> Result<()> {
    let intent = match (&args.section, args.all) {
        (Some(section), false) => Intent::ClearSection {
            section: section.clone(),
        },
        (None, true) => Intent::ClearAll,
        _ => bail!("pass a section name or --all"),
    };
    session.apply_and_render(&args.query.record()?, &intent, 0)
}

pub fn run_replace(args: &ReplaceArgs, session: &Session) -> Result<()> {
    let intent = Intent::Replace {
        section: args.section.clone(),
        keys: args.keys.clone(),
    };
    session.apply_and_render(&args.query.record()?, &intent, 0)
}

pub fn run_range(args: &RangeArgs, session: &Session) -> Result<()> {
    let intent = Intent::SetRange {
        section: args.section.clone(),
        min: args.min,
        max: args.max,
    };
    session.apply_and_render(&args.query.record()?, &intent, 0)
}

pub fn run_choose(args: &ChooseArgs, session: &Session) -> Result<()> {
    let intent = Intent::Choose {
        section: args.section.clone(),
        value: args.value.clone(),
    };
    session.apply_and_render(&args.query.record()?, &intent, 0)
}

pub fn run_pin(args: &PinArgs, session: &Session) -> Result<()> {
    let intent = Intent::SetEntry {
        section: args.section.clone(),
        key: args.key.clone(),
        value: args.value.clone(),
    };
    session.apply_and_render(&args.query.record()?, &intent, 0)
}
