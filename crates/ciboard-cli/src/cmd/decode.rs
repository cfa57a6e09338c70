//! `cib decode`: show how a query string is understood.

use super::query::QueryArgs;
use super::{RouteOutcome, Session, render_route};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use ciboard_core::codec::FilterCodec;
use ciboard_core::error::{ErrorCode, MalformedValue};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Also list the query fields that were dropped as malformed.
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Serialize)]
struct Rejected {
    code: &'static str,
    key: String,
    section: String,
    raw: String,
    reason: &'static str,
}

impl From<MalformedValue> for Rejected {
    fn from(bad: MalformedValue) -> Self {
        Self {
            code: ErrorCode::MalformedValue.code(),
            key: bad.key,
            section: bad.section,
            raw: bad.raw,
            reason: bad.reason,
        }
    }
}

#[derive(Debug, Serialize)]
struct DecodeReport {
    #[serde(flatten)]
    outcome: RouteOutcome,
    rejected: Vec<Rejected>,
}

pub fn run_decode(args: &DecodeArgs, session: &Session) -> Result<()> {
    let raw = args.query.record()?;
    let codec = session.codec();
    let outcome = RouteOutcome::new(&codec, codec.decode(&raw));
    if !args.report {
        return render_route(session.output, &outcome);
    }

    let (_, rejected) = FilterCodec::new(&session.schema).decode_report(&raw);
    let report = DecodeReport {
        outcome,
        rejected: rejected.into_iter().map(Rejected::from).collect(),
    };
    render_report(session.output, &report)
}

fn render_report(output: OutputMode, report: &DecodeReport) -> Result<()> {
    render_mode(
        output,
        report,
        |r, w| {
            writeln!(w, "{}", r.outcome.query)?;
            for bad in &r.rejected {
                writeln!(w, "rejected {}={} ({})", bad.key, bad.raw, bad.reason)?;
            }
            Ok(())
        },
        |r, w| {
            super::pretty_route(&r.outcome, w)?;
            if r.rejected.is_empty() {
                return Ok(());
            }
            writeln!(w)?;
            pretty_section(w, "Rejected fields")?;
            for bad in &r.rejected {
                pretty_kv(w, &bad.key, format!("'{}': {}", bad.raw, bad.reason))?;
            }
            Ok(())
        },
    )
}
