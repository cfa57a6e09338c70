//! `cib request`: the data request a query would issue.

use super::Session;
use super::query::{QueryArgs, to_query_string};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use ciboard_core::fetch::RequestKey;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// End of the time window (RFC 3339); defaults to now.
    #[arg(long, value_name = "TIMESTAMP")]
    pub at: Option<DateTime<Utc>>,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Debug, Serialize)]
struct RequestReport {
    key: String,
    query: String,
    interval_in_days: u32,
    tab: String,
    from: String,
    to: String,
}

pub fn run_request(args: &RequestArgs, session: &Session) -> Result<()> {
    let codec = session.codec();
    let search = codec.decode(&args.query.record()?);
    let (from, to) = search.time_window(args.at.unwrap_or_else(Utc::now));
    let report = RequestReport {
        key: RequestKey::for_search(&codec, &search).to_hex(),
        query: to_query_string(&codec.encode(&search)),
        interval_in_days: search.interval_in_days,
        tab: search.tab.as_str().to_string(),
        from: from.to_rfc3339_opts(SecondsFormat::Secs, true),
        to: to.to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    render_request(session.output, &report)
}

fn render_request(output: OutputMode, report: &RequestReport) -> Result<()> {
    render_mode(
        output,
        report,
        |r, w| writeln!(w, "{} {} {}", r.key, r.from, r.to),
        |r, w| {
            pretty_section(w, "Request")?;
            pretty_kv(w, "key", &r.key)?;
            pretty_kv(w, "query", &r.query)?;
            pretty_kv(w, "tab", &r.tab)?;
            pretty_kv(w, "window", format!("{} .. {}", r.from, r.to))
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
        args: RequestArgs,
    }

    #[test]
    fn at_parses_rfc3339() {
        let w = Wrapper::parse_from([
            "test",
            "--at",
            "2024-05-01T12:00:00Z",
            "-q",
            "intervalInDays=3",
        ]);
        assert_eq!(
            w.args.at.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Some("2024-05-01T12:00:00Z".to_string())
        );
        assert!(Wrapper::try_parse_from(["test", "--at", "yesterday"]).is_err());
    }
}
