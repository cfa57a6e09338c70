//! `cib schema`: the filter sections of a view.

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use ciboard_core::config::ProjectConfig;
use ciboard_core::schema::{FilterSchema, RANGE_MAX_SUFFIX, RANGE_MIN_SUFFIX, ValueKind};
use ciboard_core::views;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// List the available views instead of describing one.
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Serialize)]
struct ViewList {
    views: Vec<String>,
}

pub fn run_schema(
    args: &SchemaArgs,
    config: &ProjectConfig,
    view: &str,
    output: OutputMode,
) -> Result<()> {
    if args.list {
        let list = ViewList {
            views: views::available(config),
        };
        return render_mode(
            output,
            &list,
            |l, w| {
                for name in &l.views {
                    writeln!(w, "{name}")?;
                }
                Ok(())
            },
            |l, w| {
                pretty_section(w, "Views")?;
                for name in &l.views {
                    writeln!(w, "  {name}")?;
                }
                Ok(())
            },
        );
    }

    let schema = views::lookup(view, config)?;
    render_mode(
        output,
        &schema,
        |s, w| {
            for section in s.sections() {
                writeln!(
                    w,
                    "{}\t{}\t{}",
                    section.name,
                    section.kind.label(),
                    values_of(&section.name, &section.kind)
                )?;
            }
            Ok(())
        },
        pretty_schema,
    )
}

fn pretty_schema(schema: &FilterSchema, w: &mut dyn std::io::Write) -> std::io::Result<()> {
    pretty_section(w, &format!("View {} ({} sections)", schema.name(), schema.len()))?;
    for section in schema.sections() {
        pretty_kv(
            w,
            &section.name,
            format!("{:<12} {}", section.kind.label(), values_of(&section.name, &section.kind)),
        )?;
    }
    Ok(())
}

/// What a section accepts, as shown in listings.
fn values_of(name: &str, kind: &ValueKind) -> String {
    match kind {
        ValueKind::BooleanSet {
            domain: None,
            integer_keys: false,
        } => "any".to_string(),
        ValueKind::BooleanSet {
            domain: None,
            integer_keys: true,
        } => "any index".to_string(),
        ValueKind::BooleanSet {
            domain: Some(domain),
            ..
        } => domain.iter().cloned().collect::<Vec<_>>().join(","),
        ValueKind::Range => format!("{name}{RANGE_MIN_SUFFIX} {name}{RANGE_MAX_SUFFIX}"),
        ValueKind::SingleEnum { allowed, default } => {
            format!("{} (default {default})", allowed.join(","))
        }
        ValueKind::Text => "one value".to_string(),
        ValueKind::Mapping { integer_keys: true } => "index:value,...".to_string(),
        ValueKind::Mapping {
            integer_keys: false,
        } => "key:value,...".to_string(),
    }
}
