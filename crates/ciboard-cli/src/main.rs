#![forbid(unsafe_code)]

mod cmd;
mod output;

use ciboard_core::config::{load_project_config, load_user_config};
use clap::{CommandFactory, Parser, Subcommand};
use cmd::Session;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cib: filter, sort and page CI dashboard query state",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output (shorthand for --format json).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Dashboard view whose filter sections apply.
    #[arg(long, global = true, default_value = "tree")]
    view: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Inspect",
        about = "Decode a query string",
        long_about = "Decode query pairs into filters, tab, sort and page, dropping malformed fields.",
        after_help = "EXAMPLES:\n    # Show the state behind a query\n    cib decode -q 'archs=arm64,x86&page=2'\n\n    # List the fields that were dropped\n    cib decode -q buildDurationMin=ten --report"
    )]
    Decode(cmd::decode::DecodeArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Filter-card counts for a query",
        long_about = "Merge global and current summaries into per-section counts with selection flags.",
        after_help = "EXAMPLES:\n    # Counts from a pre-aggregated summary\n    cib diff --global global.json --current current.json -q archs=arm64\n\n    # Read backend build summaries directly\n    cib diff --from build --global builds.json"
    )]
    Diff(cmd::diff::DiffArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Request key and time window of a query",
        after_help = "EXAMPLES:\n    # Key and window for a 14 day interval\n    cib request -q intervalInDays=14 --at 2024-05-01T00:00:00Z"
    )]
    Request(cmd::request::RequestArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Describe the filter sections of a view",
        after_help = "EXAMPLES:\n    # Sections of the hardware view\n    cib --view hardware schema\n\n    # Every known view\n    cib schema --list"
    )]
    Schema(cmd::schema::SchemaArgs),

    #[command(
        next_help_heading = "Filters",
        about = "Flip one value-key in a section",
        after_help = "EXAMPLES:\n    # Select arm64\n    cib toggle archs arm64\n\n    # Deselect it again\n    cib toggle archs arm64 -q archs=arm64"
    )]
    Toggle(cmd::filter::ToggleArgs),

    #[command(
        next_help_heading = "Filters",
        about = "Clear one section or every filter",
        after_help = "EXAMPLES:\n    cib clear archs -q 'archs=arm64&configs=defconfig'\n    cib clear --all -q 'archs=arm64&configs=defconfig'"
    )]
    Clear(cmd::filter::ClearArgs),

    #[command(
        next_help_heading = "Filters",
        about = "Replace the selection of a section",
        after_help = "EXAMPLES:\n    cib replace testStatus FAIL ERROR"
    )]
    Replace(cmd::filter::ReplaceArgs),

    #[command(
        next_help_heading = "Filters",
        about = "Set the bounds of a range section",
        after_help = "EXAMPLES:\n    cib range buildDuration --min 10 --max 600\n    cib range buildDuration -q buildDurationMin=10"
    )]
    Range(cmd::filter::RangeArgs),

    #[command(
        next_help_heading = "Filters",
        about = "Pick the value of a single-choice section",
        after_help = "EXAMPLES:\n    cib choose buildsTable failed"
    )]
    Choose(cmd::filter::ChooseArgs),

    #[command(
        next_help_heading = "Filters",
        about = "Pin or unpin one entry of a mapping section",
        after_help = "EXAMPLES:\n    # Show tree 0 at a given commit\n    cib --view hardware pin treeCommits 0 4d5e6f\n\n    # Unpin it\n    cib --view hardware pin treeCommits 0 -q treeCommits=0:4d5e6f"
    )]
    Pin(cmd::filter::PinArgs),

    #[command(
        next_help_heading = "Table",
        about = "Move between pages or change the page size",
        after_help = "EXAMPLES:\n    cib page --total 95 --next -q page=3\n    cib page --total 95 --size 25 -q page=4"
    )]
    Page(cmd::page::PageArgs),

    #[command(
        next_help_heading = "Table",
        about = "Click a column header",
        long_about = "Click a column header: a new column sorts ascending, the same column cycles asc, desc, unsorted.",
        after_help = "EXAMPLES:\n    cib sort duration\n    cib sort duration --tab tests -q sort=duration"
    )]
    Sort(cmd::sort::SortArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Show or edit configuration",
        after_help = "EXAMPLES:\n    cib config show\n    cib config set pagination.page_size 25\n    cib config set --scope user user.output json"
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    cib completions bash > ~/.local/share/bash-completion/completions/cib"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CIBOARD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "ciboard=debug,info"
        } else {
            "ciboard=info,warn"
        })
    });

    let format = env::var("CIBOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // Logs go to stderr so stdout stays parseable.
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let session = || -> anyhow::Result<Session> {
        Session::open(load_project_config(project_root)?, &cli.view, output)
    };

    match &cli.command {
        Commands::Decode(args) => cmd::decode::run_decode(args, &session()?),
        Commands::Diff(args) => cmd::diff::run_diff(args, &session()?),
        Commands::Request(args) => cmd::request::run_request(args, &session()?),
        Commands::Schema(args) => {
            let config = load_project_config(project_root)?;
            cmd::schema::run_schema(args, &config, &cli.view, output)
        }
        Commands::Toggle(args) => cmd::filter::run_toggle(args, &session()?),
        Commands::Clear(args) => cmd::filter::run_clear(args, &session()?),
        Commands::Replace(args) => cmd::filter::run_replace(args, &session()?),
        Commands::Range(args) => cmd::filter::run_range(args, &session()?),
        Commands::Choose(args) => cmd::filter::run_choose(args, &session()?),
        Commands::Pin(args) => cmd::filter::run_pin(args, &session()?),
        Commands::Page(args) => cmd::page::run_page(args, &session()?),
        Commands::Sort(args) => cmd::sort::run_sort(args, &session()?),
        Commands::Config(args) => cmd::config::run_config(args, project_root, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let user_output = load_user_config()
        .ok()
        .and_then(|user| user.output);
    let output = resolve_output_mode(cli.format, cli.json, user_output.as_deref());
    debug!(?output, view = %cli.view, "resolved output mode");

    if let Err(err) = run(&cli, output, &project_root) {
        render_error(output, &CliError::from(&err))?;
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn view_defaults_to_tree() {
        let cli = Cli::parse_from(["cib", "decode"]);
        assert_eq!(cli.view, "tree");
        assert!(matches!(cli.command, Commands::Decode(_)));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "cib", "toggle", "archs", "arm64", "--view", "hardware", "--format", "json",
        ]);
        assert_eq!(cli.view, "hardware");
        assert_eq!(cli.format, Some(OutputMode::Json));
    }

    #[test]
    fn json_flag_parsed() {
        let cli = Cli::parse_from(["cib", "--json", "schema", "--list"]);
        assert!(cli.json);
        assert!(cli.format.is_none());
    }

    #[test]
    fn verbose_flag_parsed() {
        let cli = Cli::parse_from(["cib", "-v", "decode"]);
        assert!(cli.verbose);
    }

    #[test]
    fn page_requires_total() {
        assert!(Cli::try_parse_from(["cib", "page", "--next"]).is_err());
    }
}
