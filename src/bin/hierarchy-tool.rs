use std::path::PathBuf;
use std::process::exit;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{to_string, to_string_pretty};

use catalogue_tools::{
    config::Config,
    errors::Result,
    file_format::{
        catalogue::load_catalogue,
        field_identifier::FieldIdentifier,
        view_state::{load_view_state, ViewState},
    },
    hierarchy::{
        phrase::Phrase,
        selection::{field_instances, selection_options},
    },
    logging::init_logging,
};

#[derive(Clone, Debug, PartialEq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON.
    Pretty,
    /// Un-pretty-printed JSON.
    Concise,
}

/// Build, search and inspect catalogue hierarchies from the command line.
#[derive(Debug, Parser)]
#[clap(name = "hierarchy-tool", version)]
struct ToolOpts {
    /// TOML config file layered over the built-in defaults.
    #[clap(long, value_parser, env = "HIERARCHY_CONFIG")]
    config: Option<PathBuf>,

    #[clap(long, short, value_enum, default_value = "concise")]
    output_format: OutputFormat,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// The whole catalogue with a fresh view-state.
    FullTree(RowsArg),
    /// The catalogue filtered by a search phrase.
    FilteredTree(SearchArgs),
    /// Check a single label against a phrase.
    Matches(MatchesArgs),
    /// Dropdown options for the leaves the view-state marks as selected.
    Options(SearchArgs),
    /// Fields (and their instances) named by the catalogue.
    FieldInstances(RowsArg),
    /// Warehouse column name for a `field-instance.part` identifier.
    Column(ColumnArgs),
}

#[derive(Debug, Args)]
struct RowsArg {
    /// Catalogue rows as a JSON array, or JSON lines if the name ends in
    /// `.jsonl`.
    #[clap(value_parser)]
    rows: PathBuf,
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[clap(flatten)]
    rows: RowsArg,

    /// Search phrase; empty (or the placeholder) matches everything.
    #[clap(long, short, value_parser, default_value = "")]
    phrase: String,

    /// JSON object of the previous view-state.
    #[clap(long, short, value_parser)]
    view_state: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct MatchesArgs {
    #[clap(value_parser)]
    phrase: String,

    #[clap(value_parser)]
    label: String,
}

#[derive(Debug, Args)]
struct ColumnArgs {
    #[clap(value_parser)]
    identifier: String,
}

#[derive(Serialize)]
struct ColumnOutput {
    identifier: String,
    column: String,
}

fn render<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Pretty => to_string_pretty(value)?,
        OutputFormat::Concise => to_string(value)?,
    })
}

fn run(opts: &ToolOpts) -> Result<String> {
    let config = Config::load(opts.config.as_deref())?;
    let engine = config.engine();
    let format = &opts.output_format;

    let previous_view_state = |args: &SearchArgs| -> Result<ViewState> {
        match &args.view_state {
            Some(path) => load_view_state(path),
            None => Ok(ViewState::new()),
        }
    };

    match &opts.cmd {
        Command::FullTree(args) => {
            let rows = load_catalogue(&args.rows)?;
            render(&engine.full_tree(&rows)?, format)
        }
        Command::FilteredTree(args) => {
            let rows = load_catalogue(&args.rows.rows)?;
            let previous = previous_view_state(args)?;
            render(&engine.filtered_tree(&rows, &args.phrase, &previous)?, format)
        }
        Command::Matches(args) => {
            let phrase = Phrase::with_placeholder(&args.phrase, engine.placeholder());
            render(&phrase.matches(&args.label), format)
        }
        Command::Options(args) => {
            let rows = load_catalogue(&args.rows.rows)?;
            let previous = previous_view_state(args)?;
            let view = engine.filtered_tree(&rows, &args.phrase, &previous)?;
            render(&selection_options(&view.tree), format)
        }
        Command::FieldInstances(args) => {
            let rows = load_catalogue(&args.rows)?;
            render(&field_instances(&rows), format)
        }
        Command::Column(args) => {
            let identifier = FieldIdentifier::parse(&args.identifier)?;
            render(
                &ColumnOutput {
                    identifier: identifier.to_string(),
                    column: identifier.db_column(),
                },
                format,
            )
        }
    }
}

fn main() {
    init_logging();
    let opts = ToolOpts::parse();

    match run(&opts) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("hierarchy-tool: {}", err);
            exit(1);
        }
    }
}
