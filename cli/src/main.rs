mod commands;
mod error;

use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{ArgAction, Command, CommandFactory, FromArgMatches, Parser};
use labctl_api::{ClientConfig, EchoTransport, TOKEN_ENV, Transport};
use labctl_core::{ReservedFlags, TransformRegistry};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::commands::Group;
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "labctl", version)]
#[command(about = "Command-line client for GitLab-style REST APIs")]
struct Cli {
    /// Configuration file (defaults to $LABCTL_CONFIG, then the user config directory).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log more: -v for info, -vv for debug. RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

/// Global arguments every leaf inherits; leaf flags may not reuse them.
static GLOBAL_FLAGS: LazyLock<ReservedFlags> = LazyLock::new(|| ReservedFlags::from_command(&Cli::command()));

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn run() -> Result<(), CliError> {
    let registry = TransformRegistry::global();
    let tree = commands::root(registry)?;

    let matches = app(&tree).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    init_logging(cli.verbose);

    if let Some(("schema", _)) = matches.subcommand() {
        return print_schema(&tree);
    }

    let Some((action, leaf)) = tree.find(&matches) else {
        return Err(CliError::Usage("no command given".to_string()));
    };
    let request = action.prepare(leaf, registry)?;

    let config = ClientConfig::resolve(cli.config.as_deref())?;
    if config.token.is_none() {
        warn!("No API token configured; set {TOKEN_ENV} or add `token` to the configuration file");
    }
    let response = EchoTransport::new(&config).send(&request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// The full command line: global flags, the command tree and `schema`.
fn app(tree: &Group) -> Command {
    Cli::command()
        .subcommands(tree.subcommands())
        .subcommand(Command::new("schema").about("Print the flags of every command as JSON"))
        .subcommand_required(true)
        .arg_required_else_help(true)
}

fn print_schema(tree: &Group) -> Result<(), CliError> {
    let raw = serde_json::to_string_pretty(&tree.descriptors())?;
    println!("{raw}");
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}
