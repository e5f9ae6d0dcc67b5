mod auth;
mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "actpin",
    about = "Pin GitHub Actions usages to verified commit SHAs",
    version
)]
struct Cli {
    /// Project root (default: auto-detect from .github/ or .git/)
    #[arg(long, global = true, env = "ACTPIN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// GitHub REST API base URL (overrides api_url in .github/actpin.yaml)
    #[arg(long, global = true, env = "ACTPIN_API_URL")]
    api_url: Option<String>,

    /// API token (default: GH_TOKEN, GITHUB_TOKEN, then `gh auth token`)
    #[arg(long, global = true, env = "ACTPIN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log resolution steps and HTTP requests to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every usage is pinned to the commit its version comment names
    Verify,

    /// Pin every usage to the commit of its version comment
    Fix,

    /// Move usages to the latest release of their repository
    Upgrade {
        /// Repository to upgrade, as owner/repo
        #[arg(required_unless_present = "all")]
        repository: Option<String>,

        /// Upgrade every referenced repository
        #[arg(long, conflicts_with = "repository")]
        all: bool,

        /// Pin to this version instead of the latest release
        #[arg(long, conflicts_with = "all")]
        version: Option<String>,
    },

    /// Re-resolve existing version comments and move pins within them
    Update {
        /// Repository to update, as owner/repo
        #[arg(required_unless_present = "all")]
        repository: Option<String>,

        /// Update every referenced repository
        #[arg(long, conflicts_with = "repository")]
        all: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let opts = cmd::Options {
        root: &root,
        json: cli.json,
        api_url: cli.api_url.as_deref(),
        token: cli.token.as_deref(),
    };

    let result = match cli.command {
        Commands::Verify => cmd::verify::run(&opts),
        Commands::Fix => cmd::fix::run(&opts),
        Commands::Upgrade {
            repository,
            all,
            version,
        } => cmd::upgrade::run(&opts, repository.as_deref(), all, version.as_deref()),
        Commands::Update { repository, all } => {
            cmd::update::run(&opts, repository.as_deref(), all)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
