// ABOUTME: Main entry point for hatenapost CLI
// ABOUTME: Parses commands, sets up logging, and dispatches to handlers

use clap::{Args, Parser, Subcommand};
use hatenapost::publish::{self, EntryOverrides};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "hatenapost")]
#[command(about = "Post markdown entries to Hatena Blog", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: <config dir>/hatenapost/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post an entry file
    Post {
        /// Markdown file with YAML frontmatter
        file: PathBuf,
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Print the AtomPub request body without posting
    Render {
        /// Markdown file with YAML frontmatter
        file: PathBuf,
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Validate credentials and settings
    Check,
    /// Write a template config file
    Init,
}

#[derive(Args)]
struct OverrideArgs {
    /// Save as a draft regardless of frontmatter
    #[arg(long)]
    draft: bool,
    /// Extra category (repeatable)
    #[arg(short, long = "category")]
    categories: Vec<String>,
}

impl From<OverrideArgs> for EntryOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            draft: args.draft,
            categories: args.categories,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Post { file, overrides } => {
            let result = publish::cmd_post(&file, config, &overrides.into()).await?;
            if !result.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Render { file, overrides } => {
            publish::cmd_render(&file, config, &overrides.into())?;
            Ok(())
        }
        Commands::Check => {
            publish::cmd_check(config)?;
            Ok(())
        }
        Commands::Init => {
            publish::cmd_init(config)?;
            Ok(())
        }
    }
}
