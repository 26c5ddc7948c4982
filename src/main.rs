use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use scriven::build::{build_site, check_site, Summary};
use scriven::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Derives post routes, index pages, series and RSS feeds for a markdown
/// blog.
#[derive(Parser)]
#[command(name = "scriven", version, about)]
struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site and write feeds, sitemap and route manifest.
    Build {
        /// The project directory, or any directory inside it.
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// The output directory. Defaults to `public` in the project
        /// directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run the whole pipeline without writing anything.
    Check {
        /// The project directory, or any directory inside it.
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build { project, output } => {
            let config = Config::from_directory(&project, output.as_deref())
                .context("loading configuration")?;
            let summary = build_site(&config).context("building site")?;
            report(&summary);
            for file in &summary.files {
                println!("  wrote {}", file.display());
            }
        }
        Command::Check { project } => {
            let config =
                Config::from_directory(&project, None).context("loading configuration")?;
            let summary = check_site(&config).context("checking site")?;
            report(&summary);
        }
    }
    Ok(())
}

fn report(summary: &Summary) {
    println!(
        "{} posts ({} published), {} index pages",
        summary.posts, summary.published, summary.pages
    );
    for (name, entries) in &summary.feeds {
        println!("  feed {}: {} entries", name, entries);
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
