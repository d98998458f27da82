use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod build;
mod commands;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: TandemCommand,
}

#[derive(Parser)]
struct BuildArgs {
    /// Directory containing your website in markdown
    source: PathBuf,

    /// Directory you want to put your website in
    destination: PathBuf,

    /// Output html from markdown
    #[arg(long, default_value = "false")]
    html: bool,

    /// Output gemtext from markdown
    #[arg(long, default_value = "false")]
    gmi: bool,

    /// The site author, used when a page has no author of its own
    #[arg(long)]
    author: Option<String>,

    /// Relative path under which rss.xml, atom.xml and feed.json are generated
    #[arg(long)]
    feed: Option<PathBuf>,

    /// The domain to use for page URLs in feeds
    #[arg(long)]
    domain: Option<String>,
}

#[derive(Parser)]
struct CleanArgs {
    /// The output directory to remove
    destination: PathBuf,

    /// Print what would be deleted without deleting anything
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum TandemCommand {
    /// Build the site in every requested format
    Build(BuildArgs),

    /// Remove a previously generated site
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        TandemCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        TandemCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
    }

    Ok(())
}
