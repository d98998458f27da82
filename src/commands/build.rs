use crate::{
    BuildArgs,
    build::{BuildOptions, Builder, FeedOptions, format::OutputFormat},
};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    // Formats are opt-in flags; no flag at all means "everything"
    let mut formats = Vec::new();
    if args.html {
        formats.push(OutputFormat::Html);
    }
    if args.gmi {
        formats.push(OutputFormat::Gemini);
    }
    if formats.is_empty() {
        formats = OutputFormat::ALL.to_vec();
    }

    let feed = match &args.feed {
        Some(feed_path) => {
            let author = args.author.clone().ok_or_else(|| {
                anyhow::anyhow!("you must provide --author when you generate a feed")
            })?;
            let domain = args.domain.clone().ok_or_else(|| {
                anyhow::anyhow!("you must provide --domain when you generate a feed")
            })?;
            Some(FeedOptions {
                path: feed_path.clone(),
                domain,
                author,
            })
        }
        None => None,
    };

    let options = BuildOptions {
        source: args.source.clone(),
        destination: args.destination.clone(),
        formats,
        author: args.author.clone(),
        feed,
    };

    let builder = Builder::new(options);
    let result = builder.build().await?;

    println!(
        "Built site to {} ({} documents, {} static files)",
        result.output_dir.display(),
        result.documents,
        result.static_files
    );

    Ok(())
}
