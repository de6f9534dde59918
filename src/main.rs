use anyhow::Result;
use clap::{Parser, Subcommand};
use kpop_shorts::{ClassifierKind, Config, DatasetProcessor, HttpPageSource, WikiFetcher};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kpop-shorts")]
#[command(author = "TigreRoll", version)]
#[command(about = "K-pop shorts dataset builder and challenge classifier")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to kpop-shorts.toml or config/kpop-shorts.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the dataset into challenge and non-challenge files
    Split {
        /// Classifier strategy: global, roster or keyword (v0, v1, v2)
        #[arg(long)]
        strategy: Option<ClassifierKind>,
        /// Keyword for the keyword strategy
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Add hashtags found in titles to each short
    Hashtags {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compare dataset groups with the group CSV
    Compare {
        #[arg(long)]
        dataset: Option<PathBuf>,
        #[arg(long)]
        groups: Option<PathBuf>,
    },
    /// Fetch shorts for every group with a channel id
    FetchShorts {
        #[arg(long)]
        groups: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve channel handles in the group CSV to channel ids
    ResolveChannels {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fetch Wikipedia intros for every group
    FetchWiki {
        #[arg(long)]
        groups: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Repair glued words in a stored intro file
    FixWiki {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Write the current configuration to a file
    InitConfig {
        #[arg(long, default_value = "kpop-shorts.toml")]
        output: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load().or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Ok(Config::default())
        }),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("kpop_shorts=debug,shorts_core=debug,warn")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("kpop_shorts=info,shorts_core=info,warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = load_config(cli.config.as_ref())?;

    if let Commands::Split { strategy, keyword } = &cli.command {
        if let Some(strategy) = strategy {
            config.classifier.strategy = *strategy;
        }
        if let Some(keyword) = keyword {
            config.classifier.keyword = keyword.clone();
        }
    }

    config.validate()?;
    info!("🔧 {}", config.summary());

    let processor = DatasetProcessor::new(config.clone());
    let paths = &config.paths;

    match cli.command {
        Commands::Split { .. } => {
            processor.split().await?;
        }
        Commands::Hashtags { input, output } => {
            let input = input.unwrap_or_else(|| paths.raw_dataset_path());
            let output = output.unwrap_or_else(|| paths.dataset_path());
            processor.merge_hashtags(&input, &output).await?;
        }
        Commands::Compare { dataset, groups } => {
            let dataset = dataset.unwrap_or_else(|| paths.raw_dataset_path());
            let groups = groups.unwrap_or_else(|| paths.groups_path());
            processor.compare(&dataset, &groups).await?;
        }
        Commands::FetchShorts { groups, output } => {
            let groups = groups.unwrap_or_else(|| paths.groups_path());
            let output = output.unwrap_or_else(|| paths.raw_dataset_path());
            processor.fetch_shorts(&groups, &output).await?;
        }
        Commands::ResolveChannels { input, output } => {
            let input = input.unwrap_or_else(|| paths.groups_path());
            let output = output.unwrap_or_else(|| input.clone());
            processor.resolve_channels(&input, &output).await?;
        }
        Commands::FetchWiki { groups, output_dir } => {
            let groups = groups.unwrap_or_else(|| paths.groups_path());
            let output_dir = output_dir.unwrap_or_else(|| paths.wiki_path());
            let source = HttpPageSource::new(config.wiki.timeout_seconds);
            let fetcher = WikiFetcher::new(source, &config.wiki.base_url);
            processor.fetch_wiki(&fetcher, &groups, &output_dir).await?;
        }
        Commands::FixWiki { input } => {
            let input = input.unwrap_or_else(|| paths.wiki_path().join(&config.wiki.info_file));
            processor.fix_wiki(&input).await?;
        }
        Commands::InitConfig { output } => {
            config.save(&output)?;
        }
    }

    Ok(())
}
