use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use ytranscript::{
    export_markdown_to_file, load_panel, render_markdown_export, CaptionSource, Config, LoadedConfig, OutputFormat,
    PanelId, PanelSection, PanelState, TranscriptFileSource, TranscriptSettings, YouTubeCaptionSource,
};

#[derive(Parser)]
#[command(name = "ytranscript")]
#[command(version, about = "YouTube transcripts as timestamped markdown or clickable blocks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of the default search paths
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct FetchArgs {
    /// Video URL or id
    url: String,

    #[command(flatten)]
    options: SourceArgs,
}

#[derive(Args)]
struct SourceArgs {
    /// Fragments per timestamp
    #[arg(short, long)]
    cadence: Option<String>,

    /// Caption language code
    #[arg(long)]
    lang: Option<String>,

    /// Country code
    #[arg(long)]
    country: Option<String>,

    /// Read the transcript from a saved JSON file instead of fetching it
    #[arg(long, value_name = "FILE")]
    transcript_file: Option<PathBuf>,
}

#[derive(Args)]
struct BlockOutputArgs {
    /// Only show blocks containing this text
    #[arg(short, long)]
    search: Option<String>,

    /// Print block views as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the transcript as markdown
    Markdown {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Insert into this markdown file instead of printing
        #[arg(long, value_name = "FILE")]
        insert: Option<PathBuf>,

        /// Cursor byte offset for --insert (defaults to end of file)
        #[arg(long, requires = "insert")]
        cursor: Option<usize>,
    },
    /// Show the transcript grouped into timestamped blocks
    Blocks {
        #[command(flatten)]
        fetch: FetchArgs,

        #[command(flatten)]
        output: BlockOutputArgs,
    },
    /// Print the whole transcript as one line of text
    CopyAll {
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Manage persisted transcript panels
    Panels {
        #[command(subcommand)]
        action: PanelAction,
    },
    /// Show or edit settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum PanelAction {
    /// Open a panel for a video and remember it
    Open { url: String },
    /// List open panels
    List,
    /// Show the blocks of an open panel
    Show {
        /// Panel id (`panel-3` or `3`)
        id: PanelId,

        #[command(flatten)]
        options: SourceArgs,

        #[command(flatten)]
        output: BlockOutputArgs,
    },
    /// Close a panel, leaving the others untouched
    Close { id: PanelId },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Change one setting (timestampMod, lang, country)
    Set { key: String, value: String },
    /// Write a default configuration file
    Init,
}

impl Commands {
    /// Whether the command writes the configuration file
    fn edits_config(&self) -> bool {
        matches!(
            self,
            Commands::Config {
                action: ConfigAction::Set { .. } | ConfigAction::Init
            } | Commands::Panels {
                action: PanelAction::Open { .. } | PanelAction::Close { .. }
            }
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loaded before the subscriber exists; reported once logging is up
    let loaded = match &cli.config {
        Some(path) if cli.command.edits_config() => LoadedConfig {
            config: Config::load_from_or_default(path)?,
            path: Some(path.clone()),
            skipped: Vec::new(),
        },
        Some(path) => LoadedConfig {
            config: Config::load_from(path)?,
            path: Some(path.clone()),
            skipped: Vec::new(),
        },
        None => Config::locate(&Config::search_paths()).unwrap_or_else(|e| {
            eprintln!("Failed to load config, using defaults: {}", e);
            LoadedConfig {
                config: Config::default(),
                path: None,
                skipped: Vec::new(),
            }
        }),
    };

    // Initialize logging
    let level = if cli.verbose { "debug" } else { loaded.config.output.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(format!("ytranscript={},warn", level))
        .with_writer(std::io::stderr)
        .init();

    for (path, error) in &loaded.skipped {
        warn!("Failed to parse config file {}: {}", path.display(), error);
    }
    match &loaded.path {
        Some(path) => info!("📄 Using configuration from: {}", path.display()),
        None => info!("📄 No config file found, using defaults and environment"),
    }

    let config_path = loaded.save_path();
    let mut config = loaded.config;

    match cli.command {
        Commands::Markdown { fetch, insert, cursor } => {
            let settings = effective_settings(&config.transcript, &fetch.options)?;
            let source = build_source(&config, &fetch.options)?;

            match insert {
                Some(path) => {
                    export_markdown_to_file(source.as_ref(), &settings, &fetch.url, &path, cursor)
                        .await
                        .map_err(|e| anyhow!(e.user_message()))?;
                }
                None => {
                    let export = render_markdown_export(source.as_ref(), &settings, &fetch.url)
                        .await
                        .map_err(|e| anyhow!(e.user_message()))?;
                    println!("{}", export.markdown);
                }
            }
        }
        Commands::Blocks { fetch, output } => {
            let settings = effective_settings(&config.transcript, &fetch.options)?;
            let source = build_source(&config, &fetch.options)?;
            let panel = load_panel(source.as_ref(), &settings, &fetch.url).await;
            print_panel(panel, &output, config.output.default_format)?;
        }
        Commands::CopyAll { fetch } => {
            let settings = effective_settings(&config.transcript, &fetch.options)?;
            let source = build_source(&config, &fetch.options)?;
            let panel = load_panel(source.as_ref(), &settings, &fetch.url).await;

            match panel.transcript {
                PanelSection::Ready(view) => println!("{}", view.copy_all_text()),
                PanelSection::Failed(message) => return Err(anyhow!(message)),
            }
        }
        Commands::Panels { action } => {
            let mut registry = config.panel_registry();
            match action {
                PanelAction::Open { url } => {
                    let id = registry.open(url.trim());
                    config.store_panels(&registry);
                    config.save(&config_path)?;
                    println!("{}", id);
                }
                PanelAction::List => {
                    for entry in registry.entries() {
                        println!("{}\t{}", entry.id, entry.url);
                    }
                }
                PanelAction::Show { id, options, output } => {
                    let url = registry
                        .url(id)
                        .ok_or_else(|| anyhow!("No open panel {}", id))?
                        .to_string();
                    let settings = effective_settings(&config.transcript, &options)?;
                    let source = build_source(&config, &options)?;
                    let panel = load_panel(source.as_ref(), &settings, &url).await;
                    print_panel(panel, &output, config.output.default_format)?;
                }
                PanelAction::Close { id } => {
                    if registry.close(id).is_none() {
                        return Err(anyhow!("No open panel {}", id));
                    }
                    config.store_panels(&registry);
                    config.save(&config_path)?;
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", config.summary());
                println!("\n{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Set { key, value } => {
                config.transcript.set(&key, &value)?;
                config.validate()?;
                config.save(&config_path)?;
            }
            ConfigAction::Init => {
                if config_path.exists() {
                    return Err(anyhow!("Config already exists: {}", config_path.display()));
                }
                Config::default().save(&config_path)?;
            }
        },
    }

    Ok(())
}

/// Print a loaded panel's title and blocks
fn print_panel(panel: PanelState, output: &BlockOutputArgs, default_format: OutputFormat) -> Result<()> {
    match &panel.title {
        PanelSection::Ready(title) => println!("# {}\n", title),
        PanelSection::Failed(message) => warn!("Title unavailable: {}", message),
    }

    let view = match panel.transcript {
        PanelSection::Ready(view) => view,
        PanelSection::Failed(message) => return Err(anyhow!(message)),
    };

    let hits = view.search(output.search.as_deref().unwrap_or_default());
    if output.json || default_format == OutputFormat::Json {
        let blocks: Vec<_> = hits.iter().map(|hit| hit.block).collect();
        println!("{}", serde_json::to_string_pretty(&blocks)?);
    } else {
        for hit in &hits {
            println!(
                "[{}]({}) {}\n",
                hit.block.timestamp_label,
                hit.block.jump_url,
                hit.highlighted("**", "**")
            );
        }
    }
    Ok(())
}

/// Settings from config with command-line overrides applied
fn effective_settings(base: &TranscriptSettings, options: &SourceArgs) -> Result<TranscriptSettings> {
    let mut settings = base.clone();

    if let Some(cadence) = &options.cadence {
        // Explicit non-positive values are rejected rather than defaulted
        if let Ok(value) = cadence.trim().parse::<i64>() {
            ytranscript::Cadence::new(value)?;
        }
        settings.set("timestampMod", cadence)?;
    }
    if let Some(lang) = &options.lang {
        settings.set("lang", lang)?;
    }
    if let Some(country) = &options.country {
        settings.set("country", country)?;
    }

    Ok(settings)
}

fn build_source(config: &Config, options: &SourceArgs) -> Result<Box<dyn CaptionSource>> {
    match &options.transcript_file {
        Some(path) => Ok(Box::new(TranscriptFileSource::new(path))),
        None => Ok(Box::new(YouTubeCaptionSource::new(&config.source)?)),
    }
}
