//! GeneLinker — literature search, AI question answering and mind maps for
//! molecular biology research.
//! Entry point for the `genelinker` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use genelinker_common::Persona;
use genelinker_config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// GeneLinker: research assistant for genes and papers
#[derive(Parser, Debug)]
#[command(name = "genelinker", version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: GENELINKER_CONFIG or ./genelinker.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Audience for AI answers: researcher or student
    #[arg(short, long, global = true)]
    persona: Option<Persona>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a research question
    Ask {
        /// Question text
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Summarize a gene and link it to literature
    Gene {
        /// Gene symbol, e.g. TP53
        gene_id: String,
    },
    /// Search scientific literature
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        /// Number of results
        #[arg(short, long)]
        limit: Option<usize>,
        /// Analyze the N-th result (1-based) and export a report
        #[arg(long, value_name = "N")]
        analyze: Option<usize>,
    },
    /// Analyze paper text or an uploaded PDF
    Analyze {
        /// Paper text (ignored with --pdf)
        text: Vec<String>,
        /// PDF file to extract text from
        #[arg(long, conflicts_with = "text")]
        pdf: Option<PathBuf>,
        /// Title used when none can be detected
        #[arg(long)]
        title: Option<String>,
        /// Report formats to write
        #[arg(long, value_enum)]
        export: Vec<ReportFormat>,
        /// Also export the mind map
        #[arg(long, value_enum)]
        mindmap: Option<ImageFormat>,
    },
    /// Render a mind map from an analysis JSON file
    Mindmap {
        /// AnalysisResult or exported report JSON (a sample analysis is used if omitted)
        #[arg(long)]
        from: Option<PathBuf>,
        /// Title of the sample analysis
        #[arg(long, default_value = "Research Analysis")]
        title: String,
        #[arg(long, value_enum, default_value_t = ImageFormat::Png)]
        format: ImageFormat,
        /// Zoom steps; negative zooms out
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        zoom: i32,
        /// Pan offset as DX,DY in canvas pixels
        #[arg(long, value_parser = parse_pan, allow_hyphen_values = true)]
        pan: Option<(f64, f64)>,
    },
    /// Search and download a result's PDF
    Download {
        #[arg(required = true)]
        query: Vec<String>,
        /// Which result to download (1-based)
        #[arg(short, long, default_value_t = 1)]
        index: usize,
    },
    /// Show or edit stored preferences
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum PrefsAction {
    /// Show current preferences
    Show,
    /// Store an API key used when the config has none
    SetKey { key: String },
    /// Store a model name that overrides the config
    SetModel { model: String },
    /// Remove the stored key and model
    Clear,
    /// Mark the guided tour as completed
    TourDone,
    /// Forget recent searches
    ClearHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    Pdf,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ImageFormat {
    Png,
    Svg,
}

fn parse_pan(s: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = s.split_once(',').ok_or_else(|| format!("expected DX,DY, got '{s}'"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("invalid offset '{v}': {e}"));
    Ok((parse(dx)?, parse(dy)?))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok());
            config.validate()?;
            config
        }
        None => Config::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "genelinker=info,warn",
        1 => "genelinker=debug,info",
        _ => "genelinker=trace,debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_ref())?;
    let mut prefs = genelinker_agent::PreferenceStore::open(config.workspace.preferences_path())?;
    prefs.apply_to(&mut config);
    if let Some(persona) = cli.persona {
        config.llm.persona = persona;
    }
    info!(
        model = %config.llm.model_name,
        persona = config.llm.persona.as_str(),
        llm_key = config.llm.credential.is_usable(),
        literature_key = config.literature.credential.is_usable(),
        "configuration loaded"
    );

    let ctx = commands::Context { config, json: cli.json };
    match cli.command {
        Commands::Ask { question } => commands::ask(&ctx, &question.join(" ")).await,
        Commands::Gene { gene_id } => commands::gene(&ctx, &gene_id).await,
        Commands::Search { query, limit, analyze } => {
            commands::search(&ctx, &mut prefs, &query.join(" "), limit, analyze).await
        }
        Commands::Analyze { text, pdf, title, export, mindmap } => {
            let input = match pdf {
                Some(path) => commands::AnalyzeInput::Pdf(path),
                None => commands::AnalyzeInput::Text(text.join(" ")),
            };
            commands::analyze(&ctx, input, title, &export, mindmap).await
        }
        Commands::Mindmap { from, title, format, zoom, pan } => {
            commands::mindmap(&ctx, from.as_deref(), &title, format, zoom, pan)
        }
        Commands::Download { query, index } => commands::download(&ctx, &query.join(" "), index).await,
        Commands::Prefs { action } => commands::prefs(&ctx, &mut prefs, action.unwrap_or(PrefsAction::Show)),
    }
}
