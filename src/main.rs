use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info, warn, LevelFilter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use md_translate::{
    load_document, render_to_console, split_into_blocks, write_document, AppConfig, ConsoleProgress,
    GeminiProvider, TranslationError, TranslationProvider, TranslationService,
};

/// CLI wrapper for the log level
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Translate a Markdown file with the Gemini API.
///
/// The document is split into blocks of at most ~4900 characters, each block is
/// translated independently with up to 3 attempts, and the results are joined back
/// in order. Blocks that cannot be translated keep their original text inside a
/// `[TRANSLATION ERROR - ...]` marker.
#[derive(Parser, Debug)]
#[command(name = "md-translate", version, about)]
struct CommandLineOptions {
    /// Input Markdown file (.md)
    #[arg(value_name = "INPUT", required_unless_present = "init_config")]
    input: Option<PathBuf>,

    /// Output file; the translation is printed to the console when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language for the translation (defaults to the configured language)
    #[arg(short, long)]
    lang: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Set logging level
    #[arg(long, value_enum, default_value = "info", env = "MD_TRANSLATE_LOG")]
    log_level: CliLogLevel,

    /// Write an example configuration file to the config path and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CommandLineOptions::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.into())
        .format_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    if cli.init_config {
        AppConfig::generate_example_config(&cli.config)?;
        info!("Example configuration written to {}", cli.config.display());
        return Ok(());
    }

    let input = cli.input.ok_or_else(|| anyhow!("INPUT is required"))?;

    let config = AppConfig::from_file(&cli.config).map_err(TranslationError::from)?;
    config.validate(&cli.config).map_err(TranslationError::from)?;

    let api_key = config
        .select_api_key(&mut rand::rng())
        .ok_or_else(|| anyhow!("no API key available in {}", cli.config.display()))?;
    info!("API key selected at random from {} configured", config.api_key_list().len());

    let provider = GeminiProvider::new(api_key, &config.gemini, config.classifier.clone())
        .context("failed to initialise the Gemini client")?;
    info!("Provider: {} (model {})", provider.name(), provider.model_name());

    info!("Loading {}", input.display());
    let document = load_document(&input)?;
    info!("Loaded {} characters", document.chars().count());

    let max_chunk_size = config.translation.max_chunk_size;
    let blocks = split_into_blocks(&document, max_chunk_size);
    if blocks.is_empty() {
        warn!("No translatable content found in {}", input.display());
        return Ok(());
    }
    info!("Split into {} blocks (max {} characters)", blocks.len(), max_chunk_size);

    let target_language = cli.lang.unwrap_or_else(|| config.translation.target_lang.clone());
    let service = TranslationService::new(Arc::new(provider), config.retry.clone())
        .with_reporter(Arc::new(ConsoleProgress::new()));

    let results = service.translate_all(&blocks, &target_language).await?;
    let degraded = results.iter().filter(|r| r.is_degraded()).count();
    if degraded > 0 {
        warn!("{} of {} blocks kept their original text", degraded, results.len());
    }

    match cli.output {
        Some(path) => match write_document(&path, &results) {
            Ok(()) => info!("Translation saved to {}", path.display()),
            // The translation itself succeeded; only persisting it failed.
            Err(e) => error!("{}", e),
        },
        None => {
            let stdout = std::io::stdout();
            render_to_console(&results, &mut stdout.lock()).context("failed to write to stdout")?;
        }
    }

    Ok(())
}
