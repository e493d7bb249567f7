use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use doctran::api::TranslateRequest;
use doctran::app_config::EngineConfig;
use doctran::progress::ProgressStore;
use doctran::translation::TranslationEngine;

/// A simple custom logger writing timestamped lines to stderr
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let tag = match record.level() {
                Level::Error => "ERROR",
                Level::Warn => "WARN ",
                Level::Info => "INFO ",
                Level::Debug => "DEBUG",
                Level::Trace => "TRACE",
            };
            eprintln!("{now} {tag} {}", record.args());
        }
    }

    fn flush(&self) {}
}

#[derive(Parser, Debug)]
#[command(name = "doctran")]
#[command(about = "DOCX manuscript translator (LLM batch translation with format preservation)", long_about = None)]
struct Args {
    /// Input .docx
    #[arg(value_name = "DOCX")]
    input: PathBuf,

    /// Output .docx (default: <input_stem>_translated.docx)
    #[arg(short, long, value_name = "DOCX")]
    output: Option<PathBuf>,

    /// Target language name, passed through to the model
    #[arg(short, long, default_value = "Spanish")]
    language: String,

    /// Model identifier forwarded to the provider
    #[arg(short, long, default_value = "gemini-2.0-flash")]
    model: String,

    /// Provider name (gemini or openrouter)
    #[arg(long)]
    provider: Option<String>,

    /// API key (default: DOCTRAN_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Engine config JSON path
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Write the run's diagnostic log to this file
    #[arg(long, value_name = "LOG")]
    log_file: Option<PathBuf>,

    /// Log verbosity (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    CustomLogger::init(level).context("install logger")?;

    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config: {}", path.display()))?;
            serde_json::from_str::<EngineConfig>(&text)
                .with_context(|| format!("parse config: {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(provider) = &args.provider {
        config.provider = provider.parse()?;
    }
    config.validate()?;

    let api_key = match args.api_key.clone() {
        Some(key) => key,
        None => std::env::var("DOCTRAN_API_KEY")
            .context("no --api-key given and DOCTRAN_API_KEY is not set")?,
    };

    let output = args.output.clone().unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output")
            .to_string();
        args.input.with_file_name(format!("{stem}_translated.docx"))
    });

    let file_bytes = std::fs::read(&args.input)
        .with_context(|| format!("read input docx: {}", args.input.display()))?;
    let file_name = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("input.docx")
        .to_string();

    let progress_store = ProgressStore::new();
    let engine = TranslationEngine::new(config, progress_store.clone());

    let progress_id = "cli".to_string();
    let request = TranslateRequest {
        file_data: B64.encode(&file_bytes),
        file_name,
        language: args.language.clone(),
        model: args.model.clone(),
        api_key,
        progress_id: Some(progress_id.clone()),
    };

    info!(
        "translating {} into {} with {}",
        args.input.display(),
        args.language,
        args.model
    );

    let poller = tokio::spawn(poll_progress(progress_store.clone(), progress_id.clone()));
    let result = engine.translate(&request).await;
    poller.abort();

    let response = result.map_err(|e| anyhow::anyhow!("translation failed: {e}"))?;

    let translated = B64
        .decode(&response.translated_document)
        .context("decode translated document")?;
    std::fs::write(&output, &translated)
        .with_context(|| format!("write output docx: {}", output.display()))?;

    if let Some(log_path) = &args.log_file {
        std::fs::write(log_path, response.logs.join("\n"))
            .with_context(|| format!("write log file: {}", log_path.display()))?;
    }

    let stats = &response.stats;
    info!(
        "done: {} paragraphs, {} tokens (~${:.4}), output: {}",
        stats.paragraph_count,
        stats.total_tokens,
        stats.estimated_cost,
        output.display()
    );
    Ok(())
}

/// Feed an indicatif bar from the shared progress store until aborted
async fn poll_progress(store: ProgressStore, id: String) {
    let mut bar: Option<ProgressBar> = None;
    loop {
        if let Some(record) = store.snapshot(&id) {
            let bar = bar.get_or_insert_with(|| {
                let b = ProgressBar::new(record.total_batches as u64);
                b.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                b
            });
            bar.set_position(record.completed_batches as u64);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}
