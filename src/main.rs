use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use docent_core::config::Config;
use docent_core::usage::UsageTracker;
use docent_ingest::{
    BATCH_SIZE, IngestionPipeline, IngestionProgress, ProgressObserver, SplitterConfig,
    ValidationReport,
};
use docent_llm::{Assistant, OpenAiProvider, RateGate, ResponseCache};

const USAGE: &str = "\
usage:
  docent ingest [--docs-path <path>]
  docent ask <question> [--context <text>]
  docent usage [--recent <n>]

options:
  --config <path>   config file (default: config/default.toml, or DOCENT_CONFIG)";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("DOCENT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = resolve_config_path(&args);
    let config = Config::load(&config_path)?;
    config.validate()?;
    tracing::info!(config = %config_path.display(), "configuration loaded");

    match positional_args(&args).as_slice() {
        ["ingest", ..] => run_ingest(&config, flag_value(&args, "--docs-path")).await,
        ["ask", rest @ ..] => {
            let question = rest
                .first()
                .copied()
                .context("usage: docent ask <question> [--context <text>]")?;
            run_ask(&config, question, flag_value(&args, "--context")).await
        }
        ["usage", ..] => {
            let limit = match flag_value(&args, "--recent") {
                Some(raw) => Some(raw.parse::<usize>().context("--recent expects a number")?),
                None => None,
            };
            run_usage(&config, limit)
        }
        [other, ..] => bail!("unknown command: {other}\n\n{USAGE}"),
        [] => bail!("{USAGE}"),
    }
}

async fn run_ingest(config: &Config, docs_path: Option<&str>) -> anyhow::Result<()> {
    let docs_path = docs_path.unwrap_or(&config.ingestion.docs_path);
    let splitter = SplitterConfig {
        chunk_size: config.ingestion.chunk_size,
        chunk_overlap: config.ingestion.chunk_overlap,
    };
    let pipeline = IngestionPipeline::new(docs_path, splitter)?;

    let result = pipeline.run_ingestion(&PrintProgress).await;
    if !result.success {
        for error in &result.errors {
            eprintln!("{error}");
        }
        bail!("ingestion failed");
    }
    println!(
        "ingested {} document(s) into {} chunk(s), {} tokens total",
        result.documents_processed, result.chunks_created, result.total_tokens
    );

    let documents = pipeline.parser().parse_all().await?;
    let chunks = pipeline.process_documents_batch(&documents, BATCH_SIZE).await;
    print_validation(&pipeline.validate_ingestion(&chunks));
    Ok(())
}

async fn run_ask(config: &Config, question: &str, context: Option<&str>) -> anyhow::Result<()> {
    let provider = OpenAiProvider::new(
        config.openai.api_key.clone(),
        config.openai.model.clone(),
        config.openai.base_url.clone(),
    );
    let tracker =
        UsageTracker::new(&config.usage.log_dir).context("failed to initialize usage tracker")?;

    let mut assistant = Assistant::new(provider, config.openai.model.clone())
        .with_rate_gate(RateGate::new(Duration::from_millis(
            config.rate_limit.min_interval_ms,
        )))
        .with_recorder(Arc::new(tracker));
    if config.cache.enabled {
        assistant =
            assistant.with_cache(ResponseCache::new(Duration::from_secs(config.cache.ttl_secs)));
    }

    let answer = assistant.ask(question, context).await?;
    println!("{answer}");
    Ok(())
}

fn run_usage(config: &Config, recent: Option<usize>) -> anyhow::Result<()> {
    let tracker =
        UsageTracker::new(&config.usage.log_dir).context("failed to initialize usage tracker")?;

    if let Some(limit) = recent {
        for record in tracker.recent(limit) {
            println!(
                "{}  {}  in:{} out:{}  ${:.6}  {}",
                record.timestamp,
                record.model,
                record.input_tokens,
                record.output_tokens,
                record.cost_usd,
                record.query
            );
        }
    } else {
        let stats = tracker.stats();
        println!("requests:      {}", stats.total_requests);
        println!("input tokens:  {}", stats.total_input_tokens);
        println!("output tokens: {}", stats.total_output_tokens);
        println!("total cost:    ${:.6}", stats.total_cost);
        println!("model:         {}", stats.model);
        if let Some(first) = &stats.first_request {
            println!("first request: {first}");
        }
        if let Some(last) = &stats.last_request {
            println!("last request:  {last}");
        }
    }
    Ok(())
}

fn print_validation(report: &ValidationReport) {
    println!(
        "validation: {} chunk(s), {} empty, {} oversized",
        report.total_chunks, report.empty_chunks, report.oversized_chunks
    );
    println!(
        "average chunk: {:.1} chars, {:.1} tokens",
        report.average_chunk_size, report.average_tokens
    );
    let mut buckets: Vec<_> = report.chunk_size_distribution.iter().collect();
    buckets.sort_unstable();
    for (bucket, count) in buckets {
        println!("  {bucket:>5}+ chars: {count}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}

struct PrintProgress;

impl ProgressObserver for PrintProgress {
    fn on_progress(&self, progress: &IngestionProgress) {
        println!(
            "[{}/{}] {}",
            progress.current_document, progress.total_documents, progress.status
        );
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments that are not flags or flag values. Every flag takes a value.
fn positional_args(args: &[String]) -> Vec<&str> {
    let mut positionals = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = true;
            continue;
        }
        positionals.push(arg.as_str());
    }
    positionals
}

/// Priority: CLI --config > `DOCENT_CONFIG` env > config/default.toml
fn resolve_config_path(args: &[String]) -> PathBuf {
    if let Some(path) = flag_value(args, "--config") {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("DOCENT_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}
