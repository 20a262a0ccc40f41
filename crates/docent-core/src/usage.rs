//! Persistent API usage and cost accounting.
//!
//! Two files under the log directory: `api_usage.json` holds the full record
//! array, `usage_stats.json` the cumulative totals. Write failures are logged
//! and absorbed so tracking never breaks the request path.

use std::path::PathBuf;

use docent_llm::{UsageEvent, UsageRecorder};
use serde::{Deserialize, Serialize};

/// Dollars per 1K tokens, input and output.
struct ModelPricing {
    input_per_1k: f64,
    output_per_1k: f64,
}

fn pricing_for(model: &str) -> ModelPricing {
    match model {
        "gpt-3.5-turbo" => ModelPricing {
            input_per_1k: 0.0015,
            output_per_1k: 0.002,
        },
        "gpt-4" => ModelPricing {
            input_per_1k: 0.03,
            output_per_1k: 0.06,
        },
        "gpt-4-turbo" => ModelPricing {
            input_per_1k: 0.01,
            output_per_1k: 0.03,
        },
        other => {
            tracing::warn!("unknown model {other}, using gpt-3.5-turbo pricing");
            ModelPricing {
                input_per_1k: 0.0015,
                output_per_1k: 0.002,
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn calculate_cost(input_tokens: usize, output_tokens: usize, model: &str) -> f64 {
    let pricing = pricing_for(model);
    (input_tokens as f64 / 1000.0) * pricing.input_per_1k
        + (output_tokens as f64 / 1000.0) * pricing.output_per_1k
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UsageRecord {
    pub timestamp: String,
    pub model: String,
    pub query: String,
    pub context_length: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
    pub cost_usd: f64,
    pub response_length: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UsageStats {
    pub total_requests: usize,
    pub total_input_tokens: usize,
    pub total_output_tokens: usize,
    pub total_cost: f64,
    pub model: String,
    pub first_request: Option<String>,
    pub last_request: Option<String>,
}

impl Default for UsageStats {
    fn default() -> Self {
        Self {
            total_requests: 0,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_cost: 0.0,
            model: "gpt-3.5-turbo".into(),
            first_request: None,
            last_request: None,
        }
    }
}

#[derive(Debug)]
pub struct UsageTracker {
    usage_file: PathBuf,
    stats_file: PathBuf,
}

impl UsageTracker {
    /// Creates the log directory and seeds the usage files when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or the seed files cannot be
    /// created.
    pub fn new(log_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let log_dir = log_dir.into();
        std::fs::create_dir_all(&log_dir)?;

        let tracker = Self {
            usage_file: log_dir.join("api_usage.json"),
            stats_file: log_dir.join("usage_stats.json"),
        };
        if !tracker.usage_file.exists() {
            let empty = serde_json::to_string_pretty(&Vec::<UsageRecord>::new())?;
            std::fs::write(&tracker.usage_file, empty)?;
        }
        if !tracker.stats_file.exists() {
            let seed = serde_json::to_string_pretty(&UsageStats::default())?;
            std::fs::write(&tracker.stats_file, seed)?;
        }
        Ok(tracker)
    }

    /// Logs one API call: appends a record and folds it into the cumulative
    /// stats. The stored query is truncated to 100 characters and the cost
    /// rounded to 6 decimals.
    pub fn record(
        &self,
        model: &str,
        query: &str,
        context_length: usize,
        input_tokens: usize,
        output_tokens: usize,
        response_length: usize,
    ) -> UsageRecord {
        let cost = calculate_cost(input_tokens, output_tokens, model);
        let record = UsageRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            model: model.to_owned(),
            query: query.chars().take(100).collect(),
            context_length,
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            cost_usd: (cost * 1_000_000.0).round() / 1_000_000.0,
            response_length,
        };

        if let Err(e) = self.append_record(&record) {
            tracing::error!("failed to log usage: {e}");
        }
        if let Err(e) = self.update_stats(&record, cost) {
            tracing::error!("failed to update usage statistics: {e}");
        }

        tracing::info!(
            model,
            total_tokens = record.total_tokens,
            cost_usd = record.cost_usd,
            "API call logged"
        );

        record
    }

    /// Cumulative totals, or defaults when the stats file is unreadable.
    #[must_use]
    pub fn stats(&self) -> UsageStats {
        match self.read_stats() {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!("failed to read usage statistics: {e}");
                UsageStats::default()
            }
        }
    }

    /// The last `limit` records, oldest first; empty when the usage file is
    /// unreadable.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<UsageRecord> {
        match self.read_records() {
            Ok(mut records) => {
                let skip = records.len().saturating_sub(limit);
                records.split_off(skip)
            }
            Err(e) => {
                tracing::error!("failed to read usage records: {e}");
                Vec::new()
            }
        }
    }

    fn append_record(&self, record: &UsageRecord) -> std::io::Result<()> {
        let mut records = self.read_records()?;
        records.push(record.clone());
        std::fs::write(&self.usage_file, serde_json::to_string_pretty(&records)?)?;
        Ok(())
    }

    fn update_stats(&self, record: &UsageRecord, cost: f64) -> std::io::Result<()> {
        let mut stats = self.read_stats()?;

        stats.total_requests += 1;
        stats.total_input_tokens += record.input_tokens;
        stats.total_output_tokens += record.output_tokens;
        stats.total_cost += cost;
        stats.model = record.model.clone();
        stats.last_request = Some(record.timestamp.clone());
        if stats.first_request.is_none() {
            stats.first_request = Some(record.timestamp.clone());
        }

        std::fs::write(&self.stats_file, serde_json::to_string_pretty(&stats)?)?;
        Ok(())
    }

    fn read_records(&self) -> std::io::Result<Vec<UsageRecord>> {
        let content = std::fs::read_to_string(&self.usage_file)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn read_stats(&self) -> std::io::Result<UsageStats> {
        let content = std::fs::read_to_string(&self.stats_file)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl UsageRecorder for UsageTracker {
    fn record(&self, event: &UsageEvent<'_>) {
        Self::record(
            self,
            event.model,
            event.query,
            event.context_length,
            event.input_tokens,
            event.output_tokens,
            event.response_length,
        );
    }
}
