use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DOCENT_OPENAI_API_KEY") {
            self.openai.api_key = v;
        }
        if let Ok(v) = std::env::var("DOCENT_MODEL") {
            self.openai.model = v;
        }
        if let Ok(v) = std::env::var("DOCENT_DOCS_PATH") {
            self.ingestion.docs_path = v;
        }
        if let Ok(v) = std::env::var("DOCENT_CHUNK_SIZE")
            && let Ok(size) = v.parse::<usize>()
        {
            self.ingestion.chunk_size = size;
        }
        if let Ok(v) = std::env::var("DOCENT_CHUNK_OVERLAP")
            && let Ok(overlap) = v.parse::<usize>()
        {
            self.ingestion.chunk_overlap = overlap;
        }
        if let Ok(v) = std::env::var("DOCENT_CACHE_TTL_SECS")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.cache.ttl_secs = secs;
        }
        if let Ok(v) = std::env::var("DOCENT_RATE_LIMIT_MS")
            && let Ok(ms) = v.parse::<u64>()
        {
            self.rate_limit.min_interval_ms = ms;
        }
        if let Ok(v) = std::env::var("DOCENT_USAGE_LOG_DIR") {
            self.usage.log_dir = v;
        }
    }
}
