use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use docent_core::usage::UsageTracker;
use docent_ingest::{BATCH_SIZE, IngestionPipeline, NoopObserver, SplitterConfig};
use docent_llm::mock::MockProvider;
use docent_llm::{Assistant, RateGate, ResponseCache};
use tempfile::TempDir;

fn write_docs_tree(root: &Path) {
    std::fs::create_dir_all(root.join("guide")).unwrap();
    std::fs::write(
        root.join("intro.md"),
        "---\ntitle: Introduction\ncategory: basics\ntags: [start, overview]\n---\n\n\
         # Introduction\n\nDocent ingests Markdown documentation and splits it into \
         chunks. Each chunk stays within the configured size and carries its source \
         metadata.\n",
    )
    .unwrap();
    std::fs::write(
        root.join("guide/setup.md"),
        "# Setup\n\nInstall the toolchain and point the config at your docs tree.\n\n\
         ## Verify\n\nThe validation report lists chunk counts and size buckets.\n",
    )
    .unwrap();
    std::fs::write(root.join("notes.txt"), "not markdown, ignored").unwrap();
}

fn fast_assistant(provider: MockProvider) -> Assistant<MockProvider> {
    Assistant::new(provider, "gpt-3.5-turbo").with_rate_gate(RateGate::new(Duration::ZERO))
}

#[tokio::test]
async fn ingestion_end_to_end_over_a_docs_tree() {
    let dir = TempDir::new().unwrap();
    write_docs_tree(dir.path());

    let pipeline = IngestionPipeline::new(dir.path(), SplitterConfig::default()).unwrap();
    let result = pipeline.run_ingestion(&NoopObserver).await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.documents_processed, 2);
    assert!(result.chunks_created >= 2);
    assert!(result.total_tokens > 0);

    let documents = pipeline.parser().parse_all().await.unwrap();
    let chunks = pipeline.process_documents_batch(&documents, BATCH_SIZE).await;
    assert_eq!(chunks.len(), result.chunks_created);

    assert!(chunks.iter().any(|c| c.document_path == "intro.md"));
    assert!(chunks.iter().any(|c| c.document_path == "guide/setup.md"));

    let intro = chunks
        .iter()
        .find(|c| c.document_path == "intro.md")
        .unwrap();
    assert_eq!(intro.chunk_id, "intro.md#chunk-0");
    assert_eq!(
        intro.metadata.get("title").map(String::as_str),
        Some("Introduction")
    );
    assert_eq!(
        intro.metadata.get("category").map(String::as_str),
        Some("basics")
    );
    assert_eq!(
        intro.metadata.get("tags").map(String::as_str),
        Some("start, overview")
    );

    let report = pipeline.validate_ingestion(&chunks);
    assert_eq!(report.total_chunks, chunks.len());
    assert_eq!(report.empty_chunks, 0);
    assert_eq!(report.oversized_chunks, 0);
}

#[tokio::test]
async fn ingestion_reports_missing_docs_root() {
    let pipeline =
        IngestionPipeline::new("/nonexistent/docs", SplitterConfig::default()).unwrap();
    let result = pipeline.run_ingestion(&NoopObserver).await;

    assert!(!result.success);
    assert_eq!(result.documents_processed, 0);
    assert!(result.errors[0].contains("Ingestion pipeline failed"));
}

#[tokio::test]
async fn assistant_caches_repeated_questions() {
    let provider = MockProvider::with_responses(vec!["First answer.".into()]);
    let assistant =
        fast_assistant(provider.clone()).with_cache(ResponseCache::new(Duration::from_secs(3600)));

    let first = assistant.ask("What is chunk overlap?", None).await.unwrap();
    let second = assistant
        .ask("  what is chunk overlap?  ", None)
        .await
        .unwrap();

    assert_eq!(first, "First answer.");
    assert_eq!(second, first);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn assistant_distinguishes_context_in_the_cache() {
    let provider = MockProvider::with_responses(vec!["A.".into(), "B.".into()]);
    let assistant =
        fast_assistant(provider.clone()).with_cache(ResponseCache::new(Duration::from_secs(3600)));

    let plain = assistant.ask("what does this mean?", None).await.unwrap();
    let grounded = assistant
        .ask("what does this mean?", Some("selected text"))
        .await
        .unwrap();

    assert_eq!(plain, "A.");
    assert_eq!(grounded, "B.");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn assistant_records_usage_through_the_tracker() {
    let dir = TempDir::new().unwrap();
    let tracker = Arc::new(UsageTracker::new(dir.path()).unwrap());

    let provider = MockProvider::default().with_usage(120, 40);
    let assistant = fast_assistant(provider).with_recorder(tracker.clone());

    assistant.ask("does usage flow through?", None).await.unwrap();

    let stats = tracker.stats();
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.total_input_tokens, 120);
    assert_eq!(stats.total_output_tokens, 40);

    let records = tracker.recent(10);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].query, "does usage flow through?");
    assert_eq!(records[0].model, "gpt-3.5-turbo");
}

#[tokio::test]
async fn ingested_chunk_feeds_the_assistant_as_context() {
    let dir = TempDir::new().unwrap();
    write_docs_tree(dir.path());

    let pipeline = IngestionPipeline::new(dir.path(), SplitterConfig::default()).unwrap();
    let documents = pipeline.parser().parse_all().await.unwrap();
    let chunks = pipeline.process_documents_batch(&documents, BATCH_SIZE).await;
    let chunk = chunks
        .iter()
        .find(|c| c.document_path == "intro.md")
        .unwrap();

    let provider = MockProvider::with_responses(vec!["Chunking keeps context intact.".into()]);
    let assistant = fast_assistant(provider);

    let answer = assistant
        .ask("What does docent do?", Some(&chunk.content))
        .await
        .unwrap();
    assert_eq!(answer, "Chunking keeps context intact.");
}
