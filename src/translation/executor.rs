/*!
 * Concurrent batch executor.
 *
 * Drives every planned batch through a bounded worker pool. Each worker
 * builds its prompt, calls the completion client under a per-attempt
 * timeout, and retries with a fixed backoff. A batch that exhausts its
 * retry budget is returned as `failed` with the original texts echoed so
 * the applier can wrap its members in untranslated sentinels; peers are
 * never cancelled. Progress advances exactly once per batch, success or
 * failure, and results are reassembled in batch-index order so document
 * mutation stays deterministic.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};

use crate::app_config::EngineConfig;
use crate::document::Document;
use crate::errors::ProviderError;
use crate::planner::Batch;
use crate::progress::ProgressStore;
use crate::providers::{Completion, CompletionClient};

use super::markers::{marked_paragraph_text, parse_marked_translation};
use super::prompts::{build_robust_prompt, build_standard_prompt};
use super::response::parse_batch_response;

/// Outcome of one batch, reconciled to the member count
#[derive(Clone, Debug)]
pub struct BatchResult {
    /// Index of the originating batch
    pub batch_id: usize,
    /// One translation payload per member (original text when failed)
    pub translations: Vec<String>,
    /// Robust path: recovered `{run index → text}` table per member
    pub run_tables: Vec<Option<Vec<(usize, String)>>>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    /// All retries exhausted; members must be wrapped, not translated
    pub failed: bool,
    /// Per-batch diagnostics, merged into the request log in batch order
    pub logs: Vec<String>,
}

/// Bounded-concurrency driver for a request's batches
pub struct BatchExecutor {
    client: Arc<dyn CompletionClient>,
    config: EngineConfig,
    progress: ProgressStore,
}

impl BatchExecutor {
    pub fn new(client: Arc<dyn CompletionClient>, config: EngineConfig, progress: ProgressStore) -> Self {
        Self {
            client,
            config,
            progress,
        }
    }

    /// Run all batches; the returned vector is in batch-index order
    pub async fn execute(
        &self,
        doc: &Document,
        batches: &[Batch],
        language: &str,
        model: &str,
        progress_id: Option<&str>,
    ) -> Vec<BatchResult> {
        if batches.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_batches));
        let total = batches.len();

        let mut results: Vec<BatchResult> = stream::iter(batches.iter())
            .map(|batch| {
                let semaphore = semaphore.clone();
                async move {
                    // Acquire fails only when the semaphore is closed,
                    // which never happens here
                    let _permit = semaphore.acquire().await;

                    let start = Instant::now();
                    let result = self.run_batch(doc, batch, total, language, model).await;
                    debug!(
                        "batch {}/{} finished in {:?} (failed: {})",
                        batch.id + 1,
                        total,
                        start.elapsed(),
                        result.failed
                    );

                    if let Some(id) = progress_id {
                        self.progress.advance(id);
                    }
                    result
                }
            })
            .buffer_unordered(self.config.max_concurrent_batches)
            .collect()
            .await;

        // Workers complete in any order; the applier needs filtered order
        results.sort_by_key(|r| r.batch_id);
        results
    }

    async fn run_batch(
        &self,
        doc: &Document,
        batch: &Batch,
        total: usize,
        language: &str,
        model: &str,
    ) -> BatchResult {
        let mut logs = Vec::new();
        let n = batch.members.len();
        let method = if batch.use_robust { "ROBUST" } else { "STANDARD" };
        logs.push(format!(
            "[BATCH {}/{}] Processing {} paragraphs, ~{} tokens ({})",
            batch.id + 1,
            total,
            n,
            batch.estimated_tokens,
            method
        ));

        let prompt = if batch.use_robust {
            let marked: Vec<(usize, String)> = batch
                .members
                .iter()
                .enumerate()
                .map(|(i, m)| (i + 1, marked_paragraph_text(&doc.paragraphs[m.index])))
                .collect();
            build_robust_prompt(&marked, language)
        } else {
            build_standard_prompt(&batch.members, language)
        };

        match self.call_with_retry(&prompt, model, &mut logs).await {
            Ok(completion) => {
                logs.push(format!(
                    "[TOKENS] Input: {}, Output: {}, Total: {}",
                    completion.input_tokens, completion.output_tokens, completion.total_tokens
                ));
                let translations = parse_batch_response(&completion.text, n, &mut logs);
                let run_tables = self.recover_run_tables(doc, batch, &translations, &mut logs);
                BatchResult {
                    batch_id: batch.id,
                    translations,
                    run_tables,
                    input_tokens: completion.input_tokens,
                    output_tokens: completion.output_tokens,
                    total_tokens: completion.total_tokens,
                    failed: false,
                    logs,
                }
            }
            Err(e) => {
                warn!("batch {} failed after all retries: {}", batch.id + 1, e);
                logs.push(format!(
                    "[FAILED] Batch {}: all retry attempts exhausted: {}",
                    batch.id + 1,
                    e
                ));
                BatchResult {
                    batch_id: batch.id,
                    translations: batch.members.iter().map(|m| m.text.clone()).collect(),
                    run_tables: vec![None; n],
                    input_tokens: 0,
                    output_tokens: 0,
                    total_tokens: 0,
                    failed: true,
                    logs,
                }
            }
        }
    }

    /// Robust path only: re-parse each payload for run markers
    fn recover_run_tables(
        &self,
        doc: &Document,
        batch: &Batch,
        translations: &[String],
        logs: &mut Vec<String>,
    ) -> Vec<Option<Vec<(usize, String)>>> {
        if !batch.use_robust {
            return vec![None; translations.len()];
        }
        batch
            .members
            .iter()
            .zip(translations.iter())
            .map(|(member, payload)| {
                let table = parse_marked_translation(payload);
                if table.is_empty() {
                    return None;
                }
                let original_runs = doc.paragraphs[member.index].runs.len();
                if table.len() != original_runs {
                    logs.push(format!(
                        "[WARNING] Paragraph {}: run count mismatch - original: {}, translated: {}",
                        member.index,
                        original_runs,
                        table.len()
                    ));
                }
                Some(table)
            })
            .collect()
    }

    /// One LLM call with the per-attempt timeout and fixed-backoff retries
    async fn call_with_retry(
        &self,
        prompt: &str,
        model: &str,
        logs: &mut Vec<String>,
    ) -> Result<Completion, ProviderError> {
        let attempts = self.config.max_retries.max(1);
        let mut last_error: Option<ProviderError> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                sleep(Duration::from_secs(self.config.retry_backoff_s)).await;
            }
            logs.push(format!("[BATCH API] Attempt {attempt}/{attempts} - Model: {model}"));

            let call = self.client.complete(prompt, model);
            match timeout(Duration::from_secs(self.config.per_attempt_timeout_s), call).await {
                Ok(Ok(completion)) => return Ok(completion),
                Ok(Err(e)) => {
                    logs.push(format!("[ERROR] Attempt {attempt} failed: {e}"));
                    if !e.is_retriable() {
                        return Err(e);
                    }
                    last_error = Some(e);
                }
                Err(_) => {
                    let e = ProviderError::Timeout(self.config.per_attempt_timeout_s);
                    logs.push(format!("[ERROR] Attempt {attempt} failed: {e}"));
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::ConnectionError("All retry attempts failed".to_string())))
    }
}
