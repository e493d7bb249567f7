/*!
 * Request-scoped translation pipeline.
 *
 * `TranslationEngine` wires the phases together: decode and load the
 * document, filter, plan, execute the batches concurrently, apply the
 * results in order, serialize. All state except the shared progress
 * store lives and dies with the request; no temporary files are ever
 * written. Only validation and loader failures abort a request; batch
 * failures surface as untranslated sentinels inside an otherwise valid
 * output document.
 */

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use log::{error, info};

use crate::api::{TranslateRequest, TranslateResponse, TranslateStats};
use crate::app_config::{estimate_cost, CompletionProvider, EngineConfig};
use crate::document::{load_document, serialize_document};
use crate::errors::TranslateError;
use crate::filter::filter_document;
use crate::planner::plan_batches;
use crate::progress::ProgressStore;
use crate::providers::gemini::Gemini;
use crate::providers::openrouter::OpenRouter;
use crate::providers::CompletionClient;

use super::applier::apply_results;
use super::executor::{BatchExecutor, BatchResult};

/// Cumulative token counters for one request
#[derive(Clone, Copy, Debug, Default)]
pub struct UsageTotals {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl UsageTotals {
    /// Fold one batch's counters into the request totals
    pub fn add(&mut self, result: &BatchResult) {
        self.input += result.input_tokens;
        self.output += result.output_tokens;
        self.total += result.total_tokens;
    }
}

/// The translation engine for one deployment
pub struct TranslationEngine {
    config: EngineConfig,
    progress: ProgressStore,
    /// Fixed client for tests; production resolves one per request
    client_override: Option<Arc<dyn CompletionClient>>,
}

impl TranslationEngine {
    /// Engine that builds a provider client per request from the config
    pub fn new(config: EngineConfig, progress: ProgressStore) -> Self {
        Self {
            config,
            progress,
            client_override: None,
        }
    }

    /// Engine with an injected completion client (mock-friendly)
    pub fn with_client(
        config: EngineConfig,
        progress: ProgressStore,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            config,
            progress,
            client_override: Some(client),
        }
    }

    /// Shared progress store, for status readers
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Translate one DOCX request end to end
    pub async fn translate(
        &self,
        request: &TranslateRequest,
    ) -> Result<TranslateResponse, TranslateError> {
        validate_request(request)?;
        let progress_id = request.progress_id.as_deref();
        self.progress.sweep(crate::progress::DEFAULT_LINGER);

        let file_bytes = B64
            .decode(&request.file_data)
            .map_err(|e| TranslateError::Validation(format!("fileData is not valid base64: {e}")))?;

        let mut logs: Vec<String> = Vec::new();
        logs.push(format!(
            "[START] Batch translation started for language: {}",
            request.language
        ));
        logs.push(format!("[INFO] Source file: {}", request.file_name));
        logs.push(format!("[INFO] Using model: {}", request.model));
        logs.push("[INFO] Processing in memory - no files saved to disk".to_string());

        let mut doc = load_document(&file_bytes)?;
        logs.push(format!(
            "[INFO] Document has {} total paragraphs",
            doc.paragraph_count()
        ));

        let filtered = filter_document(&mut doc);
        logs.push(format!(
            "[FILTER] {} paragraphs eligible for translation",
            filtered.len()
        ));

        let batches = plan_batches(&doc, &filtered, &self.config);
        let robust_count = batches.iter().filter(|b| b.use_robust).count();
        logs.push(format!(
            "[PLANNER] Created {} adaptive batches ({} robust)",
            batches.len(),
            robust_count
        ));

        if let Some(id) = progress_id {
            self.progress.begin(id, batches.len());
        }

        let client = self.resolve_client(&request.api_key);
        let executor = BatchExecutor::new(client, self.config.clone(), self.progress.clone());
        let results = executor
            .execute(&doc, &batches, &request.language, &request.model, progress_id)
            .await;

        let mut usage = UsageTotals::default();
        let mut failed_batches = 0usize;
        for result in &results {
            logs.extend(result.logs.iter().cloned());
            usage.add(result);
            if result.failed {
                failed_batches += 1;
            }
        }

        let preview_parts = apply_results(&mut doc, &batches, &results, &mut logs);

        if failed_batches > 0 {
            logs.push(format!(
                "[WARNING] {failed_batches} batch(es) failed and were wrapped with untranslated sentinels"
            ));
            logs.push(
                "[INFO] Search for '<untranslated>' in the output document to find failed sections"
                    .to_string(),
            );
        }

        let output_bytes = match serialize_document(&doc) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("serialization failed: {e}");
                if let Some(id) = progress_id {
                    self.progress.set_error(id);
                }
                return Err(TranslateError::Serialization(e.to_string()));
            }
        };

        if let Some(id) = progress_id {
            self.progress.finish(id);
        }

        logs.push(format!(
            "[TOKENS] Final usage - Input: {}, Output: {}, Total: {}",
            usage.input, usage.output, usage.total
        ));
        logs.push("[DONE] Translation complete!".to_string());
        info!(
            "request '{}' done: {} paragraphs, {} batches, {} failed",
            request.file_name,
            preview_parts.len(),
            batches.len(),
            failed_batches
        );

        Ok(TranslateResponse {
            translated_document: B64.encode(&output_bytes),
            stats: TranslateStats {
                paragraph_count: preview_parts.len(),
                input_tokens: usage.input,
                output_tokens: usage.output,
                total_tokens: usage.total,
                estimated_cost: estimate_cost(&request.model, usage.input, usage.output),
                translated_text: preview_parts.join("\n\n"),
            },
            logs,
        })
    }

    fn resolve_client(&self, api_key: &str) -> Arc<dyn CompletionClient> {
        if let Some(client) = &self.client_override {
            return client.clone();
        }
        match self.config.provider {
            CompletionProvider::Gemini => {
                Arc::new(Gemini::new(api_key, self.config.endpoint.clone()))
            }
            CompletionProvider::OpenRouter => {
                Arc::new(OpenRouter::new(api_key, self.config.endpoint.clone()))
            }
        }
    }
}

fn validate_request(request: &TranslateRequest) -> Result<(), TranslateError> {
    if request.file_data.is_empty() {
        return Err(TranslateError::Validation("fileData is required".to_string()));
    }
    if request.language.trim().is_empty() {
        return Err(TranslateError::Validation("language is required".to_string()));
    }
    if request.model.trim().is_empty() {
        return Err(TranslateError::Validation("model is required".to_string()));
    }
    Ok(())
}
