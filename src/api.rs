/*!
 * Wire types of the engine's external interface.
 *
 * These are the serde shapes a transport layer (HTTP handler, CLI JSON
 * mode) exchanges with callers; field names are camelCase on the wire.
 * Transport itself is out of scope here.
 */

use serde::{Deserialize, Serialize};

/// One translation request
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// Base64-encoded DOCX bytes
    pub file_data: String,
    /// Original file name, used only for diagnostics
    pub file_name: String,
    /// Target natural-language name, passed through to the model
    pub language: String,
    /// Opaque model identifier forwarded to the completion client
    pub model: String,
    /// Opaque API credential forwarded to the completion client
    pub api_key: String,
    /// Caller-chosen progress id for the status endpoint
    #[serde(default)]
    pub progress_id: Option<String>,
}

/// Per-request statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateStats {
    /// Number of translated paragraphs
    pub paragraph_count: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    /// Rough USD cost derived from the per-model rate table
    pub estimated_cost: f64,
    /// Plaintext preview of the translated document
    pub translated_text: String,
}

/// One translation response
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    /// Base64-encoded translated DOCX
    pub translated_document: String,
    /// Newline-joined diagnostic log of the run
    pub logs: Vec<String>,
    pub stats: TranslateStats,
}

/// Snapshot returned by the progress endpoint
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub completed_batches: usize,
    pub total_batches: usize,
    #[serde(default)]
    pub error: bool,
}
