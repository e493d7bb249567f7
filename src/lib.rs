/*!
 * # doctran - DOCX manuscript translator
 *
 * A Rust library for translating Word manuscripts with LLM completion
 * services while preserving the document's structural and visual
 * formatting.
 *
 * ## Features
 *
 * - Lossless DOCX round-trip (only translated run text changes)
 * - Adaptive token-budget batching driven by content complexity
 * - Standard and format-marker ("robust") translation paths
 * - Bounded concurrent batch execution with retries and live progress
 * - Partial failure as a first-class outcome: failed batches are
 *   wrapped in searchable `<untranslated>` sentinels
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: engine configuration and cost table
 * - `document`: DOCX package, paragraph/run model, loader, serializer
 * - `filter`: paragraph eligibility rules
 * - `planner`: complexity scoring and batch assembly
 * - `translation`: prompts, response parsing, executor, applier, engine
 * - `providers`: completion service clients (Gemini, OpenRouter)
 * - `progress`: process-wide progress store for status readers
 * - `api`: request/response wire types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

pub mod api;
pub mod app_config;
pub mod document;
pub mod errors;
pub mod filter;
pub mod planner;
pub mod progress;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use api::{TranslateRequest, TranslateResponse};
pub use app_config::EngineConfig;
pub use progress::{ProgressRecord, ProgressStore};
pub use translation::TranslationEngine;
