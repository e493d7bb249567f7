/*!
 * Translation pipeline for DOCX manuscripts.
 *
 * Split into several submodules:
 *
 * - `engine`: request orchestration and usage accounting
 * - `executor`: bounded-concurrency batch driver with retries
 * - `prompts`: standard and robust prompt construction
 * - `response`: delimiter-protocol response parsing and sanitizing
 * - `markers`: run marker protocol for format preservation
 * - `applier`: writing results back into the paragraph tree
 */

pub mod applier;
pub mod engine;
pub mod executor;
pub mod markers;
pub mod prompts;
pub mod response;

pub use engine::{TranslationEngine, UsageTotals};
pub use executor::{BatchExecutor, BatchResult};
