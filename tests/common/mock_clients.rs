/*!
 * Mock completion clients for testing.
 *
 * Behaviors cover the interesting provider shapes:
 * - `echo()` - returns every passage unchanged, correctly framed
 * - `translate(..)` - echo with substring substitutions applied
 * - `failing()` - always errors (retriable)
 * - `fail_when_contains(..)` - errors only for prompts carrying a marker text
 * - `raw(..)` - returns a fixed raw body (for malformed-response tests)
 * - `skip_frame(..)` - echo, but one passage's frames are omitted
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use doctran::errors::ProviderError;
use doctran::providers::{Completion, CompletionClient};

/// Behavior mode for the mock client
pub enum MockBehavior {
    /// Echo every passage back, correctly framed
    Echo,
    /// Echo with `(from, to)` substitutions, simulating translation
    Translate(Vec<(String, String)>),
    /// Always fail with a retriable API error
    Failing,
    /// Fail only when the prompt contains the given text
    FailWhenContains(String),
    /// Return a fixed raw body regardless of the prompt
    Raw(String),
    /// Echo, but omit the frames of the given passage id
    SkipFrame(usize),
}

/// Mock completion client recording its calls
pub struct MockClient {
    behavior: MockBehavior,
    calls: AtomicUsize,
    /// Last prompt seen, for protocol assertions
    pub last_prompt: Mutex<Option<String>>,
}

impl MockClient {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn translate(substitutions: &[(&str, &str)]) -> Self {
        Self::new(MockBehavior::Translate(
            substitutions
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        ))
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fail_when_contains(marker: &str) -> Self {
        Self::new(MockBehavior::FailWhenContains(marker.to_string()))
    }

    pub fn raw(body: &str) -> Self {
        Self::new(MockBehavior::Raw(body.to_string()))
    }

    pub fn skip_frame(id: usize) -> Self {
        Self::new(MockBehavior::SkipFrame(id))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    async fn complete(&self, prompt: &str, _model: &str) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        let passages = extract_passages(prompt);
        let text = match &self.behavior {
            MockBehavior::Failing => {
                return Err(ProviderError::ApiError {
                    status_code: 503,
                    message: "mock outage".to_string(),
                });
            }
            MockBehavior::FailWhenContains(marker) => {
                if prompt.contains(marker) {
                    return Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("mock outage for '{marker}'"),
                    });
                }
                frame_passages(&passages, |p| p.to_string(), None)
            }
            MockBehavior::Echo => frame_passages(&passages, |p| p.to_string(), None),
            MockBehavior::Translate(substitutions) => frame_passages(
                &passages,
                |p| {
                    let mut out = p.to_string();
                    for (from, to) in substitutions {
                        out = out.replace(from, to);
                    }
                    out
                },
                None,
            ),
            MockBehavior::Raw(body) => body.clone(),
            MockBehavior::SkipFrame(id) => frame_passages(&passages, |p| p.to_string(), Some(*id)),
        };

        let input_tokens = (prompt.len() / 4) as u64;
        let output_tokens = (text.len() / 4) as u64;
        Ok(Completion {
            text,
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        })
    }
}

/// Pull the numbered passages out of either prompt shape
fn extract_passages(prompt: &str) -> Vec<String> {
    let mut passages = Vec::new();
    let mut id = 1usize;
    loop {
        let standard_open = format!("--- Passage {id} ---\n");
        let standard_close = format!("\n--- End Passage {id} ---");
        if let Some(pos) = prompt.find(&standard_open) {
            let start = pos + standard_open.len();
            if let Some(rel) = prompt[start..].find(&standard_close) {
                passages.push(prompt[start..start + rel].to_string());
                id += 1;
                continue;
            }
        }
        let robust_open = format!("Passage {id}:\n\"\"\"\n");
        let robust_close = "\n\"\"\"\n";
        if let Some(pos) = prompt.find(&robust_open) {
            let start = pos + robust_open.len();
            if let Some(rel) = prompt[start..].find(robust_close) {
                passages.push(prompt[start..start + rel].to_string());
                id += 1;
                continue;
            }
        }
        break;
    }
    passages
}

fn frame_passages(
    passages: &[String],
    mut transform: impl FnMut(&str) -> String,
    skip_id: Option<usize>,
) -> String {
    let mut out = String::new();
    for (i, passage) in passages.iter().enumerate() {
        let id = i + 1;
        if skip_id == Some(id) {
            continue;
        }
        out.push_str(&format!(
            "<<<TRANSLATION_START_{id}>>>\n{}\n<<<TRANSLATION_END_{id}>>>\n\n",
            transform(passage)
        ));
    }
    out
}
