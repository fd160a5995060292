use pulse_core::PulseError;

use crate::llm::LlmClient;
use crate::prompt;

/// Asks the LLM to react to an item as a human reviewer would.
pub struct Reviewer {
    llm: LlmClient,
}

impl Reviewer {
    /// Wrap a configured LLM client.
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Generate a review of `text` with a single completion request.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Llm`] if the request fails; nothing is retried.
    pub async fn review(&self, text: &str) -> Result<String, PulseError> {
        self.llm.chat(prompt::review_messages(text)).await
    }
}
