//! A journaling prompt tailored to the user's mood.

use serde::{Deserialize, Serialize};

use super::{FlowKind, Flows};
use crate::error::DefinitionError;
use crate::invoker::InvocationResult;
use crate::prompt::PromptSpec;
use crate::schema::ObjectSchema;

pub const NAME: &str = "journalPrompt";

const TEMPLATE: &str = "You are a mental wellness assistant that provides journaling prompts based on a user's mood.

Provide a single journaling prompt that encourages reflection on their feelings and experiences related to their current mood.

Mood: {{{mood}}}

Prompt:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalPromptInput {
    /// Free text, e.g. `"happy"` or `"Anxious"`.
    pub mood: String,
}

impl JournalPromptInput {
    pub fn new(mood: impl Into<String>) -> Self {
        Self { mood: mood.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalPromptOutput {
    pub prompt: String,
}

pub fn prompt_spec() -> Result<PromptSpec, DefinitionError> {
    PromptSpec::builder(NAME)
        .input(ObjectSchema::new().text(
            "mood",
            "The user's current mood (e.g., happy, sad, anxious).",
        ))
        .output(ObjectSchema::new().text("prompt", "A journaling prompt tailored to the user."))
        .template(TEMPLATE)
        .build()
}

impl Flows {
    pub async fn generate_journal_prompt(
        &self,
        input: &JournalPromptInput,
    ) -> InvocationResult<JournalPromptOutput> {
        self.call(FlowKind::JournalPrompt, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::flows_with;
    use crate::invoker::FnService;
    use serde_json::json;

    #[test]
    fn renders_mood() {
        let spec = prompt_spec().unwrap();
        let rendered = spec.request(&json!({"mood": "Anxious"})).unwrap().render();
        assert!(rendered.contains("Mood: Anxious\n\nPrompt:"));
    }

    #[tokio::test]
    async fn returns_prompt() {
        let flows = flows_with(FnService::json(
            json!({"prompt": "What is one worry you could set down today?"}),
        ));
        let out = flows
            .generate_journal_prompt(&JournalPromptInput::new("anxious"))
            .await
            .unwrap();
        assert_eq!(out.prompt, "What is one worry you could set down today?");
    }

    #[tokio::test]
    async fn blank_mood_rejected_before_call() {
        let flows = flows_with(FnService::json(json!({"prompt": "unused"})));
        let err = flows
            .generate_journal_prompt(&JournalPromptInput::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::FlowError::InvalidInput { .. }));
    }
}
