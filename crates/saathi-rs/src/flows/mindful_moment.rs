//! A short mindfulness exercise or affirmation. Takes no input.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::{FlowKind, Flows};
use crate::error::DefinitionError;
use crate::invoker::InvocationResult;
use crate::prompt::PromptSpec;
use crate::schema::ObjectSchema;

pub const NAME: &str = "mindfulMoment";

const TEMPLATE: &str = r#"You are a mental wellness assistant. Generate a single, short, and calming mindfulness exercise or a positive affirmation.

The response should be 2-3 sentences long.
It should be written in a gentle, supportive, and direct second-person voice (addressing "you").

Examples:
- "Close your eyes for a moment. Take a deep breath in, hold it for a count of three, and slowly release it. Feel the tension leaving your body with your breath."
- "Think of one thing you are grateful for right now, no matter how small. Hold that feeling of gratitude in your heart for a moment."
- "You are capable and resilient. Acknowledge one small success you've had today and allow yourself to feel proud."

Generate a new mindful moment now."#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindfulMomentOutput {
    pub moment: String,
}

pub fn prompt_spec() -> Result<PromptSpec, DefinitionError> {
    PromptSpec::builder(NAME)
        .output(ObjectSchema::new().text(
            "moment",
            "A short, calming mindfulness exercise or a positive affirmation, written in the second person (e.g., \"Take a deep breath...\").",
        ))
        .template(TEMPLATE)
        .build()
}

impl Flows {
    pub async fn generate_mindful_moment(&self) -> InvocationResult<MindfulMomentOutput> {
        self.call(FlowKind::MindfulMoment, &Map::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::flows_with;
    use crate::invoker::{FnService, GenerationRequest};
    use serde_json::json;

    #[test]
    fn has_no_slots() {
        let spec = prompt_spec().unwrap();
        assert!(spec.template().slots().is_empty());
        assert!(spec.input_schema().is_empty());
    }

    #[tokio::test]
    async fn sends_fixed_prompt() {
        let flows = flows_with(FnService::new(|request: GenerationRequest| async move {
            assert!(request.prompt.ends_with("Generate a new mindful moment now."));
            Ok(json!({"moment": "Notice your breath. Let your shoulders drop."}).to_string())
        }));
        let out = flows.generate_mindful_moment().await.unwrap();
        assert_eq!(out.moment, "Notice your breath. Let your shoulders drop.");
    }
}
