//! Crisis detection: does a piece of text indicate self-harm, suicide or
//! violence risk?
//!
//! The flow only reports `isCrisis` and a confidence. Deciding when to act
//! on it is the caller's job; see [`crate::companion::crisis`].

use serde::{Deserialize, Serialize};

use super::{FlowKind, Flows};
use crate::error::DefinitionError;
use crate::invoker::InvocationResult;
use crate::prompt::PromptSpec;
use crate::schema::ObjectSchema;

pub const NAME: &str = "detectCrisis";

const TEMPLATE: &str = r#"You are a crisis detection AI. Your job is to determine, based on the text provided, whether the user is in a crisis situation. A crisis situation includes thoughts of self-harm, suicide, or violence against others.

Analyze the following text:

{{text}}

Return a JSON object with the following format:
{
  "isCrisis": true|false,
  "confidence": confidence level (0-1)
}

Consider these keywords:
- suicide
- self-harm
- kill myself
- want to die
- violence
- abuse
- rape
- assault
- crisis
- emergency
- help
- hurting myself

However, do not trigger on these words alone. Consider the context of the entire text.
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisDetectionInput {
    pub text: String,
}

impl CrisisDetectionInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisDetectionOutput {
    pub is_crisis: bool,
    /// In `[0, 1]`.
    pub confidence: f64,
}

impl CrisisDetectionOutput {
    /// `is_crisis` with a confidence strictly above `threshold`.
    pub fn exceeds_threshold(&self, threshold: f64) -> bool {
        self.is_crisis && self.confidence > threshold
    }
}

pub fn prompt_spec() -> Result<PromptSpec, DefinitionError> {
    PromptSpec::builder(NAME)
        .input(ObjectSchema::new().text("text", "The text to analyze for crisis-related keywords."))
        .output(
            ObjectSchema::new()
                .boolean("isCrisis", "Whether the text indicates a crisis situation.")
                .number(
                    "confidence",
                    0.0,
                    1.0,
                    "The confidence level of the crisis detection (0-1).",
                ),
        )
        .template(TEMPLATE)
        .build()
}

impl Flows {
    /// Assess `input.text` for crisis risk.
    pub async fn detect_crisis(
        &self,
        input: &CrisisDetectionInput,
    ) -> InvocationResult<CrisisDetectionOutput> {
        self.call(FlowKind::DetectCrisis, input).await
    }
}
