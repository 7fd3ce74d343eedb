//! Empathetic reply to a user's chat message.

use serde::{Deserialize, Serialize};

use super::{FlowKind, Flows};
use crate::error::DefinitionError;
use crate::invoker::InvocationResult;
use crate::prompt::PromptSpec;
use crate::schema::ObjectSchema;

pub const NAME: &str = "empatheticChat";

const TEMPLATE: &str = "You are an AI assistant designed to provide empathetic support and \
understanding to users expressing their mental health concerns. Respond to the following \
message with empathy and offer helpful advice or resources where appropriate.

Message: {{{message}}}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpatheticChatInput {
    pub message: String,
}

impl EmpatheticChatInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpatheticChatOutput {
    pub response: String,
}

pub fn prompt_spec() -> Result<PromptSpec, DefinitionError> {
    PromptSpec::builder(NAME)
        .input(ObjectSchema::new().text("message", "The user message to respond to."))
        .output(ObjectSchema::new().text("response", "The empathetic response from the AI."))
        .template(TEMPLATE)
        .build()
}

impl Flows {
    /// Reply to `input.message` with empathy.
    pub async fn empathetic_chat(
        &self,
        input: &EmpatheticChatInput,
    ) -> InvocationResult<EmpatheticChatOutput> {
        self.call(FlowKind::EmpatheticChat, input).await
    }
}
