//! Empathetic summary of a journal entry.

use serde::{Deserialize, Serialize};

use super::{FlowKind, Flows};
use crate::error::DefinitionError;
use crate::invoker::InvocationResult;
use crate::prompt::PromptSpec;
use crate::schema::ObjectSchema;

pub const NAME: &str = "summarizeEntry";

const TEMPLATE: &str = "You are a compassionate wellness assistant. Read the following journal entry and provide a short, empathetic summary of the key themes and feelings expressed.

The summary should be gentle, non-judgmental, and about 2-3 sentences long.

Journal Entry:
{{{content}}}
";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeEntryInput {
    pub content: String,
}

impl SummarizeEntryInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeEntryOutput {
    pub summary: String,
}

pub fn prompt_spec() -> Result<PromptSpec, DefinitionError> {
    PromptSpec::builder(NAME)
        .input(ObjectSchema::new().text("content", "The user's journal entry content."))
        .output(ObjectSchema::new().text(
            "summary",
            "A short, empathetic summary (2-3 sentences) of the journal entry.",
        ))
        .template(TEMPLATE)
        .build()
}

impl Flows {
    pub async fn summarize_entry(
        &self,
        input: &SummarizeEntryInput,
    ) -> InvocationResult<SummarizeEntryOutput> {
        self.call(FlowKind::SummarizeEntry, input).await
    }
}
