//! The six companion flows.
//!
//! Each submodule declares one flow: its typed input and output, its
//! template, and a `prompt_spec()` constructor. [`FlowRegistry::standard`]
//! builds all six once at startup, so a bad declaration fails there rather
//! than on first use. [`Flows`] binds the registry to an [`Invoker`] and
//! exposes one async entry point per flow:
//!
//! | Flow | Entry point |
//! |------|-------------|
//! | `empatheticChat` | [`Flows::empathetic_chat`] |
//! | `detectCrisis` | [`Flows::detect_crisis`] |
//! | `journalPrompt` | [`Flows::generate_journal_prompt`] |
//! | `moodAnalysis` | [`Flows::analyze_mood`] |
//! | `mindfulMoment` | [`Flows::generate_mindful_moment`] |
//! | `summarizeEntry` | [`Flows::summarize_entry`] |

pub mod crisis_detection;
pub mod empathetic_chat;
pub mod journal_prompt;
pub mod mindful_moment;
pub mod mood_analysis;
pub mod summarize_entry;

pub use crisis_detection::{CrisisDetectionInput, CrisisDetectionOutput};
pub use empathetic_chat::{EmpatheticChatInput, EmpatheticChatOutput};
pub use journal_prompt::{JournalPromptInput, JournalPromptOutput};
pub use mindful_moment::MindfulMomentOutput;
pub use mood_analysis::{MoodAnalysisInput, MoodAnalysisOutput};
pub use summarize_entry::{SummarizeEntryInput, SummarizeEntryOutput};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::DefinitionError;
use crate::invoker::{InvocationResult, Invoker};
use crate::prompt::PromptSpec;

/// Identifies one of the six flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    EmpatheticChat,
    DetectCrisis,
    JournalPrompt,
    MoodAnalysis,
    MindfulMoment,
    SummarizeEntry,
}

impl FlowKind {
    pub const ALL: [FlowKind; 6] = [
        FlowKind::EmpatheticChat,
        FlowKind::DetectCrisis,
        FlowKind::JournalPrompt,
        FlowKind::MoodAnalysis,
        FlowKind::MindfulMoment,
        FlowKind::SummarizeEntry,
    ];

    /// Registered flow name.
    pub fn name(self) -> &'static str {
        match self {
            FlowKind::EmpatheticChat => empathetic_chat::NAME,
            FlowKind::DetectCrisis => crisis_detection::NAME,
            FlowKind::JournalPrompt => journal_prompt::NAME,
            FlowKind::MoodAnalysis => mood_analysis::NAME,
            FlowKind::MindfulMoment => mindful_moment::NAME,
            FlowKind::SummarizeEntry => summarize_entry::NAME,
        }
    }

    /// One-line summary for listings.
    pub fn description(self) -> &'static str {
        match self {
            FlowKind::EmpatheticChat => "Supportive reply to a chat message",
            FlowKind::DetectCrisis => "Flags self-harm, suicide or violence risk with a confidence",
            FlowKind::JournalPrompt => "Journaling prompt tailored to a mood",
            FlowKind::MoodAnalysis => "Primary mood, valence and energy of a journal entry",
            FlowKind::MindfulMoment => "Short mindfulness exercise or affirmation",
            FlowKind::SummarizeEntry => "Gentle two-to-three sentence summary of an entry",
        }
    }

    pub fn from_name(name: &str) -> Option<FlowKind> {
        FlowKind::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Declare this flow's prompt.
    pub fn prompt_spec(self) -> Result<PromptSpec, DefinitionError> {
        match self {
            FlowKind::EmpatheticChat => empathetic_chat::prompt_spec(),
            FlowKind::DetectCrisis => crisis_detection::prompt_spec(),
            FlowKind::JournalPrompt => journal_prompt::prompt_spec(),
            FlowKind::MoodAnalysis => mood_analysis::prompt_spec(),
            FlowKind::MindfulMoment => mindful_moment::prompt_spec(),
            FlowKind::SummarizeEntry => summarize_entry::prompt_spec(),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The six declared prompts, built and checked together.
#[derive(Debug, Clone)]
pub struct FlowRegistry {
    specs: Vec<PromptSpec>,
}

impl FlowRegistry {
    /// Declare every flow. Fails with the first definition error.
    pub fn standard() -> Result<Self, DefinitionError> {
        let specs = FlowKind::ALL
            .into_iter()
            .map(FlowKind::prompt_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specs })
    }

    pub fn spec(&self, kind: FlowKind) -> &PromptSpec {
        &self.specs[kind.index()]
    }

    /// Look a flow up by its registered name.
    pub fn get(&self, name: &str) -> Option<&PromptSpec> {
        FlowKind::from_name(name).map(|kind| self.spec(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlowKind, &PromptSpec)> {
        FlowKind::ALL.into_iter().zip(self.specs.iter())
    }
}

/// Typed entry points for the six flows.
///
/// Cheap to clone; clones share the registry and the service.
#[derive(Debug, Clone)]
pub struct Flows {
    invoker: Invoker,
    registry: Arc<FlowRegistry>,
}

impl Flows {
    pub fn new(invoker: Invoker) -> Result<Self, DefinitionError> {
        Ok(Self::with_registry(invoker, Arc::new(FlowRegistry::standard()?)))
    }

    pub fn with_registry(invoker: Invoker, registry: Arc<FlowRegistry>) -> Self {
        Self { invoker, registry }
    }

    pub fn registry(&self) -> &FlowRegistry {
        &self.registry
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Run a flow with untyped input, returning the validated output as JSON.
    pub async fn run(&self, kind: FlowKind, input: &Value) -> InvocationResult<Value> {
        let output = self.invoker.run(self.registry.spec(kind), input).await?;
        Ok(output.into_value())
    }

    pub(crate) async fn call<I, O>(&self, kind: FlowKind, input: &I) -> InvocationResult<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        self.invoker.run_typed(self.registry.spec(kind), input).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::FnService;
    use serde_json::json;

    #[test]
    fn standard_registry_builds() {
        let registry = FlowRegistry::standard().unwrap();
        let names: Vec<&str> = registry.iter().map(|(_, spec)| spec.name()).collect();
        assert_eq!(
            names,
            vec![
                "empatheticChat",
                "detectCrisis",
                "journalPrompt",
                "moodAnalysis",
                "mindfulMoment",
                "summarizeEntry",
            ]
        );
    }

    #[test]
    fn spec_lookup_matches_kind() {
        let registry = FlowRegistry::standard().unwrap();
        for kind in FlowKind::ALL {
            assert_eq!(registry.spec(kind).name(), kind.name());
            assert_eq!(registry.get(kind.name()).unwrap().name(), kind.name());
        }
        assert!(registry.get("unknownFlow").is_none());
    }

    #[test]
    fn every_output_schema_is_strict() {
        let registry = FlowRegistry::standard().unwrap();
        for (_, spec) in registry.iter() {
            assert!(spec.output_schema().all_required(), "{}", spec.name());
        }
    }

    #[tokio::test]
    async fn untyped_run_returns_validated_json() {
        let flows = test_support::flows_with(FnService::json(
            json!({"summary": "A hard week, met with courage.", "tone": "warm"}),
        ));
        let out = flows
            .run(FlowKind::SummarizeEntry, &json!({"content": "Rough week."}))
            .await
            .unwrap();
        assert_eq!(out, json!({"summary": "A hard week, met with courage."}));
    }
}
