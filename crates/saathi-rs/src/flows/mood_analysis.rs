//! Mood analysis of a journal entry: primary mood, valence and energy.

use serde::{Deserialize, Serialize};

use super::{FlowKind, Flows};
use crate::error::DefinitionError;
use crate::invoker::InvocationResult;
use crate::mood::Mood;
use crate::prompt::PromptSpec;
use crate::schema::ObjectSchema;

pub const NAME: &str = "moodAnalysis";

const TEMPLATE: &str = r#"You are a mood analysis expert. Analyze the following journal entry and determine the primary mood, emotional valence, and energy level.

The primary mood must be one of the following: Happy, Sad, Anxious, Calm, Angry, Neutral.

Valence is a score from -1 (very negative) to 1 (very positive).
Energy is a score from 0 (low energy) to 1 (high energy).

For example:
- "I'm so excited about my new project!" -> mood: Happy, valence: 0.9, energy: 0.8
- "I feel so down and tired today." -> mood: Sad, valence: -0.8, energy: 0.2
- "I'm worried about the upcoming exam." -> mood: Anxious, valence: -0.6, energy: 0.6
- "Just sitting by the lake, so peaceful." -> mood: Calm, valence: 0.7, energy: 0.1
- "I'm furious about what happened." -> mood: Angry, valence: -0.7, energy: 0.9
- "Just a regular day, nothing special to report." -> mood: Neutral, valence: 0.0, energy: 0.4


Journal Entry:
{{{text}}}
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysisInput {
    pub text: String,
}

impl MoodAnalysisInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysisOutput {
    /// One of the six mood names, in whatever case the model used.
    pub mood: String,
    /// In `[-1, 1]`.
    pub valence: f64,
    /// In `[0, 1]`.
    pub energy: f64,
}

impl MoodAnalysisOutput {
    /// The mood as a [`Mood`], by case-insensitive name.
    pub fn mood_kind(&self) -> Mood {
        Mood::from_name_or_neutral(&self.mood)
    }
}

pub fn prompt_spec() -> Result<PromptSpec, DefinitionError> {
    let names: Vec<&str> = Mood::ALL.iter().map(|m| m.name()).collect();
    PromptSpec::builder(NAME)
        .input(ObjectSchema::new().text("text", "The journal entry text to be analyzed for mood."))
        .output(
            ObjectSchema::new()
                .choice(
                    "mood",
                    &names,
                    true,
                    "The primary mood detected in the text (e.g., Happy, Sad, Anxious, Calm, Angry, Neutral).",
                )
                .number(
                    "valence",
                    -1.0,
                    1.0,
                    "A score from -1 (very negative) to 1 (very positive) representing the emotional valence.",
                )
                .number(
                    "energy",
                    0.0,
                    1.0,
                    "A score from 0 (low energy) to 1 (high energy) representing the arousal level.",
                ),
        )
        .template(TEMPLATE)
        .build()
}

impl Flows {
    pub async fn analyze_mood(
        &self,
        input: &MoodAnalysisInput,
    ) -> InvocationResult<MoodAnalysisOutput> {
        self.call(FlowKind::MoodAnalysis, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Constraint;
    use crate::flows::test_support::flows_with;
    use crate::invoker::FnService;
    use serde_json::json;

    #[test]
    fn output_schema_lists_moods() {
        let schema = prompt_spec().unwrap().output_schema().to_json_schema();
        assert_eq!(
            schema["properties"]["mood"]["enum"],
            json!(["Happy", "Calm", "Neutral", "Sad", "Angry", "Anxious"])
        );
        assert_eq!(schema["properties"]["valence"]["minimum"], -1.0);
    }

    #[test]
    fn accepted_moods_always_map() {
        let spec = prompt_spec().unwrap();
        for name in ["hAPPY", "CALM", "anxious", "calm ", "Ｈappy", "Elated"] {
            let accepted = spec
                .output_schema()
                .validate(&json!({"mood": name, "valence": 0.0, "energy": 0.5}))
                .is_ok();
            assert_eq!(accepted, Mood::from_name(name).is_some(), "{name:?}");
        }
    }

    #[test]
    fn valence_bounds_are_inclusive() {
        let schema = prompt_spec().unwrap();
        let output = schema.output_schema();
        for valence in [-1.0, 1.0] {
            assert!(
                output
                    .validate(&json!({"mood": "Calm", "valence": valence, "energy": 0.1}))
                    .is_ok()
            );
        }
        let err = output
            .validate(&json!({"mood": "Calm", "valence": -1.0001, "energy": 0.1}))
            .unwrap_err();
        assert_eq!(err.field, "valence");
    }

    #[test]
    fn unknown_mood_rejected() {
        let spec = prompt_spec().unwrap();
        let err = spec
            .output_schema()
            .validate(&json!({"mood": "Joyful", "valence": 0.5, "energy": 0.5}))
            .unwrap_err();
        assert!(matches!(err.constraint, Constraint::OneOf { .. }));
    }

    #[tokio::test]
    async fn lowercase_mood_maps_to_table() {
        let flows = flows_with(FnService::json(
            json!({"mood": "happy", "valence": 0.6, "energy": 0.7}),
        ));
        let out = flows
            .analyze_mood(&MoodAnalysisInput::new("Great day out"))
            .await
            .unwrap();
        assert_eq!(out.mood, "happy");
        assert_eq!(out.mood_kind(), Mood::Happy);
        assert_eq!(out.mood_kind().score(), 2);
    }
}
