//! Journal save pipeline.
//!
//! Saving an entry runs every AI step before touching the store:
//!
//! 1. analyze the mood when the user did not pick one;
//! 2. summarize the entry;
//! 3. record a mood entry with the final mood and its score;
//! 4. record the journal entry;
//! 5. award one growth point.
//!
//! A failed flow call aborts the save with nothing written.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::CompanionError;
use super::store::{JournalEntry, MoodEntry, NewJournalEntry, WellnessStore};
use super::tree::award_point;
use crate::flows::{Flows, JournalPromptInput, MoodAnalysisInput, SummarizeEntryInput};
use crate::mood::Mood;

/// An entry the user is about to save.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JournalDraft {
    pub content: String,
    pub title: Option<String>,
    /// The journaling prompt shown while writing, if any.
    pub prompt: Option<String>,
    /// The mood the user selected. `None` asks for analysis.
    pub mood: Option<Mood>,
}

impl JournalDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }
}

/// What a successful save wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedEntry {
    pub journal: JournalEntry,
    pub mood: MoodEntry,
    /// Total after the awarded point.
    pub growth_points: u32,
    /// Whether the mood came from analysis rather than the user.
    pub mood_detected: bool,
}

/// Title used when the user leaves it blank.
pub fn default_title(date: NaiveDate) -> String {
    format!("Journal Entry - {}", date.format("%-m/%-d/%Y"))
}

/// One user's journal.
#[derive(Clone)]
pub struct Journal {
    flows: Flows,
    store: Arc<dyn WellnessStore>,
    user_id: String,
}

impl Journal {
    pub fn new(flows: Flows, store: Arc<dyn WellnessStore>, user_id: impl Into<String>) -> Self {
        Self {
            flows,
            store,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// A journaling prompt for the selected mood.
    pub async fn suggest_prompt(&self, mood: Mood) -> Result<String, CompanionError> {
        let out = self
            .flows
            .generate_journal_prompt(&JournalPromptInput::new(mood.name()))
            .await?;
        Ok(out.prompt)
    }

    pub async fn save(&self, draft: JournalDraft) -> Result<SavedEntry, CompanionError> {
        self.save_at(draft, Utc::now()).await
    }

    /// Save with an explicit timestamp.
    pub async fn save_at(
        &self,
        draft: JournalDraft,
        now: DateTime<Utc>,
    ) -> Result<SavedEntry, CompanionError> {
        if draft.content.trim().is_empty() {
            return Err(CompanionError::EmptyEntry);
        }

        let (mood, analysis) = match draft.mood {
            Some(mood) => (mood, None),
            None => {
                let analysis = self
                    .flows
                    .analyze_mood(&MoodAnalysisInput::new(draft.content.clone()))
                    .await?;
                info!("Mood detected: {}", analysis.mood_kind());
                (analysis.mood_kind(), Some(analysis))
            }
        };
        let mood_detected = analysis.is_some();

        let summary = self
            .flows
            .summarize_entry(&SummarizeEntryInput::new(draft.content.clone()))
            .await?
            .summary;

        let store = self.store.as_ref();
        let mood_entry = store.add_mood_entry(&self.user_id, mood, now)?;

        let title = draft
            .title
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| default_title(now.date_naive()));
        let journal = store.add_journal_entry(
            &self.user_id,
            NewJournalEntry {
                title,
                prompt: draft.prompt.unwrap_or_default(),
                content: draft.content,
                summary: Some(summary),
                analysis,
            },
            now,
        )?;

        let growth_points = award_point(store, &self.user_id)?;
        info!(
            "Saved journal entry {} ({mood}); growth points now {growth_points}",
            journal.id
        );

        Ok(SavedEntry {
            journal,
            mood: mood_entry,
            growth_points,
            mood_detected,
        })
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::store::MemoryStore;
    use crate::error::TransportError;
    use crate::flows::test_support::flows_with;
    use crate::invoker::{FnService, GenerationRequest};
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Mutex;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
    }

    /// Answers mood analysis and summary; records which flows were called.
    fn stub(calls: Arc<Mutex<Vec<String>>>, mood: &'static str) -> FnService {
        FnService::new(move |request: GenerationRequest| {
            calls.lock().unwrap().push(request.prompt_name.clone());
            let reply = match request.prompt_name.as_str() {
                "moodAnalysis" => json!({"mood": mood, "valence": -0.6, "energy": 0.6}),
                "summarizeEntry" => json!({"summary": "You're carrying some worry."}),
                _ => json!({"prompt": "What would help right now?"}),
            };
            async move { Ok(reply.to_string()) }
        })
    }

    #[test]
    fn default_title_uses_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 8).unwrap();
        assert_eq!(default_title(date), "Journal Entry - 10/8/2026");
    }

    #[tokio::test]
    async fn detected_mood_saved_with_analysis() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::new(MemoryStore::new());
        let journal = Journal::new(flows_with(stub(calls.clone(), "anxious")), store.clone(), "u1");

        let saved = journal
            .save_at(JournalDraft::new("Exam tomorrow."), now())
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["moodAnalysis", "summarizeEntry"]);
        assert!(saved.mood_detected);
        assert_eq!(saved.mood.mood, Mood::Anxious);
        assert_eq!(saved.mood.mood_score, -2);
        assert_eq!(saved.journal.title, "Journal Entry - 10/18/2026");
        assert_eq!(saved.journal.summary.as_deref(), Some("You're carrying some worry."));
        assert_eq!(saved.journal.analysis.as_ref().unwrap().mood, "anxious");
        assert_eq!(saved.growth_points, 1);
        assert_eq!(store.growth_points("u1").unwrap(), 1);
    }

    #[tokio::test]
    async fn selected_mood_skips_analysis() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::new(MemoryStore::new());
        let journal = Journal::new(flows_with(stub(calls.clone(), "Sad")), store.clone(), "u1");

        let saved = journal
            .save_at(
                JournalDraft::new("Lovely walk.")
                    .with_mood(Mood::Calm)
                    .with_title("  Sunday  ")
                    .with_prompt("What felt good today?"),
                now(),
            )
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["summarizeEntry"]);
        assert!(!saved.mood_detected);
        assert_eq!(saved.mood.mood, Mood::Calm);
        assert_eq!(saved.journal.title, "Sunday");
        assert_eq!(saved.journal.prompt, "What felt good today?");
        assert!(saved.journal.analysis.is_none());
    }

    #[tokio::test]
    async fn detected_neutral_scores_zero() {
        let store = Arc::new(MemoryStore::new());
        let journal = Journal::new(
            flows_with(FnService::new(|request: GenerationRequest| async move {
                Ok(match request.prompt_name.as_str() {
                    "moodAnalysis" => json!({"mood": "Neutral", "valence": 0.0, "energy": 0.4}),
                    _ => json!({"summary": "A quiet day."}),
                }
                .to_string())
            })),
            store,
            "u1",
        );
        let saved = journal
            .save_at(JournalDraft::new("Nothing much."), now())
            .await
            .unwrap();
        assert_eq!(saved.mood.mood, Mood::Neutral);
        assert_eq!(saved.mood.mood_score, 0);
    }

    #[tokio::test]
    async fn blank_entry_rejected() {
        let store = Arc::new(MemoryStore::new());
        let journal = Journal::new(flows_with(FnService::reply("{}")), store, "u1");
        let err = journal.save(JournalDraft::new("  ")).await.unwrap_err();
        assert!(matches!(err, CompanionError::EmptyEntry));
    }

    #[tokio::test]
    async fn failed_summary_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let journal = Journal::new(
            flows_with(FnService::failing(TransportError::Status {
                status: 500,
                body: "upstream".into(),
            })),
            store.clone(),
            "u1",
        );
        let err = journal
            .save_at(JournalDraft::new("Hard day.").with_mood(Mood::Sad), now())
            .await
            .unwrap_err();
        assert!(matches!(err, CompanionError::Flow(_)));
        assert!(store.mood_entries("u1").unwrap().is_empty());
        assert!(store.journal_entries("u1").unwrap().is_empty());
        assert_eq!(store.growth_points("u1").unwrap(), 0);
    }

    #[tokio::test]
    async fn suggests_prompt_for_mood() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let journal = Journal::new(
            flows_with(stub(calls.clone(), "Happy")),
            Arc::new(MemoryStore::new()),
            "u1",
        );
        let prompt = journal.suggest_prompt(Mood::Sad).await.unwrap();
        assert_eq!(prompt, "What would help right now?");
        assert_eq!(*calls.lock().unwrap(), vec!["journalPrompt"]);
    }
}
