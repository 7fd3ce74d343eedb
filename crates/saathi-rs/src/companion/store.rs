//! Per-user wellness records and the store contract.
//!
//! Each user owns a journal collection, a mood collection and a settings
//! document (growth points and last check-in). Collections list newest first.
//! [`MemoryStore`] keeps everything in process and backs the tests and the
//! CLI; a document database would implement [`WellnessStore`] the same way.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::flows::MoodAnalysisOutput;
use crate::mood::Mood;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store state is poisoned")]
    Poisoned,
}

/// A saved journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// The journaling prompt the user wrote against, or empty.
    pub prompt: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Present when the mood was detected rather than selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MoodAnalysisOutput>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a [`JournalEntry`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewJournalEntry {
    pub title: String,
    pub prompt: String,
    pub content: String,
    pub summary: Option<String>,
    pub analysis: Option<MoodAnalysisOutput>,
}

/// A recorded mood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: String,
    pub user_id: String,
    pub mood: Mood,
    pub mood_score: i32,
    pub created_at: DateTime<Utc>,
}

/// Persistence for the companion's per-user records.
pub trait WellnessStore: Send + Sync {
    fn add_journal_entry(
        &self,
        user_id: &str,
        entry: NewJournalEntry,
        at: DateTime<Utc>,
    ) -> Result<JournalEntry, StoreError>;

    /// Newest first.
    fn journal_entries(&self, user_id: &str) -> Result<Vec<JournalEntry>, StoreError>;

    fn add_mood_entry(
        &self,
        user_id: &str,
        mood: Mood,
        at: DateTime<Utc>,
    ) -> Result<MoodEntry, StoreError>;

    /// Newest first.
    fn mood_entries(&self, user_id: &str) -> Result<Vec<MoodEntry>, StoreError>;

    /// 0 for a user with no settings yet.
    fn growth_points(&self, user_id: &str) -> Result<u32, StoreError>;

    fn set_growth_points(&self, user_id: &str, points: u32) -> Result<(), StoreError>;

    /// Add one point in a single write and return the new total.
    fn increment_growth_points(&self, user_id: &str) -> Result<u32, StoreError>;

    fn last_check_in(&self, user_id: &str) -> Result<Option<NaiveDate>, StoreError>;

    fn set_last_check_in(&self, user_id: &str, date: NaiveDate) -> Result<(), StoreError>;

    /// Record a check-in for `date` and add one point, both in one write.
    /// `None` when `date` was already claimed; nothing changes then.
    fn claim_check_in(&self, user_id: &str, date: NaiveDate) -> Result<Option<u32>, StoreError>;
}

#[derive(Debug, Default)]
struct UserRecords {
    journal: Vec<JournalEntry>,
    moods: Vec<MoodEntry>,
    growth_points: u32,
    last_check_in: Option<NaiveDate>,
}

/// In-process [`WellnessStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, UserRecords>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n}")
    }

    fn with_user<T>(&self, user_id: &str, f: impl FnOnce(&mut UserRecords) -> T) -> Result<T, StoreError> {
        let mut users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(users.entry(user_id.to_string()).or_default()))
    }

    fn read_user<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(Option<&UserRecords>) -> T,
    ) -> Result<T, StoreError> {
        let users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(users.get(user_id)))
    }
}

/// Newest first; among equal timestamps the later insertion comes first.
fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    out
}

impl WellnessStore for MemoryStore {
    fn add_journal_entry(
        &self,
        user_id: &str,
        entry: NewJournalEntry,
        at: DateTime<Utc>,
    ) -> Result<JournalEntry, StoreError> {
        let saved = JournalEntry {
            id: self.next_id("journal"),
            user_id: user_id.to_string(),
            title: entry.title,
            prompt: entry.prompt,
            content: entry.content,
            summary: entry.summary,
            analysis: entry.analysis,
            created_at: at,
            updated_at: at,
        };
        self.with_user(user_id, |u| u.journal.push(saved.clone()))?;
        Ok(saved)
    }

    fn journal_entries(&self, user_id: &str) -> Result<Vec<JournalEntry>, StoreError> {
        self.read_user(user_id, |u| {
            u.map(|u| newest_first(&u.journal, |e| e.created_at))
                .unwrap_or_default()
        })
    }

    fn add_mood_entry(
        &self,
        user_id: &str,
        mood: Mood,
        at: DateTime<Utc>,
    ) -> Result<MoodEntry, StoreError> {
        let saved = MoodEntry {
            id: self.next_id("mood"),
            user_id: user_id.to_string(),
            mood,
            mood_score: mood.score(),
            created_at: at,
        };
        self.with_user(user_id, |u| u.moods.push(saved.clone()))?;
        Ok(saved)
    }

    fn mood_entries(&self, user_id: &str) -> Result<Vec<MoodEntry>, StoreError> {
        self.read_user(user_id, |u| {
            u.map(|u| newest_first(&u.moods, |e| e.created_at))
                .unwrap_or_default()
        })
    }

    fn growth_points(&self, user_id: &str) -> Result<u32, StoreError> {
        self.read_user(user_id, |u| u.map_or(0, |u| u.growth_points))
    }

    fn set_growth_points(&self, user_id: &str, points: u32) -> Result<(), StoreError> {
        self.with_user(user_id, |u| u.growth_points = points)
    }

    fn last_check_in(&self, user_id: &str) -> Result<Option<NaiveDate>, StoreError> {
        self.read_user(user_id, |u| u.and_then(|u| u.last_check_in))
    }

    fn set_last_check_in(&self, user_id: &str, date: NaiveDate) -> Result<(), StoreError> {
        self.with_user(user_id, |u| u.last_check_in = Some(date))
    }

    fn increment_growth_points(&self, user_id: &str) -> Result<u32, StoreError> {
        self.with_user(user_id, |u| {
            u.growth_points = u.growth_points.saturating_add(1);
            u.growth_points
        })
    }

    fn claim_check_in(&self, user_id: &str, date: NaiveDate) -> Result<Option<u32>, StoreError> {
        self.with_user(user_id, |u| {
            if u.last_check_in == Some(date) {
                return None;
            }
            u.last_check_in = Some(date);
            u.growth_points = u.growth_points.saturating_add(1);
            Some(u.growth_points)
        })
    }
}
