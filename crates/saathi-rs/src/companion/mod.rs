//! Caller-side companion features built on the flows.
//!
//! The flows answer one question each. This module holds the policies that
//! turn those answers into product behavior:
//!
//! - [`chat`]: a chat session that runs crisis detection beside every reply.
//! - [`crisis`]: the alert threshold and the helplines to surface.
//! - [`journal`]: the save pipeline (analyze, summarize, record, reward).
//! - [`trend`]: daily average mood scores for charting.
//! - [`tree`]: the resilience tree and the daily check-in.
//! - [`resources`]: static CBT and mindfulness content.
//! - [`store`]: the per-user persistence contract and an in-memory store.

pub mod chat;
pub mod crisis;
pub mod journal;
pub mod resources;
pub mod store;
pub mod tree;
pub mod trend;

pub use chat::{ChatSession, ChatTurn};
pub use crisis::{HELPLINES, Helpline, is_actionable};
pub use journal::{Journal, JournalDraft, SavedEntry};
pub use store::{
    JournalEntry, MemoryStore, MoodEntry, NewJournalEntry, StoreError, WellnessStore,
};
pub use tree::{CheckIn, GrowthStage, TreeStatus};
pub use trend::{TrendPoint, daily_mood_trend};

use crate::error::FlowError;

/// Failure of a companion operation.
#[derive(Debug, thiserror::Error)]
pub enum CompanionError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("journal entry is empty")]
    EmptyEntry,
}
