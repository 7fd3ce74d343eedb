//! Convenience re-exports for common `saathi-rs` types.
//!
//! ```ignore
//! use saathi_rs::prelude::*;
//! ```
//!
//! Covers configuration, the six flows with their input/output types, the
//! invoker and service seam, and the companion features. Schema and template
//! building blocks live in their own modules.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::config::{ConfigError, SaathiConfig};
pub use crate::error::{FlowError, TransportError, ValidationError};
pub use crate::mood::Mood;
pub use crate::{Message, OpenRouterClient, Plugin};

// ── Invocation ──────────────────────────────────────────────────────
pub use crate::invoker::{
    FnService, GenerationRequest, GenerationService, InvocationResult, Invoker, InvokerConfig,
};
pub use crate::prompt::PromptSpec;

// ── Flows ───────────────────────────────────────────────────────────
pub use crate::flows::{
    CrisisDetectionInput, CrisisDetectionOutput, EmpatheticChatInput, EmpatheticChatOutput,
    FlowKind, FlowRegistry, Flows, JournalPromptInput, JournalPromptOutput, MindfulMomentOutput,
    MoodAnalysisInput, MoodAnalysisOutput, SummarizeEntryInput, SummarizeEntryOutput,
};

// ── Companion ───────────────────────────────────────────────────────
pub use crate::companion::{
    ChatSession, ChatTurn, CompanionError, GrowthStage, Journal, JournalDraft, MemoryStore,
    SavedEntry, WellnessStore, daily_mood_trend, is_actionable,
};
