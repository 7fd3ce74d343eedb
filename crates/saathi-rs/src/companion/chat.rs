//! A chat session with Saathi.
//!
//! Every user turn runs crisis detection and the empathetic reply
//! concurrently. A failed reply is replaced with a fixed apology; a failed
//! crisis check is logged and never holds back the reply.

use futures::future::join;
use serde::Serialize;
use tracing::{debug, warn};

use super::crisis::is_actionable;
use crate::Message;
use crate::flows::{CrisisDetectionInput, EmpatheticChatInput, Flows};

pub const WELCOME_MESSAGE: &str = "Hello! I'm Saathi, your personal wellness companion. How are \
you feeling today? Feel free to share anything that's on your mind. I'm here to listen without \
judgment.";

pub const FALLBACK_REPLY: &str =
    "I'm having a little trouble connecting right now. Please try again in a moment.";

/// Result of one user turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub reply: String,
    /// Raise the crisis alert and show the helplines.
    pub crisis_alert: bool,
    /// The reply is [`FALLBACK_REPLY`] because the chat flow failed.
    pub degraded: bool,
}

/// Transcript plus the flows that answer it.
#[derive(Debug, Clone)]
pub struct ChatSession {
    flows: Flows,
    transcript: Vec<Message>,
}

impl ChatSession {
    /// Start a session with the welcome message.
    pub fn new(flows: Flows) -> Self {
        Self {
            flows,
            transcript: vec![Message::assistant(WELCOME_MESSAGE)],
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Handle one user message. Blank input is ignored and returns `None`.
    ///
    /// Unlike the web client, a failed crisis check does not replace the
    /// reply with [`FALLBACK_REPLY`]; only a failed chat flow does.
    pub async fn send(&mut self, input: &str) -> Option<ChatTurn> {
        if input.trim().is_empty() {
            return None;
        }
        self.transcript.push(Message::user(input));

        let crisis_input = CrisisDetectionInput::new(input);
        let chat_input = EmpatheticChatInput::new(input);
        let (crisis, chat) = join(
            self.flows.detect_crisis(&crisis_input),
            self.flows.empathetic_chat(&chat_input),
        )
        .await;

        let crisis_alert = match crisis {
            Ok(detection) => {
                debug!(
                    "crisis check: is_crisis={} confidence={:.2}",
                    detection.is_crisis, detection.confidence
                );
                is_actionable(&detection)
            }
            Err(e) => {
                warn!("crisis check failed: {e}");
                false
            }
        };

        let (reply, degraded) = match chat {
            Ok(out) => (out.response, false),
            Err(e) => {
                warn!("chat reply failed: {e}");
                (FALLBACK_REPLY.to_string(), true)
            }
        };

        self.transcript.push(Message::assistant(reply.clone()));
        Some(ChatTurn {
            reply,
            crisis_alert,
            degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageRole;
    use crate::error::TransportError;
    use crate::flows::test_support::flows_with;
    use crate::invoker::{FnService, GenerationRequest};
    use serde_json::json;

    fn routed(crisis: serde_json::Value, chat: Option<serde_json::Value>) -> FnService {
        FnService::new(move |request: GenerationRequest| {
            let reply = if request.prompt_name == "detectCrisis" {
                Ok(crisis.to_string())
            } else {
                chat.as_ref()
                    .map(|c| c.to_string())
                    .ok_or(TransportError::Request("connection refused".into()))
            };
            async move { reply }
        })
    }

    #[test]
    fn starts_with_welcome() {
        let session = ChatSession::new(flows_with(FnService::reply("{}")));
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, MessageRole::Assistant);
        assert!(session.transcript()[0].content.starts_with("Hello! I'm Saathi"));
    }

    #[tokio::test]
    async fn blank_input_ignored() {
        let mut session = ChatSession::new(flows_with(FnService::reply("{}")));
        assert!(session.send("   \n").await.is_none());
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn reply_and_alert() {
        let mut session = ChatSession::new(flows_with(routed(
            json!({"isCrisis": true, "confidence": 0.9}),
            Some(json!({"response": "I'm really glad you told me."})),
        )));
        let turn = session.send("I want to die").await.unwrap();
        assert_eq!(turn.reply, "I'm really glad you told me.");
        assert!(turn.crisis_alert);
        assert!(!turn.degraded);
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test]
    async fn chat_failure_uses_fallback() {
        let mut session = ChatSession::new(flows_with(routed(
            json!({"isCrisis": false, "confidence": 0.1}),
            None,
        )));
        let turn = session.send("hello").await.unwrap();
        assert_eq!(turn.reply, FALLBACK_REPLY);
        assert!(turn.degraded);
        assert!(!turn.crisis_alert);
    }

    #[tokio::test]
    async fn crisis_failure_does_not_block_reply() {
        let mut session = ChatSession::new(flows_with(routed(
            json!({"isCrisis": "maybe"}),
            Some(json!({"response": "Tell me more."})),
        )));
        let turn = session.send("rough day").await.unwrap();
        assert_eq!(turn.reply, "Tell me more.");
        assert!(!turn.crisis_alert);
        assert!(!turn.degraded);
    }
}
