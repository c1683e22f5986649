//! services/tutor/src/chat.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! handling a single conversation turn: append the user's message, obtain the
//! assistant's reply from the response generator, append the reply.

use tracing::{error, info, warn};
use tutor_core::domain::{Creativity, Message, Sender};
use tutor_core::ports::{PortError, PortResult};
use uuid::Uuid;

use crate::state::AppState;

/// Inserted as an assistant turn when the response generator fails, so the
/// conversation keeps flowing instead of surfacing a hard error.
pub const REPLY_ERROR_TEXT: &str =
    "عذراً، حدث خطأ أثناء معالجة طلبك. يرجى المحاولة مرة أخرى.";

/// Represents the outcome of a `send_user_message` turn.
/// This tells the caller what actually landed in the session.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The assistant reply (or the in-conversation error message) was appended.
    Answered,
    /// The owning file or session disappeared while the reply was pending.
    SessionGone,
}

/// The main asynchronous task for handling a single user turn.
///
/// The user's message is committed before the generator is consulted, so a
/// generator failure never loses it. The generator call races the file's
/// cancellation token: deleting the file mid-generation resolves the turn as
/// `SessionGone` instead of writing into a dead session.
pub async fn send_user_message(
    state: &AppState,
    file_id: Uuid,
    session_id: Uuid,
    text: String,
    creativity: Creativity,
) -> PortResult<ReplyOutcome> {
    state
        .store
        .add_message(file_id, session_id, Message::new(Sender::User, text.clone()))?;

    let Some(cancel) = state.store.file_token(file_id) else {
        // File deleted between the append and here.
        return Ok(ReplyOutcome::SessionGone);
    };

    let generated = tokio::select! {
        _ = cancel.cancelled() => {
            info!(
                "Reply generation for session {} cancelled; file {} was deleted",
                session_id, file_id
            );
            return Ok(ReplyOutcome::SessionGone);
        }
        result = state.responder.generate(creativity, &text) => result,
    };

    let reply_text = match generated {
        Ok(reply_text) => reply_text,
        Err(e) => {
            error!("Response generation failed for session {}: {}", session_id, e);
            REPLY_ERROR_TEXT.to_string()
        }
    };

    match state
        .store
        .add_message(file_id, session_id, Message::new(Sender::Assistant, reply_text))
    {
        Ok(()) => Ok(ReplyOutcome::Answered),
        Err(PortError::NotFound(_)) => {
            // The reply resolved into a session that no longer exists; this
            // must be a safe no-op, not a failure.
            warn!(
                "Session {} vanished before the reply landed; dropping it",
                session_id
            );
            Ok(ReplyOutcome::SessionGone)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockAnalyzer, MockResponder};
    use crate::config::Config;
    use crate::store::TutorStore;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;
    use tutor_core::ports::ResponseGenerator;

    fn test_state(responder: Arc<dyn ResponseGenerator>) -> AppState {
        AppState {
            store: Arc::new(TutorStore::new(Arc::new(MockAnalyzer::new(Duration::ZERO)))),
            responder,
            config: Arc::new(Config::for_tests()),
        }
    }

    struct FailingResponder;

    #[async_trait]
    impl ResponseGenerator for FailingResponder {
        async fn generate(&self, _creativity: Creativity, _prompt: &str) -> PortResult<String> {
            Err(PortError::Unexpected("model backend down".to_string()))
        }
    }

    #[tokio::test]
    async fn full_turn_appends_user_message_and_literal_reply() {
        let state = test_state(Arc::new(MockResponder::new(Duration::ZERO)));
        let file = state.store.add_file("book.pdf").await.unwrap();
        let session_id = file.sessions[0].id;

        let outcome = send_user_message(
            &state,
            file.id,
            session_id,
            "what is chapter 2 about?".to_string(),
            Creativity::new(20),
        )
        .await
        .unwrap();
        assert_eq!(outcome, ReplyOutcome::Answered);

        let snapshot = state.store.snapshot();
        let history = &snapshot
            .file(file.id)
            .unwrap()
            .session(session_id)
            .unwrap()
            .history;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].sender, Sender::Assistant);
        assert_eq!(history[1].sender, Sender::User);
        assert_eq!(history[1].text, "what is chapter 2 about?");
        assert_eq!(history[2].sender, Sender::Assistant);
        assert!(history[2].text.contains("هذا هو النص الحرفي من المستند."));
        assert!(history[2].text.contains("80٪"));
        assert!(history[2].text.contains("20٪"));
    }

    #[tokio::test]
    async fn generator_failure_keeps_the_user_message_and_appends_the_apology() {
        let state = test_state(Arc::new(FailingResponder));
        let file = state.store.add_file("book.pdf").await.unwrap();
        let session_id = file.sessions[0].id;

        let outcome = send_user_message(
            &state,
            file.id,
            session_id,
            "سؤال".to_string(),
            Creativity::default(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, ReplyOutcome::Answered);

        let snapshot = state.store.snapshot();
        let history = &snapshot
            .file(file.id)
            .unwrap()
            .session(session_id)
            .unwrap()
            .history;
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].text, "سؤال");
        assert_eq!(history[2].sender, Sender::Assistant);
        assert_eq!(history[2].text, REPLY_ERROR_TEXT);
    }

    #[tokio::test]
    async fn sending_into_an_unknown_session_is_an_explicit_error() {
        let state = test_state(Arc::new(MockResponder::new(Duration::ZERO)));
        let file = state.store.add_file("book.pdf").await.unwrap();

        let result = send_user_message(
            &state,
            file.id,
            Uuid::new_v4(),
            "سؤال".to_string(),
            Creativity::default(),
        )
        .await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }

    #[tokio::test]
    async fn deleting_the_file_mid_generation_resolves_as_session_gone() {
        let state = test_state(Arc::new(MockResponder::new(Duration::from_millis(200))));
        let file = state.store.add_file("book.pdf").await.unwrap();
        let session_id = file.sessions[0].id;

        let task_state = state.clone();
        let file_id = file.id;
        let turn = tokio::spawn(async move {
            send_user_message(
                &task_state,
                file_id,
                session_id,
                "سؤال".to_string(),
                Creativity::default(),
            )
            .await
        });

        // Let the turn commit the user message and start generating.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(state.store.delete_file(file.id));

        let outcome = turn.await.unwrap().unwrap();
        assert_eq!(outcome, ReplyOutcome::SessionGone);
        assert!(state.store.snapshot().files.is_empty());
    }
}
