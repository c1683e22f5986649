//! services/tutor/src/adapters/responder.rs
//!
//! This module contains the simulated assistant-reply adapter.
//! It implements the `ResponseGenerator` port from the `core` crate. The reply
//! is a pure function of the creativity level and the prompt: one of three
//! canned framings plus a trailer reporting the document/supplementary split.
//! A real model client can replace this adapter without touching callers.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;
use tutor_core::domain::Creativity;
use tutor_core::ports::{PortResult, ResponseGenerator};

/// Framing used when creativity is below `LITERAL_BELOW`.
const LITERAL_FRAMING: &str = "هذا هو النص الحرفي من المستند.";

/// Framing used when creativity is in `LITERAL_BELOW..SIMPLIFIED_BELOW`.
const SIMPLIFIED_FRAMING: &str =
    "هذا شرح مبسط للمعلومات الموجودة في الملف، مع ربط بعض المفاهيم لتسهيل الفهم.";

/// Framing used when creativity is `SIMPLIFIED_BELOW` or above.
const CREATIVE_FRAMING: &str =
    "هذه فكرة إبداعية مستوحاة من المحتوى، مع أمثلة خارجية لتوضيح الفكرة بشكل أعمق.";

const LITERAL_BELOW: u8 = 30;
const SIMPLIFIED_BELOW: u8 = 70;

/// How many characters of the prompt are echoed back in the reply prefix.
const PROMPT_ECHO_CHARS: usize = 20;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ResponseGenerator` with a fixed-delay simulation.
#[derive(Clone)]
pub struct MockResponder {
    delay: Duration,
}

impl MockResponder {
    /// Creates a new `MockResponder`. Tests pass `Duration::ZERO`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

/// Composes the canned reply for a prompt at the given creativity level.
///
/// Deterministic: the same `(creativity, prompt)` pair always yields the same
/// text. The trailer reports `100 - c`٪ document content and `c`٪ supplementary
/// analysis for creativity `c`.
pub fn compose_reply(creativity: Creativity, prompt: &str) -> String {
    let c = creativity.value();
    let echoed: String = prompt.chars().take(PROMPT_ECHO_CHARS).collect();

    let framing = if c < LITERAL_BELOW {
        LITERAL_FRAMING
    } else if c < SIMPLIFIED_BELOW {
        SIMPLIFIED_FRAMING
    } else {
        CREATIVE_FRAMING
    };

    format!(
        "بناءً على تحليل الملف ومستوى الإبداع ({}%)، إليك إجابتي حول \"{}...\": {}\n\n> تم الاعتماد على {}٪ من محتوى الملف و{}٪ من التحليل الإضافي.",
        c,
        echoed,
        framing,
        100 - u32::from(c),
        c
    )
}

//=========================================================================================
// `ResponseGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl ResponseGenerator for MockResponder {
    async fn generate(&self, creativity: Creativity, prompt: &str) -> PortResult<String> {
        tokio::time::sleep(self.delay).await;
        info!(
            "Simulated reply generated at creativity {}",
            creativity.value()
        );
        Ok(compose_reply(creativity, prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(c: u8) -> String {
        compose_reply(Creativity::new(c), "ما هو الفصل الثاني؟")
    }

    #[test]
    fn low_creativity_selects_literal_framing() {
        assert!(reply(10).contains(LITERAL_FRAMING));
    }

    #[test]
    fn mid_creativity_selects_simplified_framing() {
        assert!(reply(50).contains(SIMPLIFIED_FRAMING));
    }

    #[test]
    fn high_creativity_selects_creative_framing() {
        assert!(reply(90).contains(CREATIVE_FRAMING));
    }

    #[test]
    fn framing_boundaries_are_exclusive_at_30_and_70() {
        assert!(reply(29).contains(LITERAL_FRAMING));
        assert!(reply(30).contains(SIMPLIFIED_FRAMING));
        assert!(reply(69).contains(SIMPLIFIED_FRAMING));
        assert!(reply(70).contains(CREATIVE_FRAMING));
    }

    #[test]
    fn trailer_reports_the_split_for_any_creativity() {
        for c in [0u8, 20, 50, 73, 100] {
            let text = reply(c);
            assert!(text.contains(&format!("{}٪ من محتوى الملف", 100 - u32::from(c))));
            assert!(text.contains(&format!("{}٪ من التحليل الإضافي", c)));
        }
    }

    #[test]
    fn replies_are_deterministic() {
        assert_eq!(reply(42), reply(42));
    }

    #[test]
    fn prompt_echo_is_truncated_to_twenty_chars() {
        let long_prompt = "س".repeat(80);
        let text = compose_reply(Creativity::new(50), &long_prompt);
        assert!(text.contains(&format!("\"{}...\"", "س".repeat(20))));
        assert!(!text.contains(&"س".repeat(21)));
    }

    #[tokio::test]
    async fn generate_returns_the_composed_reply() {
        let responder = MockResponder::new(Duration::ZERO);
        let creativity = Creativity::new(20);
        let generated = responder.generate(creativity, "سؤال").await.unwrap();
        assert_eq!(generated, compose_reply(creativity, "سؤال"));
    }
}
