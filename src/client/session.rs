//! Chat front-end logic
//!
//! Everything the chat widget decides besides rendering: when to fall back to
//! an offline compliment, what to tell the user about the failure, whether to
//! offer the manual retry, and when to add a follow-up prompt.

use super::requester::{RequestError, ResilientRequester};
use crate::fallback::{self, FallbackCategory};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chance of a follow-up prompt after an AI reply
const FOLLOW_UP_PROBABILITY: f64 = 0.3;

const FOLLOW_UPS: [&str; 7] = [
    "또 어떤 이야기가 있으신가요? 😊",
    "다른 얘기도 들려주세요! 🌟",
    "당신과 더 많은 이야기를 나누고 싶어요! 💫",
    "오늘 하루는 어떠셨나요? ✨",
    "무엇이든 편하게 이야기해주세요! 🤗",
    "당신의 다음 이야기가 궁금해요! 📚",
    "혹시 다른 고민이나 기쁜 일은 없으신가요? 💝",
];

const NOTICE_OVERLOADED: &str = "AI가 현재 많이 바빠서 기본 칭찬을 드릴게요!";
const NOTICE_NETWORK: &str = "인터넷 연결을 확인해주세요! 지금은 기본 칭찬으로 응원할게요 📶✨";
const NOTICE_GENERIC: &str = "현재 AI 서버 연결에 문제가 있어 기본 칭찬을 드렸어요!";

const RETRY_SUCCEEDED: &str = "✅ 재시도 성공!";
const RETRY_FAILED_TEXT: &str = "재시도도 실패했어요. 조금 더 기다려주세요! 🤗";
const RETRY_FAILED_NOTE: &str = "💔 AI 서버가 정말 바쁜가봐요";

/// Explanation attached to a fallback compliment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureNotice {
    pub explanation: &'static str,
    pub retry_offered: bool,
}

impl FailureNotice {
    fn for_error(error: &RequestError) -> Self {
        let explanation = match error {
            RequestError::Overloaded => NOTICE_OVERLOADED,
            RequestError::Network(_) => NOTICE_NETWORK,
            RequestError::Server { .. } => NOTICE_GENERIC,
        };
        Self {
            explanation,
            retry_offered: error.offers_retry(),
        }
    }
}

/// Where a bot reply came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Ai,
    RetriedAi,
    Fallback(FailureNotice),
    RetryFailed,
}

/// One bot turn as the widget should display it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReply {
    pub text: String,
    pub source: ReplySource,
    pub follow_up: Option<&'static str>,
}

impl BotReply {
    /// Small print under the reply, if any
    pub fn note(&self) -> Option<&'static str> {
        match &self.source {
            ReplySource::Ai => None,
            ReplySource::RetriedAi => Some(RETRY_SUCCEEDED),
            ReplySource::Fallback(notice) => Some(notice.explanation),
            ReplySource::RetryFailed => Some(RETRY_FAILED_NOTE),
        }
    }

    pub fn retry_offered(&self) -> bool {
        matches!(
            self.source,
            ReplySource::Fallback(FailureNotice {
                retry_offered: true,
                ..
            })
        )
    }
}

/// Chat session driving the requester with an injectable random source
pub struct ChatSession<R = StdRng> {
    requester: ResilientRequester,
    rng: R,
}

impl ChatSession<StdRng> {
    pub fn new(requester: ResilientRequester) -> Self {
        Self::with_rng(requester, StdRng::from_entropy())
    }
}

impl<R: Rng> ChatSession<R> {
    pub fn with_rng(requester: ResilientRequester, rng: R) -> Self {
        Self { requester, rng }
    }

    /// Reply to user input. Blank input sends nothing and yields `None`.
    pub async fn respond(&mut self, input: &str) -> Option<BotReply> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }

        let reply = match self.requester.request(message, false).await {
            Ok(text) => {
                let follow_up = self.maybe_follow_up();
                BotReply {
                    text,
                    source: ReplySource::Ai,
                    follow_up,
                }
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    status = error.status(),
                    category = FallbackCategory::classify(message).as_str(),
                    "AI reply unavailable, using fallback compliment"
                );
                BotReply {
                    text: fallback::generate_with(message, &mut self.rng),
                    source: ReplySource::Fallback(FailureNotice::for_error(&error)),
                    follow_up: None,
                }
            }
        };
        Some(reply)
    }

    /// User-triggered retry of a message that previously fell back
    pub async fn retry(&mut self, message: &str) -> BotReply {
        match self.requester.request(message, true).await {
            Ok(text) => BotReply {
                text,
                source: ReplySource::RetriedAi,
                follow_up: None,
            },
            Err(error) => {
                tracing::warn!(%error, "Manual retry failed");
                BotReply {
                    text: RETRY_FAILED_TEXT.to_string(),
                    source: ReplySource::RetryFailed,
                    follow_up: None,
                }
            }
        }
    }

    fn maybe_follow_up(&mut self) -> Option<&'static str> {
        if self.rng.gen_bool(FOLLOW_UP_PROBABILITY) {
            Some(FOLLOW_UPS[self.rng.gen_range(0..FOLLOW_UPS.len())])
        } else {
            None
        }
    }
}
