use std::time::Duration;

use async_trait::async_trait;

use crate::contracts::ReplyRequest;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplyError {
    #[error("reply producer unavailable: {0}")]
    Unavailable(String),
}

/// Source of assistant reply text.
#[async_trait]
pub trait ReplyProducer: Send + Sync {
    async fn produce_reply(&self, request: &ReplyRequest) -> Result<String, ReplyError>;
}

/// Waits a fixed delay, then answers every request with the same text.
#[derive(Debug, Clone)]
pub struct ScriptedReplyProducer {
    delay: Duration,
    reply: String,
}

impl ScriptedReplyProducer {
    pub fn new(delay: Duration, reply: impl Into<String>) -> Self {
        Self {
            delay,
            reply: reply.into(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl ReplyProducer for ScriptedReplyProducer {
    async fn produce_reply(&self, _request: &ReplyRequest) -> Result<String, ReplyError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}
