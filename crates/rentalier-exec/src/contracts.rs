use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub channel_id: String,
    /// The user message that triggered the reply.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplyOutcome {
    Delivered { channel_id: String, content: String },
    Failed { channel_id: String, reason: String },
}

impl ReplyOutcome {
    pub fn channel_id(&self) -> &str {
        match self {
            Self::Delivered { channel_id, .. } | Self::Failed { channel_id, .. } => channel_id,
        }
    }
}
