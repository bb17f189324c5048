use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid trigger keywords: {0}")]
    TriggerPattern(#[from] regex::Error),
    #[error(
        "milestone thresholds must satisfy 0 < visibility < authority < certified <= 100, \
         got {visibility}/{authority}/{certified}"
    )]
    MilestoneOrder {
        visibility: u8,
        authority: u8,
        certified: u8,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub activation: ActivationConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ActivationConfig {
    pub milestones: MilestoneThresholds,
    pub next_action_limit: usize,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            milestones: MilestoneThresholds::default(),
            next_action_limit: 3,
        }
    }
}

/// Percentage thresholds that open the Visibility, Authority and Certified
/// Authority phases. Each one also fires its celebration event when crossed.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct MilestoneThresholds {
    pub visibility: u8,
    pub authority: u8,
    pub certified: u8,
}

impl MilestoneThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            visibility,
            authority,
            certified,
        } = *self;
        if 0 < visibility && visibility < authority && authority < certified && certified <= 100 {
            Ok(())
        } else {
            Err(ConfigError::MilestoneOrder {
                visibility,
                authority,
                certified,
            })
        }
    }
}

impl Default for MilestoneThresholds {
    fn default() -> Self {
        Self {
            visibility: 60,
            authority: 80,
            certified: 100,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    pub reply_delay_ms: u64,
    pub trigger_keywords: Vec<String>,
    pub auto_respond_channels: Vec<String>,
    pub assistant_reply: String,
    pub assistant_member_id: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: 3000,
            trigger_keywords: vec!["jaine".to_string()],
            auto_respond_channels: Vec::new(),
            assistant_reply: "JAiNE here. I've logged your question and pulled the latest \
                              benchmarks for your market. Check Insights for the breakdown."
                .to_string(),
            assistant_member_id: "jaine".to_string(),
        }
    }
}
