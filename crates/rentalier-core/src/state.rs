use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::chat::TriggerRule;
use crate::config::Config;
use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCategory {
    Identity,
    Company,
    Properties,
    Ai,
    Directory,
    Website,
    Social,
}

impl StepCategory {
    pub const ALL: [Self; 7] = [
        Self::Identity,
        Self::Company,
        Self::Properties,
        Self::Ai,
        Self::Directory,
        Self::Website,
        Self::Social,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Company => "Company",
            Self::Properties => "Properties",
            Self::Ai => "AI Concierge",
            Self::Directory => "Directory",
            Self::Website => "Website",
            Self::Social => "Social",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Identity => "A clear identity builds trust fast, especially on first click.",
            Self::Company => "Brand your hosting business so guests remember it.",
            Self::Properties => "Showcase your portfolio to drive bookings.",
            Self::Ai => "Train your AI to represent your brand.",
            Self::Directory => "Get listed where travellers look for trusted hosts.",
            Self::Website => "Publish a direct-booking site of your own.",
            Self::Social => "Connect the channels your guests already follow.",
        }
    }
}

/// One actionable onboarding task.
///
/// `xp` is signed so that malformed seed data can be represented and then
/// neutralised by the activation engine instead of rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyStep {
    pub id: String,
    pub category: StepCategory,
    pub label: String,
    #[serde(default)]
    pub benefit: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub unlock_at: Option<u8>,
    #[serde(default)]
    pub xp: Option<i64>,
    pub priority: u32,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPhase {
    Foundation,
    Visibility,
    Authority,
    CertifiedAuthority,
}

impl ActivationPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Foundation => "Foundation",
            Self::Visibility => "Visibility",
            Self::Authority => "Authority",
            Self::CertifiedAuthority => "Certified Authority",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Foundation => "Lay the groundwork guests need to trust you.",
            Self::Visibility => "People can now discover you in the directory.",
            Self::Authority => "Your profile carries weight with guests and peers.",
            Self::CertifiedAuthority => "Fully activated. Every surface is live.",
        }
    }
}

/// One-shot celebration fired when progress first crosses a milestone.
/// Variant names follow the default thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MilestoneEvent {
    #[serde(rename = "unlocked_60")]
    Unlocked60,
    #[serde(rename = "unlocked_80")]
    Unlocked80,
    #[serde(rename = "completed_100")]
    Completed100,
}

impl MilestoneEvent {
    pub fn key(self) -> &'static str {
        match self {
            Self::Unlocked60 => "unlocked_60",
            Self::Unlocked80 => "unlocked_80",
            Self::Completed100 => "completed_100",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::Unlocked60 => "Visibility unlocked! People can now discover you.",
            Self::Unlocked80 => "Authority reached! Your profile now stands out.",
            Self::Completed100 => "Certified Authority! Your activation is complete.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub percentage: u8,
    pub phase: ActivationPhase,
    pub next_actions: Vec<JourneyStep>,
}

impl Default for ProgressReport {
    fn default() -> Self {
        Self {
            percentage: 0,
            phase: ActivationPhase::Foundation,
            next_actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub category: StepCategory,
    pub title: &'static str,
    pub description: &'static str,
    pub step_ids: Vec<String>,
    pub completed_count: usize,
    pub total_count: usize,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Text,
    Voice,
    Announcement,
}

impl ChannelKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
            Self::Announcement => "announcement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
    #[serde(default)]
    pub unread: u32,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCategory {
    pub id: String,
    pub name: String,
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Online,
    Idle,
    Dnd,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Moderator,
    Pro,
    Member,
    Assistant,
}

impl MemberRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Pro => "pro",
            Self::Member => "member",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    pub status: MemberStatus,
    pub role: MemberRole,
    #[serde(default)]
    pub activity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub count: u32,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// Member id of the author.
    pub author: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl Message {
    /// Merges duplicate emoji entries and drops zero-count ones so that
    /// reaction lists read from external data satisfy the toggle invariants.
    pub fn normalize_reactions(&mut self) {
        let mut merged: Vec<Reaction> = Vec::with_capacity(self.reactions.len());
        for reaction in self.reactions.drain(..) {
            match merged.iter_mut().find(|r| r.emoji == reaction.emoji) {
                Some(existing) => {
                    existing.count = existing.count.saturating_add(reaction.count);
                    existing.active |= reaction.active;
                }
                None => merged.push(reaction),
            }
        }
        merged.retain(|r| r.count > 0);
        self.reactions = merged;
    }

    pub fn reaction(&self, emoji: &str) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.emoji == emoji)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiTheme {
    #[default]
    System,
    Light,
    Dark,
}

impl UiTheme {
    pub fn label(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::System => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
        }
    }
}

/// Flags that outlive a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: UiTheme,
    pub onboarding_completed: bool,
    pub celebrated: BTreeSet<MilestoneEvent>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivationState {
    pub report: ProgressReport,
    pub stages: Vec<StageSummary>,
    pub xp_earned: u64,
    pub xp_available: u64,
    pub celebration: Option<MilestoneEvent>,
}

/// View-scoped chat state. Message histories live in the channel store.
#[derive(Debug, Clone)]
pub struct ChatState {
    pub open_channel: Option<String>,
    pub pending_replies: BTreeSet<String>,
    pub search_query: String,
    pub trigger: TriggerRule,
}

impl ChatState {
    /// The typing indicator only shows for the channel currently on screen.
    pub fn is_typing(&self, channel_id: &str) -> bool {
        self.open_channel.as_deref() == Some(channel_id)
            && self.pending_replies.contains(channel_id)
    }

    pub fn has_pending_reply(&self, channel_id: &str) -> bool {
        self.pending_replies.contains(channel_id)
    }
}

#[derive(Debug, Clone)]
pub struct HostState {
    pub config: Config,
    pub current_member: String,
    pub preferences: Preferences,
    pub activation: ActivationState,
    pub chat: ChatState,
}

impl HostState {
    pub fn new(
        config: Config,
        current_member: impl Into<String>,
        preferences: Preferences,
    ) -> Result<Self, ConfigError> {
        config.activation.milestones.validate()?;
        let trigger = TriggerRule::new(&config.chat)?;
        Ok(Self {
            config,
            current_member: current_member.into(),
            preferences,
            activation: ActivationState::default(),
            chat: ChatState {
                open_channel: None,
                pending_replies: BTreeSet::new(),
                search_query: String::new(),
                trigger,
            },
        })
    }
}
