use super::state::UiTheme;

#[derive(Debug, Clone)]
pub enum HostAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone)]
pub enum UserAction {
    CompleteStep {
        step_id: String,
    },
    DismissCelebration,
    CompleteOnboarding,
    SetTheme(UiTheme),
    CycleTheme,
    OpenChannel {
        channel_id: String,
    },
    CloseChannel,
    CloseCommunity,
    SendMessage {
        channel_id: String,
        content: String,
    },
    ToggleReaction {
        channel_id: String,
        message_id: String,
        emoji: String,
    },
    SetSearchQuery(String),
    ClearSearch,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    RefreshProgress,
    AssistantReplyReady {
        channel_id: String,
        content: String,
    },
    AssistantReplyFailed {
        channel_id: String,
        reason: String,
    },
}
