use tracing::debug;
use tracing::info;
use tracing::warn;

use super::actions::HostAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::activation::compute_progress_with;
use super::activation::is_locked;
use super::activation::lock_changes;
use super::activation::progress_percentage;
use super::activation::stage_summaries;
use super::activation::xp_available;
use super::activation::xp_earned;
use super::chat::MessageBoard;
use super::chat::MessageView;
use super::state::HostState;
use super::state::MilestoneEvent;
use super::state::Preferences;
use super::store::JourneyRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEffect {
    RequestFrame,
    ScheduleReply { channel_id: String, content: String },
    CancelReply { channel_id: String },
    Celebrate(MilestoneEvent),
    PersistPreferences(Preferences),
}

/// The injected collaborators the reducer reads and writes through.
pub struct HostServices {
    pub journey: Box<dyn JourneyRepository>,
    pub board: MessageBoard,
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("board", &self.board)
            .finish_non_exhaustive()
    }
}

impl HostServices {
    pub fn new(journey: Box<dyn JourneyRepository>, board: MessageBoard) -> Self {
        Self { journey, board }
    }

    /// Current feed for `channel_id` filtered by the active search query.
    pub fn visible_messages(&self, state: &HostState, channel_id: &str) -> MessageView {
        self.board
            .visible_messages(channel_id, &state.chat.search_query)
    }
}

pub fn reduce(
    state: &mut HostState,
    services: &mut HostServices,
    action: HostAction,
) -> Vec<HostEffect> {
    match action {
        HostAction::User(user) => reduce_user(state, services, user),
        HostAction::Runtime(runtime) => reduce_runtime(state, services, runtime),
    }
}

fn reduce_user(
    state: &mut HostState,
    services: &mut HostServices,
    action: UserAction,
) -> Vec<HostEffect> {
    match action {
        UserAction::CompleteStep { step_id } => complete_step(state, services, &step_id),
        UserAction::DismissCelebration => {
            if state.activation.celebration.take().is_none() {
                return Vec::new();
            }
            vec![HostEffect::RequestFrame]
        }
        UserAction::CompleteOnboarding => {
            if state.preferences.onboarding_completed {
                return Vec::new();
            }
            state.preferences.onboarding_completed = true;
            vec![
                HostEffect::PersistPreferences(state.preferences.clone()),
                HostEffect::RequestFrame,
            ]
        }
        UserAction::SetTheme(theme) => {
            state.preferences.theme = theme;
            vec![
                HostEffect::PersistPreferences(state.preferences.clone()),
                HostEffect::RequestFrame,
            ]
        }
        UserAction::CycleTheme => {
            state.preferences.theme = state.preferences.theme.next();
            vec![
                HostEffect::PersistPreferences(state.preferences.clone()),
                HostEffect::RequestFrame,
            ]
        }
        UserAction::OpenChannel { channel_id } => {
            if let Err(err) = services.board.mark_read(&channel_id) {
                debug!(channel = %channel_id, error = %err, "open channel ignored");
                return Vec::new();
            }
            if state.chat.open_channel.as_deref() != Some(channel_id.as_str()) {
                state.chat.search_query.clear();
            }
            state.chat.open_channel = Some(channel_id);
            vec![HostEffect::RequestFrame]
        }
        UserAction::CloseChannel => {
            state.chat.open_channel = None;
            state.chat.search_query.clear();
            vec![HostEffect::RequestFrame]
        }
        UserAction::CloseCommunity => {
            state.chat.open_channel = None;
            state.chat.search_query.clear();
            let mut effects: Vec<HostEffect> = std::mem::take(&mut state.chat.pending_replies)
                .into_iter()
                .map(|channel_id| {
                    debug!(channel = %channel_id, "cancelling pending reply");
                    HostEffect::CancelReply { channel_id }
                })
                .collect();
            effects.push(HostEffect::RequestFrame);
            effects
        }
        UserAction::SendMessage {
            channel_id,
            content,
        } => send_message(state, services, channel_id, content),
        UserAction::ToggleReaction {
            channel_id,
            message_id,
            emoji,
        } => match services
            .board
            .toggle_reaction(&channel_id, &message_id, &emoji)
        {
            Ok(_) => vec![HostEffect::RequestFrame],
            Err(err) => {
                debug!(channel = %channel_id, message_id = %message_id, error = %err, "reaction ignored");
                Vec::new()
            }
        },
        UserAction::SetSearchQuery(query) => {
            state.chat.search_query = query;
            vec![HostEffect::RequestFrame]
        }
        UserAction::ClearSearch => {
            state.chat.search_query.clear();
            vec![HostEffect::RequestFrame]
        }
    }
}

fn reduce_runtime(
    state: &mut HostState,
    services: &mut HostServices,
    action: RuntimeAction,
) -> Vec<HostEffect> {
    match action {
        RuntimeAction::RefreshProgress => {
            refresh_activation(state, services);
            vec![HostEffect::RequestFrame]
        }
        RuntimeAction::AssistantReplyReady {
            channel_id,
            content,
        } => {
            // Data-scoped: applies whether or not the channel is still open.
            if !state.chat.pending_replies.remove(&channel_id) {
                debug!(channel = %channel_id, "reply arrived without a pending marker");
            }
            let author = state.config.chat.assistant_member_id.clone();
            if let Err(err) = services.board.post_reply(&channel_id, &author, &content) {
                warn!(channel = %channel_id, error = %err, "assistant reply dropped");
                return vec![HostEffect::RequestFrame];
            }
            if state.chat.open_channel.as_deref() != Some(channel_id.as_str()) {
                if let Err(err) = services.board.bump_unread(&channel_id) {
                    warn!(channel = %channel_id, error = %err, "unread counter not updated");
                }
            }
            vec![HostEffect::RequestFrame]
        }
        RuntimeAction::AssistantReplyFailed { channel_id, reason } => {
            state.chat.pending_replies.remove(&channel_id);
            warn!(channel = %channel_id, %reason, "assistant reply failed");
            vec![HostEffect::RequestFrame]
        }
    }
}

fn send_message(
    state: &mut HostState,
    services: &mut HostServices,
    channel_id: String,
    content: String,
) -> Vec<HostEffect> {
    let message = match services
        .board
        .send_message(&channel_id, &state.current_member, &content)
    {
        Ok(message) => message,
        Err(err) => {
            debug!(channel = %channel_id, error = %err, "message rejected");
            return Vec::new();
        }
    };

    let mut effects = Vec::new();
    if state.chat.trigger.matches(&channel_id, &message.content) {
        if state.chat.pending_replies.insert(channel_id.clone()) {
            debug!(channel = %channel_id, "scheduling assistant reply");
            effects.push(HostEffect::ScheduleReply {
                channel_id,
                content: message.content,
            });
        } else {
            debug!(channel = %channel_id, "assistant reply already pending");
        }
    }
    effects.push(HostEffect::RequestFrame);
    effects
}

fn complete_step(
    state: &mut HostState,
    services: &mut HostServices,
    step_id: &str,
) -> Vec<HostEffect> {
    let steps = services.journey.steps();
    let Some(step) = steps.iter().find(|step| step.id == step_id) else {
        debug!(step = %step_id, "unknown step");
        return Vec::new();
    };
    if step.completed {
        return Vec::new();
    }
    if is_locked(step, &steps) {
        debug!(step = %step_id, "step is locked");
        return Vec::new();
    }
    let previous = progress_percentage(&steps);
    match services.journey.mark_completed(step_id) {
        Ok(true) => {}
        Ok(false) => return Vec::new(),
        Err(err) => {
            warn!(step = %step_id, error = %err, "step completion failed");
            return Vec::new();
        }
    }

    refresh_activation(state, services);
    let current = state.activation.report.percentage;

    let mut effects = Vec::new();
    if let Some(event) = state
        .config
        .activation
        .milestones
        .detect_crossing(previous, current)
    {
        if state.preferences.celebrated.insert(event) {
            info!(milestone = event.key(), previous, current, "milestone reached");
            state.activation.celebration = Some(event);
            effects.push(HostEffect::Celebrate(event));
            effects.push(HostEffect::PersistPreferences(state.preferences.clone()));
        } else {
            debug!(milestone = event.key(), "milestone already celebrated");
        }
    }
    effects.push(HostEffect::RequestFrame);
    effects
}

/// Recomputes the derived activation view. Locks are evaluated from the
/// completed flags and written back before the report is built.
fn refresh_activation(state: &mut HostState, services: &mut HostServices) {
    let steps = services.journey.steps();
    for (step_id, locked) in lock_changes(&steps) {
        match services.journey.set_locked(&step_id, locked) {
            Ok(()) => debug!(step = %step_id, locked, "lock status changed"),
            Err(err) => warn!(step = %step_id, error = %err, "lock update failed"),
        }
    }

    let steps = services.journey.steps();
    state.activation.report = compute_progress_with(&steps, &state.config.activation);
    state.activation.stages = stage_summaries(&steps);
    state.activation.xp_earned = xp_earned(&steps);
    state.activation.xp_available = xp_available(&steps);
}

#[cfg(test)]
mod tests;
