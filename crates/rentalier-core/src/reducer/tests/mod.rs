use chrono::NaiveDate;

pub(super) use super::reduce;
pub(super) use super::HostEffect;
pub(super) use super::HostServices;
pub(super) use crate::actions::HostAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::chat::MessageBoard;
pub(super) use crate::chat::MessageView;
pub(super) use crate::config::ChatConfig;
pub(super) use crate::config::Config;
pub(super) use crate::providers::FixedClock;
pub(super) use crate::providers::SequentialIds;
pub(super) use crate::seed::SeedData;
pub(super) use crate::state::ActivationPhase;
pub(super) use crate::state::HostState;
pub(super) use crate::state::JourneyStep;
pub(super) use crate::state::MilestoneEvent;
pub(super) use crate::state::Preferences;
pub(super) use crate::state::StepCategory;
pub(super) use crate::store::InMemoryJourneyRepository;

mod invariants;

const CURRENT_MEMBER: &str = "7";

fn seed() -> SeedData {
    SeedData::builtin().expect("builtin seed")
}

fn board(seed: &SeedData) -> MessageBoard {
    let at = NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|date| date.and_hms_opt(14, 5, 0))
        .expect("valid time");
    MessageBoard::new(
        Box::new(seed.channel_store()),
        Box::new(SequentialIds::new("msg")),
        Box::new(FixedClock(at)),
    )
}

fn harness_with(config: Config, preferences: Preferences) -> (HostState, HostServices) {
    let seed = seed();
    let mut services = HostServices::new(Box::new(seed.journey_repository()), board(&seed));
    let mut state = HostState::new(config, CURRENT_MEMBER, preferences).expect("state");
    run_runtime(&mut state, &mut services, RuntimeAction::RefreshProgress);
    (state, services)
}

fn harness() -> (HostState, HostServices) {
    harness_with(Config::default(), Preferences::default())
}

fn harness_with_steps(steps: Vec<JourneyStep>) -> (HostState, HostServices) {
    let seed = seed();
    let mut services = HostServices::new(
        Box::new(InMemoryJourneyRepository::new(steps)),
        board(&seed),
    );
    let mut state =
        HostState::new(Config::default(), CURRENT_MEMBER, Preferences::default()).expect("state");
    run_runtime(&mut state, &mut services, RuntimeAction::RefreshProgress);
    (state, services)
}

fn weighted_step(id: &str, weight: f64, completed: bool) -> JourneyStep {
    JourneyStep {
        id: id.to_string(),
        category: StepCategory::Identity,
        label: id.to_string(),
        benefit: None,
        href: None,
        completed,
        locked: false,
        unlock_at: None,
        xp: None,
        priority: 1,
        weight: Some(weight),
    }
}

fn run_user(
    state: &mut HostState,
    services: &mut HostServices,
    action: UserAction,
) -> Vec<HostEffect> {
    reduce(state, services, HostAction::User(action))
}

fn run_runtime(
    state: &mut HostState,
    services: &mut HostServices,
    action: RuntimeAction,
) -> Vec<HostEffect> {
    reduce(state, services, HostAction::Runtime(action))
}

fn complete(state: &mut HostState, services: &mut HostServices, step_id: &str) -> Vec<HostEffect> {
    run_user(
        state,
        services,
        UserAction::CompleteStep {
            step_id: step_id.to_string(),
        },
    )
}

fn send(
    state: &mut HostState,
    services: &mut HostServices,
    channel_id: &str,
    content: &str,
) -> Vec<HostEffect> {
    run_user(
        state,
        services,
        UserAction::SendMessage {
            channel_id: channel_id.to_string(),
            content: content.to_string(),
        },
    )
}

fn open(state: &mut HostState, services: &mut HostServices, channel_id: &str) -> Vec<HostEffect> {
    run_user(
        state,
        services,
        UserAction::OpenChannel {
            channel_id: channel_id.to_string(),
        },
    )
}

fn scheduled(effects: &[HostEffect]) -> Vec<&str> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            HostEffect::ScheduleReply { channel_id, .. } => Some(channel_id.as_str()),
            _ => None,
        })
        .collect()
}

fn celebrations(effects: &[HostEffect]) -> Vec<MilestoneEvent> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            HostEffect::Celebrate(event) => Some(*event),
            _ => None,
        })
        .collect()
}

fn message_ids(services: &HostServices, channel_id: &str) -> Vec<String> {
    services
        .board
        .get_messages(channel_id)
        .into_iter()
        .map(|message| message.id)
        .collect()
}

fn action_ids(state: &HostState) -> Vec<&str> {
    state
        .activation
        .report
        .next_actions
        .iter()
        .map(|step| step.id.as_str())
        .collect()
}
