use std::sync::Arc;
use std::time::Duration;

use rentalier_core::actions::HostAction;
use rentalier_core::actions::RuntimeAction;
use rentalier_core::actions::UserAction;
use rentalier_core::chat::MessageBoard;
use rentalier_core::config::Config;
use rentalier_core::config::ConfigError;
use rentalier_core::persistence::PreferenceStore;
use rentalier_core::persistence::PreferencesError;
use rentalier_core::providers::Clock;
use rentalier_core::providers::IdProvider;
use rentalier_core::reducer::reduce;
use rentalier_core::reducer::HostEffect;
use rentalier_core::reducer::HostServices;
use rentalier_core::seed::SeedData;
use rentalier_core::state::HostState;
use rentalier_core::state::MilestoneEvent;
use rentalier_core::state::Preferences;
use rentalier_exec::contracts::ReplyOutcome;
use rentalier_exec::contracts::ReplyRequest;
use rentalier_exec::producer::ReplyProducer;
use rentalier_exec::producer::ScriptedReplyProducer;
use rentalier_exec::scheduler::ReplyScheduler;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
}

/// Drives the reducer and carries out the effects it emits.
pub struct Host {
    pub state: HostState,
    pub services: HostServices,
    scheduler: ReplyScheduler,
    outcomes: mpsc::UnboundedReceiver<ReplyOutcome>,
    preferences: Option<PreferenceStore>,
    celebrations: Vec<MilestoneEvent>,
}

pub struct HostOptions {
    pub config: Config,
    pub seed: SeedData,
    pub current_member: String,
    pub preferences: Option<PreferenceStore>,
    pub ids: Box<dyn IdProvider>,
    pub clock: Box<dyn Clock>,
}

impl Host {
    pub fn new(options: HostOptions) -> Result<Self, HostError> {
        let producer = ScriptedReplyProducer::new(
            Duration::from_millis(options.config.chat.reply_delay_ms),
            options.config.chat.assistant_reply.clone(),
        );
        Self::with_producer(options, Arc::new(producer))
    }

    pub fn with_producer(
        options: HostOptions,
        producer: Arc<dyn ReplyProducer>,
    ) -> Result<Self, HostError> {
        let saved = match &options.preferences {
            Some(store) => store.load()?,
            None => Preferences::default(),
        };
        let state = HostState::new(options.config, options.current_member, saved)?;
        let board = MessageBoard::new(
            Box::new(options.seed.channel_store()),
            options.ids,
            options.clock,
        );
        let services = HostServices::new(Box::new(options.seed.journey_repository()), board);
        let (scheduler, outcomes) = ReplyScheduler::new(producer);

        let mut host = Self {
            state,
            services,
            scheduler,
            outcomes,
            preferences: options.preferences,
            celebrations: Vec::new(),
        };
        host.dispatch(HostAction::Runtime(RuntimeAction::RefreshProgress))?;
        Ok(host)
    }

    pub fn user(&mut self, action: UserAction) -> Result<(), HostError> {
        self.dispatch(HostAction::User(action))
    }

    pub fn dispatch(&mut self, action: HostAction) -> Result<(), HostError> {
        for effect in reduce(&mut self.state, &mut self.services, action) {
            self.apply(effect)?;
        }
        Ok(())
    }

    /// Waits until every scheduled reply has landed or failed.
    pub async fn settle(&mut self) -> Result<(), HostError> {
        while self.scheduler.pending_count() > 0 {
            let Some(outcome) = self.outcomes.recv().await else {
                break;
            };
            self.deliver(outcome)?;
        }
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.deliver(outcome)?;
        }
        Ok(())
    }

    /// Milestones fired since the last call.
    pub fn take_celebrations(&mut self) -> Vec<MilestoneEvent> {
        std::mem::take(&mut self.celebrations)
    }

    pub fn pending_replies(&self) -> usize {
        self.scheduler.pending_count()
    }

    fn deliver(&mut self, outcome: ReplyOutcome) -> Result<(), HostError> {
        let action = match outcome {
            ReplyOutcome::Delivered {
                channel_id,
                content,
            } => RuntimeAction::AssistantReplyReady {
                channel_id,
                content,
            },
            ReplyOutcome::Failed { channel_id, reason } => {
                RuntimeAction::AssistantReplyFailed { channel_id, reason }
            }
        };
        self.dispatch(HostAction::Runtime(action))
    }

    fn apply(&mut self, effect: HostEffect) -> Result<(), HostError> {
        match effect {
            HostEffect::RequestFrame => {}
            HostEffect::ScheduleReply {
                channel_id,
                content,
            } => {
                let request = ReplyRequest {
                    channel_id: channel_id.clone(),
                    content,
                };
                if !self.scheduler.schedule(request) {
                    warn!(channel = %channel_id, "scheduler refused reply; releasing pending marker");
                    self.dispatch(HostAction::Runtime(RuntimeAction::AssistantReplyFailed {
                        channel_id,
                        reason: "a reply is already in flight".to_string(),
                    }))?;
                }
            }
            HostEffect::CancelReply { channel_id } => {
                self.scheduler.cancel(&channel_id);
            }
            HostEffect::Celebrate(event) => {
                info!(milestone = event.key(), "celebration");
                self.celebrations.push(event);
            }
            HostEffect::PersistPreferences(preferences) => match &self.preferences {
                Some(store) => {
                    store.save(&preferences)?;
                    debug!(path = %store.path().display(), "preferences saved");
                }
                None => debug!("preferences not persisted; no store configured"),
            },
        }
        Ok(())
    }
}
