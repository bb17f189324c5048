//! Repository seams. The activation engine and the message board only see
//! these traits; the in-memory implementations back tests and the demo host.

use std::collections::HashMap;

use crate::chat::ChatError;
use crate::state::Channel;
use crate::state::ChannelCategory;
use crate::state::JourneyStep;
use crate::state::Member;
use crate::state::Message;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("unknown journey step: {0}")]
    UnknownStep(String),
}

pub trait JourneyRepository: Send {
    fn steps(&self) -> Vec<JourneyStep>;

    /// Returns `Ok(false)` when the step was already complete.
    fn mark_completed(&mut self, step_id: &str) -> Result<bool, RepositoryError>;

    fn set_locked(&mut self, step_id: &str, locked: bool) -> Result<(), RepositoryError>;
}

pub trait ChannelStore: Send {
    fn categories(&self) -> Vec<ChannelCategory>;

    fn channel(&self, channel_id: &str) -> Option<Channel>;

    fn members(&self) -> Vec<Member>;

    /// Messages in display order, or `None` for an unknown channel.
    fn messages(&self, channel_id: &str) -> Option<Vec<Message>>;

    fn append(&mut self, channel_id: &str, message: Message) -> Result<(), ChatError>;

    /// Replaces the message with the same id.
    fn replace(&mut self, channel_id: &str, message: Message) -> Result<(), ChatError>;

    fn set_unread(&mut self, channel_id: &str, unread: u32) -> Result<(), ChatError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryJourneyRepository {
    steps: Vec<JourneyStep>,
}

impl InMemoryJourneyRepository {
    pub fn new(steps: Vec<JourneyStep>) -> Self {
        let steps = steps
            .into_iter()
            .map(|mut step| {
                if step.completed {
                    step.locked = false;
                }
                step
            })
            .collect();
        Self { steps }
    }

    fn step_mut(&mut self, step_id: &str) -> Result<&mut JourneyStep, RepositoryError> {
        self.steps
            .iter_mut()
            .find(|step| step.id == step_id)
            .ok_or_else(|| RepositoryError::UnknownStep(step_id.to_string()))
    }
}

impl JourneyRepository for InMemoryJourneyRepository {
    fn steps(&self) -> Vec<JourneyStep> {
        self.steps.clone()
    }

    fn mark_completed(&mut self, step_id: &str) -> Result<bool, RepositoryError> {
        let step = self.step_mut(step_id)?;
        if step.completed {
            return Ok(false);
        }
        step.completed = true;
        step.locked = false;
        Ok(true)
    }

    fn set_locked(&mut self, step_id: &str, locked: bool) -> Result<(), RepositoryError> {
        let step = self.step_mut(step_id)?;
        step.locked = locked && !step.completed;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryChannelStore {
    categories: Vec<ChannelCategory>,
    members: Vec<Member>,
    feeds: HashMap<String, Vec<Message>>,
}

impl InMemoryChannelStore {
    /// Messages keyed by a channel id that no category declares are dropped.
    pub fn new(
        categories: Vec<ChannelCategory>,
        members: Vec<Member>,
        messages: impl IntoIterator<Item = (String, Vec<Message>)>,
    ) -> Self {
        let mut feeds: HashMap<String, Vec<Message>> = categories
            .iter()
            .flat_map(|category| category.channels.iter())
            .map(|channel| (channel.id.clone(), Vec::new()))
            .collect();
        for (channel_id, seeded) in messages {
            let Some(feed) = feeds.get_mut(&channel_id) else {
                tracing::warn!(channel = %channel_id, "dropping messages for undeclared channel");
                continue;
            };
            feed.extend(seeded.into_iter().map(|mut message| {
                message.normalize_reactions();
                message
            }));
        }
        Self {
            categories,
            members,
            feeds,
        }
    }

    fn channel_mut(&mut self, channel_id: &str) -> Result<&mut Channel, ChatError> {
        self.categories
            .iter_mut()
            .flat_map(|category| category.channels.iter_mut())
            .find(|channel| channel.id == channel_id)
            .ok_or_else(|| ChatError::UnknownChannel(channel_id.to_string()))
    }

    fn feed_mut(&mut self, channel_id: &str) -> Result<&mut Vec<Message>, ChatError> {
        self.feeds
            .get_mut(channel_id)
            .ok_or_else(|| ChatError::UnknownChannel(channel_id.to_string()))
    }
}

impl ChannelStore for InMemoryChannelStore {
    fn categories(&self) -> Vec<ChannelCategory> {
        self.categories.clone()
    }

    fn channel(&self, channel_id: &str) -> Option<Channel> {
        self.categories
            .iter()
            .flat_map(|category| category.channels.iter())
            .find(|channel| channel.id == channel_id)
            .cloned()
    }

    fn members(&self) -> Vec<Member> {
        self.members.clone()
    }

    fn messages(&self, channel_id: &str) -> Option<Vec<Message>> {
        self.feeds.get(channel_id).cloned()
    }

    fn append(&mut self, channel_id: &str, message: Message) -> Result<(), ChatError> {
        self.feed_mut(channel_id)?.push(message);
        Ok(())
    }

    fn replace(&mut self, channel_id: &str, message: Message) -> Result<(), ChatError> {
        let feed = self.feed_mut(channel_id)?;
        let slot = feed
            .iter_mut()
            .find(|existing| existing.id == message.id)
            .ok_or_else(|| ChatError::UnknownMessage(message.id.clone()))?;
        *slot = message;
        Ok(())
    }

    fn set_unread(&mut self, channel_id: &str, unread: u32) -> Result<(), ChatError> {
        self.channel_mut(channel_id)?.unread = unread;
        Ok(())
    }
}
