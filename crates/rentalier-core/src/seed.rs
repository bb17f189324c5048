use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::state::ChannelCategory;
use crate::state::JourneyStep;
use crate::state::Member;
use crate::state::Message;
use crate::store::InMemoryChannelStore;
use crate::store::InMemoryJourneyRepository;

const BUILTIN_SEED: &str = include_str!("../fixtures/seed.yaml");

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to parse seed document: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub journey: Vec<JourneyStep>,
    pub categories: Vec<ChannelCategory>,
    pub members: Vec<Member>,
    pub messages: BTreeMap<String, Vec<Message>>,
}

impl SeedData {
    pub fn builtin() -> Result<Self, SeedError> {
        Self::from_yaml_str(BUILTIN_SEED)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn journey_repository(&self) -> InMemoryJourneyRepository {
        InMemoryJourneyRepository::new(self.journey.clone())
    }

    pub fn channel_store(&self) -> InMemoryChannelStore {
        InMemoryChannelStore::new(
            self.categories.clone(),
            self.members.clone(),
            self.messages.clone(),
        )
    }
}
