use std::collections::BTreeSet;

use regex::Regex;
use regex::RegexBuilder;

use crate::config::ChatConfig;
use crate::providers::Clock;
use crate::providers::IdProvider;
use crate::state::Channel;
use crate::state::ChannelCategory;
use crate::state::Member;
use crate::state::MemberStatus;
use crate::state::Message;
use crate::state::Reaction;
use crate::store::ChannelStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("message content is empty")]
    EmptyContent,
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("channel is locked: {0}")]
    ChannelLocked(String),
    #[error("unknown message: {0}")]
    UnknownMessage(String),
}

/// Decides whether a message earns an automated reply: a case-insensitive
/// keyword hit in the content, or a post in an auto-respond channel.
#[derive(Debug, Clone)]
pub struct TriggerRule {
    keywords: Option<Regex>,
    channels: BTreeSet<String>,
}

impl TriggerRule {
    pub fn new(config: &ChatConfig) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = config
            .trigger_keywords
            .iter()
            .map(|keyword| keyword.trim())
            .filter(|keyword| !keyword.is_empty())
            .map(regex::escape)
            .collect();
        let keywords = if alternatives.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&alternatives.join("|"))
                    .case_insensitive(true)
                    .build()?,
            )
        };
        Ok(Self {
            keywords,
            channels: config.auto_respond_channels.iter().cloned().collect(),
        })
    }

    pub fn matches(&self, channel_id: &str, content: &str) -> bool {
        self.channels.contains(channel_id)
            || self
                .keywords
                .as_ref()
                .is_some_and(|keywords| keywords.is_match(content))
    }
}

/// Flips the current user's reaction. Not idempotent: a retried call flips
/// again, and two calls cancel out on every reaction's `{count, active}`.
///
/// A reaction that drops to zero is removed outright, so toggling it back
/// appends it after the others instead of at its old position.
pub fn toggle_reaction_in(reactions: &mut Vec<Reaction>, emoji: &str) {
    let Some(index) = reactions.iter().position(|r| r.emoji == emoji) else {
        reactions.push(Reaction {
            emoji: emoji.to_string(),
            count: 1,
            active: true,
        });
        return;
    };

    let reaction = &mut reactions[index];
    if reaction.active {
        if reaction.count <= 1 {
            reactions.remove(index);
        } else {
            reaction.count -= 1;
            reaction.active = false;
        }
    } else {
        reaction.count = reaction.count.saturating_add(1);
        reaction.active = true;
    }
}

/// Search projection over a channel feed. `NoMessages` and `NoMatches` are
/// distinct so the view can pick different empty-state copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageView {
    NoMessages,
    All(Vec<Message>),
    Matches(Vec<Message>),
    NoMatches,
}

impl MessageView {
    pub fn messages(&self) -> &[Message] {
        match self {
            Self::All(messages) | Self::Matches(messages) => messages,
            Self::NoMessages | Self::NoMatches => &[],
        }
    }
}

pub fn filter_messages(messages: &[Message], members: &[Member], query: &str) -> MessageView {
    if messages.is_empty() {
        return MessageView::NoMessages;
    }
    let query = query.trim();
    if query.is_empty() {
        return MessageView::All(messages.to_vec());
    }

    let needle = query.to_lowercase();
    let author_name = |author: &str| {
        members
            .iter()
            .find(|member| member.id == author)
            .map(|member| member.name.to_lowercase())
    };
    let matches: Vec<Message> = messages
        .iter()
        .filter(|message| {
            message.content.to_lowercase().contains(&needle)
                || author_name(&message.author).is_some_and(|name| name.contains(&needle))
        })
        .cloned()
        .collect();

    if matches.is_empty() {
        MessageView::NoMatches
    } else {
        MessageView::Matches(matches)
    }
}

/// Channel-keyed message operations on top of an injected store.
pub struct MessageBoard {
    store: Box<dyn ChannelStore>,
    ids: Box<dyn IdProvider>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for MessageBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBoard").finish_non_exhaustive()
    }
}

impl MessageBoard {
    pub fn new(
        store: Box<dyn ChannelStore>,
        ids: Box<dyn IdProvider>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self { store, ids, clock }
    }

    pub fn categories(&self) -> Vec<ChannelCategory> {
        self.store.categories()
    }

    pub fn channel(&self, channel_id: &str) -> Option<Channel> {
        self.store.channel(channel_id)
    }

    pub fn members(&self) -> Vec<Member> {
        self.store.members()
    }

    pub fn online_members(&self) -> Vec<Member> {
        self.store
            .members()
            .into_iter()
            .filter(|member| member.status != MemberStatus::Offline)
            .collect()
    }

    /// Empty for an unknown channel.
    pub fn get_messages(&self, channel_id: &str) -> Vec<Message> {
        self.store.messages(channel_id).unwrap_or_default()
    }

    pub fn visible_messages(&self, channel_id: &str, query: &str) -> MessageView {
        filter_messages(
            &self.get_messages(channel_id),
            &self.store.members(),
            query,
        )
    }

    pub fn send_message(
        &mut self,
        channel_id: &str,
        author: &str,
        content: &str,
    ) -> Result<Message, ChatError> {
        let channel = self
            .store
            .channel(channel_id)
            .ok_or_else(|| ChatError::UnknownChannel(channel_id.to_string()))?;
        if channel.locked {
            return Err(ChatError::ChannelLocked(channel_id.to_string()));
        }
        self.append(channel_id, author, content)
    }

    /// Data-scoped append for automated replies; locked channels accept
    /// them.
    pub fn post_reply(
        &mut self,
        channel_id: &str,
        author: &str,
        content: &str,
    ) -> Result<Message, ChatError> {
        self.append(channel_id, author, content)
    }

    fn append(&mut self, channel_id: &str, author: &str, content: &str) -> Result<Message, ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyContent);
        }
        let message = Message {
            id: self.ids.next_id(),
            author: author.to_string(),
            content: content.to_string(),
            timestamp: self.clock.timestamp(),
            reactions: Vec::new(),
        };
        self.store.append(channel_id, message.clone())?;
        Ok(message)
    }

    pub fn toggle_reaction(
        &mut self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<Message, ChatError> {
        let mut message = self
            .store
            .messages(channel_id)
            .ok_or_else(|| ChatError::UnknownChannel(channel_id.to_string()))?
            .into_iter()
            .find(|message| message.id == message_id)
            .ok_or_else(|| ChatError::UnknownMessage(message_id.to_string()))?;
        toggle_reaction_in(&mut message.reactions, emoji);
        self.store.replace(channel_id, message.clone())?;
        Ok(message)
    }

    pub fn mark_read(&mut self, channel_id: &str) -> Result<(), ChatError> {
        self.store.set_unread(channel_id, 0)
    }

    pub fn bump_unread(&mut self, channel_id: &str) -> Result<(), ChatError> {
        let unread = self
            .store
            .channel(channel_id)
            .ok_or_else(|| ChatError::UnknownChannel(channel_id.to_string()))?
            .unread;
        self.store.set_unread(channel_id, unread.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::providers::FixedClock;
    use crate::providers::SequentialIds;
    use crate::state::ChannelKind;
    use crate::state::MemberRole;
    use crate::store::InMemoryChannelStore;

    fn reaction(emoji: &str, count: u32, active: bool) -> Reaction {
        Reaction {
            emoji: emoji.to_string(),
            count,
            active,
        }
    }

    fn member(id: &str, name: &str) -> Member {
        Member {
            id: id.to_string(),
            name: name.to_string(),
            avatar: None,
            status: MemberStatus::Online,
            role: MemberRole::Member,
            activity: None,
        }
    }

    fn message(id: &str, author: &str, content: &str) -> Message {
        Message {
            id: id.to_string(),
            author: author.to_string(),
            content: content.to_string(),
            timestamp: "10:32 AM".to_string(),
            reactions: Vec::new(),
        }
    }

    fn channel(id: &str, locked: bool) -> Channel {
        Channel {
            id: id.to_string(),
            name: id.to_string(),
            kind: ChannelKind::Text,
            unread: 2,
            locked,
        }
    }

    fn board() -> MessageBoard {
        let store = InMemoryChannelStore::new(
            vec![ChannelCategory {
                id: "ops".to_string(),
                name: "Live Operations".to_string(),
                channels: vec![channel("general", false), channel("rules", true)],
            }],
            vec![member("1", "Sarah Chen"), member("7", "Nicholas Miller")],
            vec![(
                "general".to_string(),
                vec![message("seed-1", "1", "Pricing benchmarks are live")],
            )],
        );
        let at = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|date| date.and_hms_opt(9, 15, 0))
            .expect("valid time");
        MessageBoard::new(
            Box::new(store),
            Box::new(SequentialIds::new("msg")),
            Box::new(FixedClock(at)),
        )
    }

    #[test]
    fn toggle_creates_missing_reaction() {
        let mut reactions = Vec::new();
        toggle_reaction_in(&mut reactions, "🔥");
        assert_eq!(reactions, vec![reaction("🔥", 1, true)]);
    }

    #[test]
    fn toggle_activates_existing_inactive_reaction() {
        let mut reactions = vec![reaction("🔥", 5, false)];
        toggle_reaction_in(&mut reactions, "🔥");
        assert_eq!(reactions, vec![reaction("🔥", 6, true)]);
    }

    #[test]
    fn toggle_removes_reaction_that_would_reach_zero() {
        let mut reactions = vec![reaction("📈", 3, false), reaction("🔥", 1, true)];
        toggle_reaction_in(&mut reactions, "🔥");
        assert_eq!(reactions, vec![reaction("📈", 3, false)]);
    }

    #[test]
    fn removed_reaction_comes_back_last() {
        let mut reactions = vec![reaction("🔥", 1, true), reaction("📈", 3, false)];
        toggle_reaction_in(&mut reactions, "🔥");
        toggle_reaction_in(&mut reactions, "🔥");
        assert_eq!(
            reactions,
            vec![reaction("📈", 3, false), reaction("🔥", 1, true)]
        );
    }

    #[test]
    fn toggle_twice_restores_prior_state() {
        for prior in [
            vec![reaction("🔥", 5, false)],
            vec![reaction("🔥", 5, true)],
            vec![reaction("🔥", 1, true)],
            Vec::new(),
        ] {
            let mut reactions = prior.clone();
            toggle_reaction_in(&mut reactions, "🔥");
            toggle_reaction_in(&mut reactions, "🔥");
            assert_eq!(reactions, prior);
        }
    }

    #[test]
    fn retried_toggle_is_not_idempotent() {
        let mut once = vec![reaction("🔥", 5, false)];
        toggle_reaction_in(&mut once, "🔥");
        let mut retried = once.clone();
        toggle_reaction_in(&mut retried, "🔥");
        assert_ne!(once, retried);
        assert_eq!(retried, vec![reaction("🔥", 5, false)]);
    }

    #[test]
    fn toggle_keeps_other_emoji_untouched_and_unique() {
        let mut reactions = vec![reaction("🔥", 5, false), reaction("🤔", 2, false)];
        toggle_reaction_in(&mut reactions, "🤔");
        toggle_reaction_in(&mut reactions, "👍");
        assert_eq!(
            reactions,
            vec![
                reaction("🔥", 5, false),
                reaction("🤔", 3, true),
                reaction("👍", 1, true),
            ]
        );
    }

    #[test]
    fn filter_distinguishes_empty_feed_from_no_match() {
        let members = vec![member("1", "Sarah Chen")];
        assert_eq!(filter_messages(&[], &members, ""), MessageView::NoMessages);
        assert_eq!(filter_messages(&[], &members, "x"), MessageView::NoMessages);

        let messages = vec![message("1", "1", "Pricing update")];
        assert_eq!(
            filter_messages(&messages, &members, "mortgage"),
            MessageView::NoMatches
        );
    }

    #[test]
    fn blank_query_returns_everything() {
        let messages = vec![message("1", "1", "a"), message("2", "1", "b")];
        assert_eq!(
            filter_messages(&messages, &[], "   "),
            MessageView::All(messages.clone())
        );
    }

    #[test]
    fn filter_matches_content_or_author_case_insensitively() {
        let members = vec![member("1", "Sarah Chen"), member("2", "Michael Park")];
        let messages = vec![
            message("1", "1", "Hospitality ROI module deployed"),
            message("2", "2", "Tracking roi in Miami"),
            message("3", "2", "Anyone on JAiNE v2?"),
        ];

        let view = filter_messages(&messages, &members, "ROI");
        let ids: Vec<&str> = view.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let view = filter_messages(&messages, &members, "sarah");
        let ids: Vec<&str> = view.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn filter_does_not_mutate_input() {
        let messages = vec![message("1", "1", "hello")];
        let before = messages.clone();
        let _ = filter_messages(&messages, &[], "zzz");
        assert_eq!(messages, before);
    }

    #[test]
    fn trigger_matches_keyword_case_insensitively() {
        let rule = TriggerRule::new(&ChatConfig::default()).expect("rule");
        assert!(rule.matches("general", "hello JAiNE"));
        assert!(rule.matches("general", "hello jaine"));
        assert!(!rule.matches("general", "hello world"));
    }

    #[test]
    fn trigger_matches_auto_respond_channel() {
        let config = ChatConfig {
            trigger_keywords: Vec::new(),
            auto_respond_channels: vec!["str-talk".to_string()],
            ..ChatConfig::default()
        };
        let rule = TriggerRule::new(&config).expect("rule");
        assert!(rule.matches("str-talk", "anything at all"));
        assert!(!rule.matches("general", "anything at all"));
    }

    #[test]
    fn trigger_keywords_are_literal() {
        let config = ChatConfig {
            trigger_keywords: vec!["a.b".to_string(), "  ".to_string()],
            ..ChatConfig::default()
        };
        let rule = TriggerRule::new(&config).expect("rule");
        assert!(rule.matches("general", "see A.B"));
        assert!(!rule.matches("general", "see axb"));
    }

    #[test]
    fn send_appends_with_generated_id_and_timestamp() {
        let mut board = board();
        let sent = board
            .send_message("general", "7", "  Hello team  ")
            .expect("send");
        assert_eq!(sent.id, "msg-1");
        assert_eq!(sent.content, "Hello team");
        assert_eq!(sent.timestamp, "9:15 AM");
        assert_eq!(board.get_messages("general").last(), Some(&sent));
    }

    #[test]
    fn whitespace_only_send_leaves_feed_unchanged() {
        let mut board = board();
        let before = board.get_messages("general");
        assert_eq!(
            board.send_message("general", "7", " \n\t "),
            Err(ChatError::EmptyContent)
        );
        assert_eq!(board.get_messages("general"), before);
    }

    #[test]
    fn locked_channel_rejects_user_messages_but_accepts_replies() {
        let mut board = board();
        assert_eq!(
            board.send_message("rules", "7", "hi"),
            Err(ChatError::ChannelLocked("rules".to_string()))
        );
        assert!(board.post_reply("rules", "jaine", "noted").is_ok());
    }

    #[test]
    fn board_toggle_persists_through_store() {
        let mut board = board();
        board
            .toggle_reaction("general", "seed-1", "🔥")
            .expect("toggle");
        let stored = board.get_messages("general");
        assert_eq!(stored[0].reactions, vec![reaction("🔥", 1, true)]);
        assert_eq!(
            board.toggle_reaction("general", "nope", "🔥"),
            Err(ChatError::UnknownMessage("nope".to_string()))
        );
    }

    #[test]
    fn unread_counter_reset_and_bump() {
        let mut board = board();
        board.bump_unread("general").expect("bump");
        assert_eq!(board.channel("general").map(|c| c.unread), Some(3));
        board.mark_read("general").expect("read");
        assert_eq!(board.channel("general").map(|c| c.unread), Some(0));
    }

    #[test]
    fn unknown_channel_reads_as_empty() {
        let board = board();
        assert!(board.get_messages("nowhere").is_empty());
        assert_eq!(
            board.visible_messages("nowhere", ""),
            MessageView::NoMessages
        );
    }
}
