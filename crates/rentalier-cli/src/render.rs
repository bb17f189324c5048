use std::fmt::Write;

use rentalier_core::chat::MessageView;
use rentalier_core::state::ActivationState;
use rentalier_core::state::ChannelCategory;
use rentalier_core::state::ChannelKind;
use rentalier_core::state::ChatState;
use rentalier_core::state::Member;
use rentalier_core::state::MilestoneEvent;

pub fn progress(activation: &ActivationState) -> String {
    let report = &activation.report;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Activation {}% | {}",
        report.percentage,
        report.phase.label()
    );
    let _ = writeln!(out, "{}", report.phase.description());
    let _ = writeln!(
        out,
        "XP {} earned, {} available",
        activation.xp_earned, activation.xp_available
    );

    if report.next_actions.is_empty() {
        let _ = writeln!(out, "\nNothing left to do right now.");
    } else {
        let _ = writeln!(out, "\nNext actions:");
        for (index, step) in report.next_actions.iter().enumerate() {
            let _ = write!(out, "  {}. {} [{}]", index + 1, step.label, step.id);
            if let Some(benefit) = &step.benefit {
                let _ = write!(out, " - {benefit}");
            }
            out.push('\n');
        }
    }

    let _ = writeln!(out, "\nStages:");
    for stage in &activation.stages {
        let mark = if stage.is_complete { "x" } else { " " };
        let _ = writeln!(
            out,
            "  [{mark}] {} {}/{}",
            stage.title, stage.completed_count, stage.total_count
        );
    }
    out
}

pub fn celebration(event: MilestoneEvent) -> String {
    format!("*** {} ***", event.headline())
}

pub fn channels(categories: &[ChannelCategory], chat: &ChatState) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{}", category.name.to_uppercase());
        for channel in &category.channels {
            let sigil = match channel.kind {
                ChannelKind::Text => "#",
                ChannelKind::Voice => "~",
                ChannelKind::Announcement => "!",
            };
            let _ = write!(out, "  {sigil}{} ({})", channel.id, channel.name);
            if channel.locked {
                out.push_str(" [locked]");
            }
            if channel.unread > 0 {
                let _ = write!(out, " [{} unread]", channel.unread);
            }
            if chat.is_typing(&channel.id) {
                out.push_str(" [typing]");
            }
            out.push('\n');
        }
    }
    out
}

pub fn online_members(members: &[Member]) -> String {
    let mut out = format!("ONLINE ({})\n", members.len());
    for member in members {
        let _ = write!(out, "  {} ({})", member.name, member.role.label());
        if let Some(activity) = &member.activity {
            let _ = write!(out, " - {activity}");
        }
        out.push('\n');
    }
    out
}

pub fn messages(view: &MessageView, members: &[Member], query: &str) -> String {
    match view {
        MessageView::NoMessages => "No messages yet. Start the conversation.\n".to_string(),
        MessageView::NoMatches => format!("No messages match \"{}\".\n", query.trim()),
        MessageView::All(messages) | MessageView::Matches(messages) => {
            let mut out = String::new();
            for message in messages {
                let author = members
                    .iter()
                    .find(|member| member.id == message.author)
                    .map_or(message.author.as_str(), |member| member.name.as_str());
                let _ = write!(
                    out,
                    "[{}] {}: {}",
                    message.timestamp, author, message.content
                );
                for reaction in &message.reactions {
                    let marker = if reaction.active { "*" } else { "" };
                    let _ = write!(out, "  {}{}{marker}", reaction.emoji, reaction.count);
                }
                let _ = writeln!(out, "  ({})", message.id);
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rentalier_core::chat::filter_messages;
    use rentalier_core::seed::SeedData;
    use rentalier_core::state::Message;
    use rentalier_core::state::Reaction;

    use super::*;

    #[test]
    fn message_lines_show_author_names_and_reactions() {
        let seed = SeedData::builtin().expect("seed");
        let feed = vec![Message {
            id: "m1".to_string(),
            author: "3".to_string(),
            content: "Occupancy is up".to_string(),
            timestamp: "9:15 AM".to_string(),
            reactions: vec![Reaction {
                emoji: "🔥".to_string(),
                count: 2,
                active: true,
            }],
        }];
        let view = filter_messages(&feed, &seed.members, "");
        assert_eq!(
            messages(&view, &seed.members, ""),
            "[9:15 AM] Emily Rodriguez: Occupancy is up  🔥2*  (m1)\n"
        );
    }

    #[test]
    fn empty_states_have_distinct_copy() {
        let seed = SeedData::builtin().expect("seed");
        assert_eq!(
            messages(&MessageView::NoMatches, &seed.members, " zzz "),
            "No messages match \"zzz\".\n"
        );
        assert!(messages(&MessageView::NoMessages, &seed.members, "")
            .starts_with("No messages yet"));
    }

    #[test]
    fn celebration_uses_milestone_headline() {
        assert_eq!(
            celebration(MilestoneEvent::Completed100),
            "*** Certified Authority! Your activation is complete. ***"
        );
    }
}
