//! Activation progress: weighted completion percentage, phase mapping,
//! unlock gating, next actions and milestone detection.
//!
//! Everything here is a pure function of the step list. Lock status never
//! feeds back into the weight sum: percentages are computed from the
//! `completed` flags alone. An `unlock_at` gate reads the share reached by
//! the other steps, so a step's own weight never holds its gate shut.

use std::cmp::Ordering;

use crate::config::ActivationConfig;
use crate::config::MilestoneThresholds;
use crate::state::ActivationPhase;
use crate::state::JourneyStep;
use crate::state::MilestoneEvent;
use crate::state::ProgressReport;
use crate::state::StageSummary;
use crate::state::StepCategory;

/// Weight a step contributes to the percentage.
///
/// Missing weight counts as 1. Negative or non-finite weight, and any step
/// carrying negative xp, is malformed data and counts as 0.
pub fn step_weight(step: &JourneyStep) -> f64 {
    if step.xp.is_some_and(|xp| xp < 0) {
        return 0.0;
    }
    match step.weight {
        None => 1.0,
        Some(weight) if weight.is_finite() && weight > 0.0 => weight,
        Some(_) => 0.0,
    }
}

fn weighted_share<'a>(steps: impl IntoIterator<Item = &'a JourneyStep>) -> Option<u8> {
    let (done, total) = steps
        .into_iter()
        .fold((0.0_f64, 0.0_f64), |(done, total), step| {
            let weight = step_weight(step);
            let done = if step.completed { done + weight } else { done };
            (done, total + weight)
        });
    if total <= 0.0 {
        return None;
    }
    let rounded = (done / total * 100.0 + 0.5).floor();
    Some(rounded.clamp(0.0, 100.0) as u8)
}

/// Rounded (half-up) share of completed weight, in `0..=100`.
/// A list with no positive weight reports 0.
pub fn progress_percentage(steps: &[JourneyStep]) -> u8 {
    weighted_share(steps).unwrap_or(0)
}

/// Share of completed weight among every step except `step`, matched by id.
/// With no positive weight left among the others there is nothing to wait
/// for, and the gate reads 100.
pub fn unlock_percentage(steps: &[JourneyStep], step: &JourneyStep) -> u8 {
    weighted_share(steps.iter().filter(|other| other.id != step.id)).unwrap_or(100)
}

/// Effective lock status of `step` within `steps`. Completion is sticky and
/// always wins; an `unlock_at` threshold overrides the stored flag.
pub fn is_locked(step: &JourneyStep, steps: &[JourneyStep]) -> bool {
    if step.completed {
        return false;
    }
    match step.unlock_at {
        Some(threshold) => unlock_percentage(steps, step) < threshold,
        None => step.locked,
    }
}

/// Steps whose stored lock flag disagrees with their effective status,
/// paired with the status they should have.
pub fn lock_changes(steps: &[JourneyStep]) -> Vec<(String, bool)> {
    steps
        .iter()
        .filter_map(|step| {
            let locked = is_locked(step, steps);
            (locked != step.locked).then(|| (step.id.clone(), locked))
        })
        .collect()
}

/// Incomplete, unlocked steps by ascending priority, ties broken by id.
pub fn next_actions(steps: &[JourneyStep], limit: usize) -> Vec<JourneyStep> {
    let mut candidates: Vec<JourneyStep> = steps
        .iter()
        .filter(|step| !step.completed && !is_locked(step, steps))
        .map(|step| JourneyStep {
            locked: false,
            ..step.clone()
        })
        .collect();
    candidates.sort_by(|a, b| match a.priority.cmp(&b.priority) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
    candidates.truncate(limit);
    candidates
}

pub fn compute_progress(steps: &[JourneyStep]) -> ProgressReport {
    compute_progress_with(steps, &ActivationConfig::default())
}

pub fn compute_progress_with(steps: &[JourneyStep], config: &ActivationConfig) -> ProgressReport {
    let percentage = progress_percentage(steps);
    ProgressReport {
        percentage,
        phase: config.milestones.phase_for(percentage),
        next_actions: next_actions(steps, config.next_action_limit),
    }
}

pub fn phase_for(percentage: u8) -> ActivationPhase {
    MilestoneThresholds::default().phase_for(percentage)
}

pub fn detect_milestone_crossing(previous: u8, current: u8) -> Option<MilestoneEvent> {
    MilestoneThresholds::default().detect_crossing(previous, current)
}

impl MilestoneThresholds {
    pub fn phase_for(&self, percentage: u8) -> ActivationPhase {
        if percentage >= self.certified {
            ActivationPhase::CertifiedAuthority
        } else if percentage >= self.authority {
            ActivationPhase::Authority
        } else if percentage >= self.visibility {
            ActivationPhase::Visibility
        } else {
            ActivationPhase::Foundation
        }
    }

    /// At most one event per transition. When a jump crosses several
    /// thresholds only the highest fires; the skipped ones are superseded.
    pub fn detect_crossing(&self, previous: u8, current: u8) -> Option<MilestoneEvent> {
        let crossed = |threshold: u8| previous < threshold && threshold <= current;
        if crossed(self.certified) {
            Some(MilestoneEvent::Completed100)
        } else if crossed(self.authority) {
            Some(MilestoneEvent::Unlocked80)
        } else if crossed(self.visibility) {
            Some(MilestoneEvent::Unlocked60)
        } else {
            None
        }
    }
}

pub fn stage_summaries(steps: &[JourneyStep]) -> Vec<StageSummary> {
    StepCategory::ALL
        .iter()
        .filter_map(|category| {
            let members: Vec<&JourneyStep> = steps
                .iter()
                .filter(|step| step.category == *category)
                .collect();
            if members.is_empty() {
                return None;
            }
            let completed_count = members.iter().filter(|step| step.completed).count();
            Some(StageSummary {
                category: *category,
                title: category.label(),
                description: category.description(),
                step_ids: members.iter().map(|step| step.id.clone()).collect(),
                completed_count,
                total_count: members.len(),
                is_complete: completed_count == members.len(),
            })
        })
        .collect()
}

fn step_xp(step: &JourneyStep) -> u64 {
    step.xp.map_or(0, |xp| u64::try_from(xp).unwrap_or(0))
}

pub fn xp_earned(steps: &[JourneyStep]) -> u64 {
    steps
        .iter()
        .filter(|step| step.completed)
        .map(step_xp)
        .sum()
}

pub fn xp_available(steps: &[JourneyStep]) -> u64 {
    steps
        .iter()
        .filter(|step| !step.completed)
        .map(step_xp)
        .sum()
}
