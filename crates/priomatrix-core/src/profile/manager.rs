//! Suggestion acceptance learning and adaptive nudge policy.
//!
//! State lives in `profile/user_profile.json` under the storage root. It is
//! loaded on first access and written back atomically after every mutation.
//! Callers serialize access per storage root.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, TimeZone, Timelike, Utc};
use tracing::{debug, info, warn};

use super::types::{
    ActionStats, AdaptiveNudgeRecommendation, FeedbackOutcome, ReminderOutcome, ReminderStats,
    StuckAction, StuckActionSuggestion, SuggestionEvent, SuggestionEventKind, UserProfileMetrics,
    UserProfileState,
};
use crate::error::Result;
use crate::scoring::{clamp_unit, days_before, round4};
use crate::storage::{read_json, write_json_atomic, StorageRoot};
use crate::task::{PriorityLevel, Quadrant, TaskRecord};

const PROFILE_FILE: &str = "user_profile.json";

/// Events older than this are pruned on write.
const EVENT_RETENTION_DAYS: i64 = 30;
const MAX_EVENTS: usize = 500;

const BASE_WEIGHT: f64 = 0.35;
const LEARNED_WEIGHT: f64 = 0.65;
const REPEAT_PENALTY: f64 = 0.3;
/// Prior shift toward tiny steps when reminders are mostly avoided.
const AVOIDANCE_SHIFT: f64 = 0.25;

/// Below this many samples the default policy applies.
const MIN_POLICY_SAMPLES: u64 = 5;
/// Pseudo-count in `n / (n + k)` confidence.
const CONFIDENCE_PSEUDO_COUNT: f64 = 8.0;

/// Learns which suggestions the user acts on.
#[derive(Debug)]
pub struct UserProfileManager {
    path: PathBuf,
    state: Option<UserProfileState>,
}

impl UserProfileManager {
    pub fn new(root: &StorageRoot) -> Self {
        Self {
            path: root.profile_dir().join(PROFILE_FILE),
            state: None,
        }
    }

    /// Construct from a raw path. Empty paths are rejected.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(&StorageRoot::new(root)?))
    }

    pub fn state_path(&self) -> &Path {
        &self.path
    }

    fn state(&mut self) -> Result<&mut UserProfileState> {
        if self.state.is_none() {
            let loaded: Option<UserProfileState> = read_json(&self.path)?;
            debug!(path = %self.path.display(), found = loaded.is_some(), "loaded user profile");
            self.state = Some(loaded.unwrap_or_default());
        }
        Ok(self.state.get_or_insert_with(UserProfileState::default))
    }

    fn save(&mut self, now: DateTime<Utc>) -> Result<()> {
        let path = self.path.clone();
        let state = self.state()?;
        state.last_updated_at = now;
        prune_events(&mut state.events, now);
        write_json_atomic(&path, &*state)
    }

    /// Lifetime counters for `action_id`.
    pub fn action_stats(&mut self, action_id: &str) -> Result<ActionStats> {
        let id = normalize_id(action_id);
        Ok(self.state()?.actions.get(&id).copied().unwrap_or_default())
    }

    pub fn record_suggestion_shown(&mut self, action_id: &str) -> Result<()> {
        self.record_suggestion_shown_at(action_id, Utc::now())
    }

    pub fn record_suggestion_shown_at(&mut self, action_id: &str, now: DateTime<Utc>) -> Result<()> {
        let id = normalize_id(action_id);
        if id.is_empty() {
            warn!("ignoring suggestion shown without an action id");
            return Ok(());
        }

        let state = self.state()?;
        state.actions.entry(id.clone()).or_default().shown += 1;
        state.events.push(SuggestionEvent {
            action_id: id,
            kind: SuggestionEventKind::Shown,
            created_at: now,
        });
        self.save(now)
    }

    /// Copy of the full learning state.
    pub fn snapshot(&mut self) -> Result<UserProfileState> {
        Ok(self.state()?.clone())
    }

    pub fn reminder_stats(&mut self) -> Result<ReminderStats> {
        Ok(self.state()?.reminders)
    }

    pub fn record_reminder_shown(&mut self) -> Result<()> {
        self.record_reminder_shown_at(&Local::now())
    }

    /// Count a shown reminder and the hour of day it was shown in.
    pub fn record_reminder_shown_at<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<()> {
        let state = self.state()?;
        state.reminders.shown += 1;
        *state.active_hours.entry(now.hour()).or_default() += 1;
        self.save(now.with_timezone(&Utc))
    }

    pub fn record_reminder_result(&mut self, outcome: ReminderOutcome) -> Result<()> {
        self.record_reminder_result_at(outcome, &Local::now())
    }

    pub fn record_reminder_result_at<Tz: TimeZone>(
        &mut self,
        outcome: ReminderOutcome,
        now: &DateTime<Tz>,
    ) -> Result<()> {
        let state = self.state()?;
        state.reminders.record(outcome);
        *state.active_hours.entry(now.hour()).or_default() += 1;
        debug!(?outcome, "recorded reminder result");
        self.save(now.with_timezone(&Utc))
    }

    /// Count `outcome` for `action_id`.
    ///
    /// Feedback for an action never shown still counts: `shown` is raised to
    /// the feedback total and a matching shown event is logged.
    pub fn record_suggestion_feedback(
        &mut self,
        action_id: &str,
        outcome: FeedbackOutcome,
    ) -> Result<()> {
        self.record_suggestion_feedback_at(action_id, outcome, Utc::now())
    }

    pub fn record_suggestion_feedback_at(
        &mut self,
        action_id: &str,
        outcome: FeedbackOutcome,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let id = normalize_id(action_id);
        if id.is_empty() {
            warn!(?outcome, "ignoring suggestion feedback without an action id");
            return Ok(());
        }

        let state = self.state()?;
        let stats = state.actions.entry(id.clone()).or_default();
        match outcome {
            FeedbackOutcome::Accepted => stats.accepted += 1,
            FeedbackOutcome::Deferred => stats.deferred += 1,
            FeedbackOutcome::Rejected => stats.rejected += 1,
        }

        let missing_shown = stats.feedback_total().saturating_sub(stats.shown);
        stats.shown += missing_shown;
        for _ in 0..missing_shown {
            state.events.push(SuggestionEvent {
                action_id: id.clone(),
                kind: SuggestionEventKind::Shown,
                created_at: now,
            });
        }
        state.events.push(SuggestionEvent {
            action_id: id,
            kind: outcome.into(),
            created_at: now,
        });
        self.save(now)
    }

    /// The stuck-action catalog ranked for `task`.
    ///
    /// Each action gets a prior from the task quadrant, how long it has been
    /// stuck and whether reminders are mostly avoided, blended with its
    /// learned acceptance rate. The action suggested last time is pushed
    /// down so the same nudge is not repeated.
    pub fn get_ranked_stuck_suggestions(
        &mut self,
        task: &TaskRecord,
        stuck_duration: Duration,
        last_suggested: Option<&str>,
    ) -> Result<Vec<StuckActionSuggestion>> {
        let last = last_suggested.and_then(StuckAction::from_id);
        let hours = ((stuck_duration.num_minutes() as f64) / 60.0).round().max(1.0) as i64;
        let state = self.state()?;
        let avoidance_heavy = state.reminders.is_avoidance_heavy();

        let mut suggestions: Vec<StuckActionSuggestion> = StuckAction::ALL
            .into_iter()
            .map(|action| {
                let base_score = base_weight(
                    action,
                    task.importance(),
                    task.urgency(),
                    stuck_duration,
                    avoidance_heavy,
                );
                let acceptance_rate = state
                    .actions
                    .get(action.id())
                    .copied()
                    .unwrap_or_default()
                    .acceptance_rate();
                let mut score = BASE_WEIGHT * base_score + LEARNED_WEIGHT * acceptance_rate;
                if last == Some(action) {
                    score -= REPEAT_PENALTY;
                }
                StuckActionSuggestion {
                    action,
                    id: action.id().to_string(),
                    text: action.prompt(hours),
                    base_score,
                    acceptance_rate: round4(acceptance_rate),
                    score: round4(score),
                }
            })
            .collect();

        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        debug!(top = suggestions[0].id.as_str(), "ranked stuck suggestions");
        Ok(suggestions)
    }

    pub fn get_dashboard_metrics(&mut self, window_days: u32) -> Result<UserProfileMetrics> {
        self.get_dashboard_metrics_at(window_days, Utc::now())
    }

    /// Suggestion activity over the trailing `window_days` (at least one).
    pub fn get_dashboard_metrics_at(
        &mut self,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<UserProfileMetrics> {
        let window_days = window_days.max(1);
        let cutoff = days_before(now, window_days);
        let state = self.state()?;

        let mut shown = 0u64;
        let mut accepted = 0u64;
        let mut deferred = 0u64;
        let mut rejected = 0u64;
        let mut accepted_by_action: Vec<(&str, u64)> = Vec::new();

        for event in state.events.iter().filter(|e| e.created_at >= cutoff) {
            match event.kind {
                SuggestionEventKind::Shown => shown += 1,
                SuggestionEventKind::Deferred => deferred += 1,
                SuggestionEventKind::Rejected => rejected += 1,
                SuggestionEventKind::Accepted => {
                    accepted += 1;
                    match accepted_by_action
                        .iter_mut()
                        .find(|(id, _)| *id == event.action_id)
                    {
                        Some((_, count)) => *count += 1,
                        None => accepted_by_action.push((&event.action_id, 1)),
                    }
                }
            }
        }

        // First-accepted wins ties.
        let top_effective_action_id = accepted_by_action
            .iter()
            .fold(None::<(&str, u64)>, |best, &(id, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((id, count)),
            })
            .map(|(id, _)| id.to_string());

        let ratio = |n: u64| if shown > 0 { n as f64 / shown as f64 } else { 0.0 };
        Ok(UserProfileMetrics {
            window_days,
            suggestions_shown: shown,
            suggestions_accepted: accepted,
            suggestions_deferred: deferred,
            suggestions_rejected: rejected,
            hit_rate: round4(ratio(accepted)),
            interruption_index: round4(clamp_unit(ratio(deferred + rejected))),
            top_effective_action_id,
        })
    }

    pub fn get_adaptive_nudge_recommendation(
        &mut self,
        sample_days: u32,
    ) -> Result<AdaptiveNudgeRecommendation> {
        self.get_adaptive_nudge_recommendation_at(sample_days, Utc::now())
    }

    /// Nudge policy from the last `sample_days` of feedback.
    ///
    /// Frequent deferrals or rejections lengthen the stuck threshold and cut
    /// the daily limit; a high hit rate does the opposite. Confidence depends
    /// on the sample count alone.
    pub fn get_adaptive_nudge_recommendation_at(
        &mut self,
        sample_days: u32,
        now: DateTime<Utc>,
    ) -> Result<AdaptiveNudgeRecommendation> {
        let metrics = self.get_dashboard_metrics_at(sample_days, now)?;
        let samples = metrics.suggestions_shown.max(
            metrics.suggestions_accepted + metrics.suggestions_deferred + metrics.suggestions_rejected,
        );
        let hit = metrics.hit_rate;
        let interruption = metrics.interruption_index;

        let (threshold, limit) = if samples < MIN_POLICY_SAMPLES {
            (90, 2)
        } else if interruption >= 0.65 {
            (120, 1)
        } else if interruption >= 0.50 {
            (105, 1)
        } else if hit >= 0.45 && interruption <= 0.35 {
            (75, 3)
        } else if hit >= 0.30 && interruption <= 0.40 {
            (80, 2)
        } else {
            (90, 2)
        };

        let recommendation = AdaptiveNudgeRecommendation {
            stuck_threshold_minutes: u32::clamp(threshold, 60, 180),
            daily_nudge_limit: u32::clamp(limit, 1, 3),
            confidence: round4(confidence(samples)),
            acceptance_rate: hit,
            sample_count: samples,
        };
        info!(
            threshold = recommendation.stuck_threshold_minutes,
            limit = recommendation.daily_nudge_limit,
            samples,
            "computed nudge recommendation"
        );
        Ok(recommendation)
    }
}

fn normalize_id(action_id: &str) -> String {
    action_id.trim().to_ascii_lowercase()
}

/// `n / (n + 8)`: zero without data, strictly increasing, saturating at one.
fn confidence(samples: u64) -> f64 {
    let n = samples as f64;
    n / (n + CONFIDENCE_PSEUDO_COUNT)
}

/// Prior for `action` in [0, 1].
///
/// With both levels known, the quadrant picks a primary (1.0) and secondary
/// (0.5) action. A task of unknown priority gives every action 0.5. A user
/// who mostly avoids reminders is steered to the smallest steps.
fn base_weight(
    action: StuckAction,
    importance: PriorityLevel,
    urgency: PriorityLevel,
    stuck: Duration,
    avoidance_heavy: bool,
) -> f64 {
    use StuckAction::*;

    let mut weight = if importance == PriorityLevel::Unknown || urgency == PriorityLevel::Unknown {
        0.5
    } else {
        let (primary, secondary) = match Quadrant::classify(importance, urgency) {
            Quadrant::ImportantUrgent => (Start10Min, Split20Min),
            Quadrant::ImportantNotUrgent => (Split20Min, DecisionNow),
            Quadrant::UrgentNotImportant => (DelegateOrDrop, DecisionNow),
            Quadrant::Neither => (PauseAndSwitch, DecisionNow),
        };
        if action == primary {
            1.0
        } else if action == secondary {
            0.5
        } else {
            0.0
        }
    };

    if stuck >= Duration::hours(24) {
        match action {
            DecisionNow => weight += 0.25,
            DelegateOrDrop => weight += 0.15,
            _ => {}
        }
    } else if stuck < Duration::hours(2) && action == Start10Min {
        weight += 0.25;
    }

    if avoidance_heavy {
        match action {
            Start10Min | DecisionNow => weight += AVOIDANCE_SHIFT,
            Split20Min => weight -= AVOIDANCE_SHIFT,
            _ => {}
        }
    }
    clamp_unit(weight)
}

fn prune_events(events: &mut Vec<SuggestionEvent>, now: DateTime<Utc>) {
    let cutoff = now - Duration::days(EVENT_RETENTION_DAYS);
    events.retain(|e| e.created_at >= cutoff);
    if events.len() > MAX_EVENTS {
        let excess = events.len() - MAX_EVENTS;
        events.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> UserProfileManager {
        UserProfileManager::open(dir.path()).unwrap()
    }

    #[test]
    fn test_empty_root_fails_fast() {
        assert!(UserProfileManager::open("").is_err());
    }

    #[test]
    fn test_shown_creates_entry_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager(&dir);
        mgr.record_suggestion_shown("start_10_min").unwrap();
        mgr.record_suggestion_shown("START_10_MIN").unwrap();

        let mut reloaded = manager(&dir);
        assert_eq!(reloaded.action_stats("start_10_min").unwrap().shown, 2);
        assert!(dir.path().join("profile").join("user_profile.json").exists());
    }

    #[test]
    fn test_feedback_without_shown_reconciles() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager(&dir);
        mgr.record_suggestion_feedback("decision_now", FeedbackOutcome::Rejected)
            .unwrap();
        mgr.record_suggestion_feedback("decision_now", FeedbackOutcome::Deferred)
            .unwrap();

        let stats = mgr.action_stats("decision_now").unwrap();
        assert_eq!(stats.shown, 2);
        assert!(stats.shown >= stats.feedback_total());

        let metrics = mgr.get_dashboard_metrics(7).unwrap();
        assert_eq!(metrics.suggestions_shown, 2);
        assert_eq!(metrics.interruption_index, 1.0);
    }

    #[test]
    fn test_blank_action_id_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager(&dir);
        mgr.record_suggestion_shown("  ").unwrap();
        assert!(!mgr.state_path().exists());
    }

    #[test]
    fn test_repeat_penalty_demotes_last_action() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager(&dir);
        let task = TaskRecord::new("Write chapter")
            .with_priority(PriorityLevel::High, PriorityLevel::High);

        let fresh = mgr
            .get_ranked_stuck_suggestions(&task, Duration::hours(5), None)
            .unwrap();
        assert_eq!(fresh[0].action, StuckAction::Start10Min);

        let repeated = mgr
            .get_ranked_stuck_suggestions(&task, Duration::hours(5), Some("start_10_min"))
            .unwrap();
        assert_ne!(repeated[0].action, StuckAction::Start10Min);
        assert!(repeated[0].text.contains("5h"));
    }

    #[test]
    fn test_prune_keeps_recent_and_caps_count() {
        let now = Utc::now();
        let mut events: Vec<SuggestionEvent> = (0..600)
            .map(|i| SuggestionEvent {
                action_id: "a".into(),
                kind: SuggestionEventKind::Shown,
                created_at: now - Duration::minutes(600 - i),
            })
            .collect();
        events.push(SuggestionEvent {
            action_id: "old".into(),
            kind: SuggestionEventKind::Shown,
            created_at: now - Duration::days(40),
        });

        prune_events(&mut events, now);
        assert_eq!(events.len(), MAX_EVENTS);
        assert!(events.iter().all(|e| e.action_id == "a"));
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager(&dir);
        mgr.record_suggestion_shown("start_10_min").unwrap();

        let metrics = mgr.get_dashboard_metrics(u32::MAX).unwrap();
        assert_eq!(metrics.suggestions_shown, 1);
        let policy = mgr.get_adaptive_nudge_recommendation(u32::MAX).unwrap();
        assert_eq!(policy.sample_count, 1);
    }

    #[test]
    fn test_reminders_count_outcomes_and_hours() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager(&dir);
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap();
        mgr.record_reminder_shown_at(&at).unwrap();
        mgr.record_reminder_result_at(ReminderOutcome::Completed, &at).unwrap();
        mgr.record_reminder_result_at(ReminderOutcome::Snoozed, &(at + Duration::hours(5)))
            .unwrap();

        let mut reloaded = manager(&dir);
        let state = reloaded.snapshot().unwrap();
        assert_eq!(state.reminders.shown, 1);
        assert_eq!(state.reminders.completed, 1);
        assert_eq!(state.reminders.snoozed, 1);
        assert_eq!(state.active_hours.get(&9), Some(&2));
        assert_eq!(state.peak_hours(3), vec![9, 14]);
    }

    #[test]
    fn test_avoidance_steers_to_decision() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager(&dir);
        let task = TaskRecord::new("Plan migration")
            .with_priority(PriorityLevel::High, PriorityLevel::Low);

        let before = mgr
            .get_ranked_stuck_suggestions(&task, Duration::hours(30), None)
            .unwrap();
        assert_eq!(before[0].action, StuckAction::Split20Min);

        for _ in 0..3 {
            mgr.record_reminder_result(ReminderOutcome::Dismissed).unwrap();
        }
        let after = mgr
            .get_ranked_stuck_suggestions(&task, Duration::hours(30), None)
            .unwrap();
        assert_eq!(after[0].action, StuckAction::DecisionNow);
        let split = after.iter().find(|s| s.action == StuckAction::Split20Min).unwrap();
        assert_eq!(split.base_score, 0.75);
    }

    #[test]
    fn test_confidence_is_monotone() {
        assert_eq!(confidence(0), 0.0);
        assert!(confidence(5) < confidence(10));
        assert!(confidence(10_000) < 1.0);
    }
}
