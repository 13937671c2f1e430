//! User profile learning.
//!
//! Tracks how the user responds to stuck-task suggestions and turns that
//! history into ranked suggestions and an adaptive nudge policy:
//!
//! - Acceptance rates are Laplace-smoothed so new actions start neutral
//! - Feedback without a prior "shown" still counts
//! - Nudge confidence grows with sample volume only
//! - Reminder outcomes and active hours feed the derived life profile
//!
//! # Example
//!
//! ```ignore
//! use priomatrix_core::profile::{FeedbackOutcome, UserProfileManager};
//!
//! let mut manager = UserProfileManager::open("/tmp/priomatrix")?;
//! manager.record_suggestion_shown("start_10_min")?;
//! manager.record_suggestion_feedback("start_10_min", FeedbackOutcome::Accepted)?;
//!
//! let policy = manager.get_adaptive_nudge_recommendation(7)?;
//! println!("nudge after {} min", policy.stuck_threshold_minutes);
//! ```

mod manager;
mod types;

pub use manager::UserProfileManager;
pub use types::{
    ActionStats, AdaptiveNudgeRecommendation, FeedbackOutcome, ReminderOutcome, ReminderStats,
    StuckAction, StuckActionSuggestion, SuggestionEvent, SuggestionEventKind, UserProfileMetrics,
    UserProfileState,
};
