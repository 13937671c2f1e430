//! # Priomatrix Core Library
//!
//! Decision support for a task list organised on the Eisenhower matrix.
//! Everything is available through the standalone `priomatrix-cli` binary;
//! the CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Decision engine**: explainable weighted ranking of active tasks
//! - **User profile**: learns which stuck-task interventions the user accepts
//!   and derives an adaptive nudge policy
//! - **Strategy reports**: weekly reviews and the goal hierarchy snapshot,
//!   persisted as JSON (and Markdown) under a storage root
//! - **Intent and thinking tools**: keyword-based task recognition and a
//!   catalog of structured reasoning templates
//!
//! ## Key Components
//!
//! - [`DecisionEngine`]: Task ranking and focus snapshots
//! - [`UserProfileManager`]: Suggestion feedback learning
//! - [`LifeProfileEngine`]: Life profile derived from reminder behavior
//! - [`WeeklyReviewEngine`]: Weekly report generation
//! - [`GoalHierarchyEngine`]: Goal to task hierarchy
//! - [`IntentRecognizer`]: Free-text task detection
//! - [`ThinkingToolAdvisor`]: Thinking tool recommendations
//! - [`Config`]: Application configuration management

pub mod analysis;
pub mod decision;
pub mod error;
pub mod goals;
pub mod intent;
pub mod life_profile;
pub mod profile;
pub mod review;
pub mod scoring;
pub mod storage;
pub mod task;
pub mod thinking_tools;

pub use analysis::{AnalyzerWithFallback, TextAnalyzer};
pub use decision::{DecisionEngine, DecisionEngineOptions, TaskDecisionScore};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use goals::{GoalHierarchyEngine, GoalHierarchyItem, GoalHierarchySnapshot};
pub use intent::IntentRecognizer;
pub use life_profile::{DecisionStyle, LifeProfileEngine, LifeProfileSnapshot, NudgeTone};
pub use profile::{
    AdaptiveNudgeRecommendation, FeedbackOutcome, ReminderOutcome, StuckAction,
    StuckActionSuggestion, UserProfileManager, UserProfileMetrics,
};
pub use review::{WeeklyReviewEngine, WeeklyReviewOutcome, WeeklyReviewReport};
pub use scoring::{ObjectiveTerm, ScoreBreakdown};
pub use storage::{Config, StorageRoot};
pub use task::{LongTermGoal, PriorityLevel, Quadrant, TaskRecord};
pub use thinking_tools::{
    ThinkingTool, ThinkingToolAdvisor, ThinkingToolAnalysis, ThinkingToolRecommendation,
};
