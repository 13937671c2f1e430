//! Shared scoring primitives.
//!
//! Normalization, recency decay, keyword matching and skill-tag inference
//! used by the decision engine, the intent recognizer and the thinking tool
//! advisor. [`ObjectiveTerm`] and [`ScoreBreakdown`] keep every weighted
//! contribution so a ranking can be explained term by term.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::task::TaskRecord;

/// Individual objective term with weight and score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveTerm {
    /// Term name
    pub name: String,
    /// Non-negative multiplier for this term
    pub weight: f64,
    /// Raw value (0.0 to 1.0)
    pub value: f64,
    /// Weighted contribution, negative for penalties
    pub contribution: f64,
}

impl ObjectiveTerm {
    /// Create a rewarding term: `weight * value`.
    pub fn reward(name: impl Into<String>, weight: f64, value: f64) -> Self {
        let weight = sanitize_weight(weight);
        let value = clamp_unit(value);
        Self {
            name: name.into(),
            weight,
            value,
            contribution: weight * value,
        }
    }

    /// Create a penalty term: `-(weight * value)`.
    pub fn penalty(name: impl Into<String>, weight: f64, value: f64) -> Self {
        let mut term = Self::reward(name, weight, value);
        term.contribution = -term.contribution;
        term
    }
}

/// Complete scoring breakdown for explainability
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Individual objective terms
    pub terms: Vec<ObjectiveTerm>,
    /// Sum of contributions
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term to the breakdown
    pub fn add_term(&mut self, term: ObjectiveTerm) {
        self.total += term.contribution;
        self.terms.push(term);
    }

    pub fn term(&self, name: &str) -> Option<&ObjectiveTerm> {
        self.terms.iter().find(|t| t.name == name)
    }
}

/// Non-finite or negative weights contribute nothing.
pub fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Clamp into [0, 1]; NaN reads as the neutral 0.5.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Rescale `value` from `[min, max]` into `[0, 1]`.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() || max <= min {
        return 0.5;
    }
    clamp_unit((value - min) / (max - min))
}

/// Staleness in [0, 1): `1 - exp(-elapsed_days / scale_days)`.
///
/// Zero for no elapsed time (or a timestamp in the future), approaching one
/// as neglect grows.
pub fn staleness(elapsed_days: f64, scale_days: f64) -> f64 {
    if !elapsed_days.is_finite() || elapsed_days <= 0.0 || scale_days <= 0.0 {
        return 0.0;
    }
    1.0 - (-elapsed_days / scale_days).exp()
}

/// `now` minus `days`, saturating at the earliest representable instant.
pub fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Round to four decimals, keeping the value finite.
pub fn round4(value: f64) -> f64 {
    if value.is_finite() {
        (value * 10_000.0).round() / 10_000.0
    } else {
        0.0
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Case-insensitive keyword lookup.
///
/// ASCII keywords must sit on word boundaries ("fix" does not match
/// "prefix"); CJK keywords match as plain substrings.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return false;
    }
    let text = text.to_lowercase();

    if !keyword.is_ascii() {
        return text.contains(&keyword);
    }

    text.match_indices(&keyword).any(|(start, matched)| {
        let before = text[..start].chars().next_back();
        let after = text[start + matched.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| contains_keyword(text, k))
}

/// Number of distinct keywords present in `text`.
pub fn count_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| contains_keyword(text, k)).count()
}

const SKILL_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "writing",
        &["write", "draft", "document", "report", "blog", "article", "写", "文档", "报告", "周报"],
    ),
    (
        "engineering",
        &["code", "fix", "bug", "deploy", "refactor", "implement", "debug", "api", "修复", "代码", "开发", "部署", "上线"],
    ),
    (
        "communication",
        &["meet", "meeting", "call", "email", "present", "presentation", "negotiate", "沟通", "会议", "汇报", "电话"],
    ),
    (
        "planning",
        &["plan", "strategy", "roadmap", "organize", "schedule", "规划", "计划", "战略", "安排"],
    ),
    (
        "learning",
        &["learn", "study", "research", "read", "course", "学习", "研究", "阅读", "课程"],
    ),
    (
        "analysis",
        &["analyze", "analysis", "evaluate", "compare", "budget", "评估", "分析", "比较", "预算"],
    ),
];

/// Tags a task can be matched against life-profile strengths with.
///
/// The category itself, keyword-derived skills and `goal_oriented` for
/// goal-linked work.
pub fn infer_skill_tags(task: &TaskRecord) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    let category = task.category().trim().to_lowercase();
    if !category.is_empty() {
        tags.insert(category);
    }
    if task.long_term_goal_id().is_some() {
        tags.insert("goal_oriented".to_string());
    }

    let text = format!("{} {}", task.description(), task.category());
    for (tag, keywords) in SKILL_KEYWORDS {
        if contains_any(&text, keywords) {
            tags.insert((*tag).to_string());
        }
    }
    tags
}
