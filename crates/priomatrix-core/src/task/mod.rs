//! Task records and the Eisenhower matrix vocabulary.
//!
//! A [`TaskRecord`] is the unit every engine consumes. Importance and urgency
//! use [`PriorityLevel`], whose parsing is total: anything that is not a
//! recognizable label or a legacy 1-10 number becomes `Unknown`.

pub mod goal;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub use goal::LongTermGoal;

/// Importance or urgency of a task.
///
/// `Legacy` keeps the numeric 1-10 form written by older task files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityLevel {
    High,
    Low,
    #[default]
    Unknown,
    Legacy(u8),
}

impl PriorityLevel {
    /// Parse a label without ever failing.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("high") {
            return PriorityLevel::High;
        }
        if trimmed.eq_ignore_ascii_case("low") {
            return PriorityLevel::Low;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Self::from_number(n),
            Err(_) => PriorityLevel::Unknown,
        }
    }

    /// Map a legacy numeric value, clamping into 1-10.
    pub fn from_number(n: f64) -> Self {
        if !n.is_finite() {
            return PriorityLevel::Unknown;
        }
        PriorityLevel::Legacy(n.round().clamp(1.0, 10.0) as u8)
    }

    /// Position on a 0..=1 scale: High 1, Low 0, Unknown 0.5.
    pub fn normalized(&self) -> f64 {
        match self {
            PriorityLevel::High => 1.0,
            PriorityLevel::Low => 0.0,
            PriorityLevel::Unknown => 0.5,
            PriorityLevel::Legacy(n) => crate::scoring::normalize(f64::from(*n), 1.0, 10.0),
        }
    }

    /// True for `High` and for legacy values in the upper half of the scale.
    pub fn is_high(&self) -> bool {
        match self {
            PriorityLevel::High => true,
            PriorityLevel::Legacy(n) => *n >= 6,
            _ => false,
        }
    }

    pub fn label(&self) -> String {
        match self {
            PriorityLevel::High => "High".to_string(),
            PriorityLevel::Low => "Low".to_string(),
            PriorityLevel::Unknown => "Unknown".to_string(),
            PriorityLevel::Legacy(n) => n.to_string(),
        }
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for PriorityLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PriorityLevel::Legacy(n) => serializer.serialize_u8(*n),
            other => serializer.serialize_str(&other.label()),
        }
    }
}

impl<'de> Deserialize<'de> for PriorityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
            Other(serde::de::IgnoredAny),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => PriorityLevel::parse(&s),
            Raw::Number(n) => PriorityLevel::from_number(n),
            Raw::Other(_) => PriorityLevel::Unknown,
        })
    }
}

/// One of the four Importance x Urgency buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    ImportantUrgent,
    ImportantNotUrgent,
    UrgentNotImportant,
    Neither,
}

impl Quadrant {
    /// Classify a pair of levels. `Unknown` counts as "not high".
    pub fn classify(importance: PriorityLevel, urgency: PriorityLevel) -> Self {
        match (importance.is_high(), urgency.is_high()) {
            (true, true) => Quadrant::ImportantUrgent,
            (true, false) => Quadrant::ImportantNotUrgent,
            (false, true) => Quadrant::UrgentNotImportant,
            (false, false) => Quadrant::Neither,
        }
    }

    /// Matrix label shown on the board.
    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::ImportantUrgent => "重要且紧急",
            Quadrant::ImportantNotUrgent => "重要不紧急",
            Quadrant::UrgentNotImportant => "不重要紧急",
            Quadrant::Neither => "不重要不紧急",
        }
    }

    pub fn english_label(&self) -> &'static str {
        match self {
            Quadrant::ImportantUrgent => "Important & Urgent",
            Quadrant::ImportantNotUrgent => "Important, Not Urgent",
            Quadrant::UrgentNotImportant => "Urgent, Not Important",
            Quadrant::Neither => "Neither",
        }
    }
}

/// A task as held by a matrix quadrant or kanban stage.
///
/// Setters other than the timestamp setters bump `last_modified_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(alias = "task", default, deserialize_with = "lenient::text")]
    description: String,
    #[serde(default, deserialize_with = "lenient::text")]
    category: String,
    #[serde(default)]
    importance: PriorityLevel,
    #[serde(default)]
    urgency: PriorityLevel,
    #[serde(default = "default_active", deserialize_with = "lenient::active")]
    active: bool,
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp")]
    last_modified_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    last_progress_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    long_term_goal_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::day")]
    original_scheduled_day: Option<u32>,
}

fn default_active() -> bool {
    true
}

/// Field parsers that never reject a row.
///
/// Task files are edited by hand and by older builds, so a malformed field
/// falls back to its neutral default instead of failing the whole file.
mod lenient {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match value(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(match value(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Booleans, "true"/"false"/"1"/"0" and numbers; anything else is active.
    pub fn active<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match value(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "false" | "0" | "no" => false,
                _ => true,
            },
            _ => super::default_active(),
        })
    }

    /// RFC 3339 text or Unix seconds.
    fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
        match raw {
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|at| at.with_timezone(&Utc)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            _ => None,
        }
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        Ok(parse_timestamp(&value(deserializer)?).unwrap_or_else(Utc::now))
    }

    pub fn optional_timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(parse_timestamp(&value(deserializer)?))
    }

    /// Positive whole day offsets, as numbers or numeric text.
    pub fn day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let day = match value(deserializer)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        Ok(day.and_then(|d| u32::try_from(d).ok()).filter(|d| *d > 0))
    }
}

impl TaskRecord {
    /// Create an active task with unknown priority, timestamped now.
    pub fn new(description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            description: description.into(),
            category: String::new(),
            importance: PriorityLevel::Unknown,
            urgency: PriorityLevel::Unknown,
            active: true,
            created_at: now,
            last_modified_at: now,
            last_progress_at: None,
            long_term_goal_id: None,
            original_scheduled_day: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_priority(mut self, importance: PriorityLevel, urgency: PriorityLevel) -> Self {
        self.importance = importance;
        self.urgency = urgency;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.long_term_goal_id = Some(goal_id.into());
        self
    }

    pub fn with_scheduled_day(mut self, day: u32) -> Self {
        self.original_scheduled_day = Some(day);
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn with_last_modified_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified_at = at;
        self
    }

    pub fn with_last_progress_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_progress_at = Some(at);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Description, or a placeholder when blank.
    pub fn display_name(&self) -> &str {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            "(untitled task)"
        } else {
            trimmed
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn importance(&self) -> PriorityLevel {
        self.importance
    }

    pub fn urgency(&self) -> PriorityLevel {
        self.urgency
    }

    pub fn quadrant(&self) -> Quadrant {
        Quadrant::classify(self.importance, self.urgency)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    pub fn last_progress_at(&self) -> Option<DateTime<Utc>> {
        self.last_progress_at
    }

    /// Last progress, falling back to creation time.
    pub fn progress_reference(&self) -> DateTime<Utc> {
        self.last_progress_at.unwrap_or(self.created_at)
    }

    /// Goal id, `None` when missing or blank.
    pub fn long_term_goal_id(&self) -> Option<&str> {
        self.long_term_goal_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Scheduled day offset; zero is treated as unscheduled.
    pub fn original_scheduled_day(&self) -> Option<u32> {
        self.original_scheduled_day.filter(|day| *day > 0)
    }

    fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.touch();
    }

    pub fn set_importance(&mut self, importance: PriorityLevel) {
        self.importance = importance;
        self.touch();
    }

    pub fn set_urgency(&mut self, urgency: PriorityLevel) {
        self.urgency = urgency;
        self.touch();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.touch();
    }

    pub fn set_long_term_goal_id(&mut self, goal_id: Option<String>) {
        self.long_term_goal_id = goal_id;
        self.touch();
    }

    pub fn set_original_scheduled_day(&mut self, day: Option<u32>) {
        self.original_scheduled_day = day;
        self.touch();
    }

    /// Record progress. Also a field change, so last-modified moves too.
    pub fn record_progress(&mut self, at: DateTime<Utc>) {
        self.last_progress_at = Some(at);
        self.touch();
    }

    pub fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    pub fn set_last_modified_at(&mut self, at: DateTime<Utc>) {
        self.last_modified_at = at;
    }

    pub fn set_last_progress_at(&mut self, at: Option<DateTime<Utc>>) {
        self.last_progress_at = at;
    }
}
