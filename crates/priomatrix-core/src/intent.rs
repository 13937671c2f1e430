//! Local heuristics for free-text task capture.
//!
//! [`IntentRecognizer`] decides whether a line of text reads like a task,
//! estimates its importance and urgency from keyword cues, and maps the pair
//! onto a matrix quadrant. It is also the fallback when no external text
//! analyzer is configured (see [`crate::analysis`]).

use tracing::debug;

use crate::scoring::{clamp_unit, contains_any, count_hits};
use crate::task::{PriorityLevel, Quadrant};

/// Quadrant returned for pairs that are not a clean High/Low combination.
pub const FALLBACK_QUADRANT: Quadrant = Quadrant::ImportantNotUrgent;

const ACTION_VERBS: &[&str] = &[
    "submit", "fix", "finish", "complete", "send", "write", "prepare", "review", "call", "email",
    "schedule", "book", "buy", "pay", "update", "deploy", "draft", "plan", "organize", "remind",
    "clean", "file", "renew", "提交", "修复", "完成", "发送", "写", "准备", "整理", "安排", "预约",
    "购买", "支付", "更新", "部署", "处理", "联系", "确认", "提醒", "交",
];

const IMPERATIVE_PREFIXES: &[&str] = &[
    "remind me", "please", "need to", "must", "have to", "don't forget", "todo", "to do",
    "i need to", "i have to", "需要", "要", "提醒", "记得", "别忘了", "请", "必须", "帮我",
];

const TIME_CUES: &[&str] = &[
    "today", "tomorrow", "tonight", "deadline", "due", "asap", "this week", "next week", "monday",
    "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "before", "eod",
    "今天", "明天", "今晚", "本周", "下周", "截止", "之前", "尽快", "马上", "周一", "周二", "周三",
    "周四", "周五", "周末",
];

const TASK_NOUNS: &[&str] = &[
    "report", "meeting", "presentation", "invoice", "bug", "ticket", "proposal", "document",
    "contract", "homework", "报告", "会议", "方案", "文档", "合同", "发票", "作业", "报销",
];

const CHITCHAT: &[&str] = &[
    "hello", "hi", "thanks", "thank you", "lol", "haha", "how are you", "weather", "good morning",
    "哈哈", "你好", "谢谢", "天气", "早上好", "晚安", "聊聊",
];

const URGENCY_HIGH: &[&str] = &[
    "today", "immediately", "asap", "urgent", "critical", "now", "tonight", "deadline",
    "right away", "今天", "立即", "马上", "紧急", "尽快", "立刻", "截止", "今晚",
];

const URGENCY_LOW: &[&str] = &[
    "someday", "eventually", "later", "no rush", "whenever", "next month", "以后", "有空", "不急",
    "慢慢", "下个月",
];

const IMPORTANCE_HIGH: &[&str] = &[
    "production", "key", "milestone", "critical", "important", "customer", "revenue", "security",
    "launch", "生产", "关键", "里程碑", "重要", "核心", "客户", "上线", "安全",
];

const IMPORTANCE_LOW: &[&str] = &[
    "trivial", "optional", "minor", "nice to have", "maybe", "随便", "可选", "琐事", "小事", "顺便",
];

const LEADING_FILLERS: &[&str] = &[
    "remind me to", "don't forget to", "i need to", "i have to", "i must", "need to", "have to",
    "please", "todo:", "todo", "提醒我", "别忘了", "记得", "帮我", "我需要", "需要", "请",
];

const TRAILING_PARTICLES: &[char] = &[
    '.', '!', '?', '。', '！', '？', '~', '～', '吧', '啊', '呀', '哦', '了', ' ',
];

/// Keyword-driven task recognizer.
#[derive(Debug, Clone)]
pub struct IntentRecognizer {
    task_threshold: f64,
}

impl Default for IntentRecognizer {
    fn default() -> Self {
        Self { task_threshold: 0.55 }
    }
}

impl IntentRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the likelihood at or above which text counts as a task.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.task_threshold = clamp_unit(threshold);
        self
    }

    pub fn task_threshold(&self) -> f64 {
        self.task_threshold
    }

    /// How strongly `text` reads like an actionable task, in [0, 1].
    ///
    /// Imperative phrasing, action verbs, deadlines and work nouns raise the
    /// score; greetings and small talk lower it.
    pub fn score_task_likelihood(&self, text: &str) -> f64 {
        let trimmed = text.trim();
        if trimmed.chars().count() < 2 {
            return 0.05;
        }

        let mut score: f64 = 0.3;
        let has_verb = contains_any(trimmed, ACTION_VERBS);
        if starts_with_any(trimmed, IMPERATIVE_PREFIXES) || starts_with_any(trimmed, ACTION_VERBS) {
            score += 0.25;
        }
        if has_verb {
            score += 0.2;
        }
        if contains_any(trimmed, TIME_CUES) {
            score += 0.15;
        }
        if contains_any(trimmed, TASK_NOUNS) {
            score += 0.1;
        }
        if contains_any(trimmed, CHITCHAT) {
            score -= 0.35;
        }
        if !has_verb && (trimmed.ends_with('?') || trimmed.ends_with('？')) {
            score -= 0.1;
        }

        let score = clamp_unit(score);
        debug!(score, "scored task likelihood");
        score
    }

    /// Likelihood at or above the configured threshold.
    pub fn is_potential_task(&self, text: &str) -> bool {
        self.score_task_likelihood(text) >= self.task_threshold
    }

    /// Importance and urgency from keyword signal strength.
    ///
    /// Each axis is `High` or `Low` when its cues outnumber the opposite
    /// cues, and `Unknown` otherwise.
    pub fn estimate_priority(&self, text: &str) -> (PriorityLevel, PriorityLevel) {
        let importance = level_from_hits(
            count_hits(text, IMPORTANCE_HIGH),
            count_hits(text, IMPORTANCE_LOW),
        );
        let urgency = level_from_hits(count_hits(text, URGENCY_HIGH), count_hits(text, URGENCY_LOW));
        (importance, urgency)
    }

    /// Quadrant label for an importance/urgency pair given as labels.
    ///
    /// Only the four High/Low combinations map directly; anything else
    /// returns the label of [`FALLBACK_QUADRANT`].
    pub fn estimate_quadrant(&self, importance: &str, urgency: &str) -> &'static str {
        match (strict_level(importance), strict_level(urgency)) {
            (Some(importance), Some(urgency)) => Quadrant::classify(importance, urgency).label(),
            _ => FALLBACK_QUADRANT.label(),
        }
    }

    /// Same as [`estimate_quadrant`](Self::estimate_quadrant) for parsed
    /// levels; legacy numbers split at 6.
    pub fn quadrant_for_levels(&self, importance: PriorityLevel, urgency: PriorityLevel) -> Quadrant {
        if importance == PriorityLevel::Unknown || urgency == PriorityLevel::Unknown {
            return FALLBACK_QUADRANT;
        }
        Quadrant::classify(importance, urgency)
    }

    /// Strip filler such as "remind me to" or "提醒我" and trailing particles.
    ///
    /// Returns `None` when fewer than three characters remain.
    pub fn extract_task_description(&self, text: &str) -> Option<String> {
        let mut rest = text.trim();
        loop {
            let stripped = LEADING_FILLERS
                .iter()
                .find_map(|filler| strip_prefix_ignore_case(rest, filler))
                .map(|s| s.trim_start_matches([' ', ',', ':', '，', '：']));
            match stripped {
                Some(s) if s.len() < rest.len() => rest = s,
                _ => break,
            }
        }
        let cleaned = rest.trim_end_matches(TRAILING_PARTICLES).trim();

        if cleaned.chars().count() < 3 {
            None
        } else {
            Some(cleaned.to_string())
        }
    }
}

fn strict_level(label: &str) -> Option<PriorityLevel> {
    match PriorityLevel::parse(label) {
        level @ (PriorityLevel::High | PriorityLevel::Low) => Some(level),
        _ => None,
    }
}

fn level_from_hits(high: usize, low: usize) -> PriorityLevel {
    use std::cmp::Ordering;
    match high.cmp(&low) {
        Ordering::Greater => PriorityLevel::High,
        Ordering::Less => PriorityLevel::Low,
        Ordering::Equal => PriorityLevel::Unknown,
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = &text[prefix.len()..];
    // ASCII prefixes must end on a word boundary.
    if prefix.is_ascii() && rest.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(rest)
}

fn starts_with_any(text: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .any(|p| strip_prefix_ignore_case(text, p).is_some())
}
