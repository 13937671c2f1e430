//! Structured problem-solving techniques ("thinking tools").
//!
//! The catalog is a closed enum; recommendation is a table of keyword and
//! quadrant rules, and analysis fills the fixed template of the chosen tool
//! (see [`templates`]).

mod templates;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scoring::contains_any;
use crate::task::PriorityLevel;

/// Candidates within this distance of the last kept recommendation also surface.
pub const NEAR_TIE_MARGIN: f64 = 0.02;

/// Every technique the advisor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkingTool {
    Decompose,
    FocusSprint,
    PriorityRebalance,
    RiskCheck,
    DelegatePrepare,
    ClarifyGoal,
    FiveWhys,
    FirstPrinciples,
    #[serde(rename = "pareto_80_20")]
    Pareto8020,
    SwotScan,
    Premortem,
    OodaLoop,
    SmartGoal,
    CostBenefit,
}

impl ThinkingTool {
    /// Catalog order; also the tie-break order for recommendations.
    pub const ALL: [ThinkingTool; 14] = [
        ThinkingTool::Decompose,
        ThinkingTool::FocusSprint,
        ThinkingTool::PriorityRebalance,
        ThinkingTool::RiskCheck,
        ThinkingTool::DelegatePrepare,
        ThinkingTool::ClarifyGoal,
        ThinkingTool::FiveWhys,
        ThinkingTool::FirstPrinciples,
        ThinkingTool::Pareto8020,
        ThinkingTool::SwotScan,
        ThinkingTool::Premortem,
        ThinkingTool::OodaLoop,
        ThinkingTool::SmartGoal,
        ThinkingTool::CostBenefit,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ThinkingTool::Decompose => "decompose",
            ThinkingTool::FocusSprint => "focus_sprint",
            ThinkingTool::PriorityRebalance => "priority_rebalance",
            ThinkingTool::RiskCheck => "risk_check",
            ThinkingTool::DelegatePrepare => "delegate_prepare",
            ThinkingTool::ClarifyGoal => "clarify_goal",
            ThinkingTool::FiveWhys => "five_whys",
            ThinkingTool::FirstPrinciples => "first_principles",
            ThinkingTool::Pareto8020 => "pareto_80_20",
            ThinkingTool::SwotScan => "swot_scan",
            ThinkingTool::Premortem => "premortem",
            ThinkingTool::OodaLoop => "ooda_loop",
            ThinkingTool::SmartGoal => "smart_goal",
            ThinkingTool::CostBenefit => "cost_benefit",
        }
    }

    /// Case-insensitive lookup by id.
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|tool| tool.id().eq_ignore_ascii_case(id))
    }

    pub fn title(&self) -> &'static str {
        match self {
            ThinkingTool::Decompose => "Task Decomposition",
            ThinkingTool::FocusSprint => "Focus Sprint",
            ThinkingTool::PriorityRebalance => "Priority Rebalance",
            ThinkingTool::RiskCheck => "Risk Check",
            ThinkingTool::DelegatePrepare => "Delegation Prep",
            ThinkingTool::ClarifyGoal => "Goal Clarification",
            ThinkingTool::FiveWhys => "5 Whys",
            ThinkingTool::FirstPrinciples => "First Principles",
            ThinkingTool::Pareto8020 => "80/20 Rule",
            ThinkingTool::SwotScan => "SWOT Scan",
            ThinkingTool::Premortem => "Premortem",
            ThinkingTool::OodaLoop => "OODA Loop",
            ThinkingTool::SmartGoal => "SMART Goal",
            ThinkingTool::CostBenefit => "Cost-Benefit Analysis",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ThinkingTool::Decompose => "Break a vague task into executable next steps",
            ThinkingTool::FocusSprint => "Run a short, high-focus block on the current task",
            ThinkingTool::PriorityRebalance => "Reorder work by importance and urgency",
            ThinkingTool::RiskCheck => "Surface blockers and failure risks early",
            ThinkingTool::DelegatePrepare => "Prepare the minimum handoff package for delegation",
            ThinkingTool::ClarifyGoal => "Clarify the goal, scope and definition of done",
            ThinkingTool::FiveWhys => "Ask \"why\" repeatedly to reach the root cause",
            ThinkingTool::FirstPrinciples => "Strip assumptions and rebuild from hard constraints",
            ThinkingTool::Pareto8020 => "Capture the 20% of work that drives 80% of impact",
            ThinkingTool::SwotScan => "Assess strengths, weaknesses, opportunities and threats",
            ThinkingTool::Premortem => "Assume failure first, then close the gaps",
            ThinkingTool::OodaLoop => "Iterate quickly through observe, orient, decide, act",
            ThinkingTool::SmartGoal => "Calibrate the goal to be measurable and achievable",
            ThinkingTool::CostBenefit => "Compare cost, benefit and opportunity cost",
        }
    }

    pub fn scenario(&self) -> &'static str {
        match self {
            ThinkingTool::Decompose => "Long descriptions, hard starts, repeated postponement",
            ThinkingTool::FocusSprint => "Important and urgent work that needs a key delivery now",
            ThinkingTool::PriorityRebalance => "Low-value items crowding out the day",
            ThinkingTool::RiskCheck => "Stalled tasks, dependency blockers, rework-prone work",
            ThinkingTool::DelegatePrepare => "Urgent but non-core work suited for handoff",
            ThinkingTool::ClarifyGoal => "Unclear requirements or acceptance criteria",
            ThinkingTool::FiveWhys => "Recurring failures, symptoms patched repeatedly",
            ThinkingTool::FirstPrinciples => "Architecture choices and major design decisions",
            ThinkingTool::Pareto8020 => "Too many items and too little time",
            ThinkingTool::SwotScan => "Strategy, competition and direction choices",
            ThinkingTool::Premortem => "Important long-running projects without time pressure",
            ThinkingTool::OodaLoop => "High-pressure situations that change quickly",
            ThinkingTool::SmartGoal => "Planning phases with fuzzy milestones",
            ThinkingTool::CostBenefit => "Comparing options, budgets and ROI",
        }
    }

    pub fn definition(&self) -> ThinkingToolDefinition {
        ThinkingToolDefinition {
            skill_id: self.id().to_string(),
            title: self.title().to_string(),
            description: self.description().to_string(),
            scenario: self.scenario().to_string(),
        }
    }
}

/// Catalog entry as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingToolDefinition {
    pub skill_id: String,
    pub title: String,
    pub description: String,
    pub scenario: String,
}

/// A recommended technique for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingToolRecommendation {
    pub tool: ThinkingTool,
    pub skill_id: String,
    pub title: String,
    pub confidence: f64,
    /// Why the technique fits this task.
    pub why: String,
    /// Smallest concrete step to start with.
    pub next_step: String,
}

/// Priority of a single analysis action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

/// One concrete follow-up from an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisAction {
    pub title: String,
    pub priority: ActionPriority,
    pub rationale: String,
}

/// Structured output of applying a technique to a task.
///
/// `diagnostic` and `decision_rule` are never empty; there is at least one
/// risk and at least two actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingToolAnalysis {
    pub skill_id: String,
    pub tool_title: String,
    pub task_name: String,
    pub why: String,
    pub diagnostic: String,
    pub hypothesis: String,
    pub decision_rule: String,
    pub risks: Vec<String>,
    pub actions: Vec<AnalysisAction>,
    pub review_prompt: String,
}

struct Candidate {
    confidence: f64,
    why: &'static str,
    next_step: &'static str,
}

const VAGUE_TEXT_CHARS: usize = 8;
const LONG_TEXT_CHARS: usize = 20;
const STALE_DAYS: i64 = 3;
const REPEATED_ATTEMPTS: u32 = 3;

const PROJECT_CUES: &[&str] = &[
    "project", "system", "launch", "migration", "roadmap", "项目", "系统", "上线", "方案", "规划",
    "搭建", "改造",
];
const FAILURE_CUES: &[&str] = &[
    "bug", "failure", "failed", "error", "crash", "incident", "outage", "recurring", "broken",
    "故障", "异常", "失败", "复发", "事故", "报错", "问题",
];
const DESIGN_CUES: &[&str] = &[
    "architecture", "refactor", "redesign", "design", "framework", "架构", "重构", "选型", "设计",
    "方案", "框架",
];
const TRADEOFF_CUES: &[&str] = &[
    "evaluate", "compare", "choose", "budget", "cost", "roi", "feasibility", "评估", "比较", "选择",
    "预算", "投入产出", "可行性",
];
const STRATEGY_CUES: &[&str] = &[
    "market", "strategy", "competitor", "competition", "growth", "business model", "市场", "战略",
    "策略", "竞争", "产品方向", "商业模式", "增长",
];

/// Recommends and applies thinking tools.
#[derive(Debug, Clone)]
pub struct ThinkingToolAdvisor {
    max_tools: usize,
}

impl Default for ThinkingToolAdvisor {
    fn default() -> Self {
        Self { max_tools: 3 }
    }
}

impl ThinkingToolAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap on recommendations before near-ties are added. Zero reads as one.
    pub fn with_max_tools(mut self, max_tools: usize) -> Self {
        self.max_tools = max_tools.max(1);
        self
    }

    pub fn allowed_skill_ids() -> Vec<&'static str> {
        ThinkingTool::ALL.iter().map(ThinkingTool::id).collect()
    }

    pub fn is_allowed_skill_id(id: &str) -> bool {
        ThinkingTool::from_id(id).is_some()
    }

    pub fn catalog() -> Vec<ThinkingToolDefinition> {
        ThinkingTool::ALL.iter().map(ThinkingTool::definition).collect()
    }

    /// Best-matching techniques for a task, most confident first.
    ///
    /// Returns the top `max_tools` plus any candidate within
    /// [`NEAR_TIE_MARGIN`] of the last one kept. Never empty.
    pub fn recommend_for_task(
        &self,
        text: &str,
        importance: PriorityLevel,
        urgency: PriorityLevel,
        stuck_duration: Duration,
        attempt_count: u32,
    ) -> Vec<ThinkingToolRecommendation> {
        let candidates = collect_candidates(text, importance, urgency, stuck_duration, attempt_count);

        let mut ranked: Vec<(ThinkingTool, Candidate)> = candidates.into_iter().collect();
        // BTreeMap iteration is catalog order, so a stable sort keeps it for ties.
        ranked.sort_by(|a, b| b.1.confidence.total_cmp(&a.1.confidence));

        let keep = self.max_tools.max(1).min(ranked.len());
        let cutoff = ranked
            .get(keep.saturating_sub(1))
            .map(|(_, c)| c.confidence - NEAR_TIE_MARGIN - 1e-9)
            .unwrap_or(f64::INFINITY);

        let recommendations: Vec<ThinkingToolRecommendation> = ranked
            .into_iter()
            .enumerate()
            .take_while(|(i, (_, c))| *i < keep || c.confidence >= cutoff)
            .map(|(_, (tool, c))| ThinkingToolRecommendation {
                tool,
                skill_id: tool.id().to_string(),
                title: tool.title().to_string(),
                confidence: c.confidence,
                why: c.why.to_string(),
                next_step: c.next_step.to_string(),
            })
            .collect();

        debug!(
            count = recommendations.len(),
            top = recommendations.first().map(|r| r.skill_id.as_str()),
            "recommended thinking tools"
        );
        recommendations
    }

    /// Apply `skill_id` to the task. Unknown ids use the goal clarification
    /// template.
    pub fn analyze_task(
        &self,
        text: &str,
        importance: PriorityLevel,
        urgency: PriorityLevel,
        stuck_duration: Duration,
        skill_id: &str,
    ) -> ThinkingToolAnalysis {
        let tool = ThinkingTool::from_id(skill_id).unwrap_or_else(|| {
            warn!(skill_id, "unknown thinking tool, falling back to clarify_goal");
            ThinkingTool::ClarifyGoal
        });

        let why = collect_candidates(text, importance, urgency, stuck_duration, 0)
            .get(&tool)
            .map(|c| c.why.to_string())
            .unwrap_or_else(|| tool.description().to_string());

        let trimmed = text.trim();
        let context = templates::AnalysisContext {
            task_name: if trimmed.is_empty() { "(untitled task)" } else { trimmed },
            high_importance: importance.is_high(),
            high_urgency: urgency.is_high(),
            stuck_days: stuck_duration.num_days().max(0),
        };
        templates::render(tool, &context, why)
    }
}

fn collect_candidates(
    text: &str,
    importance: PriorityLevel,
    urgency: PriorityLevel,
    stuck_duration: Duration,
    attempt_count: u32,
) -> BTreeMap<ThinkingTool, Candidate> {
    let mut candidates: BTreeMap<ThinkingTool, Candidate> = BTreeMap::new();
    let mut add = |tool: ThinkingTool, confidence: f64, why: &'static str, next_step: &'static str| {
        let candidate = Candidate { confidence, why, next_step };
        match candidates.entry(tool) {
            Entry::Occupied(mut existing) => {
                if confidence > existing.get().confidence {
                    existing.insert(candidate);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    };

    let trimmed = text.trim();
    let chars = trimmed.chars().count();

    if chars < VAGUE_TEXT_CHARS {
        add(
            ThinkingTool::ClarifyGoal,
            0.80,
            "The description is too thin to act on; clarify the goal first.",
            "Write down the goal, the deadline and the acceptance criteria.",
        );
    }
    if chars >= LONG_TEXT_CHARS || contains_any(trimmed, PROJECT_CUES) {
        add(
            ThinkingTool::Decompose,
            0.78,
            "Breaking a complex task down lowers the cost of starting.",
            "Split it into 2-4 steps that each fit in 30 minutes.",
        );
    }
    if contains_any(trimmed, FAILURE_CUES) {
        add(
            ThinkingTool::FiveWhys,
            0.86,
            "Find the root cause before patching, or the fire comes back.",
            "Ask \"why\" five times and write down the cause chain.",
        );
    }
    if contains_any(trimmed, DESIGN_CUES) {
        add(
            ThinkingTool::FirstPrinciples,
            0.73,
            "Design decisions are safer when rebuilt from hard constraints.",
            "List the non-negotiable constraints, then rebuild the options.",
        );
    }
    if contains_any(trimmed, TRADEOFF_CUES) {
        add(
            ThinkingTool::CostBenefit,
            0.75,
            "This is a classic decision; do the math before committing.",
            "List cost, benefit and opportunity cost for 2-3 options.",
        );
    }
    if contains_any(trimmed, STRATEGY_CUES) {
        add(
            ThinkingTool::SwotScan,
            0.70,
            "A SWOT pass before acting reduces blind spots.",
            "Write two points each for S, W, O and T, then pick a strategy.",
        );
    }

    match (importance.is_high(), urgency.is_high()) {
        (true, true) => {
            add(
                ThinkingTool::FocusSprint,
                0.82,
                "Important and urgent work calls for an immediate short sprint.",
                "Start a 25-minute focus block on one key deliverable now.",
            );
            add(
                ThinkingTool::OodaLoop,
                0.80,
                "High pressure needs a fast decide-and-act loop.",
                "Spend 10 minutes on one observe-orient-decide-act round.",
            );
        }
        (false, true) => {
            add(
                ThinkingTool::Pareto8020,
                0.79,
                "Urgent but less important work should deliver its key 20% first.",
                "Mark the minimum necessary result and defer the rest.",
            );
            add(
                ThinkingTool::DelegatePrepare,
                0.75,
                "Delegable work should go to the right person.",
                "Write the goal, deadline, context and acceptance criteria.",
            );
        }
        (true, false) => {
            add(
                ThinkingTool::SmartGoal,
                0.76,
                "Important, non-urgent work needs explicit milestones.",
                "Rewrite the goal as SMART and set this week's milestone.",
            );
            add(
                ThinkingTool::Premortem,
                0.72,
                "Rehearsing failure early raises the odds of success.",
                "Assume it failed and list three causes with preventions.",
            );
        }
        (false, false) => add(
            ThinkingTool::PriorityRebalance,
            0.66,
            "Low-importance, low-urgency work should not eat prime time.",
            "Decide whether to postpone, merge or drop this task.",
        ),
    }

    if stuck_duration >= Duration::days(STALE_DAYS) {
        add(
            ThinkingTool::RiskCheck,
            0.74,
            "The task has stalled; identify the blocker first.",
            "Write down one key blocker and one action to remove it.",
        );
    }
    if attempt_count >= REPEATED_ATTEMPTS {
        add(
            ThinkingTool::RiskCheck,
            0.70,
            "Several attempts have not moved this task; something is blocking it.",
            "Name what stopped the last attempt before trying again.",
        );
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use PriorityLevel::{High, Low, Unknown};

    #[test]
    fn test_catalog_includes_classic_tools() {
        let ids = ThinkingToolAdvisor::allowed_skill_ids();
        for id in [
            "five_whys",
            "first_principles",
            "pareto_80_20",
            "swot_scan",
            "premortem",
            "ooda_loop",
            "smart_goal",
            "cost_benefit",
        ] {
            assert!(ids.contains(&id), "missing {id}");
        }
        assert_eq!(ids.len(), 14);
        assert!(ThinkingToolAdvisor::is_allowed_skill_id(" Five_Whys "));
        assert!(!ThinkingToolAdvisor::is_allowed_skill_id("magic"));
    }

    #[test]
    fn test_serde_ids_match_catalog_ids() {
        for tool in ThinkingTool::ALL {
            let json = serde_json::to_string(&tool).unwrap();
            assert_eq!(json, format!("\"{}\"", tool.id()));
        }
    }

    #[test]
    fn test_recurring_failure_prefers_root_cause() {
        let advisor = ThinkingToolAdvisor::new();
        let result = advisor.recommend_for_task(
            "线上故障反复出现，需要尽快修复并避免复发",
            High,
            High,
            Duration::days(1),
            3,
        );
        assert_eq!(result[0].tool, ThinkingTool::FiveWhys);
    }

    #[test]
    fn test_strategy_text_can_suggest_swot_or_cost_benefit() {
        let advisor = ThinkingToolAdvisor::new();
        let result = advisor.recommend_for_task(
            "评估新市场进入策略并比较不同商业模式投入产出",
            High,
            Low,
            Duration::zero(),
            4,
        );
        assert!(result
            .iter()
            .any(|r| r.tool == ThinkingTool::SwotScan || r.tool == ThinkingTool::CostBenefit));
    }

    #[test]
    fn test_near_ties_surface_beyond_cap() {
        // clarify_goal 0.80 and ooda_loop 0.80 tie; focus_sprint 0.82 leads.
        let advisor = ThinkingToolAdvisor::new().with_max_tools(1);
        let result = advisor.recommend_for_task("fix", High, High, Duration::zero(), 0);
        let ids: Vec<&str> = result.iter().map(|r| r.skill_id.as_str()).collect();
        assert_eq!(ids, vec!["focus_sprint", "clarify_goal", "ooda_loop"]);
    }

    #[test]
    fn test_recommendations_sorted_and_never_empty() {
        let advisor = ThinkingToolAdvisor::new();
        let result = advisor.recommend_for_task("", Unknown, Unknown, Duration::days(10), 5);
        assert!(!result.is_empty());
        assert!(result
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
        assert!(result.iter().any(|r| r.tool == ThinkingTool::RiskCheck));
    }

    #[test]
    fn test_analysis_minimums_hold_for_every_tool() {
        let advisor = ThinkingToolAdvisor::new();
        for tool in ThinkingTool::ALL {
            let report = advisor.analyze_task("", Low, Low, Duration::zero(), tool.id());
            assert_eq!(report.skill_id, tool.id());
            assert!(!report.diagnostic.trim().is_empty());
            assert!(!report.decision_rule.trim().is_empty());
            assert!(!report.risks.is_empty());
            assert!(report.actions.len() >= 2);
        }
    }

    #[test]
    fn test_analysis_five_whys_adds_context_risks() {
        let advisor = ThinkingToolAdvisor::new();
        let report =
            advisor.analyze_task("线上支付故障反复出现", High, High, Duration::days(4), "five_whys");
        assert_eq!(report.skill_id, "five_whys");
        assert_eq!(report.task_name, "线上支付故障反复出现");
        assert_eq!(report.risks.len(), 4);
        assert!(report.actions.len() >= 2);
    }

    #[test]
    fn test_unknown_skill_falls_back_to_clarify_goal() {
        let advisor = ThinkingToolAdvisor::new();
        let report = advisor.analyze_task("Plan", Unknown, Unknown, Duration::zero(), "nope");
        assert_eq!(report.skill_id, "clarify_goal");
        assert!(!report.why.is_empty());
    }
}
