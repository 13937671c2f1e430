//! Fixed analysis templates, one per [`ThinkingTool`].

use super::{ActionPriority, AnalysisAction, ThinkingTool, ThinkingToolAnalysis};

const STALE_RISK_DAYS: i64 = 3;

pub(super) struct AnalysisContext<'a> {
    pub task_name: &'a str,
    pub high_importance: bool,
    pub high_urgency: bool,
    pub stuck_days: i64,
}

impl AnalysisContext<'_> {
    /// Priority of the opening action, following the task's own weight.
    fn lead_priority(&self) -> ActionPriority {
        match (self.high_importance, self.high_urgency) {
            (true, true) => ActionPriority::High,
            (false, false) => ActionPriority::Low,
            _ => ActionPriority::Medium,
        }
    }
}

#[derive(Clone, Copy)]
enum Prio {
    Lead,
    Fixed(ActionPriority),
}

use Prio::{Fixed, Lead};
const HIGH: Prio = Fixed(ActionPriority::High);
const MEDIUM: Prio = Fixed(ActionPriority::Medium);
const LOW: Prio = Fixed(ActionPriority::Low);

struct Template {
    diagnostic: &'static str,
    hypothesis: &'static str,
    decision_rule: &'static str,
    risks: [&'static str; 2],
    actions: [(Prio, &'static str, &'static str); 3],
    review_prompt: &'static str,
}

fn template(tool: ThinkingTool) -> Template {
    match tool {
        ThinkingTool::FiveWhys => Template {
            diagnostic: "The problem keeps coming back; current work treats symptoms rather than the root cause.",
            hypothesis: "A process gap, lost information or an unclear quality bar lets the problem recur.",
            decision_rule: "If the same issue recurs twice within two weeks, stop patching and run a root-cause analysis.",
            risks: [
                "Fixing only the current failure lets it return later.",
                "Changing the process before the root cause is verified can add new risk.",
            ],
            actions: [
                (HIGH, "Write a five-level \"why\" chain down to a verifiable cause.", "Straighten the chain of facts before guessing."),
                (HIGH, "Define one prevention measure and one detection metric for that cause.", "A change you cannot measure cannot be verified."),
                (MEDIUM, "Schedule a check 24 hours later to confirm it has not recurred.", "Closing the loop prevents regressions."),
            ],
            review_prompt: "Does the evidence support the root cause, and is the prevention measurable?",
        },
        ThinkingTool::FirstPrinciples => Template {
            diagnostic: "The task involves a design decision that may be anchored on how it was done before.",
            hypothesis: "Re-deriving from hard constraints can yield a cheaper or sturdier option.",
            decision_rule: "List the non-negotiable constraints first; drop any option that violates one.",
            risks: [
                "Reusing the old approach by habit raises long-term maintenance cost.",
                "Over-engineering from scratch can delay delivery.",
            ],
            actions: [
                (HIGH, "Write down the three to five constraints that cannot move.", "Constraints define the real solution space."),
                (MEDIUM, "Sketch two options derived from those constraints alone.", "Comparing derived options exposes inherited assumptions."),
                (MEDIUM, "Pick the option with the fewest unverified assumptions.", "Fewer assumptions means fewer surprises."),
            ],
            review_prompt: "Was the final choice made by habit or because it best fits the constraints?",
        },
        ThinkingTool::SwotScan => Template {
            diagnostic: "The task is a direction choice where blind spots are likely.",
            hypothesis: "After a SWOT pass the strategic priorities become clearer.",
            decision_rule: "Prefer the strategy that uses a strength and covers the biggest threat.",
            risks: [
                "Optimism bias can hide real weaknesses.",
                "Threats listed but never acted on give false comfort.",
            ],
            actions: [
                (HIGH, "Write two points each for strengths, weaknesses, opportunities and threats.", "A balanced scan avoids one-sided plans."),
                (MEDIUM, "Pair each opportunity with a strength that can exploit it.", "Strategy comes from combining quadrants."),
                (MEDIUM, "Assign a mitigation to the most serious threat.", "Unowned threats stay threats."),
            ],
            review_prompt: "Did the strategy use a strength while covering the main threat?",
        },
        ThinkingTool::CostBenefit => Template {
            diagnostic: "The task is a choice between options whose costs are not yet explicit.",
            hypothesis: "Quantifying cost and benefit reduces disagreement about the choice.",
            decision_rule: "Choose the option with the best benefit-to-cost ratio unless it breaks a hard constraint.",
            risks: [
                "Hidden costs such as maintenance or context switching get ignored.",
                "Benefits estimated too optimistically skew the comparison.",
            ],
            actions: [
                (HIGH, "List cost, benefit and opportunity cost for two or three options.", "Side-by-side numbers make trade-offs visible."),
                (MEDIUM, "Mark which estimates are guesses and which are measured.", "Confidence in the inputs bounds confidence in the result."),
                (LOW, "Set a checkpoint to compare actual benefit with the estimate.", "Calibrates the next decision."),
            ],
            review_prompt: "Did the result reach the estimated benefit, and where did the gap come from?",
        },
        ThinkingTool::Premortem => Template {
            diagnostic: "The task matters over the long run but has no pressure that would expose weak spots early.",
            hypothesis: "Rehearsing failure up front reduces blockers during execution.",
            decision_rule: "Every failure cause rated likely must have a prevention step before work starts.",
            risks: [
                "Long horizons let scope drift unnoticed.",
                "Dependencies on other people surface too late.",
            ],
            actions: [
                (HIGH, "Assume the task failed and list three reasons why.", "Imagined failure is cheaper than real failure."),
                (MEDIUM, "Add one prevention step for each reason.", "Turns fears into a plan."),
                (LOW, "Put a mid-point review on the calendar.", "Catches drift before it compounds."),
            ],
            review_prompt: "Were the risks found in the premortem actually triggered?",
        },
        ThinkingTool::OodaLoop => Template {
            diagnostic: "The situation is changing quickly and waiting for a full plan costs time.",
            hypothesis: "Short observe-orient-decide-act cycles raise reaction speed and hit rate.",
            decision_rule: "Commit to the best action available after each ten-minute cycle.",
            risks: [
                "Acting on stale observations repeats mistakes.",
                "Cycling without recording decisions loses learning.",
            ],
            actions: [
                (HIGH, "Observe: list what changed since the last check.", "Decisions need current facts."),
                (HIGH, "Decide and act on one step within ten minutes.", "Speed is the point of the loop."),
                (MEDIUM, "Record the outcome before starting the next cycle.", "Feedback drives the next orientation."),
            ],
            review_prompt: "Did every cycle have a clear input, output and feedback?",
        },
        ThinkingTool::SmartGoal => Template {
            diagnostic: "The goal is stated loosely, so progress is hard to judge.",
            hypothesis: "Rewriting the goal as SMART improves pace and consistency.",
            decision_rule: "Work only starts once the goal has a metric and a date.",
            risks: [
                "Vague goals invite endless polishing.",
                "An unrealistic target erodes motivation.",
            ],
            actions: [
                (HIGH, "Rewrite the goal with a metric, an owner and a date.", "Makes done unambiguous."),
                (MEDIUM, "Check that the target is achievable with current capacity.", "Keeps the goal credible."),
                (MEDIUM, "Set this week's milestone.", "Large goals move through small milestones."),
            ],
            review_prompt: "Is the goal measurable and bounded in time?",
        },
        ThinkingTool::Pareto8020 => Template {
            diagnostic: "Time is short and effort is spread across parts of unequal value.",
            hypothesis: "Focusing on the high-impact 20% produces a visible result sooner.",
            decision_rule: "Do only what the minimum acceptable result requires; defer the rest.",
            risks: [
                "Cutting too deep can miss a hard requirement.",
                "Deferred work may be forgotten.",
            ],
            actions: [
                (HIGH, "Mark the minimum necessary result.", "Defines the critical 20%."),
                (MEDIUM, "Drop or defer everything outside it.", "Frees time for what matters."),
                (LOW, "Park deferred items in a visible list.", "Nothing silently disappears."),
            ],
            review_prompt: "Was this week's time really spent on the critical 20%?",
        },
        ThinkingTool::Decompose => Template {
            diagnostic: "The task is too large or vague to start directly.",
            hypothesis: "Steps of about 30 minutes raise the completion rate.",
            decision_rule: "Any step longer than an hour gets split again.",
            risks: [
                "Steps without a clear output stall just like the whole task.",
                "Over-splitting adds tracking overhead.",
            ],
            actions: [
                (Lead, "Split the task into two to four steps of about 30 minutes.", "Small steps lower the start barrier."),
                (MEDIUM, "Give each step an explicit input and output.", "Clear hand-offs keep momentum."),
                (LOW, "Start the first step today.", "Momentum beats planning."),
            ],
            review_prompt: "Did every sub-step have a clear input and output?",
        },
        ThinkingTool::FocusSprint => Template {
            diagnostic: "The task is both important and time-critical; any delay costs.",
            hypothesis: "A 25-minute focus block delivers a visible result and relieves pressure.",
            decision_rule: "During the sprint, only work that advances the key deliverable is allowed.",
            risks: [
                "Notifications break the sprint.",
                "Trying to finish everything in one sprint leads to burnout.",
            ],
            actions: [
                (HIGH, "Start a 25-minute focus block on one deliverable.", "One target per sprint."),
                (MEDIUM, "Silence notifications for the block.", "Protects attention."),
                (MEDIUM, "Write down the next step before the break.", "Makes restarting cheap."),
            ],
            review_prompt: "Did the sprint produce something deliverable?",
        },
        ThinkingTool::RiskCheck => Template {
            diagnostic: "Progress has stopped and the blocker is not named yet.",
            hypothesis: "Naming risks early with a response plan reduces interruptions and rework.",
            decision_rule: "If a blocker cannot be removed within a day, escalate or change the plan.",
            risks: [
                "Hidden dependencies stall the work again.",
                "Unaddressed blockers become deadline misses.",
            ],
            actions: [
                (HIGH, "Write down the single biggest blocker.", "You cannot remove what you have not named."),
                (HIGH, "Define one action that removes or bypasses it.", "Turns the blocker into work."),
                (LOW, "Note a fallback if the action fails.", "Keeps the task moving."),
            ],
            review_prompt: "Which risks were triggered, and did the response work?",
        },
        ThinkingTool::DelegatePrepare => Template {
            diagnostic: "The task is urgent but not core, and is a fit for someone else.",
            hypothesis: "A minimal complete handoff package makes collaboration much faster.",
            decision_rule: "Delegate when someone else can finish it with the package alone.",
            risks: [
                "A thin handoff causes back-and-forth questions.",
                "Delegated work without a deadline drifts.",
            ],
            actions: [
                (Lead, "Write the goal, deadline, context and acceptance criteria.", "The package must stand on its own."),
                (MEDIUM, "Pick the owner and confirm their availability.", "Delegation needs a receiver."),
                (LOW, "Set one check-in before the deadline.", "Catches misunderstandings early."),
            ],
            review_prompt: "Could the other person execute without asking further questions?",
        },
        ThinkingTool::PriorityRebalance => Template {
            diagnostic: "The task is competing for time it may not deserve.",
            hypothesis: "Reordering by importance and urgency frees time for high-value work.",
            decision_rule: "Low-importance, low-urgency work only happens after the top priorities move.",
            risks: [
                "Low-value work crowds out important tasks.",
                "Dropping a task without telling stakeholders causes friction.",
            ],
            actions: [
                (Lead, "Decide to postpone, merge or drop this task.", "Every task needs a reason to stay."),
                (MEDIUM, "Move the top important task into today's plan.", "Fill the freed time deliberately."),
                (LOW, "Tell anyone affected about the change.", "Avoids surprises."),
            ],
            review_prompt: "Did the rebalanced order hold for the rest of the week?",
        },
        ThinkingTool::ClarifyGoal => Template {
            diagnostic: "The goal, scope or definition of done is unclear.",
            hypothesis: "Clarifying goal, boundary and done criteria first greatly reduces rework.",
            decision_rule: "No execution until the definition of done fits in one sentence.",
            risks: [
                "Work starts in the wrong direction.",
                "Stakeholders disagree on what done means.",
            ],
            actions: [
                (Lead, "Write one sentence stating the outcome.", "A crisp outcome anchors everything else."),
                (MEDIUM, "List what is explicitly out of scope.", "Boundaries prevent creep."),
                (MEDIUM, "Agree on the acceptance criteria.", "Shared done avoids rework."),
            ],
            review_prompt: "Does everyone share the same definition of done?",
        },
    }
}

pub(super) fn render(tool: ThinkingTool, ctx: &AnalysisContext<'_>, why: String) -> ThinkingToolAnalysis {
    let template = template(tool);
    let lead = ctx.lead_priority();

    let mut risks: Vec<String> = template.risks.iter().map(|r| r.to_string()).collect();
    if ctx.high_importance && ctx.high_urgency {
        risks.push("A high-priority task gets interrupted by non-critical work.".to_string());
    }
    if ctx.stuck_days >= STALE_RISK_DAYS {
        risks.push(format!(
            "Stalled for {} days; task context is fading.",
            ctx.stuck_days
        ));
    }

    let actions = template
        .actions
        .iter()
        .map(|(prio, title, rationale)| AnalysisAction {
            title: title.to_string(),
            priority: match prio {
                Lead => lead,
                Fixed(p) => *p,
            },
            rationale: rationale.to_string(),
        })
        .collect();

    ThinkingToolAnalysis {
        skill_id: tool.id().to_string(),
        tool_title: tool.title().to_string(),
        task_name: ctx.task_name.to_string(),
        why,
        diagnostic: format!("{}: {}", ctx.task_name, template.diagnostic),
        hypothesis: template.hypothesis.to_string(),
        decision_rule: template.decision_rule.to_string(),
        risks,
        actions,
        review_prompt: template.review_prompt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_priority_follows_task_weight() {
        let ctx = AnalysisContext {
            task_name: "Draft plan",
            high_importance: true,
            high_urgency: false,
            stuck_days: 0,
        };
        let report = render(ThinkingTool::Decompose, &ctx, String::new());
        assert_eq!(report.actions[0].priority, ActionPriority::Medium);
        assert_eq!(report.risks.len(), 2);
        assert!(report.diagnostic.starts_with("Draft plan:"));
    }
}
