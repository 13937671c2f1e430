//! Integration tests for intent recognition and thinking tool advice.

use chrono::Duration;
use priomatrix_core::{IntentRecognizer, PriorityLevel, ThinkingToolAdvisor};

#[test]
fn test_every_catalog_tool_produces_full_analysis() {
    let advisor = ThinkingToolAdvisor::new();
    for skill_id in ThinkingToolAdvisor::allowed_skill_ids() {
        let analysis = advisor.analyze_task(
            "Prepare the launch plan",
            PriorityLevel::High,
            PriorityLevel::Low,
            Duration::days(4),
            skill_id,
        );
        assert_eq!(analysis.skill_id, skill_id);
        assert!(!analysis.diagnostic.is_empty(), "{skill_id}: empty diagnostic");
        assert!(!analysis.decision_rule.is_empty(), "{skill_id}: empty decision rule");
        assert!(!analysis.risks.is_empty(), "{skill_id}: no risks");
        assert!(analysis.actions.len() >= 2, "{skill_id}: too few actions");
    }
}

#[test]
fn test_unknown_tool_falls_back_to_clarify_goal() {
    let analysis = ThinkingToolAdvisor::new().analyze_task(
        "anything",
        PriorityLevel::Unknown,
        PriorityLevel::Unknown,
        Duration::zero(),
        "not_a_tool",
    );
    assert_eq!(analysis.skill_id, "clarify_goal");
}

#[test]
fn test_recommendations_come_from_catalog() {
    let advisor = ThinkingToolAdvisor::new().with_max_tools(2);
    let recs = advisor.recommend_for_task(
        "项目失败了，需要复盘原因",
        PriorityLevel::High,
        PriorityLevel::High,
        Duration::days(5),
        4,
    );
    assert!(recs.len() >= 2);
    for rec in &recs {
        assert!(ThinkingToolAdvisor::is_allowed_skill_id(&rec.skill_id));
    }
    for pair in recs.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
}

#[test]
fn test_intent_scores_stay_in_range() {
    let recognizer = IntentRecognizer::new();
    for text in ["", "hi", "明天上午十点前提交报告", "remind me to call the bank", "哈哈哈"] {
        let score = recognizer.score_task_likelihood(text);
        assert!((0.0..=1.0).contains(&score), "{text:?} scored {score}");
    }
    assert!(recognizer.is_potential_task("remind me to call the bank tomorrow"));
    assert!(!recognizer.is_potential_task("哈哈哈"));
}
