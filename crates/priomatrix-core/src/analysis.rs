//! Free-text analysis seam.
//!
//! An external analyzer (a language model client, say) can classify task
//! text better than keyword tables, but it may be missing or fail. Callers go
//! through [`AnalyzerWithFallback`], which answers from the local
//! [`IntentRecognizer`] whenever the collaborator cannot.

use tracing::warn;

use crate::intent::IntentRecognizer;
use crate::task::PriorityLevel;

/// A free-text analysis backend.
pub trait TextAnalyzer: Send + Sync {
    /// Short identifier used in logs (e.g. "keywords", "llm").
    fn name(&self) -> &str;

    /// Likelihood in [0, 1] that `text` describes an actionable task.
    fn task_likelihood(&self, text: &str) -> Result<f64, Box<dyn std::error::Error>>;

    /// `(importance, urgency)` read from `text`.
    fn estimate_priority(
        &self,
        text: &str,
    ) -> Result<(PriorityLevel, PriorityLevel), Box<dyn std::error::Error>>;

    /// Clean task description, or `None` when nothing usable remains.
    fn extract_description(&self, text: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
        let trimmed = text.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
}

impl TextAnalyzer for IntentRecognizer {
    fn name(&self) -> &str {
        "keywords"
    }

    fn task_likelihood(&self, text: &str) -> Result<f64, Box<dyn std::error::Error>> {
        Ok(self.score_task_likelihood(text))
    }

    fn estimate_priority(
        &self,
        text: &str,
    ) -> Result<(PriorityLevel, PriorityLevel), Box<dyn std::error::Error>> {
        Ok(IntentRecognizer::estimate_priority(self, text))
    }

    fn extract_description(&self, text: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
        Ok(self.extract_task_description(text))
    }
}

/// Optional external analyzer backed by the keyword recognizer.
///
/// Errors from the external analyzer are logged and never surface.
pub struct AnalyzerWithFallback {
    primary: Option<Box<dyn TextAnalyzer>>,
    fallback: IntentRecognizer,
}

impl AnalyzerWithFallback {
    /// Keyword recognizer only.
    pub fn local(fallback: IntentRecognizer) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }

    pub fn with_primary(mut self, analyzer: Box<dyn TextAnalyzer>) -> Self {
        self.primary = Some(analyzer);
        self
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn task_likelihood(&self, text: &str) -> f64 {
        if let Some(primary) = &self.primary {
            match primary.task_likelihood(text) {
                Ok(score) if score.is_finite() => return score.clamp(0.0, 1.0),
                Ok(score) => warn!(analyzer = primary.name(), score, "non-finite likelihood, using keywords"),
                Err(e) => warn!(analyzer = primary.name(), "likelihood failed, using keywords: {e}"),
            }
        }
        self.fallback.score_task_likelihood(text)
    }

    /// Likelihood at or above the recognizer's threshold.
    pub fn is_potential_task(&self, text: &str) -> bool {
        self.task_likelihood(text) >= self.fallback.task_threshold()
    }

    pub fn estimate_priority(&self, text: &str) -> (PriorityLevel, PriorityLevel) {
        if let Some(primary) = &self.primary {
            match primary.estimate_priority(text) {
                Ok(levels) => return levels,
                Err(e) => warn!(analyzer = primary.name(), "priority failed, using keywords: {e}"),
            }
        }
        self.fallback.estimate_priority(text)
    }

    pub fn extract_description(&self, text: &str) -> Option<String> {
        if let Some(primary) = &self.primary {
            match primary.extract_description(text) {
                Ok(description) => return description,
                Err(e) => warn!(analyzer = primary.name(), "extraction failed, using keywords: {e}"),
            }
        }
        self.fallback.extract_task_description(text)
    }
}

impl Default for AnalyzerWithFallback {
    fn default() -> Self {
        Self::local(IntentRecognizer::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl TextAnalyzer for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        fn task_likelihood(&self, _text: &str) -> Result<f64, Box<dyn std::error::Error>> {
            Err("connection refused".into())
        }

        fn estimate_priority(
            &self,
            _text: &str,
        ) -> Result<(PriorityLevel, PriorityLevel), Box<dyn std::error::Error>> {
            Err("connection refused".into())
        }
    }

    struct Fixed(f64);

    impl TextAnalyzer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn task_likelihood(&self, _text: &str) -> Result<f64, Box<dyn std::error::Error>> {
            Ok(self.0)
        }

        fn estimate_priority(
            &self,
            _text: &str,
        ) -> Result<(PriorityLevel, PriorityLevel), Box<dyn std::error::Error>> {
            Ok((PriorityLevel::High, PriorityLevel::High))
        }
    }

    #[test]
    fn test_failing_analyzer_falls_back() {
        let text = "明天之前提交季度报告";
        let recognizer = IntentRecognizer::default();
        let analyzer = AnalyzerWithFallback::default().with_primary(Box::new(Offline));

        assert_eq!(analyzer.task_likelihood(text), recognizer.score_task_likelihood(text));
        assert_eq!(
            analyzer.estimate_priority(text),
            IntentRecognizer::estimate_priority(&recognizer, text)
        );
    }

    #[test]
    fn test_primary_answer_wins_and_is_clamped() {
        let analyzer = AnalyzerWithFallback::default().with_primary(Box::new(Fixed(1.7)));
        assert_eq!(analyzer.task_likelihood("anything"), 1.0);
        assert!(analyzer.is_potential_task("anything"));
        assert_eq!(
            analyzer.estimate_priority("hi"),
            (PriorityLevel::High, PriorityLevel::High)
        );
    }

    #[test]
    fn test_default_extraction_trims() {
        let analyzer = AnalyzerWithFallback::default().with_primary(Box::new(Fixed(0.5)));
        assert_eq!(analyzer.extract_description("  write docs "), Some("write docs".into()));
        assert_eq!(analyzer.extract_description("   "), None);
    }

    #[test]
    fn test_local_has_no_primary() {
        assert!(!AnalyzerWithFallback::default().has_primary());
    }
}
