//! Confidence filtering for raw artifacts.
//!
//! Missing confidence is treated as pass-through so nothing is lost early;
//! later stages can down-rank or discard.

use crate::config::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::types::RawArtifact;

/// Pass/reject gate over artifact confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceFilter {
    threshold: f64,
}

impl ConfidenceFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Unknown confidence passes; known confidence passes at or above the threshold.
    pub fn passes(&self, artifact: &RawArtifact) -> bool {
        artifact
            .confidence
            .map_or(true, |confidence| confidence >= self.threshold)
    }

    /// Keep only the artifacts that pass, preserving order.
    pub fn apply(&self, artifacts: Vec<RawArtifact>) -> Vec<RawArtifact> {
        artifacts.into_iter().filter(|a| self.passes(a)).collect()
    }
}

impl Default for ConfidenceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

/// Filter `artifacts` against `threshold`.
pub fn filter_by_confidence(artifacts: Vec<RawArtifact>, threshold: f64) -> Vec<RawArtifact> {
    ConfidenceFilter::new(threshold).apply(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(confidence: Option<f64>) -> RawArtifact {
        RawArtifact {
            confidence,
            ..RawArtifact::new("task", "Taskfile.yml")
        }
    }

    #[test]
    fn test_unknown_confidence_passes() {
        let filter = ConfidenceFilter::new(0.99);
        assert!(filter.passes(&artifact(None)));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let filter = ConfidenceFilter::default();
        assert_eq!(filter.threshold(), 0.35);
        assert!(filter.passes(&artifact(Some(0.35))));
        assert!(filter.passes(&artifact(Some(0.6))));
        assert!(!filter.passes(&artifact(Some(0.34))));
    }

    #[test]
    fn test_filter_preserves_order() {
        let artifacts = vec![
            RawArtifact {
                kind: "a".to_string(),
                ..artifact(Some(0.9))
            },
            artifact(Some(0.1)),
            RawArtifact {
                kind: "c".to_string(),
                ..artifact(None)
            },
        ];

        let kept = filter_by_confidence(artifacts, 0.5);
        let kinds: Vec<_> = kept.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, vec!["a", "c"]);
    }
}
