use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::config::{FeatureConfig, RecognitionConfig};
use crate::input::gesture::Gesture;
use super::features::{preprocess, FeatureTensor};
use super::template::{RuneTemplate, TemplateRecognizer};

/// What a classifier made of a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A symbol id plus the classifier's score for it (template distance
    /// or model probability, depending on the backend).
    Rune { label: String, score: f32 },
    /// Rejected: incomplete gesture, no close match, or low confidence.
    NoRune,
}

impl Classification {
    pub fn label(&self) -> Option<&str> {
        match self {
            Classification::Rune { label, .. } => Some(label.as_str()),
            Classification::NoRune => None,
        }
    }
}

/// Maps a finished gesture to a symbol id.
///
/// Implementations must be shareable across threads so classification can
/// run off the battle's scheduling path.
pub trait RuneClassifier: Send + Sync {
    fn classify(&self, gesture: &Gesture) -> Classification;
}

// ---- Geometric backend ----

/// Template matching with the completeness gate and distance threshold
/// applied.
pub struct TemplateClassifier {
    recognizer: TemplateRecognizer,
}

impl TemplateClassifier {
    pub fn new(config: RecognitionConfig, templates: Vec<RuneTemplate>) -> Self {
        Self {
            recognizer: TemplateRecognizer::new(config, templates),
        }
    }

    pub fn recognizer(&self) -> &TemplateRecognizer {
        &self.recognizer
    }
}

impl RuneClassifier for TemplateClassifier {
    fn classify(&self, gesture: &Gesture) -> Classification {
        if !self.recognizer.is_gesture_complete(gesture) {
            log::debug!("gesture rejected before matching ({} points)", gesture.point_count());
            return Classification::NoRune;
        }
        let result = self.recognizer.recognize(gesture);
        match result.accepted(self.recognizer.config().match_threshold) {
            Some(template) => Classification::Rune {
                label: template.id.clone(),
                score: result.distance,
            },
            None => Classification::NoRune,
        }
    }
}

// ---- Learned backend ----

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to load model: {0}")]
    Load(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("oracle returned no scores")]
    Empty,
}

/// External learned model: raw per-class logits for one feature tensor.
pub trait ClassifierOracle: Send + Sync {
    fn scores(&self, input: &FeatureTensor) -> Result<Vec<f32>, OracleError>;
}

/// Ordered class labels, index `i` naming the oracle's `i`th output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parse a JSON array of label strings.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Feature pipeline, oracle and label table composed into a classifier.
pub struct ModelClassifier<O: ClassifierOracle> {
    oracle: O,
    labels: LabelTable,
    config: FeatureConfig,
}

impl<O: ClassifierOracle> ModelClassifier<O> {
    pub fn new(oracle: O, labels: LabelTable, config: FeatureConfig) -> Self {
        Self { oracle, labels, config }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }
}

impl<O: ClassifierOracle> RuneClassifier for ModelClassifier<O> {
    fn classify(&self, gesture: &Gesture) -> Classification {
        if gesture.point_count() < 2 {
            return Classification::NoRune;
        }

        let input = preprocess(gesture, &self.config);
        let logits = match self.oracle.scores(&input) {
            Ok(logits) if logits.is_empty() => {
                log::warn!("oracle: {}", OracleError::Empty);
                return Classification::NoRune;
            }
            Ok(logits) => logits,
            Err(e) => {
                log::warn!("oracle: {e}");
                return Classification::NoRune;
            }
        };
        if logits.len() != self.labels.len() {
            log::warn!(
                "oracle returned {} scores for {} labels",
                logits.len(),
                self.labels.len()
            );
        }

        let probs = softmax(&logits);
        let Some((index, &p)) = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
        else {
            return Classification::NoRune;
        };

        match self.labels.get(index) {
            Some(label) if p >= self.config.min_confidence => {
                log::debug!("oracle picked {label} (p = {p:.3})");
                Classification::Rune {
                    label: label.to_string(),
                    score: p,
                }
            }
            Some(label) => {
                log::debug!("oracle unsure: {label} at p = {p:.3}");
                Classification::NoRune
            }
            None => Classification::NoRune,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::gesture::Point;
    use crate::recognition::runes::TemplateSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedOracle {
        logits: Vec<f32>,
        calls: AtomicUsize,
    }

    impl FixedOracle {
        fn new(logits: Vec<f32>) -> Self {
            Self { logits, calls: AtomicUsize::new(0) }
        }
    }

    impl ClassifierOracle for FixedOracle {
        fn scores(&self, input: &FeatureTensor) -> Result<Vec<f32>, OracleError> {
            assert_eq!(input.shape(), [1, 100, 4]);
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.logits.clone())
        }
    }

    struct BrokenOracle;

    impl ClassifierOracle for BrokenOracle {
        fn scores(&self, _input: &FeatureTensor) -> Result<Vec<f32>, OracleError> {
            Err(OracleError::Inference("session poisoned".into()))
        }
    }

    fn labels() -> LabelTable {
        LabelTable::from_json(r#"["Fehu", "Lefu", "Venhu"]"#).unwrap()
    }

    fn zigzag() -> Gesture {
        let stroke = (0..20)
            .map(|i| Point::new(i as f32 * 5.0, if i % 2 == 0 { 0.0 } else { 30.0 }, i as f32 * 16.0))
            .collect();
        Gesture::new(vec![stroke])
    }

    #[test]
    fn softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(p[2] > p[1] && p[1] > p[0]);
        // large logits stay finite
        let p = softmax(&[1000.0, 0.0]);
        assert!((p[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn label_table_preserves_order() {
        let table = labels();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1), Some("Lefu"));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn confident_oracle_yields_argmax_label() {
        let oracle = FixedOracle::new(vec![0.1, 0.2, 6.0]);
        let classifier = ModelClassifier::new(oracle, labels(), FeatureConfig::default());
        let result = classifier.classify(&zigzag());
        assert_eq!(result.label(), Some("Venhu"));
        assert_eq!(classifier.oracle.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unsure_oracle_is_rejected() {
        let oracle = FixedOracle::new(vec![1.0, 1.1, 0.9]);
        let classifier = ModelClassifier::new(oracle, labels(), FeatureConfig::default());
        assert_eq!(classifier.classify(&zigzag()), Classification::NoRune);
    }

    #[test]
    fn oracle_failure_is_no_rune() {
        let classifier = ModelClassifier::new(BrokenOracle, labels(), FeatureConfig::default());
        assert_eq!(classifier.classify(&zigzag()), Classification::NoRune);
    }

    #[test]
    fn index_past_label_table_is_no_rune() {
        let oracle = FixedOracle::new(vec![0.0, 0.0, 0.0, 9.0]);
        let classifier = ModelClassifier::new(oracle, labels(), FeatureConfig::default());
        assert_eq!(classifier.classify(&zigzag()), Classification::NoRune);
    }

    #[test]
    fn template_classifier_gates_and_matches() {
        let set = TemplateSet::builtin();
        let classifier = TemplateClassifier::new(RecognitionConfig::default(), set.templates.clone());

        let tap = Gesture::new(vec![vec![Point::new(10.0, 10.0, 0.0), Point::new(11.0, 10.0, 16.0)]]);
        assert_eq!(classifier.classify(&tap), Classification::NoRune);

        let isaz = set.get("Isaz").unwrap().strokes.clone();
        assert_eq!(classifier.classify(&isaz).label(), Some("Isaz"));
    }
}
