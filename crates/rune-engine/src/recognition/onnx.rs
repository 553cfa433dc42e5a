//! ONNX Runtime oracle for the sequence classifier.
//!
//! The exported model takes a `[1, MAX_POINTS, 4]` float tensor and returns
//! one row of logits. Only the loading and inference plumbing lives here; the
//! model file itself is supplied by the host.

use std::path::Path;
use std::sync::Mutex;

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use super::classifier::{ClassifierOracle, OracleError};
use super::features::FeatureTensor;

pub struct OnnxOracle {
    session: Mutex<Session>,
}

impl OnnxOracle {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OracleError> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(4))
            .and_then(|b| b.commit_from_file(path.as_ref()))
            .map_err(|e| OracleError::Load(e.to_string()))?;
        log::info!("loaded rune model from {}", path.as_ref().display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }

    pub fn from_bytes(model: &[u8]) -> Result<Self, OracleError> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_memory(model))
            .map_err(|e| OracleError::Load(e.to_string()))?;
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl ClassifierOracle for OnnxOracle {
    fn scores(&self, input: &FeatureTensor) -> Result<Vec<f32>, OracleError> {
        let [batch, rows, channels] = input.shape();
        let tensor = Tensor::from_array(([batch, rows, channels], input.to_vec()))
            .map_err(|e| OracleError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| OracleError::Inference("session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| OracleError::Inference(e.to_string()))?;

        let (_shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| OracleError::Inference(e.to_string()))?;
        if logits.is_empty() {
            return Err(OracleError::Empty);
        }
        Ok(logits.to_vec())
    }
}
