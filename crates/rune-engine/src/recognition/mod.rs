pub mod classifier;
pub mod features;
pub mod geometry;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod runes;
pub mod template;

pub use classifier::{
    Classification, ClassifierOracle, LabelTable, ModelClassifier, OracleError, RuneClassifier,
    TemplateClassifier,
};
pub use features::{preprocess, FeatureFrame, FeatureTensor};
pub use runes::TemplateSet;
pub use template::{Recognition, RuneTemplate, TemplateRecognizer};
