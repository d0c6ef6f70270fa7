pub mod evaluation;

pub use evaluation::{evaluate, evaluate_sources, format_class_probabilities, EvaluationData};
