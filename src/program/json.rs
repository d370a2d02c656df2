//! The JSON interface to the external trainer.

use super::Program;
use crate::{config::TrainerConfig, primitives::Primitive, task::Task};
use serde::{Deserialize, Serialize};

/// Everything the trainer needs to start an experiment.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentInput {
    #[serde(rename = "DSL")]
    pub dsl: Grammar,
    pub train: Vec<Task>,
    pub test: Vec<Task>,
    pub config: TrainerConfig,
}

/// The primitives of the language and their weights.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grammar {
    pub log_variable: f64,
    pub productions: Vec<Production>,
}

impl Grammar {
    /// A grammar giving every primitive and variables the same weight.
    pub fn uniform<I: IntoIterator<Item = Primitive>>(primitives: I) -> Self {
        Self {
            log_variable: 0.0,
            productions: primitives
                .into_iter()
                .map(|primitive| Production {
                    log_probability: 0.0,
                    expression: primitive.program(),
                })
                .collect(),
        }
    }
}

/// A primitive in a grammar.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    pub log_probability: f64,
    pub expression: Program,
}
