//! Tasks: named input/output specifications for the trainer to solve.

use crate::{
    eval::{eval_int, run_turtle},
    program::{Program, Type},
    render::Canvas,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// An input or output value of an example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// An integer.
    Int(i64),
    /// A square grayscale bitmap, row-major.
    Bitmap(Vec<u8>),
}

/// A single input/output example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// The arguments the program is applied to.
    pub inputs: Vec<Value>,
    /// The expected result.
    pub output: Value,
}

impl Example {
    /// An example with the given inputs and output.
    #[must_use]
    pub fn new(inputs: Vec<Value>, output: Value) -> Self {
        Self { inputs, output }
    }
}

/// Marks a task as needing a domain-specific evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTask {
    /// The name of the evaluator, e.g. `"LOGO"`.
    pub name: String,
    /// Whether the task is solved by prototypical networks.
    pub proto: bool,
}

impl SpecialTask {
    /// The marker for LOGO tasks.
    #[must_use]
    pub fn logo(proto: bool) -> Self {
        Self {
            name: "LOGO".to_string(),
            proto,
        }
    }
}

/// A task for the trainer.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub name: String,
    pub request: Type,
    pub examples: Vec<Example>,
    /// Whether the task belongs to the training set.
    pub must_train: bool,
    pub proto: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_task: Option<SpecialTask>,
    /// A 128×128 rendering of the target drawing, for visualisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_resolution: Option<Vec<u8>>,
    /// A known solution, for supervised training.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervised_solution: Option<Program>,
}

impl Task {
    /// A plain task with no LOGO-specific data.
    #[must_use]
    pub fn new<S: Into<String>>(name: S, request: Type, examples: Vec<Example>) -> Self {
        Self {
            name: name.into(),
            request,
            examples,
            must_train: false,
            proto: false,
            special_task: None,
            high_resolution: None,
            supervised_solution: None,
        }
    }

    /// Returns `true` if `program` produces every example's output.
    ///
    /// Programs over turtles are rendered at the resolution of each example's
    /// bitmap; other programs are applied to the example's integer input.
    #[must_use]
    pub fn check(&self, program: &Program) -> bool {
        self.examples.iter().all(|example| {
            let result = match (example.inputs.as_slice(), &example.output) {
                (_, Value::Bitmap(expected)) => {
                    let resolution = integer_sqrt(expected.len());
                    run_turtle(program)
                        .map(|drawing| Canvas::render(&drawing, resolution).pixels() == &expected[..])
                        .map_err(|e| e.to_string())
                }
                ([Value::Int(input)], Value::Int(expected)) => eval_int(program, *input)
                    .map(|output| output == *expected)
                    .map_err(|e| e.to_string()),
                _ => Err("unsupported example shape".to_string()),
            };
            result.unwrap_or_else(|e| {
                debug!("{} failed on {}: {}", program, self.name, e);
                false
            })
        })
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn integer_sqrt(n: usize) -> usize {
    (n as f64).sqrt().round() as usize
}
