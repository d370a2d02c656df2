//! A toy arithmetic domain: learn to add small constants using only
//! `incr_custom` and `incr2_custom`.

use crate::{
    config::TrainerConfig,
    primitives::arithmetic_primitives,
    program::{arrow, json::{ExperimentInput, Grammar}, Type},
    task::{Example, Task, Value},
};
use log::info;
use rand::Rng;

/// The number of examples per training task.
pub const TRAINING_EXAMPLES: usize = 5000;
/// The number of examples per testing task.
pub const TESTING_EXAMPLES: usize = 500;

/// An example of adding `n` to an input drawn uniformly from `0..500`.
pub fn add_n<R: Rng + ?Sized>(n: i64, rng: &mut R) -> Example {
    let input = rng.random_range(0..500);
    Example::new(vec![Value::Int(input)], Value::Int(input + n))
}

fn add_task<R: Rng + ?Sized>(n: i64, examples: usize, rng: &mut R) -> Task {
    Task::new(
        format!("add{}", n),
        arrow(Type::int(), Type::int()),
        (0..examples).map(|_| add_n(n, rng)).collect(),
    )
}

/// The tasks `add1`, `add2` and `add3`.
pub fn training_tasks<R: Rng + ?Sized>(rng: &mut R) -> Vec<Task> {
    (1..=3)
        .map(|n| add_task(n, TRAINING_EXAMPLES, rng))
        .collect()
}

/// The held-out tasks `add4` and `add0`.
pub fn testing_tasks<R: Rng + ?Sized>(rng: &mut R) -> Vec<Task> {
    [4, 0]
        .iter()
        .map(|&n| add_task(n, TESTING_EXAMPLES, rng))
        .collect()
}

/// The full experiment: a uniform grammar over the two primitives, the
/// training and testing tasks, and the trainer's options.
pub fn experiment<R: Rng + ?Sized>(config: TrainerConfig, rng: &mut R) -> ExperimentInput {
    let train = training_tasks(rng);
    let test = testing_tasks(rng);
    info!(
        "arithmetic experiment: {} training and {} testing tasks",
        train.len(),
        test.len()
    );
    ExperimentInput {
        dsl: Grammar::uniform(arithmetic_primitives()),
        train,
        test,
        config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn examples_add_n() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let example = add_n(3, &mut rng);
            match (example.inputs.as_slice(), example.output) {
                ([Value::Int(i)], Value::Int(o)) => {
                    assert!((0..500).contains(i));
                    assert_eq!(o, i + 3);
                }
                other => panic!("unexpected example {:?}", other),
            }
        }
    }

    #[test]
    fn task_sets() {
        let mut rng = StdRng::seed_from_u64(2);
        let train = training_tasks(&mut rng);
        let test = testing_tasks(&mut rng);
        let names = |tasks: &[Task]| tasks.iter().map(|t| t.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&train), vec!["add1", "add2", "add3"]);
        assert_eq!(names(&test), vec!["add4", "add0"]);
        assert!(train.iter().all(|t| t.examples.len() == TRAINING_EXAMPLES));
        assert!(test.iter().all(|t| t.examples.len() == TESTING_EXAMPLES));

        let add3: Program = "(lambda (incr_custom (incr2_custom $0)))".parse().unwrap();
        assert!(train[2].check(&add3));
        assert!(!train[1].check(&add3));
        let add0: Program = "(lambda $0)".parse().unwrap();
        assert!(test[1].check(&add0));
    }

    #[test]
    fn experiment_json() {
        let mut rng = StdRng::seed_from_u64(3);
        let input = experiment(TrainerConfig::default(), &mut rng);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["DSL"]["productions"].as_array().unwrap().len(), 2);
        assert_eq!(json["train"][0]["request"]["constructor"], "->");
        assert_eq!(json["test"][1]["name"], "add0");
        assert_eq!(json["config"]["parser"], "loglinear");
        let back: ExperimentInput = serde_json::from_value(json).unwrap();
        assert_eq!(back, input);
    }
}
