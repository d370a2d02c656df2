//! The hand-written catalogue of LOGO drawing tasks.

use crate::{
    compile::{compile, CompileError},
    eval::{run_turtle, EvalError},
    program::{arrow, Type},
    render::Canvas,
    task::{Example, SpecialTask, Task, Value},
    typecheck,
};
use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

/// The resolution of the bitmaps tasks are specified with.
pub const LOW_RESOLUTION: usize = 28;
/// The resolution of the bitmaps kept for visualisation.
pub const HIGH_RESOLUTION: usize = 128;
/// The seed of the generator that picks which snowflakes are trained on.
pub const SNOWFLAKE_SEED: u64 = 42;
/// The chance that a snowflake without a fixed assignment is trained on.
pub const SNOWFLAKE_TRAIN_PROBABILITY: f64 = 0.07;

/// An error while building a hand-written task.
#[derive(Debug, Clone, Error)]
pub enum ManualTaskError {
    /// The source does not compile.
    #[error("task `{name}`: {source}")]
    Compile {
        /// The task's name.
        name: String,
        /// The underlying error.
        source: CompileError,
    },

    /// The compiled program could not be drawn.
    #[error("task `{name}`: {source}")]
    Eval {
        /// The task's name.
        name: String,
        /// The underlying error.
        source: EvalError,
    },
}

/// Options for [`manual_task`].
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskOptions {
    /// Whether the task is solved by prototypical networks.
    pub proto: bool,
    /// Whether the task belongs to the training set.
    pub must_train: bool,
    /// Whether to attach the source program as a supervised solution.
    pub supervise: bool,
}

/// Builds a LOGO task whose target is the drawing made by `source`.
///
/// # Errors
///
/// Returns an error if `source` does not compile or can't be drawn.
pub fn manual_task(name: &str, source: &str, options: TaskOptions) -> Result<Task, ManualTaskError> {
    let program = compile(source).map_err(|source| ManualTaskError::Compile {
        name: name.to_string(),
        source,
    })?;
    let request = arrow(Type::turtle(), Type::turtle());
    match typecheck::check(&program, &request) {
        Ok(()) => debug!("{}: {} ({} nodes)", name, program, program.size()),
        Err(e) => warn!("could not type check manual task {}: {}", name, e),
    }

    let drawing = run_turtle(&program).map_err(|source| ManualTaskError::Eval {
        name: name.to_string(),
        source,
    })?;
    let shape = Canvas::render(&drawing, LOW_RESOLUTION).into_pixels();
    let high_resolution = Canvas::render(&drawing, HIGH_RESOLUTION).into_pixels();

    let mut task = Task::new(
        name,
        request,
        vec![Example::new(vec![Value::Int(0)], Value::Bitmap(shape))],
    );
    task.must_train = options.must_train;
    task.proto = options.proto;
    task.special_task = Some(SpecialTask::logo(options.proto));
    task.high_resolution = Some(high_resolution);
    if options.supervise {
        task.supervised_solution = Some(program);
    }
    Ok(task)
}

#[derive(Debug, Default)]
struct Catalog {
    tasks: Vec<Task>,
}

impl Catalog {
    fn add<S: AsRef<str>>(
        &mut self,
        name: S,
        source: &str,
        must_train: bool,
    ) -> Result<(), ManualTaskError> {
        let options = TaskOptions {
            must_train,
            ..TaskOptions::default()
        };
        self.tasks.push(manual_task(name.as_ref(), source, options)?);
        Ok(())
    }
}

const SNOWFLAKE_BODIES: [(&str, &str); 8] = [
    ("empty", "(move 1d 0a)"),
    ("dashed", "(p (move 1d 0a)) (move 1d 0a)"),
    (
        "circle",
        "(move 1d 0a) (loop k 2 (loop i infinity (move epsilonLength epsilonAngle)))",
    ),
    (
        "lonely circle",
        "(p (move 1d 0a)) (loop k 2 (loop i infinity (move epsilonLength epsilonAngle)))",
    ),
    ("square dashed", "(p (move 1d 0a)) (loop s 4 (move 1d (/a 1a 4)))"),
    ("square", "(move 1d 0a) (loop s 4 (move 1d (/a 1a 4)))"),
    (
        "close semicircle",
        "(loop i infinity (move epsilonLength epsilonAngle))",
    ),
    (
        "semicircle",
        "(move 1d 0a) (loop i infinity (move epsilonLength epsilonAngle))",
    ),
];

/// Whether a snowflake is trained on, before random selection: one fixed
/// representative per body.
fn snowflake_fixed(n: u32, body: &str) -> bool {
    matches!(
        (n, body),
        (5, "empty")
            | (4, "dashed")
            | (7, "circle")
            | (6, "lonely circle")
            | (5, "square")
            | (5, "semicircle")
            | (3, "square dashed")
            | (4, "close semicircle")
    )
}

/// Builds every hand-written LOGO task.
///
/// # Errors
///
/// Returns an error if a task's program fails to compile or draw.
#[allow(clippy::too_many_lines)]
pub fn manual_tasks() -> Result<Vec<Task>, ManualTaskError> {
    let mut c = Catalog::default();

    for &(n, l) in &[
        (3, "1l"),
        (4, "(/d 1d 3)"),
        (5, "1l"),
        (6, "(*d 1d 2)"),
        (7, "1l"),
        (8, "(/d 1d 2)"),
    ] {
        c.add(
            format!("{}-gon {}", n, l),
            &format!("(loop i {} (move {} (/a 1a {})))", n, l, n),
            true,
        )?;
    }
    for &(n, l) in &[
        (3, "(*d 1l 2)"),
        (4, "(/d 1d 2)"),
        (5, "(*d 1d 2)"),
        (6, "1l"),
        (7, "(*d 1d 3)"),
        (8, "1l"),
    ] {
        c.add(
            format!("{}-gon {}", n, l),
            &format!("(loop i {} (move {} (/a 1a {})))", n, l, n),
            false,
        )?;
    }

    c.add("upwards", "((move 0d (/a 1a 4)) (move 1d 0a))", true)?;
    c.add(
        "right angle",
        "((move (*d 1d 2) (/a 1a 4)) (move 1d 0a))",
        true,
    )?;
    c.add(
        "right angle epsilon",
        "((move epsilonLength (/a 1a 4)) (move epsilonLength 0a))",
        true,
    )?;
    c.add("line segment", "(move 1d 0a)", true)?;

    for i in 6..=9 {
        c.add(
            format!("Greek spiral {}", i),
            &format!("(loop i {} (move (*l 1l i) (/a 1a 4)))", i),
            i == 7 || i == 8,
        )?;
    }
    for i in 3..=6 {
        c.add(
            format!("smooth spiral {}", i),
            &format!(
                "(loop i infinity (move (*d epsilonLength i) (*a epsilonAngle {})))",
                i
            ),
            i == 3 || i == 6,
        )?;
    }
    for &i in &[3, 5, 7, 9] {
        c.add(
            format!("star {}", i),
            &format!(
                "(loop i {} (move (*d 1d 3) (-a (/a 1a 2) (/a (/a 1a 2) {}))))",
                i, i
            ),
            i == 5 || i == 9,
        )?;
    }

    let leaf = "(loop i infinity (move epsilonDistance (/a epsilonAngle 2)))";
    let double_leaf = format!("(loop n 2 {} (move 0d (/a 1a 4)))", leaf);
    c.add("leaf iteration 1.1", leaf, true)?;
    c.add(
        "leaf iteration 1.2",
        &format!("((move 0d (/a 1a 2)) {})", leaf),
        true,
    )?;
    c.add("leaf iteration 2.1", &double_leaf, true)?;
    c.add(
        "leaf iteration 2.2",
        &format!("((move 0d (/a 1a 2)) {})", double_leaf),
        true,
    )?;
    for n in 3..8 {
        c.add(
            format!("flower {}", n),
            &format!("(loop j {} {} (move 0d (/a 1a {})))", n, double_leaf, n),
            n < 5,
        )?;
    }

    for &n in &[5, 6] {
        c.add(
            format!("staircase {}", n),
            &format!(
                "(loop i {} (move 1d (/a 1a 4)) (move 1d (/a 1a 4)) (move 0d (/a 1a 2)))",
                n
            ),
            n == 5,
        )?;
    }
    for n in 1..=5 {
        c.add(
            format!("blocks zigzag {}", n),
            &format!(
                "(loop i {} (move 1d (/a 1a 4)) (move 1d (/a 1a 4)) \
                 (move 1d (+a (/a 1a 2) (/a 1a 4))) (move 1d (+a (/a 1a 2) (/a 1a 4))))",
                n
            ),
            n <= 3,
        )?;
    }
    for &n in &[3, 4] {
        c.add(
            format!("diagonal zigzag {}", n),
            &format!(
                "((move 0d (/a 1a 8)) (loop i {} (move 1d (/a 1a 4)) \
                 (move 1d (+a (/a 1a 2) (/a 1a 4)))))",
                n
            ),
            n == 4,
        )?;
    }

    for n in 1..=6 {
        c.add(
            format!("right semicircle of size {}", n),
            &format!(
                "(loop i infinity (move (*d epsilonLength {}) (-a 0a epsilonAngle)))",
                n
            ),
            n % 2 == 0,
        )?;
        c.add(
            format!("left semicircle of size {}", n),
            &format!(
                "(loop i infinity (move (*d epsilonLength {}) epsilonAngle))",
                n
            ),
            n % 2 == 1,
        )?;
        c.add(
            format!("circle of size {}", n),
            &format!(
                "((loop i infinity (move (*d epsilonLength {}) epsilonAngle)) \
                 (loop i infinity (move (*d epsilonLength {}) epsilonAngle)))",
                n, n
            ),
            [1, 4, 3, 6].contains(&n),
        )?;
    }

    for &n in &[5, 6] {
        c.add(
            format!("{} enclosed circles", n),
            &format!(
                "(loop j {} (loop i infinity (move (*d epsilonLength j) epsilonAngle)) \
                 (loop i infinity (move (*d epsilonLength j) epsilonAngle)))",
                n
            ),
            n == 5,
        )?;
    }
    for &(n, l) in &[(4, 2), (5, 3), (6, 4), (3, 1)] {
        c.add(
            format!("{}-circle flower l={}", n, l),
            &format!(
                "(loop j {} (move 0d (/a 1a {})) \
                 (embed (loop i infinity (move (*d epsilonLength {}) epsilonAngle)) \
                 (loop i infinity (move (*d epsilonLength {}) epsilonAngle))))",
                n, n, l, l
            ),
            (n, l) == (6, 4) || (n, l) == (3, 1),
        )?;
    }
    for &(n, l) in &[(3, 1), (2, 2), (1, 3), (2, 1), (1, 2), (1, 1)] {
        c.add(
            format!("{}-semicircle sequence L={}", n, l),
            &format!(
                "(loop j {} (loop i infinity (move (*d epsilonLength {}) epsilonAngle)) \
                 (loop i infinity (move (*d epsilonLength {}) (-a 0a epsilonAngle))))",
                n, l, l
            ),
            [(3, 1), (2, 2), (1, 3)].contains(&(n, l)),
        )?;
    }

    let circle = "(loop i infinity (move epsilonLength epsilonAngle))";
    for &n in &[2, 3] {
        c.add(
            format!("row of {} circles", n),
            &format!(
                "(loop j {} (embed (loop k 2 {})) (p (move 1d 0a)))",
                n, circle
            ),
            n == 2,
        )?;
    }
    for &n in &[2, 3] {
        c.add(
            format!("row of {} lines", n),
            &format!("(loop j {} (move 1d 0a) (p (move 1d 0a)))", n),
            n == 2,
        )?;
    }
    c.add(
        "line next to circle",
        &format!("((move 1d 0a) (p (move 1d 0a)) {})", circle),
        true,
    )?;
    c.add(
        "circle next to line",
        &format!("({} (p (move 1d 0a)) (move 1d 0a))", circle),
        true,
    )?;
    for &(n, l) in &[(3, "(/d 1d 2)"), (4, "(/d 1d 3)")] {
        c.add(
            format!("{} dashed lines of size {}", n, l),
            &format!("(loop i {} (p (move 1d 0a)) (move {} 0a))", n, l),
            n == 3,
        )?;
    }
    c.add(
        "broken circle",
        &format!("({} (p (move 1d 0a)) {})", circle, circle),
        true,
    )?;
    c.add(
        "circle next to semicircle",
        &format!("({} {} (p (move 1d 0a)) {})", circle, circle, circle),
        true,
    )?;
    c.add(
        "semicircle next to square",
        &format!(
            "({} (p (move 1d 0a)) (loop i infinity (move 1d (/a 1a 4))))",
            circle
        ),
        false,
    )?;
    c.add(
        "circle next to square",
        &format!(
            "({} {} (p (move 1d 0a)) (loop i infinity (move 1d (/a 1a 4))))",
            circle, circle
        ),
        false,
    )?;
    c.add(
        "circle next to line",
        &format!("({} {} (p (move 1d 0a)) (move 1d 0a))", circle, circle),
        true,
    )?;
    c.add(
        "line next to circle",
        &format!(
            "((move 1d 0a) (p (move 1d 0a)) {} {} (move 1d 0a))",
            circle, circle
        ),
        true,
    )?;
    for &n in &[4, 5] {
        c.add(
            format!("row of {} dashes", n),
            &format!(
                "(loop j {} (embed (move 0d (/a 1a 4)) (move 1d 0a)) (p (move 1d 0a)))",
                n
            ),
            n == 4,
        )?;
    }
    for &n in &[5, 6] {
        c.add(
            format!("row of {} semicircles", n),
            &format!("(loop j {} (embed {}) (p (move 1d 0a)))", n, circle),
            n == 5,
        )?;
    }

    let mut rng = StdRng::seed_from_u64(SNOWFLAKE_SEED);
    for n in 3..=7 {
        for &(name, body) in &SNOWFLAKE_BODIES {
            let mut must_train =
                snowflake_fixed(n, name) || rng.random::<f64>() < SNOWFLAKE_TRAIN_PROBABILITY;
            // At most one trivially easy snowflake of each kind.
            if (name == "empty" && n != 5) || (name == "dashed" && n != 7) {
                must_train = false;
            }
            c.add(
                format!("{}-{} snowflake", n, name),
                &format!("(loop j {} (embed {}) (move 0d (/a 1a {})))", n, body, n),
                must_train,
            )?;
        }
    }

    let square = "(loop k 4 (move 1d (/a 1a 4)))";
    for &n in &[3, 4] {
        c.add(
            format!("{}-row of squares", n),
            &format!("(loop i {} (embed {}) (move 1d 0a))", n, square),
            n == 4,
        )?;
    }
    c.add(
        "2x2 grid",
        &format!(
            "(for x 2 (embed (for y 2 (embed {}) (move 1d 0a))) \
             (move 0d (/a 1a 4)) (move 1d (-a 0a (/a 1a 4))))",
            square
        ),
        false,
    )?;
    c.add(
        "slanted squares",
        &format!("((embed {}) (move 0d (/a 1a 8)) {})", square, square),
        false,
    )?;
    for l in 1..=5 {
        c.add(
            format!("square of size {}", l),
            &format!("(for i 4 (move (*d 1d {}) (/a 1a 4)))", l),
            l < 4,
        )?;
    }
    for &n in &[4, 5] {
        c.add(
            format!("{}-concentric squares", n),
            &format!(
                "(for i {} (embed (loop j 4 (move (*d 1d i) (/a 1a 4)))))",
                n
            ),
            n == 5,
        )?;
    }

    info!("built {} manual LOGO tasks", c.tasks.len());
    Ok(c.tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Value;

    #[test]
    fn manual_task_renders_both_resolutions() {
        let task = manual_task(
            "square",
            "(loop i 4 (move 1d (/a 1a 4)))",
            TaskOptions {
                supervise: true,
                ..TaskOptions::default()
            },
        )
        .unwrap();
        assert_eq!(task.request, arrow(Type::turtle(), Type::turtle()));
        assert_eq!(task.examples[0].inputs, vec![Value::Int(0)]);
        match &task.examples[0].output {
            Value::Bitmap(pixels) => {
                assert_eq!(pixels.len(), LOW_RESOLUTION * LOW_RESOLUTION);
                assert!(pixels.iter().any(|&p| p > 0));
            }
            other => panic!("unexpected output {:?}", other),
        }
        assert_eq!(
            task.high_resolution.as_ref().map(Vec::len),
            Some(HIGH_RESOLUTION * HIGH_RESOLUTION)
        );
        assert_eq!(task.special_task, Some(SpecialTask::logo(false)));
        let solution = task.supervised_solution.clone().unwrap();
        assert!(task.check(&solution));
    }

    #[test]
    fn manual_task_reports_bad_sources() {
        assert!(matches!(
            manual_task("bad", "(move 1d)", TaskOptions::default()),
            Err(ManualTaskError::Compile { .. })
        ));
        assert!(matches!(
            manual_task("bad", "(move (/d 1d 0) 0a)", TaskOptions::default()),
            Err(ManualTaskError::Eval { .. })
        ));
    }

    #[test]
    fn catalogue() {
        let tasks = manual_tasks().unwrap();
        assert_eq!(tasks.len(), 145);
        assert!(tasks.iter().all(|t| t.special_task.is_some()));
        assert_eq!(tasks[0].name, "3-gon 1l");
        assert_eq!(tasks.last().unwrap().name, "5-concentric squares");

        let trained = tasks.iter().filter(|t| t.must_train).count();
        assert!(trained >= 65, "{} training tasks", trained);

        let snowflake = |name: &str| tasks.iter().find(|t| t.name == name).unwrap();
        assert!(snowflake("5-empty snowflake").must_train);
        assert!(!snowflake("4-dashed snowflake").must_train);
        assert!(!snowflake("3-empty snowflake").must_train);
        assert!(snowflake("3-square dashed snowflake").must_train);

        // Every task draws something.
        for task in &tasks {
            let pixels = task.high_resolution.as_ref().unwrap();
            assert!(pixels.iter().any(|&p| p > 0), "{} is blank", task.name);
        }
    }

    #[test]
    fn catalogue_is_deterministic() {
        let flags = |tasks: Vec<Task>| tasks.into_iter().map(|t| t.must_train).collect::<Vec<_>>();
        assert_eq!(
            flags(manual_tasks().unwrap()),
            flags(manual_tasks().unwrap())
        );
    }
}
