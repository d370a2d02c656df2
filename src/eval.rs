//! An interpreter for programs over the LOGO and arithmetic primitives.
//!
//! Turtle programs are written in continuation-passing style: a value of type
//! `turtle` is the rest of the drawing. Evaluating a `turtle -> turtle`
//! program on the empty continuation yields an [`Action`] tree, which is then
//! traced from the initial turtle state into a [`Drawing`].

use crate::{
    primitives::{Primitive, UnknownPrimitive},
    program::{Program, ProgramNode},
};
use egg::Id;
use std::{
    f64::consts::{PI, TAU},
    mem,
    rc::Rc,
};
use thiserror::Error;

/// The iteration count denoted by `logo_IFTY`.
pub const INFINITY: i64 = 20;
/// The length denoted by `logo_epsL`.
pub const EPSILON_LENGTH: f64 = 1.0 / INFINITY as f64;
/// The angle denoted by `logo_epsA`, in radians. `INFINITY` steps turn
/// through half a turn.
pub const EPSILON_ANGLE: f64 = PI / INFINITY as f64;
/// The number of function applications and loop iterations a single
/// evaluation may perform.
pub const MAX_STEPS: usize = 1_000_000;

/// An error while evaluating a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A value had the wrong type for its context.
    #[error("type mismatch: expected {0}")]
    TypeMismatch(&'static str),

    /// A variable refers past the outermost binder.
    #[error("unbound variable ${0}")]
    UnboundVariable(usize),

    /// A length or angle was divided by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Integer arithmetic overflowed.
    #[error("integer overflow")]
    Overflow,

    /// The evaluation ran for too long.
    #[error("evaluation exceeded the step limit")]
    StepLimit,

    /// A symbol is not a known primitive.
    #[error(transparent)]
    UnknownPrimitive(#[from] UnknownPrimitive),
}

/// A drawing action produced by a turtle program.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Nothing left to draw.
    Done,
    /// Move forward by `distance`, turn counter-clockwise by `angle`, and
    /// continue.
    Move {
        /// The distance to move.
        distance: f64,
        /// The angle to turn by afterwards, in radians.
        angle: f64,
        /// The rest of the drawing.
        then: Rc<Action>,
    },
    /// Run `body` with the pen lifted, then continue with the pen as it was.
    PenUp {
        /// The movements to make without drawing.
        body: Rc<Action>,
        /// The rest of the drawing.
        then: Rc<Action>,
    },
    /// Run `body`, then return the turtle to where it started before
    /// continuing.
    Embed {
        /// The embedded drawing.
        body: Rc<Action>,
        /// The rest of the drawing.
        then: Rc<Action>,
    },
}

// A continuation chain is as long as its loop; unlink it iteratively.
impl Drop for Action {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.unlink(&mut pending);
        while let Some(action) = pending.pop() {
            if let Ok(mut action) = Rc::try_unwrap(action) {
                action.unlink(&mut pending);
            }
        }
    }
}

impl Action {
    fn unlink(&mut self, pending: &mut Vec<Rc<Action>>) {
        let mut take = |link: &mut Rc<Action>| pending.push(mem::replace(link, Rc::new(Action::Done)));
        match self {
            Action::Done => {}
            Action::Move { then, .. } => take(then),
            Action::PenUp { body, then } | Action::Embed { body, then } => {
                take(body);
                take(then);
            }
        }
    }
}

/// A straight line drawn by the turtle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// The starting point of the line segment
    pub start: (f64, f64),
    /// The end point of the line segment
    pub end: (f64, f64),
}

/// The lines drawn by a turtle program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    /// The segments, in the order they were drawn.
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Copy)]
struct TurtleState {
    x: f64,
    y: f64,
    heading: f64,
    pen_down: bool,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            pen_down: true,
        }
    }
}

impl Drawing {
    fn trace(&mut self, state: &mut TurtleState, mut action: &Action) {
        loop {
            action = match action {
                Action::Done => return,
                Action::Move {
                    distance,
                    angle,
                    then,
                } => {
                    let (sin, cos) = state.heading.sin_cos();
                    let end = (state.x + distance * cos, state.y + distance * sin);
                    if state.pen_down && *distance != 0.0 {
                        self.segments.push(Segment {
                            start: (state.x, state.y),
                            end,
                        });
                    }
                    state.x = end.0;
                    state.y = end.1;
                    state.heading += angle;
                    &**then
                }
                Action::PenUp { body, then } => {
                    let pen_down = state.pen_down;
                    state.pen_down = false;
                    self.trace(state, body);
                    state.pen_down = pen_down;
                    &**then
                }
                Action::Embed { body, then } => {
                    let saved = *state;
                    self.trace(state, body);
                    *state = saved;
                    &**then
                }
            }
        }
    }

    /// The smallest axis-aligned box containing every segment, as
    /// `(min_x, min_y, max_x, max_y)`. Returns `None` for an empty drawing.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        self.segments
            .iter()
            .flat_map(|s| vec![s.start, s.end])
            .fold(None, |bbox, (x, y)| {
                Some(match bbox {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                })
            })
    }
}

#[derive(Debug)]
struct Frame {
    value: Value,
    parent: Env,
}

type Env = Option<Rc<Frame>>;

fn lookup(env: &Env, index: usize) -> Option<&Value> {
    let mut frame = env.as_ref()?;
    for _ in 0..index {
        frame = frame.parent.as_ref()?;
    }
    Some(&frame.value)
}

/// The result of evaluating a (sub)program.
#[derive(Debug, Clone)]
enum Value {
    Int(i64),
    Real(f64),
    Turtle(Rc<Action>),
    Closure { body: Id, env: Env },
    Partial { primitive: Primitive, args: Vec<Value> },
}

impl Value {
    fn to_int(&self) -> Result<i64, EvalError> {
        match *self {
            Self::Int(n) => Ok(n),
            _ => Err(EvalError::TypeMismatch("integer")),
        }
    }

    fn to_real(&self) -> Result<f64, EvalError> {
        match *self {
            Self::Real(x) => Ok(x),
            _ => Err(EvalError::TypeMismatch("length or angle")),
        }
    }

    fn into_turtle(self) -> Result<Rc<Action>, EvalError> {
        match self {
            Self::Turtle(action) => Ok(action),
            _ => Err(EvalError::TypeMismatch("turtle")),
        }
    }
}

struct Interpreter<'a> {
    program: &'a Program,
    steps: usize,
}

impl Interpreter<'_> {
    fn new(program: &Program) -> Interpreter<'_> {
        Interpreter { program, steps: 0 }
    }

    fn tick(&mut self) -> Result<(), EvalError> {
        self.steps += 1;
        if self.steps > MAX_STEPS {
            Err(EvalError::StepLimit)
        } else {
            Ok(())
        }
    }

    fn eval(&mut self, id: Id, env: &Env) -> Result<Value, EvalError> {
        let program = self.program;
        match *program.node(id) {
            ProgramNode::Var(index) => lookup(env, index.get())
                .cloned()
                .ok_or(EvalError::UnboundVariable(index.get())),
            ProgramNode::Primitive(symbol) => {
                let primitive: Primitive = symbol.as_str().parse()?;
                Ok(constant(primitive).unwrap_or(Value::Partial {
                    primitive,
                    args: Vec::new(),
                }))
            }
            ProgramNode::Lambda(body) => Ok(Value::Closure {
                body,
                env: env.clone(),
            }),
            ProgramNode::App([fun, arg]) => {
                let fun = self.eval(fun, env)?;
                let arg = self.eval(arg, env)?;
                self.apply(fun, arg)
            }
        }
    }

    fn apply(&mut self, fun: Value, arg: Value) -> Result<Value, EvalError> {
        self.tick()?;
        match fun {
            Value::Closure { body, env } => {
                let env = Some(Rc::new(Frame {
                    value: arg,
                    parent: env,
                }));
                self.eval(body, &env)
            }
            Value::Partial {
                primitive,
                mut args,
            } => {
                args.push(arg);
                if args.len() == primitive.arity() {
                    self.call(primitive, args)
                } else {
                    Ok(Value::Partial { primitive, args })
                }
            }
            _ => Err(EvalError::TypeMismatch("function")),
        }
    }

    /// Runs the body of `logo_PT` or `logo_GETSET` on the empty continuation.
    fn body(&mut self, fun: Value) -> Result<Rc<Action>, EvalError> {
        self.apply(fun, Value::Turtle(Rc::new(Action::Done)))?
            .into_turtle()
    }

    fn call(&mut self, primitive: Primitive, args: Vec<Value>) -> Result<Value, EvalError> {
        use Primitive::*;
        let value = match (primitive, args.as_slice()) {
            (DivLength, [x, n]) | (DivAngle, [x, n]) => {
                let n = n.to_int()?;
                if n == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                Value::Real(x.to_real()? / n as f64)
            }
            (MulLength, [x, n]) | (MulAngle, [x, n]) => {
                Value::Real(x.to_real()? * n.to_int()? as f64)
            }
            (AddAngle, [a, b]) => Value::Real(a.to_real()? + b.to_real()?),
            (SubAngle, [a, b]) => Value::Real(a.to_real()? - b.to_real()?),
            (Add, [a, b]) => Value::Int(
                a.to_int()?
                    .checked_add(b.to_int()?)
                    .ok_or(EvalError::Overflow)?,
            ),
            (Incr, [x]) => Value::Int(x.to_int()?.checked_add(1).ok_or(EvalError::Overflow)?),
            (Incr2, [x]) => Value::Int(x.to_int()?.checked_add(2).ok_or(EvalError::Overflow)?),
            (Move, [distance, angle, then]) => Value::Turtle(Rc::new(Action::Move {
                distance: distance.to_real()?,
                angle: angle.to_real()?,
                then: then.clone().into_turtle()?,
            })),
            (PenUp, [body, then]) => Value::Turtle(Rc::new(Action::PenUp {
                body: self.body(body.clone())?,
                then: then.clone().into_turtle()?,
            })),
            (GetSet, [body, then]) => Value::Turtle(Rc::new(Action::Embed {
                body: self.body(body.clone())?,
                then: then.clone().into_turtle()?,
            })),
            (ForLoop, [count, body, then]) => {
                let count = count.to_int()?;
                let mut rest = then.clone();
                for index in (0..count.max(0)).rev() {
                    self.tick()?;
                    let step = self.apply(body.clone(), Value::Int(index))?;
                    rest = Value::Turtle(self.apply(step, rest)?.into_turtle()?);
                }
                rest
            }
            _ => return Err(EvalError::TypeMismatch("primitive arguments")),
        };
        Ok(value)
    }
}

/// The value of a primitive that takes no arguments, or `None` for a
/// function.
fn constant(primitive: Primitive) -> Option<Value> {
    use Primitive::*;
    let value = match primitive {
        UnitLength => Value::Real(1.0),
        ZeroLength | ZeroAngle => Value::Real(0.0),
        EpsilonLength => Value::Real(EPSILON_LENGTH),
        UnitAngle => Value::Real(TAU),
        EpsilonAngle => Value::Real(EPSILON_ANGLE),
        Infinity => Value::Int(INFINITY),
        Integer(n) => Value::Int(n),
        DivLength | MulLength | DivAngle | MulAngle | AddAngle | SubAngle | Move | PenUp
        | GetSet | ForLoop | Add | Incr | Incr2 => return None,
    };
    Some(value)
}

/// Runs a `turtle -> turtle` program from the initial turtle state: at the
/// origin, facing along the positive x axis, pen down.
///
/// # Errors
///
/// Returns an error if the program is ill-typed, divides by zero, or runs
/// for more than [`MAX_STEPS`] steps.
pub fn run_turtle(program: &Program) -> Result<Drawing, EvalError> {
    let mut interpreter = Interpreter::new(program);
    let fun = interpreter.eval(program.root(), &None)?;
    let action = interpreter.body(fun)?;
    let mut drawing = Drawing::default();
    drawing.trace(&mut TurtleState::default(), &action);
    Ok(drawing)
}

/// Applies an `int -> int` program to `input`.
///
/// # Errors
///
/// Returns an error if the program is ill-typed, overflows, or runs for more
/// than [`MAX_STEPS`] steps.
pub fn eval_int(program: &Program, input: i64) -> Result<i64, EvalError> {
    let mut interpreter = Interpreter::new(program);
    let fun = interpreter.eval(program.root(), &None)?;
    interpreter.apply(fun, Value::Int(input))?.to_int()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;

    fn draw(source: &str) -> Drawing {
        run_turtle(&compile(source).unwrap()).unwrap()
    }

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn square_returns_to_origin() {
        let drawing = draw("(loop i 4 (move 1d (/a 1a 4)))");
        assert_eq!(drawing.segments.len(), 4);
        assert!(close(drawing.segments[0].end, (1.0, 0.0)));
        assert!(close(drawing.segments[1].end, (1.0, 1.0)));
        assert!(close(drawing.segments[3].end, (0.0, 0.0)));
    }

    #[test]
    fn turning_in_place_draws_nothing() {
        let drawing = draw("((move 0d (/a 1a 4)) (move 1d 0a))");
        assert_eq!(drawing.segments.len(), 1);
        assert!(close(drawing.segments[0].start, (0.0, 0.0)));
        assert!(close(drawing.segments[0].end, (0.0, 1.0)));
    }

    #[test]
    fn pen_up_moves_without_drawing() {
        let drawing = draw("((move 1d 0a) (p (move 1d 0a)) (move 1d 0a))");
        assert_eq!(drawing.segments.len(), 2);
        assert!(close(drawing.segments[1].start, (2.0, 0.0)));
        assert!(close(drawing.segments[1].end, (3.0, 0.0)));
    }

    #[test]
    fn embed_restores_position_and_heading() {
        let drawing = draw("((embed (move 0d (/a 1a 4)) (move 1d 0a)) (move 1d 0a))");
        assert_eq!(drawing.segments.len(), 2);
        assert!(close(drawing.segments[0].end, (0.0, 1.0)));
        assert!(close(drawing.segments[1].start, (0.0, 0.0)));
        assert!(close(drawing.segments[1].end, (1.0, 0.0)));
    }

    #[test]
    fn loop_index_counts_from_zero() {
        let drawing = draw("(loop i 3 (move (*l 1l i) 0a))");
        assert_eq!(drawing.segments.len(), 2);
        assert!(close(drawing.segments[0].end, (1.0, 0.0)));
        assert!(close(drawing.segments[1].end, (3.0, 0.0)));
    }

    #[test]
    fn infinity_loops_trace_half_and_full_circles() {
        let semicircle = draw("(loop i infinity (move epsilonLength epsilonAngle))");
        assert_eq!(semicircle.segments.len(), INFINITY as usize);
        let (_, min_y, _, max_y) = semicircle.bounding_box().unwrap();
        assert!(min_y > -1e-9 && max_y > 0.0);

        let right = draw("(loop i infinity (move epsilonLength (-a 0a epsilonAngle)))");
        let (_, min_y, _, max_y) = right.bounding_box().unwrap();
        assert!(max_y < 1e-9 && min_y < 0.0);

        let circle = draw(
            "((loop i infinity (move epsilonLength epsilonAngle))
              (loop i infinity (move epsilonLength epsilonAngle)))",
        );
        assert!(close(circle.segments.last().unwrap().end, (0.0, 0.0)));
    }

    #[test]
    fn arithmetic() {
        let program: Program = "(lambda (incr2_custom (incr_custom $0)))".parse().unwrap();
        assert_eq!(eval_int(&program, 5), Ok(8));
        let program: Program = "(lambda (+ $0 logo_IFTY))".parse().unwrap();
        assert_eq!(eval_int(&program, 1), Ok(21));
    }

    #[test]
    fn errors() {
        let program = compile("(move (/d 1d 0) 0a)").unwrap();
        assert_eq!(run_turtle(&program), Err(EvalError::DivisionByZero));

        let program = compile("(loop i 1000000000 (move 0d 0a))").unwrap();
        assert_eq!(run_turtle(&program), Err(EvalError::StepLimit));

        let program: Program = "(lambda $1)".parse().unwrap();
        assert_eq!(eval_int(&program, 0), Err(EvalError::UnboundVariable(1)));

        let program: Program = "(lambda (logo_FWRT logo_UL 3 $0))".parse().unwrap();
        assert!(matches!(run_turtle(&program), Err(EvalError::TypeMismatch(_))));
    }

    #[test]
    fn long_loops_draw_and_drop() {
        let drawing = draw("(loop i 100000 (move epsilonLength 0a))");
        assert_eq!(drawing.segments.len(), 100_000);
        let (x, y) = drawing.segments.last().unwrap().end;
        assert!((x - 5000.0).abs() < 1e-6 && y == 0.0);
    }

    #[test]
    fn step_limit_boundary() {
        // Four applications set up the loop, then each iteration takes six.
        let iterations = (MAX_STEPS - 4) / 6;
        let drawing = draw(&format!("(loop i {} (move 1d 0a))", iterations));
        assert_eq!(drawing.segments.len(), iterations);

        let program = compile(&format!("(loop i {} (move 1d 0a))", iterations + 1)).unwrap();
        assert_eq!(run_turtle(&program), Err(EvalError::StepLimit));
    }

    #[test]
    fn negative_loop_counts_draw_nothing() {
        assert!(draw("(loop i -3 (move 1d 0a))").segments.is_empty());
        assert!(draw("(loop i 0 (move 1d 0a))").segments.is_empty());
        let drawing = draw("((loop i -1 (move 1d 0a)) (move 1d 0a))");
        assert_eq!(drawing.segments.len(), 1);
    }

    #[test]
    fn integer_arguments() {
        let drawing = draw("(loop i 12 (move (/d 1d 5) (/a 1a 12)))");
        assert_eq!(drawing.segments.len(), 12);
        assert!(close(drawing.segments[0].end, (0.2, 0.0)));
        assert!(close(drawing.segments[11].end, (0.0, 0.0)));
    }

    #[test]
    fn only_nullary_primitives_are_constants() {
        for primitive in crate::primitives::logo_primitives()
            .into_iter()
            .chain(crate::primitives::arithmetic_primitives())
        {
            assert_eq!(
                constant(primitive).is_some(),
                primitive.arity() == 0,
                "{}",
                primitive
            );
        }
        assert!(matches!(constant(Primitive::ZeroAngle), Some(Value::Real(x)) if x == 0.0));
    }
}
