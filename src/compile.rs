//! Compiles LOGO s-expressions into de Bruijn-indexed turtle programs.
//!
//! Every command takes the turtle continuation as its last argument, so a
//! block `(c1 c2 ...)` compiles to `c1 (c2 (... $0))`. Commands that contain
//! a body (`loop`/`for`, `embed`, `p`) wrap it in lambdas binding the body's
//! own continuation, and loops additionally bind their index variable.

use crate::{
    primitives::{Primitive, OPERATORS},
    sexp::{ParseSexpError, Sexp},
    Program,
};
use log::debug;
use thiserror::Error;

/// An error while compiling a LOGO program.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// The source is not a valid s-expression.
    #[error(transparent)]
    Parse(#[from] ParseSexpError),

    /// A command position holds something other than a command form.
    #[error("expected a command, found `{0}`")]
    NotACommand(String),

    /// A command form starts with an unknown command name.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    /// An atom is neither a bound variable, an integer, nor an operator.
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),

    /// A compound expression does not start with an operator.
    #[error("unknown operator in `{0}`")]
    UnknownOperator(String),

    /// The operator is reserved but has no primitive.
    #[error("operator `{0}` is not supported")]
    UnsupportedOperator(String),

    /// A form has the wrong shape.
    #[error("malformed `{form}` form: `{sexp}`")]
    Malformed {
        /// The form being compiled.
        form: &'static str,
        /// The offending s-expression.
        sexp: String,
    },
}

/// The variables in scope, innermost first. Turtle continuations occupy a
/// slot but can't be named.
#[derive(Debug, Clone, Default)]
struct Scope<'a> {
    bindings: Vec<Option<&'a str>>,
}

impl<'a> Scope<'a> {
    fn with(&self, inner: &[Option<&'a str>]) -> Self {
        let mut bindings = inner.to_vec();
        bindings.extend_from_slice(&self.bindings);
        Self { bindings }
    }

    /// The scope of a loop body: `(lambda (lambda ...))` binding the index
    /// and then the continuation.
    fn enter_loop(&self, index: &'a str) -> Self {
        self.with(&[None, Some(index)])
    }

    /// The scope of an `embed` or `p` body, which only binds a continuation.
    fn enter_body(&self) -> Self {
        self.with(&[None])
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        self.bindings.iter().position(|&b| b == Some(name))
    }
}

/// Parses and compiles a LOGO program.
///
/// # Errors
///
/// Returns an error if the source is not a valid s-expression or not a valid
/// LOGO program.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let sexp = Sexp::parse(source)?;
    let program = compile_sexp(&sexp)?;
    debug!("compiled {} into {}", sexp, program);
    Ok(program)
}

/// Compiles a LOGO program into a `turtle -> turtle` program.
///
/// A list starting with an atom is a single command; any other list is a
/// block of commands.
///
/// # Errors
///
/// Returns an error if the s-expression is not a valid LOGO program.
pub fn compile_sexp(sexp: &Sexp<'_>) -> Result<Program, CompileError> {
    let scope = Scope::default();
    let body = match sexp {
        Sexp::List(items) if matches!(items.first(), Some(Sexp::Atom(_))) => {
            command(sexp, &scope, Program::var(0))?
        }
        Sexp::List(items) => block(items, &scope, Program::var(0))?,
        Sexp::Atom(atom) => return Err(CompileError::NotACommand((*atom).to_string())),
    };
    Ok(Program::lambda(body))
}

fn block<'a>(
    commands: &[Sexp<'a>],
    scope: &Scope<'a>,
    continuation: Program,
) -> Result<Program, CompileError> {
    commands
        .iter()
        .rev()
        .try_fold(continuation, |continuation, c| command(c, scope, continuation))
}

fn command<'a>(
    sexp: &Sexp<'a>,
    scope: &Scope<'a>,
    continuation: Program,
) -> Result<Program, CompileError> {
    let not_a_command = || CompileError::NotACommand(sexp.to_string());
    let items = sexp.as_list().ok_or_else(not_a_command)?;
    let (head, args) = items.split_first().ok_or_else(not_a_command)?;
    let head = head.as_atom().ok_or_else(not_a_command)?;
    let malformed = |form| CompileError::Malformed {
        form,
        sexp: sexp.to_string(),
    };

    let program = match head {
        "move" => match args {
            [distance, angle] => Program::apply_all(
                Primitive::Move.program(),
                vec![
                    expression(distance, scope)?,
                    expression(angle, scope)?,
                    continuation,
                ],
            ),
            _ => return Err(malformed("move")),
        },
        "for" | "loop" => match args {
            [index, count, body @ ..] => {
                let index = index.as_atom().ok_or_else(|| malformed("loop"))?;
                let count = expression(count, scope)?;
                let body = block(body, &scope.enter_loop(index), Program::var(0))?;
                Program::apply_all(
                    Primitive::ForLoop.program(),
                    vec![count, Program::lambda(Program::lambda(body)), continuation],
                )
            }
            _ => return Err(malformed("loop")),
        },
        "embed" => {
            let body = block(args, &scope.enter_body(), Program::var(0))?;
            Program::apply_all(
                Primitive::GetSet.program(),
                vec![Program::lambda(body), continuation],
            )
        }
        "p" => {
            let body = block(args, &scope.enter_body(), Program::var(0))?;
            Program::apply_all(
                Primitive::PenUp.program(),
                vec![Program::lambda(body), continuation],
            )
        }
        other => return Err(CompileError::UnknownCommand(other.to_string())),
    };
    Ok(program)
}

fn operator(name: &str) -> Option<Result<Primitive, CompileError>> {
    let name = if name == "inf" { "infinity" } else { name };
    OPERATORS
        .get(name)
        .map(|op| op.ok_or_else(|| CompileError::UnsupportedOperator(name.to_string())))
}

fn expression(sexp: &Sexp<'_>, scope: &Scope<'_>) -> Result<Program, CompileError> {
    match sexp {
        Sexp::Atom(atom) => {
            if let Some(index) = scope.lookup(atom) {
                Ok(Program::var(index))
            } else if let Ok(n) = atom.parse::<i64>() {
                Ok(Primitive::Integer(n).program())
            } else {
                match operator(atom) {
                    Some(primitive) => primitive.map(Primitive::program),
                    None => Err(CompileError::UnknownSymbol((*atom).to_string())),
                }
            }
        }
        Sexp::List(items) => {
            let (head, args) = items.split_first().ok_or_else(|| CompileError::Malformed {
                form: "expression",
                sexp: sexp.to_string(),
            })?;
            let primitive = head
                .as_atom()
                .and_then(operator)
                .ok_or_else(|| CompileError::UnknownOperator(sexp.to_string()))??;
            let args = args
                .iter()
                .map(|arg| expression(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Program::apply_all(primitive.program(), args))
        }
    }
}
