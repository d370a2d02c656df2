//! The language of de Bruijn-indexed programs handed to the trainer.

use std::{
    borrow::Cow,
    convert::TryFrom,
    fmt::{self, Display, Formatter},
    slice,
    str::FromStr,
};

use egg::{Id, Language, RecExpr, Symbol};
use nom::error::convert_error;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    parse,
    util::{parens, DeBruijnIndex},
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
struct RawProgram<'a>(Cow<'a, str>);

/// A lambda-calculus term over a fixed set of named primitives.
///
/// Programs are serialized in their concrete syntax, e.g.
/// `(lambda (logo_FWRT logo_UL logo_ZA $0))`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawProgram<'_>")]
#[serde(into = "RawProgram<'_>")]
pub struct Program {
    context: RecExpr<ProgramNode>,
    index: Id,
}

impl From<Program> for RawProgram<'_> {
    fn from(program: Program) -> Self {
        Self(program.to_string().into())
    }
}

impl<'a> TryFrom<RawProgram<'a>> for Program {
    type Error = ParseProgramError;

    fn try_from(raw: RawProgram<'a>) -> Result<Self, Self::Error> {
        raw.0.parse()
    }
}

/// A node of a [`Program`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProgramNode {
    /// A variable.
    Var(DeBruijnIndex),

    /// A named primitive. Integer literals are primitives named by their
    /// decimal representation.
    Primitive(Symbol),

    /// An anonymous function.
    Lambda(Id),

    /// An application of a function to a single argument. `(f a b)` is
    /// `((f a) b)`.
    App([Id; 2]),
}

impl Program {
    /// Create a variable with de Bruijn index `n`.
    #[must_use]
    pub fn var(n: usize) -> Self {
        Self::leaf(ProgramNode::Var(DeBruijnIndex(n)))
    }

    /// Create a reference to the primitive `name`.
    #[must_use]
    pub fn primitive<T: Into<Symbol>>(name: T) -> Self {
        Self::leaf(ProgramNode::Primitive(name.into()))
    }

    /// Create an integer literal.
    #[must_use]
    pub fn integer(n: i64) -> Self {
        Self::primitive(n.to_string().as_str())
    }

    fn leaf(node: ProgramNode) -> Self {
        let mut context = RecExpr::default();
        let index = context.add(node);
        Self { context, index }
    }

    /// Create a lambda with body `body`.
    #[must_use]
    pub fn lambda(body: Self) -> Self {
        let Self {
            mut context,
            index: body,
        } = body;
        let index = context.add(ProgramNode::Lambda(body));
        Self { context, index }
    }

    /// Create a program applying `fun` to `arg`.
    #[must_use]
    pub fn app(fun: Self, arg: Self) -> Self {
        let Self {
            context: fun_context,
            index: fun_index,
        } = fun;
        let Self {
            context: arg_context,
            index: arg_index,
        } = arg;
        let offset = fun_context.as_ref().len();
        let shift = |id: Id| Id::from(usize::from(id) + offset);
        let nodes: Vec<_> = fun_context
            .as_ref()
            .iter()
            .cloned()
            .chain(arg_context.as_ref().iter().cloned().map(|node| match node {
                ProgramNode::Lambda(body) => ProgramNode::Lambda(shift(body)),
                ProgramNode::App([fun, arg]) => ProgramNode::App([shift(fun), shift(arg)]),
                other => other,
            }))
            .collect();
        let mut context: RecExpr<_> = nodes.into();
        let index = context.add(ProgramNode::App([fun_index, shift(arg_index)]));
        Self { context, index }
    }

    /// Apply `fun` to each of `args` in turn.
    #[must_use]
    pub fn apply_all<I>(fun: Self, args: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        args.into_iter().fold(fun, Self::app)
    }

    /// The root node of the program.
    #[must_use]
    pub fn root(&self) -> Id {
        self.index
    }

    /// The node with id `id`.
    #[must_use]
    pub fn node(&self, id: Id) -> &ProgramNode {
        &self.context[id]
    }

    /// The number of AST nodes in the program.
    #[must_use]
    pub fn size(&self) -> usize {
        fn go(program: &Program, id: Id) -> usize {
            1 + program
                .node(id)
                .children()
                .iter()
                .map(|&child| go(program, child))
                .sum::<usize>()
        }
        go(self, self.index)
    }

    /// Splits an application spine into its head and arguments, so that
    /// `(f a b)` yields `f` and `[a, b]`.
    #[must_use]
    pub fn spine(&self, id: Id) -> (Id, Vec<Id>) {
        let mut head = id;
        let mut args = Vec::new();
        while let ProgramNode::App([fun, arg]) = self.node(head) {
            args.push(*arg);
            head = *fun;
        }
        args.reverse();
        (head, args)
    }
}

impl Language for ProgramNode {
    fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (ProgramNode::Var(i1), ProgramNode::Var(i2)) => i1 == i2,
            (ProgramNode::Primitive(s1), ProgramNode::Primitive(s2)) => s1 == s2,
            (ProgramNode::Lambda(_), ProgramNode::Lambda(_))
            | (ProgramNode::App(_), ProgramNode::App(_)) => true,
            _ => false,
        }
    }

    fn children(&self) -> &[Id] {
        match self {
            ProgramNode::Lambda(body) => slice::from_ref(body),
            ProgramNode::App(children) => children,
            _ => &[],
        }
    }

    fn children_mut(&mut self) -> &mut [Id] {
        match self {
            ProgramNode::Lambda(body) => slice::from_mut(body),
            ProgramNode::App(children) => children,
            _ => &mut [],
        }
    }
}

impl Display for ProgramNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProgramNode::Var(i) => write!(f, "{}", i),
            ProgramNode::Primitive(symbol) => write!(f, "{}", symbol),
            ProgramNode::Lambda(_) => f.write_str("lambda"),
            ProgramNode::App(_) => f.write_str("@"),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        struct ProgramRef<'a> {
            context: &'a RecExpr<ProgramNode>,
            index: Id,
        }

        impl Display for ProgramRef<'_> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                let Self { context, index } = *self;
                match &context[index] {
                    ProgramNode::Var(i) => write!(f, "{}", i),
                    ProgramNode::Primitive(s) => write!(f, "{}", s),
                    ProgramNode::Lambda(body) => {
                        let body = Self {
                            context,
                            index: *body,
                        };
                        write!(f, "(lambda {:.1})", body)
                    }
                    ProgramNode::App([fun, arg]) => {
                        let fun = Self {
                            context,
                            index: *fun,
                        };
                        let arg = Self {
                            context,
                            index: *arg,
                        };
                        parens(0, f, |f| write!(f, "{:.0} {:.1}", fun, arg))
                    }
                }
            }
        }

        let program_ref = ProgramRef {
            context: &self.context,
            index: self.index,
        };

        write!(f, "{:.1}", program_ref)
    }
}

/// An error produced when a string can't be parsed as a valid [`Program`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseProgramError {
    message: String,
}

impl FromStr for Program {
    type Err = ParseProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse(s).map_err(|e| ParseProgramError {
            message: convert_error(s, e),
        })
    }
}
