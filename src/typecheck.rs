//! Bidirectional type checking of programs against the primitive types.

use crate::{
    primitives::Primitive,
    program::{Program, ProgramNode, Type},
};
use egg::Id;
use thiserror::Error;

/// A type error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A subterm has a different type from the one its context requires.
    #[error("`{term}` has type {found}, expected {expected}")]
    Mismatch {
        /// The offending subterm.
        term: String,
        /// The type the context requires.
        expected: Type,
        /// The type of the subterm.
        found: Type,
    },

    /// A lambda appears where its type can't be determined.
    #[error("cannot infer the type of `{0}`")]
    CannotInfer(String),

    /// A non-function is applied to an argument.
    #[error("`{0}` is applied but is not a function")]
    NotAFunction(String),

    /// A variable refers past the outermost binder.
    #[error("unbound variable ${0}")]
    UnboundVariable(usize),

    /// A symbol is not a known primitive.
    #[error(transparent)]
    UnknownPrimitive(#[from] crate::primitives::UnknownPrimitive),
}

struct Checker<'a> {
    program: &'a Program,
    /// The types of bound variables, outermost first.
    binders: Vec<Type>,
}

impl Checker<'_> {
    fn show(&self, id: Id) -> String {
        fn rebuild(program: &Program, id: Id) -> Program {
            match program.node(id) {
                ProgramNode::Var(i) => Program::var(i.get()),
                ProgramNode::Primitive(s) => Program::primitive(*s),
                ProgramNode::Lambda(body) => Program::lambda(rebuild(program, *body)),
                ProgramNode::App([fun, arg]) => {
                    Program::app(rebuild(program, *fun), rebuild(program, *arg))
                }
            }
        }
        rebuild(self.program, id).to_string()
    }

    fn check(&mut self, id: Id, expected: &Type) -> Result<(), TypeError> {
        let program = self.program;
        match (program.node(id), expected) {
            (&ProgramNode::Lambda(body), Type::Function { from, to }) => {
                self.binders.push((**from).clone());
                let result = self.check(body, to);
                self.binders.pop();
                result
            }
            _ => {
                let found = self.infer(id)?;
                if &found == expected {
                    Ok(())
                } else {
                    Err(TypeError::Mismatch {
                        term: self.show(id),
                        expected: expected.clone(),
                        found,
                    })
                }
            }
        }
    }

    fn infer(&mut self, id: Id) -> Result<Type, TypeError> {
        let program = self.program;
        match *program.node(id) {
            ProgramNode::Var(index) => self
                .binders
                .iter()
                .rev()
                .nth(index.get())
                .cloned()
                .ok_or(TypeError::UnboundVariable(index.get())),
            ProgramNode::Primitive(symbol) => {
                let primitive: Primitive = symbol.as_str().parse()?;
                Ok(primitive.tp())
            }
            ProgramNode::Lambda(_) => Err(TypeError::CannotInfer(self.show(id))),
            ProgramNode::App([fun, arg]) => {
                let fun_type = self.infer(fun)?;
                let (from, to) = fun_type
                    .as_function()
                    .ok_or_else(|| TypeError::NotAFunction(self.show(fun)))?;
                self.check(arg, from)?;
                Ok(to.clone())
            }
        }
    }
}

/// Checks that `program` has type `expected`.
///
/// # Errors
///
/// Returns an error describing the first ill-typed subterm.
pub fn check(program: &Program, expected: &Type) -> Result<(), TypeError> {
    Checker {
        program,
        binders: Vec::new(),
    }
    .check(program.root(), expected)
}

/// Infers the type of a closed program. Programs whose root is a lambda must
/// be checked against a type with [`check`] instead.
///
/// # Errors
///
/// Returns an error if the program is ill-typed or its type can't be
/// inferred.
pub fn infer(program: &Program) -> Result<Type, TypeError> {
    Checker {
        program,
        binders: Vec::new(),
    }
    .infer(program.root())
}

#[cfg(test)]
mod tests {
    use super::{check, infer, TypeError};
    use crate::{
        compile::compile,
        program::{arrow, Program, Type},
    };

    fn turtle_fn() -> Type {
        arrow(Type::turtle(), Type::turtle())
    }

    #[test]
    fn compiled_programs_are_turtle_functions() {
        for source in &[
            "(move 1d 0a)",
            "(loop i 7 (move (*l 1l i) (/a 1a 4)))",
            "(loop j 3 (embed (loop i infinity (move (*d epsilonLength j) epsilonAngle))) (p (move 1d 0a)))",
            "(loop i 5 (move (*d 1d 3) (-a (/a 1a 2) (/a (/a 1a 2) 5))))",
        ] {
            let program = compile(source).unwrap();
            assert_eq!(check(&program, &turtle_fn()), Ok(()), "{}", source);
        }
    }

    #[test]
    fn infers_applications() {
        let program: Program = "(logo_DIVA logo_UA 4)".parse().unwrap();
        assert_eq!(infer(&program), Ok(Type::angle()));
        let program: Program = "(+ 1 (+ 2 logo_IFTY))".parse().unwrap();
        assert_eq!(infer(&program), Ok(Type::int()));
    }

    #[test]
    fn reports_mismatches() {
        // A length where an angle is expected.
        let program: Program = "(lambda (logo_FWRT logo_UL logo_UL $0))".parse().unwrap();
        assert!(matches!(
            check(&program, &turtle_fn()),
            Err(TypeError::Mismatch { ref term, .. }) if term == "logo_UL"
        ));

        let program: Program = "(lambda $1)".parse().unwrap();
        assert_eq!(
            check(&program, &turtle_fn()),
            Err(TypeError::UnboundVariable(1))
        );

        let program: Program = "(logo_UL 3)".parse().unwrap();
        assert!(matches!(infer(&program), Err(TypeError::NotAFunction(_))));

        let program: Program = "(lambda $0)".parse().unwrap();
        assert!(matches!(infer(&program), Err(TypeError::CannotInfer(_))));

        let program: Program = "(lambda (frobnicate $0))".parse().unwrap();
        assert!(matches!(
            check(&program, &turtle_fn()),
            Err(TypeError::UnknownPrimitive(_))
        ));
    }

    #[test]
    fn arithmetic_programs() {
        let program: Program = "(lambda (incr2_custom (incr_custom $0)))".parse().unwrap();
        assert_eq!(check(&program, &arrow(Type::int(), Type::int())), Ok(()));
    }
}
