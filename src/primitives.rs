//! The fixed primitive set shared by the LOGO and arithmetic domains, and the
//! table mapping LOGO surface operators to primitives.

use crate::program::{arrow, arrows, Program, Type};
use egg::Symbol;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

/// A primitive of the program language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    /// `logo_UL`: the unit length.
    UnitLength,
    /// `logo_ZL`: the zero length.
    ZeroLength,
    /// `logo_epsL`: the step length of smooth curves.
    EpsilonLength,
    /// `logo_UA`: the unit angle, one full turn.
    UnitAngle,
    /// `logo_ZA`: the zero angle.
    ZeroAngle,
    /// `logo_epsA`: the step angle of smooth curves.
    EpsilonAngle,
    /// `logo_IFTY`: the iteration count that turns a smooth curve through
    /// half a turn.
    Infinity,
    /// `logo_DIVL`: divide a length by an integer.
    DivLength,
    /// `logo_MULL`: multiply a length by an integer.
    MulLength,
    /// `logo_DIVA`: divide an angle by an integer.
    DivAngle,
    /// `logo_MULA`: multiply an angle by an integer.
    MulAngle,
    /// `logo_ADDA`: add two angles.
    AddAngle,
    /// `logo_SUBA`: subtract two angles.
    SubAngle,
    /// `logo_FWRT`: move forward, then turn.
    Move,
    /// `logo_PT`: run a body with the pen lifted.
    PenUp,
    /// `logo_GETSET`: run a body, then restore the turtle's position and
    /// heading.
    GetSet,
    /// `logo_forLoop`: run a body once per loop index.
    ForLoop,
    /// `+`: integer addition.
    Add,
    /// `incr_custom`: add one.
    Incr,
    /// `incr2_custom`: add two.
    Incr2,
    /// An integer literal.
    Integer(i64),
}

lazy_static! {
    static ref NAMED: IndexMap<&'static str, Primitive> = {
        use Primitive::*;
        [
            UnitLength, ZeroLength, EpsilonLength, UnitAngle, ZeroAngle, EpsilonAngle,
            Infinity, DivLength, MulLength, DivAngle, MulAngle, AddAngle, SubAngle, Move,
            PenUp, GetSet, ForLoop, Add, Incr, Incr2,
        ]
        .iter()
        .map(|&p| (p.name(), p))
        .collect()
    };

    /// LOGO surface operators, in lookup order. `None` marks operators the
    /// language reserves but has no primitive for.
    pub static ref OPERATORS: IndexMap<&'static str, Option<Primitive>> = {
        use Primitive::*;
        vec![
            ("1a", Some(UnitAngle)),
            ("1d", Some(UnitLength)),
            ("1l", Some(UnitLength)),
            ("0a", Some(ZeroAngle)),
            ("0d", Some(ZeroLength)),
            ("0l", Some(ZeroLength)),
            ("/a", Some(DivAngle)),
            ("/l", Some(DivLength)),
            ("/d", Some(DivLength)),
            ("*a", Some(MulAngle)),
            ("*l", Some(MulLength)),
            ("*d", Some(MulLength)),
            ("+a", Some(AddAngle)),
            ("+d", None),
            ("+l", None),
            ("-a", Some(SubAngle)),
            ("-d", None),
            ("-l", None),
            ("+", Some(Add)),
            ("infinity", Some(Infinity)),
            ("epsilonAngle", Some(EpsilonAngle)),
            ("epsilonDistance", Some(EpsilonLength)),
            ("epsilonLength", Some(EpsilonLength)),
        ]
        .into_iter()
        .collect()
    };
}

impl Primitive {
    /// The primitive's name in programs. Integer literals have no static
    /// name; see [`Primitive::symbol`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::UnitLength => "logo_UL",
            Self::ZeroLength => "logo_ZL",
            Self::EpsilonLength => "logo_epsL",
            Self::UnitAngle => "logo_UA",
            Self::ZeroAngle => "logo_ZA",
            Self::EpsilonAngle => "logo_epsA",
            Self::Infinity => "logo_IFTY",
            Self::DivLength => "logo_DIVL",
            Self::MulLength => "logo_MULL",
            Self::DivAngle => "logo_DIVA",
            Self::MulAngle => "logo_MULA",
            Self::AddAngle => "logo_ADDA",
            Self::SubAngle => "logo_SUBA",
            Self::Move => "logo_FWRT",
            Self::PenUp => "logo_PT",
            Self::GetSet => "logo_GETSET",
            Self::ForLoop => "logo_forLoop",
            Self::Add => "+",
            Self::Incr => "incr_custom",
            Self::Incr2 => "incr2_custom",
            Self::Integer(_) => "<integer>",
        }
    }

    /// The symbol naming this primitive in a [`Program`].
    #[must_use]
    pub fn symbol(self) -> Symbol {
        match self {
            Self::Integer(n) => Symbol::from(n.to_string().as_str()),
            other => Symbol::from(other.name()),
        }
    }

    /// A program consisting of just this primitive.
    #[must_use]
    pub fn program(self) -> Program {
        Program::primitive(self.symbol())
    }

    /// The primitive's type.
    #[must_use]
    pub fn tp(self) -> Type {
        let turtle_fn = || arrow(Type::turtle(), Type::turtle());
        match self {
            Self::UnitLength | Self::ZeroLength | Self::EpsilonLength => Type::length(),
            Self::UnitAngle | Self::ZeroAngle | Self::EpsilonAngle => Type::angle(),
            Self::Infinity | Self::Integer(_) => Type::int(),
            Self::DivLength | Self::MulLength => {
                arrows(vec![Type::length(), Type::int(), Type::length()])
            }
            Self::DivAngle | Self::MulAngle => {
                arrows(vec![Type::angle(), Type::int(), Type::angle()])
            }
            Self::AddAngle | Self::SubAngle => {
                arrows(vec![Type::angle(), Type::angle(), Type::angle()])
            }
            Self::Move => arrows(vec![
                Type::length(),
                Type::angle(),
                Type::turtle(),
                Type::turtle(),
            ]),
            Self::PenUp | Self::GetSet => arrows(vec![turtle_fn(), Type::turtle(), Type::turtle()]),
            Self::ForLoop => arrows(vec![
                Type::int(),
                arrows(vec![Type::int(), Type::turtle(), Type::turtle()]),
                Type::turtle(),
                Type::turtle(),
            ]),
            Self::Add => arrows(vec![Type::int(), Type::int(), Type::int()]),
            Self::Incr | Self::Incr2 => arrow(Type::int(), Type::int()),
        }
    }

    /// The number of arguments the primitive takes.
    #[must_use]
    pub fn arity(self) -> usize {
        let mut arity = 0;
        let mut tp = self.tp();
        while let Type::Function { to, .. } = tp {
            arity += 1;
            tp = *to;
        }
        arity
    }
}

/// The primitives of the LOGO domain: every `logo_*` primitive, integer
/// addition, and the integer literals zero through nine.
#[must_use]
pub fn logo_primitives() -> Vec<Primitive> {
    NAMED
        .values()
        .copied()
        .filter(|p| !matches!(p, Primitive::Incr | Primitive::Incr2))
        .chain((0..10).map(Primitive::Integer))
        .collect()
}

/// The primitives of the toy arithmetic domain.
#[must_use]
pub fn arithmetic_primitives() -> Vec<Primitive> {
    vec![Primitive::Incr, Primitive::Incr2]
}

/// An error produced when a name does not denote a primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown primitive `{0}`")]
pub struct UnknownPrimitive(pub String);

impl FromStr for Primitive {
    type Err = UnknownPrimitive;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(&primitive) = NAMED.get(s) {
            return Ok(primitive);
        }
        s.parse()
            .map(Self::Integer)
            .map_err(|_| UnknownPrimitive(s.to_string()))
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::{Primitive, OPERATORS};

    #[test]
    fn names_round_trip() {
        for primitive in super::logo_primitives() {
            let name = primitive.to_string();
            assert_eq!(name.parse::<Primitive>(), Ok(primitive), "{}", name);
        }
        assert_eq!("-3".parse(), Ok(Primitive::Integer(-3)));
        assert!("logo_ADDL".parse::<Primitive>().is_err());
    }

    #[test]
    fn arities() {
        assert_eq!(Primitive::UnitLength.arity(), 0);
        assert_eq!(Primitive::Move.arity(), 3);
        assert_eq!(Primitive::ForLoop.arity(), 3);
        assert_eq!(Primitive::PenUp.arity(), 2);
        assert_eq!(Primitive::Incr.arity(), 1);
    }

    #[test]
    fn operator_table() {
        assert_eq!(OPERATORS["1l"], Some(Primitive::UnitLength));
        assert_eq!(OPERATORS["/d"], Some(Primitive::DivLength));
        assert_eq!(OPERATORS["epsilonDistance"], Some(Primitive::EpsilonLength));
        assert_eq!(OPERATORS["-l"], None);
        assert!(!OPERATORS.contains_key("move"));
    }
}
