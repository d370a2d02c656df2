//! Simple types for programs, in the trainer's JSON representation.

use std::fmt::{self, Debug, Display, Formatter};

use super::util;
use egg::Symbol;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
struct RawType {
    constructor: String,
    arguments: Vec<RawType>,
}

/// The type of a program.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawType")]
#[serde(into = "RawType")]
pub enum Type {
    /// A base type, e.g. `int`, `turtle`, etc.
    Simple {
        /// The name of the type.
        name: Symbol,
    },

    /// A compound type (e.g. `list int`), formed from a named constructor and its arguments.
    Compound {
        /// The name of the constructor.
        constructor: Symbol,

        /// The arguments to the type constructor.
        arguments: Vec<Type>,
    },

    /// A function type, e.g. `int -> int`.
    Function {
        /// The type of the function's argument.
        from: Box<Type>,

        /// The return type of the function.
        to: Box<Type>,
    },
}

impl Type {
    /// Create a new simple type named `name`.
    #[must_use]
    pub fn simple<T: Into<Symbol>>(name: T) -> Self {
        let name = name.into();
        Self::Simple { name }
    }

    /// Create a new compound type with constructor `constructor` and arguments `arguments`.
    #[must_use]
    pub fn compound<T: Into<Symbol>>(constructor: T, arguments: Vec<Type>) -> Self {
        let constructor = constructor.into();
        Self::Compound {
            constructor,
            arguments,
        }
    }

    /// Create a new function type with argument type `from` and return type `to`.
    #[must_use]
    pub fn function(from: Type, to: Type) -> Self {
        let from = from.into();
        let to = to.into();
        Self::Function { from, to }
    }

    /// Integers.
    #[must_use]
    pub fn int() -> Self {
        Self::simple("int")
    }

    /// The turtle: a drawing action in continuation-passing style.
    #[must_use]
    pub fn turtle() -> Self {
        Self::simple("turtle")
    }

    /// Angles.
    #[must_use]
    pub fn angle() -> Self {
        Self::simple("angle")
    }

    /// Lengths.
    #[must_use]
    pub fn length() -> Self {
        Self::simple("length")
    }

    /// If this is a function type, returns its argument and return types.
    #[must_use]
    pub fn as_function(&self) -> Option<(&Type, &Type)> {
        match self {
            Self::Function { from, to } => Some((from, to)),
            _ => None,
        }
    }
}

/// The function type `from -> to`.
#[must_use]
pub fn arrow(from: Type, to: Type) -> Type {
    Type::function(from, to)
}

/// The curried function type `t1 -> t2 -> ... -> tn`.
///
/// # Panics
///
/// Panics if `types` is empty.
#[must_use]
pub fn arrows<I>(types: I) -> Type
where
    I: IntoIterator<Item = Type>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut types = types.into_iter().rev();
    let last = types.next().expect("arrows needs at least one type");
    types.fold(last, |to, from| arrow(from, to))
}

impl From<RawType> for Type {
    fn from(raw_type: RawType) -> Self {
        let RawType {
            constructor,
            arguments,
        } = raw_type;
        let mut arguments: Vec<Type> = arguments.into_iter().map_into().collect();

        if constructor == "->" && arguments.len() == 2 {
            if let (Some(to), Some(from)) = (arguments.pop(), arguments.pop()) {
                return Self::function(from, to);
            }
        }
        if arguments.is_empty() {
            Self::simple(constructor.as_str())
        } else {
            Self::compound(constructor.as_str(), arguments)
        }
    }
}

impl From<Type> for RawType {
    fn from(typ: Type) -> Self {
        match typ {
            Type::Simple { name } => Self {
                constructor: name.as_str().to_string(),
                arguments: Vec::new(),
            },
            Type::Compound {
                constructor,
                arguments,
            } => Self {
                constructor: constructor.as_str().to_string(),
                arguments: arguments.into_iter().map_into().collect(),
            },
            Type::Function { from, to } => Self {
                constructor: "->".to_string(),
                arguments: vec![(*from).into(), (*to).into()],
            },
        }
    }
}

impl Debug for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Simple { name } => write!(f, "{}", name),
            Type::Compound {
                constructor,
                arguments,
            } => util::parens(1, f, |f| {
                write!(f, "{}", constructor)?;
                for argument in arguments {
                    write!(f, " {:.2}", argument)?;
                }
                Ok(())
            }),
            Type::Function { from, to } => {
                util::parens(0, f, |f| write!(f, "{:.1} -> {:.0}", from, to))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{arrow, arrows, Type};

    #[test]
    fn type_display() {
        let typ = arrows(vec![
            Type::int(),
            arrows(vec![Type::int(), Type::turtle(), Type::turtle()]),
            Type::turtle(),
            Type::turtle(),
        ]);
        assert_eq!(
            typ.to_string(),
            "int -> (int -> turtle -> turtle) -> turtle -> turtle"
        );
        assert_eq!(
            Type::compound("list", vec![Type::int()]).to_string(),
            "list int"
        );
    }

    #[test]
    fn json_shape() {
        let typ = arrow(Type::turtle(), Type::turtle());
        let json = serde_json::to_value(&typ).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "constructor": "->",
                "arguments": [
                    {"constructor": "turtle", "arguments": []},
                    {"constructor": "turtle", "arguments": []}
                ]
            })
        );
        let back: Type = serde_json::from_value(json).unwrap();
        assert_eq!(back, typ);
    }

    #[test]
    fn json_compound_types() {
        let json = serde_json::json!({
            "constructor": "pair",
            "arguments": [
                {"constructor": "int", "arguments": []},
                {
                    "constructor": "->",
                    "arguments": [
                        {"constructor": "turtle", "arguments": []},
                        {"constructor": "turtle", "arguments": []}
                    ]
                }
            ]
        });
        let typ: Type = serde_json::from_value(json).unwrap();
        assert_eq!(
            typ,
            Type::compound(
                "pair",
                vec![Type::int(), arrow(Type::turtle(), Type::turtle())]
            )
        );
        assert_eq!(typ.to_string(), "pair int (turtle -> turtle)");
    }
}
