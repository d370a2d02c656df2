//! De Bruijn-indexed programs, their types, and the JSON interface used to
//! hand tasks to an external trainer.

pub mod expr;
pub mod json;
pub mod types;
mod parse;
mod util;

pub use expr::{ParseProgramError, Program, ProgramNode};
pub use types::{arrow, arrows, Type};
pub use util::{DeBruijnIndex, ParseDeBruijnIndexError};
