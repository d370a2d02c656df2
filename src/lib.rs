#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    anonymous_parameters,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    missing_debug_implementations,
    single_use_lifetimes,
    trivial_casts,
    unreachable_pub,
    unused_lifetimes,
)]

//! Task generation for LOGO turtle-graphics and toy arithmetic program
//! induction: a compiler from the LOGO s-expression language to de Bruijn
//! lambda terms, an interpreter and rasterizer for turtle programs, and the
//! JSON interface to an external trainer.

pub mod arithmetic;
pub mod catalog;
pub mod compile;
pub mod config;
pub mod dataset;
pub mod eval;
pub mod montage;
pub mod primitives;
pub mod program;
pub mod render;
pub mod sexp;
pub mod task;
pub mod typecheck;

pub use compile::compile;
pub use program::{Program, Type};
pub use task::Task;
