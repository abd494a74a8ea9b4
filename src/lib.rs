//! # Floyd Speak semantic core
//!
//! This crate is the semantic core of Floyd Speak, a statically typed,
//! eager, value-semantics scripting language: the dynamic value model, the
//! lexical environment, the AST node model, the expression evaluator, the
//! statement executor and call protocol, and the host-function registry.
//!
//! Source parsing and static analysis happen outside this crate; what
//! lands here is a type-decorated JSON AST, produced by an external parser
//! and consumed by [`ast_loader`].
//!
//! ## Quick start
//!
//! ```rust
//! use floyd_speak_core::run_global;
//! use serde_json::json;
//!
//! let ast = json!([
//!     ["bind", "^int", "result", ["+", ["k", 1, "^int"], ["k", 2, "^int"]]]
//! ]);
//! let run = run_global(&ast).unwrap();
//! assert_eq!(run.resolve("result").unwrap().to_string(), "3");
//! ```
//!
//! ## Core concepts
//!
//! - [`value::Value`]: the tagged, immutable, structurally-compared runtime
//!   value every expression reduces to.
//! - [`types::TypeDescriptor`]: the canonical, structural type shape values
//!   and declarations are checked against.
//! - [`ast`]: the in-memory AST the evaluator and executor walk.
//! - [`env::Environment`]: the lexical frame chain names resolve through.
//! - [`eval`] / [`exec`]: pure expression reduction and statement
//!   execution, respectively.
//! - [`host`]: the numeric-id-keyed built-in function table (`print`,
//!   `to_string`, `get_time_of_day`).
//! - [`interpreter`]: [`interpreter::run_global`] and
//!   [`interpreter::run_main`], the crate's two public entry points.

pub mod ast;
pub mod ast_loader;
pub mod env;
pub mod error;
pub mod eval;
pub mod exec;
pub mod host;
pub mod interpreter;
pub mod types;
pub mod value;

pub use ast_loader::AstLoader;
pub use env::Environment;
pub use error::{AstError, EvalError, FloydError};
pub use interpreter::{run_global, run_main, GlobalRun};
pub use types::{FunctionSignature, StructDescriptor, TypeDescriptor};
pub use value::{FunctionImpl, FunctionValue, StructInstance, Value, VectorInstance};
