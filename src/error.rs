//! Error types produced while loading and evaluating Floyd Speak programs.
//!
//! # Error Categories
//!
//! - [`AstError`]: the JSON AST handed to us by the external parser does not
//!   match the accepted wire shapes.
//! - [`EvalError`]: evaluation of an otherwise well-formed AST failed.
//!
//! [`FloydError`] folds both into the one error type the driver and the
//! public `run_global`/`run_main` entry points return.

use thiserror::Error;

/// The AST handed to the core does not match the expected wire shapes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstError {
    /// An unknown tag, wrong arity, or wrong payload type was found at
    /// `path` while loading the JSON AST.
    #[error("malformed AST at {path}: {reason}")]
    MalformedAst {
        /// Breadcrumb describing where in the JSON tree the problem was found.
        path: String,
        /// Human-readable description of what was expected.
        reason: String,
    },
}

impl AstError {
    /// Convenience constructor for [`AstError::MalformedAst`].
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        AstError::MalformedAst {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced while reducing an expression or executing a statement.
///
/// There is no user-visible recovery from any of them
/// within the language itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A name was not found in the environment or its parent chain.
    #[error("undefined symbol: {name}")]
    UndefinedSymbol {
        /// The unresolved name.
        name: String,
    },

    /// A name was bound twice in the same frame.
    #[error("duplicate binding: {name}")]
    DuplicateBinding {
        /// The name that was already bound.
        name: String,
    },

    /// An operation is not defined for the operand types involved.
    ///
    /// This also covers what the data model calls a "kind mismatch":
    /// comparing or testing equality across two different value tags.
    #[error("type error: {message}")]
    TypeError {
        /// Description of the offending operation and operand types.
        message: String,
    },

    /// A call supplied the wrong number of arguments.
    #[error("arity mismatch: expected {expected} argument(s), found {found}")]
    ArityMismatch {
        /// Number of parameters the callee declares.
        expected: usize,
        /// Number of arguments actually supplied.
        found: usize,
    },

    /// A declared type and an actual value's type disagree.
    ///
    /// Used both for call-argument checks and for `bind`'s declared-type
    /// check, distinguished by `context`.
    #[error("{context}: expected type {expected}, found {found}")]
    ArgumentTypeMismatch {
        /// Where the mismatch was found, e.g. `"argument 0"` or `"bind 'result'"`.
        context: String,
        /// The declared/expected type, formatted for display.
        expected: String,
        /// The actual type found, formatted for display.
        found: String,
    },

    /// A struct lacks a member with the given name.
    #[error("member not found: {name}")]
    MemberNotFound {
        /// The missing member name.
        name: String,
    },

    /// A vector or string index fell outside `[0, len)`.
    #[error("index out of range: {index} (length {len})")]
    IndexOutOfRange {
        /// The offending index.
        index: i64,
        /// The length of the indexed container.
        len: usize,
    },

    /// Integer or float division or remainder by zero.
    #[error("divide by zero")]
    DivideByZero,

    /// An interpreted function body ran to completion without a `return`.
    #[error("function body ended without a return statement")]
    MissingReturn,

    /// A `return` statement executed outside any function, at top level.
    #[error("return statement executed at top level")]
    ReturnInGlobal,
}

/// The crate's single public error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FloydError {
    /// The JSON AST was malformed.
    #[error(transparent)]
    Ast(#[from] AstError),

    /// Evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ast_error_message_includes_path() {
        let err = AstError::malformed("$.statements[0]", "unknown tag 'bogus'");
        let msg = err.to_string();
        assert!(msg.contains("$.statements[0]"));
        assert!(msg.contains("bogus"));
    }

    #[test]
    fn floyd_error_wraps_eval_error() {
        let err: FloydError = EvalError::DivideByZero.into();
        assert_eq!(err.to_string(), "divide by zero");
    }

    #[test]
    fn floyd_error_wraps_ast_error() {
        let err: FloydError = AstError::malformed("$", "empty program").into();
        assert!(matches!(err, FloydError::Ast(_)));
    }
}
