//! Top-level driver.
//!
//! `run_global` and `run_main` are the crate's two public entry points:
//! everything else (loading, evaluating, executing) is reachable through
//! them or used internally by the driver.

use crate::ast_loader::AstLoader;
use crate::env::Environment;
use crate::error::{EvalError, FloydError};
use crate::exec::{exec_stmt, ExecContext, Flow};
use crate::host::HostRegistry;
use crate::value::Value;

/// The result of running a program's global statements: the resulting
/// global environment and the accumulated `print` output log.
#[derive(Debug)]
pub struct GlobalRun {
    /// The global frame after all top-level statements have executed.
    pub global_env: Environment,
    /// Every line written by `print`, in call order.
    pub output_log: Vec<String>,
    exec: ExecContext,
}

impl GlobalRun {
    /// Resolves a name in the resulting global frame.
    pub fn resolve(&self, name: &str) -> Result<Value, EvalError> {
        self.global_env.resolve(name)
    }
}

/// Loads `ast_json`, installs host-function bindings, and executes the
/// program's top-level statements against a fresh global frame. A
/// top-level `return` is `return_in_global`.
pub fn run_global(ast_json: &serde_json::Value) -> Result<GlobalRun, FloydError> {
    let mut loader = AstLoader::new();
    let statements = loader.load_program(ast_json)?;

    let global_env = Environment::new_root();
    for (name, value) in HostRegistry::global_bindings() {
        global_env
            .define(&name, value)
            .map_err(FloydError::from)?;
    }

    let mut exec = ExecContext::new(global_env.clone(), HostRegistry::with_builtins());
    for stmt in &statements {
        match exec_stmt(stmt, &global_env, &mut exec).map_err(FloydError::from)? {
            Flow::Continue => {}
            Flow::Return(_) => return Err(FloydError::from(EvalError::ReturnInGlobal)),
        }
    }

    let output_log = exec.output_log().to_vec();
    Ok(GlobalRun {
        global_env,
        output_log,
        exec,
    })
}

/// Runs `run_global`, then resolves and invokes `main` with `args`,
/// returning its return value.
pub fn run_main(ast_json: &serde_json::Value, args: Vec<Value>) -> Result<Value, FloydError> {
    let mut run = run_global(ast_json)?;
    let main_value = run.resolve("main").map_err(FloydError::from)?;
    let main_fn = match main_value {
        Value::Function(f) => f,
        other => {
            return Err(FloydError::from(EvalError::TypeError {
                message: format!("'main' is not a function, found {}", other.tag_name()),
            }))
        }
    };
    run.exec
        .call_function(&main_fn, args)
        .map_err(FloydError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scenario_one_plus_two_equals_three() {
        let ast = json!([
            ["bind", "^int", "result", ["+", ["k", 1, "^int"], ["k", 2, "^int"]]]
        ]);
        let run = run_global(&ast).unwrap();
        assert_eq!(run.resolve("result").unwrap().to_string(), "3");
    }

    #[test]
    fn scenario_operator_precedence() {
        // 5 * ((1 + 3) * 2 + 1) = 45
        let ast = json!([
            [
                "bind", "^int", "result",
                ["*",
                    ["k", 5, "^int"],
                    ["+",
                        ["*", ["+", ["k", 1, "^int"], ["k", 3, "^int"], "^int"], ["k", 2, "^int"], "^int"],
                        ["k", 1, "^int"],
                        "^int"
                    ],
                    "^int"
                ]
            ]
        ]);
        let run = run_global(&ast).unwrap();
        assert_eq!(run.resolve("result").unwrap().to_string(), "45");
    }

    #[test]
    fn scenario_ternary_equality() {
        let ast = json!([
            ["bind", "^bool", "result",
                ["?:",
                    ["==", ["k", 3, "^int"], ["k", 3, "^int"], "^bool"],
                    ["k", true, "^bool"],
                    ["k", false, "^bool"],
                    "^bool"
                ]
            ]
        ]);
        let run = run_global(&ast).unwrap();
        assert_eq!(run.resolve("result").unwrap().to_string(), "true");
    }

    #[test]
    fn scenario_print_returns_null_and_logs_output() {
        let ast = json!([
            ["bind", "^int", "r",
                ["call", ["@", "print", ["fn", ["^string"], "^null"]],
                    [["k", "Hello, World!", "^string"]], "^null"]
            ]
        ]);
        let run = run_global(&ast).unwrap();
        assert_eq!(run.resolve("r").unwrap().to_string(), "null");
        assert_eq!(run.output_log, vec!["Hello, World!".to_string()]);
    }

    #[test]
    fn scenario_for_loop_prints_each_index() {
        let ast = json!([
            ["for", "i", ["k", 0, "^int"], ["k", 2, "^int"], [
                ["bind", "^int", "d",
                    ["call", ["@", "print", ["fn", ["^string"], "^null"]],
                        [["call", ["@", "to_string", ["fn", ["^int"], "^string"]],
                            [["@", "i", "^int"]], "^string"]],
                        "^null"]
                ]
            ]]
        ]);
        let run = run_global(&ast).unwrap();
        assert_eq!(
            run.output_log,
            vec!["0".to_string(), "1".to_string(), "2".to_string()]
        );
    }

    #[test]
    fn scenario_division_by_zero_is_reported() {
        let ast = json!([
            ["bind", "^int", "x", ["/", ["k", 3, "^int"], ["k", 0, "^int"], "^int"]]
        ]);
        let err = run_global(&ast).unwrap_err();
        assert!(matches!(
            err,
            FloydError::Eval(EvalError::DivideByZero)
        ));
    }

    #[test]
    fn return_at_top_level_is_an_error() {
        let ast = json!([["return", ["k", 1, "^int"]]]);
        let err = run_global(&ast).unwrap_err();
        assert!(matches!(err, FloydError::Eval(EvalError::ReturnInGlobal)));
    }

    #[test]
    fn run_main_invokes_the_resolved_main_function() {
        let ast = json!([
            [
                "def-func",
                {
                    "name": "main",
                    "return_type": "^int",
                    "args": [],
                    "statements": [["return", ["k", 7, "^int"]]]
                }
            ]
        ]);
        let result = run_main(&ast, vec![]).unwrap();
        assert_eq!(result.to_string(), "7");
    }

    #[test]
    fn fibonacci_of_ten_is_fifty_five() {
        let ast = json!([
            [
                "def-func",
                {
                    "name": "fib",
                    "return_type": "^int",
                    "args": [{"name": "n", "type": "^int"}],
                    "statements": [
                        ["if", ["<=", ["@", "n", "^int"], ["k", 1, "^int"], "^bool"], [
                            ["return", ["@", "n", "^int"]]
                        ], []],
                        ["return", ["+",
                            ["call", ["@", "fib", ["fn", ["^int"], "^int"]], [["-", ["@", "n", "^int"], ["k", 2, "^int"], "^int"]], "^int"],
                            ["call", ["@", "fib", ["fn", ["^int"], "^int"]], [["-", ["@", "n", "^int"], ["k", 1, "^int"], "^int"]], "^int"],
                            "^int"
                        ]]
                    ]
                }
            ],
            ["bind", "^int", "result", ["call", ["@", "fib", ["fn", ["^int"], "^int"]], [["k", 10, "^int"]], "^int"]]
        ]);
        let run = run_global(&ast).unwrap();
        assert_eq!(run.resolve("result").unwrap().to_string(), "55");
    }
}
