//! Statement executor and call protocol (sections 4.F and 4.F.1).
//!
//! The call protocol's one load-bearing rule: an interpreted function's
//! body always runs in a fresh frame parented on the *global* frame, never
//! on the caller's frame. Floyd Speak functions close over globals only,
//! never over lexical locals of whoever called them.

use std::rc::Rc;

use crate::ast::{FunctionDef, Stmt};
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval;
use crate::host::HostRegistry;
use crate::types::{FunctionSignature, TypeDescriptor};
use crate::value::{FunctionImpl, FunctionValue, Value};

/// Control flow produced by executing a statement or block.
#[derive(Debug)]
pub enum Flow {
    /// Execution should continue with the next statement.
    Continue,
    /// A `return` was executed; the value should propagate up to the
    /// enclosing function call.
    Return(Value),
}

/// Everything needed to execute statements and invoke calls: the global
/// frame every call closes over, and the host registry built-ins dispatch
/// through.
#[derive(Debug)]
pub struct ExecContext {
    global_env: Environment,
    host: HostRegistry,
}

impl ExecContext {
    /// Builds a context around a global environment and host registry.
    pub fn new(global_env: Environment, host: HostRegistry) -> Self {
        ExecContext { global_env, host }
    }

    /// The global frame every interpreted call is parented on.
    pub fn global_env(&self) -> &Environment {
        &self.global_env
    }

    /// The output log built up by calls to `print`.
    pub fn output_log(&self) -> &[String] {
        &self.host.output_log
    }

    /// Wraps a function definition as a callable value closing over the
    /// global frame.
    pub fn make_interpreted_function(&self, def: &FunctionDef) -> Value {
        Value::Function(Rc::new(FunctionValue {
            signature: FunctionSignature {
                return_type: Box::new(def.return_type.clone()),
                params: def.params.clone(),
            },
            implementation: FunctionImpl::Interpreted {
                params: def.params.iter().map(|(n, _)| n.clone()).collect(),
                body: Rc::new(def.body.clone()),
            },
        }))
    }

    /// Invokes a function value with already-evaluated arguments,
    /// following the call protocol: arity and argument types are checked
    /// uniformly regardless of implementation, then host calls dispatch
    /// through the registry while interpreted calls run in a fresh frame
    /// parented on the global frame.
    pub fn call_function(
        &mut self,
        func: &FunctionValue,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        if args.len() != func.signature.params.len() {
            return Err(EvalError::ArityMismatch {
                expected: func.signature.params.len(),
                found: args.len(),
            });
        }
        for (i, ((_, declared), value)) in
            func.signature.params.iter().zip(args.iter()).enumerate()
        {
            check_type(&format!("argument {}", i), declared, value)?;
        }

        match &func.implementation {
            FunctionImpl::Host(id) => self.host.invoke(*id, args),
            FunctionImpl::Interpreted { params, body } => {
                let call_env = self.global_env.child();
                for (name, value) in params.iter().zip(args.into_iter()) {
                    call_env.define(name, value)?;
                }
                match exec_block(body, &call_env, self)? {
                    Flow::Return(value) => {
                        check_type("return value", &func.signature.return_type, &value)?;
                        Ok(value)
                    }
                    Flow::Continue => Err(EvalError::MissingReturn),
                }
            }
            FunctionImpl::StructConstructor(descriptor) => {
                Value::default_of(&TypeDescriptor::Struct(descriptor.clone()))
            }
        }
    }
}

/// Checks `value` against `declared`, bypassing the check entirely when
/// `value` is `Null` — a function declared as returning null may satisfy
/// any declared target, accommodating void-returning host functions.
fn check_type(context: &str, declared: &TypeDescriptor, value: &Value) -> Result<(), EvalError> {
    if matches!(value, Value::Null) {
        return Ok(());
    }
    let actual = value.type_descriptor();
    if &actual != declared {
        return Err(EvalError::ArgumentTypeMismatch {
            context: context.to_string(),
            expected: declared.to_string(),
            found: actual.to_string(),
        });
    }
    Ok(())
}

/// Executes a sequence of statements in `env`, stopping early on the
/// first `Flow::Return`.
pub fn exec_block(
    stmts: &[Stmt],
    env: &Environment,
    ctx: &mut ExecContext,
) -> Result<Flow, EvalError> {
    for stmt in stmts {
        match exec_stmt(stmt, env, ctx)? {
            Flow::Continue => continue,
            Flow::Return(value) => return Ok(Flow::Return(value)),
        }
    }
    Ok(Flow::Continue)
}

/// Executes one statement.
pub fn exec_stmt(stmt: &Stmt, env: &Environment, ctx: &mut ExecContext) -> Result<Flow, EvalError> {
    match stmt {
        Stmt::Bind {
            declared_type,
            name,
            expr,
        } => {
            let value = eval(expr, env, ctx)?;
            check_type(&format!("bind '{}'", name), declared_type, &value)?;
            env.define(name, value)?;
            Ok(Flow::Continue)
        }
        Stmt::Block(body) => exec_block(body, &env.child(), ctx),
        Stmt::Return(expr) => Ok(Flow::Return(eval(expr, env, ctx)?)),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            if eval(cond, env, ctx)?.is_truthy()? {
                exec_block(then_branch, &env.child(), ctx)
            } else {
                exec_block(else_branch, &env.child(), ctx)
            }
        }
        Stmt::ForRange {
            iter_name,
            start,
            end,
            body,
        } => {
            // Bounds are evaluated once, before the loop begins, in the
            // environment active before any per-iteration frame exists.
            let start_value = eval(start, env, ctx)?;
            let end_value = eval(end, env, ctx)?;
            let (start_i, end_i) = match (start_value, end_value) {
                (Value::Int(a), Value::Int(b)) => (a, b),
                (a, b) => {
                    return Err(EvalError::TypeError {
                        message: format!(
                            "for-loop bounds must be int, found {} and {}",
                            a.tag_name(),
                            b.tag_name()
                        ),
                    })
                }
            };
            for i in start_i..=end_i {
                let iter_env = env.child();
                iter_env.define(iter_name, Value::Int(i))?;
                match exec_block(body, &iter_env, ctx)? {
                    Flow::Continue => continue,
                    Flow::Return(value) => return Ok(Flow::Return(value)),
                }
            }
            Ok(Flow::Continue)
        }
        Stmt::DefFunc { name, def } => {
            let func = ctx.make_interpreted_function(def);
            env.define(name, func)?;
            Ok(Flow::Continue)
        }
        Stmt::DefStruct { name, descriptor } => {
            let signature = FunctionSignature {
                return_type: Box::new(TypeDescriptor::Struct(descriptor.clone())),
                params: Vec::new(),
            };
            let constructor = Value::Function(Rc::new(FunctionValue {
                signature,
                implementation: FunctionImpl::StructConstructor(descriptor.clone()),
            }));
            env.define(&format!("{}_constructor", name), constructor)?;
            Ok(Flow::Continue)
        }
    }
}
