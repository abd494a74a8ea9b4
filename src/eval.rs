//! Expression evaluator.
//!
//! `eval` reduces an [`Expr`] to a [`Value`] in the context of an
//! [`Environment`] and a [`crate::exec::ExecContext`] (needed to invoke
//! function calls, since calls may run statements). Short-circuit
//! operators (`&&`, `||`) are special-cased ahead of the generic binary
//! dispatch so the right-hand side is never evaluated unless needed.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, Literal};
use crate::env::Environment;
use crate::error::EvalError;
use crate::exec::ExecContext;
use crate::value::Value;

/// Evaluates an expression to a value.
pub fn eval(expr: &Expr, env: &Environment, ctx: &mut ExecContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(lit) => Ok(eval_literal(lit)),
        Expr::Variable(name) => env.resolve(name),
        Expr::UnaryMinus(operand) => eval_unary_minus(eval(operand, env, ctx)?),
        Expr::Binary { op, left, right } => eval_binary(*op, left, right, env, ctx),
        Expr::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            if eval(cond, env, ctx)?.is_truthy()? {
                eval(then_expr, env, ctx)
            } else {
                eval(else_expr, env, ctx)
            }
        }
        Expr::Call { callee, args } => {
            let callee_value = eval(callee, env, ctx)?;
            let mut arg_values = Vec::with_capacity(args.len());
            for arg in args {
                arg_values.push(eval(arg, env, ctx)?);
            }
            let func = match callee_value {
                Value::Function(f) => f,
                other => {
                    return Err(EvalError::TypeError {
                        message: format!("expected function, found {}", other.tag_name()),
                    })
                }
            };
            ctx.call_function(&func, arg_values)
        }
        Expr::ResolveMember { parent, member } => eval(parent, env, ctx)?.get_member(member),
        Expr::Lookup { parent, key } => {
            let parent_value = eval(parent, env, ctx)?;
            let key_value = eval(key, env, ctx)?;
            eval_lookup(parent_value, key_value)
        }
        Expr::FunctionLiteral(def) => Ok(ctx.make_interpreted_function(def)),
    }
}

fn eval_literal(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(x) => Value::Float(*x),
        Literal::String(s) => Value::String(Rc::from(s.as_str())),
    }
}

fn eval_unary_minus(value: Value) -> Result<Value, EvalError> {
    match value {
        Value::Int(i) => Ok(Value::Int(-i)),
        Value::Float(x) => Ok(Value::Float(-x)),
        other => Err(EvalError::TypeError {
            message: format!("cannot negate {}", other.tag_name()),
        }),
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    env: &Environment,
    ctx: &mut ExecContext,
) -> Result<Value, EvalError> {
    // Short-circuit logical operators must not evaluate their right-hand
    // side unless it's needed.
    if matches!(op, BinaryOp::And) {
        return if eval(left, env, ctx)?.is_truthy_for_logical_op()? {
            Ok(Value::Bool(eval(right, env, ctx)?.is_truthy_for_logical_op()?))
        } else {
            Ok(Value::Bool(false))
        };
    }
    if matches!(op, BinaryOp::Or) {
        return if eval(left, env, ctx)?.is_truthy_for_logical_op()? {
            Ok(Value::Bool(true))
        } else {
            Ok(Value::Bool(eval(right, env, ctx)?.is_truthy_for_logical_op()?))
        };
    }

    let lv = eval(left, env, ctx)?;
    let rv = eval(right, env, ctx)?;
    apply_binary(op, lv, rv)
}

fn apply_binary(op: BinaryOp, lv: Value, rv: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => add(lv, rv),
        BinaryOp::Sub => arith(lv, rv, "-", |a, b| a - b, |a, b| a - b),
        BinaryOp::Mul => arith(lv, rv, "*", |a, b| a * b, |a, b| a * b),
        BinaryOp::Div => div(lv, rv),
        BinaryOp::Mod => rem(lv, rv),
        BinaryOp::Eq => Ok(Value::Bool(Value::equals(&lv, &rv)?)),
        BinaryOp::Ne => Ok(Value::Bool(!Value::equals(&lv, &rv)?)),
        BinaryOp::Lt => Ok(Value::Bool(Value::compare(&lv, &rv)? == Ordering::Less)),
        BinaryOp::Le => Ok(Value::Bool(Value::compare(&lv, &rv)? != Ordering::Greater)),
        BinaryOp::Gt => Ok(Value::Bool(Value::compare(&lv, &rv)? == Ordering::Greater)),
        BinaryOp::Ge => Ok(Value::Bool(Value::compare(&lv, &rv)? != Ordering::Less)),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled by eval_binary's short-circuit path"),
    }
}

fn add(lv: Value, rv: Value) -> Result<Value, EvalError> {
    match (lv, rv) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        (Value::String(a), Value::String(b)) => {
            Ok(Value::String(Rc::from(format!("{}{}", a, b))))
        }
        (a, b) => Err(EvalError::TypeError {
            message: format!("cannot add {} and {}", a.tag_name(), b.tag_name()),
        }),
    }
}

fn arith(
    lv: Value,
    rv: Value,
    symbol: &str,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f32, f32) -> f32,
) -> Result<Value, EvalError> {
    match (lv, rv) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(a, b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(a, b))),
        (a, b) => Err(EvalError::TypeError {
            message: format!(
                "cannot apply '{}' to {} and {}",
                symbol,
                a.tag_name(),
                b.tag_name()
            ),
        }),
    }
}

fn div(lv: Value, rv: Value) -> Result<Value, EvalError> {
    match (lv, rv) {
        (Value::Int(_), Value::Int(0)) => Err(EvalError::DivideByZero),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a / b)),
        (Value::Float(_), Value::Float(b)) if b == 0.0 => Err(EvalError::DivideByZero),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),
        (a, b) => Err(EvalError::TypeError {
            message: format!("cannot divide {} by {}", a.tag_name(), b.tag_name()),
        }),
    }
}

fn rem(lv: Value, rv: Value) -> Result<Value, EvalError> {
    match (lv, rv) {
        (Value::Int(_), Value::Int(0)) => Err(EvalError::DivideByZero),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a % b)),
        (a, b) => Err(EvalError::TypeError {
            message: format!(
                "cannot apply '%' to {} and {}",
                a.tag_name(),
                b.tag_name()
            ),
        }),
    }
}

fn eval_lookup(parent: Value, key: Value) -> Result<Value, EvalError> {
    let index = match key {
        Value::Int(i) => i,
        other => {
            return Err(EvalError::TypeError {
                message: format!("index must be int, found {}", other.tag_name()),
            })
        }
    };
    match parent {
        Value::Vector(v) => {
            let len = v.elements.len();
            usize::try_from(index)
                .ok()
                .and_then(|i| v.elements.get(i).cloned())
                .ok_or(EvalError::IndexOutOfRange { index, len })
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len();
            usize::try_from(index)
                .ok()
                .and_then(|i| chars.get(i))
                .map(|c| Value::String(Rc::from(c.to_string())))
                .ok_or(EvalError::IndexOutOfRange { index, len })
        }
        other => Err(EvalError::TypeError {
            message: format!("cannot index into {}", other.tag_name()),
        }),
    }
}
