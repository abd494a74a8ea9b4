//! Host-function registry.
//!
//! Built-ins are dispatched by numeric id, not by name: the name under
//! which a built-in is bound in the global environment is metadata for
//! error messages only.

use std::rc::Rc;
use std::time::Instant;

use crate::error::EvalError;
use crate::types::{FunctionSignature, TypeDescriptor};
use crate::value::{FunctionImpl, FunctionValue, Value};

/// Numeric id of the `print` built-in.
pub const PRINT: u32 = 1;
/// Numeric id of the `to_string` built-in.
pub const TO_STRING: u32 = 2;
/// Numeric id of the `get_time_of_day` built-in.
pub const GET_TIME_OF_DAY: u32 = 3;

/// The set of host functions available to a running program, plus the
/// output log `print` appends to.
#[derive(Debug)]
pub struct HostRegistry {
    /// Every line written by `print`, in call order.
    pub output_log: Vec<String>,
    /// When this registry (and so the owning interpreter context) was
    /// constructed; `get_time_of_day` reports milliseconds elapsed since.
    start_time: Instant,
}

impl HostRegistry {
    /// Builds a registry with the standard built-ins (`print`, `to_string`,
    /// `get_time_of_day`) ready to invoke.
    pub fn with_builtins() -> Self {
        HostRegistry {
            output_log: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Returns the global bindings a fresh interpreter should install:
    /// name to function value, for each built-in.
    pub fn global_bindings() -> Vec<(String, Value)> {
        vec![
            (
                "print".to_string(),
                make_host_function(
                    PRINT,
                    vec![("value".to_string(), TypeDescriptor::String)],
                    TypeDescriptor::Null,
                ),
            ),
            (
                "to_string".to_string(),
                make_host_function(
                    TO_STRING,
                    vec![("value".to_string(), TypeDescriptor::Int)],
                    TypeDescriptor::String,
                ),
            ),
            (
                "get_time_of_day".to_string(),
                make_host_function(GET_TIME_OF_DAY, vec![], TypeDescriptor::Int),
            ),
        ]
    }

    /// Invokes a built-in by numeric id. Arity is assumed to already have
    /// been checked by the caller (the call protocol checks arity for every
    /// callee uniformly, host or interpreted).
    pub fn invoke(&mut self, id: u32, args: Vec<Value>) -> Result<Value, EvalError> {
        match id {
            PRINT => {
                let text = match args.into_iter().next() {
                    Some(v) => v.to_string(),
                    None => String::new(),
                };
                println!("{}", text);
                self.output_log.push(text);
                Ok(Value::Null)
            }
            TO_STRING => {
                let text = match args.into_iter().next() {
                    Some(v) => v.to_string(),
                    None => String::new(),
                };
                Ok(Value::String(Rc::from(text)))
            }
            GET_TIME_OF_DAY => {
                let millis = self.start_time.elapsed().as_millis() as i64;
                Ok(Value::Int(millis))
            }
            other => Err(EvalError::TypeError {
                message: format!("unknown host function id {}", other),
            }),
        }
    }
}

fn make_host_function(
    id: u32,
    params: Vec<(String, TypeDescriptor)>,
    return_type: TypeDescriptor,
) -> Value {
    Value::Function(Rc::new(FunctionValue {
        signature: FunctionSignature {
            return_type: Box::new(return_type),
            params,
        },
        implementation: FunctionImpl::Host(id),
    }))
}
