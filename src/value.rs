//! Runtime values.
//!
//! Values have copy-on-write, value-level semantics: `String`, `Struct`,
//! `Vector`, and `Function` payloads live behind an `Rc` so cloning a
//! [`Value`] is cheap, but every observable operation treats the payload as
//! if it were deeply copied. Nothing here ever mutates through an `Rc` —
//! `with_member` always produces a new `StructInstance`.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::ast::Stmt;
use crate::error::EvalError;
use crate::types::{FunctionSignature, StructDescriptor, TypeDescriptor};

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 32-bit IEEE-754 float.
    Float(f32),
    /// A UTF-8 string.
    String(Rc<str>),
    /// A struct instance.
    Struct(Rc<StructInstance>),
    /// A vector.
    Vector(Rc<VectorInstance>),
    /// A function value, either host-backed, interpreted, or an implicit
    /// struct constructor.
    Function(Rc<FunctionValue>),
}

/// A struct instance: a descriptor and an ordered list of member values.
///
/// Member order mirrors the descriptor's member order; member lookup is by
/// exact name, not position.
#[derive(Debug, Clone, PartialEq)]
pub struct StructInstance {
    /// The struct's shape.
    pub descriptor: StructDescriptor,
    /// Member values in declaration order.
    pub members: Vec<(String, Value)>,
}

/// A vector instance: an element type and a sequence of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorInstance {
    /// The declared element type.
    pub element_type: TypeDescriptor,
    /// Elements in order.
    pub elements: Vec<Value>,
}

/// A function value.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionValue {
    /// The function's signature.
    pub signature: FunctionSignature,
    /// How the function is actually invoked.
    pub implementation: FunctionImpl,
}

/// How a function value is invoked.
#[derive(Debug, Clone)]
pub enum FunctionImpl {
    /// A built-in, dispatched by numeric id through the host registry.
    Host(u32),
    /// An interpreted function body, sharing its statement list by `Rc`.
    Interpreted {
        /// Parameter names, in declaration order, matching the signature.
        params: Vec<String>,
        /// The body, shared rather than cloned per call.
        body: Rc<Vec<Stmt>>,
    },
    /// The implicit nullary constructor function bound under
    /// `<name>_constructor` when a struct is defined. Takes no arguments
    /// and produces a default-valued instance via [`Value::default_of`].
    StructConstructor(StructDescriptor),
}

impl PartialEq for FunctionImpl {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FunctionImpl::Host(a), FunctionImpl::Host(b)) => a == b,
            (
                FunctionImpl::Interpreted { body: a, .. },
                FunctionImpl::Interpreted { body: b, .. },
            ) => Rc::ptr_eq(a, b),
            (FunctionImpl::StructConstructor(a), FunctionImpl::StructConstructor(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Derives this value's type descriptor.
    pub fn type_descriptor(&self) -> TypeDescriptor {
        match self {
            Value::Null => TypeDescriptor::Null,
            Value::Bool(_) => TypeDescriptor::Bool,
            Value::Int(_) => TypeDescriptor::Int,
            Value::Float(_) => TypeDescriptor::Float,
            Value::String(_) => TypeDescriptor::String,
            Value::Struct(s) => TypeDescriptor::Struct(s.descriptor.clone()),
            Value::Vector(v) => TypeDescriptor::Vector(Box::new(v.element_type.clone())),
            Value::Function(f) => TypeDescriptor::Function(f.signature.clone()),
        }
    }

    /// Returns the base tag name for this value, matching the data model's
    /// type tags.
    pub fn tag_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Struct(_) => "struct",
            Value::Vector(_) => "vector",
            Value::Function(_) => "function",
        }
    }

    /// Evaluates truthiness for use as an `if`/conditional-expression
    /// condition. Only `Bool` is truthy-evaluable; every other tag is a
    /// type error.
    pub fn is_truthy(&self) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(EvalError::TypeError {
                message: format!("expected bool, found {}", other.tag_name()),
            }),
        }
    }

    /// Evaluates truthiness for use as a `&&`/`||` operand: `Bool` follows
    /// the usual truth table, non-zero `Int`/`Float` are truthy, every
    /// other tag is a type error. Stricter contexts (`if`, conditional
    /// expressions) must use [`Value::is_truthy`] instead.
    pub fn is_truthy_for_logical_op(&self) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Float(x) => Ok(*x != 0.0),
            other => Err(EvalError::TypeError {
                message: format!(
                    "expected bool, int, or float, found {}",
                    other.tag_name()
                ),
            }),
        }
    }

    /// Structural equality. Comparing values of different tags is a type
    /// error, not `false` — the language has no cross-type equality.
    pub fn equals(a: &Value, b: &Value) -> Result<bool, EvalError> {
        match (a, b) {
            (Value::Null, Value::Null) => Ok(true),
            (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
            (Value::Int(x), Value::Int(y)) => Ok(x == y),
            (Value::Float(x), Value::Float(y)) => Ok(x == y),
            (Value::String(x), Value::String(y)) => Ok(x == y),
            (Value::Struct(x), Value::Struct(y)) => {
                if x.descriptor != y.descriptor {
                    return Err(kind_mismatch(a, b));
                }
                if x.members.len() != y.members.len() {
                    return Ok(false);
                }
                for ((xn, xv), (yn, yv)) in x.members.iter().zip(y.members.iter()) {
                    if xn != yn || !Value::equals(xv, yv)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Vector(x), Value::Vector(y)) => {
                if x.element_type != y.element_type {
                    return Err(kind_mismatch(a, b));
                }
                if x.elements.len() != y.elements.len() {
                    return Ok(false);
                }
                for (xv, yv) in x.elements.iter().zip(y.elements.iter()) {
                    if !Value::equals(xv, yv)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Function(x), Value::Function(y)) => Ok(x == y),
            _ => Err(kind_mismatch(a, b)),
        }
    }

    /// Structural ordering. Only `Int`, `Float`, and `String` have a total
    /// order; every other tag (including matching `Struct`/`Vector`/
    /// `Function` pairs) is a type error.
    pub fn compare(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
            (Value::Float(x), Value::Float(y)) => {
                x.partial_cmp(y).ok_or_else(|| EvalError::TypeError {
                    message: "float comparison produced no ordering (NaN)".to_string(),
                })
            }
            (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
            _ => Err(EvalError::TypeError {
                message: format!(
                    "values of type {} are not ordered",
                    a.type_descriptor()
                ),
            }),
        }
    }

    /// Produces the default value for a declared type, recursing
    /// member-by-member for structs. Function types have no default.
    pub fn default_of(descriptor: &TypeDescriptor) -> Result<Value, EvalError> {
        match descriptor {
            TypeDescriptor::Null => Ok(Value::Null),
            TypeDescriptor::Bool => Ok(Value::Bool(false)),
            TypeDescriptor::Int => Ok(Value::Int(0)),
            TypeDescriptor::Float => Ok(Value::Float(0.0)),
            TypeDescriptor::String => Ok(Value::String(Rc::from(""))),
            TypeDescriptor::Vector(elem) => Ok(Value::Vector(Rc::new(VectorInstance {
                element_type: (**elem).clone(),
                elements: Vec::new(),
            }))),
            TypeDescriptor::Struct(sd) => {
                let mut members = Vec::with_capacity(sd.members.len());
                for (name, ty) in &sd.members {
                    members.push((name.clone(), Value::default_of(ty)?));
                }
                Ok(Value::Struct(Rc::new(StructInstance {
                    descriptor: sd.clone(),
                    members,
                })))
            }
            TypeDescriptor::Function(_) => Err(EvalError::TypeError {
                message: "function types have no default value".to_string(),
            }),
        }
    }

    /// Looks up a struct member by name.
    pub fn get_member(&self, name: &str) -> Result<Value, EvalError> {
        match self {
            Value::Struct(s) => s
                .members
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| EvalError::MemberNotFound {
                    name: name.to_string(),
                }),
            other => Err(EvalError::TypeError {
                message: format!("expected struct, found {}", other.tag_name()),
            }),
        }
    }

    /// Produces a copy of a struct instance with one member replaced.
    pub fn with_member(
        instance: &StructInstance,
        name: &str,
        new_value: Value,
    ) -> Result<StructInstance, EvalError> {
        let mut members = instance.members.clone();
        let slot = members
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| EvalError::MemberNotFound {
                name: name.to_string(),
            })?;
        slot.1 = new_value;
        Ok(StructInstance {
            descriptor: instance.descriptor.clone(),
            members,
        })
    }
}

fn kind_mismatch(a: &Value, b: &Value) -> EvalError {
    EvalError::TypeError {
        message: format!(
            "cannot compare {} with {}",
            a.type_descriptor(),
            b.type_descriptor()
        ),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:.6}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Struct(s) => {
                write!(f, "{{")?;
                for (i, (name, value)) in s.members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", name, value)?;
                }
                write!(f, "}}")
            }
            Value::Vector(v) => {
                write!(f, "[")?;
                for (i, value) in v.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Value::Function(func) => write!(f, "<function {}>", func.signature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_display_uses_six_fractional_digits() {
        assert_eq!(Value::Float(1.5).to_string(), "1.500000");
    }

    #[test]
    fn string_display_has_no_quotes() {
        assert_eq!(Value::String(Rc::from("hi")).to_string(), "hi");
    }

    #[test]
    fn struct_display_lists_members_as_name_equals_value() {
        let s = StructInstance {
            descriptor: StructDescriptor {
                name: Some("Point".to_string()),
                members: vec![("x".to_string(), TypeDescriptor::Int)],
            },
            members: vec![("x".to_string(), Value::Int(3))],
        };
        assert_eq!(Value::Struct(Rc::new(s)).to_string(), "{x=3}");
    }

    #[test]
    fn vector_display_lists_elements() {
        let v = VectorInstance {
            element_type: TypeDescriptor::Int,
            elements: vec![Value::Int(1), Value::Int(2)],
        };
        assert_eq!(Value::Vector(Rc::new(v)).to_string(), "[1, 2]");
    }

    #[test]
    fn equals_rejects_cross_tag_comparison() {
        let err = Value::equals(&Value::Int(1), &Value::Bool(true)).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn compare_orders_ints() {
        assert_eq!(
            Value::compare(&Value::Int(1), &Value::Int(2)).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn compare_rejects_structs() {
        let s = StructInstance {
            descriptor: StructDescriptor {
                name: None,
                members: vec![],
            },
            members: vec![],
        };
        let a = Value::Struct(Rc::new(s.clone()));
        let b = Value::Struct(Rc::new(s));
        let err = Value::compare(&a, &b).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn default_of_struct_recurses_member_by_member() {
        let sd = StructDescriptor {
            name: Some("Point".to_string()),
            members: vec![
                ("x".to_string(), TypeDescriptor::Int),
                ("label".to_string(), TypeDescriptor::String),
            ],
        };
        let default = Value::default_of(&TypeDescriptor::Struct(sd)).unwrap();
        match default {
            Value::Struct(s) => {
                assert_eq!(s.members[0].1.to_string(), "0");
                assert_eq!(s.members[1].1.to_string(), "");
            }
            _ => panic!("expected struct"),
        }
    }

    #[test]
    fn default_of_function_is_an_error() {
        let sig = FunctionSignature {
            return_type: Box::new(TypeDescriptor::Int),
            params: vec![],
        };
        let err = Value::default_of(&TypeDescriptor::Function(sig)).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn with_member_produces_a_new_instance_leaving_original_untouched() {
        let s = StructInstance {
            descriptor: StructDescriptor {
                name: None,
                members: vec![("x".to_string(), TypeDescriptor::Int)],
            },
            members: vec![("x".to_string(), Value::Int(1))],
        };
        let updated = Value::with_member(&s, "x", Value::Int(9)).unwrap();
        assert_eq!(updated.members[0].1.to_string(), "9");
        assert_eq!(s.members[0].1.to_string(), "1");
    }

    #[test]
    fn with_member_unknown_name_is_member_not_found() {
        let s = StructInstance {
            descriptor: StructDescriptor {
                name: None,
                members: vec![],
            },
            members: vec![],
        };
        let err = Value::with_member(&s, "missing", Value::Null).unwrap_err();
        assert!(matches!(err, EvalError::MemberNotFound { .. }));
    }
}
