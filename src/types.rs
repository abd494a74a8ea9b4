//! Type descriptors: the canonical, structural description of a Floyd
//! Speak type.
//!
//! Descriptors are compared structurally, never nominally, with one
//! exception carved out below for struct descriptors: a struct's name is
//! carried for diagnostics only and is excluded from equality, so two
//! struct descriptors with identical member lists are the same type
//! regardless of what they're called.

use std::fmt;

/// Canonical shape of a Floyd Speak type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// The null/void type.
    Null,
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 32-bit IEEE-754 float.
    Float,
    /// UTF-8 string.
    String,
    /// Struct shape: an ordered list of (member name, member type).
    Struct(StructDescriptor),
    /// Vector of a single element type.
    Vector(Box<TypeDescriptor>),
    /// Function signature.
    Function(FunctionSignature),
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Null => write!(f, "null"),
            TypeDescriptor::Bool => write!(f, "bool"),
            TypeDescriptor::Int => write!(f, "int"),
            TypeDescriptor::Float => write!(f, "float"),
            TypeDescriptor::String => write!(f, "string"),
            TypeDescriptor::Struct(s) => write!(f, "{}", s),
            TypeDescriptor::Vector(elem) => write!(f, "vector<{}>", elem),
            TypeDescriptor::Function(sig) => write!(f, "{}", sig),
        }
    }
}

impl TypeDescriptor {
    /// Returns the base tag name, matching the value tags in the data model.
    pub fn tag_name(&self) -> &'static str {
        match self {
            TypeDescriptor::Null => "null",
            TypeDescriptor::Bool => "bool",
            TypeDescriptor::Int => "int",
            TypeDescriptor::Float => "float",
            TypeDescriptor::String => "string",
            TypeDescriptor::Struct(_) => "struct",
            TypeDescriptor::Vector(_) => "vector",
            TypeDescriptor::Function(_) => "function",
        }
    }
}

/// Structural shape of a struct type: an ordered member list.
///
/// `name` is carried for diagnostics (error messages, `Display`) only; it
/// plays no part in equality, since struct identity is purely by member
/// list.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    /// The name the struct was declared under, if known.
    pub name: Option<String>,
    /// Members in declaration order.
    pub members: Vec<(String, TypeDescriptor)>,
}

impl PartialEq for StructDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl fmt::Display for StructDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.name.as_deref().unwrap_or("struct");
        write!(f, "{}{{", label)?;
        for (i, (name, ty)) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, ty)?;
        }
        write!(f, "}}")
    }
}

impl StructDescriptor {
    /// Looks up the declared type of a member by name.
    pub fn member_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

/// Structural shape of a function type: parameter types and a return type.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    /// Return type.
    pub return_type: Box<TypeDescriptor>,
    /// Parameters in declaration order.
    pub params: Vec<(String, TypeDescriptor)>,
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (_, ty)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_descriptors_with_same_members_are_equal_regardless_of_name() {
        let a = StructDescriptor {
            name: Some("Point".to_string()),
            members: vec![("x".to_string(), TypeDescriptor::Int)],
        };
        let b = StructDescriptor {
            name: Some("Coord".to_string()),
            members: vec![("x".to_string(), TypeDescriptor::Int)],
        };
        assert_eq!(a, b);
    }

    #[test]
    fn struct_descriptors_with_different_members_are_not_equal() {
        let a = StructDescriptor {
            name: None,
            members: vec![("x".to_string(), TypeDescriptor::Int)],
        };
        let b = StructDescriptor {
            name: None,
            members: vec![("x".to_string(), TypeDescriptor::Float)],
        };
        assert_ne!(a, b);
    }

    #[test]
    fn vector_descriptors_nest() {
        let v = TypeDescriptor::Vector(Box::new(TypeDescriptor::Int));
        assert_eq!(v.tag_name(), "vector");
        assert_eq!(v.to_string(), "vector<int>");
    }
}
