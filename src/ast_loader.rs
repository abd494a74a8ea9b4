//! Loads the external parser's JSON AST into the in-memory node model.
//!
//! Vector and function type tags have no single fixed JSON shape. This
//! loader uses `["vec", <elem-type>]` and
//! `["fn", [<param-type>, …], <return-type>]` wherever a type tag is
//! expected, alongside the plain string tags (`"^int"`, `"#StructName"`,
//! …). Struct type tags of the form `"#Name"` resolve against a registry
//! populated by `def-struct` statements seen earlier in the same program
//! — there is no forward reference.
//!
//! A `function_literal` expression has no dedicated wire tag elsewhere in
//! this crate's accepted grammar; this loader reserves the tag `"fn-lit"`
//! for it: `["fn-lit", <function-def>]`.

use serde_json::Value as Json;

use crate::ast::{BinaryOp, Expr, FunctionDef, Literal, Stmt};
use crate::error::AstError;
use crate::types::{FunctionSignature, StructDescriptor, TypeDescriptor};

/// Loads a JSON AST into a sequence of top-level statements, tracking
/// struct definitions as they're encountered so later `"#Name"` type tags
/// resolve.
pub struct AstLoader {
    structs: std::collections::HashMap<String, StructDescriptor>,
}

impl AstLoader {
    /// Creates a loader with an empty struct registry.
    pub fn new() -> Self {
        AstLoader {
            structs: std::collections::HashMap::new(),
        }
    }

    /// Loads a full program: a JSON array of top-level statement nodes.
    pub fn load_program(&mut self, json: &Json) -> Result<Vec<Stmt>, AstError> {
        let items = json
            .as_array()
            .ok_or_else(|| AstError::malformed("$", "expected a JSON array of statements"))?;
        let mut stmts = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            stmts.push(self.load_stmt(item, &format!("$[{}]", i))?);
        }
        Ok(stmts)
    }

    /// Loads one statement node.
    pub fn load_stmt(&mut self, json: &Json, path: &str) -> Result<Stmt, AstError> {
        let arr = json
            .as_array()
            .ok_or_else(|| AstError::malformed(path, "expected a JSON array"))?;
        let tag = tag_of(arr, path)?;
        match tag {
            "bind" => {
                require_len(arr, 4, path, "bind")?;
                let declared_type = self.parse_type(&arr[1], &format!("{}[1]", path))?;
                let name = string_at(arr, 2, path, "bind name")?;
                let expr = self.parse_expr(&arr[3], &format!("{}[3]", path))?;
                Ok(Stmt::Bind {
                    declared_type,
                    name,
                    expr,
                })
            }
            "block" => {
                require_len(arr, 2, path, "block")?;
                let body = arr[1]
                    .as_array()
                    .ok_or_else(|| AstError::malformed(path, "block body must be an array"))?;
                let mut stmts = Vec::with_capacity(body.len());
                for (i, item) in body.iter().enumerate() {
                    stmts.push(self.load_stmt(item, &format!("{}[1][{}]", path, i))?);
                }
                Ok(Stmt::Block(stmts))
            }
            "return" => {
                require_len(arr, 2, path, "return")?;
                Ok(Stmt::Return(self.parse_expr(&arr[1], &format!("{}[1]", path))?))
            }
            "if" => {
                require_len(arr, 4, path, "if")?;
                let cond = self.parse_expr(&arr[1], &format!("{}[1]", path))?;
                let then_branch = self.load_stmt_list(&arr[2], &format!("{}[2]", path))?;
                let else_branch = self.load_stmt_list(&arr[3], &format!("{}[3]", path))?;
                Ok(Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                })
            }
            "for" => {
                require_len(arr, 5, path, "for")?;
                let iter_name = string_at(arr, 1, path, "for iterator name")?;
                let start = self.parse_expr(&arr[2], &format!("{}[2]", path))?;
                let end = self.parse_expr(&arr[3], &format!("{}[3]", path))?;
                let body = self.load_stmt_list(&arr[4], &format!("{}[4]", path))?;
                Ok(Stmt::ForRange {
                    iter_name,
                    start,
                    end,
                    body,
                })
            }
            "def-func" => {
                require_len(arr, 2, path, "def-func")?;
                let obj = arr[1].as_object().ok_or_else(|| {
                    AstError::malformed(path, "def-func payload must be an object")
                })?;
                let name = field_string(obj, "name", path)?;
                let return_type = self.parse_type(
                    field(obj, "return_type", path)?,
                    &format!("{}.return_type", path),
                )?;
                let params = self.parse_params(field(obj, "args", path)?, path)?;
                let statements = self.load_stmt_list(field(obj, "statements", path)?, path)?;
                Ok(Stmt::DefFunc {
                    name,
                    def: Box::new(FunctionDef {
                        params,
                        return_type,
                        body: statements,
                    }),
                })
            }
            "def-struct" => {
                require_len(arr, 2, path, "def-struct")?;
                let obj = arr[1].as_object().ok_or_else(|| {
                    AstError::malformed(path, "def-struct payload must be an object")
                })?;
                let name = field_string(obj, "name", path)?;
                let params = self.parse_params(field(obj, "members", path)?, path)?;
                let descriptor = StructDescriptor {
                    name: Some(name.clone()),
                    members: params,
                };
                self.structs.insert(name.clone(), descriptor.clone());
                Ok(Stmt::DefStruct { name, descriptor })
            }
            other => Err(AstError::malformed(
                path,
                format!("unknown statement tag '{}'", other),
            )),
        }
    }

    fn load_stmt_list(&mut self, json: &Json, path: &str) -> Result<Vec<Stmt>, AstError> {
        let items = json
            .as_array()
            .ok_or_else(|| AstError::malformed(path, "expected a JSON array of statements"))?;
        let mut stmts = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            stmts.push(self.load_stmt(item, &format!("{}[{}]", path, i))?);
        }
        Ok(stmts)
    }

    fn parse_params(
        &self,
        json: &Json,
        path: &str,
    ) -> Result<Vec<(String, TypeDescriptor)>, AstError> {
        let items = json
            .as_array()
            .ok_or_else(|| AstError::malformed(path, "expected a JSON array of parameters"))?;
        let mut params = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let obj = item.as_object().ok_or_else(|| {
                AstError::malformed(format!("{}[{}]", path, i), "parameter must be an object")
            })?;
            let name = field_string(obj, "name", path)?;
            let ty = self.parse_type(field(obj, "type", path)?, &format!("{}[{}].type", path, i))?;
            params.push((name, ty));
        }
        Ok(params)
    }

    /// Loads one expression node.
    pub fn parse_expr(&self, json: &Json, path: &str) -> Result<Expr, AstError> {
        let arr = json
            .as_array()
            .ok_or_else(|| AstError::malformed(path, "expected a JSON array"))?;
        let tag = tag_of(arr, path)?;
        match tag {
            "k" => {
                require_len(arr, 3, path, "k")?;
                let ty = self.parse_type(&arr[2], &format!("{}[2]", path))?;
                Ok(Expr::Literal(parse_literal(&arr[1], &ty, path)?))
            }
            "@" => {
                require_len(arr, 3, path, "@")?;
                let name = string_at(arr, 1, path, "variable name")?;
                Ok(Expr::Variable(name))
            }
            "neg" => {
                require_len(arr, 3, path, "neg")?;
                Ok(Expr::UnaryMinus(Box::new(
                    self.parse_expr(&arr[1], &format!("{}[1]", path))?,
                )))
            }
            "?:" => {
                require_len(arr, 5, path, "?:")?;
                let cond = Box::new(self.parse_expr(&arr[1], &format!("{}[1]", path))?);
                let then_expr = Box::new(self.parse_expr(&arr[2], &format!("{}[2]", path))?);
                let else_expr = Box::new(self.parse_expr(&arr[3], &format!("{}[3]", path))?);
                self.parse_type(&arr[4], &format!("{}[4]", path))?;
                Ok(Expr::Conditional {
                    cond,
                    then_expr,
                    else_expr,
                })
            }
            "call" => {
                require_len(arr, 4, path, "call")?;
                let callee = Box::new(self.parse_expr(&arr[1], &format!("{}[1]", path))?);
                let arg_items = arr[2].as_array().ok_or_else(|| {
                    AstError::malformed(format!("{}[2]", path), "call args must be an array")
                })?;
                let mut args = Vec::with_capacity(arg_items.len());
                for (i, item) in arg_items.iter().enumerate() {
                    args.push(self.parse_expr(item, &format!("{}[2][{}]", path, i))?);
                }
                Ok(Expr::Call { callee, args })
            }
            "->" => {
                require_len(arr, 4, path, "->")?;
                let parent = Box::new(self.parse_expr(&arr[1], &format!("{}[1]", path))?);
                let member = string_at(arr, 2, path, "member name")?;
                Ok(Expr::ResolveMember { parent, member })
            }
            "[-]" => {
                require_len(arr, 4, path, "[-]")?;
                let parent = Box::new(self.parse_expr(&arr[1], &format!("{}[1]", path))?);
                let key = Box::new(self.parse_expr(&arr[2], &format!("{}[2]", path))?);
                Ok(Expr::Lookup { parent, key })
            }
            "fn-lit" => {
                require_len(arr, 2, path, "fn-lit")?;
                let obj = arr[1]
                    .as_object()
                    .ok_or_else(|| AstError::malformed(path, "fn-lit payload must be an object"))?;
                let return_type = self.parse_type(
                    field(obj, "return_type", path)?,
                    &format!("{}.return_type", path),
                )?;
                let params = self.parse_params(field(obj, "args", path)?, path)?;
                let statements = {
                    let mut loader = AstLoader {
                        structs: self.structs.clone(),
                    };
                    loader.load_stmt_list(field(obj, "statements", path)?, path)?
                };
                Ok(Expr::FunctionLiteral(Box::new(FunctionDef {
                    params,
                    return_type,
                    body: statements,
                })))
            }
            binary_tag if binary_op(binary_tag).is_some() => {
                require_len(arr, 4, path, binary_tag)?;
                let op = binary_op(binary_tag).unwrap();
                let left = Box::new(self.parse_expr(&arr[1], &format!("{}[1]", path))?);
                let right = Box::new(self.parse_expr(&arr[2], &format!("{}[2]", path))?);
                Ok(Expr::Binary { op, left, right })
            }
            other => Err(AstError::malformed(
                path,
                format!("unknown expression tag '{}'", other),
            )),
        }
    }

    /// Parses a type tag: a plain string (`"^int"`, `"#Name"`) or a
    /// structural encoding for vector/function (see module docs).
    pub fn parse_type(&self, json: &Json, path: &str) -> Result<TypeDescriptor, AstError> {
        if let Some(s) = json.as_str() {
            return self.parse_type_tag(s, path);
        }
        if let Some(arr) = json.as_array() {
            return self.parse_structural_type(arr, path);
        }
        Err(AstError::malformed(
            path,
            "type tag must be a string or a structural encoding array",
        ))
    }

    fn parse_type_tag(&self, tag: &str, path: &str) -> Result<TypeDescriptor, AstError> {
        match tag {
            "^null" => Ok(TypeDescriptor::Null),
            "^bool" => Ok(TypeDescriptor::Bool),
            "^int" => Ok(TypeDescriptor::Int),
            "^float" => Ok(TypeDescriptor::Float),
            "^string" => Ok(TypeDescriptor::String),
            name if name.starts_with('#') => {
                let struct_name = &name[1..];
                self.structs.get(struct_name).cloned().map(TypeDescriptor::Struct).ok_or_else(|| {
                    AstError::malformed(
                        path,
                        format!("reference to undefined struct type '{}'", struct_name),
                    )
                })
            }
            other => Err(AstError::malformed(
                path,
                format!("unknown type tag '{}'", other),
            )),
        }
    }

    fn parse_structural_type(&self, arr: &[Json], path: &str) -> Result<TypeDescriptor, AstError> {
        let tag = arr
            .first()
            .and_then(Json::as_str)
            .ok_or_else(|| AstError::malformed(path, "structural type missing a tag"))?;
        match tag {
            "vec" => {
                require_len(arr, 2, path, "vec")?;
                let elem = self.parse_type(&arr[1], &format!("{}[1]", path))?;
                Ok(TypeDescriptor::Vector(Box::new(elem)))
            }
            "fn" => {
                require_len(arr, 3, path, "fn")?;
                let param_types = arr[1].as_array().ok_or_else(|| {
                    AstError::malformed(format!("{}[1]", path), "fn params must be an array")
                })?;
                let mut params = Vec::with_capacity(param_types.len());
                for (i, item) in param_types.iter().enumerate() {
                    let ty = self.parse_type(item, &format!("{}[1][{}]", path, i))?;
                    params.push((format!("arg{}", i), ty));
                }
                let return_type = self.parse_type(&arr[2], &format!("{}[2]", path))?;
                Ok(TypeDescriptor::Function(FunctionSignature {
                    return_type: Box::new(return_type),
                    params,
                }))
            }
            other => Err(AstError::malformed(
                path,
                format!("unknown structural type tag '{}'", other),
            )),
        }
    }
}

impl Default for AstLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_literal(value: &Json, ty: &TypeDescriptor, path: &str) -> Result<Literal, AstError> {
    match ty {
        TypeDescriptor::Null => Ok(Literal::Null),
        TypeDescriptor::Bool => value
            .as_bool()
            .map(Literal::Bool)
            .ok_or_else(|| AstError::malformed(path, "expected a JSON bool literal")),
        TypeDescriptor::Int => value
            .as_i64()
            .map(Literal::Int)
            .ok_or_else(|| AstError::malformed(path, "expected a JSON integer literal")),
        TypeDescriptor::Float => value
            .as_f64()
            .map(|f| Literal::Float(f as f32))
            .ok_or_else(|| AstError::malformed(path, "expected a JSON numeric literal")),
        TypeDescriptor::String => value
            .as_str()
            .map(|s| Literal::String(s.to_string()))
            .ok_or_else(|| AstError::malformed(path, "expected a JSON string literal")),
        other => Err(AstError::malformed(
            path,
            format!("'{}' is not a valid literal type", other),
        )),
    }
}

fn binary_op(tag: &str) -> Option<BinaryOp> {
    Some(match tag {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "%" => BinaryOp::Mod,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Le,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Ge,
        "==" => BinaryOp::Eq,
        "!=" => BinaryOp::Ne,
        "&&" => BinaryOp::And,
        "||" => BinaryOp::Or,
        _ => return None,
    })
}

fn tag_of<'a>(arr: &'a [Json], path: &str) -> Result<&'a str, AstError> {
    arr.first()
        .and_then(Json::as_str)
        .ok_or_else(|| AstError::malformed(path, "node is missing a tag string"))
}

fn require_len(arr: &[Json], len: usize, path: &str, tag: &str) -> Result<(), AstError> {
    if arr.len() != len {
        return Err(AstError::malformed(
            path,
            format!(
                "'{}' expects {} element(s), found {}",
                tag,
                len,
                arr.len()
            ),
        ));
    }
    Ok(())
}

fn string_at(arr: &[Json], index: usize, path: &str, what: &str) -> Result<String, AstError> {
    arr.get(index)
        .and_then(Json::as_str)
        .map(str::to_string)
        .ok_or_else(|| AstError::malformed(path, format!("expected {} to be a string", what)))
}

fn field<'a>(
    obj: &'a serde_json::Map<String, Json>,
    name: &str,
    path: &str,
) -> Result<&'a Json, AstError> {
    obj.get(name)
        .ok_or_else(|| AstError::malformed(path, format!("missing field '{}'", name)))
}

fn field_string(
    obj: &serde_json::Map<String, Json>,
    name: &str,
    path: &str,
) -> Result<String, AstError> {
    field(obj, name, path)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AstError::malformed(path, format!("field '{}' must be a string", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_a_bind_statement() {
        let mut loader = AstLoader::new();
        let json = json!(["bind", "^int", "result", ["+", ["k", 1, "^int"], ["k", 2, "^int"]]]);
        let stmt = loader.load_stmt(&json, "$").unwrap();
        match stmt {
            Stmt::Bind { name, declared_type, .. } => {
                assert_eq!(name, "result");
                assert_eq!(declared_type, TypeDescriptor::Int);
            }
            _ => panic!("expected Bind"),
        }
    }

    #[test]
    fn loads_nested_for_loop_with_inclusive_bounds() {
        let mut loader = AstLoader::new();
        let json = json!(["for", "i", ["k", 0, "^int"], ["k", 2, "^int"], []]);
        let stmt = loader.load_stmt(&json, "$").unwrap();
        match stmt {
            Stmt::ForRange { iter_name, .. } => assert_eq!(iter_name, "i"),
            _ => panic!("expected ForRange"),
        }
    }

    #[test]
    fn def_struct_registers_type_for_later_resolution() {
        let mut loader = AstLoader::new();
        let def_struct = json!([
            "def-struct",
            { "name": "Point", "members": [ {"name": "x", "type": "^int"} ] }
        ]);
        loader.load_stmt(&def_struct, "$").unwrap();
        let resolved = loader.parse_type(&json!("#Point"), "$").unwrap();
        match resolved {
            TypeDescriptor::Struct(sd) => assert_eq!(sd.members.len(), 1),
            _ => panic!("expected Struct"),
        }
    }

    #[test]
    fn unresolved_struct_reference_is_malformed_ast() {
        let loader = AstLoader::new();
        let err = loader.parse_type(&json!("#Missing"), "$").unwrap_err();
        assert!(matches!(err, AstError::MalformedAst { .. }));
    }

    #[test]
    fn unknown_statement_tag_is_malformed_ast() {
        let mut loader = AstLoader::new();
        let err = loader.load_stmt(&json!(["bogus"]), "$").unwrap_err();
        assert!(matches!(err, AstError::MalformedAst { .. }));
    }

    #[test]
    fn ternary_expression_requires_a_trailing_type_tag() {
        let loader = AstLoader::new();
        let json = json!([
            "?:",
            ["k", true, "^bool"],
            ["k", 1, "^int"],
            ["k", 2, "^int"],
            "^int"
        ]);
        let expr = loader.parse_expr(&json, "$").unwrap();
        assert!(matches!(expr, Expr::Conditional { .. }));

        let missing_type = json!([
            "?:",
            ["k", true, "^bool"],
            ["k", 1, "^int"],
            ["k", 2, "^int"]
        ]);
        let err = loader.parse_expr(&missing_type, "$").unwrap_err();
        assert!(matches!(err, AstError::MalformedAst { .. }));
    }

    #[test]
    fn vector_type_tag_parses_structurally() {
        let loader = AstLoader::new();
        let ty = loader.parse_type(&json!(["vec", "^int"]), "$").unwrap();
        assert_eq!(ty, TypeDescriptor::Vector(Box::new(TypeDescriptor::Int)));
    }

    #[test]
    fn loads_a_full_fib_style_program() {
        let mut loader = AstLoader::new();
        let json = json!([
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
        let stmts = loader.load_program(&json).unwrap();
        assert_eq!(stmts.len(), 2);
    }
}
