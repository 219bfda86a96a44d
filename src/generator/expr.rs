//! Generic expression grammar (MySQL dialect).

use super::Generator;
use crate::ast::*;
use crate::error::{CrudError, CrudResult};

/// Column that holds the JSON of a document collection.
const DOC_COLUMN: &str = "doc";

/// Trait for rendering AST nodes as SQL expressions.
pub trait ToSqlExpr {
    /// Append this node to the generator.
    fn to_sql_expr(&self, g: &mut Generator<'_>) -> CrudResult<()>;
}

impl ToSqlExpr for Expr {
    fn to_sql_expr(&self, g: &mut Generator<'_>) -> CrudResult<()> {
        match self {
            Expr::Identifier(ident) => ident.to_sql_expr(g),
            Expr::Literal(scalar) => scalar.to_sql_expr(g),
            Expr::Placeholder(index) => {
                let args = g.args();
                match args.get(*index as usize) {
                    Some(arg) => arg.to_sql_expr(g),
                    None => Err(CrudError::InvalidExpression(format!(
                        "Invalid value of placeholder {} ({} bound)",
                        index,
                        args.len()
                    ))),
                }
            }
            Expr::Object(object) => object.to_sql_expr(g),
            Expr::Array(items) => {
                g.put("JSON_ARRAY(")
                    .put_list(items, |g, item| item.to_sql_expr(g))?
                    .put(")");
                Ok(())
            }
            Expr::FunctionCall(call) => call.to_sql_expr(g),
            Expr::Operator(op) => op.to_sql_expr(g),
        }
    }
}

impl ToSqlExpr for Scalar {
    fn to_sql_expr(&self, g: &mut Generator<'_>) -> CrudResult<()> {
        match self {
            Scalar::Null => {
                g.put("NULL");
            }
            Scalar::Sint(n) => {
                g.put(&n.to_string());
            }
            Scalar::Uint(n) => {
                g.put(&n.to_string());
            }
            Scalar::Double(n) => {
                g.put(&n.to_string());
            }
            Scalar::Float(n) => {
                g.put(&n.to_string());
            }
            Scalar::Bool(b) => {
                g.put(if *b { "TRUE" } else { "FALSE" });
            }
            Scalar::String(s) => {
                g.put_quote(s);
            }
            Scalar::Octets {
                value,
                content_type,
            } => match content_type {
                ContentType::Plain | ContentType::Xml => {
                    g.put_quote(value);
                }
                ContentType::Json => {
                    g.put("CAST(").put_quote(value).put(" AS JSON)");
                }
                ContentType::Geometry => {
                    g.put("ST_GEOMETRYFROMWKB(").put_quote(value).put(")");
                }
                ContentType::Other(code) => {
                    return Err(CrudError::InvalidExpression(format!(
                        "Unsupported content type {} for octets",
                        code
                    )));
                }
            },
        }
        Ok(())
    }
}

impl ToSqlExpr for Object {
    fn to_sql_expr(&self, g: &mut Generator<'_>) -> CrudResult<()> {
        g.put("JSON_OBJECT(")
            .put_list(&self.fields, |g, field| {
                g.put_quote(&field.key).put(",");
                field.value.to_sql_expr(g)
            })?
            .put(")");
        Ok(())
    }
}

impl ToSqlExpr for ColumnIdentifier {
    fn to_sql_expr(&self, g: &mut Generator<'_>) -> CrudResult<()> {
        if self.document_path.is_empty() {
            put_column(g, self, &self.name);
            return Ok(());
        }
        let column = if self.name.is_empty() {
            DOC_COLUMN
        } else {
            self.name.as_str()
        };
        g.put("JSON_EXTRACT(");
        put_column(g, self, column);
        g.put(",").put_quote(&document_path(&self.document_path)).put(")");
        Ok(())
    }
}

fn put_column(g: &mut Generator<'_>, ident: &ColumnIdentifier, column: &str) {
    if let Some(schema) = &ident.schema_name {
        g.put_identifier(schema).put(".");
    }
    if let Some(table) = &ident.table_name {
        g.put_identifier(table).put(".");
    }
    g.put_identifier(column);
}

/// Render a document path as a JSON path string (`$.a[1].*`).
fn document_path(items: &[DocumentPathItem]) -> String {
    let mut path = String::from("$");
    for item in items {
        match item {
            DocumentPathItem::Member(name) => {
                path.push('.');
                if is_plain_name(name) {
                    path.push_str(name);
                } else {
                    path.push('"');
                    path.push_str(&name.replace('\\', "\\\\").replace('"', "\\\""));
                    path.push('"');
                }
            }
            DocumentPathItem::MemberAsterisk => path.push_str(".*"),
            DocumentPathItem::ArrayIndex(i) => path.push_str(&format!("[{}]", i)),
            DocumentPathItem::ArrayIndexAsterisk => path.push_str("[*]"),
            DocumentPathItem::DoubleAsterisk => path.push_str("**"),
        }
    }
    path
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !name.chars().next().map(|c| c.is_numeric()).unwrap_or(false)
}

impl ToSqlExpr for FunctionCall {
    fn to_sql_expr(&self, g: &mut Generator<'_>) -> CrudResult<()> {
        match &self.name.schema_name {
            Some(schema) => {
                g.put_identifier(schema).put(".").put_identifier(&self.name.name);
            }
            // Unqualified names are builtins and must stay unquoted.
            None if is_plain_name(&self.name.name) => {
                g.put(&self.name.name);
            }
            None => {
                return Err(CrudError::InvalidExpression(format!(
                    "Invalid function name '{}'",
                    self.name.name
                )));
            }
        }
        g.put("(")
            .put_list(&self.params, |g, param| param.to_sql_expr(g))?
            .put(")");
        Ok(())
    }
}

/// SQL spelling of a binary operator.
fn binary_operator(name: &str) -> Option<&'static str> {
    Some(match name {
        "==" => " = ",
        "!=" => " != ",
        "<>" => " <> ",
        ">" => " > ",
        ">=" => " >= ",
        "<" => " < ",
        "<=" => " <= ",
        "&&" => " AND ",
        "||" => " OR ",
        "xor" => " XOR ",
        "+" => " + ",
        "-" => " - ",
        "*" => " * ",
        "/" => " / ",
        "div" => " DIV ",
        "%" => " % ",
        "like" => " LIKE ",
        "not_like" => " NOT LIKE ",
        "regexp" => " REGEXP ",
        "is" => " IS ",
        "is_not" => " IS NOT ",
        "&" => " & ",
        "|" => " | ",
        "^" => " ^ ",
        "<<" => " << ",
        ">>" => " >> ",
        _ => return None,
    })
}

/// SQL spelling of a unary prefix operator.
fn unary_operator(name: &str) -> Option<&'static str> {
    Some(match name {
        "!" | "not" => "NOT ",
        "sign_minus" => "-",
        "sign_plus" => "+",
        "~" => "~",
        _ => return None,
    })
}

impl ToSqlExpr for Operator {
    fn to_sql_expr(&self, g: &mut Generator<'_>) -> CrudResult<()> {
        let name = self.name.to_lowercase();
        match self.params.as_slice() {
            [lhs, rhs] => {
                let op = binary_operator(&name).ok_or_else(|| self.invalid())?;
                g.put("(");
                lhs.to_sql_expr(g)?;
                g.put(op);
                rhs.to_sql_expr(g)?;
                g.put(")");
            }
            [operand] => {
                let op = unary_operator(&name).ok_or_else(|| self.invalid())?;
                g.put("(").put(op);
                operand.to_sql_expr(g)?;
                g.put(")");
            }
            _ => return Err(self.invalid()),
        }
        Ok(())
    }
}

impl Operator {
    fn invalid(&self) -> CrudError {
        CrudError::InvalidExpression(format!(
            "Invalid operator '{}' with {} operand(s)",
            self.name,
            self.params.len()
        ))
    }
}
