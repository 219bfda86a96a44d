use serde::{Deserialize, Serialize};

/// Content type tag carried by octet scalars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Plain,
    Geometry,
    Json,
    Xml,
    /// Any tag the renderer has no special handling for.
    Other(u32),
}

impl ContentType {
    /// Map a wire-level content type code.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => ContentType::Plain,
            1 => ContentType::Geometry,
            2 => ContentType::Json,
            3 => ContentType::Xml,
            n => ContentType::Other(n),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            ContentType::Plain => 0,
            ContentType::Geometry => 1,
            ContentType::Json => 2,
            ContentType::Xml => 3,
            ContentType::Other(n) => *n,
        }
    }

    /// Whether a payload of this type may receive a generated `_id`.
    pub fn is_document(&self) -> bool {
        matches!(self, ContentType::Plain | ContentType::Json)
    }
}

/// A scalar literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Null,
    Sint(i64),
    Uint(u64),
    Double(f64),
    Float(f32),
    Bool(bool),
    String(String),
    /// Raw payload tagged with a content type.
    Octets {
        value: String,
        #[serde(default)]
        content_type: ContentType,
    },
}

impl Scalar {
    pub fn string(value: impl Into<String>) -> Self {
        Scalar::String(value.into())
    }

    /// Octets tagged as JSON.
    pub fn json(value: impl Into<String>) -> Self {
        Scalar::Octets {
            value: value.into(),
            content_type: ContentType::Json,
        }
    }

    pub fn octets(value: impl Into<String>, content_type: ContentType) -> Self {
        Scalar::Octets {
            value: value.into(),
            content_type,
        }
    }
}

/// One step of a document path (`$.a[2].*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentPathItem {
    Member(String),
    MemberAsterisk,
    ArrayIndex(u32),
    ArrayIndexAsterisk,
    DoubleAsterisk,
}

/// A column reference, optionally reaching into the JSON it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnIdentifier {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub document_path: Vec<DocumentPathItem>,
}

impl ColumnIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reference `$.member` inside the document column.
    pub fn member(member: impl Into<String>) -> Self {
        Self {
            document_path: vec![DocumentPathItem::Member(member.into())],
            ..Default::default()
        }
    }
}

/// Possibly schema-qualified function name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionName {
    pub name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: FunctionName,
    #[serde(default)]
    pub params: Vec<Expr>,
}

/// An operator applied to its operands (`==`, `+`, `not`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectField {
    pub key: String,
    pub value: Expr,
}

/// An ordered set of key/value pairs, rendered as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object {
    pub fields: Vec<ObjectField>,
}

impl Object {
    /// Whether `key` is one of the top-level keys.
    pub fn has_key(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }
}

impl<K: Into<String>> FromIterator<(K, Expr)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Expr)>>(iter: I) -> Self {
        Object {
            fields: iter
                .into_iter()
                .map(|(key, value)| ObjectField {
                    key: key.into(),
                    value,
                })
                .collect(),
        }
    }
}

/// An expression as carried by insert rows.
///
/// Closed on purpose: every consumer matches exhaustively, so a new kind
/// has to be handled everywhere before it compiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Identifier(ColumnIdentifier),
    Literal(Scalar),
    /// Index into the statement's bound arguments.
    Placeholder(u32),
    Object(Object),
    Array(Vec<Expr>),
    FunctionCall(FunctionCall),
    Operator(Operator),
}

impl Expr {
    pub fn literal(scalar: Scalar) -> Self {
        Expr::Literal(scalar)
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Expr)>) -> Self {
        Expr::Object(fields.into_iter().collect())
    }

    pub fn column(name: impl Into<String>) -> Self {
        Expr::Identifier(ColumnIdentifier::new(name))
    }

    pub fn call(name: impl Into<String>, params: Vec<Expr>) -> Self {
        Expr::FunctionCall(FunctionCall {
            name: FunctionName {
                name: name.into(),
                schema_name: None,
            },
            params,
        })
    }

    pub fn op(name: impl Into<String>, params: Vec<Expr>) -> Self {
        Expr::Operator(Operator {
            name: name.into(),
            params,
        })
    }
}

impl From<Scalar> for Expr {
    fn from(scalar: Scalar) -> Self {
        Expr::Literal(scalar)
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr::Literal(Scalar::Sint(v))
    }
}

impl From<&str> for Expr {
    fn from(v: &str) -> Self {
        Expr::Literal(Scalar::String(v.to_string()))
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Expr::Literal(Scalar::Bool(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_codes() {
        assert_eq!(ContentType::from_code(2), ContentType::Json);
        assert_eq!(ContentType::from_code(42), ContentType::Other(42));
        assert_eq!(ContentType::Xml.code(), 3);
        assert!(ContentType::Plain.is_document());
        assert!(!ContentType::Geometry.is_document());
    }

    #[test]
    fn test_object_has_key() {
        let obj: Object = [("_id", Expr::from(1)), ("name", Expr::from("x"))]
            .into_iter()
            .collect();
        assert!(obj.has_key("_id"));
        assert!(!obj.has_key("id"));
    }

    #[test]
    fn test_expr_from_json() {
        let expr: Expr = serde_json::from_str(
            r#"{"object": [{"key": "a", "value": {"literal": {"sint": 1}}}]}"#,
        )
        .unwrap();
        assert_eq!(expr, Expr::object([("a", Expr::from(1))]));
    }
}
