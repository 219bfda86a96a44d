//! Document rows: `_id` injection for literals, placeholders and objects.

use crate::ast::{Expr, Object, Scalar};
use crate::document_id::DocumentIdAggregator;
use crate::error::{CrudError, CrudResult};
use crate::generator::Generator;
use crate::json::{ID_MEMBER, is_id_in_json};

/// Emit the value of one document row.
pub(crate) fn add_document(
    g: &mut Generator<'_>,
    ids: &mut DocumentIdAggregator<'_>,
    row: &[Expr],
) -> CrudResult<()> {
    let [doc] = row else {
        return Err(CrudError::wrong_field_count());
    };
    match doc {
        Expr::Literal(scalar) => {
            if add_document_literal(g, ids, scalar)? {
                return Ok(());
            }
        }
        Expr::Placeholder(index) => {
            if add_document_placeholder(g, ids, *index)? {
                return Ok(());
            }
        }
        Expr::Object(object) => return add_document_object(g, ids, object),
        Expr::Identifier(_) | Expr::Array(_) | Expr::FunctionCall(_) | Expr::Operator(_) => {}
    }
    g.put("(").put_expr(doc)?.put(")");
    Ok(())
}

/// Emit a literal document. Returns `false` when the scalar cannot hold a
/// document and must be rendered generically instead.
fn add_document_literal(
    g: &mut Generator<'_>,
    ids: &mut DocumentIdAggregator<'_>,
    scalar: &Scalar,
) -> CrudResult<bool> {
    match scalar {
        Scalar::Octets {
            value,
            content_type,
        } => {
            if !content_type.is_document() {
                return Ok(false);
            }
            if is_id_in_json(value) {
                g.put("(").put_quote(value).put(")");
            } else {
                put_json_set(g, ids, |g| {
                    g.put_quote(value);
                    Ok(())
                })?;
            }
        }
        Scalar::String(value) => {
            if is_id_in_json(value) {
                g.put("(").put_expr(scalar)?.put(")");
            } else {
                put_json_set(g, ids, |g| {
                    g.put_quote(value);
                    Ok(())
                })?;
            }
        }
        Scalar::Null
        | Scalar::Sint(_)
        | Scalar::Uint(_)
        | Scalar::Double(_)
        | Scalar::Float(_)
        | Scalar::Bool(_) => return Ok(false),
    }
    Ok(true)
}

/// Emit a placeholder whose bound argument is a literal document.
///
/// Unbound indexes report `false`; the generic renderer then decides what
/// to make of them.
fn add_document_placeholder(
    g: &mut Generator<'_>,
    ids: &mut DocumentIdAggregator<'_>,
    index: u32,
) -> CrudResult<bool> {
    match g.args().get(index as usize) {
        Some(arg) => add_document_literal(g, ids, arg),
        None => Ok(false),
    }
}

fn add_document_object(
    g: &mut Generator<'_>,
    ids: &mut DocumentIdAggregator<'_>,
    object: &Object,
) -> CrudResult<()> {
    if object.has_key(ID_MEMBER) {
        g.put("(").put_expr(object)?.put(")");
        return Ok(());
    }
    put_json_set(g, ids, |g| {
        g.put_expr(object)?;
        Ok(())
    })
}

/// `(JSON_SET(<doc>, '$._id', '<fresh id>'))`
fn put_json_set<F>(g: &mut Generator<'_>, ids: &mut DocumentIdAggregator<'_>, doc: F) -> CrudResult<()>
where
    F: FnOnce(&mut Generator<'_>) -> CrudResult<()>,
{
    g.put("(JSON_SET(");
    doc(g)?;
    g.put(", '$._id', ").put_quote(ids.generate_id()).put("))");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ContentType;
    use crate::document_id::{DocumentIdGenerator, DocumentIdList, Variables};
    use pretty_assertions::assert_eq;

    struct Counter(u32);

    impl DocumentIdGenerator for Counter {
        fn generate(&mut self, _variables: &Variables) -> String {
            self.0 += 1;
            format!("00000000000000000000000{:05}", self.0)
        }
    }

    fn render(doc: Expr, args: &[Scalar]) -> (CrudResult<String>, DocumentIdList) {
        let mut counter = Counter(0);
        let mut list = DocumentIdList::new();
        let mut ids = DocumentIdAggregator::new(&mut counter, &mut list);
        let mut g = Generator::new(args);
        let result = add_document(&mut g, &mut ids, &[doc]).map(|_| g.into_sql());
        (result, list)
    }

    #[test]
    fn test_json_literal_with_id_is_verbatim() {
        let (sql, ids) = render(Expr::literal(Scalar::json(r#"{"_id": 7}"#)), &[]);
        assert_eq!(sql.unwrap(), r#"('{\"_id\": 7}')"#);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_json_literal_without_id_gets_one() {
        let (sql, ids) = render(Expr::literal(Scalar::json(r#"{"a": 1}"#)), &[]);
        assert_eq!(ids.len(), 1);
        assert_eq!(
            sql.unwrap(),
            format!(r#"(JSON_SET('{{\"a\": 1}}', '$._id', '{}'))"#, ids[0])
        );
    }

    #[test]
    fn test_string_literal() {
        let (sql, ids) = render(Expr::from(r#"{"_id": "x"}"#), &[]);
        assert_eq!(sql.unwrap(), r#"('{\"_id\": \"x\"}')"#);
        assert!(ids.is_empty());

        let (sql, ids) = render(Expr::from("{}"), &[]);
        assert_eq!(
            sql.unwrap(),
            "(JSON_SET('{}', '$._id', '0000000000000000000000000001'))"
        );
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_non_document_content_type_falls_through() {
        let (sql, ids) = render(
            Expr::literal(Scalar::octets("abc", ContentType::Geometry)),
            &[],
        );
        assert_eq!(sql.unwrap(), "(ST_GEOMETRYFROMWKB('abc'))");
        assert!(ids.is_empty());

        let (sql, _) = render(Expr::from(5), &[]);
        assert_eq!(sql.unwrap(), "(5)");
    }

    #[test]
    fn test_plain_and_xml_octets() {
        let (sql, ids) = render(
            Expr::literal(Scalar::octets(r#"{"a":1}"#, ContentType::Plain)),
            &[],
        );
        assert_eq!(
            sql.unwrap(),
            r#"(JSON_SET('{\"a\":1}', '$._id', '0000000000000000000000000001'))"#
        );
        assert_eq!(ids.len(), 1);

        let (sql, ids) = render(
            Expr::literal(Scalar::octets(r#"{"_id":1}"#, ContentType::Plain)),
            &[],
        );
        assert_eq!(sql.unwrap(), r#"('{\"_id\":1}')"#);
        assert!(ids.is_empty());

        let (sql, ids) = render(Expr::literal(Scalar::octets("<a/>", ContentType::Xml)), &[]);
        assert_eq!(sql.unwrap(), "('<a/>')");
        assert!(ids.is_empty());
    }

    #[test]
    fn test_truncated_json_with_leading_id_is_verbatim() {
        let (sql, ids) = render(Expr::literal(Scalar::json(r#"{"_id": 1"#)), &[]);
        assert_eq!(sql.unwrap(), r#"('{\"_id\": 1')"#);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_placeholder_resolves_to_literal() {
        let args = [Scalar::Sint(1), Scalar::json(r#"{"b": 2}"#)];
        let (sql, ids) = render(Expr::Placeholder(1), &args);
        assert_eq!(ids.len(), 1);
        assert_eq!(
            sql.unwrap(),
            format!(r#"(JSON_SET('{{\"b\": 2}}', '$._id', '{}'))"#, ids[0])
        );

        let (sql, ids) = render(Expr::Placeholder(0), &args);
        assert_eq!(sql.unwrap(), "(1)");
        assert!(ids.is_empty());
    }

    #[test]
    fn test_unbound_placeholder_falls_through_to_generic() {
        let (sql, ids) = render(Expr::Placeholder(3), &[]);
        assert!(matches!(sql, Err(CrudError::InvalidExpression(_))));
        assert!(ids.is_empty());
    }

    #[test]
    fn test_object() {
        let (sql, ids) = render(Expr::object([("_id", Expr::from("k")), ("a", Expr::from(1))]), &[]);
        assert_eq!(sql.unwrap(), "(JSON_OBJECT('_id','k','a',1))");
        assert!(ids.is_empty());

        let (sql, ids) = render(Expr::object([("a", Expr::from(1))]), &[]);
        assert_eq!(
            sql.unwrap(),
            format!("(JSON_SET(JSON_OBJECT('a',1), '$._id', '{}'))", ids[0])
        );
    }

    #[test]
    fn test_other_expressions_are_parenthesized() {
        let (sql, ids) = render(Expr::call("JSON_OBJECT", vec![]), &[]);
        assert_eq!(sql.unwrap(), "(JSON_OBJECT())");
        assert!(ids.is_empty());
    }

    #[test]
    fn test_row_width() {
        let mut counter = Counter(0);
        let mut list = DocumentIdList::new();
        let mut ids = DocumentIdAggregator::new(&mut counter, &mut list);
        let mut g = Generator::new(&[]);
        assert!(matches!(
            add_document(&mut g, &mut ids, &[]),
            Err(CrudError::BadInsertData(_))
        ));
        assert!(matches!(
            add_document(&mut g, &mut ids, &[Expr::from(1), Expr::from(2)]),
            Err(CrudError::BadInsertData(_))
        ));
    }
}
