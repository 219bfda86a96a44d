//! Insert command handling.
//!
//! Glues the pieces together the way the front end runs an insert: a fresh
//! id list per statement, an aggregator configured from the session, then
//! the builder.

use serde::Serialize;
use tracing::info;

use crate::ast::InsertRequest;
use crate::config::BuilderOptions;
use crate::document_id::{DocumentIdAggregator, DocumentIdGenerator, DocumentIdList};
use crate::error::CrudResult;
use crate::generator::Generator;
use crate::insert::InsertStatementBuilder;
use crate::session::SqlSession;

/// A finished insert statement and the document ids generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertStatement {
    pub sql: String,
    pub document_ids: DocumentIdList,
}

/// Build the statement for `request`.
///
/// Document inserts first read the id generator variables through
/// `session`; table inserts never touch it.
pub fn insert(
    session: &mut dyn SqlSession,
    id_generator: &mut dyn DocumentIdGenerator,
    request: &InsertRequest,
    options: &BuilderOptions,
) -> CrudResult<InsertStatement> {
    let mut document_ids = DocumentIdList::new();
    let sql = {
        let mut ids = DocumentIdAggregator::new(id_generator, &mut document_ids);
        if !request.is_table_data_model() {
            ids.configure(session)?;
        }
        let mut generator = Generator::new(&request.args);
        InsertStatementBuilder::new(&mut generator, &mut ids)
            .with_options(options.clone())
            .build(request)?;
        generator.into_sql()
    };
    info!(
        collection = %request.collection.name,
        generated_ids = document_ids.len(),
        "insert statement built"
    );
    Ok(InsertStatement { sql, document_ids })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Collection, Expr, Scalar};
    use crate::document_id::Variables;
    use crate::error::CrudError;
    use crate::session::{FieldValue, FixedSession, ResultSet};
    use pretty_assertions::assert_eq;

    struct Echo;

    impl DocumentIdGenerator for Echo {
        fn generate(&mut self, v: &Variables) -> String {
            format!("{:04x}-{}-{}", v.prefix, v.offset, v.increment)
        }
    }

    struct Unreachable;

    impl SqlSession for Unreachable {
        fn query(&mut self, sql: &str) -> CrudResult<ResultSet> {
            panic!("unexpected query: {}", sql)
        }
    }

    #[test]
    fn test_document_insert_uses_server_variables() {
        let mut session = FixedSession::new(vec![vec![
            FieldValue::UInt(10),
            FieldValue::UInt(1),
            FieldValue::UInt(2),
        ]]);
        let request = InsertRequest::documents(Collection::new("s", "c"))
            .document(Scalar::json("{}"));
        let stmt = insert(&mut session, &mut Echo, &request, &BuilderOptions::default()).unwrap();
        assert_eq!(stmt.document_ids, vec!["000a-1-2".to_string()]);
        assert_eq!(
            stmt.sql,
            "INSERT INTO `s`.`c` (doc) VALUES (JSON_SET('{}', '$._id', '000a-1-2'))"
        );
    }

    #[test]
    fn test_table_insert_skips_configuration() {
        let request = InsertRequest::table(Collection::new("s", "t"))
            .row([Expr::from(1)].into_iter().collect());
        let stmt = insert(&mut Unreachable, &mut Echo, &request, &BuilderOptions::default()).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO `s`.`t` VALUES (1)");
        assert!(stmt.document_ids.is_empty());
    }

    #[test]
    fn test_configuration_failure_stops_the_build() {
        let request = InsertRequest::documents(Collection::new("s", "c"))
            .document(Scalar::json("{}"));
        let err = insert(
            &mut FixedSession::default(),
            &mut Echo,
            &request,
            &BuilderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CrudError::Internal(_)));
    }
}
