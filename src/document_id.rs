//! Document id aggregator.
//!
//! Wraps the server's document id generator for the duration of one insert
//! statement build and records every id it hands out, so the caller can
//! report them once the statement has run.

use tracing::{debug, error, trace};

use crate::error::{CrudError, CrudResult};
use crate::session::{SqlDataResult, SqlSession};

/// Query for the server variables that drive id generation.
pub const VARIABLES_QUERY: &str = "SELECT @@mysqlx_document_id_unique_prefix,\
                                   @@auto_increment_offset,@@auto_increment_increment";

/// Inputs of the document id generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Variables {
    /// Per-server prefix keeping ids unique across a replication topology.
    pub prefix: u16,
    pub offset: u16,
    pub increment: u16,
}

/// Produces document ids. Implementations keep their own evolving state.
pub trait DocumentIdGenerator {
    fn generate(&mut self, variables: &Variables) -> String;
}

/// Ids generated while building one statement, in generation order.
pub type DocumentIdList = Vec<String>;

/// Session-scoped adapter between the builder and the id generator.
///
/// Construct, then [`configure`](Self::configure) before the first
/// [`generate_id`](Self::generate_id); until then ids are generated with
/// zeroed variables.
pub struct DocumentIdAggregator<'a> {
    generator: &'a mut dyn DocumentIdGenerator,
    variables: Variables,
    ids: &'a mut DocumentIdList,
}

impl<'a> DocumentIdAggregator<'a> {
    pub fn new(generator: &'a mut dyn DocumentIdGenerator, ids: &'a mut DocumentIdList) -> Self {
        Self {
            generator,
            variables: Variables::default(),
            ids,
        }
    }

    /// Fetch the generator variables from the server.
    pub fn configure(&mut self, session: &mut dyn SqlSession) -> CrudResult<()> {
        let mut result = SqlDataResult::new(session);
        self.variables = match fetch_variables(&mut result) {
            Ok(variables) => variables,
            Err(e @ CrudError::Internal(_)) => {
                error!(
                    "Failed to get system variables 'mysqlx_document_id_unique_prefix', \
                     'auto_increment_offset', 'auto_increment_increment'"
                );
                return Err(e);
            }
            Err(e) => {
                debug!("Unable to get document id variables; exception message: '{}'", e);
                return Err(e);
            }
        };
        debug!(variables = ?self.variables, "document id generator configured");
        Ok(())
    }

    /// Generate a new id and record it. Returns the id just recorded.
    pub fn generate_id(&mut self) -> &str {
        let id = self.generator.generate(&self.variables);
        trace!(%id, "generated document id");
        self.ids.push(id);
        self.ids.last().map(String::as_str).unwrap_or_default()
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Ids recorded so far.
    pub fn ids(&self) -> &[String] {
        self.ids.as_slice()
    }
}

fn fetch_variables(result: &mut SqlDataResult<'_>) -> CrudResult<Variables> {
    result.query(VARIABLES_QUERY)?;
    if result.size() != 1 {
        return Err(CrudError::Internal("Error executing statement".into()));
    }
    Ok(Variables {
        prefix: result.get()?,
        offset: result.get()?,
        increment: result.get()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FieldValue, ResultSet};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Variables>,
    }

    impl DocumentIdGenerator for Recorder {
        fn generate(&mut self, variables: &Variables) -> String {
            self.calls.push(*variables);
            format!("id{}", self.calls.len())
        }
    }

    struct Canned(Result<ResultSet, String>);

    impl SqlSession for Canned {
        fn query(&mut self, sql: &str) -> CrudResult<ResultSet> {
            assert_eq!(sql, VARIABLES_QUERY);
            self.0.clone().map_err(CrudError::Session)
        }
    }

    fn row(prefix: u64, offset: u64, increment: u64) -> Vec<FieldValue> {
        vec![
            FieldValue::UInt(prefix),
            FieldValue::UInt(offset),
            FieldValue::UInt(increment),
        ]
    }

    #[test]
    fn test_configure_and_generate() {
        let mut id_gen = Recorder::default();
        let mut ids = DocumentIdList::new();
        {
            let mut agg = DocumentIdAggregator::new(&mut id_gen, &mut ids);
            let mut session = Canned(Ok(ResultSet {
                rows: vec![row(5, 2, 3)],
            }));
            agg.configure(&mut session).unwrap();
            assert_eq!(agg.generate_id(), "id1");
            assert_eq!(agg.generate_id(), "id2");
        }
        assert_eq!(ids, vec!["id1".to_string(), "id2".to_string()]);
        assert_eq!(
            id_gen.calls[0],
            Variables {
                prefix: 5,
                offset: 2,
                increment: 3
            }
        );
    }

    #[test]
    fn test_configure_without_rows() {
        let mut id_gen = Recorder::default();
        let mut ids = DocumentIdList::new();
        let mut agg = DocumentIdAggregator::new(&mut id_gen, &mut ids);
        let mut session = Canned(Ok(ResultSet::default()));
        let err = agg.configure(&mut session).unwrap_err();
        assert!(matches!(err, CrudError::Internal(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_configure_with_two_rows() {
        let mut id_gen = Recorder::default();
        let mut ids = DocumentIdList::new();
        let mut agg = DocumentIdAggregator::new(&mut id_gen, &mut ids);
        let mut session = Canned(Ok(ResultSet {
            rows: vec![row(1, 1, 1), row(2, 2, 2)],
        }));
        assert!(matches!(
            agg.configure(&mut session),
            Err(CrudError::Internal(_))
        ));
    }

    #[test]
    fn test_configure_propagates_session_error() {
        let mut id_gen = Recorder::default();
        let mut ids = DocumentIdList::new();
        let mut agg = DocumentIdAggregator::new(&mut id_gen, &mut ids);
        let mut session = Canned(Err("server has gone away".into()));
        let err = agg.configure(&mut session).unwrap_err();
        assert_eq!(err.to_string(), "Session error: server has gone away");
        assert_eq!(agg.variables(), &Variables::default());
    }
}
