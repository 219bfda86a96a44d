use serde::{Deserialize, Serialize};

use super::{Expr, Scalar};
use crate::error::CrudResult;

/// How the target of an insert stores its rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataModel {
    /// Rows are single JSON values in the `doc` column.
    #[default]
    Document,
    /// Rows are ordinary column tuples.
    Table,
}

impl std::fmt::Display for DataModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataModel::Document => write!(f, "DOCUMENT"),
            DataModel::Table => write!(f, "TABLE"),
        }
    }
}

/// Target table or collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
}

impl Collection {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema.into()),
        }
    }
}

/// One entry of a table-mode projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column {
            name: name.to_string(),
        }
    }
}

/// One row of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub fields: Vec<Expr>,
}

impl<E: Into<Expr>> FromIterator<E> for Row {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Row {
            fields: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A request to insert rows into a table or a document collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertRequest {
    pub collection: Collection,
    #[serde(default)]
    pub data_model: DataModel,
    #[serde(default)]
    pub projection: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Values referenced by placeholders.
    #[serde(default)]
    pub args: Vec<Scalar>,
    #[serde(default)]
    pub upsert: bool,
}

impl InsertRequest {
    /// Start a document-mode request.
    pub fn documents(collection: Collection) -> Self {
        Self {
            collection,
            data_model: DataModel::Document,
            ..Default::default()
        }
    }

    /// Start a table-mode request.
    pub fn table(collection: Collection) -> Self {
        Self {
            collection,
            data_model: DataModel::Table,
            ..Default::default()
        }
    }

    /// Decode a request from its JSON form.
    pub fn from_json(input: &str) -> CrudResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn is_table_data_model(&self) -> bool {
        self.data_model == DataModel::Table
    }

    pub fn projection<C: Into<Column>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.projection = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Append a single-field row (the usual document shape).
    pub fn document(self, doc: impl Into<Expr>) -> Self {
        self.row(Row {
            fields: vec![doc.into()],
        })
    }

    pub fn args(mut self, args: Vec<Scalar>) -> Self {
        self.args = args;
        self
    }

    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_json_defaults() {
        let req = InsertRequest::from_json(
            r#"{
                "collection": {"name": "books", "schema": "shop"},
                "rows": [[{"literal": {"octets": {"value": "{\"a\":1}", "content_type": "json"}}}]]
            }"#,
        )
        .unwrap();
        assert_eq!(req.data_model, DataModel::Document);
        assert!(!req.upsert);
        assert!(req.projection.is_empty());
        assert_eq!(req.rows.len(), 1);
        assert_eq!(req.rows[0].fields, vec![Expr::literal(Scalar::json("{\"a\":1}"))]);
    }

    #[test]
    fn test_request_from_bad_json() {
        let err = InsertRequest::from_json("{\"rows\": 3}").unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_table_request_builder() {
        let req = InsertRequest::table(Collection::new("shop", "items"))
            .projection(["id", "name"])
            .row([Expr::from(1), Expr::from("pen")].into_iter().collect());
        assert!(req.is_table_data_model());
        assert_eq!(req.projection.len(), 2);
        assert_eq!(req.rows[0].fields.len(), 2);
    }
}
