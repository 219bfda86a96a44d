//! # xcrud
//!
//! Insert statement construction for a dual-mode MySQL front end, where the
//! same server stores both relational tables and JSON document collections.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use xcrud::prelude::*;
//!
//! let request = InsertRequest::documents(Collection::new("shop", "books"))
//!     .document(Scalar::json(r#"{"title": "Dune"}"#));
//!
//! let stmt = xcrud::crud::insert(&mut session, &mut id_generator, &request, &BuilderOptions::default())?;
//! // => INSERT INTO `shop`.`books` (doc) VALUES (JSON_SET('{\"title\": \"Dune\"}', '$._id', '...'))
//! ```
//!
//! ## Modes
//!
//! | Data model | Projection        | Row shape      | Upsert |
//! |------------|-------------------|----------------|--------|
//! | `TABLE`    | optional columns  | one per column | no     |
//! | `DOCUMENT` | none (`doc`)      | one document   | yes    |

pub mod ast;
pub mod config;
pub mod crud;
pub mod document_id;
pub mod engine;
pub mod error;
pub mod generator;
pub mod insert;
pub mod json;
pub mod session;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::{BuilderOptions, Config};
    pub use crate::crud::{InsertStatement, insert};
    pub use crate::document_id::{
        DocumentIdAggregator, DocumentIdGenerator, DocumentIdList, Variables,
    };
    pub use crate::engine::{Database, DatabaseSession};
    pub use crate::error::*;
    pub use crate::generator::{Generator, ToSqlExpr};
    pub use crate::insert::InsertStatementBuilder;
    pub use crate::session::{FieldValue, FixedSession, ResultSet, SqlDataResult, SqlSession};
}

/// Decode an insert request from JSON.
///
/// # Example
///
/// ```
/// let req = xcrud::parse(r#"{"collection": {"name": "books"}, "rows": []}"#).unwrap();
/// assert_eq!(req.collection.name, "books");
/// ```
pub fn parse(input: &str) -> Result<ast::InsertRequest, error::CrudError> {
    ast::InsertRequest::from_json(input)
}
