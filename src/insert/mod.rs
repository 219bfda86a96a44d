//! Insert statement builder.
//!
//! Turns an [`InsertRequest`] into a single MySQL `INSERT` statement, for
//! either a relational table or a document collection.
//!
//! ```text
//! INSERT INTO `shop`.`items` (`id`,`name`) VALUES (1,'pen'),(2,'ink')
//! INSERT INTO `shop`.`books` (doc) VALUES (JSON_SET('{...}', '$._id', '...'))
//! ```

mod document;

use tracing::debug;

use crate::ast::{Collection, Column, InsertRequest, Row};
use crate::config::BuilderOptions;
use crate::document_id::DocumentIdAggregator;
use crate::error::{CrudError, CrudResult};
use crate::generator::Generator;

/// Builds one insert statement into a [`Generator`].
///
/// On error the generator holds a partial statement that must not be
/// executed.
pub struct InsertStatementBuilder<'b, 'a, 'i> {
    generator: &'b mut Generator<'a>,
    ids: &'b mut DocumentIdAggregator<'i>,
    options: BuilderOptions,
}

impl<'b, 'a, 'i> InsertStatementBuilder<'b, 'a, 'i> {
    pub fn new(generator: &'b mut Generator<'a>, ids: &'b mut DocumentIdAggregator<'i>) -> Self {
        Self {
            generator,
            ids,
            options: BuilderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuilderOptions) -> Self {
        self.options = options;
        self
    }

    /// Emit the whole statement for `request`.
    pub fn build(&mut self, request: &InsertRequest) -> CrudResult<()> {
        debug!(
            collection = %request.collection.name,
            data_model = %request.data_model,
            rows = request.rows.len(),
            upsert = request.upsert,
            "building insert statement"
        );
        let is_relational = request.is_table_data_model();
        self.generator.put("INSERT INTO ");
        self.add_collection(&request.collection)?;
        self.add_projection(&request.projection, is_relational)?;
        if is_relational {
            self.add_values(&request.rows, request.projection.len())?;
        } else {
            self.add_documents(&request.rows)?;
        }
        if request.upsert {
            self.add_upsert(is_relational)?;
        }
        Ok(())
    }

    fn add_collection(&mut self, collection: &Collection) -> CrudResult<()> {
        if collection.name.is_empty() {
            return Err(CrudError::BadTable(
                "Invalid name of table/collection".into(),
            ));
        }
        if let Some(schema) = collection.schema.as_deref().filter(|s| !s.is_empty()) {
            self.generator.put_identifier(schema).put(".");
        }
        self.generator.put_identifier(&collection.name);
        Ok(())
    }

    /// Column list of a table insert, or the implicit `doc` column of a
    /// collection insert.
    pub fn add_projection(&mut self, projection: &[Column], is_relational: bool) -> CrudResult<()> {
        if is_relational {
            if !projection.is_empty() {
                self.generator
                    .put(" (")
                    .put_list(projection, |g, column| {
                        g.put_identifier(&column.name);
                        Ok(())
                    })?
                    .put(")");
            }
            return Ok(());
        }
        if !projection.is_empty() {
            return Err(CrudError::BadProjection(
                "Invalid projection for document operation".into(),
            ));
        }
        self.generator.put(" (doc)");
        Ok(())
    }

    /// Rows of a table insert. A zero `projection_size` skips the width
    /// check; the server matches the rows against the table's columns.
    pub fn add_values(&mut self, rows: &[Row], projection_size: usize) -> CrudResult<()> {
        if rows.is_empty() {
            return Err(CrudError::missing_rows());
        }
        self.generator
            .put(" VALUES ")
            .put_list(rows, |g, row| add_row(g, row, projection_size))?;
        Ok(())
    }

    /// Rows of a collection insert, one document each.
    pub fn add_documents(&mut self, rows: &[Row]) -> CrudResult<()> {
        if rows.is_empty() {
            return Err(CrudError::missing_rows());
        }
        let ids = &mut *self.ids;
        self.generator
            .put(" VALUES ")
            .put_list(rows, |g, row| document::add_document(g, ids, &row.fields))?;
        Ok(())
    }

    /// Conflict clause. A duplicate key only replaces the stored document
    /// when both carry the same `_id`; anything else fails on the server.
    pub fn add_upsert(&mut self, is_relational: bool) -> CrudResult<()> {
        if is_relational {
            return Err(CrudError::BadInsertData(
                "Unable update on duplicate key for TABLE data model".into(),
            ));
        }
        self.generator
            .put(
                " ON DUPLICATE KEY UPDATE \
                 doc = IF(JSON_UNQUOTE(JSON_EXTRACT(doc, '$._id')) \
                 = JSON_UNQUOTE(JSON_EXTRACT(VALUES(doc), '$._id')), \
                 VALUES(doc), MYSQLX_ERROR(",
            )
            .put(&self.options.upsert_error_code.to_string())
            .put("))");
        Ok(())
    }
}

fn add_row(g: &mut Generator<'_>, row: &Row, projection_size: usize) -> CrudResult<()> {
    let fields = &row.fields;
    if fields.is_empty() || (projection_size != 0 && fields.len() != projection_size) {
        return Err(CrudError::wrong_field_count());
    }
    g.put("(")
        .put_list(fields, |g, field| {
            g.put_expr(field)?;
            Ok(())
        })?
        .put(")");
    Ok(())
}
