//! SQL text generator.
//!
//! The only place that turns request content into SQL text. Identifiers and
//! string literals always pass through the quoting primitives here; callers
//! never splice request data into the buffer themselves.

mod expr;

pub use expr::ToSqlExpr;

use crate::ast::Scalar;
use crate::error::CrudResult;

/// Accumulates the text of one MySQL statement.
#[derive(Debug)]
pub struct Generator<'a> {
    sql: String,
    args: &'a [Scalar],
}

impl<'a> Generator<'a> {
    /// Create a generator resolving placeholders against `args`.
    pub fn new(args: &'a [Scalar]) -> Self {
        Self {
            sql: String::new(),
            args,
        }
    }

    /// Bound arguments placeholders refer to.
    pub fn args(&self) -> &'a [Scalar] {
        self.args
    }

    /// Append raw SQL text.
    pub fn put(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    /// Append a backtick-quoted identifier.
    pub fn put_identifier(&mut self, name: &str) -> &mut Self {
        self.sql.push('`');
        for c in name.chars() {
            if c == '`' {
                self.sql.push('`');
            }
            self.sql.push(c);
        }
        self.sql.push('`');
        self
    }

    /// Append a single-quoted, escaped string literal.
    pub fn put_quote(&mut self, value: &str) -> &mut Self {
        self.sql.push('\'');
        for c in value.chars() {
            match c {
                '\0' => self.sql.push_str("\\0"),
                '\n' => self.sql.push_str("\\n"),
                '\r' => self.sql.push_str("\\r"),
                '\\' => self.sql.push_str("\\\\"),
                '\'' => self.sql.push_str("\\'"),
                '"' => self.sql.push_str("\\\""),
                '\x1a' => self.sql.push_str("\\Z"),
                c => self.sql.push(c),
            }
        }
        self.sql.push('\'');
        self
    }

    /// Append an expression rendered by the generic expression grammar.
    pub fn put_expr<E: ToSqlExpr + ?Sized>(&mut self, expr: &E) -> CrudResult<&mut Self> {
        expr.to_sql_expr(self)?;
        Ok(self)
    }

    /// Append `render(item)` for each item, separated by commas.
    pub fn put_list<T, F>(&mut self, items: &[T], mut render: F) -> CrudResult<&mut Self>
    where
        F: FnMut(&mut Self, &T) -> CrudResult<()>,
    {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push(',');
            }
            render(self, item)?;
        }
        Ok(self)
    }

    /// Text emitted so far.
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}
