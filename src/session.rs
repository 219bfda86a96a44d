//! Session query interface.
//!
//! The builder only ever needs to run a single `SELECT` of a few server
//! variables, so the contract is a synchronous query returning a fully
//! buffered result.

use crate::error::{CrudError, CrudResult};

/// A single column value of a buffered result row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Int(i64),
    UInt(u64),
    Double(f64),
    Text(String),
}

/// A buffered query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub rows: Vec<Vec<FieldValue>>,
}

/// Anything able to run a query on the current session.
pub trait SqlSession {
    /// Execute `sql` and buffer its rows.
    fn query(&mut self, sql: &str) -> CrudResult<ResultSet>;
}

/// A session answering every query with the same result.
///
/// Stands in for a server when building statements offline.
#[derive(Debug, Clone, Default)]
pub struct FixedSession {
    pub result: ResultSet,
}

impl FixedSession {
    pub fn new(rows: Vec<Vec<FieldValue>>) -> Self {
        Self {
            result: ResultSet { rows },
        }
    }
}

impl SqlSession for FixedSession {
    fn query(&mut self, _sql: &str) -> CrudResult<ResultSet> {
        Ok(self.result.clone())
    }
}

/// Conversion out of a result column.
pub trait FromField: Sized {
    fn from_field(value: &FieldValue) -> CrudResult<Self>;
}

fn mismatch(value: &FieldValue, target: &str) -> CrudError {
    CrudError::Session(format!("Cannot convert {:?} to {}", value, target))
}

macro_rules! impl_from_field_int {
    ($($t:ty),*) => {$(
        impl FromField for $t {
            fn from_field(value: &FieldValue) -> CrudResult<Self> {
                let converted = match value {
                    FieldValue::Int(n) => <$t>::try_from(*n).ok(),
                    FieldValue::UInt(n) => <$t>::try_from(*n).ok(),
                    FieldValue::Text(s) => s.trim().parse::<$t>().ok(),
                    _ => None,
                };
                converted.ok_or_else(|| mismatch(value, stringify!($t)))
            }
        }
    )*};
}

impl_from_field_int!(u16, u32, u64, i64);

impl FromField for String {
    fn from_field(value: &FieldValue) -> CrudResult<Self> {
        match value {
            FieldValue::Text(s) => Ok(s.clone()),
            FieldValue::Int(n) => Ok(n.to_string()),
            FieldValue::UInt(n) => Ok(n.to_string()),
            FieldValue::Double(n) => Ok(n.to_string()),
            FieldValue::Null => Err(mismatch(value, "String")),
        }
    }
}

impl<T: FromField> FromField for Option<T> {
    fn from_field(value: &FieldValue) -> CrudResult<Self> {
        match value {
            FieldValue::Null => Ok(None),
            v => T::from_field(v).map(Some),
        }
    }
}

/// Cursor over the result of one query run through a session.
///
/// `get` reads the current row column by column and moves to the next row
/// once the current one is exhausted.
pub struct SqlDataResult<'s> {
    session: &'s mut dyn SqlSession,
    result: ResultSet,
    row: usize,
    column: usize,
}

impl<'s> SqlDataResult<'s> {
    pub fn new(session: &'s mut dyn SqlSession) -> Self {
        Self {
            session,
            result: ResultSet::default(),
            row: 0,
            column: 0,
        }
    }

    /// Run `sql` and reset the cursor to its first row.
    pub fn query(&mut self, sql: &str) -> CrudResult<&mut Self> {
        self.result = self.session.query(sql)?;
        self.row = 0;
        self.column = 0;
        Ok(self)
    }

    /// Number of buffered rows.
    pub fn size(&self) -> usize {
        self.result.rows.len()
    }

    /// Read the next column of the current row.
    pub fn get<T: FromField>(&mut self) -> CrudResult<T> {
        if self
            .result
            .rows
            .get(self.row)
            .is_some_and(|row| self.column >= row.len())
        {
            self.row += 1;
            self.column = 0;
        }
        let value = self
            .result
            .rows
            .get(self.row)
            .and_then(|row| row.get(self.column))
            .ok_or_else(|| CrudError::Session("Read past the end of the result".into()))?;
        self.column += 1;
        T::from_field(value)
    }
}
