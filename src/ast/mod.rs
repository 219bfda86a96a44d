//! Insert request model.
//!
//! Mirrors what the front end decodes off the wire: a target, a data model
//! tag, an optional projection, rows of expressions and the bound arguments
//! that placeholders point into.

pub mod expr;
pub mod request;

pub use expr::*;
pub use request::*;
