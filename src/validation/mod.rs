//! Schema Validator Factory
//!
//! Turns a method's parameter declarations into a reusable validator and,
//! optionally, request/response checks against the document's schemas.

pub mod coerce;
mod params;
mod schema;

pub use coerce::ParamKind;
pub use params::ParameterValidator;
pub use schema::{SchemaCheck, SchemaRegistry};
