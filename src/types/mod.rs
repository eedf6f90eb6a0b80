//! Shared data types: discovery wire format and HTTP configuration.

pub mod discovery;
pub mod http;

pub use discovery::*;
pub use http::*;
