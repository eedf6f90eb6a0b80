//! Utility modules for dynapi

pub mod cancel;
pub mod http_interceptor;
pub(crate) mod single_flight;

pub use cancel::{CancelHandle, new_cancel_handle};
pub use http_interceptor::{HttpInterceptor, HttpRequestContext, LoggingInterceptor};
