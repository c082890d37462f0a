//! Actix middleware shared across the HTTP surface.

pub mod request_log;

pub use request_log::RequestLog;
