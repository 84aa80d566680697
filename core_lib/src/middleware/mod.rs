//! Middleware components for the HTTP server

pub mod body_limit;
pub mod logging;
