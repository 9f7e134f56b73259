//! HTTP route handlers.

pub mod instruments;
pub mod scan;
