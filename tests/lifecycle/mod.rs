//! Lifecycle integration test modules

pub mod fetch;
pub mod properties;
pub mod scan;
