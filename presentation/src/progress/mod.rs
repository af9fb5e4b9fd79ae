//! Progress reporting module

pub mod reporter;
