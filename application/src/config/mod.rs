//! Application-level configuration.
//!
//! - [`CouncilParams`]: rounds, timeouts and anonymization knobs

pub mod council_params;

pub use council_params::{CouncilParams, MessageVisibility};
