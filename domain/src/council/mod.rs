//! Council composition.
//!
//! - [`agent::Agent`]: one participant with a fixed identity and personality
//! - [`registry::AgentRegistry`]: the immutable panel plus its synthesizer

pub mod agent;
pub mod registry;
