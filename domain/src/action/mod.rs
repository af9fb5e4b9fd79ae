//! Actions council members may take during collaboration.
//!
//! Models receive [`spec::ActionSpec`]s (exposed as function-calling tools)
//! and answer with [`spec::ActionInvocation`]s. Invocations are decoded into
//! the strongly typed [`request::ActionRequest`] before anything acts on them.

pub mod request;
pub mod spec;
