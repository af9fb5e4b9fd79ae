//! Interactive chat module
//!
//! Provides a line-editor based chat interface where every question is a
//! council turn.

mod repl;

pub use repl::ChatRepl;
