//! Prompt domain
//!
//! Templates for generating prompts at each stage of a council turn.

mod template;

pub use template::CouncilPromptTemplate;
