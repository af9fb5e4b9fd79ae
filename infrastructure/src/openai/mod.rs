//! OpenAI-compatible chat completions adapter
//!
//! Implements [`ModelGateway`](council_application::ModelGateway) over HTTP
//! for any endpoint speaking the chat completions format (LM Studio,
//! llama.cpp server, OpenRouter, ...).

pub mod gateway;
pub mod protocol;
