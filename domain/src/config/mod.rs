//! Presentation-facing settings shared by config files and the CLI.

pub mod output_format;
