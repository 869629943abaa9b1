//! Command implementations for the mdqr CLI.
//!
//! Each command provides an `execute` function that takes the parsed
//! command arguments and returns a Result.

pub mod render;
pub mod serve;

pub use render::execute as render_execute;
pub use serve::execute as serve_execute;
