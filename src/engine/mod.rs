//! Process plumbing behind every dialog: the non-blocking executor, the
//! helper-program probe cache, and the backend selection layer.

pub mod backend;
pub mod executor;
pub mod probe;

pub use executor::{CommandOutput, Executor};
