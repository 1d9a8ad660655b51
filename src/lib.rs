// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds the CLI, logging and terminal setup.
pub mod app;
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod deferred;
pub mod error;
pub mod input;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod verdict;

pub use error::{Error, Result};
