pub mod api;
pub mod cli;
pub mod commands;
pub mod core;

pub use api::{ChainRunner, PromptError, PromptManager, RunArgs, Step, Variable, Variables};
pub use crate::core::config::ClientConfig;
