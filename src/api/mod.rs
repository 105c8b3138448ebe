//! High-level fluent API for running prompts and chains against the service.

mod client;
mod error;
mod runner;
mod settings;
mod step;
pub(crate) mod transport;

pub use client::{FileRef, GetPromptArgs, PromptManager, RunArgs, VectorizeArgs};
pub use error::{PromptError, TransportError};
pub use runner::{ChainResults, ChainRunner};
pub use settings::ModelSettings;
pub use step::{ChainContext, Step, Variable, Variables};
pub use transport::{ApiRequest, HttpTransport, Transport};
