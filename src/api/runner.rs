//! Fluent builder and sequential executor for multi-step prompt chains.

use serde_json::{Map, Value};

use super::client::{PromptManager, RunArgs};
use super::error::PromptError;
use super::step::{ChainContext, Step};

/// Results of a chain run keyed by step id, in execution order.
pub type ChainResults = Map<String, Value>;

/// A fluent builder to define and execute a multi-step prompt chain.
///
/// Steps run strictly one after another in declaration order. A step whose
/// variables are computed sees the results of every earlier step and nothing
/// else. The first failure aborts the chain; no partial results are returned.
pub struct ChainRunner<'a> {
    client: &'a PromptManager,
    steps: Vec<Step>,
}

impl<'a> ChainRunner<'a> {
    /// Creates a new `ChainRunner`.
    pub(crate) fn new(client: &'a PromptManager) -> Self {
        Self {
            client,
            steps: Vec::new(),
        }
    }

    /// Appends a step. Fails if the id is blank or already declared.
    ///
    /// The builder is consumed: on error it is dropped along with every step
    /// declared so far, so a rejected id means starting a new chain.
    pub fn add_step(mut self, step: Step) -> Result<Self, PromptError> {
        if step.id.trim().is_empty() {
            return Err(PromptError::config("Step is missing an id"));
        }
        if self.steps.iter().any(|s| s.id == step.id) {
            return Err(PromptError::config(format!(
                "Duplicate step id '{}'",
                step.id
            )));
        }
        self.steps.push(step);
        Ok(self)
    }

    /// Number of declared steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step has been declared yet.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Declared step ids, in execution order.
    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.id.as_str())
    }

    /// Executes the declared steps. Each call starts from empty results.
    pub async fn execute(&self) -> Result<ChainResults, PromptError> {
        let mut results = ChainResults::new();

        for (index, step) in self.steps.iter().enumerate() {
            tracing::info!(step = %step.id, index, total = self.steps.len(), "Running chain step");

            let output = self
                .run_step(step, &results)
                .await
                .map_err(|cause| {
                    tracing::error!(step = %step.id, error = %cause, "Chain step failed");
                    PromptError::chain_step(&step.id, cause)
                })?;

            results.insert(step.id.clone(), output);
        }

        tracing::debug!(steps = results.len(), "Chain complete");
        Ok(results)
    }

    async fn run_step(&self, step: &Step, results: &ChainResults) -> Result<Value, PromptError> {
        let variables = step.variables.resolve(&ChainContext::new(results))?;

        let args = RunArgs {
            project_id: step.project_id.clone(),
            prompt_id: step.prompt_id.clone(),
            action: step.action.clone(),
            file_ids: step.file_ids.clone(),
            variables,
            model_settings: step.model_settings.clone(),
        };
        self.client.run(args).await
    }
}
