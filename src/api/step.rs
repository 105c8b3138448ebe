//! Step declarations and the variables they feed to a prompt run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::error::PromptError;
use super::settings::ModelSettings;

/// A single `{field, value}` input of a prompt run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub field: String,
    pub value: Value,
}

impl Variable {
    /// Creates a variable named `field`.
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Read-only view over the results of the steps that completed before the
/// step currently being resolved.
#[derive(Clone, Copy)]
pub struct ChainContext<'r> {
    results: &'r Map<String, Value>,
}

impl<'r> ChainContext<'r> {
    pub(crate) fn new(results: &'r Map<String, Value>) -> Self {
        Self { results }
    }

    /// The result of a previous step.
    pub fn get(&self, step_id: &str) -> Option<&'r Value> {
        self.results.get(step_id)
    }

    /// Resolves a dotted path such as `outline.response` or `items.0.text`.
    /// The first segment is a step id; the rest walk objects and arrays.
    pub fn lookup(&self, path: &str) -> Option<&'r Value> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Step ids visible to the resolver, in execution order.
    pub fn step_ids(&self) -> impl Iterator<Item = &'r str> {
        self.results.keys().map(String::as_str)
    }

    /// All visible results keyed by step id.
    pub fn results(&self) -> &'r Map<String, Value> {
        self.results
    }

    /// Number of completed steps.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether this is the first step of the chain.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

type Resolver =
    Arc<dyn Fn(&ChainContext<'_>) -> Result<Vec<Variable>, PromptError> + Send + Sync>;

/// The inputs of a step: fixed up front, or computed from earlier results.
#[derive(Clone)]
pub enum Variables {
    /// Sent as declared.
    Static(Vec<Variable>),
    /// Built from the results of earlier steps right before the step runs.
    Computed(Resolver),
}

impl Variables {
    /// Computed variables from a resolver producing typed pairs.
    pub fn computed<F>(resolver: F) -> Self
    where
        F: Fn(&ChainContext<'_>) -> Result<Vec<Variable>, PromptError> + Send + Sync + 'static,
    {
        Variables::Computed(Arc::new(resolver))
    }

    /// Computed variables from a resolver producing raw JSON. The JSON must be
    /// an array of `{field, value}` objects.
    pub fn computed_json<F>(resolver: F) -> Self
    where
        F: Fn(&ChainContext<'_>) -> Value + Send + Sync + 'static,
    {
        Variables::computed(move |ctx| {
            let raw = resolver(ctx);
            if !raw.is_array() {
                return Err(PromptError::Resolve(
                    "variables resolver must return an array".to_string(),
                ));
            }
            serde_json::from_value(raw).map_err(|e| {
                PromptError::Resolve(format!(
                    "variables resolver must return an array of {{field, value}} pairs: {}",
                    e
                ))
            })
        })
    }

    pub(crate) fn resolve(&self, ctx: &ChainContext<'_>) -> Result<Vec<Variable>, PromptError> {
        match self {
            Variables::Static(vars) => Ok(vars.clone()),
            Variables::Computed(resolver) => resolver(ctx),
        }
    }
}

impl Default for Variables {
    fn default() -> Self {
        Variables::Static(Vec::new())
    }
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variables::Static(vars) => f.debug_tuple("Static").field(vars).finish(),
            Variables::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Vec<Variable>> for Variables {
    fn from(vars: Vec<Variable>) -> Self {
        Variables::Static(vars)
    }
}

/// One named unit of work in a chain.
#[derive(Debug, Clone)]
pub struct Step {
    pub id: String,
    pub prompt_id: String,
    pub action: String,
    pub variables: Variables,
    pub project_id: Option<String>,
    pub file_ids: Option<Vec<String>>,
    pub model_settings: Option<ModelSettings>,
}

impl Step {
    /// Declares step `id` running `prompt_id` with operation variant `action`.
    pub fn new(
        id: impl Into<String>,
        prompt_id: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt_id: prompt_id.into(),
            action: action.into(),
            variables: Variables::default(),
            project_id: None,
            file_ids: None,
            model_settings: None,
        }
    }

    /// Uses a fixed list of variables.
    pub fn vars(mut self, vars: impl IntoIterator<Item = Variable>) -> Self {
        self.variables = Variables::Static(vars.into_iter().collect());
        self
    }

    /// Computes the variables from earlier results just before the step runs.
    pub fn vars_from<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ChainContext<'_>) -> Result<Vec<Variable>, PromptError> + Send + Sync + 'static,
    {
        self.variables = Variables::computed(resolver);
        self
    }

    /// Sets the variables, static or computed.
    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    /// Runs the step against another project than the client default.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// File IDs forwarded to the run.
    pub fn file_ids(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.file_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Model settings for this step only.
    pub fn model_settings(mut self, settings: ModelSettings) -> Self {
        self.model_settings = Some(settings);
        self
    }
}
