use crate::api::{ChainRunner, ModelSettings, PromptError, PromptManager, Step, Variable, Variables};
use crate::commands::print_json;
use crate::core::template::{references, render};
use crate::core::utils::parse_pairs;
use console::style;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Deserialize, Debug)]
struct ChainFile {
    #[serde(default)]
    vars: HashMap<String, Value>,
    steps: Vec<StepDef>,
}

#[derive(Deserialize, Debug)]
struct StepDef {
    id: String,
    prompt: String,
    action: String,
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    file_ids: Option<Vec<String>>,
    #[serde(default)]
    model_settings: Option<ModelSettings>,
    /// Field name to value template, in the order written.
    #[serde(default)]
    variables: Map<String, Value>,
}

/// Run a chain described by a YAML file.
pub async fn run(client: &PromptManager, file: &Path, vars_override: &[String]) -> Result<(), String> {
    let yaml = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read chain file {}: {}", file.display(), e))?;
    let runner = build_chain(client, &yaml, vars_override)?;

    println!(
        "Executing chain '{}' ({} steps)...",
        style(file.display()).yellow(),
        runner.len()
    );
    match runner.execute().await {
        Ok(results) => {
            println!("{}", style("✔ Chain execution complete.").green());
            print_json(&Value::Object(results))
        }
        Err(e) => Err(format!("Chain execution failed: {}", e)),
    }
}

/// Parses a chain definition and declares its steps on a new runner.
pub(crate) fn build_chain<'a>(
    client: &'a PromptManager,
    yaml: &str,
    vars_override: &[String],
) -> Result<ChainRunner<'a>, String> {
    let mut chain_def: ChainFile =
        serde_yaml::from_str(yaml).map_err(|e| format!("Failed to parse chain file: {}", e))?;

    for (key, value) in parse_pairs(vars_override)? {
        chain_def.vars.insert(key, Value::String(value));
    }
    let vars = Arc::new(chain_def.vars);

    let mut runner = client.chain();
    for def in chain_def.steps {
        let variables = step_variables(def.variables, Arc::clone(&vars))?;
        let mut step = Step::new(def.id, def.prompt, def.action).variables(variables);
        if let Some(project) = def.project {
            step = step.project_id(project);
        }
        if let Some(file_ids) = def.file_ids {
            step = step.file_ids(file_ids);
        }
        if let Some(settings) = def.model_settings {
            step = step.model_settings(settings);
        }
        runner = runner.add_step(step).map_err(|e| e.to_string())?;
    }
    Ok(runner)
}

/// Static variables when every template only uses chain vars, otherwise a
/// resolver that renders against earlier step results at run time.
fn step_variables(
    templates: Map<String, Value>,
    vars: Arc<HashMap<String, Value>>,
) -> Result<Variables, String> {
    let uses_results = templates.values().any(|t| match t {
        Value::String(s) => references(s).iter().any(|name| !vars.contains_key(*name)),
        _ => false,
    });

    if !uses_results {
        let rendered = render_all(&templates, |name| vars.get(name).cloned())?;
        return Ok(Variables::Static(rendered));
    }

    Ok(Variables::computed(move |ctx| {
        render_all(&templates, |name| {
            vars.get(name).cloned().or_else(|| ctx.lookup(name).cloned())
        })
        .map_err(PromptError::Resolve)
    }))
}

fn render_all<F>(templates: &Map<String, Value>, lookup: F) -> Result<Vec<Variable>, String>
where
    F: Fn(&str) -> Option<Value>,
{
    templates
        .iter()
        .map(|(field, template)| {
            let value = match template {
                Value::String(s) => render(s, &lookup)?,
                other => other.clone(),
            };
            Ok(Variable::new(field.clone(), value))
        })
        .collect()
}
