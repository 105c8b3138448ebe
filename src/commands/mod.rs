use crate::api::{PromptError, PromptManager, Variable};
use crate::cli::{ChainCmd, Cmd};
use crate::core::utils::{parse_pairs, parse_scalar};
use console::style;
use serde_json::Value;
use spinners::{Spinner, Spinners};
use std::future::Future;

pub mod chain;
pub mod get;
pub mod run;
pub mod vectorize;

/// Dispatches the parsed command to the appropriate handler.
pub async fn dispatch(command: Cmd, client: &PromptManager) -> Result<(), String> {
    match command {
        Cmd::Run {
            prompt_id,
            action,
            project,
            vars,
            file_ids,
            settings,
        } => {
            run::run(
                client,
                &prompt_id,
                &action,
                project.as_deref(),
                &vars,
                &file_ids,
                &settings,
            )
            .await
        }
        Cmd::Get {
            prompt_id,
            project,
            vars,
        } => get::run(client, &prompt_id, project.as_deref(), &vars).await,
        Cmd::Vectorize {
            prompt_id,
            storage_key,
            name,
            session,
            project,
        } => {
            vectorize::run(
                client,
                &prompt_id,
                &name,
                &storage_key,
                session.as_deref(),
                project.as_deref(),
            )
            .await
        }
        Cmd::Chain(chain_cmd) => match chain_cmd {
            ChainCmd::Run { file, vars } => chain::run::run(client, &file, &vars).await,
        },
    }
}

/// `key=value` arguments as string-valued variables.
pub(crate) fn vars_from_args(vars: &[String]) -> Result<Vec<Variable>, String> {
    Ok(parse_pairs(vars)?
        .into_iter()
        .map(|(k, v)| Variable::new(k, v))
        .collect())
}

/// `key=value` arguments with typed scalar values.
pub(crate) fn scalars_from_args(pairs: &[String]) -> Result<Vec<(String, Value)>, String> {
    Ok(parse_pairs(pairs)?
        .into_iter()
        .map(|(k, v)| (k, parse_scalar(&v)))
        .collect())
}

/// Awaits `fut` behind a spinner and prints the JSON result.
pub(crate) async fn wait_and_print<F>(message: &str, fut: F) -> Result<(), String>
where
    F: Future<Output = Result<Value, PromptError>>,
{
    let mut sp = Spinner::new(Spinners::Dots9, message.into());
    match fut.await {
        Ok(value) => {
            sp.stop_with_message(format!("{} Response received.", style("✔").green()));
            print_json(&value)
        }
        Err(e) => {
            sp.stop_with_message(format!("{} Request failed.", style("✘").red()));
            Err(e.to_string())
        }
    }
}

pub(crate) fn print_json(value: &Value) -> Result<(), String> {
    let pretty = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", pretty);
    Ok(())
}
