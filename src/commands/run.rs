use super::{scalars_from_args, vars_from_args, wait_and_print};
use crate::api::{ModelSettings, PromptManager, RunArgs};

/// Run a prompt once and print the response.
pub async fn run(
    client: &PromptManager,
    prompt_id: &str,
    action: &str,
    project: Option<&str>,
    vars: &[String],
    file_ids: &[String],
    settings: &[String],
) -> Result<(), String> {
    let mut args = RunArgs::new(prompt_id, action).variables(vars_from_args(vars)?);
    if let Some(project) = project {
        args = args.project_id(project);
    }
    if !file_ids.is_empty() {
        args = args.file_ids(file_ids.iter().cloned());
    }
    if !settings.is_empty() {
        args = args.model_settings(scalars_from_args(settings)?.into_iter().collect::<ModelSettings>());
    }

    wait_and_print("Waiting for prompt response...", client.run(args)).await
}
