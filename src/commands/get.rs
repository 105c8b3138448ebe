use super::{vars_from_args, wait_and_print};
use crate::api::{GetPromptArgs, PromptManager};

/// Fetch and display a prompt.
pub async fn run(
    client: &PromptManager,
    prompt_id: &str,
    project: Option<&str>,
    vars: &[String],
) -> Result<(), String> {
    let mut args = GetPromptArgs::new(prompt_id).variables(vars_from_args(vars)?);
    if let Some(project) = project {
        args = args.project_id(project);
    }

    wait_and_print("Fetching prompt...", client.get_prompt(args)).await
}
