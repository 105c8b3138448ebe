use super::wait_and_print;
use crate::api::{FileRef, PromptManager, VectorizeArgs};

/// Vectorize a stored file against a prompt.
pub async fn run(
    client: &PromptManager,
    prompt_id: &str,
    name: &str,
    storage_key: &str,
    session: Option<&str>,
    project: Option<&str>,
) -> Result<(), String> {
    let mut args = VectorizeArgs::new(prompt_id, FileRef::new(name, storage_key));
    if let Some(session) = session {
        args = args.session_id(session);
    }
    if let Some(project) = project {
        args = args.project_id(project);
    }

    wait_and_print("Vectorizing file...", client.vectorize_file(args)).await
}
