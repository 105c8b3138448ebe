//! The main entry point for talking to the prompt service.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::error::PromptError;
use super::runner::ChainRunner;
use super::settings::ModelSettings;
use super::step::Variable;
use super::transport::{ApiRequest, HttpTransport, Transport};
use crate::core::config::ClientConfig;

pub(crate) const RUN_PATH: &str = "/run";
pub(crate) const GET_PROMPT_PATH: &str = "/get-prompt";
pub(crate) const VECTORIZE_FILE_PATH: &str = "/vectorize-file";

/// Arguments of a single prompt run.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub project_id: Option<String>,
    pub prompt_id: String,
    pub action: String,
    pub file_ids: Option<Vec<String>>,
    pub variables: Vec<Variable>,
    pub model_settings: Option<ModelSettings>,
}

impl RunArgs {
    /// Creates run arguments for `prompt_id` with operation variant `action`.
    pub fn new(prompt_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            action: action.into(),
            ..Self::default()
        }
    }

    /// Overrides the client's default project. A blank id keeps the default.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Replaces the variables sent with the request.
    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables = variables.into_iter().collect();
        self
    }

    /// Appends one `{field, value}` variable.
    pub fn var(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.push(Variable::new(field, value));
        self
    }

    /// Attaches file IDs to the run.
    pub fn file_ids(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.file_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Per-call model settings; they win key by key over the client's.
    pub fn model_settings(mut self, settings: ModelSettings) -> Self {
        self.model_settings = Some(settings);
        self
    }
}

/// Arguments for fetching a rendered prompt.
#[derive(Debug, Clone, Default)]
pub struct GetPromptArgs {
    pub project_id: Option<String>,
    pub prompt_id: String,
    pub variables: Vec<Variable>,
}

impl GetPromptArgs {
    /// Creates arguments for fetching `prompt_id`.
    pub fn new(prompt_id: impl Into<String>) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            ..Self::default()
        }
    }

    /// Overrides the client's default project. A blank id keeps the default.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Replaces the variables sent with the request.
    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables = variables.into_iter().collect();
        self
    }
}

/// A stored file to be vectorized, as the caller knows it.
#[derive(Debug, Clone, Default)]
pub struct FileRef {
    pub name: String,
    pub storage_key: String,
}

impl FileRef {
    /// A file known by display `name` and `storage_key`.
    pub fn new(name: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_key: storage_key.into(),
        }
    }
}

/// Arguments for vectorizing a stored file against a prompt.
#[derive(Debug, Clone, Default)]
pub struct VectorizeArgs {
    pub project_id: Option<String>,
    pub prompt_id: String,
    pub session_id: Option<String>,
    pub file: FileRef,
}

impl VectorizeArgs {
    /// Creates arguments for vectorizing `file` against `prompt_id`.
    pub fn new(prompt_id: impl Into<String>, file: FileRef) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            file,
            ..Self::default()
        }
    }

    /// Overrides the client's default project. A blank id keeps the default.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Session the vectorized file belongs to.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<&'a str>,
    project_id: &'a str,
    prompt_id: &'a str,
    action: &'a str,
    file_ids: Option<&'a [String]>,
    variables: &'a [Variable],
    #[serde(skip_serializing_if = "Option::is_none")]
    model_settings: Option<&'a ModelSettings>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetPromptRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<&'a str>,
    project_id: Option<&'a str>,
    prompt_id: &'a str,
    variables: &'a [Variable],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDescriptor {
    name: String,
    storage_key: String,
}

impl FileDescriptor {
    /// Trims both fields; a blank name falls back to the key's last segment.
    fn normalize(file: &FileRef) -> Result<Self, PromptError> {
        let storage_key = file.storage_key.trim();
        if storage_key.is_empty() {
            return Err(PromptError::config("File storage key is required"));
        }
        let name = match file.name.trim() {
            "" => storage_key
                .rsplit('/')
                .find(|s| !s.is_empty())
                .unwrap_or(storage_key),
            name => name,
        };
        Ok(Self {
            name: name.to_string(),
            storage_key: storage_key.to_string(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorizeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<&'a str>,
    project_id: Option<&'a str>,
    prompt_id: &'a str,
    session_id: Option<&'a str>,
    file: FileDescriptor,
}

/// Client for the prompt service.
///
/// Holds no per-chain state, so one instance can be shared by any number of
/// chains and tasks.
#[derive(Clone)]
pub struct PromptManager {
    transport: Arc<dyn Transport>,
    environment: Option<String>,
    project_id: Option<String>,
    model_settings: ModelSettings,
}

impl PromptManager {
    /// Creates a client over HTTP. Unset fields are taken from the
    /// `PROMPTMGR_*` environment variables.
    pub fn new(config: ClientConfig) -> Result<Self, PromptError> {
        let config = config.with_env_defaults();
        let (base_url, secret_key) = config.endpoint()?;
        let transport = HttpTransport::new(
            base_url.as_str(),
            secret_key,
            config.timeout_secs.map(Duration::from_secs),
        )?;

        tracing::debug!(base_url = %base_url, "PromptManager initialized");
        Ok(Self::from_parts(config, Arc::new(transport)))
    }

    /// Creates a client over a custom transport. `config` is used as given;
    /// the endpoint and secret are still required.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, PromptError> {
        config.endpoint()?;
        Ok(Self::from_parts(config, transport))
    }

    fn from_parts(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            environment: config.environment,
            project_id: config.project_id,
            model_settings: config.model_settings,
        }
    }

    /// Runs one prompt and returns the service's response verbatim.
    pub async fn run(&self, args: RunArgs) -> Result<Value, PromptError> {
        let project_id = self
            .project_for(args.project_id.as_deref())
            .ok_or_else(|| PromptError::config("Project ID is required"))?;
        if args.prompt_id.is_empty() {
            return Err(PromptError::config("Prompt ID is required"));
        }
        if args.action.is_empty() {
            return Err(PromptError::config("Action is required"));
        }

        let settings = self
            .model_settings
            .merged_with(args.model_settings.as_ref());
        let body = RunRequest {
            environment: self.environment.as_deref(),
            project_id,
            prompt_id: &args.prompt_id,
            action: &args.action,
            file_ids: args.file_ids.as_deref(),
            variables: &args.variables,
            model_settings: (!settings.is_empty()).then_some(&settings),
        };

        self.send(RUN_PATH, serde_json::to_value(&body)?).await
    }

    /// Fetches a prompt rendered with `args.variables`.
    pub async fn get_prompt(&self, args: GetPromptArgs) -> Result<Value, PromptError> {
        if args.prompt_id.is_empty() {
            return Err(PromptError::config("Prompt ID is required"));
        }

        let body = GetPromptRequest {
            environment: self.environment.as_deref(),
            project_id: self.project_for(args.project_id.as_deref()),
            prompt_id: &args.prompt_id,
            variables: &args.variables,
        };

        self.send(GET_PROMPT_PATH, serde_json::to_value(&body)?).await
    }

    /// Asks the service to vectorize a stored file for a prompt.
    pub async fn vectorize_file(&self, args: VectorizeArgs) -> Result<Value, PromptError> {
        if args.prompt_id.is_empty() {
            return Err(PromptError::config("Prompt ID is required"));
        }

        let body = VectorizeRequest {
            environment: self.environment.as_deref(),
            project_id: self.project_for(args.project_id.as_deref()),
            prompt_id: &args.prompt_id,
            session_id: args.session_id.as_deref(),
            file: FileDescriptor::normalize(&args.file)?,
        };

        self.send(VECTORIZE_FILE_PATH, serde_json::to_value(&body)?).await
    }

    /// Starts a new, empty chain bound to this client.
    pub fn chain(&self) -> ChainRunner<'_> {
        ChainRunner::new(self)
    }

    /// The call's project id, or the instance default when it is unset or blank.
    fn project_for<'s>(&'s self, explicit: Option<&'s str>) -> Option<&'s str> {
        explicit
            .filter(|p| !p.trim().is_empty())
            .or(self.project_id.as_deref())
            .filter(|p| !p.trim().is_empty())
    }

    async fn send(&self, path: &str, body: Value) -> Result<Value, PromptError> {
        Ok(self.transport.send(ApiRequest::post(path, body)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::TransportError;
    use crate::api::transport::mock::MockTransport;
    use serde_json::json;

    fn config() -> ClientConfig {
        ClientConfig::new()
            .base_url("http://localhost:9999")
            .secret_key("secret")
            .environment("test")
            .project_id("proj-1")
    }

    fn client(transport: Arc<MockTransport>) -> PromptManager {
        PromptManager::with_transport(config(), transport).unwrap()
    }

    #[test]
    fn construction_requires_endpoint_and_secret() {
        let transport = Arc::new(MockTransport::new());
        let err = PromptManager::with_transport(ClientConfig::new().secret_key("s"), transport.clone())
            .err()
            .unwrap();
        assert!(err.is_config());

        let err = PromptManager::with_transport(ClientConfig::new().base_url("http://x"), transport)
            .err()
            .unwrap();
        assert!(err.to_string().contains("Secret key is required"));
    }

    #[tokio::test]
    async fn run_builds_request_body() {
        let transport = Arc::new(MockTransport::echo_run());
        let pm = client(transport.clone());

        let out = pm
            .run(RunArgs::new("p1", "test/generate").var("topic", "SEO"))
            .await
            .unwrap();
        assert_eq!(out, json!({"response": "p1-test/generate"}));

        let bodies = transport.bodies_for(RUN_PATH);
        assert_eq!(
            bodies[0],
            json!({
                "environment": "test",
                "projectId": "proj-1",
                "promptId": "p1",
                "action": "test/generate",
                "fileIds": null,
                "variables": [{"field": "topic", "value": "SEO"}],
            })
        );
    }

    #[tokio::test]
    async fn run_merges_model_settings() {
        let transport = Arc::new(MockTransport::echo_run());
        let pm = PromptManager::with_transport(
            config().model_settings(ModelSettings::new().temperature(0.5)),
            transport.clone(),
        )
        .unwrap();

        pm.run(
            RunArgs::new("p1", "a")
                .model_settings(ModelSettings::new().temperature(0.9).max_tokens(100)),
        )
        .await
        .unwrap();

        let body = &transport.bodies_for(RUN_PATH)[0];
        assert_eq!(body["modelSettings"], json!({"temperature": 0.9, "maxTokens": 100}));
    }

    #[tokio::test]
    async fn blank_project_falls_back_to_default() {
        let transport = Arc::new(
            MockTransport::echo_run()
                .on(GET_PROMPT_PATH, |_| Ok(json!({})))
                .on(VECTORIZE_FILE_PATH, |_| Ok(json!({}))),
        );
        let pm = client(transport.clone());

        pm.run(RunArgs::new("p", "a").project_id("")).await.unwrap();
        pm.get_prompt(GetPromptArgs::new("p").project_id("  "))
            .await
            .unwrap();
        pm.vectorize_file(VectorizeArgs::new("p", FileRef::new("a.txt", "k")).project_id(""))
            .await
            .unwrap();

        let projects: Vec<Value> = transport
            .requests()
            .into_iter()
            .map(|r| r.body["projectId"].clone())
            .collect();
        assert_eq!(projects, vec![json!("proj-1"); 3]);
    }

    #[tokio::test]
    async fn blank_project_without_default_is_rejected() {
        let transport = Arc::new(MockTransport::echo_run());
        let pm = PromptManager::with_transport(
            ClientConfig::new().base_url("http://x").secret_key("s"),
            transport.clone(),
        )
        .unwrap();

        let err = pm.run(RunArgs::new("p", "a").project_id("")).await.unwrap_err();
        assert!(err.to_string().contains("Project ID is required"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn run_explicit_project_overrides_default() {
        let transport = Arc::new(MockTransport::echo_run());
        let pm = client(transport.clone());

        pm.run(RunArgs::new("p1", "a").project_id("other").file_ids(["f-1"]))
            .await
            .unwrap();

        let body = &transport.bodies_for(RUN_PATH)[0];
        assert_eq!(body["projectId"], "other");
        assert_eq!(body["fileIds"], json!(["f-1"]));
        assert!(body.get("modelSettings").is_none());
    }

    #[tokio::test]
    async fn run_validates_before_sending() {
        let transport = Arc::new(MockTransport::echo_run());
        let no_project = PromptManager::with_transport(
            ClientConfig::new().base_url("http://x").secret_key("s"),
            transport.clone(),
        )
        .unwrap();

        let err = no_project.run(RunArgs::new("p", "a")).await.unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Project ID is required");

        let pm = client(transport.clone());
        let err = pm.run(RunArgs::new("", "a")).await.unwrap_err();
        assert!(err.to_string().contains("Prompt ID is required"));
        let err = pm.run(RunArgs::new("p", "")).await.unwrap_err();
        assert!(err.to_string().contains("Action is required"));

        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn transport_failures_surface_unchanged() {
        let transport = Arc::new(MockTransport::new().on(RUN_PATH, |_| {
            Err(TransportError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        }));
        let pm = client(transport);

        let err = pm.run(RunArgs::new("p", "a")).await.unwrap_err();
        match err {
            PromptError::Transport(e) => assert_eq!(e.status(), Some(500)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_prompt_sends_variables() {
        let transport = Arc::new(MockTransport::new().on(GET_PROMPT_PATH, |_| Ok(json!({"prompt": "hi"}))));
        let pm = client(transport.clone());

        let out = pm
            .get_prompt(GetPromptArgs::new("p9").variables([Variable::new("name", "Ada")]))
            .await
            .unwrap();
        assert_eq!(out["prompt"], "hi");
        assert_eq!(
            transport.bodies_for(GET_PROMPT_PATH)[0],
            json!({
                "environment": "test",
                "projectId": "proj-1",
                "promptId": "p9",
                "variables": [{"field": "name", "value": "Ada"}],
            })
        );

        let err = pm.get_prompt(GetPromptArgs::new("")).await.unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn vectorize_file_normalizes_descriptor() {
        let transport = Arc::new(MockTransport::new().on(VECTORIZE_FILE_PATH, |_| Ok(json!({"ok": true}))));
        let pm = client(transport.clone());

        pm.vectorize_file(
            VectorizeArgs::new("p2", FileRef::new("  ", " uploads/2024/report.pdf "))
                .session_id("sess-1"),
        )
        .await
        .unwrap();

        assert_eq!(
            transport.bodies_for(VECTORIZE_FILE_PATH)[0],
            json!({
                "environment": "test",
                "projectId": "proj-1",
                "promptId": "p2",
                "sessionId": "sess-1",
                "file": {"name": "report.pdf", "storageKey": "uploads/2024/report.pdf"},
            })
        );
    }

    #[tokio::test]
    async fn vectorize_file_rejects_missing_ids() {
        let transport = Arc::new(MockTransport::new());
        let pm = client(transport.clone());

        let err = pm
            .vectorize_file(VectorizeArgs::new("", FileRef::new("a.txt", "k")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Prompt ID is required"));

        let err = pm
            .vectorize_file(VectorizeArgs::new("p", FileRef::new("a.txt", "")))
            .await
            .unwrap_err();
        assert!(err.is_config());
        assert!(transport.requests().is_empty());
    }
}
