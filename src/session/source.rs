//! Task sources
//!
//! Where a session gets the user's current task collection from.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::AssistantConfig;
use crate::error::{AssistantError, Result};
use crate::models::{parse_task_collection, Task};

/// Trait for fetching the current task collection
#[async_trait::async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_current_tasks(&self) -> Result<Vec<Task>>;
}

/// In-memory task source for development and tests
pub struct InMemoryTaskSource {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl InMemoryTaskSource {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(tasks)),
        }
    }

    pub async fn set_tasks(&self, tasks: Vec<Task>) {
        *self.tasks.write().await = tasks;
    }
}

impl Default for InMemoryTaskSource {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait::async_trait]
impl TaskSource for InMemoryTaskSource {
    async fn fetch_current_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.read().await.clone())
    }
}

/// Reads `GET {base_url}/tasks/` from the task service
#[derive(Clone)]
pub struct HttpTaskSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTaskSource {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self::with_client(client, base_url, token))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn tasks_url(&self) -> String {
        format!("{}/tasks/", self.base_url)
    }
}

#[async_trait::async_trait]
impl TaskSource for HttpTaskSource {
    async fn fetch_current_tasks(&self) -> Result<Vec<Task>> {
        let url = self.tasks_url();
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::TaskFetch(format!(
                "task service returned {}: {}",
                status, body
            )));
        }

        let payload: serde_json::Value = response.json().await?;
        let tasks = parse_task_collection(payload)?;

        debug!(url = %url, count = tasks.len(), "Fetched tasks");

        Ok(tasks)
    }
}

/// Reads a JSON array of tasks from disk on every fetch
pub struct FileTaskSource {
    path: PathBuf,
}

impl FileTaskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl TaskSource for FileTaskSource {
    async fn fetch_current_tasks(&self) -> Result<Vec<Task>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let payload: serde_json::Value = serde_json::from_str(&raw)?;
        parse_task_collection(payload)
    }
}

/// Pick the source the configuration points at: the HTTP service first,
/// then a tasks file, otherwise an empty in-memory collection.
pub fn source_from_config(config: &AssistantConfig) -> Result<Arc<dyn TaskSource>> {
    if let Some(url) = &config.tasks_api_url {
        return Ok(Arc::new(HttpTaskSource::new(url.clone(), config.api_token.clone())?));
    }

    if let Some(path) = &config.tasks_file {
        return Ok(Arc::new(FileTaskSource::new(path.clone())));
    }

    Ok(Arc::new(InMemoryTaskSource::default()))
}
