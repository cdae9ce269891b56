// Taskade repository implementation
use crate::application::record_store::RecordStore;
use crate::domain::dashboard::RecordId;
use crate::domain::error::DashboardError;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TaskadeRepository {
    client: reqwest::Client,
    base_url: String,
    token: String,
    project_id: String,
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTask<'a> {
    task_id: Option<&'a str>,
    placement: &'a str,
    content_type: &'a str,
    content: &'a str,
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateTasksRequest<'a> {
    tasks: Vec<NewTask<'a>>,
}

#[derive(Debug, Serialize)]
struct UpdateTaskRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateTasksResponse {
    #[serde(default)]
    item: Vec<CreatedTask>,
}

#[derive(Debug, Deserialize)]
struct CreatedTask {
    id: serde_json::Value,
}

impl TaskadeRepository {
    pub fn new(
        base_url: String,
        token: String,
        project_id: String,
        title: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Taskade HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            project_id,
            title,
        })
    }

    fn create_url(&self) -> String {
        format!("{}/projects/{}/tasks", self.base_url, self.project_id)
    }

    fn update_url(&self, id: &RecordId) -> String {
        format!("{}/tasks/{}", self.base_url, id)
    }

    fn create_payload<'a>(&'a self, body: &'a str) -> CreateTasksRequest<'a> {
        CreateTasksRequest {
            tasks: vec![NewTask {
                task_id: None,
                placement: "afterbegin",
                content_type: "text/markdown",
                content: body,
                title: &self.title,
            }],
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<reqwest::Response, DashboardError> {
        request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DashboardError::Transport(format!("{} failed: {}", operation, e)))
    }
}

/// Map a non-success status to an error kind.
/// `updating` names the record an update targeted, so a 404 becomes a stale identifier.
fn status_error(status: StatusCode, body: &str, updating: Option<&RecordId>) -> DashboardError {
    let detail = format!("{} {}", status, truncate(body, 500));

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return DashboardError::Transport(detail);
    }
    match updating {
        Some(id) if status == StatusCode::NOT_FOUND => DashboardError::StaleIdentifier(id.to_string()),
        _ => DashboardError::Store(detail),
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Pull the new task id out of a create response (`item[0].id`).
fn parse_created_id(body: &str) -> Result<RecordId, DashboardError> {
    let response: CreateTasksResponse = serde_json::from_str(body)
        .map_err(|e| DashboardError::Store(format!("unexpected create response: {}", e)))?;

    let raw = match response.item.first().map(|task| &task.id) {
        Some(serde_json::Value::String(id)) => id.clone(),
        Some(serde_json::Value::Number(id)) => id.to_string(),
        _ => {
            return Err(DashboardError::Store(format!(
                "create response has no item[0].id: {}",
                truncate(body, 500)
            )));
        }
    };

    RecordId::parse(Some(&raw))
        .ok_or_else(|| DashboardError::Store("create response returned an empty task id".to_string()))
}

#[async_trait]
impl RecordStore for TaskadeRepository {
    async fn create_record(&self, body: &str) -> Result<RecordId, DashboardError> {
        let url = self.create_url();
        tracing::info!("Creating task at {}", url);

        let response = self
            .send(self.client.post(&url).json(&self.create_payload(body)), "create task")
            .await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DashboardError::Transport(format!("reading create response failed: {}", e)))?;

        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(status_error(status, &text, None));
        }

        tracing::debug!("Create task response: {}", text);
        parse_created_id(&text)
    }

    async fn update_record(&self, id: &RecordId, body: &str) -> Result<(), DashboardError> {
        let url = self.update_url(id);
        tracing::info!("Updating task {} at {}", id, url);

        let response = self
            .send(
                self.client.put(&url).json(&UpdateTaskRequest { content: body }),
                "update task",
            )
            .await?;
        let status = response.status();

        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        // The status decides the error kind; the body only adds detail
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(record_id = %id, "Failed to read update error body: {}", e);
                String::new()
            }
        };
        Err(status_error(status, &text, Some(id)))
    }
}
