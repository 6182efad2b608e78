use std::path::Path;

use chrono::NaiveDateTime;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum WebError {
    #[error("login failed: {0}")]
    Login(String),

    #[error("API call failed: {0}")]
    Api(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Authenticated session against the scheduler web server. The session id
/// obtained at login is attached to every subsequent call.
pub struct AjaxClient {
    base_url: Url,
    http: Client,
    session_id: String,
}

impl AjaxClient {
    /// Log in and keep the session id for subsequent calls.
    pub async fn login(base_url: &str, username: &str, password: &str) -> Result<Self, WebError> {
        let base_url =
            Url::parse(base_url).map_err(|e| WebError::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = Client::new();
        info!(url = %base_url, "Logging in");

        let res = http
            .post(base_url.clone())
            .form(&[("action", "login"), ("username", username), ("password", password)])
            .send()
            .await?
            .error_for_status()?;
        let body: Value = res.json().await?;
        if let Some(err) = body.get("error").and_then(Value::as_str) {
            error!(error = err, "Login rejected");
            return Err(WebError::Login(err.to_string()));
        }
        let session_id = body
            .get("session.id")
            .and_then(Value::as_str)
            .ok_or_else(|| WebError::Login("response carries no session.id".to_string()))?
            .to_string();
        info!(user = username, "Login succeeded");
        Ok(Self { base_url, http, session_id })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Create a project. With `if_not_exists`, an "already exists" answer
    /// is downgraded to a warning and the server response returned as-is.
    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
        if_not_exists: bool,
    ) -> Result<Value, WebError> {
        let url = self.endpoint("manager")?;
        let res = self
            .http
            .post(url)
            .form(&[
                ("session.id", self.session_id.as_str()),
                ("action", "create"),
                ("name", name),
                ("description", description),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body: Value = res.json().await?;
        if body.get("status").and_then(Value::as_str) == Some("error") {
            let message = body.get("message").and_then(Value::as_str).unwrap_or("unknown error");
            if if_not_exists && message.contains("already exists") {
                warn!(project = name, "Project already exists, skipping creation");
                return Ok(body);
            }
            error!(project = name, message, "Cannot create project");
            return Err(WebError::Api(format!("create project '{name}': {message}")));
        }
        info!(project = name, "Project created");
        Ok(body)
    }

    /// Upload a packed archive into an existing project. Returns the server
    /// response (carries `projectId` and `version`).
    pub async fn upload_project(&self, name: &str, archive: &Path) -> Result<Value, WebError> {
        let url = self.endpoint("manager")?;
        let bytes = tokio::fs::read(archive).await?;
        let file = Part::bytes(bytes)
            .file_name("jobs.zip")
            .mime_str("application/x-zip-compressed")?;
        let form = Form::new()
            .text("session.id", self.session_id.clone())
            .text("ajax", "upload")
            .text("project", name.to_string())
            .part("file", file);

        let res = self.http.post(url).multipart(form).send().await?.error_for_status()?;
        let body = check(res.json().await?, "upload project")?;
        info!(project = name, version = ?body.get("version"), "Project uploaded");
        Ok(body)
    }

    /// Flow ids registered under a project.
    pub async fn fetch_project_flows(&self, project: &str) -> Result<Value, WebError> {
        let url = self.endpoint("manager")?;
        let res = self
            .http
            .get(url)
            .query(&[
                ("session.id", self.session_id.as_str()),
                ("ajax", "fetchprojectflows"),
                ("project", project),
            ])
            .send()
            .await?
            .error_for_status()?;
        check(res.json().await?, "fetch project flows")
    }

    /// The job graph of one flow (`nodes` with ids, types and incoming
    /// dependencies).
    pub async fn fetch_flow_jobs(&self, project: &str, flow: &str) -> Result<Value, WebError> {
        let url = self.endpoint("manager")?;
        let res = self
            .http
            .get(url)
            .query(&[
                ("session.id", self.session_id.as_str()),
                ("ajax", "fetchflowgraph"),
                ("project", project),
                ("flow", flow),
            ])
            .send()
            .await?
            .error_for_status()?;
        check(res.json().await?, "fetch flow jobs")
    }

    /// Schedule a flow, overwriting any schedule already attached to it.
    /// `period` recurs the schedule (e.g. `1d`, `2h`, `30m`).
    pub async fn schedule_flow(
        &self,
        project: &str,
        flow: &str,
        start: NaiveDateTime,
        period: Option<&str>,
    ) -> Result<Value, WebError> {
        let graph = self.fetch_flow_jobs(project, flow).await?;
        let project_id = match graph.get("projectId") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(WebError::Api(format!(
                    "flow graph for '{project}.{flow}' carries no projectId"
                )))
            }
        };
        for node in graph.get("nodes").and_then(Value::as_array).into_iter().flatten() {
            debug!(job = ?node.get("id"), "Job in scheduled flow");
        }

        let schedule_time = start.format("%I,%M,%p").to_string().to_lowercase();
        let schedule_date = start.format("%m/%d/%Y").to_string();
        let mut query: Vec<(&str, String)> = vec![
            ("session.id", self.session_id.clone()),
            ("ajax", "scheduleFlow".to_string()),
            ("projectName", project.to_string()),
            ("projectId", project_id),
            ("flow", flow.to_string()),
            ("scheduleTime", schedule_time),
            ("scheduleDate", schedule_date),
        ];
        if let Some(period) = period {
            query.push(("is_recurring", "on".to_string()));
            query.push(("period", period.to_string()));
        }

        let url = self.endpoint("schedule")?;
        let res = self.http.get(url).query(&query).send().await?.error_for_status()?;
        let body = check(res.json().await?, "schedule flow")?;
        info!(project, flow, "Flow scheduled");
        Ok(body)
    }

    fn endpoint(&self, path: &str) -> Result<Url, WebError> {
        self.base_url
            .join(path)
            .map_err(|e| WebError::InvalidUrl(format!("{path}: {e}")))
    }
}

/// The server reports failures through an `error` key in an otherwise
/// successful response; surface it as an API error.
fn check(body: Value, what: &str) -> Result<Value, WebError> {
    if let Some(err) = body.get("error").and_then(Value::as_str) {
        error!(what, error = err, "API call failed");
        return Err(WebError::Api(format!("{what}: {err}")));
    }
    Ok(body)
}
