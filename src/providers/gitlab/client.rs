use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use url::Url;

use crate::auth::Token;
use crate::config::GitLabConfig;
use crate::error::{HelperError, Result};

use super::types::{CreatePipelineRequest, Job, Pipeline};

/// Largest page GitLab serves. Jobs are fetched in a single page of this size.
pub const MAX_PER_PAGE: u64 = 100;

/// Client for the GitLab REST v4 pipeline and job endpoints of one project.
///
/// Every method performs exactly one HTTP round trip. Nothing is retried or
/// cached.
pub struct GitLabClient {
    client: Client,
    project_url: Url,
    token: Token,
}

impl GitLabClient {
    pub fn new(base_url: &str, project_id: &str, token: Token) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gitlab-helper/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HelperError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut project_url = Url::parse(base_url)
            .map_err(|e| HelperError::Config(format!("Invalid base URL: {e}")))?;

        project_url
            .path_segments_mut()
            .map_err(|()| HelperError::Config(format!("Invalid base URL: {base_url}")))?
            .pop_if_empty()
            .extend(["api", "v4", "projects", project_id]);

        Ok(Self {
            client,
            project_url,
            token,
        })
    }

    pub fn from_config(config: &GitLabConfig) -> Result<Self> {
        Self::new(&config.url, &config.project_id, config.token.clone())
    }

    /// Project-scoped endpoint URL. Each segment is percent-encoded, so a
    /// project path like `group/project` becomes `group%2Fproject`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.project_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// Helper to build authenticated requests
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{method} {url}");
        self.client
            .request(method, url)
            .bearer_auth(self.token.as_str())
    }

    /// Send a request and turn any non-success status into a typed error.
    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{resource}: {status}");

        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Err(HelperError::from_status(status, resource, body))
    }

    async fn decode<T: DeserializeOwned>(response: Response, resource: &str) -> Result<T> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| HelperError::UnexpectedResponse(format!("{resource}: {e}")))
    }

    pub async fn list_pipelines(&self, limit: u64) -> Result<Vec<Pipeline>> {
        let mut url = self.endpoint(&["pipelines"]);
        url.query_pairs_mut()
            .append_pair("per_page", &limit.to_string());

        let response = self.send(self.request(Method::GET, url), "pipelines").await?;
        Self::decode(response, "pipelines").await
    }

    /// The most recent pipeline, or `None` when the project has none.
    pub async fn latest_pipeline(&self) -> Result<Option<Pipeline>> {
        Ok(self.list_pipelines(1).await?.into_iter().next())
    }

    pub async fn pipeline(&self, pipeline_id: u64) -> Result<Pipeline> {
        let resource = format!("pipeline {pipeline_id}");
        let url = self.endpoint(&["pipelines", &pipeline_id.to_string()]);

        let response = self.send(self.request(Method::GET, url), &resource).await?;
        Self::decode(response, &resource).await
    }

    pub async fn create_pipeline(
        &self,
        ref_: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<Pipeline> {
        let resource = format!("pipeline for ref '{ref_}'");
        let url = self.endpoint(&["pipeline"]);
        let body = CreatePipelineRequest::new(ref_, variables);

        let request = self.request(Method::POST, url).json(&body);
        let response = self.send(request, &resource).await?;
        Self::decode(response, &resource).await
    }

    pub async fn pipeline_jobs(&self, pipeline_id: u64) -> Result<Vec<Job>> {
        let resource = format!("jobs for pipeline {pipeline_id}");
        let mut url = self.endpoint(&["pipelines", &pipeline_id.to_string(), "jobs"]);
        url.query_pairs_mut()
            .append_pair("per_page", &MAX_PER_PAGE.to_string());

        let response = self.send(self.request(Method::GET, url), &resource).await?;
        Self::decode(response, &resource).await
    }

    /// Raw job trace. Invalid UTF-8 is replaced rather than rejected so ANSI
    /// colour codes and odd runner output survive.
    pub async fn job_log(&self, job_id: u64) -> Result<String> {
        let resource = format!("log for job {job_id}");
        let url = self.endpoint(&["jobs", &job_id.to_string(), "trace"]);

        let response = self.send(self.request(Method::GET, url), &resource).await?;
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
