use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Status of a pipeline or job as reported by GitLab.
///
/// Statuses GitLab adds in the future are kept verbatim in `Unknown` instead of
/// failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Status {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
    Unknown(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::WaitingForResource => "waiting_for_resource",
            Self::Preparing => "preparing",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Skipped => "skipped",
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::Unknown(other) => other,
        }
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "created" => Self::Created,
            "waiting_for_resource" => Self::WaitingForResource,
            "preparing" => Self::Preparing,
            "pending" => Self::Pending,
            "running" => Self::Running,
            "success" => Self::Success,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            "skipped" => Self::Skipped,
            "manual" => Self::Manual,
            "scheduled" => Self::Scheduled,
            other => Self::Unknown(other.to_string()),
        })
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GitLab CI/CD pipeline as returned by the REST API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub status: Status,
    /// Git reference the pipeline ran for (e.g., "main")
    #[serde(rename = "ref", default)]
    pub ref_: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Pipeline {
    /// First eight characters of the commit SHA, the way GitLab shows it.
    pub fn short_sha(&self) -> &str {
        self.sha
            .as_deref()
            .map_or("", |sha| sha.get(..8).unwrap_or(sha))
    }
}

/// A job within a pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub stage: String,
    pub status: Status,
    #[serde(default)]
    pub pipeline: Option<PipelineRef>,
}

/// The pipeline summary GitLab embeds in job payloads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineRef {
    pub id: u64,
}

/// Request body for `POST /projects/:id/pipeline`.
#[derive(Debug, Serialize)]
pub(super) struct CreatePipelineRequest<'a> {
    #[serde(rename = "ref")]
    pub ref_: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<PipelineVariable<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct PipelineVariable<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> CreatePipelineRequest<'a> {
    pub fn new(ref_: &'a str, variables: &'a BTreeMap<String, String>) -> Self {
        Self {
            ref_,
            variables: variables
                .iter()
                .map(|(key, value)| PipelineVariable { key, value })
                .collect(),
        }
    }
}
