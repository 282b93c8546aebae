//! Operations shared by the CLI subcommands and the interactive console.
//!
//! Each operation performs its GitLab request(s) behind a spinner and writes
//! human-readable output to the given writer.

use log::info;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;

use crate::cli::{JobCommand, PipelineCommand};
use crate::error::{HelperError, Result};
use crate::output::{bright, bright_green, dim, jobs_table, log_panel, pipelines_table, Spinner};
use crate::providers::gitlab::{GitLabClient, Job, Pipeline};

/// Pipeline variables sent at creation time.
pub type Variables = BTreeMap<String, String>;

impl PipelineCommand {
    pub async fn execute<W: Write>(&self, client: &GitLabClient, out: &mut W) -> Result<()> {
        match self {
            Self::List { limit } => list_pipelines(client, out, *limit).await.map(drop),
            Self::Latest => latest_pipeline(client, out).await.map(drop),
            Self::Create { ref_, variables } => {
                let variables = variables.clone().unwrap_or_default();
                create_pipeline(client, out, ref_, &variables)
                    .await
                    .map(drop)
            }
            Self::Status { pipeline_id } => {
                pipeline_status(client, out, *pipeline_id).await.map(drop)
            }
        }
    }
}

impl JobCommand {
    pub async fn execute<W: Write>(&self, client: &GitLabClient, out: &mut W) -> Result<()> {
        match self {
            Self::List { pipeline_id } => list_jobs(client, out, *pipeline_id).await.map(drop),
            Self::Logs { job_id, raw } => job_logs(client, out, *job_id, *raw).await,
        }
    }
}

/// Parse pipeline variables given as a JSON object.
///
/// String values are used as is; numbers and booleans are converted to their
/// JSON text. Nulls, arrays and nested objects are rejected. Blank input
/// means no variables.
pub fn parse_variables(raw: &str) -> Result<Variables> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Variables::new());
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| HelperError::Argument(format!("variables must be valid JSON: {e}")))?;

    let Value::Object(map) = value else {
        return Err(HelperError::Argument(
            "variables must be a JSON object, e.g. '{\"VAR1\": \"value1\"}'".to_string(),
        ));
    };

    map.into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            Value::Number(n) => Ok((key, n.to_string())),
            Value::Bool(b) => Ok((key, b.to_string())),
            _ => Err(HelperError::Argument(format!(
                "variable '{key}' must be a string, number or boolean"
            ))),
        })
        .collect()
}

pub async fn list_pipelines<W: Write>(
    client: &GitLabClient,
    out: &mut W,
    limit: u64,
) -> Result<Vec<Pipeline>> {
    let spinner = Spinner::start("Fetching pipelines...");
    let pipelines = client.list_pipelines(limit).await;
    spinner.finish();
    let pipelines = pipelines?;

    if pipelines.is_empty() {
        writeln!(out, "No pipelines found")?;
    } else {
        writeln!(out, "{}", bright("GitLab Pipelines").underlined())?;
        writeln!(out, "{}", pipelines_table(&pipelines))?;
    }
    Ok(pipelines)
}

/// Prints the newest pipeline. A project without pipelines is a not-found error.
pub async fn latest_pipeline<W: Write>(client: &GitLabClient, out: &mut W) -> Result<Pipeline> {
    let spinner = Spinner::start("Fetching latest pipeline...");
    let latest = client.latest_pipeline().await;
    spinner.finish();

    let pipeline = latest?.ok_or_else(|| HelperError::NotFound("no pipelines found".to_string()))?;
    writeln!(out, "{}", pipelines_table(std::slice::from_ref(&pipeline)))?;
    Ok(pipeline)
}

/// Creates a pipeline, then shows it together with its jobs.
pub async fn create_pipeline<W: Write>(
    client: &GitLabClient,
    out: &mut W,
    ref_: &str,
    variables: &Variables,
) -> Result<Pipeline> {
    info!(
        "Creating pipeline for '{ref_}' with {} variable(s)",
        variables.len()
    );

    let spinner = Spinner::start("Creating pipeline...");
    let created = client.create_pipeline(ref_, variables).await;
    spinner.finish();
    let pipeline = created?;

    writeln!(
        out,
        "{}",
        bright_green(format!(
            "Pipeline created successfully with ID: {}",
            pipeline.id
        ))
    )?;
    writeln!(out, "{}", pipelines_table(std::slice::from_ref(&pipeline)))?;

    writeln!(out, "{}", bright("Jobs for this pipeline:"))?;
    list_jobs(client, out, pipeline.id).await?;
    Ok(pipeline)
}

pub async fn pipeline_status<W: Write>(
    client: &GitLabClient,
    out: &mut W,
    pipeline_id: u64,
) -> Result<Pipeline> {
    let spinner = Spinner::start("Fetching pipeline...");
    let pipeline = client.pipeline(pipeline_id).await;
    spinner.finish();
    let pipeline = pipeline?;

    writeln!(out, "{}", pipelines_table(std::slice::from_ref(&pipeline)))?;
    Ok(pipeline)
}

pub async fn list_jobs<W: Write>(
    client: &GitLabClient,
    out: &mut W,
    pipeline_id: u64,
) -> Result<Vec<Job>> {
    let spinner = Spinner::start("Fetching jobs...");
    let jobs = client.pipeline_jobs(pipeline_id).await;
    spinner.finish();
    let jobs = jobs?;

    if jobs.is_empty() {
        writeln!(out, "No jobs found for pipeline {pipeline_id}")?;
    } else {
        writeln!(out, "{}", jobs_table(&jobs))?;
    }
    Ok(jobs)
}

/// Prints a job log. The raw form is written untouched so the runner's ANSI
/// colours are kept; otherwise the log goes into a numbered panel.
pub async fn job_logs<W: Write>(
    client: &GitLabClient,
    out: &mut W,
    job_id: u64,
    raw: bool,
) -> Result<()> {
    let spinner = Spinner::start("Fetching job logs...");
    let log = client.job_log(job_id).await;
    spinner.finish();
    let log = log?;

    if log.is_empty() {
        writeln!(out, "No logs found for job {job_id}")?;
        return Ok(());
    }

    if !raw {
        writeln!(out, "{}", log_panel(job_id, &log))?;
        return Ok(());
    }

    writeln!(out, "\n{}", bright(format!("--- Logs for Job #{job_id} ---")))?;
    writeln!(out, "{log}")?;
    writeln!(out, "{}", dim("-----------------------------"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> GitLabClient {
        GitLabClient::new(&server.url(), "42", Token::from("t")).unwrap()
    }

    #[test]
    fn test_parse_variables() {
        let vars = parse_variables(r#"{"A": "1", "B": 2, "C": true}"#).unwrap();
        assert_eq!(vars.get("A").map(String::as_str), Some("1"));
        assert_eq!(vars.get("B").map(String::as_str), Some("2"));
        assert_eq!(vars.get("C").map(String::as_str), Some("true"));

        assert!(parse_variables("").unwrap().is_empty());
        assert!(parse_variables("  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_variables_rejects_bad_input() {
        for raw in ["not-json", "[1, 2]", r#"{"A": null}"#, r#"{"A": {"B": "C"}}"#] {
            let err = parse_variables(raw).unwrap_err();
            assert!(matches!(err, HelperError::Argument(_)), "{raw} gave {err}");
        }
    }

    #[tokio::test]
    async fn test_latest_pipeline_missing_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects/42/pipelines")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let mut out = Vec::new();
        let err = latest_pipeline(&client_for(&server), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, HelperError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_jobs_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects/42/pipelines/3/jobs")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let mut out = Vec::new();
        list_jobs(&client_for(&server), &mut out, 3).await.unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("No jobs found for pipeline 3"));
    }

    #[tokio::test]
    async fn test_job_logs_framed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects/42/jobs/5/trace")
            .with_status(200)
            .with_body("$ cargo test\ntest result: ok")
            .create_async()
            .await;

        let mut out = Vec::new();
        job_logs(&client_for(&server), &mut out, 5, true).await.unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("--- Logs for Job #5 ---"));
        assert!(out.contains("test result: ok"));
    }

    #[tokio::test]
    async fn test_job_logs_formatted_panel() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects/42/jobs/8/trace")
            .with_status(200)
            .with_body("\x1b[32;1m$ cargo test\x1b[0;m\ntest result: ok\n")
            .create_async()
            .await;

        let mut out = Vec::new();
        job_logs(&client_for(&server), &mut out, 8, false).await.unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Logs for Job #8"));
        assert!(out.contains("1 │ $ cargo test"));
        assert!(out.contains("2 │ test result: ok"));
        assert!(!out.contains("--- Logs for Job #8 ---"));
    }

    #[tokio::test]
    async fn test_list_pipelines_returns_listed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects/42/pipelines")
            .match_query(Matcher::UrlEncoded("per_page".into(), "2".into()))
            .with_status(200)
            .with_body(r#"[{"id": 9, "status": "success"}, {"id": 8, "status": "failed"}]"#)
            .create_async()
            .await;

        let mut out = Vec::new();
        let pipelines = list_pipelines(&client_for(&server), &mut out, 2)
            .await
            .unwrap();
        let ids: Vec<u64> = pipelines.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![9, 8]);
        assert!(String::from_utf8(out).unwrap().contains("GitLab Pipelines"));
    }

    #[tokio::test]
    async fn test_job_logs_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects/42/jobs/6/trace")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let mut out = Vec::new();
        job_logs(&client_for(&server), &mut out, 6, true).await.unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No logs found for job 6"));
    }

    #[tokio::test]
    async fn test_pipeline_status_renders_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects/42/pipelines/15")
            .with_status(200)
            .with_body(r#"{"id": 15, "status": "running", "ref": "main"}"#)
            .create_async()
            .await;

        let mut out = Vec::new();
        let pipeline = pipeline_status(&client_for(&server), &mut out, 15)
            .await
            .unwrap();
        assert_eq!(pipeline.id, 15);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("15"));
        assert!(out.contains("running"));
    }
}
