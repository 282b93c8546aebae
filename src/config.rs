use log::{debug, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::error::{HelperError, Result};

/// Name of the configuration file looked up in the project and home directories.
pub const CONFIG_FILE_NAME: &str = ".gitlab-helper.yaml";

/// Configuration for gitlab-helper.
///
/// Loaded once at startup and never modified afterwards. Every API call
/// is made against the project described here.
#[derive(Debug, Clone)]
pub struct Config {
    pub gitlab: GitLabConfig,
}

#[derive(Debug, Clone)]
pub struct GitLabConfig {
    /// GitLab instance base URL (e.g., <https://gitlab.com>)
    pub url: String,

    /// Numeric project ID or full project path (e.g., 'group/project')
    pub project_id: String,

    /// Personal or project access token
    pub token: Token,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    gitlab: Option<RawGitLabConfig>,
}

#[derive(Debug, Deserialize)]
struct RawGitLabConfig {
    url: Option<String>,
    project_id: Option<ProjectId>,
    token: Option<String>,
}

/// YAML authors write `project_id: 42` as often as `project_id: "42"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectId {
    Number(u64),
    Path(String),
}

impl From<ProjectId> for String {
    fn from(value: ProjectId) -> Self {
        match value {
            ProjectId::Number(id) => id.to_string(),
            ProjectId::Path(path) => path,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Searches for the configuration file in this order:
    /// 1. Specified path
    /// 2. ./.gitlab-helper.yaml
    /// 3. ~/.gitlab-helper.yaml
    ///
    /// A specified path that does not exist is an error; it never falls back
    /// to the other locations.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(HelperError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_path(path);
        }

        Self::load_first(&Self::default_candidates())
    }

    fn default_candidates() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(CONFIG_FILE_NAME));
        }
        candidates
    }

    /// Load the first candidate that exists.
    fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from_path(candidate);
            }
            debug!("No config at {}", candidate.display());
        }

        let searched = candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(HelperError::Config(format!(
            "no configuration found (searched: {searched}). Please create a {CONFIG_FILE_NAME} file"
        )))
    }

    /// Load configuration from a specific file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HelperError::Config(format!("failed to read {}: {e}", path.display()))
        })?;

        let config = Self::from_yaml(&contents)
            .map_err(|e| HelperError::Config(format!("{}: {e}", path.display())))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a YAML document.
    fn from_yaml(contents: &str) -> std::result::Result<Self, String> {
        let raw: RawConfig =
            serde_yaml::from_str(contents).map_err(|e| format!("failed to parse YAML: {e}"))?;

        let gitlab = raw.gitlab.ok_or("missing 'gitlab' section")?;

        let url = required("url", gitlab.url)?;
        let project_id = required("project_id", gitlab.project_id.map(String::from))?;
        let token = required("token", gitlab.token)?;

        Ok(Self {
            gitlab: GitLabConfig {
                url,
                project_id,
                token: Token::from(token),
            },
        })
    }
}

fn required(field: &str, value: Option<String>) -> std::result::Result<String, String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(format!("'gitlab.{field}' must not be empty")),
        None => Err(format!("missing required field 'gitlab.{field}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(temp_file, "{contents}").unwrap();
        temp_file
    }

    #[test]
    fn test_load_yaml_config() {
        let temp_file = write_config(
            r#"
gitlab:
  url: "https://gitlab.example.com"
  project_id: "42"
  token: "t"
"#,
        );

        let config = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.gitlab.url, "https://gitlab.example.com");
        assert_eq!(config.gitlab.project_id, "42");
        assert_eq!(config.gitlab.token.as_str(), "t");
    }

    #[test]
    fn test_numeric_project_id() {
        let temp_file = write_config(
            "gitlab:\n  url: https://gitlab.com\n  project_id: 1234\n  token: glpat-x\n",
        );

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.gitlab.project_id, "1234");
    }

    #[test]
    fn test_project_path_is_kept_verbatim() {
        let temp_file = write_config(
            "gitlab:\n  url: https://gitlab.com\n  project_id: group/project\n  token: glpat-x\n",
        );

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.gitlab.project_id, "group/project");
    }

    #[test]
    fn test_missing_fields_are_config_errors() {
        for (yaml, field) in [
            ("gitlab:\n  project_id: 1\n  token: t\n", "url"),
            ("gitlab:\n  url: https://x\n  token: t\n", "project_id"),
            ("gitlab:\n  url: https://x\n  project_id: 1\n", "token"),
        ] {
            let temp_file = write_config(yaml);
            let err = Config::load_from_path(temp_file.path()).unwrap_err();
            assert!(matches!(err, HelperError::Config(_)));
            assert!(err.to_string().contains(field), "{err} should name {field}");
        }
    }

    #[test]
    fn test_missing_gitlab_section() {
        let temp_file = write_config("github:\n  token: t\n");
        let err = Config::load_from_path(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("'gitlab'"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let temp_file = write_config("gitlab:\n  url: https://x\n  project_id: 1\n  token: ''\n");
        let err = Config::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, HelperError::Config(_)));
    }

    #[test]
    fn test_unparseable_yaml() {
        let temp_file = write_config("gitlab: [unclosed\n");
        let err = Config::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, HelperError::Config(_)));
    }

    #[test]
    fn test_load_nonexistent_explicit_path() {
        let err = Config::load(Some(Path::new("does-not-exist.yaml"))).unwrap_err();
        assert!(matches!(err, HelperError::Config(_)));
        assert!(err.to_string().contains("does-not-exist.yaml"));
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join("project.yaml");
        let home = temp_dir.path().join("home.yaml");
        std::fs::write(
            &home,
            "gitlab:\n  url: https://home\n  project_id: 1\n  token: h\n",
        )
        .unwrap();

        let candidates = vec![project.clone(), home.clone()];
        let config = Config::load_first(&candidates).unwrap();
        assert_eq!(config.gitlab.url, "https://home");

        std::fs::write(
            &project,
            "gitlab:\n  url: https://project\n  project_id: 2\n  token: p\n",
        )
        .unwrap();
        let config = Config::load_first(&candidates).unwrap();
        assert_eq!(config.gitlab.url, "https://project");
        assert_eq!(config.gitlab.project_id, "2");
    }

    #[test]
    fn test_no_candidate_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let candidates = vec![temp_dir.path().join(CONFIG_FILE_NAME)];
        let err = Config::load_first(&candidates).unwrap_err();
        assert!(matches!(err, HelperError::Config(_)));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
