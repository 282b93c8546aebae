use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use log::info;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use crate::commands::{parse_variables, Variables};
use crate::config::Config;
use crate::console::{Console, LinePrompter, TerminalPrompter};
use crate::providers::gitlab::{GitLabClient, MAX_PER_PAGE};

#[derive(Parser)]
#[command(name = "gitlab-helper")]
#[command(author, version, about = "GitLab CI/CD pipeline helper", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage GitLab pipelines
    Pipelines {
        #[command(subcommand)]
        command: PipelineCommand,
    },

    /// Manage GitLab jobs
    Jobs {
        #[command(subcommand)]
        command: JobCommand,
    },

    /// Start interactive console mode
    Interactive,
}

#[derive(Subcommand, Debug)]
pub enum PipelineCommand {
    /// List recent pipelines
    List {
        /// Number of pipelines to show
        #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=MAX_PER_PAGE))]
        limit: u64,
    },

    /// Show the latest pipeline
    Latest,

    /// Create a new pipeline
    Create {
        /// Git reference (branch/tag)
        #[arg(short, long = "ref", default_value = "main")]
        ref_: String,

        /// Pipeline variables in JSON format, e.g. '{"VAR1": "value1"}'
        #[arg(long, value_parser = parse_variables)]
        variables: Option<Variables>,
    },

    /// Show the status of a specific pipeline
    Status {
        /// Pipeline ID
        pipeline_id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// List jobs for a specific pipeline
    List {
        /// Pipeline ID
        pipeline_id: u64,
    },

    /// Show the log of a specific job
    Logs {
        /// Job ID
        job_id: u64,

        /// Show the log in a numbered panel instead of the raw output
        #[arg(long = "no-raw", action = ArgAction::SetFalse)]
        raw: bool,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        info!(
            "Using project {} on {}",
            config.gitlab.project_id, config.gitlab.url
        );

        let client = GitLabClient::from_config(&config.gitlab)?;
        let mut stdout = io::stdout();

        match &self.command {
            Commands::Pipelines { command } => command.execute(&client, &mut stdout).await?,
            Commands::Jobs { command } => command.execute(&client, &mut stdout).await?,
            Commands::Interactive => {
                if io::stdin().is_terminal() && ::console::user_attended_stderr() {
                    Console::new(&client, TerminalPrompter::default(), stdout)
                        .run()
                        .await?;
                } else {
                    let prompter = LinePrompter::new(io::stdin().lock(), io::stderr());
                    Console::new(&client, prompter, stdout).run().await?;
                }
            }
        }

        Ok(())
    }
}
