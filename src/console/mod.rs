mod prompt;

pub use prompt::{LinePrompter, Prompter, TerminalPrompter};

use log::debug;
use std::io::Write;

use crate::commands;
use crate::error::{HelperError, Result};
use crate::output::{bright, bright_red, cyan, magenta_bold};
use crate::providers::gitlab::{GitLabClient, MAX_PER_PAGE};

const DEFAULT_LIST_LIMIT: u64 = 10;
const DEFAULT_REF: &str = "main";

/// State carried between menu selections.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Session {
    /// Last pipeline listed, created or selected
    pub current_pipeline: Option<u64>,
    /// Last job whose log was shown
    pub current_job: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    ListPipelines,
    LatestPipeline,
    CreatePipeline,
    PipelineStatus,
    ListJobs,
    JobLogs,
    Help,
    Quit,
}

const MENU: [(MenuAction, &str, &str); 8] = [
    (MenuAction::ListPipelines, "list-pipelines", "List recent pipelines"),
    (MenuAction::LatestPipeline, "latest-pipeline", "Show the latest pipeline and its jobs"),
    (MenuAction::CreatePipeline, "create-pipeline", "Create a new pipeline"),
    (MenuAction::PipelineStatus, "pipeline-status", "Show the status of a pipeline"),
    (MenuAction::ListJobs, "list-jobs", "List jobs of a pipeline"),
    (MenuAction::JobLogs, "job-logs", "Show the log of a job"),
    (MenuAction::Help, "help", "Show this menu"),
    (MenuAction::Quit, "quit", "Exit the console"),
];

impl MenuAction {
    /// Accepts a menu number, a menu name, or `exit`/`q` for quit.
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();

        if let Ok(number) = input.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|index| MENU.get(index))
                .map(|(action, _, _)| *action);
        }

        match input.as_str() {
            "exit" | "q" => Some(Self::Quit),
            name => MENU
                .iter()
                .find(|(_, menu_name, _)| *menu_name == name)
                .map(|(action, _, _)| *action),
        }
    }
}

/// Interactive text console offering the CLI operations as a menu loop.
///
/// Reads selections from the prompter until quit or end of input. Errors
/// from a single action are printed and the loop continues.
pub struct Console<'a, P, W> {
    client: &'a GitLabClient,
    prompter: P,
    output: W,
    session: Session,
}

impl<'a, P: Prompter, W: Write> Console<'a, P, W> {
    pub fn new(client: &'a GitLabClient, prompter: P, output: W) -> Self {
        Self {
            client,
            prompter,
            output,
            session: Session::default(),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "{}",
            magenta_bold("===== GitLab CI/CD Helper Interactive Mode =====")
        )?;
        writeln!(self.output, "Type 'quit' or 'exit' to leave")?;
        self.print_menu()?;

        loop {
            let Some(selection) = self.prompter.selection("gitlab")? else {
                break;
            };
            if selection.is_empty() {
                continue;
            }

            let Some(action) = MenuAction::parse(&selection) else {
                writeln!(self.output, "{}", bright_red(format!("Unknown command: {selection}")))?;
                self.print_menu()?;
                continue;
            };

            debug!("Menu selection: {action:?}");
            match action {
                MenuAction::Quit => break,
                MenuAction::Help => self.print_menu()?,
                action => {
                    if let Err(e) = self.dispatch(action).await {
                        writeln!(self.output, "{}", bright_red(format!("Error: {e}")))?;
                    }
                }
            }
        }

        writeln!(self.output, "{}", bright("Goodbye!"))?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, "{}", bright("Available commands:").underlined())?;
        for (number, (_, name, description)) in MENU.iter().enumerate() {
            writeln!(
                self.output,
                "  {}) {:<16} {}",
                number + 1,
                cyan(name),
                description
            )?;
        }
        Ok(())
    }

    async fn dispatch(&mut self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::ListPipelines => {
                let limit = self
                    .prompter
                    .number("Number of pipelines to show", Some(DEFAULT_LIST_LIMIT))?;
                if !(1..=MAX_PER_PAGE).contains(&limit) {
                    return Err(HelperError::Argument(format!(
                        "limit must be between 1 and {MAX_PER_PAGE}"
                    )));
                }

                let pipelines =
                    commands::list_pipelines(self.client, &mut self.output, limit).await?;
                let Some(first) = pipelines.first() else {
                    return Ok(());
                };
                if !self.prompter.confirm("Select a pipeline?", false)? {
                    return Ok(());
                }

                let id = self.prompter.number("Pipeline ID", Some(first.id))?;
                self.session.current_pipeline = Some(id);
                commands::pipeline_status(self.client, &mut self.output, id).await?;
                writeln!(self.output, "{}", bright("Jobs for this pipeline:"))?;
                commands::list_jobs(self.client, &mut self.output, id)
                    .await
                    .map(drop)
            }
            MenuAction::LatestPipeline => {
                let pipeline = commands::latest_pipeline(self.client, &mut self.output).await?;
                self.session.current_pipeline = Some(pipeline.id);
                writeln!(self.output, "{}", bright("Jobs for this pipeline:"))?;
                commands::list_jobs(self.client, &mut self.output, pipeline.id)
                    .await
                    .map(drop)
            }
            MenuAction::CreatePipeline => {
                let ref_ = self.prompter.text("Git reference (branch/tag)", DEFAULT_REF)?;
                let raw = self.prompter.text(
                    "Variables in JSON format, e.g. '{\"VAR1\": \"value1\"}' (empty for none)",
                    "",
                )?;
                let variables = commands::parse_variables(&raw)?;
                let pipeline =
                    commands::create_pipeline(self.client, &mut self.output, &ref_, &variables)
                        .await?;
                self.session.current_pipeline = Some(pipeline.id);
                Ok(())
            }
            MenuAction::PipelineStatus => {
                let id = self
                    .prompter
                    .number("Pipeline ID", self.session.current_pipeline)?;
                self.session.current_pipeline = Some(id);
                commands::pipeline_status(self.client, &mut self.output, id)
                    .await
                    .map(drop)
            }
            MenuAction::ListJobs => {
                let id = self
                    .prompter
                    .number("Pipeline ID", self.session.current_pipeline)?;
                self.session.current_pipeline = Some(id);

                let jobs = commands::list_jobs(self.client, &mut self.output, id).await?;
                let Some(first) = jobs.first() else {
                    return Ok(());
                };
                if !self.prompter.confirm("Select a job to view logs?", false)? {
                    return Ok(());
                }

                let job_id = self.prompter.number("Job ID", Some(first.id))?;
                self.show_log(job_id).await
            }
            MenuAction::JobLogs => {
                let id = self.prompter.number("Job ID", self.session.current_job)?;
                self.show_log(id).await
            }
            MenuAction::Help | MenuAction::Quit => Ok(()),
        }
    }

    async fn show_log(&mut self, job_id: u64) -> Result<()> {
        self.session.current_job = Some(job_id);
        let raw = self
            .prompter
            .confirm("Display raw logs with original formatting?", true)?;
        commands::job_logs(self.client, &mut self.output, job_id, raw).await
    }
}
