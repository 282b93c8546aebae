use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};

use crate::providers::gitlab::{Job, Pipeline, Status};

/// Table and cell creation helpers
fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

fn status_cell(status: &Status) -> Cell {
    let color = match status {
        Status::Success => TableColor::Green,
        Status::Failed | Status::Canceled => TableColor::Red,
        Status::Running => TableColor::Blue,
        Status::Pending | Status::WaitingForResource | Status::Preparing => TableColor::Yellow,
        Status::Created | Status::Scheduled => TableColor::Cyan,
        Status::Manual => TableColor::Magenta,
        Status::Skipped => TableColor::Grey,
        Status::Unknown(_) => TableColor::White,
    };
    Cell::new(status).fg(color)
}

fn id_cell(id: u64) -> Cell {
    Cell::new(id)
        .fg(TableColor::Cyan)
        .set_alignment(CellAlignment::Right)
}

/// Pipelines as an ID / Status / Ref / SHA / Created At table.
pub fn pipelines_table(pipelines: &[Pipeline]) -> Table {
    let mut table = create_table();
    table.set_header(create_cyan_header(&["ID", "Status", "Ref", "SHA", "Created At"]));

    for pipeline in pipelines {
        table.add_row(vec![
            id_cell(pipeline.id),
            status_cell(&pipeline.status),
            Cell::new(pipeline.ref_.as_deref().unwrap_or("-")),
            Cell::new(pipeline.short_sha()),
            Cell::new(
                pipeline
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_default(),
            ),
        ]);
    }

    table
}

/// Jobs as a Stage / Job / ID / Status / Pipeline table, in the order GitLab
/// returned them.
pub fn jobs_table(jobs: &[Job]) -> Table {
    let mut table = create_table();
    table.set_header(create_cyan_header(&["Stage", "Job", "ID", "Status", "Pipeline"]));

    for job in jobs {
        table.add_row(vec![
            Cell::new(&job.stage),
            Cell::new(&job.name),
            id_cell(job.id),
            status_cell(&job.status),
            Cell::new(
                job.pipeline
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |p| p.id.to_string()),
            ),
        ]);
    }

    table
}

/// A job log as a titled panel with line numbers. ANSI colour codes from the
/// runner are stripped so the panel borders stay aligned.
pub fn log_panel(job_id: u64, log: &str) -> Table {
    let plain = console::strip_ansi_codes(log);
    let lines: Vec<&str> = plain.lines().collect();
    let width = lines.len().to_string().len();

    let numbered = lines
        .iter()
        .enumerate()
        .map(|(index, line)| format!("{:>width$} │ {line}", index + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let mut table = create_table();
    table.set_header(create_cyan_header(&[&format!("Logs for Job #{job_id}")]));
    table.add_row(vec![Cell::new(numbered)]);
    table
}
