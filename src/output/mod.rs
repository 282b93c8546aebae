mod progress;
mod styling;
mod tables;

pub use progress::Spinner;
pub use styling::{bright, bright_green, bright_red, cyan, dim, magenta_bold};
pub use tables::{jobs_table, log_panel, pipelines_table};

/// Prints the gitlab-helper banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🦊 gitlab-helper"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab CI/CD pipeline helper")
    );
}
