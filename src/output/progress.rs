use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::bright;

/// Spinner shown on stderr while a single GitLab request is in flight.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(bright(message).to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    /// Remove the spinner line; results are printed by the caller.
    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}
