mod client;
mod types;

pub use client::{GitLabClient, MAX_PER_PAGE};
pub use types::{Job, Pipeline, Status};
