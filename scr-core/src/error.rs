use std::io;
use std::path::PathBuf;

use crate::engine::host::ExitStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("unable to find any of the following: {}", join_paths(.attempted))]
    NotFound {
        name: String,
        attempted: Vec<PathBuf>,
    },

    #[error("{0}")]
    Evaluation(String),

    #[error("could not start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Interpreter { program: String, status: ExitStatus },

    #[error("unreadable result: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
