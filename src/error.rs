use std::fmt;
use thiserror::Error;

/// A source could not be read.
#[derive(Debug, Error)]
#[error("failed to read source `{source_id}`")]
pub struct ReadError {
    pub source_id: String,
    #[source]
    pub io: std::io::Error,
}

/// Malformed source text, reported by a `StructureParser`.
#[derive(Debug, Error)]
#[error("syntax error at {line}:{column}: {message}")]
pub struct ParseError {
    pub line: usize,   // 1-based
    pub column: usize, // 1-based
    pub message: String,
}

/// An artifact could not be persisted.
#[derive(Debug, Error)]
#[error("failed to write artifact `{artifact}`")]
pub struct WriteError {
    pub artifact: String,
    #[source]
    pub io: std::io::Error,
}

/// First failure seen anywhere in a pipeline run. The whole batch is aborted.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("failed to parse `{source_id}`")]
    Parse {
        source_id: String,
        #[source]
        error: ParseError,
    },

    #[error("synthesis failed for `{source_id}`: {message}")]
    Synthesis { source_id: String, message: String },

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("failed to start the synthesis thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("pipeline worker terminated abnormally")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Synthesize,
    Write,
    Runtime,
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Read(_) => Stage::Read,
            Self::Parse { .. } | Self::Synthesis { .. } => Stage::Synthesize,
            Self::Write(_) => Stage::Write,
            Self::ThreadPool(_) | Self::Worker(_) => Stage::Runtime,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Read => "read",
            Stage::Synthesize => "synthesize",
            Stage::Write => "write",
            Stage::Runtime => "runtime",
        })
    }
}
