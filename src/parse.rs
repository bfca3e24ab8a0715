//! Source text → `FileModel`.
//!
//! The pipeline only sees the `StructureParser` trait; `CSharpParser` is the
//! tree-sitter backed implementation used by the CLI.
pub mod csharp;

use crate::error::ParseError;
use crate::model::{ConstructorInfo, FileModel};

pub use csharp::CSharpParser;

pub trait StructureParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<FileModel, ParseError>;
}

/// Pick the public constructor with the most parameters. Ties go to the one
/// declared first; no candidates yields the implicit parameterless constructor.
pub fn select_constructor<I>(candidates: I) -> ConstructorInfo
where
    I: IntoIterator<Item = ConstructorInfo>,
{
    candidates
        .into_iter()
        .fold(None, |best: Option<ConstructorInfo>, next| match best {
            Some(best) if best.parameters.len() >= next.parameters.len() => Some(best),
            _ => Some(next),
        })
        .unwrap_or_default()
}
