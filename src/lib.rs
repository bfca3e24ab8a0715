//! Skeleton NUnit/Moq test generation for C# sources.
//!
//! `parse` builds a structural model per source file, `synth` turns each
//! class of that model into a test stub, and `pipeline` runs read → synthesize
//! → write concurrently over a whole batch.

pub mod cli;
pub mod error;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod synth;

pub use error::{ParseError, PipelineError, ReadError, Stage, WriteError};
pub use model::{ClassInfo, ConstructorInfo, FileModel, MethodInfo, ParameterInfo, TestArtifact, TypeRef};
pub use parse::{CSharpParser, StructureParser};
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport};
pub use synth::{NUnitSynthesizer, TemplateSynthesizer};
