//! Read → Synthesize → Write over a batch of sources.
//!
//! Every stage is its own pool of workers draining a bounded queue filled by
//! the stage before it, so a slow writer throttles synthesis which throttles
//! reading. Read and write workers are async tasks; synthesis (parse +
//! template) runs on a dedicated rayon pool sized to the synthesize bound.
//!
//! Completion flows downstream by dropping senders: when every worker of a
//! stage has returned, the next stage's queue closes and its workers drain
//! and return in turn.
//!
//! Failure policy: there is no retry and no partial success. The first error
//! from any unit of work aborts the whole batch and is returned. Artifacts
//! already written stay on disk; the batch is meant to be re-run after a fix.
pub mod io;

use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, error, info, trace};

use crate::error::PipelineError;
use crate::model::TestArtifact;
use crate::parse::StructureParser;
use crate::synth::TemplateSynthesizer;
use io::{ArtifactWriter, SourceReader};

const DEFAULT_QUEUE_CAPACITY: usize = 16;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub read_parallelism: usize,
    pub synthesize_parallelism: usize,
    pub write_parallelism: usize,
    /// Capacity of each hand-off queue between stages.
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub sources_submitted: usize,
    pub sources_read: usize,
    pub artifacts_synthesized: usize,
    pub artifacts_written: usize,
}

pub struct Pipeline {
    config: PipelineConfig,
    reader: Arc<dyn SourceReader>,
    writer: Arc<dyn ArtifactWriter>,
    parser: Arc<dyn StructureParser>,
    synthesizer: Arc<dyn TemplateSynthesizer>,
}

struct SourceText {
    source_id: String,
    text: String,
}

enum StageOutcome {
    Submitted(usize),
    Read(usize),
    Synthesized(usize),
    Written(usize),
}

type SharedQueue<T> = Arc<Mutex<mpsc::Receiver<T>>>;

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            read_parallelism: 1,
            synthesize_parallelism: available_parallelism(),
            write_parallelism: 1,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PipelineConfig {
    /// Every bound at least 1; synthesis never below the processor count.
    pub fn normalized(&self) -> Self {
        Self {
            read_parallelism: self.read_parallelism.max(1),
            synthesize_parallelism: self.synthesize_parallelism.max(available_parallelism()),
            write_parallelism: self.write_parallelism.max(1),
            queue_capacity: self.queue_capacity.max(1),
        }
    }
}

impl PipelineReport {
    fn record(&mut self, outcome: StageOutcome) {
        match outcome {
            StageOutcome::Submitted(n) => self.sources_submitted += n,
            StageOutcome::Read(n) => self.sources_read += n,
            StageOutcome::Synthesized(n) => self.artifacts_synthesized += n,
            StageOutcome::Written(n) => self.artifacts_written += n,
        }
    }
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        reader: Arc<dyn SourceReader>,
        writer: Arc<dyn ArtifactWriter>,
        parser: Arc<dyn StructureParser>,
        synthesizer: Arc<dyn TemplateSynthesizer>,
    ) -> Self {
        Self { config, reader, writer, parser, synthesizer }
    }

    /// Run the whole batch. Resolves once the write stage has drained, or with
    /// the first error encountered by any stage.
    pub async fn execute<I, S>(&self, sources: I) -> Result<PipelineReport, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = self.config.normalized();
        let sources: Vec<String> = sources.into_iter().map(Into::into).collect();
        info!(
            sources = sources.len(),
            read = config.read_parallelism,
            synthesize = config.synthesize_parallelism,
            write = config.write_parallelism,
            "starting test generation"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.synthesize_parallelism)
            .thread_name(|index| format!("synthesize-{index}"))
            .build()?;
        let pool = Arc::new(pool);

        let (source_tx, source_rx) = mpsc::channel::<String>(config.queue_capacity);
        let (text_tx, text_rx) = mpsc::channel::<SourceText>(config.queue_capacity);
        let (artifact_tx, artifact_rx) = mpsc::channel::<TestArtifact>(config.queue_capacity);
        let source_rx: SharedQueue<String> = Arc::new(Mutex::new(source_rx));
        let text_rx: SharedQueue<SourceText> = Arc::new(Mutex::new(text_rx));
        let artifact_rx: SharedQueue<TestArtifact> = Arc::new(Mutex::new(artifact_rx));

        let mut tasks: JoinSet<Result<StageOutcome, PipelineError>> = JoinSet::new();

        tasks.spawn(submit(sources, source_tx));
        for worker in 0..config.read_parallelism {
            tasks.spawn(read_worker(
                worker,
                source_rx.clone(),
                text_tx.clone(),
                self.reader.clone(),
            ));
        }
        for worker in 0..config.synthesize_parallelism {
            tasks.spawn(synthesize_worker(
                worker,
                text_rx.clone(),
                artifact_tx.clone(),
                self.parser.clone(),
                self.synthesizer.clone(),
                pool.clone(),
            ));
        }
        for worker in 0..config.write_parallelism {
            tasks.spawn(write_worker(worker, artifact_rx.clone(), self.writer.clone()));
        }
        // the workers now own every remaining sender
        drop(text_tx);
        drop(artifact_tx);

        let mut report = PipelineReport::default();
        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(Ok(outcome)) => {
                    report.record(outcome);
                    continue;
                }
                Ok(Err(failure)) => failure,
                Err(join_error) => PipelineError::Worker(join_error),
            };
            tasks.abort_all();
            error!(stage = %failure.stage(), error = %failure, "test generation aborted");
            return Err(failure);
        }

        info!(
            sources = report.sources_read,
            artifacts = report.artifacts_written,
            "test generation finished"
        );
        Ok(report)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// STAGES
// ————————————————————————————————————————————————————————————————————————————

async fn next<T>(queue: &Mutex<mpsc::Receiver<T>>) -> Option<T> {
    queue.lock().await.recv().await
}

async fn submit(
    sources: Vec<String>,
    queue: mpsc::Sender<String>,
) -> Result<StageOutcome, PipelineError> {
    let mut submitted = 0;
    for source_id in sources {
        if queue.send(source_id).await.is_err() {
            break; // readers are gone: the batch is being torn down
        }
        submitted += 1;
    }
    debug!(submitted, "all sources submitted");
    Ok(StageOutcome::Submitted(submitted))
}

async fn read_worker(
    worker: usize,
    sources: SharedQueue<String>,
    texts: mpsc::Sender<SourceText>,
    reader: Arc<dyn SourceReader>,
) -> Result<StageOutcome, PipelineError> {
    let mut read = 0;
    while let Some(source_id) = next(&sources).await {
        trace!(worker, source = %source_id, "reading source");
        let text = reader.read(&source_id).await?;
        read += 1;
        if texts.send(SourceText { source_id, text }).await.is_err() {
            break;
        }
    }
    debug!(worker, read, "read worker drained");
    Ok(StageOutcome::Read(read))
}

async fn synthesize_worker(
    worker: usize,
    texts: SharedQueue<SourceText>,
    artifacts: mpsc::Sender<TestArtifact>,
    parser: Arc<dyn StructureParser>,
    synthesizer: Arc<dyn TemplateSynthesizer>,
    pool: Arc<rayon::ThreadPool>,
) -> Result<StageOutcome, PipelineError> {
    let mut produced = 0;
    while let Some(SourceText { source_id, text }) = next(&texts).await {
        trace!(worker, source = %source_id, "synthesizing");

        let (done_tx, done_rx) = oneshot::channel();
        let job_parser = parser.clone();
        let job_synthesizer = synthesizer.clone();
        pool.spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                job_parser
                    .parse(&text)
                    .map(|model| job_synthesizer.synthesize(&model))
            }));
            let _ = done_tx.send(outcome);
        });

        let batch = match done_rx.await {
            Ok(Ok(Ok(batch))) => batch,
            Ok(Ok(Err(error))) => return Err(PipelineError::Parse { source_id, error }),
            Ok(Err(panic)) => {
                return Err(PipelineError::Synthesis { source_id, message: panic_message(panic) });
            }
            Err(_) => {
                return Err(PipelineError::Synthesis {
                    source_id,
                    message: "synthesis job was dropped before completing".into(),
                });
            }
        };

        trace!(worker, source = %source_id, artifacts = batch.len(), "synthesized");
        for artifact in batch {
            if artifacts.send(artifact).await.is_err() {
                return Ok(StageOutcome::Synthesized(produced));
            }
            produced += 1;
        }
    }
    debug!(worker, produced, "synthesize worker drained");
    Ok(StageOutcome::Synthesized(produced))
}

async fn write_worker(
    worker: usize,
    artifacts: SharedQueue<TestArtifact>,
    writer: Arc<dyn ArtifactWriter>,
) -> Result<StageOutcome, PipelineError> {
    let mut written = 0;
    while let Some(artifact) = next(&artifacts).await {
        trace!(worker, artifact = %artifact.file_name, "writing artifact");
        writer.write(&artifact.file_name, &artifact.content).await?;
        written += 1;
    }
    debug!(worker, written, "write worker drained");
    Ok(StageOutcome::Written(written))
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn available_parallelism() -> usize {
    std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "synthesizer panicked".to_string()
    }
}

// ------------------------------- Tests ------------------------------------ //
