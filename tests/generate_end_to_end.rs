use std::path::Path;
use std::sync::Arc;

use cs_testgen::pipeline::io::{FsArtifactWriter, FsSourceReader};
use cs_testgen::{CSharpParser, NUnitSynthesizer, Pipeline, PipelineConfig, PipelineError, Stage};

const CALCULATOR: &str = r#"using System;

namespace Demo.Math
{
    public class Calculator
    {
        public Calculator(ILogger logger, int precision)
        {
        }

        public int Add(int left, int right)
        {
            return left + right;
        }

        public void Reset()
        {
        }
    }
}
"#;

const SERVICES: &str = r#"namespace Demo.Services
{
    public class Mailer
    {
        public void Send(IMessage message) { }
    }

    public class Scheduler
    {
        public Scheduler(IClock clock) { }
    }
}
"#;

fn pipeline(out: &Path) -> Pipeline {
    Pipeline::new(
        PipelineConfig { read_parallelism: 2, write_parallelism: 2, ..PipelineConfig::default() },
        Arc::new(FsSourceReader),
        Arc::new(FsArtifactWriter::new(out)),
        Arc::new(CSharpParser::new()),
        Arc::new(NUnitSynthesizer::new()),
    )
}

fn source(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path.to_string_lossy().to_string()
}

#[tokio::test]
async fn generates_one_test_file_per_class() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("generated");
    let sources = [
        source(dir.path(), "Calculator.cs", CALCULATOR),
        source(dir.path(), "Services.cs", SERVICES),
    ];

    let report = pipeline(&out).execute(sources).await.unwrap();
    assert_eq!(report.sources_read, 2);
    assert_eq!(report.artifacts_written, 3);

    for name in ["CalculatorTests.cs", "MailerTests.cs", "SchedulerTests.cs"] {
        assert!(out.join(name).is_file(), "missing {name}");
    }

    let calculator = std::fs::read_to_string(out.join("CalculatorTests.cs")).unwrap();
    assert!(calculator.starts_with(
        "using System;\nusing NUnit.Framework;\nusing Moq;\nusing Demo.Math;\n\nnamespace Demo.Math.Tests\n"
    ));
    assert!(calculator.contains("        private Mock<ILogger> _logger;\n"));
    assert!(calculator.contains("        private int _precision = default(int);\n"));
    assert!(calculator.contains(
        "            _calculatorUnderTest = new Calculator(_logger.Object, _precision);\n"
    ));
    assert!(calculator.contains("            int actual = _calculatorUnderTest.Add(left, right);\n"));
    assert_eq!(calculator.matches("Assert.Fail(\"autogenerated\");").count(), 2);

    let mailer = std::fs::read_to_string(out.join("MailerTests.cs")).unwrap();
    assert!(!mailer.contains("[SetUp]"));
    assert!(mailer.contains("            Mock<IMessage> message = new Mock<IMessage>();\n"));
}

#[tokio::test]
async fn missing_source_fails_the_whole_batch() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("generated");
    let sources = [
        source(dir.path(), "Calculator.cs", CALCULATOR),
        dir.path().join("Missing.cs").to_string_lossy().to_string(),
        source(dir.path(), "Services.cs", SERVICES),
    ];

    let error = pipeline(&out).execute(sources).await.unwrap_err();
    assert_eq!(error.stage(), Stage::Read);
    assert!(matches!(error, PipelineError::Read(ref read) if read.source_id.ends_with("Missing.cs")));
}

#[tokio::test]
async fn malformed_source_fails_in_the_synthesize_stage() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("generated");
    let sources = [source(dir.path(), "Broken.cs", "namespace Demo {\n    public class {\n")];

    let error = pipeline(&out).execute(sources).await.unwrap_err();
    assert_eq!(error.stage(), Stage::Synthesize);
    assert!(matches!(error, PipelineError::Parse { .. }));
}
