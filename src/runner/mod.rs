pub mod diagnostics;
pub mod discovery;
pub mod engine;
pub mod reporter;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticSink, Level, MemorySink, TracingSink};
pub use discovery::discover_test_cases;
pub use engine::{Engine, EngineConfig, split_command};
pub use reporter::TestReporter;
pub use types::{TestCase, TestResult, TestSummary, Verdict};
