pub mod companion;
pub mod importer;
pub mod parser;
pub mod workspace;

pub use companion::{Batch, CompanionProblem, CompanionTest};
pub use importer::{ImportSettings, ImportedProblem, Importer};
pub use parser::{Problem, ProblemParser, normalize_problem_code};
pub use workspace::{ProblemKey, ProblemMetadata, ProblemWorkspace};
