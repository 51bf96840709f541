pub mod batch;
pub mod collaborator;
pub mod config;
pub mod error;
pub mod gemini;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod payout;
pub mod prompts;
pub mod report;
pub mod scoring;

pub use config::GraderConfig;
pub use error::{GradeError, GradeResult};
pub use models::{GradeReport, ScoreBreakdown, Tier};
pub use orchestrator::{assemble_report, Grader};
