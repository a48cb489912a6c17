pub mod quiz_flow;
pub mod quiz_session;
pub mod scoring;

pub use quiz_flow::{QuizFlow, Submission};
pub use quiz_session::{QuestionView, QuizPhase, QuizSession, QuizState, StepOutcome};
pub use scoring::{answers_match, compute_result, Grade, QuizResult};
