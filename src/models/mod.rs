pub mod difficulty;
pub mod question;

pub use difficulty::Difficulty;
pub use question::{Question, QuestionSet, RawQuestion, OPTION_COUNT};
