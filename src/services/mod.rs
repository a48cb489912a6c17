pub mod extraction;
pub mod generator;
pub mod llm_service;
pub mod prompt;

pub use extraction::{extract_question_array, parse_question_set};
pub use generator::QuestionGenerator;
pub use llm_service::LlmService;
pub use prompt::build_generation_prompt;
