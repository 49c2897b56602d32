pub mod answer_parser;
pub mod category_source;
pub mod llm_service;
pub mod prompt_assembler;
pub mod schema_builder;

pub use answer_parser::AnswerParser;
pub use llm_service::{ChatMessage, LanguageModel, LlmService, Role};
pub use prompt_assembler::Instruction;
pub use schema_builder::{AnswerContract, AnswerField, FALLBACK_FIELD};
