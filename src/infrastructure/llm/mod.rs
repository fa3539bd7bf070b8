// Language model adapters
// Implement the agents' LanguageModel port over external APIs

pub mod openai;

pub use openai::OpenAiChatModel;
