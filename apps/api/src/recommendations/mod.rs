pub mod estimates;
pub mod handlers;
pub mod prompt_context;
pub mod prompts;
pub mod ranker;
