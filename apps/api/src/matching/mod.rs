pub mod ats;
pub mod handlers;
pub mod keywords;
pub mod pillars;
pub mod quick_match;
pub mod tenure;
pub mod text;
pub mod vocabulary;
