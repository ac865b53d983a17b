pub mod generator;
pub mod prompts;
