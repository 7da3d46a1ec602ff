pub mod cluster;
pub mod command;
pub mod llm;
