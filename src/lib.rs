// Library root — exposes internals for integration tests and future crate consumers.
// The binary entry point is src/main.rs.

pub mod bibliography;
pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod logger;
pub mod normalize;
pub mod pipeline;
pub mod profanity;
pub mod prompts;
pub mod response;
pub mod server;
pub mod toolflow;
