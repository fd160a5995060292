//! AI review and run orchestration.
//!
//! Provides the LLM client, the fixed review prompt, and the pipeline that
//! drives each command-line mode: fetch, score, review, post replies.

pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod reviewer;
