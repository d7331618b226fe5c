//! Prompt domain
//!
//! Templates for the persona turn, summary, vote and final-report prompts.

mod template;

pub use template::PromptTemplate;
