//! Story game operations.

pub mod prompts;
pub mod service;

pub use service::{split_actions, StoryOpening, StoryService, StoryText};
