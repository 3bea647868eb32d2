// src/feedback/mod.rs

//! The feedback round-trip behind the `interactive_feedback` tool.
//!
//! - [`workflow`] records the conversation, optionally runs the project's
//!   command, asks the human and assembles the result.
//! - [`prompter`] abstracts how the human is asked; production runs the
//!   desktop prompt script.

pub mod prompter;
pub mod workflow;

pub use prompter::{FeedbackPrompter, GuiPrompter, PromptRequest};
pub use workflow::{FeedbackRequest, FeedbackWorkflow};
