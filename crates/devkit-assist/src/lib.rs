//! Natural-language to shell-command assistant.
//!
//! [`CommandBuilder`] asks an OpenAI-compatible chat endpoint for a single
//! command line that runs on the current machine. Running the command is
//! left to the caller.

pub mod command;
pub mod llm;
pub mod platform;

pub use command::{CommandBuilder, GeneratedCommand};
pub use llm::{ChatMessage, LlmClient, Role};
pub use platform::operating_system;
