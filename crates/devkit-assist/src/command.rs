//! Turning a free-text request into one shell command.

use devkit_core::{DevkitError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{ChatMessage, LlmClient};
use crate::platform::operating_system;

/// The command the model proposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCommand {
    pub command: String,
}

impl GeneratedCommand {
    /// Parse a model reply.
    ///
    /// Expects `{"command": "..."}`, optionally inside a code fence. Any
    /// other reply is taken to be the command itself: its first non-empty
    /// line outside fences, with stray backticks removed.
    ///
    /// # Errors
    ///
    /// Returns [`DevkitError::Llm`] when the reply holds no command at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use devkit_assist::GeneratedCommand;
    ///
    /// let cmd = GeneratedCommand::parse(r#"{"command": "du -sh * | sort -h"}"#).unwrap();
    /// assert_eq!(cmd.command, "du -sh * | sort -h");
    ///
    /// let cmd = GeneratedCommand::parse("```bash\nls -la\n```").unwrap();
    /// assert_eq!(cmd.command, "ls -la");
    /// ```
    pub fn parse(reply: &str) -> Result<Self> {
        let unfenced: Vec<&str> = reply
            .lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .collect();

        if let Ok(parsed) = serde_json::from_str::<GeneratedCommand>(unfenced.join("\n").trim()) {
            let command = parsed.command.trim();
            if command.is_empty() {
                return Err(DevkitError::Llm("model returned an empty command".into()));
            }
            return Ok(Self {
                command: command.to_string(),
            });
        }

        debug!("reply is not a command object, using its first line");
        unfenced
            .iter()
            .map(|line| line.trim().trim_matches('`').trim())
            .find(|line| !line.is_empty())
            .map(|line| Self {
                command: line.to_string(),
            })
            .ok_or_else(|| DevkitError::Llm("model returned no command".into()))
    }
}

/// System prompt for a machine running `os`.
pub fn system_prompt(os: &str) -> String {
    format!(
        "You are a CLI command assistant.\n\
         Given a user request, you will provide a command to execute on the CLI.\n\
         The command should be a valid command that can be executed on the CLI.\n\
         Always provide the full command, including any necessary flags or arguments.\n\
         This command should be a single line command.\n\
         This command must run correctly on the system {os}.\n\
         Reply with a JSON object of the form {{\"command\": \"<command>\"}}."
    )
}

/// Generates shell commands for the host OS.
pub struct CommandBuilder {
    client: LlmClient,
    os: String,
}

impl CommandBuilder {
    /// Builder targeting the OS this process runs on.
    pub fn new(client: LlmClient) -> Self {
        Self::for_os(client, operating_system())
    }

    /// Builder targeting an explicit OS description.
    pub fn for_os(client: LlmClient, os: impl Into<String>) -> Self {
        Self {
            client,
            os: os.into(),
        }
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    /// Ask the model for a command fulfilling `request`.
    ///
    /// # Errors
    ///
    /// Returns [`DevkitError::InvalidInput`] for a blank request, or
    /// [`DevkitError::Llm`] when the API call fails or the reply holds no
    /// command.
    pub async fn generate(&self, request: &str) -> Result<GeneratedCommand> {
        if request.trim().is_empty() {
            return Err(DevkitError::InvalidInput("request is empty".into()));
        }
        let messages = vec![
            ChatMessage::system(system_prompt(&self.os)),
            ChatMessage::user(request),
        ];
        let reply = self.client.chat(messages).await?;
        GeneratedCommand::parse(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_reply() {
        let cmd = GeneratedCommand::parse("  {\"command\": \"  git log -1 \"}\n").unwrap();
        assert_eq!(cmd.command, "git log -1");
    }

    #[test]
    fn fenced_json_reply() {
        let reply = "```json\n{\"command\": \"find . -name '*.rs'\"}\n```";
        assert_eq!(GeneratedCommand::parse(reply).unwrap().command, "find . -name '*.rs'");
    }

    #[test]
    fn plain_text_uses_first_line() {
        let reply = "\n`docker ps -a`\nThis lists all containers.";
        assert_eq!(GeneratedCommand::parse(reply).unwrap().command, "docker ps -a");
    }

    #[test]
    fn json_with_empty_command_is_an_error() {
        assert!(GeneratedCommand::parse("{\"command\": \"  \"}").is_err());
    }

    #[test]
    fn empty_reply_is_an_error() {
        assert!(matches!(
            GeneratedCommand::parse("```\n```\n"),
            Err(DevkitError::Llm(_))
        ));
    }

    #[test]
    fn prompt_names_the_os() {
        let prompt = system_prompt("Fedora Linux 40");
        assert!(prompt.contains("on the system Fedora Linux 40."));
        assert!(prompt.contains("single line command"));
        assert!(prompt.contains("{\"command\": \"<command>\"}"));
    }

    #[tokio::test]
    async fn blank_request_is_rejected_before_calling_the_api() {
        let client = LlmClient::new(&devkit_core::AssistConfig::default()).unwrap();
        let err = CommandBuilder::new(client).generate("   ").await.unwrap_err();
        assert!(matches!(err, DevkitError::InvalidInput(_)));
    }

    #[test]
    fn builder_keeps_explicit_os() {
        let client = LlmClient::new(&devkit_core::AssistConfig::default()).unwrap();
        assert_eq!(CommandBuilder::for_os(client, "macOS 14.5").os(), "macOS 14.5");
    }
}
